//! Wire messages of the remote-control channel.
//!
//! Requests are `{"method": .., "params": {..}}` objects. Replies and events
//! are `{"event": .., "data": ..}` objects; only the shapes the session reads
//! are modelled.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Method of every key, text and pointer command
pub const REMOTE_CONTROL: &str = "ms.remote.control";

/// Method of app-list and app-launch requests
pub const CHANNEL_EMIT: &str = "ms.channel.emit";

/// Event sent once the channel is open and authorized
pub const CHANNEL_CONNECT: &str = "ms.channel.connect";

/// Event sent when the user declines the pairing prompt
pub const CHANNEL_UNAUTHORIZED: &str = "ms.channel.unauthorized";

/// Event name of the installed-applications reply
pub const INSTALLED_APPS: &str = "ed.installedApp.get";

/// Event name of an application launch
pub const APP_LAUNCH: &str = "ed.apps.launch";

/// App id of the built-in web browser
pub const BROWSER_APP_ID: &str = "org.tizen.browser";

/// Common key codes
pub mod keys {
    pub const POWER: &str = "KEY_POWER";
    pub const ENTER: &str = "KEY_ENTER";
    pub const HOME: &str = "KEY_HOME";
    pub const RETURN: &str = "KEY_RETURN";
    pub const VOLUME_UP: &str = "KEY_VOLUP";
    pub const VOLUME_DOWN: &str = "KEY_VOLDOWN";
    pub const MUTE: &str = "KEY_MUTE";
    pub const CHANNEL_UP: &str = "KEY_CHUP";
    pub const CHANNEL_DOWN: &str = "KEY_CHDOWN";
    pub const UP: &str = "KEY_UP";
    pub const DOWN: &str = "KEY_DOWN";
    pub const LEFT: &str = "KEY_LEFT";
    pub const RIGHT: &str = "KEY_RIGHT";
    pub const SOURCE: &str = "KEY_SOURCE";
}

/// What a key command does to the key
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeyAction {
    #[default]
    Click,
    Press,
    Release,
}

impl KeyAction {
    /// Wire value of the `Cmd` parameter
    pub fn as_str(&self) -> &'static str {
        match self {
            KeyAction::Click => "Click",
            KeyAction::Press => "Press",
            KeyAction::Release => "Release",
        }
    }
}

impl fmt::Display for KeyAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the TV should start an application
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum LaunchKind {
    #[default]
    #[serde(rename = "DEEP_LINK")]
    DeepLink,
    #[serde(rename = "NATIVE_LAUNCH")]
    NativeLaunch,
}

impl LaunchKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            LaunchKind::DeepLink => "DEEP_LINK",
            LaunchKind::NativeLaunch => "NATIVE_LAUNCH",
        }
    }
}

impl FromStr for LaunchKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().replace('-', "_").as_str() {
            "" | "DEEP_LINK" => Ok(LaunchKind::DeepLink),
            "NATIVE_LAUNCH" => Ok(LaunchKind::NativeLaunch),
            other => Err(format!("unknown launch kind: {}", other)),
        }
    }
}

/// The first frame the TV sends on a new connection
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConnectAck {
    #[serde(default)]
    pub event: String,
    #[serde(default)]
    pub data: ConnectData,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConnectData {
    #[serde(default)]
    pub clients: Vec<Value>,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub token: Option<String>,
}

impl ConnectAck {
    /// Token handed out with this acknowledgement.
    ///
    /// Only trusted when the client list is non-empty; TVs that are still
    /// showing the pairing prompt send an empty list.
    pub fn issued_token(&self) -> Option<&str> {
        if self.data.clients.is_empty() {
            return None;
        }
        self.data.token.as_deref().filter(|t| !t.is_empty())
    }

    pub fn is_unauthorized(&self) -> bool {
        self.event == CHANNEL_UNAUTHORIZED
    }
}

/// Reply to the installed-applications request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApplicationsReply {
    pub event: String,
    #[serde(default)]
    pub data: ApplicationsData,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApplicationsData {
    #[serde(default)]
    pub data: Vec<Application>,
}

/// One installed application
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Application {
    #[serde(rename = "appId")]
    pub app_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub app_type: Option<u32>,
    #[serde(default)]
    pub icon: Option<String>,
}

impl ApplicationsReply {
    pub fn applications(&self) -> &[Application] {
        &self.data.data
    }
}

/// A complete request frame
pub fn command(method: &str, params: Value) -> Value {
    json!({ "method": method, "params": params })
}

pub(crate) fn key_params(key: &str, action: KeyAction) -> Value {
    json!({
        "Cmd": action.as_str(),
        "DataOfCmd": key,
        "Option": "false",
        "TypeOfRemote": "SendRemoteKey",
    })
}

pub(crate) fn text_params(text: &str) -> Value {
    json!({
        "Cmd": BASE64.encode(text),
        "DataOfCmd": "base64",
        "TypeOfRemote": "SendInputString",
    })
}

pub(crate) fn cursor_params(x: i32, y: i32, duration: Duration) -> Value {
    json!({
        "Cmd": "Move",
        "TypeOfRemote": "ProcessMouseDevice",
        "Position": {
            "x": x,
            "y": y,
            "Time": duration.as_millis().to_string(),
        },
    })
}

pub(crate) fn installed_apps_params() -> Value {
    json!({ "event": INSTALLED_APPS, "to": "host" })
}

pub(crate) fn launch_params(app_id: &str, kind: LaunchKind, meta_tag: &str) -> Value {
    json!({
        "event": APP_LAUNCH,
        "to": "host",
        "data": {
            "action_type": kind.as_str(),
            "appId": app_id,
            "metaTag": meta_tag,
        },
    })
}
