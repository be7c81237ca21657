//! WebSocket remote-control session for smart TVs
//!
//! A [`RemoteSession`] keeps one persistent channel to a TV and sends key
//! presses, text input, pointer moves and application launches over it. The
//! session captures the pairing token the TV issues on first connect; the
//! caller persists it so later sessions skip the on-screen prompt.
//!
//! ```no_run
//! use device_discovery::{DeviceDescriptor, DeviceKind};
//! use remote_control::{keys, RemoteSession, SessionConfig, WaitOptions};
//! use std::time::Duration;
//!
//! let tv = DeviceDescriptor::new("Living Room", "192.168.1.20", DeviceKind::Tv);
//! let session = RemoteSession::new(tv, SessionConfig::default());
//!
//! if let Some(token) = session.open()? {
//!     println!("paired, token {}", token);
//! }
//! session.send_click(keys::VOLUME_UP)?;
//! session.send_text("hello")?;
//!
//! for app in session.list_applications()?.applications() {
//!     println!("{} {}", app.app_id, app.name);
//! }
//!
//! session.wait_for_event(
//!     "ms.channel.connect",
//!     &WaitOptions::new().with_deadline(Duration::from_secs(30)),
//! )?;
//! # Ok::<(), remote_control::SessionError>(())
//! ```

mod config;
mod connection;
mod error;
mod messages;
mod session;
mod wait;

pub use config::{SessionConfig, PLAIN_PORT, REMOTE_CHANNEL, SECURE_PORT};
pub use error::{Result, SessionError};
pub use messages::{
    command, keys, Application, ApplicationsData, ApplicationsReply, ConnectAck, ConnectData,
    KeyAction, LaunchKind, BROWSER_APP_ID, CHANNEL_CONNECT, INSTALLED_APPS,
};
pub use session::RemoteSession;
pub use wait::{CancelToken, WaitOptions};
