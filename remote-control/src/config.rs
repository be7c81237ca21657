//! Session configuration

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use std::time::Duration;

/// Port of the TLS remote-control endpoint
pub const SECURE_PORT: u16 = 8002;

/// Port of the plain remote-control endpoint
pub const PLAIN_PORT: u16 = 8001;

/// Remote-control channel every TV exposes
pub const REMOTE_CHANNEL: &str = "samsung.remote.control";

/// How a [`crate::RemoteSession`] reaches its device and paces commands
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Client name shown on the TV's pairing prompt
    pub name: String,
    pub port: u16,
    /// Use `wss://` and always send the token parameter
    pub secure: bool,
    /// Pause after every key command
    pub key_press_delay: Duration,
    /// Bound on TCP connect, handshake and the connect acknowledgement
    pub connect_timeout: Duration,
    /// Bound on reading the reply of a request/response exchange
    pub reply_timeout: Duration,
    /// Unrelated frames `list_applications` skips before giving up
    pub max_discarded_frames: usize,
    pub channel: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            name: "mediactl".to_string(),
            port: SECURE_PORT,
            secure: true,
            key_press_delay: Duration::from_millis(1),
            connect_timeout: Duration::from_secs(5),
            reply_timeout: Duration::from_secs(10),
            max_discarded_frames: 64,
            channel: REMOTE_CHANNEL.to_string(),
        }
    }
}

impl SessionConfig {
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    pub fn with_key_press_delay(mut self, delay: Duration) -> Self {
        self.key_press_delay = delay;
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn with_reply_timeout(mut self, timeout: Duration) -> Self {
        self.reply_timeout = timeout;
        self
    }

    pub fn with_max_discarded_frames(mut self, frames: usize) -> Self {
        self.max_discarded_frames = frames;
        self
    }

    /// Plain `ws://` on port 8001, no token parameter unless one is known
    pub fn plain() -> Self {
        Self::default().with_port(PLAIN_PORT).with_secure(false)
    }

    /// WebSocket URL of the configured channel on `ip`.
    ///
    /// The client name travels base64-encoded. The secure endpoint always
    /// gets a `token` parameter, empty before pairing; the plain one only
    /// when a token is known.
    pub fn endpoint_url(&self, ip: &str, token: Option<&str>) -> String {
        let scheme = if self.secure { "wss" } else { "ws" };
        let mut url = format!(
            "{}://{}:{}/api/v2/channels/{}?name={}",
            scheme,
            ip,
            self.port,
            self.channel,
            BASE64.encode(&self.name)
        );

        let token = token.filter(|t| !t.is_empty());
        if self.secure || token.is_some() {
            url.push_str("&token=");
            url.push_str(token.unwrap_or_default());
        }
        url
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_defaults() {
        let config = SessionConfig::default();
        assert_eq!(config.port, 8002);
        assert!(config.secure);
        assert_eq!(config.key_press_delay, Duration::from_millis(1));
        assert_eq!(config.max_discarded_frames, 64);
    }

    #[rstest]
    #[case(SessionConfig::default(), None, "wss://10.0.0.2:8002/api/v2/channels/samsung.remote.control?name=bWVkaWFjdGw=&token=")]
    #[case(SessionConfig::default(), Some("1234"), "wss://10.0.0.2:8002/api/v2/channels/samsung.remote.control?name=bWVkaWFjdGw=&token=1234")]
    #[case(SessionConfig::plain(), None, "ws://10.0.0.2:8001/api/v2/channels/samsung.remote.control?name=bWVkaWFjdGw=")]
    #[case(SessionConfig::plain(), Some(""), "ws://10.0.0.2:8001/api/v2/channels/samsung.remote.control?name=bWVkaWFjdGw=")]
    #[case(SessionConfig::plain(), Some("1234"), "ws://10.0.0.2:8001/api/v2/channels/samsung.remote.control?name=bWVkaWFjdGw=&token=1234")]
    fn test_endpoint_url(
        #[case] config: SessionConfig,
        #[case] token: Option<&str>,
        #[case] expected: &str,
    ) {
        assert_eq!(config.endpoint_url("10.0.0.2", token), expected);
    }

    #[test]
    fn test_name_is_base64() {
        let url = SessionConfig::default()
            .with_name("Living Room Remote")
            .endpoint_url("tv", None);
        assert!(url.contains("?name=TGl2aW5nIFJvb20gUmVtb3Rl&"));
    }
}
