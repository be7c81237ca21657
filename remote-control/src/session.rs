//! The remote-control session

use std::time::{Duration, Instant};

use device_discovery::DeviceDescriptor;
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::config::SessionConfig;
use crate::connection::{self, Connection};
use crate::error::{Result, SessionError};
use crate::messages::{self, ApplicationsReply, ConnectAck, KeyAction, LaunchKind};
use crate::wait::{WaitClock, WaitOptions};

/// Read timeout used while waiting for an event, so deadline and cancel are polled
const WAIT_POLL: Duration = Duration::from_millis(100);

/// Floor for a dial attempt cut short by the deadline; zero is rejected by connect
const MIN_DIAL_TIMEOUT: Duration = Duration::from_millis(10);

/// A persistent remote-control channel to one TV.
///
/// The channel is a single ordered stream with no message ids, so a reply is
/// matched to its request by order alone. One mutex around the connection
/// handle is the exchange guard: request/reply exchanges hold it across the
/// write and the read, fire-and-forget commands only for the write.
///
/// The handle is either absent or usable. Any send or receive failure drops
/// it before the error is returned, and the next command fails with
/// [`SessionError::Connection`] until [`open`](Self::open) is called again.
pub struct RemoteSession {
    descriptor: DeviceDescriptor,
    token: Mutex<Option<String>>,
    config: SessionConfig,
    connection: Mutex<Option<Connection>>,
}

impl RemoteSession {
    pub fn new(descriptor: DeviceDescriptor, config: SessionConfig) -> Self {
        let token = descriptor.token.clone().filter(|t| !t.is_empty());
        Self {
            descriptor,
            token: Mutex::new(token),
            config,
            connection: Mutex::new(None),
        }
    }

    /// The descriptor this session was built from, with the current token
    pub fn descriptor(&self) -> DeviceDescriptor {
        DeviceDescriptor {
            token: self.token(),
            ..self.descriptor.clone()
        }
    }

    pub fn token(&self) -> Option<String> {
        self.token.lock().clone()
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn is_connected(&self) -> bool {
        self.connection.lock().is_some()
    }

    fn url(&self) -> String {
        self.config
            .endpoint_url(&self.descriptor.ip, self.token.lock().as_deref())
    }

    fn dial(&self, timeout: Duration) -> Result<Connection> {
        connection::dial(&self.url(), &self.descriptor.ip, self.config.port, timeout)
    }

    /// Connect, replacing any previous connection, and read the acknowledgement.
    ///
    /// Returns the new token when the device issued one that differs from the
    /// token already held; the caller should persist it.
    pub fn open(&self) -> Result<Option<String>> {
        let mut guard = self.connection.lock();
        if let Some(previous) = guard.take() {
            tracing::debug!(ip = %self.descriptor.ip, "closing previous connection");
            connection::shutdown(previous);
        }
        self.connect(&mut guard)
    }

    /// Open the channel unless it already is; an existing connection is kept.
    ///
    /// The check and the connect happen under the exchange guard, so
    /// concurrent callers share one connection.
    pub fn ensure_open(&self) -> Result<Option<String>> {
        let mut guard = self.connection.lock();
        if guard.is_some() {
            return Ok(None);
        }
        self.connect(&mut guard)
    }

    fn connect(&self, slot: &mut Option<Connection>) -> Result<Option<String>> {
        let mut socket = self.dial(self.config.connect_timeout)?;
        let frame = connection::read_text(&mut socket)?;
        tracing::debug!(frame = %frame, "connect acknowledgement");

        let ack: ConnectAck = serde_json::from_str(&frame)?;
        if ack.is_unauthorized() {
            connection::shutdown(socket);
            return Err(SessionError::Protocol(format!(
                "{} refused the connection",
                self.descriptor.name
            )));
        }

        connection::set_read_timeout(&socket, Some(self.config.reply_timeout))?;
        *slot = Some(socket);

        let mut token = self.token.lock();
        let changed = match ack.issued_token() {
            Some(issued) if token.as_deref() != Some(issued) => {
                *token = Some(issued.to_string());
                Some(issued.to_string())
            }
            _ => None,
        };

        tracing::info!(
            name = %self.descriptor.name,
            ip = %self.descriptor.ip,
            new_token = changed.is_some(),
            "remote-control session open"
        );
        Ok(changed)
    }

    /// Drop the connection, sending a close frame if possible
    pub fn close(&self) {
        if let Some(socket) = self.connection.lock().take() {
            connection::shutdown(socket);
            tracing::debug!(ip = %self.descriptor.ip, "remote-control session closed");
        }
    }

    /// Run `f` on the open connection; on failure the connection is dropped
    fn with_connection<T>(
        guard: &mut Option<Connection>,
        f: impl FnOnce(&mut Connection) -> tungstenite::Result<T>,
    ) -> Result<T> {
        let socket = guard
            .as_mut()
            .ok_or_else(|| SessionError::Connection("session is not open".to_string()))?;

        match f(socket) {
            Ok(value) => Ok(value),
            Err(e) => {
                *guard = None;
                Err(SessionError::from(e))
            }
        }
    }

    /// Send a request and decode exactly one reply
    pub fn send_command<T: DeserializeOwned>(&self, method: &str, params: Value) -> Result<T> {
        let frame = messages::command(method, params).to_string();
        tracing::debug!(%method, "exchange");

        let mut guard = self.connection.lock();
        let reply = Self::with_connection(&mut guard, |socket| {
            connection::write_text(socket, frame)?;
            connection::read_text(socket)
        })?;
        drop(guard);

        Ok(serde_json::from_str(&reply)?)
    }

    /// Send a request without reading a reply
    pub fn emit(&self, method: &str, params: Value) -> Result<()> {
        let frame = messages::command(method, params).to_string();
        let mut guard = self.connection.lock();
        Self::with_connection(&mut guard, |socket| connection::write_text(socket, frame))
    }

    /// Send `repeat` key commands, pausing the key-press delay after each
    pub fn send_key(&self, key: &str, repeat: usize, action: KeyAction) -> Result<()> {
        tracing::debug!(key, repeat, %action, "sending key");
        for _ in 0..repeat {
            self.emit(messages::REMOTE_CONTROL, messages::key_params(key, action))?;
            std::thread::sleep(self.config.key_press_delay);
        }
        Ok(())
    }

    pub fn send_click(&self, key: &str) -> Result<()> {
        self.send_key(key, 1, KeyAction::Click)
    }

    /// Press `key`, keep it down for `duration`, release it
    pub fn hold_key(&self, key: &str, duration: Duration) -> Result<()> {
        self.send_key(key, 1, KeyAction::Press)?;
        std::thread::sleep(duration);
        self.send_key(key, 1, KeyAction::Release)
    }

    /// Type text into the focused input field
    pub fn send_text(&self, text: &str) -> Result<()> {
        tracing::debug!(chars = text.chars().count(), "sending text");
        self.emit(messages::REMOTE_CONTROL, messages::text_params(text))
    }

    /// Move the pointer to `x`, `y` over `duration`
    pub fn move_cursor(&self, x: i32, y: i32, duration: Duration) -> Result<()> {
        self.emit(messages::REMOTE_CONTROL, messages::cursor_params(x, y, duration))
    }

    /// Click one `KEY_<digit>` per character of `number`, then enter
    pub fn change_channel(&self, number: &str) -> Result<()> {
        for digit in number.chars().filter(|c| !c.is_whitespace()) {
            self.send_click(&format!("KEY_{}", digit.to_ascii_uppercase()))?;
        }
        self.send_click(messages::keys::ENTER)
    }

    /// Request the installed applications.
    ///
    /// Events that arrive before the reply are skipped, up to the configured
    /// maximum; past that the exchange fails with a protocol error.
    pub fn list_applications(&self) -> Result<ApplicationsReply> {
        let frame = messages::command(messages::CHANNEL_EMIT, messages::installed_apps_params()).to_string();
        let limit = self.config.max_discarded_frames;

        let mut guard = self.connection.lock();
        Self::with_connection(&mut guard, |socket| connection::write_text(socket, frame))?;

        for discarded in 0..=limit {
            let text = Self::with_connection(&mut guard, connection::read_text)?;
            let value: Value = serde_json::from_str(&text)?;

            if value.get("event").and_then(Value::as_str) == Some(messages::INSTALLED_APPS) {
                return Ok(serde_json::from_value(value)?);
            }
            tracing::debug!(discarded, frame = %text, "skipping unrelated frame");
        }

        Err(SessionError::Protocol(format!(
            "no {} reply within {} frames",
            messages::INSTALLED_APPS,
            limit
        )))
    }

    /// Ask the TV to start an application
    pub fn launch_application(&self, app_id: &str, kind: LaunchKind, meta_tag: &str) -> Result<()> {
        tracing::info!(app_id, kind = kind.as_str(), "launching application");
        self.emit(
            messages::CHANNEL_EMIT,
            messages::launch_params(app_id, kind, meta_tag),
        )
    }

    /// Open `url` in the built-in browser
    pub fn open_browser(&self, url: &str) -> Result<()> {
        self.launch_application(messages::BROWSER_APP_ID, LaunchKind::NativeLaunch, url)
    }

    /// Block until a frame containing `event` arrives on a fresh connection.
    ///
    /// The dial is retried with exponential backoff until it succeeds or the
    /// options give up, so this can be started before the TV is reachable.
    pub fn wait_for_event(&self, event: &str, options: &WaitOptions) -> Result<()> {
        let mut clock = WaitClock::start(options, event);
        tracing::info!(event, "waiting for event");

        let mut socket = loop {
            clock.check()?;
            // A single attempt must not outlive the deadline
            let timeout = clock
                .remaining()
                .map_or(self.config.connect_timeout, |left| self.config.connect_timeout.min(left))
                .max(MIN_DIAL_TIMEOUT);
            match self.dial(timeout) {
                Ok(socket) => break socket,
                Err(e) => {
                    clock.check()?;
                    tracing::debug!("dial failed, retrying: {}", e);
                    clock.back_off()?;
                }
            }
        };

        connection::set_read_timeout(&socket, Some(WAIT_POLL))?;
        let started = Instant::now();

        let result = loop {
            if let Err(e) = clock.check() {
                break Err(e);
            }
            match connection::read_text(&mut socket) {
                Ok(frame) if frame.contains(event) => {
                    tracing::debug!(event, elapsed = ?started.elapsed(), "event received");
                    break Ok(());
                }
                Ok(frame) => tracing::trace!(frame = %frame, "ignoring frame"),
                Err(e) if connection::is_timeout(&e) => continue,
                Err(e) => break Err(SessionError::from(e)),
            }
        };

        connection::shutdown(socket);
        result
    }
}

impl std::fmt::Debug for RemoteSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteSession")
            .field("ip", &self.descriptor.ip)
            .field("config", &self.config)
            .field("connected", &self.is_connected())
            .finish()
    }
}

impl Drop for RemoteSession {
    fn drop(&mut self) {
        if let Some(socket) = self.connection.get_mut().take() {
            connection::shutdown(socket);
        }
    }
}
