//! Controllable devices and their capability set

use std::net::SocketAddr;
use std::time::{Duration, Instant};

use device_discovery::{DeviceDescriptor, DeviceKind};
use parking_lot::Mutex;
use remote_control::{keys, Application, LaunchKind, RemoteSession, SessionConfig, WaitOptions, CHANNEL_CONNECT};
use serde::Serialize;
use serde_json::Value;
use transport_control::{PositionInfo, TransportClient};

use crate::error::{DeviceError, Result};
use crate::probe::{self, InfoProbe, TvInfo};
use crate::wol::{self, MagicPacket};

/// Volume change of one `volume_up`/`volume_down` on a speaker
pub const VOLUME_STEP: u8 = 5;

/// Tunables shared by every device built from one configuration
#[derive(Debug, Clone)]
pub struct DeviceConfig {
    pub session: SessionConfig,
    /// How long `power_on` waits for a woken TV to answer
    pub power_on_timeout: Duration,
    /// Pause between liveness probes while waiting
    pub poll_interval: Duration,
    /// Deadline of the connect event `init` waits for
    pub init_timeout: Duration,
    /// Where wake packets go
    pub wake_target: SocketAddr,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            session: SessionConfig::default(),
            power_on_timeout: Duration::from_secs(30),
            poll_interval: Duration::from_millis(500),
            init_timeout: Duration::from_secs(30),
            wake_target: SocketAddr::V4(wol::BROADCAST),
        }
    }
}

impl DeviceConfig {
    pub fn with_session(mut self, session: SessionConfig) -> Self {
        self.session = session;
        self
    }

    pub fn with_power_on_timeout(mut self, timeout: Duration) -> Self {
        self.power_on_timeout = timeout;
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn with_init_timeout(mut self, timeout: Duration) -> Self {
        self.init_timeout = timeout;
        self
    }

    pub fn with_wake_target(mut self, target: SocketAddr) -> Self {
        self.wake_target = target;
        self
    }
}

/// Transport state and position, as reported by `status`
#[derive(Debug, Clone, Serialize)]
pub struct DeviceStatus {
    pub transport: Value,
    pub position: PositionInfo,
}

/// A TV: remote-control session plus transport control
pub struct TvDevice {
    session: RemoteSession,
    transport: TransportClient,
    probe: InfoProbe,
    mac: Mutex<String>,
    config: DeviceConfig,
}

impl TvDevice {
    pub fn new(descriptor: DeviceDescriptor, config: DeviceConfig) -> Result<Self> {
        let probe = InfoProbe::new(probe::info_url(&descriptor.ip))?;
        let transport = TransportClient::for_device(&descriptor);
        let mac = Mutex::new(descriptor.mac.clone());
        let session = RemoteSession::new(descriptor, config.session.clone());

        Ok(Self {
            session,
            transport,
            probe,
            mac,
            config,
        })
    }

    /// Replace the transport client, e.g. to reach a different control endpoint
    pub fn with_transport(mut self, transport: TransportClient) -> Self {
        self.transport = transport;
        self
    }

    /// Replace the device information URL used for liveness and mac learning
    pub fn with_info_url(mut self, url: impl Into<String>) -> Result<Self> {
        self.probe = InfoProbe::new(url)?;
        Ok(self)
    }

    pub fn session(&self) -> &RemoteSession {
        &self.session
    }

    pub fn transport(&self) -> &TransportClient {
        &self.transport
    }

    /// Current descriptor, carrying any token or mac learned since creation
    pub fn descriptor(&self) -> DeviceDescriptor {
        DeviceDescriptor {
            mac: self.mac.lock().clone(),
            ..self.session.descriptor()
        }
    }

    pub fn is_alive(&self) -> bool {
        self.probe.is_alive()
    }

    /// Model, network and power details reported by the TV
    pub fn info(&self) -> Result<TvInfo> {
        self.probe.fetch()
    }

    /// The open session, connecting first if needed
    fn remote(&self) -> Result<&RemoteSession> {
        if let Some(token) = self.session.ensure_open()? {
            tracing::info!(ip = %self.session.descriptor().ip, "device issued a new token");
            tracing::debug!(%token, "new token");
        }
        Ok(&self.session)
    }

    /// Turn the TV on.
    ///
    /// A TV in standby still answers the info endpoint but fails volume
    /// queries; it gets a power key. A TV that does not answer at all is
    /// woken over the network and polled until it answers or the timeout
    /// passes.
    pub fn power_on(&self) -> Result<()> {
        if self.is_alive() {
            if let Err(e) = self.transport.get_volume() {
                tracing::info!("TV answers but reports no volume ({}), sending power key", e);
                self.remote()?.send_click(keys::POWER)?;
            }
            return Ok(());
        }

        let mac = self.mac.lock().clone();
        if mac.is_empty() {
            return Err(DeviceError::WakeOnLan(
                "no hardware address known for this device".to_string(),
            ));
        }
        tracing::info!(%mac, "waking TV");
        MagicPacket::parse(&mac)?.send_to(self.config.wake_target)?;

        let deadline = Instant::now() + self.config.power_on_timeout;
        while Instant::now() < deadline {
            std::thread::sleep(self.config.poll_interval);
            if self.is_alive() {
                tracing::info!("TV is up");
                return Ok(());
            }
        }

        Err(DeviceError::Unreachable(self.session.descriptor().ip))
    }

    pub fn power_off(&self) -> Result<()> {
        self.remote()?.send_click(keys::POWER)?;
        Ok(())
    }

    /// Connect, wait until the TV confirms the channel, learn the hardware address.
    ///
    /// Returns the new token when the TV issued one.
    pub fn init(&self) -> Result<Option<String>> {
        let token = self.session.open()?;
        self.session.wait_for_event(
            CHANNEL_CONNECT,
            &WaitOptions::new().with_deadline(self.config.init_timeout),
        )?;

        if self.mac.lock().is_empty() {
            match self.probe.fetch() {
                Ok(info) => {
                    if let Some(mac) = info.wireless_mac() {
                        tracing::info!(%mac, "learned hardware address");
                        *self.mac.lock() = mac.to_string();
                    }
                }
                Err(e) => tracing::warn!("could not read device information: {}", e),
            }
        }

        Ok(token)
    }

    pub fn key(&self, key: &str) -> Result<()> {
        Ok(self.remote()?.send_click(key)?)
    }

    pub fn text(&self, text: &str) -> Result<()> {
        Ok(self.remote()?.send_text(text)?)
    }

    /// Open a web page in the browser, or launch an application by id
    pub fn open(&self, target: &str) -> Result<()> {
        let remote = self.remote()?;
        if target.starts_with("http") {
            remote.open_browser(target)?;
        } else {
            remote.launch_application(target, LaunchKind::DeepLink, "")?;
        }
        Ok(())
    }

    pub fn list_apps(&self) -> Result<Vec<Application>> {
        let reply = self.remote()?.list_applications()?;
        Ok(reply.applications().to_vec())
    }

    pub fn volume_up(&self) -> Result<()> {
        self.key(keys::VOLUME_UP)
    }

    pub fn volume_down(&self) -> Result<()> {
        self.key(keys::VOLUME_DOWN)
    }
}

impl std::fmt::Debug for TvDevice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TvDevice")
            .field("session", &self.session)
            .field("info_url", &self.probe.url())
            .finish_non_exhaustive()
    }
}

/// A network speaker: transport control only
#[derive(Debug, Clone)]
pub struct SpeakerDevice {
    descriptor: DeviceDescriptor,
    transport: TransportClient,
}

impl SpeakerDevice {
    pub fn new(descriptor: DeviceDescriptor) -> Self {
        let transport = TransportClient::for_device(&descriptor);
        Self {
            descriptor,
            transport,
        }
    }

    pub fn with_transport(mut self, transport: TransportClient) -> Self {
        self.transport = transport;
        self
    }

    pub fn descriptor(&self) -> DeviceDescriptor {
        self.descriptor.clone()
    }

    pub fn transport(&self) -> &TransportClient {
        &self.transport
    }

    /// Step the volume by `delta`, clamped to 0..=100
    fn step_volume(&self, delta: i16) -> Result<u8> {
        let current = self.transport.get_volume()?;
        let target = (i16::from(current) + delta).clamp(0, 100) as u8;
        if target != current {
            self.transport.set_volume(target)?;
        }
        Ok(target)
    }
}

/// One controllable device
#[derive(Debug)]
pub enum Device {
    Tv(TvDevice),
    Speaker(SpeakerDevice),
}

impl Device {
    /// Build the device for a descriptor with default settings
    pub fn new(descriptor: DeviceDescriptor) -> Result<Self> {
        Self::with_config(descriptor, DeviceConfig::default())
    }

    pub fn with_config(descriptor: DeviceDescriptor, config: DeviceConfig) -> Result<Self> {
        Ok(match descriptor.kind {
            DeviceKind::Tv => Device::Tv(TvDevice::new(descriptor, config)?),
            DeviceKind::Speaker => Device::Speaker(SpeakerDevice::new(descriptor)),
        })
    }

    pub fn kind(&self) -> DeviceKind {
        match self {
            Device::Tv(_) => DeviceKind::Tv,
            Device::Speaker(_) => DeviceKind::Speaker,
        }
    }

    pub fn descriptor(&self) -> DeviceDescriptor {
        match self {
            Device::Tv(tv) => tv.descriptor(),
            Device::Speaker(speaker) => speaker.descriptor(),
        }
    }

    /// Token to persist; speakers never have one
    pub fn token(&self) -> Option<String> {
        match self {
            Device::Tv(tv) => tv.session().token(),
            Device::Speaker(_) => None,
        }
    }

    pub fn transport(&self) -> &TransportClient {
        match self {
            Device::Tv(tv) => tv.transport(),
            Device::Speaker(speaker) => speaker.transport(),
        }
    }

    fn tv(&self, operation: &'static str) -> Result<&TvDevice> {
        match self {
            Device::Tv(tv) => Ok(tv),
            Device::Speaker(_) => Err(DeviceError::Unsupported {
                kind: DeviceKind::Speaker,
                operation,
            }),
        }
    }

    // Power

    pub fn power_on(&self) -> Result<()> {
        self.tv("power_on")?.power_on()
    }

    pub fn power_off(&self) -> Result<()> {
        self.tv("power_off")?.power_off()
    }

    // Volume

    pub fn volume(&self) -> Result<u8> {
        Ok(self.transport().get_volume()?)
    }

    pub fn set_volume(&self, volume: u8) -> Result<()> {
        Ok(self.transport().set_volume(volume)?)
    }

    pub fn volume_up(&self) -> Result<()> {
        match self {
            Device::Tv(tv) => tv.volume_up(),
            Device::Speaker(speaker) => speaker.step_volume(i16::from(VOLUME_STEP)).map(drop),
        }
    }

    pub fn volume_down(&self) -> Result<()> {
        match self {
            Device::Tv(tv) => tv.volume_down(),
            Device::Speaker(speaker) => speaker.step_volume(-i16::from(VOLUME_STEP)).map(drop),
        }
    }

    pub fn mute(&self) -> Result<bool> {
        Ok(self.transport().get_mute()?)
    }

    pub fn set_mute(&self, mute: bool) -> Result<()> {
        Ok(self.transport().set_mute(mute)?)
    }

    // Transport

    pub fn play(&self) -> Result<()> {
        Ok(self.transport().play()?)
    }

    pub fn pause(&self) -> Result<()> {
        Ok(self.transport().pause()?)
    }

    pub fn stop(&self) -> Result<()> {
        Ok(self.transport().stop()?)
    }

    pub fn next(&self) -> Result<()> {
        Ok(self.transport().next()?)
    }

    pub fn previous(&self) -> Result<()> {
        Ok(self.transport().previous()?)
    }

    /// Load `url` as the current media and start playing it
    pub fn stream(&self, url: &str) -> Result<()> {
        Ok(self.transport().set_current_media(url)?)
    }

    pub fn status(&self) -> Result<DeviceStatus> {
        let transport = self.transport();
        Ok(DeviceStatus {
            transport: transport.get_transport_state()?,
            position: transport.get_position_info()?,
        })
    }

    // Remote input

    pub fn init(&self) -> Result<Option<String>> {
        self.tv("init")?.init()
    }

    pub fn key(&self, key: &str) -> Result<()> {
        self.tv("key")?.key(key)
    }

    pub fn text(&self, text: &str) -> Result<()> {
        self.tv("text")?.text(text)
    }

    pub fn open(&self, target: &str) -> Result<()> {
        self.tv("open")?.open(target)
    }

    pub fn list_apps(&self) -> Result<Vec<Application>> {
        self.tv("list_apps")?.list_apps()
    }

    pub fn info(&self) -> Result<TvInfo> {
        self.tv("info")?.info()
    }
}
