use device_discovery::{DeviceDescriptor, DeviceKind};
use std::fmt;
use std::sync::Arc;

/// The UPnP services used for transport control
///
/// Both device classes expose the same two services; only the control URL
/// differs (see [`Resolver`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Service {
    /// RenderingControl service - volume and mute
    RenderingControl,

    /// AVTransport service - media URI, play/pause/stop, track position
    AVTransport,
}

impl Service {
    /// Get the name of this service as a string
    pub fn name(&self) -> &'static str {
        match self {
            Service::RenderingControl => "RenderingControl",
            Service::AVTransport => "AVTransport",
        }
    }

    /// The UPnP service URN used in SOAP requests
    pub fn urn(&self) -> String {
        soap_client::envelope::service_urn(self.name())
    }
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Maps a service to its full control URL on one device
#[derive(Clone)]
pub struct Resolver(Arc<dyn Fn(Service) -> String + Send + Sync>);

impl Resolver {
    /// Wrap any closure; used to point the client at a mock server
    pub fn custom(resolve: impl Fn(Service) -> String + Send + Sync + 'static) -> Self {
        Self(Arc::new(resolve))
    }

    /// TV-class devices: `http://<ip>:9197/upnp/control/<Service>1`
    pub fn tv(ip: impl Into<String>) -> Self {
        let ip = ip.into();
        Self::custom(move |service| {
            format!("http://{}:9197/upnp/control/{}1", ip, service.name())
        })
    }

    /// Speaker-class devices: `http://<ip>:1400/MediaRenderer/<Service>/Control`
    pub fn speaker(ip: impl Into<String>) -> Self {
        let ip = ip.into();
        Self::custom(move |service| {
            format!("http://{}:1400/MediaRenderer/{}/Control", ip, service.name())
        })
    }

    /// Resolver matching the descriptor's device class
    pub fn for_device(device: &DeviceDescriptor) -> Self {
        match device.kind {
            DeviceKind::Tv => Self::tv(device.ip.as_str()),
            DeviceKind::Speaker => Self::speaker(device.ip.as_str()),
        }
    }

    pub fn resolve(&self, service: Service) -> String {
        (self.0)(service)
    }
}

impl fmt::Debug for Resolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resolver").finish_non_exhaustive()
    }
}
