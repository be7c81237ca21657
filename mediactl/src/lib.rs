//! # mediactl - control TVs and network speakers
//!
//! Sync-first API over three channels: the TV's WebSocket remote-control
//! session, UPnP transport control over SOAP, and SSDP discovery.
//!
//! ```rust,no_run
//! use mediactl::{Device, Registry};
//!
//! fn main() -> Result<(), mediactl::DeviceError> {
//!     let mut registry = Registry::load_default()?;
//!     let descriptor = registry
//!         .find("Living Room")
//!         .cloned()
//!         .ok_or_else(|| mediactl::DeviceError::Registry("unknown device".to_string()))?;
//!
//!     let device = Device::new(descriptor)?;
//!     device.power_on()?;
//!     device.init()?;
//!
//!     device.set_volume(20)?;
//!     device.key("KEY_HOME")?;
//!     device.open("https://example.com")?;
//!
//!     // Persist the pairing token and any learned hardware address
//!     if registry.update(device.descriptor()) {
//!         registry.save()?;
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! mediactl (Device, registry, power, logging)
//!     ├── remote-control   (WebSocket session)
//!     ├── transport-control (UPnP operations)
//!     │       └── soap-client
//!     └── device-discovery (descriptors, SSDP)
//! ```

pub use device::{Device, DeviceConfig, DeviceStatus, SpeakerDevice, TvDevice, VOLUME_STEP};
pub use error::{DeviceError, Result};
pub use probe::TvInfo;
pub use registry::Registry;

pub use device_discovery::{discover, discover_all, DeviceDescriptor, DeviceKind, Probe};
pub use remote_control::{keys, Application, CancelToken, SessionConfig, WaitOptions};
pub use transport_control::PositionInfo;

mod device;
mod error;
pub mod logging;
pub mod probe;
pub mod registry;
pub mod wol;
