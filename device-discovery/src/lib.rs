//! Device discovery and the shared device descriptor
//!
//! This crate owns [`DeviceDescriptor`], the identity record every other
//! mediactl crate is built around, and the SSDP-based collector that finds
//! TVs and speakers on the local network.
//!
//! # Quick Start
//!
//! ```no_run
//! use device_discovery::{discover, merge, Probe};
//! use std::time::Duration;
//!
//! let mut registry = Vec::new();
//! let found = discover(&Probe::tv(), Duration::from_secs(5));
//! let added = merge(&mut registry, found);
//! println!("{} new device(s)", added);
//! ```
//!
//! # Iterator-based Discovery
//!
//! ```no_run
//! use device_discovery::{DiscoveryIterator, Probe};
//! use std::time::Duration;
//!
//! for device in DiscoveryIterator::new(Probe::speaker(), Duration::from_secs(3))? {
//!     println!("Found {} at {}", device.name, device.ip);
//! }
//! # Ok::<(), device_discovery::DiscoveryError>(())
//! ```

mod error;
mod ssdp;
pub mod device;
mod discovery;
pub mod registry;

pub use error::{DiscoveryError, Result};
pub use discovery::{DiscoveryIterator, Probe};
pub use registry::merge;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Class of a controllable device.
///
/// Serialized with the registry's historical type tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeviceKind {
    /// Smart TV with a WebSocket remote-control channel
    #[serde(rename = "samsungtv")]
    Tv,
    /// Network speaker, transport control only
    #[serde(rename = "sonos")]
    Speaker,
}

impl fmt::Display for DeviceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceKind::Tv => write!(f, "samsungtv"),
            DeviceKind::Speaker => write!(f, "sonos"),
        }
    }
}

/// Identity and address of one controllable device.
///
/// This is also the on-disk registry record, so the field names and the
/// `type` tag match the persisted JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceDescriptor {
    /// Display name (room name for speakers, friendly name otherwise)
    pub name: String,
    /// Hardware address used as the Wake-on-LAN target; empty when unknown
    #[serde(default)]
    pub mac: String,
    /// Network address, unique within a registry
    pub ip: String,
    /// Device class
    #[serde(rename = "type")]
    pub kind: DeviceKind,
    /// Session token issued by the device on pairing
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

impl DeviceDescriptor {
    /// Create a descriptor without a hardware address or token
    pub fn new(name: impl Into<String>, ip: impl Into<String>, kind: DeviceKind) -> Self {
        Self {
            name: name.into(),
            mac: String::new(),
            ip: ip.into(),
            kind,
            token: None,
        }
    }

    /// Builder-style hardware address
    pub fn with_mac(mut self, mac: impl Into<String>) -> Self {
        self.mac = mac.into();
        self
    }

    /// Builder-style session token
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }
}

/// Run one probe and collect every matching device into an owned list.
///
/// Network failures end the probe early and yield whatever was found so far;
/// an empty list is a valid result.
pub fn discover(probe: &Probe, timeout: Duration) -> Vec<DeviceDescriptor> {
    match DiscoveryIterator::new(probe.clone(), timeout) {
        Ok(iter) => iter.collect(),
        Err(e) => {
            tracing::warn!("discovery failed to start: {}", e);
            Vec::new()
        }
    }
}

/// Run several probes in turn and collect the results.
pub fn discover_all(probes: &[Probe], timeout: Duration) -> Vec<DeviceDescriptor> {
    probes
        .iter()
        .flat_map(|probe| discover(probe, timeout))
        .collect()
}
