//! Core discovery logic and iterator implementation.
//!
//! A discovery run:
//! 1. Sends one SSDP M-SEARCH for the probe's search target
//! 2. Keeps replies whose `ST` equals that target
//! 3. Fetches each device description once per location
//! 4. Yields a [`DeviceDescriptor`] when the manufacturer matches

use std::collections::HashSet;
use std::time::Duration;
use crate::error::{DiscoveryError, Result};
use crate::ssdp::{SsdpClient, SsdpResponse};
use crate::device::{extract_ip_from_url, DeviceDescription};
use crate::{DeviceDescriptor, DeviceKind};

/// What to search for and how to recognise a match
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Probe {
    /// SSDP search target; replies with any other `ST` are dropped
    pub search_target: String,
    /// Required `<manufacturer>` of the description document
    pub manufacturer: String,
    /// Kind recorded on every matching descriptor
    pub kind: DeviceKind,
}

impl Probe {
    pub fn new(search_target: impl Into<String>, manufacturer: impl Into<String>, kind: DeviceKind) -> Self {
        Self {
            search_target: search_target.into(),
            manufacturer: manufacturer.into(),
            kind,
        }
    }

    /// DIAL receivers made by Samsung
    pub fn tv() -> Self {
        Self::new("urn:dial-multiscreen-org:service:dial:1", "Samsung Electronics", DeviceKind::Tv)
    }

    /// Zone players made by Sonos
    pub fn speaker() -> Self {
        Self::new("urn:schemas-upnp-org:device:ZonePlayer:1", "Sonos, Inc.", DeviceKind::Speaker)
    }

    /// Probe matching a device class
    pub fn for_kind(kind: DeviceKind) -> Self {
        match kind {
            DeviceKind::Tv => Self::tv(),
            DeviceKind::Speaker => Self::speaker(),
        }
    }
}

/// Iterator over the devices answering one probe.
///
/// The SSDP window is drained on the first call to `next`; descriptions are
/// then fetched lazily, one per yielded device. Devices whose description
/// cannot be fetched or parsed are skipped with a debug log.
///
/// # Examples
///
/// ```no_run
/// use device_discovery::{DiscoveryIterator, Probe};
/// use std::time::Duration;
///
/// let iter = DiscoveryIterator::new(Probe::tv(), Duration::from_secs(5))?;
/// for device in iter.take(1) {
///     println!("First TV: {}", device.name);
/// }
/// # Ok::<(), device_discovery::DiscoveryError>(())
/// ```
pub struct DiscoveryIterator {
    probe: Probe,
    ssdp_client: Option<SsdpClient>,
    ssdp_buffer: Vec<SsdpResponse>,
    buffer_index: usize,
    seen_locations: HashSet<String>,
    http_client: reqwest::blocking::Client,
}

impl DiscoveryIterator {
    /// Create a discovery iterator; `timeout` bounds both the SSDP window and each description fetch
    pub fn new(probe: Probe, timeout: Duration) -> Result<Self> {
        let ssdp_client = SsdpClient::new(timeout)?;
        let http_client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DiscoveryError::NetworkError(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self::with_parts(probe, Some(ssdp_client), Vec::new(), http_client))
    }

    fn with_parts(
        probe: Probe,
        ssdp_client: Option<SsdpClient>,
        ssdp_buffer: Vec<SsdpResponse>,
        http_client: reqwest::blocking::Client,
    ) -> Self {
        Self {
            probe,
            ssdp_client,
            ssdp_buffer,
            buffer_index: 0,
            seen_locations: HashSet::new(),
            http_client,
        }
    }

    fn fetch_device_description(&self, location: &str) -> Result<DeviceDescription> {
        let response = self.http_client
            .get(location)
            .send()
            .map_err(|e| DiscoveryError::NetworkError(format!("Failed to fetch device description: {}", e)))?;

        let xml = response
            .text()
            .map_err(|e| DiscoveryError::NetworkError(format!("Failed to read response body: {}", e)))?;

        DeviceDescription::from_xml(&xml)
    }

    fn fill_buffer(&mut self) {
        if let Some(client) = self.ssdp_client.take() {
            match client.search(&self.probe.search_target) {
                Ok(iter) => {
                    for result in iter {
                        match result {
                            Ok(response) => self.ssdp_buffer.push(response),
                            Err(e) => tracing::warn!("SSDP receive failed: {}", e),
                        }
                    }
                }
                Err(e) => tracing::warn!("SSDP search failed: {}", e),
            }
        }
    }

    /// Turn one reply into a descriptor, or `None` if it does not match the probe
    fn resolve(&self, response: &SsdpResponse) -> Option<DeviceDescriptor> {
        if response.search_target != self.probe.search_target {
            return None;
        }

        let ip = extract_ip_from_url(&response.location)?;

        let description = match self.fetch_device_description(&response.location) {
            Ok(description) => description,
            Err(e) => {
                tracing::debug!(location = %response.location, "skipping device: {}", e);
                return None;
            }
        };

        if !description.is_made_by(&self.probe.manufacturer) {
            tracing::debug!(
                location = %response.location,
                manufacturer = ?description.manufacturer,
                "manufacturer does not match probe"
            );
            return None;
        }

        Some(description.to_descriptor(ip, self.probe.kind))
    }
}

impl Iterator for DiscoveryIterator {
    type Item = DeviceDescriptor;

    fn next(&mut self) -> Option<Self::Item> {
        self.fill_buffer();

        while self.buffer_index < self.ssdp_buffer.len() {
            let index = self.buffer_index;
            self.buffer_index += 1;

            if !self.seen_locations.insert(self.ssdp_buffer[index].location.clone()) {
                continue;
            }

            if let Some(device) = self.resolve(&self.ssdp_buffer[index]) {
                tracing::info!(name = %device.name, ip = %device.ip, kind = %device.kind, "device found");
                return Some(device);
            }
        }
        None
    }
}
