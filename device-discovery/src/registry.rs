//! Merging discovery results into a known-device list.

use crate::DeviceDescriptor;

/// Append every `found` device whose ip is not already in `registry`.
///
/// Existing entries are never modified, so stored tokens and hardware
/// addresses survive rediscovery. Returns how many devices were added.
pub fn merge(
    registry: &mut Vec<DeviceDescriptor>,
    found: impl IntoIterator<Item = DeviceDescriptor>,
) -> usize {
    let before = registry.len();
    for device in found {
        if contains_ip(registry, &device.ip) {
            tracing::debug!(ip = %device.ip, "already registered");
            continue;
        }
        registry.push(device);
    }
    registry.len() - before
}

/// Whether a device with this ip is present
pub fn contains_ip(registry: &[DeviceDescriptor], ip: &str) -> bool {
    registry.iter().any(|d| d.ip == ip)
}
