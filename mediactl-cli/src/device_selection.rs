//! Picking the target device from the registry.

use std::fmt::Write as _;
use thiserror::Error;

use mediactl::{DeviceDescriptor, Registry};

/// Errors that can occur during device selection.
#[derive(Error, Debug)]
pub enum SelectionError {
    /// Nothing in the registry matches the selector
    #[error("No device matches '{selector}'. Known devices:\n{available}")]
    DeviceNotFound { selector: String, available: String },

    /// The registry has no devices at all
    #[error("The registry at {0} is empty; run `mediactl discover` first")]
    EmptyRegistry(String),
}

/// Device selector over a loaded registry.
pub struct DeviceSelector;

impl DeviceSelector {
    /// Select by index, address or name; without a selector, the first device.
    pub fn select(
        registry: &Registry,
        selector: Option<&str>,
    ) -> Result<DeviceDescriptor, SelectionError> {
        if registry.is_empty() {
            return Err(SelectionError::EmptyRegistry(
                registry.path().display().to_string(),
            ));
        }

        let found = match selector {
            Some(selector) => registry.find(selector),
            None => registry.devices().first(),
        };

        found.cloned().ok_or_else(|| SelectionError::DeviceNotFound {
            selector: selector.unwrap_or_default().to_string(),
            available: Self::list_devices(registry.devices()),
        })
    }

    /// One line per device: index, name, address, type, hardware address.
    pub fn list_devices(devices: &[DeviceDescriptor]) -> String {
        let mut out = String::new();
        for (index, device) in devices.iter().enumerate() {
            let mac = if device.mac.is_empty() { "-" } else { &device.mac };
            let paired = if device.token.as_deref().is_some_and(|t| !t.is_empty()) {
                " (paired)"
            } else {
                ""
            };
            let _ = writeln!(
                out,
                "{:>2}  {:<24} {:<15} {:<9} {}{}",
                index,
                device.name,
                device.ip,
                device.kind.to_string(),
                mac,
                paired
            );
        }
        out
    }
}
