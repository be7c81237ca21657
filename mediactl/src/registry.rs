//! On-disk device registry
//!
//! The registry is a JSON array of [`DeviceDescriptor`] records. It lives at
//! `~/.mediactl.json` unless `MEDIACTL_REGISTRY` names another file.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use device_discovery::DeviceDescriptor;

use crate::error::{DeviceError, Result};

/// Environment variable overriding the registry location
pub const REGISTRY_ENV: &str = "MEDIACTL_REGISTRY";

/// File name of the registry in the home directory
pub const REGISTRY_FILE: &str = ".mediactl.json";

/// Registry location from the environment, else the home directory
pub fn default_path() -> Option<PathBuf> {
    match std::env::var_os(REGISTRY_ENV) {
        Some(path) if !path.is_empty() => Some(PathBuf::from(path)),
        _ => dirs::home_dir().map(|home| home.join(REGISTRY_FILE)),
    }
}

/// The known devices and the file they persist to
#[derive(Debug, Clone)]
pub struct Registry {
    path: PathBuf,
    devices: Vec<DeviceDescriptor>,
}

impl Registry {
    /// Load `path`; a missing file is an empty registry
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let devices = match fs::read_to_string(&path) {
            Ok(text) if text.trim().is_empty() => Vec::new(),
            Ok(text) => serde_json::from_str(&text).map_err(|e| {
                DeviceError::Registry(format!("{} is not a valid registry: {}", path.display(), e))
            })?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(io_error(&path, e)),
        };

        tracing::debug!(path = %path.display(), devices = devices.len(), "registry loaded");
        Ok(Self { path, devices })
    }

    /// Load the registry at [`default_path`]
    pub fn load_default() -> Result<Self> {
        let path = default_path()
            .ok_or_else(|| DeviceError::Registry("cannot determine home directory".to_string()))?;
        Self::load(path)
    }

    /// Write the registry back as pretty-printed JSON
    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| io_error(parent, e))?;
        }

        let json = serde_json::to_string_pretty(&self.devices)
            .map_err(|e| DeviceError::Registry(e.to_string()))?;
        fs::write(&self.path, json).map_err(|e| io_error(&self.path, e))?;

        tracing::debug!(path = %self.path.display(), devices = self.devices.len(), "registry saved");
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn devices(&self) -> &[DeviceDescriptor] {
        &self.devices
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    /// Add discovered devices whose address is new; returns how many were added
    pub fn merge(&mut self, found: impl IntoIterator<Item = DeviceDescriptor>) -> usize {
        device_discovery::merge(&mut self.devices, found)
    }

    /// Replace the record with the same address; returns whether anything changed
    pub fn update(&mut self, descriptor: DeviceDescriptor) -> bool {
        match self.devices.iter_mut().find(|d| d.ip == descriptor.ip) {
            Some(existing) if *existing == descriptor => false,
            Some(existing) => {
                *existing = descriptor;
                true
            }
            None => {
                self.devices.push(descriptor);
                true
            }
        }
    }

    /// Find a device by index, address or name (case-insensitive)
    pub fn find(&self, selector: &str) -> Option<&DeviceDescriptor> {
        let selector = selector.trim();
        if let Ok(index) = selector.parse::<usize>() {
            if let Some(device) = self.devices.get(index) {
                return Some(device);
            }
        }
        self.devices
            .iter()
            .find(|d| d.ip == selector)
            .or_else(|| self.devices.iter().find(|d| d.name.eq_ignore_ascii_case(selector)))
    }
}

fn io_error(path: &Path, error: io::Error) -> DeviceError {
    DeviceError::Registry(format!("{}: {}", path.display(), error))
}
