//! Liveness and device information from the TV's REST endpoint

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{DeviceError, Result};

/// Port of the plain REST and WebSocket API
pub const INFO_PORT: u16 = 8001;

/// Timeout of one liveness request
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(3);

/// Device information URL of the TV at `ip`
pub fn info_url(ip: &str) -> String {
    format!("http://{}:{}/api/v2/", ip, INFO_PORT)
}

/// Reply of the device information endpoint; only the fields we read
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TvInfo {
    #[serde(default)]
    pub device: TvInfoDevice,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TvInfoDevice {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub model_name: Option<String>,
    #[serde(default)]
    pub network_type: Option<String>,
    #[serde(default)]
    pub wifi_mac: Option<String>,
    #[serde(default, rename = "PowerState")]
    pub power_state: Option<String>,
}

impl TvInfo {
    /// The Wi-Fi hardware address, when the TV is on a wireless network
    pub fn wireless_mac(&self) -> Option<&str> {
        if self.device.network_type.as_deref() != Some("wireless") {
            return None;
        }
        self.device
            .wifi_mac
            .as_deref()
            .map(str::trim)
            .filter(|mac| !mac.is_empty())
    }
}

/// Blocking client for the info endpoint
#[derive(Debug, Clone)]
pub struct InfoProbe {
    client: reqwest::blocking::Client,
    url: String,
}

impl InfoProbe {
    pub fn new(url: impl Into<String>) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(PROBE_TIMEOUT)
            .build()
            .map_err(|e| DeviceError::Unreachable(e.to_string()))?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Fetch and decode the device information
    pub fn fetch(&self) -> Result<TvInfo> {
        let unreachable = |e: reqwest::Error| {
            tracing::debug!(url = %self.url, "info request failed: {}", e);
            DeviceError::Unreachable(self.url.clone())
        };

        let response = self
            .client
            .get(&self.url)
            .send()
            .and_then(|r| r.error_for_status())
            .map_err(unreachable)?;
        response.json::<TvInfo>().map_err(unreachable)
    }

    /// Whether the endpoint answers at all
    pub fn is_alive(&self) -> bool {
        match self.client.get(&self.url).send() {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                tracing::debug!(url = %self.url, "liveness probe failed: {}", e);
                false
            }
        }
    }
}
