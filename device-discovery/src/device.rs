//! Device description parsing.
//!
//! Each SSDP reply points at a UPnP description document; this module reads
//! the few fields discovery needs out of it and turns a match into a
//! [`DeviceDescriptor`].

use crate::error::{DiscoveryError, Result};
use crate::{DeviceDescriptor, DeviceKind};
use serde::Deserialize;

/// UPnP device description root element.
#[derive(Debug, Deserialize)]
struct Root {
    device: DeviceDescription,
}

/// The subset of a UPnP `<device>` element that identifies a device.
///
/// Every field is optional; TVs and speakers publish different sets.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceDescription {
    pub device_type: Option<String>,
    pub friendly_name: Option<String>,
    pub manufacturer: Option<String>,
    pub model_name: Option<String>,
    pub room_name: Option<String>,
    #[serde(rename = "MACAddress")]
    pub mac_address: Option<String>,
}

impl DeviceDescription {
    /// Parse a description document.
    ///
    /// # Errors
    ///
    /// Returns `DiscoveryError::ParseError` if the XML is malformed or has no `<device>`.
    pub fn from_xml(xml: &str) -> Result<Self> {
        let root: Root = quick_xml::de::from_str(xml)
            .map_err(|e| DiscoveryError::ParseError(format!("Failed to parse device XML: {}", e)))?;

        Ok(root.device)
    }

    /// Room name when the device has one, friendly name otherwise
    pub fn display_name(&self) -> String {
        non_empty(&self.room_name)
            .or_else(|| non_empty(&self.friendly_name))
            .unwrap_or_default()
            .to_string()
    }

    /// Exact manufacturer match, ignoring surrounding whitespace
    pub fn is_made_by(&self, manufacturer: &str) -> bool {
        self.manufacturer
            .as_deref()
            .map(|m| m.trim() == manufacturer)
            .unwrap_or(false)
    }

    /// Build the registry record for a device found at `ip`
    pub fn to_descriptor(&self, ip: String, kind: DeviceKind) -> DeviceDescriptor {
        let descriptor = DeviceDescriptor::new(self.display_name(), ip, kind);
        match non_empty(&self.mac_address) {
            Some(mac) => descriptor.with_mac(mac.to_lowercase()),
            None => descriptor,
        }
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Host portion of a description URL.
///
/// Returns `None` for anything that is not an absolute URL with a host.
pub fn extract_ip_from_url(url: &str) -> Option<String> {
    let parsed = reqwest::Url::parse(url).ok()?;
    parsed.host_str().map(|host| host.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const TV_XML: &str = r#"<?xml version="1.0"?>
<root xmlns="urn:schemas-upnp-org:device-1-0" xmlns:sec="http://www.sec.co.kr/dlna">
  <specVersion><major>1</major><minor>0</minor></specVersion>
  <device>
    <deviceType>urn:dial-multiscreen-org:device:dialreceiver:1</deviceType>
    <friendlyName>[TV] Samsung Q60 Series (55)</friendlyName>
    <manufacturer>Samsung Electronics</manufacturer>
    <manufacturerURL>http://www.samsung.com/sec</manufacturerURL>
    <modelName>QE55Q60TAUXXU</modelName>
    <UDN>uuid:0ee6b280-00fa-1000-b4aa-f47b5e123456</UDN>
  </device>
</root>"#;

    const SPEAKER_XML: &str = r#"<?xml version="1.0" encoding="utf-8" ?>
<root xmlns="urn:schemas-upnp-org:device-1-0">
  <device>
    <deviceType>urn:schemas-upnp-org:device:ZonePlayer:1</deviceType>
    <friendlyName>192.168.1.30 - Sonos One - RINCON_000E58A0123456</friendlyName>
    <manufacturer>Sonos, Inc.</manufacturer>
    <modelName>Sonos One</modelName>
    <MACAddress>00:0E:58:A0:12:34</MACAddress>
    <roomName>Kitchen</roomName>
    <deviceList><device><deviceType>urn:schemas-upnp-org:device:MediaRenderer:1</deviceType></device></deviceList>
  </device>
</root>"#;

    #[rstest]
    #[case("http://192.168.1.100:1400/xml/device_description.xml", Some("192.168.1.100"))]
    #[case("https://10.0.0.5:8080/path", Some("10.0.0.5"))]
    #[case("http://tv.local/dd.xml", Some("tv.local"))]
    #[case("invalid-url", None)]
    #[case("", None)]
    fn test_extract_ip_from_url(#[case] url: &str, #[case] expected: Option<&str>) {
        assert_eq!(extract_ip_from_url(url), expected.map(String::from));
    }

    #[test]
    fn test_tv_description_uses_friendly_name() {
        let device = DeviceDescription::from_xml(TV_XML).unwrap();

        assert!(device.is_made_by("Samsung Electronics"));
        assert!(!device.is_made_by("Samsung"));
        assert_eq!(device.display_name(), "[TV] Samsung Q60 Series (55)");
        assert_eq!(device.mac_address, None);

        let descriptor = device.to_descriptor("192.168.1.20".to_string(), DeviceKind::Tv);
        assert_eq!(descriptor.ip, "192.168.1.20");
        assert_eq!(descriptor.mac, "");
        assert_eq!(descriptor.kind, DeviceKind::Tv);
    }

    #[test]
    fn test_speaker_description_prefers_room_name() {
        let device = DeviceDescription::from_xml(SPEAKER_XML).unwrap();

        assert!(device.is_made_by("Sonos, Inc."));
        assert_eq!(device.display_name(), "Kitchen");
        assert_eq!(device.model_name.as_deref(), Some("Sonos One"));

        let descriptor = device.to_descriptor("192.168.1.30".to_string(), DeviceKind::Speaker);
        assert_eq!(descriptor.name, "Kitchen");
        assert_eq!(descriptor.mac, "00:0e:58:a0:12:34");
    }

    #[test]
    fn test_blank_room_name_falls_back() {
        let device = DeviceDescription {
            friendly_name: Some("Office".to_string()),
            room_name: Some("  ".to_string()),
            ..Default::default()
        };
        assert_eq!(device.display_name(), "Office");
        assert!(!device.is_made_by("Sonos, Inc."));
    }

    #[test]
    fn test_malformed_description_is_parse_error() {
        let result = DeviceDescription::from_xml("<root><nodevice/></root>");
        assert!(matches!(result, Err(DiscoveryError::ParseError(_))));

        let result = DeviceDescription::from_xml("not xml");
        assert!(matches!(result, Err(DiscoveryError::ParseError(_))));
    }
}
