//! SSDP (Simple Service Discovery Protocol) client
//!
//! Internal: sends one M-SEARCH to the multicast group and yields the
//! unicast replies until the socket read times out.

use std::net::UdpSocket;
use std::time::Duration;
use crate::error::{DiscoveryError, Result};

/// Multicast group and port every UPnP device listens on.
pub(crate) const SSDP_ADDR: &str = "239.255.255.250:1900";

/// The headers of one M-SEARCH reply that discovery cares about
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct SsdpResponse {
    pub location: String,
    pub search_target: String,
    pub usn: Option<String>,
    pub server: Option<String>,
}

pub(crate) struct SsdpClient {
    socket: UdpSocket,
}

impl SsdpClient {
    pub fn new(timeout: Duration) -> Result<Self> {
        let socket = UdpSocket::bind("0.0.0.0:0")
            .map_err(|e| DiscoveryError::NetworkError(format!("Failed to bind UDP socket: {}", e)))?;

        socket.set_read_timeout(Some(timeout))
            .map_err(|e| DiscoveryError::NetworkError(format!("Failed to set read timeout: {}", e)))?;

        socket.set_multicast_loop_v4(true)
            .map_err(|e| DiscoveryError::NetworkError(format!("Failed to set multicast loop: {}", e)))?;

        Ok(Self { socket })
    }

    /// Send an M-SEARCH for `search_target` and iterate the replies
    pub fn search(&self, search_target: &str) -> Result<SsdpResponseIterator<'_>> {
        self.socket
            .send_to(build_search_request(search_target).as_bytes(), SSDP_ADDR)
            .map_err(|e| DiscoveryError::NetworkError(format!("Failed to send M-SEARCH: {}", e)))?;

        tracing::debug!(search_target, "M-SEARCH sent");
        Ok(SsdpResponseIterator {
            socket: &self.socket,
            buffer: [0; 2048],
            finished: false,
        })
    }
}

pub(crate) fn build_search_request(search_target: &str) -> String {
    format!(
        "M-SEARCH * HTTP/1.1\r\n\
         HOST: {}\r\n\
         MAN: \"ssdp:discover\"\r\n\
         MX: 1\r\n\
         ST: {}\r\n\
         USER-AGENT: mediactl/0.3 UPnP/1.1\r\n\
         \r\n",
        SSDP_ADDR, search_target
    )
}

pub(crate) struct SsdpResponseIterator<'a> {
    socket: &'a UdpSocket,
    buffer: [u8; 2048],
    finished: bool,
}

impl Iterator for SsdpResponseIterator<'_> {
    type Item = Result<SsdpResponse>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.finished {
            match self.socket.recv_from(&mut self.buffer) {
                Ok((size, _)) => {
                    // Non-UTF-8 and header-less datagrams are noise, skip them
                    let parsed = std::str::from_utf8(&self.buffer[..size])
                        .ok()
                        .and_then(parse_ssdp_response);
                    if let Some(response) = parsed {
                        return Some(Ok(response));
                    }
                }
                Err(e)
                    if e.kind() == std::io::ErrorKind::WouldBlock
                        || e.kind() == std::io::ErrorKind::TimedOut =>
                {
                    self.finished = true;
                }
                Err(e) => {
                    self.finished = true;
                    return Some(Err(DiscoveryError::NetworkError(format!("Socket error: {}", e))));
                }
            }
        }
        None
    }
}

/// Parse the reply headers; `LOCATION` and `ST` are required
pub(crate) fn parse_ssdp_response(response: &str) -> Option<SsdpResponse> {
    let mut location = None;
    let mut search_target = None;
    let mut usn = None;
    let mut server = None;

    for (name, value) in response.lines().filter_map(split_header) {
        match name.to_ascii_uppercase().as_str() {
            "LOCATION" => location = Some(value),
            "ST" => search_target = Some(value),
            "USN" => usn = Some(value),
            "SERVER" => server = Some(value),
            _ => {}
        }
    }

    Some(SsdpResponse {
        location: location.filter(|l| !l.is_empty())?,
        search_target: search_target?,
        usn,
        server,
    })
}

/// Split `NAME: value` into its trimmed parts
fn split_header(line: &str) -> Option<(&str, String)> {
    let (name, value) = line.split_once(':')?;
    let name = name.trim();
    if name.is_empty() || name.contains(' ') {
        return None;
    }
    Some((name, value.trim().trim_matches('"').to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_dial_response() {
        let response = "HTTP/1.1 200 OK\r\n\
            CACHE-CONTROL: max-age=1800\r\n\
            LOCATION: http://192.168.1.20:7678/nservice/\r\n\
            ST: urn:dial-multiscreen-org:service:dial:1\r\n\
            USN: uuid:0ee6b280-00fa-1000-b4aa-f47b5e123456::urn:dial-multiscreen-org:service:dial:1\r\n\
            SERVER: SHP, UPnP/1.0, Samsung UPnP SDK/1.0\r\n\
            \r\n";

        let parsed = parse_ssdp_response(response).unwrap();

        assert_eq!(parsed.location, "http://192.168.1.20:7678/nservice/");
        assert_eq!(parsed.search_target, "urn:dial-multiscreen-org:service:dial:1");
        assert!(parsed.usn.unwrap().starts_with("uuid:0ee6b280"));
        assert_eq!(parsed.server.as_deref(), Some("SHP, UPnP/1.0, Samsung UPnP SDK/1.0"));
    }

    #[test]
    fn test_parse_lowercase_headers_without_usn() {
        let response = "HTTP/1.1 200 OK\r\n\
            location: http://192.168.1.30:1400/xml/device_description.xml\r\n\
            st: urn:schemas-upnp-org:device:ZonePlayer:1\r\n\
            \r\n";

        let parsed = parse_ssdp_response(response).unwrap();

        assert_eq!(parsed.location, "http://192.168.1.30:1400/xml/device_description.xml");
        assert_eq!(parsed.search_target, "urn:schemas-upnp-org:device:ZonePlayer:1");
        assert_eq!(parsed.usn, None);
        assert_eq!(parsed.server, None);
    }

    #[test]
    fn test_location_and_st_are_required() {
        assert!(parse_ssdp_response("HTTP/1.1 200 OK\r\nST: upnp:rootdevice\r\n\r\n").is_none());
        assert!(parse_ssdp_response("HTTP/1.1 200 OK\r\nLOCATION: http://x/\r\n\r\n").is_none());
        assert!(parse_ssdp_response("HTTP/1.1 200 OK\r\nLOCATION:\r\nST: a\r\n\r\n").is_none());
        assert!(parse_ssdp_response("").is_none());
    }

    #[test]
    fn test_split_header_ignores_status_line() {
        assert_eq!(split_header("HTTP/1.1 200 OK"), None);
        assert_eq!(
            split_header("EXT:"),
            Some(("EXT", String::new()))
        );
        assert_eq!(
            split_header("LOCATION:   http://10.0.0.2:1400/x.xml  "),
            Some(("LOCATION", "http://10.0.0.2:1400/x.xml".to_string()))
        );
    }

    #[test]
    fn test_search_request_shape() {
        let request = build_search_request("urn:dial-multiscreen-org:service:dial:1");

        assert!(request.starts_with("M-SEARCH * HTTP/1.1\r\n"));
        assert!(request.contains("HOST: 239.255.255.250:1900\r\n"));
        assert!(request.contains("MAN: \"ssdp:discover\"\r\n"));
        assert!(request.contains("ST: urn:dial-multiscreen-org:service:dial:1\r\n"));
        assert!(request.ends_with("\r\n\r\n"));
    }
}
