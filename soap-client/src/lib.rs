//! Private SOAP client for UPnP transport control
//!
//! This crate provides a minimal SOAP client for the RenderingControl and
//! AVTransport services exposed by TVs and network speakers, plus the pure
//! envelope codec and the XML → JSON normalization used to read replies.

pub mod envelope;
mod error;
pub mod json;

pub use error::SoapError;
pub use json::to_json;

use std::time::Duration;
use xmltree::Element;

/// A minimal SOAP client for UPnP device communication
#[derive(Debug, Clone)]
pub struct SoapClient {
    agent: ureq::Agent,
}

impl SoapClient {
    /// Create a new SOAP client with default timeouts (5s connect, 10s read)
    pub fn new() -> Self {
        Self::with_timeouts(Duration::from_secs(5), Duration::from_secs(10))
    }

    /// Create a SOAP client with explicit timeouts
    pub fn with_timeouts(connect: Duration, read: Duration) -> Self {
        Self {
            agent: ureq::AgentBuilder::new()
                .timeout_connect(connect)
                .timeout_read(read)
                .build(),
        }
    }

    /// Send a SOAP request and return the `<{action}Response>` element
    ///
    /// # Arguments
    /// * `url` - Full control URL of the service
    /// * `service` - Service name, e.g. `RenderingControl`
    /// * `action` - SOAP action name, e.g. `GetVolume`
    /// * `arguments` - XML fragment placed inside the action element
    pub fn call(
        &self,
        url: &str,
        service: &str,
        action: &str,
        arguments: &str,
    ) -> Result<Element, SoapError> {
        let body = envelope::build(action, service, arguments);
        let soap_action = envelope::soap_action(service, action);

        tracing::debug!(url, soap_action = %soap_action, "sending SOAP request");

        let xml_text = match self
            .agent
            .post(url)
            .set("Content-Type", "text/xml; charset=\"utf-8\"")
            .set("SOAPAction", &soap_action)
            .send_string(&body)
        {
            Ok(response) => response
                .into_string()
                .map_err(|e| SoapError::Network(e.to_string()))?,
            // Faults arrive as HTTP 500 with an envelope in the body
            Err(ureq::Error::Status(status, response)) => {
                let text = response.into_string().unwrap_or_default();
                return Err(Element::parse(text.as_bytes())
                    .ok()
                    .and_then(|xml| extract_fault(&xml))
                    .unwrap_or_else(|| SoapError::Network(format!("HTTP {}", status))));
            }
            Err(e) => return Err(SoapError::Network(e.to_string())),
        };

        let xml = Element::parse(xml_text.as_bytes())
            .map_err(|e| SoapError::Parse(e.to_string()))?;

        extract_response(&xml, action)
    }
}

impl Default for SoapClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Pull the action response out of a parsed envelope, or the fault if there is one
pub fn extract_response(xml: &Element, action: &str) -> Result<Element, SoapError> {
    if let Some(fault) = extract_fault(xml) {
        return Err(fault);
    }

    let body = xml
        .get_child("Body")
        .ok_or_else(|| SoapError::Parse("Missing SOAP Body".to_string()))?;

    let response_name = format!("{}Response", action);
    body.get_child(response_name.as_str())
        .cloned()
        .ok_or_else(|| SoapError::Parse(format!("Missing {} element", response_name)))
}

fn extract_fault(xml: &Element) -> Option<SoapError> {
    let fault = xml.get_child("Body")?.get_child("Fault")?;

    let upnp_error = fault
        .get_child("detail")
        .and_then(|d| d.get_child("UPnPError").or_else(|| d.get_child("UpnPError")));

    let code = upnp_error
        .and_then(|e| e.get_child("errorCode"))
        .and_then(|c| c.get_text())
        .and_then(|t| t.trim().parse::<u16>().ok())
        .unwrap_or(500);

    let description = upnp_error
        .and_then(|e| e.get_child("errorDescription"))
        .or_else(|| fault.get_child("faultstring"))
        .and_then(|d| d.get_text())
        .map(|t| t.trim().to_string())
        .unwrap_or_default();

    Some(SoapError::Fault { code, description })
}
