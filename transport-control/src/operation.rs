use serde_json::Value;

use crate::error::TransportCause;
use crate::service::Service;

/// Base trait for every transport-control action
///
/// Each action is a zero-sized type naming its service and SOAP action, with
/// typed request and response data. [`crate::TransportClient::execute`] does
/// the envelope, the POST and the XML normalization; an operation only
/// serializes its arguments and reads fields out of the normalized reply.
pub trait TransportOperation {
    /// The request data for this operation
    type Request;

    /// The decoded reply
    type Response;

    /// The UPnP service this operation belongs to
    const SERVICE: Service;

    /// The SOAP action name for this operation
    const ACTION: &'static str;

    /// Reject arguments the device would refuse, before any I/O
    fn validate(_request: &Self::Request) -> Result<(), TransportCause> {
        Ok(())
    }

    /// The action arguments after `InstanceID`, as an XML fragment
    fn build_arguments(request: &Self::Request) -> String;

    /// The full argument payload; `InstanceID` is always 0
    fn build_payload(request: &Self::Request) -> String {
        format!("<InstanceID>0</InstanceID>{}", Self::build_arguments(request))
    }

    /// Decode the normalized `<{ACTION}Response>` element
    fn parse_response(reply: &Value) -> Result<Self::Response, TransportCause>;
}

/// Read a required string field from a normalized reply
pub(crate) fn required<'a>(reply: &'a Value, name: &str) -> Result<&'a str, TransportCause> {
    soap_client::json::field(reply, name)
        .ok_or_else(|| TransportCause::Decode(format!("missing {} in reply", name)))
}

/// Read an optional string field, empty when absent
pub(crate) fn optional(reply: &Value, name: &str) -> String {
    soap_client::json::field(reply, name)
        .unwrap_or_default()
        .to_string()
}
