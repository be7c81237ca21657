//! Error types for the SOAP client

use thiserror::Error;

/// Errors that can occur during SOAP communication
#[derive(Debug, Error)]
pub enum SoapError {
    /// Network or HTTP communication error
    #[error("Network/HTTP error: {0}")]
    Network(String),

    /// XML parsing error
    #[error("XML parsing error: {0}")]
    Parse(String),

    /// SOAP fault returned by the device
    #[error("SOAP fault {code}: {description}")]
    Fault {
        /// UPnP error code, 500 when the device did not send one
        code: u16,
        /// `errorDescription` or `faultstring`, whichever the device sent
        description: String,
    },
}
