use soap_client::SoapError;
use thiserror::Error;

/// A transport-control action that did not complete
///
/// Carries the SOAP action name so callers can log which step of a
/// multi-call operation (set URI, then play) went wrong.
#[derive(Debug, Error)]
#[error("{action} failed: {cause}")]
pub struct TransportError {
    /// SOAP action name, e.g. `SetVolume`
    pub action: &'static str,
    #[source]
    pub cause: TransportCause,
}

impl TransportError {
    pub fn new(action: &'static str, cause: TransportCause) -> Self {
        Self { action, cause }
    }

    /// Whether the device could not be reached at all
    pub fn is_unreachable(&self) -> bool {
        matches!(self.cause, TransportCause::Http(_))
    }
}

/// Why a transport-control action failed
#[derive(Debug, Error)]
pub enum TransportCause {
    /// Connection, timeout or non-SOAP HTTP failure
    #[error("HTTP error: {0}")]
    Http(String),

    /// The device answered with a SOAP fault
    #[error("device fault {code}: {description}")]
    Fault { code: u16, description: String },

    /// The reply was not the expected shape
    #[error("decode error: {0}")]
    Decode(String),

    /// An argument was rejected before anything was sent
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
}

impl From<SoapError> for TransportCause {
    fn from(error: SoapError) -> Self {
        match error {
            SoapError::Network(msg) => TransportCause::Http(msg),
            SoapError::Parse(msg) => TransportCause::Decode(msg),
            SoapError::Fault { code, description } => TransportCause::Fault { code, description },
        }
    }
}

/// Type alias for results that can return a TransportError
pub type Result<T> = std::result::Result<T, TransportError>;
