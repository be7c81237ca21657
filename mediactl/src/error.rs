use device_discovery::{DeviceKind, DiscoveryError};
use remote_control::SessionError;
use thiserror::Error;
use transport_control::TransportError;

#[derive(Error, Debug)]
pub enum DeviceError {
    #[error("Remote-control error: {0}")]
    Session(#[from] SessionError),

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Discovery error: {0}")]
    Discovery(#[from] DiscoveryError),

    #[error("{operation} is not supported by {kind} devices")]
    Unsupported {
        kind: DeviceKind,
        operation: &'static str,
    },

    #[error("Device at {0} is unreachable")]
    Unreachable(String),

    #[error("Registry error: {0}")]
    Registry(String),

    #[error("Wake-on-LAN error: {0}")]
    WakeOnLan(String),
}

pub type Result<T> = std::result::Result<T, DeviceError>;
