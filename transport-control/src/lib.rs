//! UPnP transport control for TVs and network speakers
//!
//! This crate provides typed RenderingControl and AVTransport operations on
//! top of the private `soap-client` crate: volume and mute, setting and
//! playing a media URI, play/pause/stop/next/previous, and reading the
//! transport state and current track.
//!
//! ```no_run
//! use transport_control::{Resolver, TransportClient};
//!
//! let client = TransportClient::new(Resolver::speaker("192.168.1.30"));
//! client.set_current_media("http://192.168.1.5:8000/stream.mp3")?;
//!
//! let position = client.get_position_info()?;
//! println!("{} - {} ({})", position.artist, position.title, position.rel_time);
//! # Ok::<(), transport_control::TransportError>(())
//! ```
//!
//! Every failure is a [`TransportError`] naming the SOAP action and its
//! [`TransportCause`]; callers typically log it and carry on.

pub mod client;
pub mod didl;
pub mod error;
pub mod operation;
pub mod operations;
pub mod service;

pub use client::TransportClient;
pub use error::{Result, TransportCause, TransportError};
pub use operation::TransportOperation;
pub use operations::PositionInfo;
pub use service::{Resolver, Service};
