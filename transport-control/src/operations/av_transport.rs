//! AVTransport service operations
//!
//! Operations for setting the media URI, controlling playback and reading the
//! current transport and track state.

use serde::Serialize;
use serde_json::Value;
use soap_client::envelope;

use crate::didl::parse_track_metadata;
use crate::error::TransportCause;
use crate::operation::{optional, TransportOperation};
use crate::service::Service;

/// Declares an AVTransport action whose request is fixed and whose reply
/// carries nothing of interest.
macro_rules! simple_action {
    ($(#[$doc:meta])* $op:ident, $action:literal, $args:expr) => {
        $(#[$doc])*
        pub struct $op;

        impl TransportOperation for $op {
            type Request = ();
            type Response = ();

            const SERVICE: Service = Service::AVTransport;
            const ACTION: &'static str = $action;

            fn build_arguments(_request: &()) -> String {
                $args.to_string()
            }

            fn parse_response(_reply: &Value) -> Result<(), TransportCause> {
                Ok(())
            }
        }
    };
}

simple_action!(
    /// Start playback of the current URI at normal speed
    PlayOperation, "Play", "<Speed>1</Speed>"
);
simple_action!(PauseOperation, "Pause", "");
simple_action!(StopOperation, "Stop", "");
simple_action!(
    /// Skip to the next item of the current queue or playlist
    NextOperation, "Next", ""
);
simple_action!(PreviousOperation, "Previous", "");

pub struct SetAvTransportUriOperation;

pub struct SetAvTransportUriRequest {
    pub current_uri: String,
    /// DIDL-Lite metadata for the URI; usually empty
    pub current_uri_metadata: String,
}

impl SetAvTransportUriRequest {
    pub fn new(current_uri: impl Into<String>) -> Self {
        Self {
            current_uri: current_uri.into(),
            current_uri_metadata: String::new(),
        }
    }
}

impl TransportOperation for SetAvTransportUriOperation {
    type Request = SetAvTransportUriRequest;
    type Response = ();

    const SERVICE: Service = Service::AVTransport;
    const ACTION: &'static str = "SetAVTransportURI";

    fn validate(request: &Self::Request) -> Result<(), TransportCause> {
        if request.current_uri.trim().is_empty() {
            return Err(TransportCause::InvalidParameter("media URI is empty".to_string()));
        }
        Ok(())
    }

    fn build_arguments(request: &Self::Request) -> String {
        format!(
            "<CurrentURI>{}</CurrentURI><CurrentURIMetaData>{}</CurrentURIMetaData>",
            envelope::escape(&request.current_uri),
            envelope::escape(&request.current_uri_metadata)
        )
    }

    fn parse_response(_reply: &Value) -> Result<(), TransportCause> {
        Ok(())
    }
}

/// Raw transport state, returned as the device sent it
pub struct GetTransportInfoOperation;

impl TransportOperation for GetTransportInfoOperation {
    type Request = ();
    type Response = Value;

    const SERVICE: Service = Service::AVTransport;
    const ACTION: &'static str = "GetTransportInfo";

    fn build_arguments(_request: &()) -> String {
        String::new()
    }

    fn parse_response(reply: &Value) -> Result<Value, TransportCause> {
        Ok(reply.clone())
    }
}

/// Track number, position and metadata of what is playing
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PositionInfo {
    pub track: String,
    pub rel_time: String,
    pub track_duration: String,
    pub track_uri: String,
    pub artist: String,
    pub album: String,
    pub title: String,
    pub cover_uri: String,
}

pub struct GetPositionInfoOperation;

impl TransportOperation for GetPositionInfoOperation {
    type Request = ();
    type Response = PositionInfo;

    const SERVICE: Service = Service::AVTransport;
    const ACTION: &'static str = "GetPositionInfo";

    fn build_arguments(_request: &()) -> String {
        String::new()
    }

    fn parse_response(reply: &Value) -> Result<PositionInfo, TransportCause> {
        let item = parse_track_metadata(&optional(reply, "TrackMetaData"))?;

        Ok(PositionInfo {
            track: optional(reply, "Track"),
            rel_time: optional(reply, "RelTime"),
            track_duration: optional(reply, "TrackDuration"),
            track_uri: optional(reply, "TrackURI"),
            artist: item.creator.unwrap_or_default(),
            album: item.album.unwrap_or_default(),
            title: item.title.unwrap_or_default(),
            cover_uri: item.album_art_uri.unwrap_or_default(),
        })
    }
}
