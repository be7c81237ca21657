//! RenderingControl service operations
//!
//! Volume and mute on the `Master` channel.

use serde_json::Value;

use crate::error::TransportCause;
use crate::operation::{required, TransportOperation};
use crate::service::Service;

/// The only channel these devices expose for volume
pub const MASTER: &str = "Master";

/// Highest volume a device accepts
pub const MAX_VOLUME: u8 = 100;

pub struct GetVolumeOperation;

pub struct GetVolumeRequest {
    pub channel: String,
}

impl Default for GetVolumeRequest {
    fn default() -> Self {
        Self { channel: MASTER.to_string() }
    }
}

impl TransportOperation for GetVolumeOperation {
    type Request = GetVolumeRequest;
    type Response = u8;

    const SERVICE: Service = Service::RenderingControl;
    const ACTION: &'static str = "GetVolume";

    fn build_arguments(request: &Self::Request) -> String {
        format!("<Channel>{}</Channel>", request.channel)
    }

    fn parse_response(reply: &Value) -> Result<u8, TransportCause> {
        let raw = required(reply, "CurrentVolume")?;
        raw.trim()
            .parse::<u8>()
            .map_err(|_| TransportCause::Decode(format!("CurrentVolume is not a volume: {:?}", raw)))
    }
}

pub struct SetVolumeOperation;

pub struct SetVolumeRequest {
    pub channel: String,
    pub desired_volume: u8,
}

impl SetVolumeRequest {
    pub fn master(desired_volume: u8) -> Self {
        Self { channel: MASTER.to_string(), desired_volume }
    }
}

impl TransportOperation for SetVolumeOperation {
    type Request = SetVolumeRequest;
    type Response = ();

    const SERVICE: Service = Service::RenderingControl;
    const ACTION: &'static str = "SetVolume";

    fn validate(request: &Self::Request) -> Result<(), TransportCause> {
        if request.desired_volume > MAX_VOLUME {
            return Err(TransportCause::InvalidParameter(format!(
                "volume {} is out of range [0, {}]",
                request.desired_volume, MAX_VOLUME
            )));
        }
        Ok(())
    }

    fn build_arguments(request: &Self::Request) -> String {
        format!(
            "<Channel>{}</Channel><DesiredVolume>{}</DesiredVolume>",
            request.channel, request.desired_volume
        )
    }

    fn parse_response(_reply: &Value) -> Result<(), TransportCause> {
        Ok(())
    }
}

pub struct GetMuteOperation;

pub struct GetMuteRequest {
    pub channel: String,
}

impl Default for GetMuteRequest {
    fn default() -> Self {
        Self { channel: MASTER.to_string() }
    }
}

impl TransportOperation for GetMuteOperation {
    type Request = GetMuteRequest;
    type Response = bool;

    const SERVICE: Service = Service::RenderingControl;
    const ACTION: &'static str = "GetMute";

    fn build_arguments(request: &Self::Request) -> String {
        format!("<Channel>{}</Channel>", request.channel)
    }

    fn parse_response(reply: &Value) -> Result<bool, TransportCause> {
        let raw = required(reply, "CurrentMute")?.trim();
        Ok(raw == "1" || raw.eq_ignore_ascii_case("true"))
    }
}

pub struct SetMuteOperation;

pub struct SetMuteRequest {
    pub channel: String,
    pub desired_mute: bool,
}

impl SetMuteRequest {
    pub fn master(desired_mute: bool) -> Self {
        Self { channel: MASTER.to_string(), desired_mute }
    }
}

impl TransportOperation for SetMuteOperation {
    type Request = SetMuteRequest;
    type Response = ();

    const SERVICE: Service = Service::RenderingControl;
    const ACTION: &'static str = "SetMute";

    fn build_arguments(request: &Self::Request) -> String {
        format!(
            "<Channel>{}</Channel><DesiredMute>{}</DesiredMute>",
            request.channel,
            if request.desired_mute { 1 } else { 0 }
        )
    }

    fn parse_response(_reply: &Value) -> Result<(), TransportCause> {
        Ok(())
    }
}
