//! Transport-control operations organized by service

pub mod av_transport;
pub mod rendering_control;

pub use av_transport::{
    GetPositionInfoOperation, GetTransportInfoOperation, NextOperation, PauseOperation,
    PlayOperation, PositionInfo, PreviousOperation, SetAvTransportUriOperation,
    SetAvTransportUriRequest, StopOperation,
};
pub use rendering_control::{
    GetMuteOperation, GetMuteRequest, GetVolumeOperation, GetVolumeRequest, SetMuteOperation,
    SetMuteRequest, SetVolumeOperation, SetVolumeRequest,
};
