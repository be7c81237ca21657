use device_discovery::DeviceDescriptor;
use serde_json::Value;
use soap_client::{to_json, SoapClient};

use crate::error::{Result, TransportError};
use crate::operation::TransportOperation;
use crate::operations::*;
use crate::service::Resolver;

/// A client for executing transport-control operations against one device
///
/// The client is stateless: every call is a fresh SOAP POST to the URL the
/// resolver returns for the operation's service. Calls are independent and
/// may run in parallel from several threads.
///
/// ```no_run
/// use device_discovery::{DeviceDescriptor, DeviceKind};
/// use transport_control::TransportClient;
///
/// let tv = DeviceDescriptor::new("TV", "192.168.1.20", DeviceKind::Tv);
/// let client = TransportClient::for_device(&tv);
///
/// client.set_volume(25)?;
/// println!("now at {}", client.get_volume()?);
/// # Ok::<(), transport_control::TransportError>(())
/// ```
#[derive(Debug, Clone)]
pub struct TransportClient {
    soap_client: SoapClient,
    resolver: Resolver,
}

impl TransportClient {
    /// Create a client with the default SOAP timeouts
    pub fn new(resolver: Resolver) -> Self {
        Self::with_soap_client(resolver, SoapClient::new())
    }

    /// Create a client for a known device, picking the resolver from its kind
    pub fn for_device(device: &DeviceDescriptor) -> Self {
        Self::new(Resolver::for_device(device))
    }

    /// Create a client with a custom SOAP client (e.g. other timeouts)
    pub fn with_soap_client(resolver: Resolver, soap_client: SoapClient) -> Self {
        Self { soap_client, resolver }
    }

    pub fn resolver(&self) -> &Resolver {
        &self.resolver
    }

    /// Execute one operation
    ///
    /// Validates the request, POSTs the envelope to the service's control URL,
    /// normalizes the `<{ACTION}Response>` element and decodes it.
    pub fn execute<Op: TransportOperation>(&self, request: &Op::Request) -> Result<Op::Response> {
        let fail = |cause| TransportError::new(Op::ACTION, cause);

        Op::validate(request).map_err(fail)?;

        let url = self.resolver.resolve(Op::SERVICE);
        let payload = Op::build_payload(request);

        let response = self
            .soap_client
            .call(&url, Op::SERVICE.name(), Op::ACTION, &payload)
            .map_err(|e| {
                tracing::warn!(action = Op::ACTION, %url, "transport call failed: {}", e);
                fail(e.into())
            })?;

        Op::parse_response(&to_json(&response)).map_err(fail)
    }

    /// Current volume (0-100) of the master channel
    pub fn get_volume(&self) -> Result<u8> {
        self.execute::<GetVolumeOperation>(&GetVolumeRequest::default())
    }

    /// Set the master volume; values above 100 are rejected without a request
    pub fn set_volume(&self, volume: u8) -> Result<()> {
        self.execute::<SetVolumeOperation>(&SetVolumeRequest::master(volume))
    }

    pub fn get_mute(&self) -> Result<bool> {
        self.execute::<GetMuteOperation>(&GetMuteRequest::default())
    }

    pub fn set_mute(&self, mute: bool) -> Result<()> {
        self.execute::<SetMuteOperation>(&SetMuteRequest::master(mute))
    }

    /// Point the device at `uri` and start playing it
    pub fn set_current_media(&self, uri: &str) -> Result<()> {
        self.execute::<SetAvTransportUriOperation>(&SetAvTransportUriRequest::new(uri))?;
        self.play()
    }

    /// The `GetTransportInfo` reply as normalized JSON
    pub fn get_transport_state(&self) -> Result<Value> {
        self.execute::<GetTransportInfoOperation>(&())
    }

    pub fn get_position_info(&self) -> Result<PositionInfo> {
        self.execute::<GetPositionInfoOperation>(&())
    }

    pub fn play(&self) -> Result<()> {
        self.execute::<PlayOperation>(&())
    }

    pub fn pause(&self) -> Result<()> {
        self.execute::<PauseOperation>(&())
    }

    pub fn stop(&self) -> Result<()> {
        self.execute::<StopOperation>(&())
    }

    pub fn next(&self) -> Result<()> {
        self.execute::<NextOperation>(&())
    }

    pub fn previous(&self) -> Result<()> {
        self.execute::<PreviousOperation>(&())
    }
}
