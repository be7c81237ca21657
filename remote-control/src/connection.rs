//! Dialing and low-level frame I/O

use std::io;
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

use tungstenite::handshake::HandshakeError;
use tungstenite::stream::MaybeTlsStream;
use tungstenite::{Connector, Message, WebSocket};

use crate::error::{Result, SessionError};

/// An open remote-control channel
pub(crate) type Connection = WebSocket<MaybeTlsStream<TcpStream>>;

/// Open a WebSocket to `url` on `ip:port`.
///
/// TVs serve a self-signed certificate for their own IP, so certificate and
/// hostname validation are both off. `timeout` bounds the TCP connect and
/// every read and write of the handshake.
pub(crate) fn dial(url: &str, ip: &str, port: u16, timeout: Duration) -> Result<Connection> {
    let addr = (ip, port)
        .to_socket_addrs()?
        .next()
        .ok_or_else(|| SessionError::Connection(format!("cannot resolve {}", ip)))?;

    let stream = TcpStream::connect_timeout(&addr, timeout)?;
    stream.set_read_timeout(Some(timeout))?;
    stream.set_write_timeout(Some(timeout))?;
    stream.set_nodelay(true)?;

    let tls = native_tls::TlsConnector::builder()
        .danger_accept_invalid_certs(true)
        .danger_accept_invalid_hostnames(true)
        .build()
        .map_err(|e| SessionError::Connection(format!("TLS setup failed: {}", e)))?;

    let (socket, _response) =
        tungstenite::client_tls_with_config(url, stream, None, Some(Connector::NativeTls(tls)))
            .map_err(|e| match e {
                HandshakeError::Failure(e) => SessionError::Connection(format!("handshake failed: {}", e)),
                HandshakeError::Interrupted(_) => SessionError::Connection("handshake timed out".to_string()),
            })?;

    tracing::debug!(%addr, "remote-control channel open");
    Ok(socket)
}

/// Change the read timeout of the socket under the WebSocket
pub(crate) fn set_read_timeout(socket: &Connection, timeout: Option<Duration>) -> io::Result<()> {
    match socket.get_ref() {
        MaybeTlsStream::Plain(stream) => stream.set_read_timeout(timeout),
        MaybeTlsStream::NativeTls(stream) => stream.get_ref().set_read_timeout(timeout),
        _ => Ok(()),
    }
}

/// Send one JSON frame
pub(crate) fn write_text(socket: &mut Connection, text: String) -> tungstenite::Result<()> {
    socket.send(Message::Text(text))
}

/// Read frames until a data frame arrives; control frames are skipped.
///
/// A close frame from the device is reported as `ConnectionClosed`.
pub(crate) fn read_text(socket: &mut Connection) -> tungstenite::Result<String> {
    loop {
        match socket.read()? {
            Message::Text(text) => return Ok(text),
            Message::Binary(bytes) => return Ok(String::from_utf8_lossy(&bytes).into_owned()),
            Message::Close(_) => return Err(tungstenite::Error::ConnectionClosed),
            Message::Ping(_) | Message::Pong(_) | Message::Frame(_) => continue,
        }
    }
}

/// Whether an error is only a read timeout
pub(crate) fn is_timeout(error: &tungstenite::Error) -> bool {
    matches!(
        error,
        tungstenite::Error::Io(e)
            if e.kind() == io::ErrorKind::WouldBlock || e.kind() == io::ErrorKind::TimedOut
    )
}

/// Send a close frame and drop the connection, ignoring failures
pub(crate) fn shutdown(mut socket: Connection) {
    let _ = socket.close(None);
    let _ = socket.flush();
}
