//! Remote-control session against a scripted TV on a local socket
//!
//! Each test spawns a thread that plays the TV side of the channel with
//! plain `ws://` and returns what it observed.

use std::net::{TcpListener, TcpStream};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use device_discovery::{DeviceDescriptor, DeviceKind};
use remote_control::{
    keys, CancelToken, KeyAction, LaunchKind, RemoteSession, SessionConfig, SessionError,
    WaitOptions,
};
use serde_json::{json, Value};
use tungstenite::handshake::server::{ErrorResponse, Request, Response};
use tungstenite::{Message, WebSocket};

const ACK: &str = r#"{"event":"ms.channel.connect","data":{"clients":[{"id":"c1","isHost":false}],"id":"c1","token":"11223344"}}"#;

fn spawn_tv<F, R>(script: F) -> (u16, JoinHandle<R>)
where
    F: FnOnce(TcpListener) -> R + Send + 'static,
    R: Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    (port, thread::spawn(move || script(listener)))
}

fn accept(listener: &TcpListener) -> WebSocket<TcpStream> {
    let (stream, _) = listener.accept().unwrap();
    stream.set_read_timeout(Some(Duration::from_secs(5))).unwrap();
    tungstenite::accept(stream).unwrap()
}

fn accept_with_ack(listener: &TcpListener) -> WebSocket<TcpStream> {
    let mut ws = accept(listener);
    ws.send(Message::Text(ACK.to_string())).unwrap();
    ws
}

fn send(ws: &mut WebSocket<TcpStream>, value: Value) {
    ws.send(Message::Text(value.to_string())).unwrap();
}

/// Collect text frames until the client closes or goes away
fn read_until_close(ws: &mut WebSocket<TcpStream>) -> Vec<(Instant, Value)> {
    let mut frames = Vec::new();
    loop {
        match ws.read() {
            Ok(Message::Text(text)) => frames.push((Instant::now(), serde_json::from_str(&text).unwrap())),
            Ok(Message::Close(_)) | Err(_) => return frames,
            Ok(_) => {}
        }
    }
}

fn session(port: u16) -> RemoteSession {
    let config = SessionConfig::default()
        .with_port(port)
        .with_secure(false)
        .with_connect_timeout(Duration::from_secs(2))
        .with_reply_timeout(Duration::from_secs(2));
    RemoteSession::new(DeviceDescriptor::new("Test TV", "127.0.0.1", DeviceKind::Tv), config)
}

fn closed_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().port()
}

#[test]
fn test_open_captures_issued_token() {
    let (port, tv) = spawn_tv(|listener| {
        let mut ws = accept_with_ack(&listener);
        read_until_close(&mut ws);
    });

    let session = session(port);
    assert!(!session.is_connected());

    assert_eq!(session.open().unwrap(), Some("11223344".to_string()));
    assert!(session.is_connected());
    assert_eq!(session.token().as_deref(), Some("11223344"));
    assert_eq!(session.descriptor().token.as_deref(), Some("11223344"));

    session.close();
    assert!(!session.is_connected());
    session.close();
    tv.join().unwrap();
}

#[test]
fn test_open_with_known_token_reports_no_change() {
    let (port, tv) = spawn_tv(|listener| {
        let (stream, _) = listener.accept().unwrap();
        let mut path = String::new();
        let callback = |request: &Request, response: Response| -> Result<Response, ErrorResponse> {
            path = request.uri().to_string();
            Ok(response)
        };
        let mut ws = tungstenite::accept_hdr(stream, callback).unwrap();
        ws.send(Message::Text(ACK.to_string())).unwrap();
        read_until_close(&mut ws);
        path
    });

    let device = DeviceDescriptor::new("Test TV", "127.0.0.1", DeviceKind::Tv).with_token("11223344");
    let config = SessionConfig::default().with_port(port).with_secure(false);
    let session = RemoteSession::new(device, config);

    assert_eq!(session.open().unwrap(), None);
    session.close();

    let path = tv.join().unwrap();
    assert!(path.starts_with("/api/v2/channels/samsung.remote.control?name=bWVkaWFjdGw="));
    assert!(path.ends_with("&token=11223344"));
}

#[test]
fn test_unauthorized_ack_is_protocol_error() {
    let (port, tv) = spawn_tv(|listener| {
        let mut ws = accept(&listener);
        send(&mut ws, json!({"event": "ms.channel.unauthorized"}));
        read_until_close(&mut ws);
    });

    let session = session(port);
    let err = session.open().unwrap_err();

    assert!(matches!(err, SessionError::Protocol(_)));
    assert!(!session.is_connected());
    tv.join().unwrap();
}

#[test]
fn test_send_key_repeats_with_delay() {
    let (port, tv) = spawn_tv(|listener| {
        let mut ws = accept_with_ack(&listener);
        read_until_close(&mut ws)
    });

    let delay = Duration::from_millis(40);
    let session = RemoteSession::new(
        DeviceDescriptor::new("Test TV", "127.0.0.1", DeviceKind::Tv),
        SessionConfig::default()
            .with_port(port)
            .with_secure(false)
            .with_key_press_delay(delay),
    );
    session.open().unwrap();

    let started = Instant::now();
    session.send_key(keys::VOLUME_UP, 3, KeyAction::Click).unwrap();
    assert!(started.elapsed() >= delay * 3);
    session.close();

    let frames = tv.join().unwrap();
    assert_eq!(frames.len(), 3);
    for (_, frame) in &frames {
        assert_eq!(frame["method"], "ms.remote.control");
        assert_eq!(frame["params"]["Cmd"], "Click");
        assert_eq!(frame["params"]["DataOfCmd"], "KEY_VOLUP");
        assert_eq!(frame["params"]["TypeOfRemote"], "SendRemoteKey");
    }
}

#[test]
fn test_ensure_open_shares_one_connection() {
    let (port, tv) = spawn_tv(|listener| {
        let mut ws = accept_with_ack(&listener);
        read_until_close(&mut ws);
        // No second client ever dialed in
        listener.set_nonblocking(true).unwrap();
        listener.accept().is_err()
    });

    let session = Arc::new(session(port));
    let callers: Vec<_> = (0..4)
        .map(|_| {
            let session = Arc::clone(&session);
            thread::spawn(move || session.ensure_open().unwrap())
        })
        .collect();
    let issued: Vec<Option<String>> = callers.into_iter().map(|c| c.join().unwrap()).collect();

    assert_eq!(issued.iter().filter(|token| token.is_some()).count(), 1);
    assert!(session.is_connected());
    assert_eq!(session.ensure_open().unwrap(), None);

    session.close();
    assert!(tv.join().unwrap());
}

#[test]
fn test_reopen_closes_previous_connection_first() {
    let (port, tv) = spawn_tv(|listener| {
        let mut first = accept_with_ack(&listener);
        let mut second = accept_with_ack(&listener);

        let first_closed = match first.read() {
            Ok(Message::Close(_)) => true,
            Err(tungstenite::Error::Io(e)) => {
                !matches!(e.kind(), std::io::ErrorKind::WouldBlock | std::io::ErrorKind::TimedOut)
            }
            Err(_) => true,
            Ok(_) => false,
        };
        read_until_close(&mut second);
        first_closed
    });

    let session = session(port);
    session.open().unwrap();
    assert_eq!(session.open().unwrap(), None);
    assert!(session.is_connected());
    session.close();

    assert!(tv.join().unwrap(), "first connection was still open");
}

#[test]
fn test_list_applications_skips_other_events() {
    let (port, tv) = spawn_tv(|listener| {
        let mut ws = accept_with_ack(&listener);
        let request: Value = match ws.read().unwrap() {
            Message::Text(text) => serde_json::from_str(&text).unwrap(),
            other => panic!("unexpected frame {:?}", other),
        };

        send(&mut ws, json!({"event": "ms.channel.clientConnect", "data": {"id": "c2"}}));
        send(&mut ws, json!({"event": "ed.edenTV.update", "data": {"update_type": "ed.edenApp.update"}}));
        send(&mut ws, json!({
            "event": "ed.installedApp.get",
            "from": "host",
            "data": {"data": [
                {"appId": "111299001912", "app_type": 2, "name": "YouTube", "icon": "/icons/yt.png"},
                {"appId": "3201907018807", "app_type": 2, "name": "Netflix"}
            ]}
        }));
        read_until_close(&mut ws);
        request
    });

    let session = session(port);
    session.open().unwrap();
    let reply = session.list_applications().unwrap();
    session.close();

    assert_eq!(reply.event, "ed.installedApp.get");
    let names: Vec<_> = reply.applications().iter().map(|a| a.name.as_str()).collect();
    assert_eq!(names, ["YouTube", "Netflix"]);

    let request = tv.join().unwrap();
    assert_eq!(request, json!({
        "method": "ms.channel.emit",
        "params": {"event": "ed.installedApp.get", "to": "host"}
    }));
}

#[test]
fn test_list_applications_gives_up_after_max_frames() {
    let (port, tv) = spawn_tv(|listener| {
        let mut ws = accept_with_ack(&listener);
        let _request = ws.read().unwrap();
        for _ in 0..3 {
            send(&mut ws, json!({"event": "ms.channel.clientConnect"}));
        }
        read_until_close(&mut ws);
    });

    let session = RemoteSession::new(
        DeviceDescriptor::new("Test TV", "127.0.0.1", DeviceKind::Tv),
        SessionConfig::default()
            .with_port(port)
            .with_secure(false)
            .with_max_discarded_frames(2),
    );
    session.open().unwrap();

    let err = session.list_applications().unwrap_err();
    assert!(matches!(err, SessionError::Protocol(_)));
    assert!(session.is_connected());

    session.close();
    tv.join().unwrap();
}

#[test]
fn test_fire_and_forget_commands() {
    let (port, tv) = spawn_tv(|listener| {
        let mut ws = accept_with_ack(&listener);
        read_until_close(&mut ws)
    });

    let session = session(port);
    session.open().unwrap();
    session.send_text("hello").unwrap();
    session.launch_application("111299001912", LaunchKind::default(), "").unwrap();
    session.open_browser("https://example.com").unwrap();
    session.change_channel("12").unwrap();
    session.close();

    let frames: Vec<Value> = tv.join().unwrap().into_iter().map(|(_, f)| f).collect();
    assert_eq!(frames.len(), 6);

    assert_eq!(frames[0]["params"]["Cmd"], "aGVsbG8=");
    assert_eq!(frames[0]["params"]["TypeOfRemote"], "SendInputString");

    assert_eq!(frames[1]["method"], "ms.channel.emit");
    assert_eq!(frames[1]["params"]["data"]["action_type"], "DEEP_LINK");
    assert_eq!(frames[1]["params"]["data"]["appId"], "111299001912");

    assert_eq!(frames[2]["params"]["data"]["appId"], "org.tizen.browser");
    assert_eq!(frames[2]["params"]["data"]["action_type"], "NATIVE_LAUNCH");
    assert_eq!(frames[2]["params"]["data"]["metaTag"], "https://example.com");

    let keys: Vec<_> = frames[3..].iter().map(|f| f["params"]["DataOfCmd"].clone()).collect();
    assert_eq!(keys, [json!("KEY_1"), json!("KEY_2"), json!("KEY_ENTER")]);
}

#[test]
fn test_commands_need_an_open_session() {
    let session = session(closed_port());

    let err = session.send_click(keys::POWER).unwrap_err();
    assert!(err.is_connection());

    let err = session.send_command::<Value>("ms.channel.emit", json!({})).unwrap_err();
    assert!(err.is_connection());
}

#[test]
fn test_lost_connection_is_dropped() {
    let (port, tv) = spawn_tv(|listener| {
        let ws = accept_with_ack(&listener);
        drop(ws);
    });

    let session = session(port);
    session.open().unwrap();
    tv.join().unwrap();

    let err = session.send_command::<Value>("ms.channel.emit", json!({})).unwrap_err();
    assert!(err.is_connection());
    assert!(!session.is_connected());
}

#[test]
fn test_wait_for_event_returns_on_match_only() {
    let (port, tv) = spawn_tv(|listener| {
        let mut ws = accept(&listener);
        thread::sleep(Duration::from_millis(150));
        send(&mut ws, json!({"event": "ms.channel.clientConnect"}));
        thread::sleep(Duration::from_millis(150));
        send(&mut ws, json!({"event": "ms.channel.connect", "data": {}}));
        read_until_close(&mut ws);
    });

    let session = session(port);
    let started = Instant::now();
    session
        .wait_for_event("ms.channel.connect", &WaitOptions::new().with_deadline(Duration::from_secs(5)))
        .unwrap();

    assert!(started.elapsed() >= Duration::from_millis(300));
    assert!(!session.is_connected());
    tv.join().unwrap();
}

#[test]
fn test_wait_for_event_times_out() {
    let (port, tv) = spawn_tv(|listener| {
        let mut ws = accept(&listener);
        send(&mut ws, json!({"event": "ms.channel.clientConnect"}));
        read_until_close(&mut ws);
    });

    let session = session(port);
    let started = Instant::now();
    let err = session
        .wait_for_event("ms.channel.connect", &WaitOptions::new().with_deadline(Duration::from_millis(300)))
        .unwrap_err();

    assert!(matches!(err, SessionError::Timeout(_)));
    assert!(started.elapsed() < Duration::from_secs(3));
    tv.join().unwrap();
}

#[test]
fn test_wait_for_event_deadline_bounds_a_stalled_handshake() {
    let (port, tv) = spawn_tv(|listener| {
        // Accept the TCP connection and never answer the upgrade
        let (stream, _) = listener.accept().unwrap();
        thread::sleep(Duration::from_secs(2));
        drop(stream);
    });

    let config = SessionConfig::default()
        .with_port(port)
        .with_secure(false)
        .with_connect_timeout(Duration::from_secs(5));
    let session = RemoteSession::new(DeviceDescriptor::new("Test TV", "127.0.0.1", DeviceKind::Tv), config);

    let started = Instant::now();
    let err = session
        .wait_for_event("ms.channel.connect", &WaitOptions::new().with_deadline(Duration::from_millis(300)))
        .unwrap_err();

    assert!(matches!(err, SessionError::Timeout(_)));
    assert!(started.elapsed() < Duration::from_secs(1));
    tv.join().unwrap();
}

#[test]
fn test_wait_for_event_retries_until_cancelled() {
    let session = session(closed_port());
    let cancel = CancelToken::new();
    let trigger = cancel.clone();

    let canceller = thread::spawn(move || {
        thread::sleep(Duration::from_millis(250));
        trigger.cancel();
    });

    let options = WaitOptions::new()
        .with_cancel(cancel)
        .with_backoff(Duration::from_millis(20), Duration::from_millis(100));
    let err = session.wait_for_event("ms.channel.connect", &options).unwrap_err();

    assert!(matches!(err, SessionError::Cancelled));
    canceller.join().unwrap();
}
