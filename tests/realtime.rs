//! Push channel supervisor against a local WebSocket server.

use futures::{SinkExt, StreamExt};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::{TcpListener, TcpStream};
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};
use tokio_tungstenite::tungstenite::http::StatusCode;
use tokio_tungstenite::{WebSocketStream, accept_hdr_async};

use foodrelief::realtime::{NotificationCenter, ReconnectPolicy, RealtimeService};
use foodrelief::storage::MemoryTokenStore;
use foodrelief::{Config, Session};

const WAIT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone)]
struct Seen {
    uri: String,
    authorization: Option<String>,
}

struct PushServer {
    url: String,
    handshakes: Arc<Mutex<Vec<Seen>>>,
    reject: Arc<AtomicBool>,
    sockets: mpsc::UnboundedReceiver<WebSocketStream<TcpStream>>,
}

impl PushServer {
    async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("ws://{}/ws", listener.local_addr().unwrap());
        let handshakes = Arc::new(Mutex::new(Vec::new()));
        let reject = Arc::new(AtomicBool::new(false));
        let (tx, sockets) = mpsc::unbounded_channel();

        let (seen, refuse) = (handshakes.clone(), reject.clone());
        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                let (seen, refuse, tx) = (seen.clone(), refuse.clone(), tx.clone());
                tokio::spawn(async move {
                    let callback = move |req: &Request, resp: Response| {
                        seen.lock().unwrap().push(Seen {
                            uri: req.uri().to_string(),
                            authorization: req
                                .headers()
                                .get("authorization")
                                .and_then(|v| v.to_str().ok())
                                .map(str::to_string),
                        });
                        if refuse.load(Ordering::SeqCst) {
                            let denied: ErrorResponse = Response::builder()
                                .status(StatusCode::UNAUTHORIZED)
                                .body(None)
                                .unwrap();
                            return Err(denied);
                        }
                        Ok(resp)
                    };
                    if let Ok(ws) = accept_hdr_async(stream, callback).await {
                        let _ = tx.send(ws);
                    }
                });
            }
        });

        Self {
            url,
            handshakes,
            reject,
            sockets,
        }
    }

    async fn next_socket(&mut self) -> WebSocketStream<TcpStream> {
        tokio::time::timeout(WAIT, self.sockets.recv())
            .await
            .expect("no connection")
            .unwrap()
    }

    fn handshakes(&self) -> Vec<Seen> {
        self.handshakes.lock().unwrap().clone()
    }
}

fn config(url: &str) -> Config {
    Config {
        ws_url: url.to_string(),
        reconnect: ReconnectPolicy {
            initial_delay: Duration::from_millis(10),
            max_delay: Duration::from_millis(40),
            multiplier: 2,
            max_attempts: Some(3),
        },
        ..Config::default()
    }
}

fn session(token: Option<&str>) -> Session {
    let store = match token {
        Some(t) => MemoryTokenStore::with_token(t),
        None => MemoryTokenStore::default(),
    };
    Session::restore(Arc::new(store)).unwrap()
}

async fn eventually(what: &str, mut check: impl FnMut() -> bool) {
    let deadline = tokio::time::Instant::now() + WAIT;
    while !check() {
        assert!(tokio::time::Instant::now() < deadline, "timed out waiting for {what}");
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}

/// Reads until the client closes or goes away.
async fn expect_closed(ws: &mut WebSocketStream<TcpStream>) {
    let closed = tokio::time::timeout(WAIT, async {
        loop {
            match ws.next().await {
                Some(Ok(Message::Close(_))) | None | Some(Err(_)) => return,
                Some(Ok(_)) => {}
            }
        }
    })
    .await;
    assert!(closed.is_ok(), "client did not close the socket");
}

#[tokio::test]
async fn connects_with_token_and_surfaces_events() {
    let mut server = PushServer::start().await;
    let session = session(Some("tok-42"));
    let center = NotificationCenter::default();
    let _handle = RealtimeService::start(&Handle::current(), &config(&server.url), &session, center.clone());

    let mut ws = server.next_socket().await;
    eventually("connected flag", || center.connected()).await;

    let seen = server.handshakes();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].uri, "/ws?token=tok-42");
    assert_eq!(seen[0].authorization.as_deref(), Some("Bearer tok-42"));

    ws.send(Message::Text(
        r#"{"event":"new_urgent_donation","data":{"donationId":"D9"}}"#.into(),
    ))
    .await
    .unwrap();
    ws.send(Message::Text("not an event".into())).await.unwrap();
    eventually("notification", || center.unread() == 1).await;
    assert_eq!(center.items()[0].headline, "New urgent donation");
}

#[tokio::test]
async fn nothing_connects_until_login() {
    let mut server = PushServer::start().await;
    let session = session(None);
    let center = NotificationCenter::default();
    let _handle = RealtimeService::start(&Handle::current(), &config(&server.url), &session, center.clone());

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(server.handshakes().is_empty());

    session.login("fresh").unwrap();
    server.next_socket().await;
    eventually("connected flag", || center.connected()).await;
    assert_eq!(server.handshakes()[0].uri, "/ws?token=fresh");
}

#[tokio::test]
async fn logout_closes_the_socket() {
    let mut server = PushServer::start().await;
    let session = session(Some("tok"));
    let center = NotificationCenter::default();
    let _handle = RealtimeService::start(&Handle::current(), &config(&server.url), &session, center.clone());

    let mut ws = server.next_socket().await;
    eventually("connected flag", || center.connected()).await;

    session.logout().unwrap();
    expect_closed(&mut ws).await;
    eventually("disconnected flag", || !center.connected()).await;

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(server.handshakes().len(), 1);
}

#[tokio::test]
async fn user_change_reconnects_with_the_new_token() {
    let mut server = PushServer::start().await;
    let session = session(Some("alice"));
    let center = NotificationCenter::default();
    let _handle = RealtimeService::start(&Handle::current(), &config(&server.url), &session, center.clone());

    let mut first = server.next_socket().await;
    first
        .send(Message::Text(r#"{"event":"task_assigned","data":{}}"#.into()))
        .await
        .unwrap();
    eventually("notification", || center.unread() == 1).await;

    session.login("bob").unwrap();
    expect_closed(&mut first).await;
    server.next_socket().await;

    let seen = server.handshakes();
    assert_eq!(seen.len(), 2);
    assert_eq!(seen[1].authorization.as_deref(), Some("Bearer bob"));
    // the previous user's notifications do not carry over
    assert!(center.items().is_empty());
}

#[tokio::test]
async fn reconnects_after_the_server_drops() {
    let mut server = PushServer::start().await;
    let session = session(Some("tok"));
    let center = NotificationCenter::default();
    let _handle = RealtimeService::start(&Handle::current(), &config(&server.url), &session, center.clone());

    let mut ws = server.next_socket().await;
    eventually("connected flag", || center.connected()).await;
    ws.close(None).await.unwrap();

    server.next_socket().await;
    eventually("reconnected", || center.connected()).await;
    assert_eq!(server.handshakes().len(), 2);
}

#[tokio::test]
async fn refused_credential_is_not_retried() {
    let mut server = PushServer::start().await;
    server.reject.store(true, Ordering::SeqCst);
    let session = session(Some("expired"));
    let center = NotificationCenter::default();
    let _handle = RealtimeService::start(&Handle::current(), &config(&server.url), &session, center.clone());

    eventually("first handshake", || server.handshakes().len() == 1).await;
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(server.handshakes().len(), 1);
    assert!(!center.connected());

    server.reject.store(false, Ordering::SeqCst);
    session.login("renewed").unwrap();
    server.next_socket().await;
    eventually("connected flag", || center.connected()).await;
}

#[tokio::test]
async fn gives_up_when_the_server_is_gone() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("ws://{}/ws", listener.local_addr().unwrap());
    drop(listener);

    let session = session(Some("tok"));
    let center = NotificationCenter::default();
    let handle = RealtimeService::start(&Handle::current(), &config(&url), &session, center.clone());

    // 10 + 20 + 40 ms of backoff, then the supervisor waits for a new session
    tokio::time::sleep(Duration::from_millis(300)).await;
    assert!(!center.connected());
    assert!(!handle.is_finished());
    handle.shutdown().await;
}

#[tokio::test]
async fn dropping_the_handle_closes_the_socket() {
    let mut server = PushServer::start().await;
    let session = session(Some("tok"));
    let center = NotificationCenter::default();
    let handle = RealtimeService::start(&Handle::current(), &config(&server.url), &session, center.clone());

    let mut ws = server.next_socket().await;
    eventually("connected flag", || center.connected()).await;

    drop(handle);
    expect_closed(&mut ws).await;
    eventually("disconnected flag", || !center.connected()).await;
}
