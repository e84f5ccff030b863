//! One push-channel connection: handshake and the read loop.

use futures::StreamExt;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::handshake::client::Request;
use tokio_tungstenite::tungstenite::http::{HeaderValue, StatusCode, header};
use tokio_tungstenite::tungstenite::{self, Message};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use url::Url;

use super::notifications::NotificationCenter;
use crate::error::{Error, Result};

pub(crate) type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// The token rides both as `?token=` and as a bearer header; servers differ
/// in which one they read at handshake.
pub fn handshake_request(ws_url: &str, token: &str) -> Result<Request> {
    let mut url = Url::parse(ws_url)?;
    let scheme = match url.scheme() {
        "http" => Some("ws"),
        "https" => Some("wss"),
        "ws" | "wss" => None,
        other => return Err(Error::config(format!("unsupported push scheme `{other}`"))),
    };
    if let Some(scheme) = scheme {
        url.set_scheme(scheme)
            .map_err(|_| Error::config("cannot switch push URL to a WebSocket scheme"))?;
    }
    url.query_pairs_mut().append_pair("token", token);

    let mut request = url.as_str().into_client_request()?;
    let bearer = HeaderValue::from_str(&format!("Bearer {token}")).map_err(|_| Error::InvalidToken)?;
    request.headers_mut().insert(header::AUTHORIZATION, bearer);
    Ok(request)
}

pub(crate) enum Handshake {
    Open(Box<Socket>),
    /// The server refused the credential. Retrying with the same token is
    /// pointless.
    Rejected(StatusCode),
    Failed(Error),
}

pub(crate) async fn open(request: Request) -> Handshake {
    match connect_async(request).await {
        Ok((socket, _)) => Handshake::Open(Box::new(socket)),
        Err(tungstenite::Error::Http(response))
            if matches!(
                response.status(),
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN
            ) =>
        {
            Handshake::Rejected(response.status())
        }
        Err(e) => Handshake::Failed(e.into()),
    }
}

/// Why a read loop returned.
#[derive(Debug)]
pub(crate) enum Dropped {
    ClosedByServer,
    Error(Error),
}

/// Feeds text frames to the center until the socket ends.
pub(crate) async fn read_frames(socket: &mut Socket, center: &NotificationCenter) -> Dropped {
    while let Some(frame) = socket.next().await {
        match frame {
            Ok(Message::Text(text)) => {
                center.receive(&text);
            }
            Ok(Message::Close(frame)) => {
                log::debug!("Push channel closed by server: {frame:?}");
                return Dropped::ClosedByServer;
            }
            // pings are answered by tungstenite itself
            Ok(_) => {}
            Err(e) => return Dropped::Error(e.into()),
        }
    }
    Dropped::ClosedByServer
}

pub(crate) async fn close(socket: &mut Socket) {
    if let Err(e) = socket.close(None).await {
        log::debug!("Closing push channel: {e}");
    }
}
