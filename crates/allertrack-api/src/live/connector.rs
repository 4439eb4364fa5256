// Socket abstraction for the live channel.
//
// The channel loop never touches tungstenite directly; it talks to a
// `Connector` that yields a `FrameSource` of text frames. Production uses
// the WebSocket implementation below; tests inject scripted fakes so the
// reconnect machinery runs against a fake clock instead of real sockets.

use futures_util::StreamExt;
use futures_util::stream::SplitStream;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::{self, ClientRequestBuilder};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use url::Url;

use crate::error::Error;

/// A source of inbound text frames from one established connection.
///
/// `None` means the peer closed the stream (close frame or EOF); an error
/// means the transport failed mid-stream. Both terminate the connection
/// and hand control back to the retry machinery.
pub trait FrameSource: Send {
    fn next_frame(&mut self) -> impl Future<Output = Option<Result<String, Error>>> + Send;
}

/// Factory for establishing one logical connection at a time.
pub trait Connector: Send + Sync + 'static {
    type Source: FrameSource;

    fn connect(&self, url: &Url) -> impl Future<Output = Result<Self::Source, Error>> + Send;
}

// ── WebSocket implementation ─────────────────────────────────────────

/// Production connector backed by `tokio-tungstenite`.
#[derive(Debug, Clone, Copy, Default)]
pub struct WsConnector;

pub struct WsFrameSource {
    url: String,
    read: SplitStream<WebSocketStream<MaybeTlsStream<TcpStream>>>,
}

impl Connector for WsConnector {
    type Source = WsFrameSource;

    async fn connect(&self, url: &Url) -> Result<WsFrameSource, Error> {
        let uri: tungstenite::http::Uri =
            url.as_str()
                .parse()
                .map_err(|e: tungstenite::http::uri::InvalidUri| Error::SocketConnect {
                    url: url.to_string(),
                    reason: e.to_string(),
                })?;
        let request = ClientRequestBuilder::new(uri);

        let (ws_stream, _response) = tokio_tungstenite::connect_async(request)
            .await
            .map_err(|e| Error::SocketConnect {
                url: url.to_string(),
                reason: e.to_string(),
            })?;

        // Write half is dropped: the protocol is push-only and tungstenite
        // answers pings internally.
        let (_write, read) = ws_stream.split();
        Ok(WsFrameSource {
            url: url.to_string(),
            read,
        })
    }
}

impl FrameSource for WsFrameSource {
    async fn next_frame(&mut self) -> Option<Result<String, Error>> {
        loop {
            match self.read.next().await {
                Some(Ok(tungstenite::Message::Text(text))) => {
                    return Some(Ok(text.to_string()));
                }
                Some(Ok(tungstenite::Message::Ping(_))) => {
                    tracing::trace!("live channel ping");
                }
                Some(Ok(tungstenite::Message::Close(frame))) => {
                    if let Some(ref cf) = frame {
                        tracing::info!(code = %cf.code, reason = %cf.reason, "close frame received");
                    } else {
                        tracing::info!("close frame received (no payload)");
                    }
                    return None;
                }
                Some(Err(e)) => {
                    return Some(Err(Error::Socket {
                        url: self.url.clone(),
                        reason: e.to_string(),
                    }));
                }
                None => {
                    tracing::info!("live channel stream ended");
                    return None;
                }
                _ => {
                    // Binary, Pong, Frame -- ignore
                }
            }
        }
    }
}
