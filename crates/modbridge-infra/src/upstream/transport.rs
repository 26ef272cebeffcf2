//! WebSocket transport carrying the XMPP stream (§4.1.1). Wraps the split
//! `tokio-tungstenite` halves and speaks raw XML text frames; stanza framing
//! and semantics live in [`super::stanza`].

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use thiserror::Error;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("websocket connect failed: {0}")]
    Connect(#[from] tokio_tungstenite::tungstenite::Error),
    #[error("connection closed by peer (code {0})")]
    Closed(u16),
}

/// A live WebSocket connection to the upstream chat service.
pub struct UpstreamConnection {
    writer: SplitSink<WsStream, Message>,
    reader: SplitStream<WsStream>,
}

impl UpstreamConnection {
    /// Connect to the upstream WebSocket endpoint. `url` must use `wss://`.
    pub async fn connect(url: &str) -> Result<Self, TransportError> {
        let (ws, _response) = connect_async(url).await?;
        let (writer, reader) = ws.split();
        Ok(Self { writer, reader })
    }

    /// Send a raw XML stanza as a text frame.
    pub async fn send(&mut self, xml: &str) -> Result<(), TransportError> {
        self.writer.send(Message::Text(xml.to_string().into())).await?;
        Ok(())
    }

    /// Receive the next text frame (expected to be one XML stanza). Returns
    /// `Ok(None)` once the stream ends cleanly.
    pub async fn recv(&mut self) -> Result<Option<String>, TransportError> {
        loop {
            match self.reader.next().await {
                Some(Ok(Message::Text(text))) => return Ok(Some(text.to_string())),
                Some(Ok(Message::Close(frame))) => {
                    let code = frame.as_ref().map_or(1000, |f| f.code.into());
                    return Err(TransportError::Closed(code));
                }
                Some(Ok(Message::Ping(_) | Message::Pong(_) | Message::Binary(_) | Message::Frame(_))) => {
                    continue;
                }
                Some(Err(e)) => return Err(e.into()),
                None => return Ok(None),
            }
        }
    }

    /// Send a close frame.
    pub async fn close(&mut self) -> Result<(), TransportError> {
        self.writer.send(Message::Close(None)).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_error_displays_close_code() {
        let err = TransportError::Closed(1001);
        assert_eq!(err.to_string(), "connection closed by peer (code 1001)");
    }
}
