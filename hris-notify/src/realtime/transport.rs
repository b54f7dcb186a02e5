//! Push transport abstraction and its WebSocket implementation.

use async_trait::async_trait;
use futures_util::StreamExt;
use tokio::net::TcpStream;
use tokio_tungstenite::{
    connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream,
};
use url::Url;

use crate::error::Result;

/// Opens push connections.
#[async_trait]
pub trait Connector: Send + Sync + std::fmt::Debug {
    /// Dial the endpoint. Resolves once the connection is open.
    async fn connect(&self, url: &Url) -> Result<Box<dyn Connection>>;
}

/// An open push connection.
#[async_trait]
pub trait Connection: Send {
    /// Next text payload from the server.
    ///
    /// Returns `None` once the connection has closed. Control frames are
    /// handled internally and never surface here.
    async fn recv(&mut self) -> Option<Result<String>>;

    /// Close the connection. Safe to call more than once.
    async fn close(&mut self);
}

/// [`Connector`] over `tokio-tungstenite`.
#[derive(Debug, Clone, Copy, Default)]
pub struct WsConnector;

#[async_trait]
impl Connector for WsConnector {
    async fn connect(&self, url: &Url) -> Result<Box<dyn Connection>> {
        let (stream, response) = connect_async(url.as_str()).await?;
        log::debug!("[ws] handshake complete: {}", response.status());
        Ok(Box::new(WsConnection { stream }))
    }
}

struct WsConnection {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

#[async_trait]
impl Connection for WsConnection {
    async fn recv(&mut self) -> Option<Result<String>> {
        loop {
            match self.stream.next().await? {
                Ok(Message::Text(text)) => return Some(Ok(text.as_str().to_owned())),
                Ok(Message::Binary(bytes)) => match String::from_utf8(bytes.to_vec()) {
                    Ok(text) => return Some(Ok(text)),
                    Err(_) => log::warn!("[ws] dropping non UTF-8 binary frame"),
                },
                Ok(Message::Close(frame)) => {
                    log::debug!("[ws] close frame: {:?}", frame);
                    return None;
                }
                Ok(Message::Ping(_) | Message::Pong(_) | Message::Frame(_)) => {}
                Err(e) => return Some(Err(e.into())),
            }
        }
    }

    async fn close(&mut self) {
        if let Err(e) = self.stream.close(None).await {
            log::debug!("[ws] close: {}", e);
        }
    }
}
