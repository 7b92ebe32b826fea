//! Websocket transport used by the exchange.
//!
//! The exchange talks to a [`Transport`] obtained from a [`Connector`] so it
//! can run against a scripted peer in tests. [`WsConnector`] is the real
//! implementation on top of tokio-tungstenite.

use std::io;

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::error::ProtocolError;
use tokio_tungstenite::tungstenite::{self, Message};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::debug;

use crate::error::ClientError;

/// A data message from the server, or the end of the connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Incoming {
    Text(String),
    Binary(Vec<u8>),
    Closed,
}

#[async_trait]
pub trait Transport: Send {
    /// Send `payload` as one binary message.
    async fn send_binary(&mut self, payload: Vec<u8>) -> Result<(), ClientError>;

    /// Wait for the next data message. Control frames are not returned.
    async fn recv(&mut self) -> Result<Incoming, ClientError>;

    /// Start the closing handshake. Failures are not reported.
    async fn close(&mut self);
}

#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self, url: &str) -> Result<Box<dyn Transport>, ClientError>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct WsConnector;

#[async_trait]
impl Connector for WsConnector {
    async fn connect(&self, url: &str) -> Result<Box<dyn Transport>, ClientError> {
        let (stream, response) = connect_async(url)
            .await
            .map_err(|error| connect_error(url, error))?;
        debug!(%url, status = %response.status(), "ws: handshake complete");
        Ok(Box::new(WsTransport {
            stream,
            peer_closed: false,
        }))
    }
}

pub struct WsTransport {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
    /// The server started the closing handshake or dropped the connection.
    peer_closed: bool,
}

#[async_trait]
impl Transport for WsTransport {
    async fn send_binary(&mut self, payload: Vec<u8>) -> Result<(), ClientError> {
        self.stream
            .send(Message::Binary(payload.into()))
            .await
            .map_err(|error| ClientError::Send(Box::new(error)))
    }

    async fn recv(&mut self) -> Result<Incoming, ClientError> {
        loop {
            let Some(message) = self.stream.next().await else {
                return Ok(Incoming::Closed);
            };
            let message = match message {
                Ok(message) => message,
                Err(error) if is_closed(&error) => {
                    debug!(%error, "ws: connection ended");
                    self.peer_closed = true;
                    return Ok(Incoming::Closed);
                }
                Err(error) => return Err(ClientError::Receive(Box::new(error))),
            };
            match message {
                Message::Text(text) => return Ok(Incoming::Text(text.as_str().to_owned())),
                Message::Binary(bytes) => return Ok(Incoming::Binary(bytes.to_vec())),
                Message::Close(frame) => {
                    debug!(?frame, "ws: close frame received");
                    self.peer_closed = true;
                    return Ok(Incoming::Closed);
                }
                Message::Ping(_) | Message::Pong(_) | Message::Frame(_) => {}
            }
        }
    }

    async fn close(&mut self) {
        // After a peer Close, tungstenite has queued our reply; flushing sends
        // it. Otherwise we start the handshake ourselves.
        let started = if self.peer_closed {
            self.stream.flush().await
        } else {
            self.stream.close(None).await
        };
        if let Err(error) = started {
            debug!(%error, "ws: close handshake failed");
        }
        // Read until the peer acknowledges and the stream ends.
        while let Some(Ok(message)) = self.stream.next().await {
            debug!(?message, "ws: discarded while closing");
        }
        self.peer_closed = true;
    }
}

fn connect_error(url: &str, error: tungstenite::Error) -> ClientError {
    match &error {
        tungstenite::Error::Io(io_error) if io_error.kind() == io::ErrorKind::ConnectionRefused => {
            ClientError::ConnectRefused {
                url: url.to_owned(),
            }
        }
        _ => ClientError::Connect(Box::new(error)),
    }
}

fn is_closed(error: &tungstenite::Error) -> bool {
    matches!(
        error,
        tungstenite::Error::ConnectionClosed
            | tungstenite::Error::AlreadyClosed
            | tungstenite::Error::Protocol(ProtocolError::ResetWithoutClosingHandshake)
    )
}

#[cfg(test)]
#[path = "transport_test.rs"]
mod tests;
