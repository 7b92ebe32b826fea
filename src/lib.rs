//! Manual integration harness for a speech-to-text websocket server.
//!
//! Connects to the server, waits for its greeting, uploads a WAV file as one
//! binary message, and prints every reply until the server sends a message
//! that is not a `Transcription:` update or closes the connection.

pub mod app;
pub mod cli;
pub mod config;
pub mod console;
pub mod error;
pub mod exchange;
pub mod reply;
pub mod transport;

#[cfg(test)]
mod test_support;

pub use error::{ClientError, Stage};
pub use exchange::{ExchangeReport, run_exchange};
pub use reply::Reply;
pub use transport::{Connector, Incoming, Transport, WsConnector};
