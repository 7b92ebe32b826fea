//! Error taxonomy for the upload client and its exit-code contract.

use std::fmt;
use std::io;
use std::path::PathBuf;

use tokio_tungstenite::tungstenite;

/// Exit code for a completed exchange.
pub const EXIT_OK: u8 = 0;
/// Exit code when the server's terminal reply reports an error.
pub const EXIT_SERVER_ERROR: u8 = 10;

/// Suspension point that a deadline was applied to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Connect,
    Greeting,
    Send,
    Reply,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Connect => "websocket connection",
            Self::Greeting => "server greeting",
            Self::Send => "upload to complete",
            Self::Reply => "server reply",
        };
        f.write_str(label)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Rendered clap usage text.
    #[error("{0}")]
    Usage(String),
    #[error("File {} does not exist", .0.display())]
    MissingFile(PathBuf),
    #[error("failed to read {}: {source}", path.display())]
    ReadFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Failed to connect. Make sure the server is running.")]
    ConnectRefused { url: String },
    #[error("websocket connect failed: {0}")]
    Connect(Box<tungstenite::Error>),
    #[error("timed out waiting for {0}")]
    Timeout(Stage),
    #[error("websocket send failed: {0}")]
    Send(Box<tungstenite::Error>),
    #[error("websocket receive failed: {0}")]
    Receive(Box<tungstenite::Error>),
    #[error("connection closed before the server greeting arrived")]
    ClosedBeforeGreeting,
    #[error("malformed response: {0}")]
    MalformedResponse(String),
    #[error("console write failed: {0}")]
    Console(#[from] io::Error),
}

impl ClientError {
    /// Process exit code for this failure class.
    #[must_use]
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Console(_) => 1,
            Self::Usage(_) => 2,
            Self::MissingFile(_) | Self::ReadFile { .. } => 3,
            Self::ConnectRefused { .. } => 4,
            Self::Connect(_) => 5,
            Self::Timeout(_) => 6,
            Self::Send(_) => 7,
            Self::Receive(_) | Self::ClosedBeforeGreeting => 8,
            Self::MalformedResponse(_) => 9,
        }
    }
}

#[cfg(test)]
#[path = "error_test.rs"]
mod tests;
