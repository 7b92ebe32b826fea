//! One upload exchange: connect, read the greeting, send the file as a single
//! binary message, then print replies until a terminal one arrives or the
//! server closes the connection.
//!
//! Every suspension point runs under a deadline from [`Timeouts`]; an expired
//! deadline is reported as [`ClientError::Timeout`] naming the stage.

use std::future::Future;
use std::io::Write;
use std::path::Path;
use std::time::Duration;

use tracing::{debug, info};

use crate::config::{ClientConfig, Timeouts};
use crate::console::Console;
use crate::error::{ClientError, Stage};
use crate::reply::Reply;
use crate::transport::{Connector, Incoming, Transport};

/// Result of an exchange that ran to completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExchangeReport {
    pub greeting: String,
    pub bytes_sent: usize,
    /// Replies in arrival order; only the last one can be terminal.
    pub replies: Vec<Reply>,
    /// The server closed the connection before sending a terminal reply.
    pub closed_early: bool,
}

impl ExchangeReport {
    #[must_use]
    pub fn final_reply(&self) -> Option<&Reply> {
        self.replies.last().filter(|reply| reply.is_terminal())
    }

    #[must_use]
    pub fn server_error(&self) -> bool {
        matches!(self.final_reply(), Some(Reply::ServerError(_)))
    }
}

/// Run one exchange against `config.url`, uploading the file at `wav_path`.
///
/// # Errors
///
/// Returns the first connect, read, send, or receive failure, a timeout for
/// whichever stage stalled, or a console write failure.
pub async fn run_exchange<W: Write>(
    config: &ClientConfig,
    wav_path: &Path,
    connector: &dyn Connector,
    console: &mut Console<W>,
) -> Result<ExchangeReport, ClientError> {
    let timeouts = config.timeouts;

    console.connecting(&config.url)?;
    console.flush()?;
    let mut transport =
        deadline(timeouts.connect, Stage::Connect, connector.connect(&config.url)).await?;
    info!(url = %config.url, "ws: connected");

    let outcome = converse(transport.as_mut(), timeouts, wav_path, console).await;

    if let Err(error) = &outcome {
        debug!(%error, "exchange failed");
    }
    if tokio::time::timeout(timeouts.send, transport.close()).await.is_err() {
        debug!("ws: close handshake timed out");
    }
    outcome
}

async fn converse<W: Write>(
    transport: &mut dyn Transport,
    timeouts: Timeouts,
    wav_path: &Path,
    console: &mut Console<W>,
) -> Result<ExchangeReport, ClientError> {
    // The greeting's content is never checked; a binary one is summarised.
    let greeting = match deadline(timeouts.recv, Stage::Greeting, transport.recv()).await? {
        Incoming::Text(text) => text,
        Incoming::Binary(bytes) => format!("<binary message, {} bytes>", bytes.len()),
        Incoming::Closed => return Err(ClientError::ClosedBeforeGreeting),
    };
    console.greeting(&greeting)?;
    console.flush()?;

    let payload = std::fs::read(wav_path).map_err(|source| ClientError::ReadFile {
        path: wav_path.to_path_buf(),
        source,
    })?;
    let bytes_sent = payload.len();
    console.sending(wav_path, bytes_sent)?;
    console.flush()?;

    deadline(timeouts.send, Stage::Send, transport.send_binary(payload)).await?;
    info!(path = %wav_path.display(), bytes = bytes_sent, "ws: upload sent");

    let mut replies = Vec::new();
    let mut closed_early = false;
    loop {
        match deadline(timeouts.recv, Stage::Reply, transport.recv()).await? {
            Incoming::Text(text) => {
                console.received(&text)?;
                console.flush()?;
                let reply = Reply::classify(text);
                let terminal = reply.is_terminal();
                debug!(?reply, terminal, "ws: reply");
                replies.push(reply);
                if terminal {
                    break;
                }
            }
            Incoming::Binary(bytes) => {
                return Err(ClientError::MalformedResponse(format!(
                    "expected a text reply, got {} binary bytes",
                    bytes.len()
                )));
            }
            Incoming::Closed => {
                console.connection_closed()?;
                console.flush()?;
                closed_early = true;
                break;
            }
        }
    }

    info!(replies = replies.len(), closed_early, "exchange complete");
    Ok(ExchangeReport {
        greeting,
        bytes_sent,
        replies,
        closed_early,
    })
}

async fn deadline<T>(
    limit: Duration,
    stage: Stage,
    fut: impl Future<Output = Result<T, ClientError>>,
) -> Result<T, ClientError> {
    tokio::time::timeout(limit, fut)
        .await
        .map_err(|_| ClientError::Timeout(stage))?
}

#[cfg(test)]
#[path = "exchange_test.rs"]
mod tests;
