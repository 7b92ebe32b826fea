//! Client configuration resolved from the command line and environment.

use std::time::Duration;

use crate::cli::Cli;

pub const DEFAULT_URL: &str = "ws://localhost:8080/ws";
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_RECV_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_SEND_TIMEOUT_SECS: u64 = 30;

/// Deadline applied to each suspension point of the exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub connect: Duration,
    /// Applies to the greeting and to every reply in the receive loop.
    pub recv: Duration,
    /// Applies to the upload and to the closing handshake.
    pub send: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            connect: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
            recv: Duration::from_secs(DEFAULT_RECV_TIMEOUT_SECS),
            send: Duration::from_secs(DEFAULT_SEND_TIMEOUT_SECS),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub url: String,
    pub timeouts: Timeouts,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_URL.to_owned(),
            timeouts: Timeouts::default(),
        }
    }
}

impl ClientConfig {
    #[must_use]
    pub fn from_cli(cli: &Cli) -> Self {
        Self {
            url: cli.url.clone(),
            timeouts: Timeouts {
                connect: Duration::from_secs(cli.connect_timeout_secs),
                recv: Duration::from_secs(cli.recv_timeout_secs),
                send: Duration::from_secs(cli.send_timeout_secs),
            },
        }
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
