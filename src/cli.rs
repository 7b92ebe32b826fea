use std::ffi::OsString;
use std::path::PathBuf;

use clap::Parser;

use crate::config::{
    DEFAULT_CONNECT_TIMEOUT_SECS, DEFAULT_RECV_TIMEOUT_SECS, DEFAULT_SEND_TIMEOUT_SECS,
    DEFAULT_URL,
};

#[derive(Parser, Debug)]
#[command(
    name = "wavsend",
    version,
    about = "Upload a WAV file to a speech-to-text websocket server and print the replies"
)]
pub struct Cli {
    /// WAV file to upload; sent as-is in a single binary message.
    pub wav_path: PathBuf,

    #[arg(long, env = "WAVSEND_URL", default_value = DEFAULT_URL)]
    pub url: String,

    #[arg(
        long,
        env = "WAVSEND_CONNECT_TIMEOUT_SECS",
        default_value_t = DEFAULT_CONNECT_TIMEOUT_SECS,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub connect_timeout_secs: u64,

    #[arg(
        long,
        env = "WAVSEND_RECV_TIMEOUT_SECS",
        default_value_t = DEFAULT_RECV_TIMEOUT_SECS,
        value_parser = clap::value_parser!(u64).range(1..),
        help = "Deadline for the greeting and for each reply"
    )]
    pub recv_timeout_secs: u64,

    #[arg(
        long,
        env = "WAVSEND_SEND_TIMEOUT_SECS",
        default_value_t = DEFAULT_SEND_TIMEOUT_SECS,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub send_timeout_secs: u64,
}

#[derive(Debug)]
pub enum ParseOutcome {
    Run(Cli),
    /// `--help` or `--version` text; printed and exits successfully.
    Info(String),
    /// Rendered usage error.
    Usage(String),
}

#[must_use]
pub fn parse_args<I, T>(args: I) -> ParseOutcome
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    match Cli::try_parse_from(args) {
        Ok(cli) => ParseOutcome::Run(cli),
        Err(error) if !error.use_stderr() => ParseOutcome::Info(error.render().to_string()),
        Err(error) => ParseOutcome::Usage(error.render().to_string()),
    }
}

#[cfg(test)]
#[path = "cli_test.rs"]
mod tests;
