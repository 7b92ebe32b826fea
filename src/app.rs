use std::ffi::OsString;
use std::io::Write;

use tracing::warn;

use crate::cli::{ParseOutcome, parse_args};
use crate::config::ClientConfig;
use crate::console::Console;
use crate::error::{ClientError, EXIT_OK, EXIT_SERVER_ERROR};
use crate::exchange::run_exchange;
use crate::transport::Connector;

/// Parse `args`, validate the input file, run one exchange, and return the
/// process exit code. All operator-facing output goes to `out`.
pub async fn run<I, T, W>(args: I, connector: &dyn Connector, out: W) -> u8
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
    W: Write,
{
    let mut console = Console::new(out);

    let cli = match parse_args(args) {
        ParseOutcome::Run(cli) => cli,
        ParseOutcome::Info(text) => {
            return match console.text(&text) {
                Ok(()) => EXIT_OK,
                Err(error) => fail(&mut console, &ClientError::Console(error)),
            };
        }
        ParseOutcome::Usage(usage) => return fail(&mut console, &ClientError::Usage(usage)),
    };

    if !cli.wav_path.is_file() {
        return fail(&mut console, &ClientError::MissingFile(cli.wav_path));
    }

    let config = ClientConfig::from_cli(&cli);
    match run_exchange(&config, &cli.wav_path, connector, &mut console).await {
        Ok(report) if report.server_error() => EXIT_SERVER_ERROR,
        Ok(_) => EXIT_OK,
        Err(error) => fail(&mut console, &error),
    }
}

fn fail<W: Write>(console: &mut Console<W>, error: &ClientError) -> u8 {
    if let Err(write_error) = console.error(error) {
        warn!(%error, %write_error, "could not report error on the console");
    }
    error.exit_code()
}

#[cfg(test)]
#[path = "app_test.rs"]
mod tests;
