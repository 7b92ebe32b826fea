use std::process::ExitCode;

use tracing_subscriber::EnvFilter;
use wavsend::WsConnector;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let code = wavsend::app::run(std::env::args_os(), &WsConnector, std::io::stdout()).await;
    ExitCode::from(code)
}
