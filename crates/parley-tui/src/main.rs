//! Parley entry point.

use std::{fs::OpenOptions, path::Path, process::ExitCode, sync::Mutex};

use parley_tui::{Args, ChatConfig, CrosstermScreen, Runtime, TerminalDriver};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let args = Args::parse_lenient(std::env::args_os()).unwrap_or_else(|e| e.exit());
    let config = ChatConfig::from_args(&args);

    // Stdout is the chat window, so logs only go to a file.
    if let Some(path) = &config.log_file {
        init_logging(path, &config.log_level)?;
    }

    let screen = CrosstermScreen::new()?;
    let mut runtime =
        Runtime::new(TerminalDriver::new()?, screen, config.role).with_notices(config.notices);
    let status = runtime.run().await?;

    Ok(ExitCode::from(status.code()))
}

fn init_logging(path: &Path, level: &str) -> std::io::Result<()> {
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(Mutex::new(file)).with_ansi(false))
        .with(filter)
        .init();
    Ok(())
}
