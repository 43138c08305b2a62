mod config;
mod error;
mod fetch;
mod script;
mod session;

use std::fs;
use std::io;
use std::path::Path;
use std::process::ExitCode;

use clap::Parser;
use picker::error::ErrorCode;
use picker::viewport::ScreenMapping;
use tracing_subscriber::EnvFilter;

use crate::config::{Cli, FetchConfig};
use crate::error::AppError;
use crate::fetch::HttpImageFetcher;
use crate::script::Command;
use crate::session::Session;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();

    match run(Cli::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, code = e.error_code(), "loupe failed");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), AppError> {
    let text = read_script(cli.script.as_deref())?;
    let commands = script::parse_script(&text)?;

    let fetch_config = FetchConfig::from_env();
    tracing::info!(
        request_timeout_secs = fetch_config.request_timeout_secs,
        connect_timeout_secs = fetch_config.connect_timeout_secs,
        max_image_bytes = fetch_config.max_image_bytes,
        "fetch configured"
    );
    let fetcher = HttpImageFetcher::new(&fetch_config)?;
    let mapping = ScreenMapping::new(cli.surface_left, cli.surface_top);

    let mut session = Session::new(fetcher, mapping, io::stdout().lock());
    if let Some(url) = cli.initial_image() {
        session.execute(Command::Load(url.to_string())).await?;
        session.execute(Command::Await).await?;
    }
    session.run(commands).await?;

    if let Some(hex) = session.picker().core.final_hex() {
        tracing::info!(%hex, "session finished");
    }
    Ok(())
}

fn read_script(path: Option<&Path>) -> Result<String, AppError> {
    match path {
        Some(path) => Ok(fs::read_to_string(path)?),
        None => Ok(io::read_to_string(io::stdin())?),
    }
}
