use std::{path::PathBuf, process::ExitCode};

use anyhow::{Context, Result};
use tracing::error;
use tracing_subscriber::EnvFilter;

async fn run() -> Result<PathBuf> {
    digi1_calendar::sync(|key| std::env::var(key).ok())
        .await
        .context("calendar sync failed")
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    match run().await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}
