mod batch;
mod config;
mod errors;
mod loader;
mod models;
mod printer;
mod render;

use anyhow::Result;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::batch::run_batch;
use crate::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on malformed env vars)
    let config = Config::from_env()?;

    // Logs go to stderr; stdout carries only the per-job "Generated" lines.
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!("Starting resume-pdf v{}", env!("CARGO_PKG_VERSION"));

    let written = run_batch(&config).await?;
    info!("Generated {} PDF(s)", written.len());

    Ok(())
}
