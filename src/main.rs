use std::process::ExitCode;

mod app;
mod config;
mod db;
mod error;
mod facebook;
mod feed;
mod models;
mod report;
mod services;

use app::Pipeline;
use config::Config;
use error::Result;

#[tokio::main]
async fn main() -> ExitCode {
    // Progress is reported at info; RUST_LOG narrows or widens it
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    exit_code(&run().await)
}

/// Single place a failed run is reported and turned into a status.
fn exit_code(result: &Result<()>) -> ExitCode {
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<()> {
    let config = Config::load()?;
    let pipeline = Pipeline::new(&config).await?;
    let summary = pipeline.run().await?;
    tracing::info!(
        articles = summary.articles_collected,
        rows = summary.rows_reported,
        "Done!"
    );
    Ok(())
}
