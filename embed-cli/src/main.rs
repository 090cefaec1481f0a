//! embed CLI: embed documents or a query with the configured model, print vector name.
//! Output goes to stdout; logs to stderr.
//! Config from env (.env supported) and optional `--model`.

use anyhow::{Context, Result};
use clap::Parser;
use embed_cli::{execute, load_config, Cli};
use fastembed_embedding::create_embedding_provider;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Logs go to stderr so stdout stays machine-readable.
    tracing_subscriber::fmt()
        .with_env_filter(std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.model)
        .context("Load embedding config from .env (EMBEDDING_PROVIDER, EMBEDDING_MODEL)")?;
    let provider = create_embedding_provider(&config)?;

    let output = execute(cli.command, provider.as_ref()).await?;
    println!("{}", output);

    Ok(())
}
