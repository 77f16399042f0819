//! Command-line client for the Bing Webmaster link-graph API.

mod commands;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use bing_webmaster::cancellation::CancellationToken;
use bing_webmaster::config::ClientConfig;
use bing_webmaster::observability::{init_tracing, LogFormat};
use bing_webmaster::WebmasterClient;
use clap::Parser;

use commands::Command;

/// Inspect inbound links and manage URL settings of a verified site.
#[derive(Parser, Debug)]
#[command(name = "bing-webmaster")]
#[command(version, about, long_about = None)]
struct Cli {
    /// JSON configuration file (defaults to BING_WEBMASTER_API_KEY / BING_WEBMASTER_API_URL)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

impl Cli {
    fn client_config(&self) -> Result<ClientConfig> {
        match &self.config {
            Some(path) => ClientConfig::from_json_file(path)
                .with_context(|| format!("Failed to load configuration from {}", path.display())),
            None => ClientConfig::from_env().context("Failed to load configuration from environment"),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let format = if cli.json_logs { LogFormat::Json } else { LogFormat::Pretty };
    init_tracing(cli.debug, format)?;

    let client = WebmasterClient::new(cli.client_config()?)?;

    let cancel = Arc::new(CancellationToken::new());
    let on_interrupt = Arc::clone(&cancel);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Interrupted, cancelling");
            on_interrupt.cancel("interrupted by user");
        }
    });

    let mut stdout = std::io::stdout();
    commands::run(&client, cli.command, &cancel, &mut stdout).await
}
