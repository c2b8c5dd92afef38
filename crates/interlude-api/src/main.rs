//! Interlude CLI and HTTP entry point.
//!
//! Binary name: `interlude`
//!
//! Loads `.env`, parses arguments, sets up tracing, loads configuration,
//! then runs the chat-turn service or reports the assembled agent.

mod cli;
mod http;
mod state;

use clap::Parser;

use interlude_infra::config::load_config;

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Variables from .env feed the config overrides below.
    dotenv::dotenv().ok();

    let cli = Cli::parse();

    interlude_observe::init_tracing(cli.log_directive(), cli.otel)
        .map_err(|e| anyhow::anyhow!("failed to initialize tracing: {e}"))?;

    let result = run(cli).await;
    interlude_observe::shutdown_tracing();
    result
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = load_config(&cli.config).await?;
    tracing::debug!(config = ?config, "configuration loaded");

    match cli.command {
        Commands::Serve { host, port } => cli::serve::serve(config, host, port).await,
        Commands::Agent { as_email } => {
            cli::agent::show_agent(&config, as_email.as_deref(), cli.json).await
        }
    }
}
