//! CLI command definitions for the `interlude` binary.

pub mod agent;
pub mod serve;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Streaming chat-turn service and data agent.
#[derive(Parser)]
#[command(name = "interlude", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Configuration file.
    #[arg(long, global = true, env = "INTERLUDE_CONFIG", default_value = "interlude.toml")]
    pub config: PathBuf,

    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for debug, -vv for trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Export spans through OpenTelemetry (stdout exporter).
    #[arg(long, global = true)]
    pub otel: bool,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Default log filter from `-v`/`--quiet`; `RUST_LOG` still wins.
    pub fn log_directive(&self) -> &'static str {
        match self.verbose {
            0 if self.quiet => "error",
            0 => "info,tower_http=warn",
            1 => "debug,interlude=debug",
            _ => "trace",
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the chat-turn HTTP service.
    Serve {
        /// Address to bind (overrides [server].host).
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on (overrides [server].port).
        #[arg(long, short)]
        port: Option<u16>,
    },

    /// Assemble the data agent from configuration and report it.
    Agent {
        /// Resolve the user as this email, as if sent in the user cookie.
        #[arg(long = "as", value_name = "EMAIL")]
        as_email: Option<String>,
    },
}
