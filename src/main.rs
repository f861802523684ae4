mod cli;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use daybook::config::DaybookConfig;
use daybook::server;

#[derive(Parser)]
#[command(name = "daybook", version, about = "Journaling web service with an LLM chat companion")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start the HTTP server
    Serve,
    /// Check journal documents and report unreadable or unparsable files
    Scan,
    /// Print entry summaries, newest first
    List,
    /// Print one entry with its parsed exchanges
    Show {
        /// Entry id (filename without extension, e.g. 2026-02-03)
        id: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load config (for log level)
    let config = DaybookConfig::load()?;

    // Initialize tracing with the configured log level, to stderr so the
    // CLI commands keep stdout for their own output.
    let filter = EnvFilter::try_new(&config.server.log_level)
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Serve => {
            server::serve(config).await?;
        }
        Command::Scan => {
            cli::scan(&config)?;
        }
        Command::List => {
            cli::list(&config)?;
        }
        Command::Show { id } => {
            cli::show(&config, &id)?;
        }
    }

    Ok(())
}
