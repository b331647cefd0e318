//! Reagent CLI — the main entry point.
//!
//! Commands:
//! - `gateway` — Start the WebSocket gateway server
//! - `ask`     — Run a single question in-process and print the chain

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "reagent",
    about = "Reagent — a streaming reason-and-act agent",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the WebSocket gateway server
    Gateway {
        /// Override the port
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Ask a single question and stream the reasoning chain to stdout
    Ask {
        /// The question to answer
        question: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    match cli.command {
        Commands::Gateway { port } => commands::gateway::run(port).await?,
        Commands::Ask { question } => commands::ask::run(&question).await?,
    }

    Ok(())
}
