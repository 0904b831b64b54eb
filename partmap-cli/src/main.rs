//! Partmap CLI - part-number resolution tool for operators.

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

/// Default server address for remote commands.
const DEFAULT_SERVER: &str = "http://127.0.0.1:8080";

#[derive(Parser)]
#[command(name = "partmap")]
#[command(author, version, about = "Catalog image part-number resolution", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract candidate part numbers from a filename (offline)
    Extract {
        /// Image filename to analyze
        #[arg(value_name = "FILENAME")]
        filename: String,

        /// Emit the candidates as JSON
        #[arg(long)]
        json: bool,
    },

    /// Resolve a filename to a part number via a running server
    Resolve {
        /// Image filename to resolve
        #[arg(value_name = "FILENAME")]
        filename: String,

        /// Server base URL
        #[arg(long, default_value = DEFAULT_SERVER)]
        server: String,
    },

    /// Suggest part numbers for a typed prefix
    Suggest {
        /// Partial part number (at least two characters)
        #[arg(value_name = "PREFIX")]
        prefix: String,

        /// Server base URL
        #[arg(long, default_value = DEFAULT_SERVER)]
        server: String,
    },

    /// Check whether a part number is active
    Validate {
        /// Part number to validate
        #[arg(value_name = "PART_NUMBER")]
        part_number: String,

        /// Server base URL
        #[arg(long, default_value = DEFAULT_SERVER)]
        server: String,
    },

    /// Rebuild the server's interchange cache
    RefreshCache {
        /// Server base URL
        #[arg(long, default_value = DEFAULT_SERVER)]
        server: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Extract { filename, json } => commands::extract::execute(&filename, json),
        Commands::Resolve { filename, server } => {
            commands::resolve::execute(&server, &filename).await
        }
        Commands::Suggest { prefix, server } => commands::suggest::execute(&server, &prefix).await,
        Commands::Validate {
            part_number,
            server,
        } => commands::validate::execute(&server, &part_number).await,
        Commands::RefreshCache { server } => commands::refresh::execute(&server).await,
    }
}
