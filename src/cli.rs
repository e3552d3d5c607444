use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Tikun Olam demo gateway — Sefirot scoring over streamed analysis.
#[derive(Parser, Debug)]
#[command(name = "tikun-olam")]
#[command(version = "0.1.0")]
#[command(about = "Sefirot scoring API with streamed analysis progress.", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the HTTP gateway
    Serve {
        /// Host to bind to
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on (use 0 for a random available port)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Clear the store and reload the demo fixtures
    Seed {
        /// Directory holding the fixture JSON files
        #[arg(long, default_value = "data")]
        data_dir: PathBuf,
    },

    /// Submit a scenario and follow the streamed progress
    Analyze {
        /// Unique case name
        #[arg(long)]
        case_name: String,

        /// Free-text scenario to score
        #[arg(long)]
        scenario: String,

        /// Gateway base URL
        #[arg(long, default_value = "http://127.0.0.1:8080")]
        url: String,
    },
}
