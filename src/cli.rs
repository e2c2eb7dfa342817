use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "cinestream")]
#[command(author, version, about = "Media delivery server with HTTP range streaming")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the asset server
    Start {
        /// Host to bind to (overrides config)
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on (overrides config)
        #[arg(short, long)]
        port: Option<u16>,

        /// Directory holding the asset files (overrides config)
        #[arg(long)]
        assets: Option<PathBuf>,
    },

    /// Resolve an asset and show how a range request would be served
    Inspect {
        /// Asset identifier
        #[arg(required = true)]
        asset_id: String,

        /// Range header value to resolve, e.g. "bytes=0-1023"
        #[arg(long)]
        range: Option<String>,

        /// Directory holding the asset files (overrides config)
        #[arg(long)]
        assets: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Validate configuration file
    Validate {
        /// Config file to validate (uses default if not specified)
        config: Option<PathBuf>,
    },

    /// Display version information
    Version,
}
