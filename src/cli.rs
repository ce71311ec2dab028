use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "streamvert")]
#[command(author, version, about = "Client for an HLS to MP4 conversion service")]
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
    /// Submit a conversion and follow it until it finishes
    Convert {
        /// Remote manifest URL to convert
        url: Option<String>,

        /// Local .m3u8/.m3u manifest to upload instead of a URL
        #[arg(short, long, conflicts_with = "url")]
        file: Option<PathBuf>,
    },

    /// List jobs known to the server, most recent first
    Jobs,

    /// Show a single job
    Status {
        /// Job id
        id: String,
    },

    /// Delete a job and its converted artifact
    Delete {
        /// Job id
        id: String,
    },

    /// Show how a finished job would be played back
    Play {
        /// Job id
        id: String,
    },

    /// Check that the conversion service is reachable
    Health,
}
