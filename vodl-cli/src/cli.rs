use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "vodl",
    version,
    about = "Plan HLS video-on-demand downloads",
    long_about = "Reads an HLS master playlist and the media playlist of one of its renditions, \
                  selects the segments covering a time range and writes the playlist used to join \
                  the downloaded segments."
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable debug logging
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only log errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to the configuration file
    #[arg(long, global = true, env = "VODL_CONFIG")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List the renditions of a master playlist
    Renditions {
        /// Master playlist file
        master: PathBuf,

        /// Output format
        #[arg(long, value_enum)]
        output: Option<OutputFormat>,
    },

    /// Select a rendition and segment range and write the join playlist
    Plan {
        /// Master playlist file
        master: PathBuf,

        /// Media playlist of the selected rendition. Defaults to the rendition
        /// URL resolved next to the master playlist.
        #[arg(long)]
        media: Option<PathBuf>,

        /// Quality to download: a rendition name, a group id or `source`
        #[arg(long)]
        quality: Option<String>,

        /// Start of the range, e.g. `90`, `1:30`, `01:01:30` or `1h1m30s`
        #[arg(short, long)]
        start: Option<String>,

        /// End of the range, same formats as --start
        #[arg(short, long)]
        end: Option<String>,

        /// URL segment paths are resolved against, overriding the rendition URL
        #[arg(long)]
        base_url: Option<String>,

        /// Directory the segments are downloaded to
        #[arg(short = 'o', long)]
        output_dir: Option<PathBuf>,

        /// File the segments are finally joined into
        #[arg(long, default_value = "output.mp4")]
        target: PathBuf,

        /// Output format
        #[arg(long, value_enum)]
        output: Option<OutputFormat>,

        /// Take the default rendition instead of prompting
        #[arg(long)]
        no_prompt: bool,
    },

    /// Show or reset the configuration
    Config {
        /// Print the effective configuration
        #[arg(long)]
        show: bool,

        /// Write the default configuration
        #[arg(long, conflicts_with = "show")]
        reset: bool,
    },
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human readable output
    #[default]
    Pretty,
    /// Pretty-printed JSON
    Json,
}

impl Commands {
    pub fn output_format(&self) -> Option<OutputFormat> {
        match self {
            Commands::Renditions { output, .. } | Commands::Plan { output, .. } => *output,
            Commands::Config { .. } => None,
        }
    }
}
