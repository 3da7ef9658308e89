//! CLI command definitions and argument parsing

use std::path::PathBuf;

use clap::Parser;
use clap::Subcommand;

use crate::transcript::ChatDialect;

#[derive(Parser)]
#[command(name = "chatlens")]
#[command(about = "ChatLens CLI tool for chat transcript analysis")]
#[command(version)]
pub struct Cli {
    /// Enable verbose debug logging (default: info level)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to a config file (default: config.toml, then config.example.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Infer an MBTI type for every participant
    Mbti {
        /// Transcript file
        file: PathBuf,
        /// Export dialect (whatsapp, whatsapp-dash, whatsapp-iso, hangouts)
        #[arg(short, long, default_value = "whatsapp")]
        format: ChatDialect,
        /// Target number of chunks
        #[arg(long)]
        target_chunks: Option<usize>,
        /// Minimum messages per participant per chunk
        #[arg(long)]
        min_messages: Option<usize>,
        /// Significance threshold for the per-axis binomial test
        #[arg(long)]
        alpha: Option<f64>,
        /// First message index to analyse
        #[arg(long, default_value = "0")]
        from: usize,
        /// Stop before this message index
        #[arg(long)]
        to: Option<usize>,
        /// Ask the model for a short description of each final type
        #[arg(long)]
        describe: bool,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show the words each participant uses disproportionately
    Words {
        /// Transcript file
        file: PathBuf,
        /// Export dialect (whatsapp, whatsapp-dash, whatsapp-iso, hangouts)
        #[arg(short, long, default_value = "whatsapp")]
        format: ChatDialect,
        /// Number of words per participant
        #[arg(short, long)]
        top: Option<usize>,
        /// Exponent applied to ratios for word-cloud weights
        #[arg(long)]
        size_ratio: Option<f64>,
        /// Print ratios and weights as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show message counts and monthly word counts per participant
    Stats {
        /// Transcript file
        file: PathBuf,
        /// Export dialect (whatsapp, whatsapp-dash, whatsapp-iso, hangouts)
        #[arg(short, long, default_value = "whatsapp")]
        format: ChatDialect,
    },
    /// Show weekly average sentiment per participant
    Sentiment {
        /// Transcript file
        file: PathBuf,
        /// Export dialect (whatsapp, whatsapp-dash, whatsapp-iso, hangouts)
        #[arg(short, long, default_value = "whatsapp")]
        format: ChatDialect,
        /// Print the weekly series as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show current configuration
    Config,
}
