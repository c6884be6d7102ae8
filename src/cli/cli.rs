use std::path::PathBuf;

use clap::Parser;

use crate::application::data::LogLevel;

#[derive(Parser, Debug, Clone)]
#[command(version, about = "Git-aware directory tree with recency metadata")]
pub struct Cli {
    /// Path to the Git repository
    #[clap(default_value = ".")]
    pub path: PathBuf,

    /// Show the tree for a specific branch or ref
    #[clap(long, short)]
    pub branch: Option<String>,

    /// Only keep files with commits since the given date (e.g. '2023-01-01')
    #[clap(long)]
    pub since: Option<String>,

    /// Only keep files with the given extension (e.g. 'py')
    #[clap(long)]
    pub ext: Option<String>,

    /// Show the number of unique contributors per file
    #[clap(long)]
    pub contributors: bool,

    /// Skip all history metadata (much faster for large repositories)
    #[clap(long)]
    pub fast: bool,

    /// Collect metadata even when the file count exceeds the limit
    #[clap(long)]
    pub full: bool,

    /// Maximum number of files to process with metadata
    #[clap(long, default_value_t = 1000)]
    pub limit: usize,

    /// Emit machine-readable JSON instead of a text tree
    #[clap(long)]
    pub json: bool,

    /// Disable colored output
    #[clap(long)]
    pub no_color: bool,

    #[clap(long, short, default_value = "warn", value_enum)]
    pub log_level: LogLevel,
}
