use std::path::PathBuf;

use supports_color::Stream;

use crate::cli::Cli;

#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub root: PathBuf,
    pub branch: Option<String>,
    pub since: Option<String>,
    pub ext: Option<String>,
    pub contributors: bool,
    pub fast: bool,
    pub full: bool,
    pub limit: usize,
    pub json: bool,
    pub no_color: bool,
}

impl RuntimeConfig {
    pub fn use_colors(&self) -> bool {
        !self.no_color && supports_color::on(Stream::Stdout).is_some()
    }
}

impl From<Cli> for RuntimeConfig {
    fn from(cli: Cli) -> Self {
        Self {
            root: cli.path,
            branch: cli.branch,
            since: cli.since,
            ext: cli.ext,
            contributors: cli.contributors,
            fast: cli.fast,
            full: cli.full,
            limit: cli.limit,
            json: cli.json,
            no_color: cli.no_color,
        }
    }
}
