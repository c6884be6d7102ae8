use std::time::Duration;

use snafu::prelude::*;
use tracing::{debug, warn};

use crate::application::RuntimeConfig;
use crate::git::{GitError, GitRepo};
use crate::index::{MetadataIndex, RunMode, decide_mode};
use crate::render::{TreeRenderer, render_json};
use crate::tree::TreeNode;

/// Upper bound for each batched history query. A blown budget degrades
/// metadata to "unknown" instead of failing the render.
const QUERY_BUDGET: Duration = Duration::from_secs(5);

/// The enriched tree together with the flat path list it was folded from
/// and the metadata index (which carries the mode used and whether the
/// history results were partial).
#[derive(Debug)]
pub struct TreeReport {
    pub root: TreeNode,
    pub files: Vec<String>,
    pub index: MetadataIndex,
}

pub struct Application;

impl Application {
    pub async fn run(config: impl Into<RuntimeConfig>) -> Result<(), ApplicationError> {
        let config: RuntimeConfig = config.into();
        let report = Self::build_tree(&config).await?;

        if config.json {
            let output = render_json(&report.files, &report.index).context(JsonSnafu)?;
            println!("{output}");
        } else {
            let output = TreeRenderer::new(config.use_colors()).render(&report.root);
            if output.is_empty() {
                warn!("No files match the specified criteria");
            } else {
                println!("{output}");
            }
        }

        Ok(())
    }

    /// The whole enrichment pipeline: list tracked paths, apply the since
    /// and extension filters, decide the run mode, collect metadata, fold
    /// the tree. Listing failures are fatal; everything after degrades.
    pub async fn build_tree(config: &RuntimeConfig) -> Result<TreeReport, ApplicationError> {
        let repo = GitRepo::open(&config.root).await.context(RepositorySnafu)?;

        let mut files = repo
            .list_tracked_files(config.branch.as_deref())
            .await
            .context(RepositorySnafu)?;

        if let Some(since) = &config.since {
            files = repo.filter_changed_since(files, since, QUERY_BUDGET).await;
        }
        if let Some(ext) = &config.ext {
            apply_ext_filter(&mut files, ext);
        }
        // Deterministic output: children end up in lexicographic
        // first-seen order.
        files.sort_unstable();

        let mode = decide_mode(files.len(), config.limit, config.fast, config.full);
        debug!("Processing {} files in {mode} mode", files.len());
        if mode == RunMode::AutoFast {
            warn!(
                "{} files found, using fast mode (no metadata) for performance; \
                 raise --limit or pass --fast to silence this",
                files.len()
            );
        }

        let index = MetadataIndex::collect(
            &repo,
            &files,
            mode,
            config.contributors,
            config.since.as_deref(),
            QUERY_BUDGET,
        )
        .await;
        if index.partial {
            warn!("History queries did not finish in time; some files are shown without metadata");
        }

        let root = TreeNode::build(files.iter().map(|path| (path.clone(), index.get(path))));

        Ok(TreeReport { root, files, index })
    }
}

/// Keeps only paths with the given extension (without the leading dot).
fn apply_ext_filter(files: &mut Vec<String>, ext: &str) {
    let suffix = format!(".{ext}");
    files.retain(|file| file.ends_with(&suffix));
}

#[derive(Debug, Snafu)]
pub enum ApplicationError {
    #[snafu(display("Cannot build a tree without a valid repository"))]
    RepositoryError { source: GitError },
    #[snafu(display("Failed to serialize the tree to JSON"))]
    JsonError { source: serde_json::Error },
}
