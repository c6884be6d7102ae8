use std::collections::{HashMap, HashSet};
use std::time::Duration;

use tracing::debug;

use crate::git::GitRepo;
use crate::index::RunMode;

/// Per-file history metadata. Both fields are absent in fast modes, and
/// absent for any path that no batched query resolved — "unknown", never
/// an error.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileMetadata {
    pub last_modified: Option<i64>,
    pub contributors: Option<usize>,
}

/// Join of the tracked path list with the batched history results, built
/// fresh per invocation and discarded with it.
#[derive(Debug)]
pub struct MetadataIndex {
    entries: HashMap<String, FileMetadata>,
    pub mode: RunMode,
    pub partial: bool,
}

impl MetadataIndex {
    /// Collects metadata for `paths` according to `mode`. Fast modes do no
    /// history work at all. In full mode the timestamp batch and the
    /// optional contributor batch run concurrently and are joined only
    /// after both finish; a timeout in either marks the index as partial.
    pub async fn collect(
        repo: &GitRepo,
        paths: &[String],
        mode: RunMode,
        with_contributors: bool,
        since: Option<&str>,
        budget: Duration,
    ) -> Self {
        if mode.skips_history() {
            debug!("Skipping history queries ({mode} mode)");
            return Self {
                entries: HashMap::new(),
                mode,
                partial: false,
            };
        }

        let (history, contributors) = if with_contributors {
            let (history, contributors) = futures::join!(
                repo.batched_log(paths, since, budget),
                repo.contributor_query(paths, budget)
            );
            (history, Some(contributors))
        } else {
            (repo.batched_log(paths, since, budget).await, None)
        };

        let partial = history.partial || contributors.as_ref().is_some_and(|c| c.partial);

        let entries = paths
            .iter()
            .map(|path| {
                let metadata = FileMetadata {
                    last_modified: history.latest.get(path).copied(),
                    contributors: contributors
                        .as_ref()
                        .and_then(|c| c.authors.get(path))
                        .map(HashSet::len),
                };
                (path.clone(), metadata)
            })
            .collect();

        Self {
            entries,
            mode,
            partial,
        }
    }

    /// Metadata for a path; absent fields for anything the batches did not
    /// resolve (or for every path in fast modes).
    pub fn get(&self, path: &str) -> FileMetadata {
        self.entries.get(path).cloned().unwrap_or_default()
    }

    #[cfg(test)]
    pub(crate) fn from_entries(
        entries: HashMap<String, FileMetadata>,
        mode: RunMode,
        partial: bool,
    ) -> Self {
        Self {
            entries,
            mode,
            partial,
        }
    }
}
