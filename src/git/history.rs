use std::collections::{HashMap, HashSet};
use std::ops::ControlFlow;
use std::time::Duration;

use compio::io::compat::AsyncStream;
use futures::future::{Either, select};
use futures::{AsyncBufReadExt, StreamExt, io::BufReader};
use tracing::{debug, warn};

use super::repo::GitRepo;

/// Header format for batched log queries: \x01 marks a commit header,
/// \x1f separates the unix timestamp from the author name. `--name-only`
/// then emits the touched paths as plain lines.
const LOG_FORMAT: &str = "--format=%x01%ct%x1f%an";

/// One historical record linking a path to a point in time and an author.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitFact {
    pub path: String,
    pub timestamp: i64,
    pub author: String,
}

/// Most recent commit timestamp per path, out of one batched log query.
#[derive(Debug, Default)]
pub struct HistoryBatch {
    pub latest: HashMap<String, i64>,
    pub partial: bool,
}

/// Distinct author identities per path, out of one batched log query.
#[derive(Debug, Default)]
pub struct ContributorBatch {
    pub authors: HashMap<String, HashSet<String>>,
    pub partial: bool,
}

impl GitRepo {
    /// Resolves the most recent commit timestamp for every wanted path with
    /// a single `git log` over the whole history. Records arrive in reverse
    /// chronological order, so the first fact per path wins and the query
    /// stops as soon as every path is covered.
    pub async fn batched_log(
        &self,
        paths: &[String],
        since: Option<&str>,
        budget: Duration,
    ) -> HistoryBatch {
        if paths.is_empty() {
            return HistoryBatch::default();
        }

        let wanted: HashSet<&str> = paths.iter().map(String::as_str).collect();
        let mut latest: HashMap<String, i64> = HashMap::new();

        let mut args = vec!["log", LOG_FORMAT, "--name-only"];
        if let Some(date) = since {
            args.push("--since");
            args.push(date);
        }

        let partial = self
            .stream_log(&args, budget, |fact| {
                if wanted.contains(fact.path.as_str()) {
                    latest.entry(fact.path).or_insert(fact.timestamp);
                }
                if latest.len() == wanted.len() {
                    ControlFlow::Break(())
                } else {
                    ControlFlow::Continue(())
                }
            })
            .await;

        HistoryBatch { latest, partial }
    }

    /// Accumulates the distinct author set for every wanted path with a
    /// single full-history `git log`. Unlike [`Self::batched_log`] this
    /// cannot stop early: a path's author set is only complete once the
    /// whole history has been seen.
    pub async fn contributor_query(&self, paths: &[String], budget: Duration) -> ContributorBatch {
        if paths.is_empty() {
            return ContributorBatch::default();
        }

        let wanted: HashSet<&str> = paths.iter().map(String::as_str).collect();
        let mut authors: HashMap<String, HashSet<String>> = HashMap::new();

        let partial = self
            .stream_log(&["log", LOG_FORMAT, "--name-only"], budget, |fact| {
                if wanted.contains(fact.path.as_str()) {
                    authors.entry(fact.path).or_default().insert(fact.author);
                }
                ControlFlow::Continue(())
            })
            .await;

        ContributorBatch { authors, partial }
    }

    /// Intersects `files` with the set of paths that have commits since the
    /// given date, via one batched query. When the query times out or fails
    /// the list is returned unfiltered; dropping files based on incomplete
    /// history would silently hide them.
    pub async fn filter_changed_since(
        &self,
        files: Vec<String>,
        since: &str,
        budget: Duration,
    ) -> Vec<String> {
        let mut changed: HashSet<String> = HashSet::new();

        let partial = self
            .stream_log(
                &["log", LOG_FORMAT, "--name-only", "--since", since],
                budget,
                |fact| {
                    changed.insert(fact.path);
                    ControlFlow::Continue(())
                },
            )
            .await;

        if partial {
            warn!("Could not determine the files changed since '{since}', keeping the full list");
            return files;
        }

        files.into_iter().filter(|f| changed.contains(f)).collect()
    }

    /// Runs one batched log query, feeding each parsed [`CommitFact`] to
    /// `on_fact` until the stream ends, the callback breaks, or the time
    /// budget is spent. Returns whether the results are partial. Failures
    /// are recovered here; history is best-effort by contract.
    async fn stream_log(
        &self,
        args: &[&str],
        budget: Duration,
        mut on_fact: impl FnMut(CommitFact) -> ControlFlow<()>,
    ) -> bool {
        let mut cmd = self.git_command(args);
        let mut handle = match cmd.spawn() {
            Ok(handle) => handle,
            Err(e) => {
                warn!("Failed to spawn git log: {e}");
                return true;
            }
        };
        let Some(stdout) = handle.stdout.take() else {
            warn!("git log produced no stdout handle");
            return true;
        };

        let mut lines = BufReader::new(AsyncStream::new(stdout)).lines();
        let mut deadline = Box::pin(compio::time::sleep(budget));
        let mut parser = LogRecordParser::default();
        let mut timed_out = false;

        loop {
            match select(lines.next(), deadline.as_mut()).await {
                Either::Left((Some(Ok(line)), _)) => {
                    if let Some(fact) = parser.feed(&line) {
                        if on_fact(fact).is_break() {
                            // Dropping the pipe ends the child on its next write.
                            break;
                        }
                    }
                }
                Either::Left((Some(Err(e)), _)) => {
                    debug!("Error reading git log output: {e}");
                }
                Either::Left((None, _)) => {
                    let _ = handle.wait().await;
                    break;
                }
                Either::Right(_) => {
                    warn!("git log exceeded its {budget:?} budget, keeping partial results");
                    timed_out = true;
                    break;
                }
            }
        }

        timed_out
    }
}

/// Incremental parser for the `LOG_FORMAT` + `--name-only` line stream.
/// Holds the (timestamp, author) of the current commit header and yields
/// one [`CommitFact`] per path line under it.
#[derive(Debug, Default)]
struct LogRecordParser {
    current: Option<(i64, String)>,
}

impl LogRecordParser {
    fn feed(&mut self, line: &str) -> Option<CommitFact> {
        if let Some(header) = line.strip_prefix('\u{1}') {
            self.current = header.split_once('\u{1f}').and_then(|(timestamp, author)| {
                let timestamp = timestamp.trim().parse().ok()?;
                Some((timestamp, author.to_string()))
            });
            if self.current.is_none() {
                debug!("Skipping malformed log header: {line:?}");
            }
            return None;
        }

        let path = line.trim();
        if path.is_empty() {
            return None;
        }
        let (timestamp, author) = self.current.as_ref()?;

        Some(CommitFact {
            path: path.to_string(),
            timestamp: *timestamp,
            author: author.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::testutil::ScratchRepo;

    const BUDGET: Duration = Duration::from_secs(10);

    // 2021-02-01T12:00:00 +0000
    const FEB: i64 = 1_612_180_800;

    fn feed_all(lines: &[&str]) -> Vec<CommitFact> {
        let mut parser = LogRecordParser::default();
        lines.iter().filter_map(|line| parser.feed(line)).collect()
    }

    #[test]
    fn parser_attributes_paths_to_the_preceding_header() {
        let facts = feed_all(&[
            "\u{1}1700000000\u{1f}Alice",
            "",
            "src/a.rs",
            "src/b.rs",
            "\u{1}1600000000\u{1f}Bob",
            "",
            "src/a.rs",
        ]);

        assert_eq!(facts.len(), 3);
        assert_eq!(facts[0].path, "src/a.rs");
        assert_eq!(facts[0].timestamp, 1_700_000_000);
        assert_eq!(facts[0].author, "Alice");
        assert_eq!(facts[2].author, "Bob");
    }

    #[test]
    fn parser_ignores_paths_before_any_header() {
        assert!(feed_all(&["orphan.rs", ""]).is_empty());
    }

    #[test]
    fn parser_drops_records_under_a_malformed_header() {
        let facts = feed_all(&[
            "\u{1}not-a-timestamp\u{1f}Alice",
            "src/a.rs",
            "\u{1}1700000000\u{1f}Bob",
            "src/b.rs",
        ]);

        assert_eq!(facts.len(), 1);
        assert_eq!(facts[0].path, "src/b.rs");
    }

    #[test]
    fn parser_keeps_author_names_containing_separator_lookalikes() {
        let facts = feed_all(&["\u{1}1700000000\u{1f}Alice \u{1} Co", "a.rs"]);
        assert_eq!(facts[0].author, "Alice \u{1} Co");
    }

    #[compio::test]
    async fn batched_log_keeps_the_most_recent_timestamp_per_path() {
        let scratch = ScratchRepo::init();
        scratch.write("a.txt", "one\n");
        scratch.commit("Alice", "2021-01-01T12:00:00 +0000", "first");
        scratch.write("a.txt", "two\n");
        scratch.write("b.txt", "b\n");
        scratch.commit("Bob", "2021-02-01T12:00:00 +0000", "second");

        let repo = GitRepo::open(scratch.path()).await.expect("open repo");
        let paths = vec!["a.txt".to_string(), "b.txt".to_string()];
        let batch = repo.batched_log(&paths, None, BUDGET).await;

        assert!(!batch.partial);
        assert_eq!(batch.latest.get("a.txt"), Some(&FEB));
        assert_eq!(batch.latest.get("b.txt"), Some(&FEB));
    }

    #[compio::test]
    async fn batched_log_honors_the_since_filter() {
        let scratch = ScratchRepo::init();
        scratch.write("old.txt", "old\n");
        scratch.commit("Alice", "2021-01-01T12:00:00 +0000", "old");
        scratch.write("new.txt", "new\n");
        scratch.commit("Alice", "2021-02-01T12:00:00 +0000", "new");

        let repo = GitRepo::open(scratch.path()).await.expect("open repo");
        let paths = vec!["old.txt".to_string(), "new.txt".to_string()];
        let batch = repo.batched_log(&paths, Some("2021-01-15"), BUDGET).await;

        assert_eq!(batch.latest.get("old.txt"), None);
        assert_eq!(batch.latest.get("new.txt"), Some(&FEB));
    }

    #[compio::test]
    async fn contributor_query_counts_distinct_authors_not_commits() {
        let scratch = ScratchRepo::init();
        for (i, (author, date)) in [
            ("Alice", "2021-01-01T12:00:00 +0000"),
            ("Alice", "2021-01-02T12:00:00 +0000"),
            ("Bob", "2021-01-03T12:00:00 +0000"),
            ("Alice", "2021-01-04T12:00:00 +0000"),
            ("Bob", "2021-01-05T12:00:00 +0000"),
        ]
        .iter()
        .enumerate()
        {
            scratch.write("shared.txt", &format!("revision {i}\n"));
            scratch.commit(author, date, &format!("change {i}"));
        }

        let repo = GitRepo::open(scratch.path()).await.expect("open repo");
        let paths = vec!["shared.txt".to_string()];
        let batch = repo.contributor_query(&paths, BUDGET).await;

        assert!(!batch.partial);
        assert_eq!(batch.authors.get("shared.txt").map(HashSet::len), Some(2));
    }

    #[compio::test]
    async fn a_spent_budget_yields_partial_results_instead_of_failing() {
        let scratch = ScratchRepo::init();
        scratch.write("a.txt", "a\n");
        scratch.commit("Alice", "2021-01-01T12:00:00 +0000", "initial");

        let repo = GitRepo::open(scratch.path()).await.expect("open repo");
        let paths = vec!["a.txt".to_string()];

        // A zero budget expires before the first log record arrives.
        let batch = repo.batched_log(&paths, None, Duration::ZERO).await;
        assert!(batch.partial);

        let contributors = repo.contributor_query(&paths, Duration::ZERO).await;
        assert!(contributors.partial);
    }

    #[compio::test]
    async fn failing_queries_degrade_to_empty_partial_batches() {
        let repo = GitRepo::unverified("/nonexistent/gtree-test-path".into());
        let paths = vec!["a.txt".to_string()];

        let history = repo.batched_log(&paths, None, BUDGET).await;
        assert!(history.partial);
        assert!(history.latest.is_empty());

        let contributors = repo.contributor_query(&paths, BUDGET).await;
        assert!(contributors.partial);
        assert!(contributors.authors.is_empty());
    }

    #[compio::test]
    async fn since_filter_intersects_and_preserves_order() {
        let scratch = ScratchRepo::init();
        scratch.write("stale.txt", "stale\n");
        scratch.commit("Alice", "2021-01-01T12:00:00 +0000", "stale");
        scratch.write("fresh.txt", "fresh\n");
        scratch.commit("Alice", "2021-02-01T12:00:00 +0000", "fresh");

        let repo = GitRepo::open(scratch.path()).await.expect("open repo");
        let files = vec!["fresh.txt".to_string(), "stale.txt".to_string()];
        let filtered = repo
            .filter_changed_since(files, "2021-01-15", BUDGET)
            .await;

        assert_eq!(filtered, vec!["fresh.txt"]);
    }

    #[compio::test]
    async fn since_filter_keeps_the_full_list_on_failure() {
        let repo = GitRepo::unverified("/nonexistent/gtree-test-path".into());
        let files = vec!["a.txt".to_string(), "b.txt".to_string()];
        let filtered = repo.filter_changed_since(files.clone(), "2021-01-15", BUDGET).await;

        assert_eq!(filtered, files);
    }
}
