//! Read-only Git collaborators: the bulk path listing query and the
//! batched history queries.
//!
//! Everything in here shells out to `git` itself so that ignore rules,
//! ref resolution and history walking stay with the tool instead of
//! being reimplemented.

mod history;
mod repo;

pub use history::{CommitFact, ContributorBatch, HistoryBatch};
pub use repo::{GitError, GitRepo};

#[cfg(test)]
pub(crate) mod testutil;
