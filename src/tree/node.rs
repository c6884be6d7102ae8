use hashlink::LinkedHashMap;
use snafu::Snafu;
use tracing::warn;

use crate::index::FileMetadata;

/// A node in the rendered tree. Directory children keep insertion order,
/// which is first-seen order of the (pre-sorted) path list. `latest` is
/// the most recent `last_modified` among descendant files, filled in by
/// [`TreeNode::annotate_recency`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeNode {
    File {
        metadata: FileMetadata,
    },
    Directory {
        children: LinkedHashMap<String, TreeNode>,
        latest: Option<i64>,
    },
}

impl TreeNode {
    pub fn root() -> Self {
        TreeNode::Directory {
            children: LinkedHashMap::new(),
            latest: None,
        }
    }

    /// Folds annotated paths into a root directory node and derives
    /// directory recency. Paths conflicting with an already inserted file
    /// node are logged and skipped. An empty input yields a childless
    /// root, not an error.
    pub fn build(entries: impl IntoIterator<Item = (String, FileMetadata)>) -> Self {
        let mut root = Self::root();

        for (path, metadata) in entries {
            if let Err(e) = root.try_insert(&path, metadata) {
                warn!("Skipping unrepresentable path: {e}");
            }
        }

        root.annotate_recency();
        root
    }

    /// Walks/creates the directory chain for all but the last path segment
    /// and inserts a file node at the last one.
    fn try_insert(&mut self, path: &str, metadata: FileMetadata) -> Result<(), PathConflictError> {
        let mut segments = path.split('/').filter(|s| !s.is_empty()).peekable();
        let mut current = self;

        while let Some(segment) = segments.next() {
            let children = match current {
                TreeNode::Directory { children, .. } => children,
                TreeNode::File { .. } => {
                    return PathConflictSnafu { path }.fail();
                }
            };

            if segments.peek().is_none() {
                children.insert(segment.to_string(), TreeNode::File { metadata });
                break;
            }

            current = children
                .entry(segment.to_string())
                .or_insert_with(|| TreeNode::Directory {
                    children: LinkedHashMap::new(),
                    latest: None,
                });
        }

        Ok(())
    }

    /// Post-order fold deriving each directory's `latest` as the max over
    /// descendant file timestamps; absent iff no descendant has one.
    /// Returns this node's own contribution.
    pub fn annotate_recency(&mut self) -> Option<i64> {
        match self {
            TreeNode::File { metadata } => metadata.last_modified,
            TreeNode::Directory { children, latest } => {
                *latest = children
                    .iter_mut()
                    .filter_map(|(_, child)| child.annotate_recency())
                    .max();
                *latest
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn leaf_paths(&self) -> Vec<String> {
        fn walk(node: &TreeNode, prefix: &str, out: &mut Vec<String>) {
            if let TreeNode::Directory { children, .. } = node {
                for (name, child) in children {
                    let path = if prefix.is_empty() {
                        name.clone()
                    } else {
                        format!("{prefix}/{name}")
                    };
                    match child {
                        TreeNode::File { .. } => out.push(path),
                        TreeNode::Directory { .. } => walk(child, &path, out),
                    }
                }
            }
        }

        let mut out = Vec::new();
        walk(self, "", &mut out);
        out
    }

    #[cfg(test)]
    pub(crate) fn descend(&self, path: &str) -> Option<&TreeNode> {
        let mut current = self;
        for segment in path.split('/') {
            match current {
                TreeNode::Directory { children, .. } => current = children.get(segment)?,
                TreeNode::File { .. } => return None,
            }
        }
        Some(current)
    }
}

#[derive(Debug, Snafu)]
#[snafu(display("Path '{}' conflicts with an already inserted file", path))]
pub struct PathConflictError {
    path: String,
}
