use std::time::SystemTime;

use colored::{Color, Colorize};
use hashlink::LinkedHashMap;

use crate::ext::UnixSecondsExt;
use crate::index::FileMetadata;
use crate::tree::TreeNode;

/// Box-drawing tree renderer. Names and dates are colored by commit
/// recency; directories use their derived recency. The root itself is
/// not printed.
pub struct TreeRenderer {
    use_colors: bool,
    now: i64,
}

impl TreeRenderer {
    pub fn new(use_colors: bool) -> Self {
        let now = SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .map(|d| d.as_secs() as i64)
            .unwrap_or(0);
        Self { use_colors, now }
    }

    pub fn render(&self, root: &TreeNode) -> String {
        let mut lines = Vec::new();
        if let TreeNode::Directory { children, .. } = root {
            self.render_children(children, "", &mut lines);
        }
        lines.join("\n")
    }

    fn render_children(
        &self,
        children: &LinkedHashMap<String, TreeNode>,
        prefix: &str,
        lines: &mut Vec<String>,
    ) {
        // Directories first, then files, each group sorted by name.
        let mut directories: Vec<(&String, &TreeNode)> = Vec::new();
        let mut files: Vec<(&String, &TreeNode)> = Vec::new();
        for (name, child) in children {
            match child {
                TreeNode::Directory { .. } => directories.push((name, child)),
                TreeNode::File { .. } => files.push((name, child)),
            }
        }
        directories.sort_by(|a, b| a.0.cmp(b.0));
        files.sort_by(|a, b| a.0.cmp(b.0));

        let ordered: Vec<(&String, &TreeNode)> =
            directories.into_iter().chain(files).collect();

        for (i, (name, child)) in ordered.iter().enumerate() {
            let is_last = i == ordered.len() - 1;
            let connector = if is_last { "└── " } else { "├── " };

            match child {
                TreeNode::Directory { children, latest } => {
                    lines.push(format!(
                        "{prefix}{connector}{}/",
                        self.paint(name, *latest)
                    ));
                    let child_prefix = format!(
                        "{prefix}{}",
                        if is_last { "    " } else { "│   " }
                    );
                    self.render_children(children, &child_prefix, lines);
                }
                TreeNode::File { metadata } => {
                    lines.push(format!(
                        "{prefix}{connector}{}",
                        self.file_label(name, metadata)
                    ));
                }
            }
        }
    }

    fn file_label(&self, name: &str, metadata: &FileMetadata) -> String {
        let mut label = name.to_string();

        if let Some(timestamp) = metadata.last_modified {
            if let Some(date) = timestamp.to_date_string() {
                let bracketed = format!("[{date}]");
                label.push(' ');
                label.push_str(&self.paint(&bracketed, Some(timestamp)));
            }
        }

        if let Some(count) = metadata.contributors {
            let noun = if count == 1 { "author" } else { "authors" };
            label.push_str(&format!(" ({count} {noun})"));
        }

        label
    }

    fn paint(&self, text: &str, timestamp: Option<i64>) -> String {
        match timestamp.and_then(|ts| self.recency_color(ts)) {
            Some(color) => text.color(color).to_string(),
            None => text.to_string(),
        }
    }

    fn recency_color(&self, timestamp: i64) -> Option<Color> {
        if !self.use_colors {
            return None;
        }
        let color = match timestamp.days_ago(self.now) {
            0..=7 => Color::Red,
            8..=30 => Color::Yellow,
            31..=90 => Color::Green,
            _ => Color::Blue,
        };
        Some(color)
    }
}
