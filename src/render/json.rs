use serde::Serialize;

use crate::ext::UnixSecondsExt;
use crate::index::MetadataIndex;

#[derive(Debug, Serialize)]
struct JsonFile<'a> {
    path: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    last_commit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    contributors: Option<usize>,
}

#[derive(Debug, Serialize)]
struct JsonOutput<'a> {
    files: Vec<JsonFile<'a>>,
}

/// Machine-readable rendering: the flat filtered file list with whatever
/// metadata was collected. Absent fields are omitted rather than null.
pub fn render_json(paths: &[String], index: &MetadataIndex) -> serde_json::Result<String> {
    let files = paths
        .iter()
        .map(|path| {
            let metadata = index.get(path);
            JsonFile {
                path,
                last_commit: metadata.last_modified.and_then(|ts| ts.to_date_string()),
                contributors: metadata.contributors,
            }
        })
        .collect();

    serde_json::to_string_pretty(&JsonOutput { files })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use serde_json::{Value, json};

    use super::*;
    use crate::index::{FileMetadata, RunMode};

    #[test]
    fn emits_the_flat_file_list_with_present_fields_only() {
        let entries = HashMap::from([
            (
                "a.py".to_string(),
                FileMetadata {
                    last_modified: Some(1_609_459_200),
                    contributors: Some(2),
                },
            ),
            ("b.py".to_string(), FileMetadata::default()),
        ]);
        let index = MetadataIndex::from_entries(entries, RunMode::Full, false);
        let paths = vec!["a.py".to_string(), "b.py".to_string()];

        let rendered = render_json(&paths, &index).expect("serialize");
        let value: Value = serde_json::from_str(&rendered).expect("parse back");

        assert_eq!(
            value,
            json!({
                "files": [
                    {"path": "a.py", "last_commit": "2021-01-01", "contributors": 2},
                    {"path": "b.py"},
                ]
            })
        );
    }

    #[test]
    fn an_empty_list_serializes_to_an_empty_files_array() {
        let index = MetadataIndex::from_entries(HashMap::new(), RunMode::ForcedFast, false);
        let rendered = render_json(&[], &index).expect("serialize");
        let value: Value = serde_json::from_str(&rendered).expect("parse back");

        assert_eq!(value, json!({"files": []}));
    }
}
