//! Summaries of a grammar's `node-types.json`.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum NodeTypesError {
	#[error("failed to read {path}: {source}")]
	Io {
		path: String,
		#[source]
		source: std::io::Error,
	},

	#[error("invalid node-types.json: {0}")]
	Json(#[from] serde_json::Error),
}

#[derive(Debug, Deserialize)]
struct NodeType {
	#[serde(rename = "type")]
	kind: String,
	named: bool,
	#[serde(default)]
	subtypes: Vec<serde_json::Value>,
}

/// Counts of node kinds declared by a grammar.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NodeTypesSummary {
	pub named: usize,
	pub anonymous: usize,
	pub supertypes: usize,
}

/// Summarises the contents of a `node-types.json` document.
pub fn summarize(json: &str) -> Result<NodeTypesSummary, NodeTypesError> {
	let types: Vec<NodeType> = serde_json::from_str(json)?;
	let mut summary = NodeTypesSummary::default();

	for node in &types {
		if !node.named {
			summary.anonymous += 1;
		} else if node.subtypes.is_empty() {
			summary.named += 1;
		} else {
			summary.supertypes += 1;
		}
	}

	tracing::trace!(
		kinds = types.len(),
		first = types.first().map(|n| n.kind.as_str()).unwrap_or_default(),
		"Summarised node types"
	);
	Ok(summary)
}

/// Reads and summarises `src/node-types.json` under a grammar source root.
pub fn summarize_source(source_root: &Path) -> Result<NodeTypesSummary, NodeTypesError> {
	let path = source_root.join("src").join("node-types.json");
	let json = std::fs::read_to_string(&path).map_err(|source| NodeTypesError::Io {
		path: path.display().to_string(),
		source,
	})?;
	summarize(&json)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_summarize_counts_kinds() {
		let json = r#"[
			{"type": "_expression", "named": true, "subtypes": [{"type": "literal", "named": true}]},
			{"type": "literal", "named": true, "fields": {}},
			{"type": "select", "named": true, "children": {"multiple": true, "required": false, "types": []}},
			{"type": ";", "named": false},
			{"type": "(", "named": false}
		]"#;

		let summary = summarize(json).unwrap();
		assert_eq!(
			summary,
			NodeTypesSummary {
				named: 2,
				anonymous: 2,
				supertypes: 1
			}
		);
	}

	#[test]
	fn test_summarize_rejects_malformed_json() {
		assert!(matches!(summarize("{"), Err(NodeTypesError::Json(_))));
	}

	#[test]
	fn test_missing_file_is_io_error() {
		let dir = tempfile::tempdir().unwrap();
		assert!(matches!(
			summarize_source(dir.path()),
			Err(NodeTypesError::Io { .. })
		));
	}
}
