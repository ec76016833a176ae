use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::filter::FilterSpec;

/// One fallback query definition; candidates are evaluated in list order.
///
/// A candidate carries either a simple filter list or a raw aggregation
/// pipeline. Stored configurations use `//` for the comment and `aggregate`
/// for the pipeline; both spellings are accepted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryCandidate {
	#[serde(default, alias = "//", skip_serializing_if = "Option::is_none")]
	pub comment: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub filters: Option<Vec<FilterSpec>>,
	#[serde(default, alias = "aggregate", skip_serializing_if = "Option::is_none")]
	pub pipeline: Option<Vec<Value>>,
}
impl QueryCandidate {
	pub fn from_filters(filters: Vec<FilterSpec>) -> Self {
		Self { comment: None, filters: Some(filters), pipeline: None }
	}

	pub fn from_pipeline(pipeline: Vec<Value>) -> Self {
		Self { comment: None, filters: None, pipeline: Some(pipeline) }
	}

	pub fn comment(&self) -> &str {
		self.comment.as_deref().unwrap_or("")
	}
}
