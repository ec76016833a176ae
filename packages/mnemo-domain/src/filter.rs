use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Ceiling on the result-count cap stage; callers may request less, never more.
pub const MAX_RESULT_LIMIT: u64 = 100;

/// One `{match_key, operator, value}` condition authored by the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterSpec {
	pub match_key: String,
	#[serde(default)]
	pub operator: FilterOperator,
	pub value: Value,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FilterOperator {
	#[default]
	#[serde(rename = "$eq")]
	Eq,
	#[serde(rename = "$ne")]
	Ne,
	#[serde(rename = "$gt")]
	Gt,
	#[serde(rename = "$gte")]
	Gte,
	#[serde(rename = "$lt")]
	Lt,
	#[serde(rename = "$lte")]
	Lte,
	#[serde(rename = "$in")]
	In,
	#[serde(rename = "$nin")]
	Nin,
	#[serde(rename = "$fuzzy_conservative")]
	FuzzyConservative,
	#[serde(rename = "$fuzzy_dynamic")]
	FuzzyDynamic,
}
impl FilterOperator {
	pub fn as_str(&self) -> &'static str {
		match self {
			Self::Eq => "$eq",
			Self::Ne => "$ne",
			Self::Gt => "$gt",
			Self::Gte => "$gte",
			Self::Lt => "$lt",
			Self::Lte => "$lte",
			Self::In => "$in",
			Self::Nin => "$nin",
			Self::FuzzyConservative => "$fuzzy_conservative",
			Self::FuzzyDynamic => "$fuzzy_dynamic",
		}
	}

	fn fuzzy_max_edits(&self) -> Option<u64> {
		match self {
			Self::FuzzyConservative => Some(1),
			Self::FuzzyDynamic => Some(2),
			_ => None,
		}
	}
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SortSpec {
	#[serde(default)]
	pub sort_key: String,
	#[serde(default)]
	pub desc: bool,
}

/// Turns a flat filter list into an executable pipeline.
///
/// Fuzzy conditions become one leading `$search` stage (the backend requires
/// text search to be the first stage), exact conditions one conjunctive
/// `$match` stage, followed by an optional `$sort` and a mandatory `$limit`.
/// An empty filter list therefore yields a bare cap stage.
pub fn normalize(filters: &[FilterSpec], sort: Option<&SortSpec>, limit: Option<u64>) -> Vec<Value> {
	let mut search_clauses = Vec::new();
	let mut match_clauses = Vec::new();

	for filter in filters {
		match filter.operator.fuzzy_max_edits() {
			Some(max_edits) =>
				search_clauses.push(text_clause(&filter.match_key, &filter.value, max_edits)),
			None => match_clauses.push(comparison_clause(filter)),
		}
	}

	let mut pipeline = Vec::new();

	if !search_clauses.is_empty() {
		pipeline.push(serde_json::json!({
			"$search": { "compound": { "must": search_clauses } }
		}));
	}
	if !match_clauses.is_empty() {
		pipeline.push(serde_json::json!({ "$match": { "$and": match_clauses } }));
	}
	if let Some(sort) = sort
		&& !sort.sort_key.is_empty()
	{
		let order = if sort.desc { -1 } else { 1 };
		let mut keys = Map::new();

		keys.insert(sort.sort_key.clone(), Value::from(order));
		pipeline.push(Value::Object(Map::from_iter([("$sort".to_string(), Value::Object(keys))])));
	}

	pipeline.push(serde_json::json!({ "$limit": clamp_limit(limit) }));

	pipeline
}

pub fn clamp_limit(limit: Option<u64>) -> u64 {
	limit.unwrap_or(MAX_RESULT_LIMIT).min(MAX_RESULT_LIMIT)
}

fn text_clause(path: &str, value: &Value, max_edits: u64) -> Value {
	serde_json::json!({
		"text": {
			"path": path,
			"query": value_as_text(value),
			"fuzzy": { "maxEdits": max_edits },
			"matchCriteria": "all",
		}
	})
}

fn comparison_clause(filter: &FilterSpec) -> Value {
	let mut condition = Map::new();

	condition.insert(filter.operator.as_str().to_string(), filter.value.clone());

	Value::Object(Map::from_iter([(filter.match_key.clone(), Value::Object(condition))]))
}

fn value_as_text(value: &Value) -> String {
	match value {
		Value::String(text) => text.clone(),
		other => other.to_string(),
	}
}
