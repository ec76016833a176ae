use mnemo_domain::{Bindings, DiagnosticMessage, FilterSpec, OptionRecord, QueryCandidate, SortSpec};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
	MnemoService, ServiceError, ServiceResult,
	execute::{ExecuteArgs, ExecuteOutcome},
};

/// One filter list in the ordered fallback sequence.
#[derive(Debug, Clone, Deserialize)]
pub struct FilterQuery {
	#[serde(default)]
	pub filters: Vec<FilterSpec>,
}

#[derive(Debug, Deserialize)]
pub struct LookupRequest {
	pub dataset: String,
	#[serde(default)]
	pub queries: Vec<FilterQuery>,
	#[serde(default)]
	pub sort: Option<SortSpec>,
	#[serde(default)]
	pub limit: Option<u64>,
	pub value_key: String,
	pub label_key: String,
}

#[derive(Debug, Serialize)]
pub struct LookupResponse {
	pub options: Vec<OptionRecord>,
	pub value: Value,
	pub messages: Vec<DiagnosticMessage>,
}

impl MnemoService {
	/// Filter-list lookup: each query's filters are normalized into a
	/// pipeline and tried in order; the first non-empty result set wins.
	pub async fn lookup(&self, req: LookupRequest) -> ServiceResult<LookupResponse> {
		validate(&req)?;

		let candidates = candidates_of(req.queries);
		let bindings = Bindings::default();
		let ExecuteOutcome { options, messages } = self
			.resolve_first(ExecuteArgs {
				dataset: &req.dataset,
				candidates: &candidates,
				bindings: &bindings,
				value_key: Some(&req.value_key),
				label_key: Some(&req.label_key),
				sort: req.sort.as_ref(),
				limit: req.limit,
			})
			.await;
		let options = options
			.into_iter()
			.map(|option| OptionRecord {
				value: coerce_text(option.value),
				label: coerce_text(option.label),
				extra: option.extra,
			})
			.collect::<Vec<_>>();
		let value = options.first().map(|option| option.value.clone()).unwrap_or(Value::Null);

		Ok(LookupResponse { options, value, messages })
	}
}

fn validate(req: &LookupRequest) -> ServiceResult<()> {
	for (field, value) in [
		("dataset", &req.dataset),
		("value_key", &req.value_key),
		("label_key", &req.label_key),
	] {
		if value.is_empty() {
			return Err(ServiceError::InvalidRequest {
				message: format!("Field `{field}` must not be empty."),
			});
		}
	}

	Ok(())
}

/// An empty query list still runs once, as a single unfiltered candidate.
fn candidates_of(queries: Vec<FilterQuery>) -> Vec<QueryCandidate> {
	if queries.is_empty() {
		return vec![QueryCandidate::from_filters(Vec::new())];
	}

	queries.into_iter().map(|query| QueryCandidate::from_filters(query.filters)).collect()
}

/// Option values from this endpoint are always rendered as enum choices,
/// which the platform expects as strings.
fn coerce_text(value: Value) -> Value {
	match value {
		Value::String(_) => value,
		other => Value::String(other.to_string()),
	}
}
