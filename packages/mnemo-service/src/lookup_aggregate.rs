use mnemo_domain::{Bindings, DiagnosticMessage, OptionRecord, QueryCandidate};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{
	MnemoService, ServiceError, ServiceResult,
	execute::{DIAGNOSTIC_SCOPE, ExecuteArgs, ExecuteOutcome},
};

#[derive(Debug, Deserialize)]
pub struct AggregateLookupRequest {
	pub dataset: String,
	/// Candidate list, either inline or as a JSON-encoded string (stored
	/// configurations arrive re-serialized).
	#[serde(default)]
	pub queries: Option<Value>,
	#[serde(default)]
	pub placeholders: Map<String, Value>,
	#[serde(default)]
	pub value_key: Option<String>,
	#[serde(default)]
	pub label_key: Option<String>,
}

#[derive(Debug, Default, Serialize)]
pub struct AggregateLookupResponse {
	pub options: Vec<OptionRecord>,
	pub value: Value,
	#[serde(rename = "struct", skip_serializing_if = "Option::is_none")]
	pub extra: Option<Map<String, Value>>,
	pub messages: Vec<DiagnosticMessage>,
}

impl MnemoService {
	/// Pipeline lookup: caller-authored candidates with `$$name` placeholders
	/// resolved against the request's bindings, tried in order.
	///
	/// Malformed candidate lists never fail the request; they produce an
	/// empty response whose messages explain what went wrong.
	pub async fn lookup_aggregate(
		&self,
		req: AggregateLookupRequest,
	) -> ServiceResult<AggregateLookupResponse> {
		if req.dataset.is_empty() {
			return Err(ServiceError::InvalidRequest {
				message: "Field `dataset` must not be empty.".to_string(),
			});
		}

		let candidates = match parse_candidates(req.queries) {
			Ok(candidates) => candidates,
			Err(messages) => return Ok(AggregateLookupResponse { messages, ..Default::default() }),
		};
		let bindings = Bindings::new(req.placeholders);
		let ExecuteOutcome { options, messages } = self
			.resolve_first(ExecuteArgs {
				dataset: &req.dataset,
				candidates: &candidates,
				bindings: &bindings,
				value_key: req.value_key.as_deref(),
				label_key: req.label_key.as_deref(),
				sort: None,
				limit: None,
			})
			.await;
		let value = options.first().map(|option| option.value.clone()).unwrap_or(Value::Null);
		let extra = options.first().and_then(|option| option.extra.clone());

		Ok(AggregateLookupResponse { options, value, extra, messages })
	}
}

fn parse_candidates(queries: Option<Value>) -> Result<Vec<QueryCandidate>, Vec<DiagnosticMessage>> {
	let queries = match queries {
		Some(queries) => queries,
		None =>
			return Err(vec![DiagnosticMessage::error(
				DIAGNOSTIC_SCOPE,
				"Aggregation queries pipeline is missing.",
			)]),
	};
	let queries = match queries {
		Value::String(raw) => match serde_json::from_str::<Value>(&raw) {
			Ok(parsed) => parsed,
			Err(err) =>
				return Err(vec![
					DiagnosticMessage::error(DIAGNOSTIC_SCOPE, err.to_string()),
					DiagnosticMessage::error(DIAGNOSTIC_SCOPE, raw),
				]),
		},
		other => other,
	};

	serde_json::from_value(queries)
		.map_err(|err| vec![DiagnosticMessage::error(DIAGNOSTIC_SCOPE, err.to_string())])
}
