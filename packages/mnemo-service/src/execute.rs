use mnemo_domain::{
	Bindings, DiagnosticMessage, OptionRecord, QueryCandidate, SortSpec, filter, placeholder,
};
use serde_json::Value;

use crate::MnemoService;

/// Scope attached to every diagnostic; the invoking layer addresses the whole
/// annotation rather than a single field.
pub(crate) const DIAGNOSTIC_SCOPE: &str = "all";

pub(crate) struct ExecuteArgs<'a> {
	pub dataset: &'a str,
	pub candidates: &'a [QueryCandidate],
	pub bindings: &'a Bindings,
	pub value_key: Option<&'a str>,
	pub label_key: Option<&'a str>,
	pub sort: Option<&'a SortSpec>,
	pub limit: Option<u64>,
}

#[derive(Debug, Default)]
pub(crate) struct ExecuteOutcome {
	pub options: Vec<OptionRecord>,
	pub messages: Vec<DiagnosticMessage>,
}

impl MnemoService {
	/// Runs candidates in order until one yields a non-empty result set.
	///
	/// A malformed candidate is skipped with an info diagnostic, a backend
	/// failure logged as an error diagnostic; both advance to the next
	/// candidate. An empty result set advances silently. Exhaustion returns
	/// empty options alongside whatever diagnostics accumulated.
	pub(crate) async fn resolve_first(&self, args: ExecuteArgs<'_>) -> ExecuteOutcome {
		let ExecuteArgs { dataset, candidates, bindings, value_key, label_key, sort, limit } = args;
		let mut messages = Vec::new();

		for (index, candidate) in candidates.iter().enumerate() {
			let pipeline = match build_pipeline(candidate, bindings, sort, limit) {
				Some(pipeline) => pipeline,
				None => {
					tracing::info!(index, comment = candidate.comment(), "skipping candidate");
					messages.push(DiagnosticMessage::info(
						DIAGNOSTIC_SCOPE,
						format!(
							"Skipping candidate without filters or pipeline: {}.",
							candidate.comment()
						),
					));

					continue;
				},
			};
			let records = match self
				.providers
				.aggregate
				.aggregate(&self.cfg.backends.dataset_hub, dataset, &pipeline)
				.await
			{
				Ok(records) => records,
				Err(err) => {
					tracing::error!(index, ?err, "candidate query failed");
					messages.push(DiagnosticMessage::error(DIAGNOSTIC_SCOPE, err.to_string()));

					continue;
				},
			};

			if records.is_empty() {
				continue;
			}

			let options = mnemo_domain::option::map_records(&records, value_key, label_key, index);

			return ExecuteOutcome { options, messages };
		}

		ExecuteOutcome { options: Vec::new(), messages }
	}
}

/// Normalizes a candidate into an executable pipeline, or `None` when the
/// candidate carries neither filters nor a stored pipeline.
fn build_pipeline(
	candidate: &QueryCandidate,
	bindings: &Bindings,
	sort: Option<&SortSpec>,
	limit: Option<u64>,
) -> Option<Vec<Value>> {
	if let Some(filters) = &candidate.filters {
		return Some(filter::normalize(filters, sort, limit));
	}

	let stages = candidate.pipeline.as_ref()?;

	Some(stages.iter().map(|stage| placeholder::resolve(stage, bindings)).collect())
}
