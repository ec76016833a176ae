use std::time::Duration;

use color_eyre::{Result, eyre};
use reqwest::{
	Client,
	multipart::{Form, Part},
};
use serde_json::Value;

/// Runs one aggregation pipeline against the hub and returns the raw records.
///
/// The hub reports query-level failures as a 2xx body carrying a `message`
/// field; both that case and transport failures surface as errors here so the
/// caller can decide whether to fall through to the next candidate.
pub async fn aggregate(
	cfg: &mnemo_config::DatasetHubConfig,
	dataset: &str,
	pipeline: &[Value],
) -> Result<Vec<Value>> {
	let client = Client::builder().timeout(Duration::from_millis(cfg.timeout_ms)).build()?;
	let url = format!("{}/v1/data/aggregate", cfg.api_base);
	let body = serde_json::json!({
		"aggregate": pipeline,
		"collation": {},
		"let": {},
		"options": {},
		"dataset": dataset,
	});
	let res = client
		.post(url)
		.headers(crate::auth_headers(&cfg.api_token, &cfg.default_headers)?)
		.json(&body)
		.send()
		.await?;
	let json: Value = res.error_for_status()?.json().await?;

	parse_aggregate_response(json)
}

/// Upserts records into a dataset keyed on `id_keys`.
///
/// The hub ingests dataset changes as a multipart file upload with
/// `update_or_new` selecting upsert semantics.
pub async fn upsert(
	cfg: &mnemo_config::DatasetHubConfig,
	dataset: &str,
	id_keys: &str,
	records: &[Value],
) -> Result<()> {
	let client = Client::builder().timeout(Duration::from_millis(cfg.timeout_ms)).build()?;
	let url = format!("{}/v1/dataset/{dataset}", cfg.api_base);
	let content = serde_json::to_vec(records)?;
	let file = Part::bytes(content).file_name("memory_data.json").mime_str("application/json")?;
	let form = Form::new()
		.part("file", file)
		.text("encoding", "utf-8")
		.text("update_or_new", "true")
		.text("id_keys", id_keys.to_string());

	client
		.patch(url)
		.headers(crate::auth_headers(&cfg.api_token, &cfg.default_headers)?)
		.multipart(form)
		.send()
		.await?
		.error_for_status()?;

	Ok(())
}

fn parse_aggregate_response(json: Value) -> Result<Vec<Value>> {
	if let Some(message) = json.get("message").and_then(Value::as_str) {
		return Err(eyre::eyre!("{message}"));
	}

	let results = json
		.get("results")
		.and_then(Value::as_array)
		.cloned()
		.unwrap_or_default();

	Ok(results)
}
