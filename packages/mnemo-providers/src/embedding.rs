use std::time::Duration;

use color_eyre::{Result, eyre};
use reqwest::Client;
use serde_json::Value;

/// Embeds one text through a feature-extraction endpoint.
pub async fn embed(cfg: &mnemo_config::EmbeddingProviderConfig, text: &str) -> Result<Vec<f32>> {
	let client = Client::builder().timeout(Duration::from_millis(cfg.timeout_ms)).build()?;
	let url = format!("{}{}", cfg.api_base, cfg.path);
	let body = serde_json::json!({ "inputs": text });
	let res = client
		.post(url)
		.headers(crate::auth_headers(&cfg.api_key, &cfg.default_headers)?)
		.json(&body)
		.send()
		.await?;
	let json: Value = res.error_for_status()?.json().await?;

	parse_embedding_response(json)
}

// Some endpoints wrap the vector in an extra array for single-input requests.
fn parse_embedding_response(json: Value) -> Result<Vec<f32>> {
	let outer = json
		.as_array()
		.ok_or_else(|| eyre::eyre!("Embedding response must be an array."))?;
	let values = match outer.first() {
		Some(Value::Array(inner)) => inner,
		_ => outer,
	};
	let mut vec = Vec::with_capacity(values.len());

	for value in values {
		let number =
			value.as_f64().ok_or_else(|| eyre::eyre!("Embedding value must be numeric."))?;
		vec.push(number as f32);
	}

	Ok(vec)
}
