use std::time::Duration;

use color_eyre::{Result, eyre};
use reqwest::{Client, StatusCode, header::HeaderMap};
use serde_json::Value;

/// Similarity search over the store's match RPC, best matches first.
pub async fn search(
	cfg: &mnemo_config::VectorStoreConfig,
	query_embedding: &[f32],
	match_count: u32,
) -> Result<Vec<Value>> {
	let client = Client::builder().timeout(Duration::from_millis(cfg.timeout_ms)).build()?;
	let url = format!("{}/rest/v1/rpc/{}", cfg.api_base, cfg.match_function);
	let body = serde_json::json!({
		"query_embedding": query_embedding,
		"match_count": match_count,
	});
	let res = client.post(url).headers(store_headers(cfg)?).json(&body).send().await?;

	if res.status() == StatusCode::NOT_FOUND {
		return Ok(Vec::new());
	}

	let json: Value = res.error_for_status()?.json().await?;
	let matches = json
		.as_array()
		.cloned()
		.ok_or_else(|| eyre::eyre!("Vector search response must be an array."))?;

	Ok(matches)
}

/// Inserts one learned row into the store's table.
pub async fn insert(cfg: &mnemo_config::VectorStoreConfig, record: &Value) -> Result<()> {
	let client = Client::builder().timeout(Duration::from_millis(cfg.timeout_ms)).build()?;
	let url = format!("{}/rest/v1/{}", cfg.api_base, cfg.table);
	let mut headers = store_headers(cfg)?;

	headers.insert("Prefer", "return=minimal".parse()?);

	client.post(url).headers(headers).json(record).send().await?.error_for_status()?;

	Ok(())
}

fn store_headers(cfg: &mnemo_config::VectorStoreConfig) -> Result<HeaderMap> {
	let mut headers = HeaderMap::new();

	headers.insert("apikey", cfg.api_key.parse()?);
	headers.insert(reqwest::header::AUTHORIZATION, format!("Bearer {}", cfg.api_key).parse()?);

	Ok(headers)
}
