use std::time::Duration;

use color_eyre::Result;
use reqwest::{Client, redirect::Policy};
use serde_json::Value;

/// Looks a key up through the spreadsheet web app.
///
/// The web app answers `{status: "success", value}` on hits; anything else is
/// a miss, not an error. Redirects must be followed because the app serves
/// results from a temporary URL.
pub async fn fetch(cfg: &mnemo_config::SheetConfig, key: &str) -> Result<Option<Value>> {
	let client = sheet_client(cfg)?;
	let res = client.get(&cfg.webapp_url).query(&[("key", key)]).send().await?;
	let json: Value = res.error_for_status()?.json().await?;

	if json.get("status").and_then(Value::as_str) == Some("success") {
		return Ok(json.get("value").cloned());
	}

	Ok(None)
}

/// Appends or updates a `[key, value]` row through the web app.
pub async fn append(cfg: &mnemo_config::SheetConfig, key: &str, value: &str) -> Result<()> {
	let client = sheet_client(cfg)?;
	let body = serde_json::json!({ "key": key, "value": value });

	client.post(&cfg.webapp_url).json(&body).send().await?.error_for_status()?;

	Ok(())
}

fn sheet_client(cfg: &mnemo_config::SheetConfig) -> Result<Client> {
	Ok(Client::builder()
		.timeout(Duration::from_millis(cfg.timeout_ms))
		.redirect(Policy::limited(10))
		.build()?)
}
