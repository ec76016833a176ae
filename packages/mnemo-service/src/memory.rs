use mnemo_config::{EmbeddingProviderConfig, VectorStoreConfig};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use time::{OffsetDateTime, format_description::well_known::Rfc3339};

use crate::{MnemoService, ServiceResult};

/// Which storage backs a memory key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemoryBackend {
	#[default]
	Dataset,
	Vector,
	Sheet,
}

#[derive(Debug, Deserialize)]
pub struct RetrieveRequest {
	pub key: String,
	#[serde(default)]
	pub dataset: Option<String>,
	#[serde(default)]
	pub backend: MemoryBackend,
}

/// Memory reads degrade instead of failing: any missing prerequisite or
/// backend error answers `found: false` so the invoking flow can proceed.
#[derive(Debug, Serialize)]
pub struct RetrieveResponse {
	pub value: Value,
	#[serde(rename = "struct")]
	pub extra: Option<Map<String, Value>>,
	pub found: bool,
}
impl RetrieveResponse {
	fn not_found() -> Self {
		Self { value: Value::Null, extra: None, found: false }
	}
}

#[derive(Debug, Deserialize)]
pub struct LearnRequest {
	pub key: String,
	#[serde(default)]
	pub value: Value,
	#[serde(default, rename = "struct")]
	pub extra: Option<Map<String, Value>>,
	#[serde(default)]
	pub dataset: Option<String>,
	#[serde(default)]
	pub backend: MemoryBackend,
}

#[derive(Debug, Serialize)]
pub struct LearnResponse {}

impl MnemoService {
	pub async fn memory_retrieve(&self, req: RetrieveRequest) -> ServiceResult<RetrieveResponse> {
		if req.key.is_empty() {
			tracing::warn!("memory retrieve without a key");

			return Ok(RetrieveResponse::not_found());
		}

		let response = match req.backend {
			MemoryBackend::Dataset => self.retrieve_dataset(&req).await,
			MemoryBackend::Vector => self.retrieve_vector(&req).await,
			MemoryBackend::Sheet => self.retrieve_sheet(&req).await,
		};

		Ok(response)
	}

	pub async fn memory_learn(&self, req: LearnRequest) -> ServiceResult<LearnResponse> {
		if req.key.is_empty() {
			tracing::warn!("memory learn without a key");

			return Ok(LearnResponse {});
		}

		match req.backend {
			MemoryBackend::Dataset => self.learn_dataset(&req).await,
			MemoryBackend::Vector => self.learn_vector(&req).await,
			MemoryBackend::Sheet => self.learn_sheet(&req).await,
		}

		Ok(LearnResponse {})
	}

	async fn retrieve_dataset(&self, req: &RetrieveRequest) -> RetrieveResponse {
		let dataset = match req.dataset.as_deref() {
			Some(dataset) if !dataset.is_empty() => dataset,
			_ => {
				tracing::warn!(key = req.key, "dataset memory retrieve without a dataset");

				return RetrieveResponse::not_found();
			},
		};
		let columns = &self.cfg.memory;
		let by_key = Map::from_iter([(
			columns.key_column.clone(),
			serde_json::json!({ "$eq": req.key }),
		)]);
		let pipeline = [
			Value::Object(Map::from_iter([("$match".to_string(), Value::Object(by_key))])),
			serde_json::json!({ "$limit": 1 }),
		];
		let records = match self
			.providers
			.aggregate
			.aggregate(&self.cfg.backends.dataset_hub, dataset, &pipeline)
			.await
		{
			Ok(records) => records,
			Err(err) => {
				tracing::warn!(key = req.key, dataset, ?err, "dataset memory retrieve failed");

				return RetrieveResponse::not_found();
			},
		};
		let record = match records.first().and_then(Value::as_object) {
			Some(record) => record,
			None => return RetrieveResponse::not_found(),
		};
		let value = record.get(&columns.value_column).cloned().unwrap_or(Value::Null);
		let hidden = [
			columns.key_column.as_str(),
			columns.value_column.as_str(),
			columns.created_at_column.as_str(),
			"_id",
		];
		let extra: Map<String, Value> = record
			.iter()
			.filter(|(key, _)| !hidden.contains(&key.as_str()))
			.map(|(key, field)| (key.clone(), field.clone()))
			.collect();

		RetrieveResponse { value, extra: (!extra.is_empty()).then_some(extra), found: true }
	}

	async fn retrieve_vector(&self, req: &RetrieveRequest) -> RetrieveResponse {
		let (embedding_cfg, vector_cfg) = match self.vector_configs() {
			Some(cfgs) => cfgs,
			None => {
				tracing::warn!(key = req.key, "vector memory is not configured");

				return RetrieveResponse::not_found();
			},
		};
		let embedding = match self.providers.embedding.embed(embedding_cfg, &req.key).await {
			Ok(embedding) => embedding,
			Err(err) => {
				tracing::warn!(key = req.key, ?err, "embedding request failed");

				return RetrieveResponse::not_found();
			},
		};
		let matches = match self
			.providers
			.vector
			.search(vector_cfg, &embedding, vector_cfg.match_count)
			.await
		{
			Ok(matches) => matches,
			Err(err) => {
				tracing::warn!(key = req.key, ?err, "vector memory retrieve failed");

				return RetrieveResponse::not_found();
			},
		};
		let top = match matches.first() {
			Some(top) => top,
			None => return RetrieveResponse::not_found(),
		};
		let value = top.get("content").cloned().unwrap_or(Value::Null);
		let extra = Map::from_iter([(
			"similarity".to_string(),
			top.get("similarity").cloned().unwrap_or(Value::Null),
		)]);

		RetrieveResponse { value, extra: Some(extra), found: true }
	}

	async fn retrieve_sheet(&self, req: &RetrieveRequest) -> RetrieveResponse {
		let sheet_cfg = match &self.cfg.backends.sheet {
			Some(cfg) => cfg,
			None => {
				tracing::warn!(key = req.key, "sheet memory is not configured");

				return RetrieveResponse::not_found();
			},
		};

		match self.providers.sheet.fetch(sheet_cfg, &req.key).await {
			Ok(Some(value)) => RetrieveResponse { value, extra: None, found: true },
			Ok(None) => RetrieveResponse::not_found(),
			Err(err) => {
				tracing::warn!(key = req.key, ?err, "sheet memory retrieve failed");

				RetrieveResponse::not_found()
			},
		}
	}

	async fn learn_dataset(&self, req: &LearnRequest) {
		let dataset = match req.dataset.as_deref() {
			Some(dataset) if !dataset.is_empty() => dataset,
			_ => {
				tracing::warn!(key = req.key, "dataset memory learn without a dataset");

				return;
			},
		};
		let columns = &self.cfg.memory;
		let mut record = Map::from_iter([
			(columns.key_column.clone(), Value::String(req.key.clone())),
			(columns.value_column.clone(), req.value.clone()),
			(columns.created_at_column.clone(), Value::String(now_rfc3339())),
		]);

		if let Some(extra) = &req.extra {
			record.extend(extra.iter().map(|(key, field)| (key.clone(), field.clone())));
		}

		if let Err(err) = self
			.providers
			.aggregate
			.upsert(
				&self.cfg.backends.dataset_hub,
				dataset,
				&columns.key_column,
				&[Value::Object(record)],
			)
			.await
		{
			tracing::warn!(key = req.key, dataset, ?err, "dataset memory learn failed");
		}
	}

	async fn learn_vector(&self, req: &LearnRequest) {
		let (embedding_cfg, vector_cfg) = match self.vector_configs() {
			Some(cfgs) => cfgs,
			None => {
				tracing::warn!(key = req.key, "vector memory is not configured");

				return;
			},
		};
		// The key is the semantic index; the value is what a match returns.
		let embedding = match self.providers.embedding.embed(embedding_cfg, &req.key).await {
			Ok(embedding) => embedding,
			Err(err) => {
				tracing::warn!(key = req.key, ?err, "embedding request failed");

				return;
			},
		};
		let record = serde_json::json!({
			"content": req.value,
			"embedding": embedding,
			"learned_value": req.key,
		});

		if let Err(err) = self.providers.vector.insert(vector_cfg, &record).await {
			tracing::warn!(key = req.key, ?err, "vector memory learn failed");
		}
	}

	async fn learn_sheet(&self, req: &LearnRequest) {
		let sheet_cfg = match &self.cfg.backends.sheet {
			Some(cfg) => cfg,
			None => {
				tracing::warn!(key = req.key, "sheet memory is not configured");

				return;
			},
		};
		let value = match &req.value {
			Value::String(text) => text.clone(),
			other => other.to_string(),
		};

		if let Err(err) = self.providers.sheet.append(sheet_cfg, &req.key, &value).await {
			tracing::warn!(key = req.key, ?err, "sheet memory learn failed");
		}
	}

	fn vector_configs(&self) -> Option<(&EmbeddingProviderConfig, &VectorStoreConfig)> {
		Some((self.cfg.backends.embedding.as_ref()?, self.cfg.backends.vector.as_ref()?))
	}
}

fn now_rfc3339() -> String {
	OffsetDateTime::now_utc().format(&Rfc3339).unwrap_or_else(|_| String::new())
}
