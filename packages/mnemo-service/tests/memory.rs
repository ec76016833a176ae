use std::sync::{Arc, Mutex};

use mnemo_config::{Config, DatasetHubConfig, EmbeddingProviderConfig, SheetConfig, VectorStoreConfig};
use mnemo_service::{
	AggregateProvider, BoxFuture, EmbeddingProvider, MnemoService, Providers, SheetProvider,
	VectorStoreProvider,
};
use serde_json::{Value, json};

#[derive(Default)]
struct MemoryBackends {
	aggregate_results: Mutex<Vec<Vec<Value>>>,
	aggregate_calls: Mutex<Vec<(String, Vec<Value>)>>,
	upserts: Mutex<Vec<(String, String, Vec<Value>)>>,
	embedding: Mutex<Option<Vec<f32>>>,
	matches: Mutex<Vec<Value>>,
	inserts: Mutex<Vec<Value>>,
	sheet_rows: Mutex<Vec<(String, String)>>,
	sheet_value: Mutex<Option<Value>>,
}
impl AggregateProvider for MemoryBackends {
	fn aggregate<'a>(
		&'a self,
		_: &'a DatasetHubConfig,
		dataset: &'a str,
		pipeline: &'a [Value],
	) -> BoxFuture<'a, color_eyre::Result<Vec<Value>>> {
		Box::pin(async move {
			self.aggregate_calls.lock().unwrap().push((dataset.to_string(), pipeline.to_vec()));

			Ok(self.aggregate_results.lock().unwrap().remove(0))
		})
	}

	fn upsert<'a>(
		&'a self,
		_: &'a DatasetHubConfig,
		dataset: &'a str,
		id_keys: &'a str,
		records: &'a [Value],
	) -> BoxFuture<'a, color_eyre::Result<()>> {
		Box::pin(async move {
			self.upserts.lock().unwrap().push((
				dataset.to_string(),
				id_keys.to_string(),
				records.to_vec(),
			));

			Ok(())
		})
	}
}
impl EmbeddingProvider for MemoryBackends {
	fn embed<'a>(
		&'a self,
		_: &'a EmbeddingProviderConfig,
		_: &'a str,
	) -> BoxFuture<'a, color_eyre::Result<Vec<f32>>> {
		Box::pin(async move {
			self.embedding
				.lock()
				.unwrap()
				.clone()
				.ok_or_else(|| color_eyre::eyre::eyre!("Embedding backend is down."))
		})
	}
}
impl VectorStoreProvider for MemoryBackends {
	fn search<'a>(
		&'a self,
		_: &'a VectorStoreConfig,
		_: &'a [f32],
		_: u32,
	) -> BoxFuture<'a, color_eyre::Result<Vec<Value>>> {
		Box::pin(async move { Ok(self.matches.lock().unwrap().clone()) })
	}

	fn insert<'a>(
		&'a self,
		_: &'a VectorStoreConfig,
		record: &'a Value,
	) -> BoxFuture<'a, color_eyre::Result<()>> {
		Box::pin(async move {
			self.inserts.lock().unwrap().push(record.clone());

			Ok(())
		})
	}
}
impl SheetProvider for MemoryBackends {
	fn fetch<'a>(
		&'a self,
		_: &'a SheetConfig,
		_: &'a str,
	) -> BoxFuture<'a, color_eyre::Result<Option<Value>>> {
		Box::pin(async move { Ok(self.sheet_value.lock().unwrap().clone()) })
	}

	fn append<'a>(
		&'a self,
		_: &'a SheetConfig,
		key: &'a str,
		value: &'a str,
	) -> BoxFuture<'a, color_eyre::Result<()>> {
		Box::pin(async move {
			self.sheet_rows.lock().unwrap().push((key.to_string(), value.to_string()));

			Ok(())
		})
	}
}

fn service_with(backends: Arc<MemoryBackends>, cfg: Config) -> MnemoService {
	MnemoService::with_providers(
		cfg,
		Providers::new(backends.clone(), backends.clone(), backends.clone(), backends),
	)
}

fn dataset_only_config() -> Config {
	toml::from_str(
		r#"
		[service]
		http_bind = "127.0.0.1:0"
		log_level = "info"

		[backends.dataset_hub]
		api_base = "https://hub.test/api"
		api_token = "secret"
		timeout_ms = 1000
		"#,
	)
	.unwrap()
}

fn full_config() -> Config {
	toml::from_str(
		r#"
		[service]
		http_bind = "127.0.0.1:0"
		log_level = "info"

		[backends.dataset_hub]
		api_base = "https://hub.test/api"
		api_token = "secret"
		timeout_ms = 1000

		[backends.embedding]
		api_base = "https://embed.test"
		api_key = "hf-key"
		path = "/models/mini/pipeline/feature-extraction"
		timeout_ms = 1000

		[backends.vector]
		api_base = "https://store.test"
		api_key = "store-key"
		timeout_ms = 1000

		[backends.sheet]
		webapp_url = "https://sheet.test/exec"
		timeout_ms = 1000
		"#,
	)
	.unwrap()
}

fn retrieve(key: &str, dataset: Option<&str>, backend: &str) -> mnemo_service::RetrieveRequest {
	serde_json::from_value(json!({ "key": key, "dataset": dataset, "backend": backend })).unwrap()
}

fn learn(key: &str, value: Value, backend: &str) -> mnemo_service::LearnRequest {
	serde_json::from_value(json!({
		"key": key,
		"value": value,
		"dataset": "memories",
		"backend": backend,
	}))
	.unwrap()
}

#[tokio::test]
async fn dataset_retrieve_projects_value_and_hides_bookkeeping_columns() {
	let backends = Arc::new(MemoryBackends::default());

	backends.aggregate_results.lock().unwrap().push(vec![json!({
		"memory_key": "vendor:acme",
		"value": "NET30",
		"created_at": "2026-08-25T10:00:00Z",
		"_id": "abc",
		"approver": "jane",
	})]);

	let service = service_with(backends.clone(), dataset_only_config());
	let res =
		service.memory_retrieve(retrieve("vendor:acme", Some("memories"), "dataset")).await.unwrap();

	assert!(res.found);
	assert_eq!(res.value, json!("NET30"));
	assert_eq!(res.extra, Some(json!({ "approver": "jane" }).as_object().cloned().unwrap()));

	let calls = backends.aggregate_calls.lock().unwrap().clone();

	assert_eq!(calls.len(), 1);
	assert_eq!(calls[0].0, "memories");
	assert_eq!(calls[0].1, vec![
		json!({ "$match": { "memory_key": { "$eq": "vendor:acme" } } }),
		json!({ "$limit": 1 }),
	]);
}

#[tokio::test]
async fn dataset_retrieve_misses_degrade_to_not_found() {
	let backends = Arc::new(MemoryBackends::default());

	backends.aggregate_results.lock().unwrap().push(Vec::new());

	let service = service_with(backends, dataset_only_config());
	let res = service.memory_retrieve(retrieve("nobody", Some("memories"), "dataset")).await.unwrap();

	assert!(!res.found);
	assert_eq!(res.value, Value::Null);
	assert!(res.extra.is_none());
}

#[tokio::test]
async fn dataset_retrieve_without_a_dataset_never_queries() {
	let backends = Arc::new(MemoryBackends::default());
	let service = service_with(backends.clone(), dataset_only_config());
	let res = service.memory_retrieve(retrieve("vendor:acme", None, "dataset")).await.unwrap();

	assert!(!res.found);
	assert!(backends.aggregate_calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn dataset_learn_upserts_one_timestamped_record_keyed_by_the_memory_column() {
	let backends = Arc::new(MemoryBackends::default());
	let service = service_with(backends.clone(), dataset_only_config());
	let mut req = learn("vendor:acme", json!("NET30"), "dataset");

	req.extra = json!({ "approver": "jane" }).as_object().cloned();
	service.memory_learn(req).await.unwrap();

	let upserts = backends.upserts.lock().unwrap().clone();

	assert_eq!(upserts.len(), 1);

	let (dataset, id_keys, records) = &upserts[0];

	assert_eq!(dataset, "memories");
	assert_eq!(id_keys, "memory_key");
	assert_eq!(records.len(), 1);
	assert_eq!(records[0]["memory_key"], json!("vendor:acme"));
	assert_eq!(records[0]["value"], json!("NET30"));
	assert_eq!(records[0]["approver"], json!("jane"));
	assert!(records[0]["created_at"].as_str().unwrap().contains("T"));
}

#[tokio::test]
async fn vector_retrieve_returns_the_top_match_with_its_similarity() {
	let backends = Arc::new(MemoryBackends::default());

	*backends.embedding.lock().unwrap() = Some(vec![0.1, 0.2]);
	*backends.matches.lock().unwrap() = vec![
		json!({ "content": "NET30", "similarity": 0.93 }),
		json!({ "content": "NET60", "similarity": 0.41 }),
	];

	let service = service_with(backends, full_config());
	let res = service.memory_retrieve(retrieve("payment terms", None, "vector")).await.unwrap();

	assert!(res.found);
	assert_eq!(res.value, json!("NET30"));
	assert_eq!(res.extra, Some(json!({ "similarity": 0.93 }).as_object().cloned().unwrap()));
}

#[tokio::test]
async fn vector_retrieve_without_configuration_degrades() {
	let backends = Arc::new(MemoryBackends::default());
	let service = service_with(backends, dataset_only_config());
	let res = service.memory_retrieve(retrieve("payment terms", None, "vector")).await.unwrap();

	assert!(!res.found);
}

#[tokio::test]
async fn vector_learn_embeds_the_key_and_stores_the_value_as_content() {
	let backends = Arc::new(MemoryBackends::default());

	*backends.embedding.lock().unwrap() = Some(vec![0.5, 0.5]);

	let service = service_with(backends.clone(), full_config());

	service.memory_learn(learn("payment terms", json!("NET30"), "vector")).await.unwrap();

	let inserts = backends.inserts.lock().unwrap().clone();

	assert_eq!(inserts.len(), 1);
	assert_eq!(inserts[0]["content"], json!("NET30"));
	assert_eq!(inserts[0]["learned_value"], json!("payment terms"));
	assert_eq!(inserts[0]["embedding"], json!([0.5, 0.5]));
}

#[tokio::test]
async fn embedding_failure_aborts_the_vector_learn() {
	let backends = Arc::new(MemoryBackends::default());
	let service = service_with(backends.clone(), full_config());

	service.memory_learn(learn("payment terms", json!("NET30"), "vector")).await.unwrap();

	assert!(backends.inserts.lock().unwrap().is_empty());
}

#[tokio::test]
async fn sheet_retrieve_answers_the_web_app_hit() {
	let backends = Arc::new(MemoryBackends::default());

	*backends.sheet_value.lock().unwrap() = Some(json!("NET30"));

	let service = service_with(backends, full_config());
	let res = service.memory_retrieve(retrieve("vendor:acme", None, "sheet")).await.unwrap();

	assert!(res.found);
	assert_eq!(res.value, json!("NET30"));
	assert!(res.extra.is_none());
}

#[tokio::test]
async fn sheet_learn_appends_a_stringified_row() {
	let backends = Arc::new(MemoryBackends::default());
	let service = service_with(backends.clone(), full_config());

	service.memory_learn(learn("vendor:acme", json!(30), "sheet")).await.unwrap();

	assert_eq!(
		backends.sheet_rows.lock().unwrap().clone(),
		vec![("vendor:acme".to_string(), "30".to_string())]
	);
}

#[tokio::test]
async fn empty_key_short_circuits_both_operations() {
	let backends = Arc::new(MemoryBackends::default());
	let service = service_with(backends.clone(), full_config());
	let res = service.memory_retrieve(retrieve("", Some("memories"), "dataset")).await.unwrap();

	service.memory_learn(learn("", json!("x"), "dataset")).await.unwrap();

	assert!(!res.found);
	assert!(backends.aggregate_calls.lock().unwrap().is_empty());
	assert!(backends.upserts.lock().unwrap().is_empty());
}
