use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Debug, Deserialize)]
pub struct Config {
	pub service: Service,
	pub backends: Backends,
	#[serde(default)]
	pub memory: Memory,
}

#[derive(Debug, Deserialize)]
pub struct Service {
	pub http_bind: String,
	pub log_level: String,
}

#[derive(Debug, Deserialize)]
pub struct Backends {
	pub dataset_hub: DatasetHubConfig,
	pub embedding: Option<EmbeddingProviderConfig>,
	pub vector: Option<VectorStoreConfig>,
	pub sheet: Option<SheetConfig>,
}

/// The Mongo-like aggregation service every lookup runs against.
#[derive(Debug, Clone, Deserialize)]
pub struct DatasetHubConfig {
	pub api_base: String,
	pub api_token: String,
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmbeddingProviderConfig {
	pub api_base: String,
	pub api_key: String,
	pub path: String,
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VectorStoreConfig {
	pub api_base: String,
	pub api_key: String,
	#[serde(default = "default_vector_table")]
	pub table: String,
	#[serde(default = "default_match_function")]
	pub match_function: String,
	#[serde(default = "default_match_count")]
	pub match_count: u32,
	pub timeout_ms: u64,
}

/// A spreadsheet web-app endpoint speaking the key/value protocol.
#[derive(Debug, Clone, Deserialize)]
pub struct SheetConfig {
	pub webapp_url: String,
	pub timeout_ms: u64,
}

/// Column layout of the key/value memory dataset.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Memory {
	pub key_column: String,
	pub value_column: String,
	pub created_at_column: String,
}
impl Default for Memory {
	fn default() -> Self {
		Self {
			key_column: "memory_key".to_string(),
			value_column: "value".to_string(),
			created_at_column: "created_at".to_string(),
		}
	}
}

fn default_vector_table() -> String {
	"documents".to_string()
}

fn default_match_function() -> String {
	"match_documents".to_string()
}

fn default_match_count() -> u32 {
	3
}
