mod error;
mod execute;
pub mod lookup;
pub mod lookup_aggregate;
pub mod memory;

use std::{future::Future, pin::Pin, sync::Arc};

use serde_json::Value;

pub use error::{ServiceError, ServiceResult};
pub use lookup::{FilterQuery, LookupRequest, LookupResponse};
pub use lookup_aggregate::{AggregateLookupRequest, AggregateLookupResponse};
pub use memory::{
	LearnRequest, LearnResponse, MemoryBackend, RetrieveRequest, RetrieveResponse,
};

use mnemo_config::{
	Config, DatasetHubConfig, EmbeddingProviderConfig, SheetConfig, VectorStoreConfig,
};
use mnemo_providers::{dataset_hub, embedding, sheet, vector};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// The remote aggregation capability every lookup candidate runs through.
pub trait AggregateProvider
where
	Self: Send + Sync,
{
	fn aggregate<'a>(
		&'a self,
		cfg: &'a DatasetHubConfig,
		dataset: &'a str,
		pipeline: &'a [Value],
	) -> BoxFuture<'a, color_eyre::Result<Vec<Value>>>;

	fn upsert<'a>(
		&'a self,
		cfg: &'a DatasetHubConfig,
		dataset: &'a str,
		id_keys: &'a str,
		records: &'a [Value],
	) -> BoxFuture<'a, color_eyre::Result<()>>;
}

pub trait EmbeddingProvider
where
	Self: Send + Sync,
{
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		text: &'a str,
	) -> BoxFuture<'a, color_eyre::Result<Vec<f32>>>;
}

pub trait VectorStoreProvider
where
	Self: Send + Sync,
{
	fn search<'a>(
		&'a self,
		cfg: &'a VectorStoreConfig,
		query_embedding: &'a [f32],
		match_count: u32,
	) -> BoxFuture<'a, color_eyre::Result<Vec<Value>>>;

	fn insert<'a>(
		&'a self,
		cfg: &'a VectorStoreConfig,
		record: &'a Value,
	) -> BoxFuture<'a, color_eyre::Result<()>>;
}

pub trait SheetProvider
where
	Self: Send + Sync,
{
	fn fetch<'a>(
		&'a self,
		cfg: &'a SheetConfig,
		key: &'a str,
	) -> BoxFuture<'a, color_eyre::Result<Option<Value>>>;

	fn append<'a>(
		&'a self,
		cfg: &'a SheetConfig,
		key: &'a str,
		value: &'a str,
	) -> BoxFuture<'a, color_eyre::Result<()>>;
}

#[derive(Clone)]
pub struct Providers {
	pub aggregate: Arc<dyn AggregateProvider>,
	pub embedding: Arc<dyn EmbeddingProvider>,
	pub vector: Arc<dyn VectorStoreProvider>,
	pub sheet: Arc<dyn SheetProvider>,
}
impl Providers {
	pub fn new(
		aggregate: Arc<dyn AggregateProvider>,
		embedding: Arc<dyn EmbeddingProvider>,
		vector: Arc<dyn VectorStoreProvider>,
		sheet: Arc<dyn SheetProvider>,
	) -> Self {
		Self { aggregate, embedding, vector, sheet }
	}
}
impl Default for Providers {
	fn default() -> Self {
		let provider = Arc::new(DefaultProviders);

		Self {
			aggregate: provider.clone(),
			embedding: provider.clone(),
			vector: provider.clone(),
			sheet: provider,
		}
	}
}

pub struct MnemoService {
	pub cfg: Config,
	pub providers: Providers,
}
impl MnemoService {
	pub fn new(cfg: Config) -> Self {
		Self { cfg, providers: Providers::default() }
	}

	pub fn with_providers(cfg: Config, providers: Providers) -> Self {
		Self { cfg, providers }
	}
}

struct DefaultProviders;

impl AggregateProvider for DefaultProviders {
	fn aggregate<'a>(
		&'a self,
		cfg: &'a DatasetHubConfig,
		dataset: &'a str,
		pipeline: &'a [Value],
	) -> BoxFuture<'a, color_eyre::Result<Vec<Value>>> {
		Box::pin(dataset_hub::aggregate(cfg, dataset, pipeline))
	}

	fn upsert<'a>(
		&'a self,
		cfg: &'a DatasetHubConfig,
		dataset: &'a str,
		id_keys: &'a str,
		records: &'a [Value],
	) -> BoxFuture<'a, color_eyre::Result<()>> {
		Box::pin(dataset_hub::upsert(cfg, dataset, id_keys, records))
	}
}

impl EmbeddingProvider for DefaultProviders {
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		text: &'a str,
	) -> BoxFuture<'a, color_eyre::Result<Vec<f32>>> {
		Box::pin(embedding::embed(cfg, text))
	}
}

impl VectorStoreProvider for DefaultProviders {
	fn search<'a>(
		&'a self,
		cfg: &'a VectorStoreConfig,
		query_embedding: &'a [f32],
		match_count: u32,
	) -> BoxFuture<'a, color_eyre::Result<Vec<Value>>> {
		Box::pin(vector::search(cfg, query_embedding, match_count))
	}

	fn insert<'a>(
		&'a self,
		cfg: &'a VectorStoreConfig,
		record: &'a Value,
	) -> BoxFuture<'a, color_eyre::Result<()>> {
		Box::pin(vector::insert(cfg, record))
	}
}

impl SheetProvider for DefaultProviders {
	fn fetch<'a>(
		&'a self,
		cfg: &'a SheetConfig,
		key: &'a str,
	) -> BoxFuture<'a, color_eyre::Result<Option<Value>>> {
		Box::pin(sheet::fetch(cfg, key))
	}

	fn append<'a>(
		&'a self,
		cfg: &'a SheetConfig,
		key: &'a str,
		value: &'a str,
	) -> BoxFuture<'a, color_eyre::Result<()>> {
		Box::pin(sheet::append(cfg, key, value))
	}
}
