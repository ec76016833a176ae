mod error;
mod types;

pub use error::{Error, Result};
pub use types::{
	Backends, Config, DatasetHubConfig, EmbeddingProviderConfig, Memory, Service, SheetConfig,
	VectorStoreConfig,
};

use std::{fs, path::Path};

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	let mut cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.service.http_bind.trim().is_empty() {
		return Err(Error::Validation {
			message: "service.http_bind must be non-empty.".to_string(),
		});
	}
	if cfg.backends.dataset_hub.api_base.trim().is_empty() {
		return Err(Error::Validation {
			message: "backends.dataset_hub.api_base must be non-empty.".to_string(),
		});
	}
	if cfg.backends.dataset_hub.api_token.trim().is_empty() {
		return Err(Error::Validation {
			message: "backends.dataset_hub.api_token must be non-empty.".to_string(),
		});
	}
	if cfg.backends.dataset_hub.timeout_ms == 0 {
		return Err(Error::Validation {
			message: "backends.dataset_hub.timeout_ms must be greater than zero.".to_string(),
		});
	}
	if let Some(embedding) = cfg.backends.embedding.as_ref() {
		if embedding.api_base.trim().is_empty() {
			return Err(Error::Validation {
				message: "backends.embedding.api_base must be non-empty.".to_string(),
			});
		}
		if embedding.api_key.trim().is_empty() {
			return Err(Error::Validation {
				message: "backends.embedding.api_key must be non-empty.".to_string(),
			});
		}
		if embedding.timeout_ms == 0 {
			return Err(Error::Validation {
				message: "backends.embedding.timeout_ms must be greater than zero.".to_string(),
			});
		}
	}
	if let Some(vector) = cfg.backends.vector.as_ref() {
		if vector.api_base.trim().is_empty() {
			return Err(Error::Validation {
				message: "backends.vector.api_base must be non-empty.".to_string(),
			});
		}
		if vector.api_key.trim().is_empty() {
			return Err(Error::Validation {
				message: "backends.vector.api_key must be non-empty.".to_string(),
			});
		}
		if vector.match_count == 0 {
			return Err(Error::Validation {
				message: "backends.vector.match_count must be greater than zero.".to_string(),
			});
		}
		if cfg.backends.embedding.is_none() {
			return Err(Error::Validation {
				message: "backends.vector requires backends.embedding to be configured."
					.to_string(),
			});
		}
	}
	if let Some(sheet) = cfg.backends.sheet.as_ref()
		&& sheet.webapp_url.trim().is_empty()
	{
		return Err(Error::Validation {
			message: "backends.sheet.webapp_url must be non-empty.".to_string(),
		});
	}

	for (label, column) in [
		("memory.key_column", &cfg.memory.key_column),
		("memory.value_column", &cfg.memory.value_column),
		("memory.created_at_column", &cfg.memory.created_at_column),
	] {
		if column.trim().is_empty() {
			return Err(Error::Validation { message: format!("{label} must be non-empty.") });
		}
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	if let Some(embedding) = cfg.backends.embedding.as_mut()
		&& embedding.path.trim().is_empty()
	{
		embedding.path = "/".to_string();
	}

	let trimmed = cfg.backends.dataset_hub.api_base.trim_end_matches('/').to_string();

	cfg.backends.dataset_hub.api_base = trimmed;
}
