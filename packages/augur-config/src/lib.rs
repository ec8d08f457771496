mod error;
mod types;

pub use error::{Error, Result};
pub use types::{
	Config, EmbeddingProviderConfig, GenerationProviderConfig, Postgres, Prediction, Providers,
	Qdrant, Retrieval, Service, Storage,
};

use std::{fs, path::Path};

/// Reads, normalizes, and validates the TOML config at `path`.
pub fn load(path: &Path) -> Result<Config> {
	let owned = path.to_path_buf();
	let raw = fs::read_to_string(path)
		.map_err(|source| Error::ReadConfig { path: owned.clone(), source })?;
	let mut cfg = toml::from_str::<Config>(&raw)
		.map_err(|source| Error::ParseConfig { path: owned, source })?;

	normalize(&mut cfg);
	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	let service = &cfg.service;
	let postgres = &cfg.storage.postgres;
	let embedding = &cfg.providers.embedding;
	let generation = &cfg.providers.generation;
	let retrieval = &cfg.retrieval;

	require_non_empty(&[
		("service.http_bind", &service.http_bind),
		("service.admin_bind", &service.admin_bind),
		("storage.postgres.dsn", &postgres.dsn),
		("providers.generation.model", &generation.model),
	])?;
	require_positive(&[
		("storage.postgres.pool_max_conns", u64::from(postgres.pool_max_conns)),
	])?;

	if cfg.storage.qdrant.enabled {
		validate_qdrant(cfg)?;
	}

	require_positive(&[
		("providers.embedding.timeout_ms", embedding.timeout_ms),
		("providers.generation.timeout_ms", generation.timeout_ms),
	])?;
	ensure(
		generation.temperature.is_finite(),
		"providers.generation.temperature must be a finite number.",
	)?;
	ensure(
		(0.0..=2.0).contains(&generation.temperature),
		"providers.generation.temperature must be in the range 0.0-2.0.",
	)?;
	require_positive(&[("retrieval.source_timeout_ms", retrieval.source_timeout_ms)])?;
	ensure(
		generation.timeout_ms > retrieval.source_timeout_ms,
		"providers.generation.timeout_ms must be greater than retrieval.source_timeout_ms.",
	)?;
	require_positive(&[
		("retrieval.context_char_budget", retrieval.context_char_budget as u64),
		("retrieval.match_history_top_k", u64::from(retrieval.match_history_top_k)),
		("retrieval.similar_predictions_top_k", u64::from(retrieval.similar_predictions_top_k)),
	])?;
	ensure(cfg.prediction.transport_retries <= 1, "prediction.transport_retries must be 0 or 1.")
}

fn validate_qdrant(cfg: &Config) -> Result<()> {
	let qdrant = &cfg.storage.qdrant;
	let dimensions = cfg.providers.embedding.dimensions;

	require_non_empty(&[
		("storage.qdrant.url", &qdrant.url),
		("storage.qdrant.match_history_collection", &qdrant.match_history_collection),
		("storage.qdrant.predictions_collection", &qdrant.predictions_collection),
	])?;
	ensure(
		qdrant.match_history_collection != qdrant.predictions_collection,
		"storage.qdrant.match_history_collection must differ from storage.qdrant.predictions_collection.",
	)?;
	require_positive(&[("providers.embedding.dimensions", u64::from(dimensions))])?;
	ensure(
		dimensions == qdrant.vector_dim,
		"providers.embedding.dimensions must match storage.qdrant.vector_dim.",
	)
}

fn ensure(ok: bool, message: &str) -> Result<()> {
	if ok { Ok(()) } else { Err(Error::Validation { message: message.to_string() }) }
}

fn require_non_empty(fields: &[(&str, &String)]) -> Result<()> {
	match fields.iter().find(|(_, value)| value.trim().is_empty()) {
		Some((label, _)) => Err(Error::Validation { message: format!("{label} must be non-empty.") }),
		None => Ok(()),
	}
}

fn require_positive(fields: &[(&str, u64)]) -> Result<()> {
	match fields.iter().find(|(_, value)| *value == 0) {
		Some((label, _)) =>
			Err(Error::Validation { message: format!("{label} must be greater than zero.") }),
		None => Ok(()),
	}
}

fn normalize(cfg: &mut Config) {
	for (api_key, api_base) in [
		(&mut cfg.providers.embedding.api_key, &mut cfg.providers.embedding.api_base),
		(&mut cfg.providers.generation.api_key, &mut cfg.providers.generation.api_base),
	] {
		*api_key = api_key.trim().to_string();
		*api_base = api_base.trim_end_matches('/').to_string();
	}
}
