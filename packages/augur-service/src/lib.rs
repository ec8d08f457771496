pub mod evidence;
pub mod feedback;
pub mod indexing;
pub mod predict;
pub mod relational;
pub mod reports;
pub mod retrieval;
pub mod vector;

mod error;

pub use error::{Error, Result};
pub use evidence::Fetch;
pub use indexing::{IndexHistoryRequest, IndexReport};
pub use predict::{PredictRequest, PredictionMetadata, PredictionResponse};
pub use relational::{PgMatchHistory, PgPredictionStore};
pub use reports::{AccuracyReport, VectorStatus};
pub use vector::{Collection, DisabledIndex, QdrantIndex, VectorIndex};

use std::{future::Future, pin::Pin, sync::Arc};

use time::OffsetDateTime;

use augur_config::{Config, EmbeddingProviderConfig, GenerationProviderConfig};
use augur_domain::{Fixture, MatchRecord};
use augur_providers::{embedding, generation};
use augur_storage::{
	db::Db,
	models::{AccuracyCounts, NewPrediction, PredictionRow},
};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

pub trait EmbeddingProvider
where
	Self: Send + Sync,
{
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		texts: &'a [String],
	) -> BoxFuture<'a, augur_providers::Result<Vec<Vec<f32>>>>;
}

/// One completion per call. Implementations must not retry.
pub trait GenerationProvider
where
	Self: Send + Sync,
{
	fn generate<'a>(
		&'a self,
		cfg: &'a GenerationProviderConfig,
		prompt: &'a str,
	) -> BoxFuture<'a, augur_providers::Result<String>>;
}

/// Read access to recorded fixtures and results.
pub trait MatchHistory
where
	Self: Send + Sync,
{
	fn fixture<'a>(&'a self, match_id: i64) -> BoxFuture<'a, Result<Option<Fixture>>>;

	/// Finished matches between the two teams, newest first.
	fn matches_between<'a>(
		&'a self,
		team_a: &'a str,
		team_b: &'a str,
	) -> BoxFuture<'a, Result<Vec<MatchRecord>>>;

	/// Finished matches of one team, newest first.
	fn matches_for_team<'a>(&'a self, team: &'a str) -> BoxFuture<'a, Result<Vec<MatchRecord>>>;

	fn finished_matches<'a>(&'a self, limit: u32) -> BoxFuture<'a, Result<Vec<MatchRecord>>>;

	fn matches_between_dates<'a>(
		&'a self,
		from: OffsetDateTime,
		to: OffsetDateTime,
	) -> BoxFuture<'a, Result<Vec<MatchRecord>>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PersistedPrediction {
	pub prediction_id: i64,
	pub created_at: OffsetDateTime,
}

pub trait PredictionStore
where
	Self: Send + Sync,
{
	fn insert<'a>(&'a self, new: &'a NewPrediction) -> BoxFuture<'a, Result<PersistedPrediction>>;

	/// Newest first.
	fn for_match<'a>(
		&'a self,
		match_id: i64,
		limit: u32,
	) -> BoxFuture<'a, Result<Vec<PredictionRow>>>;

	fn accuracy<'a>(&'a self) -> BoxFuture<'a, Result<AccuracyCounts>>;
}

#[derive(Clone)]
pub struct Providers {
	pub embedding: Arc<dyn EmbeddingProvider>,
	pub generation: Arc<dyn GenerationProvider>,
}

/// Backing stores the pipeline reads evidence from and writes predictions to.
#[derive(Clone)]
pub struct Stores {
	pub matches: Arc<dyn MatchHistory>,
	pub predictions: Arc<dyn PredictionStore>,
	pub index: Arc<dyn VectorIndex>,
}

pub struct AugurService {
	pub cfg: Config,
	pub stores: Stores,
	pub providers: Providers,
}

struct DefaultProviders;

impl EmbeddingProvider for DefaultProviders {
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		texts: &'a [String],
	) -> BoxFuture<'a, augur_providers::Result<Vec<Vec<f32>>>> {
		Box::pin(embedding::embed(cfg, texts))
	}
}

impl GenerationProvider for DefaultProviders {
	fn generate<'a>(
		&'a self,
		cfg: &'a GenerationProviderConfig,
		prompt: &'a str,
	) -> BoxFuture<'a, augur_providers::Result<String>> {
		Box::pin(generation::generate(cfg, prompt, &cfg.model))
	}
}

impl Providers {
	pub fn new(
		embedding: Arc<dyn EmbeddingProvider>,
		generation: Arc<dyn GenerationProvider>,
	) -> Self {
		Self { embedding, generation }
	}
}

impl Default for Providers {
	fn default() -> Self {
		let provider = Arc::new(DefaultProviders);

		Self { embedding: provider.clone(), generation: provider }
	}
}

impl Stores {
	/// Relational collaborators backed by `db`, paired with the given vector index.
	pub fn postgres(db: &Db, index: Arc<dyn VectorIndex>) -> Self {
		Self {
			matches: Arc::new(PgMatchHistory::new(db.pool.clone())),
			predictions: Arc::new(PgPredictionStore::new(db.pool.clone())),
			index,
		}
	}
}

impl AugurService {
	pub fn new(cfg: Config, stores: Stores) -> Self {
		Self { cfg, stores, providers: Providers::default() }
	}

	pub fn with_providers(cfg: Config, stores: Stores, providers: Providers) -> Self {
		Self { cfg, stores, providers }
	}
}
