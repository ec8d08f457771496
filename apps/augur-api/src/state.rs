use std::sync::Arc;

use augur_config::Config;
use augur_service::{AugurService, DisabledIndex, Providers, QdrantIndex, Stores, VectorIndex};
use augur_storage::{db::Db, qdrant::QdrantStore};

#[derive(Clone)]
pub struct AppState {
	pub service: Arc<AugurService>,
}
impl AppState {
	pub async fn new(config: Config) -> color_eyre::Result<Self> {
		let db = Db::connect(&config.storage.postgres).await?;

		db.ensure_schema().await?;

		let providers = Providers::default();
		let index = vector_index(&config, &providers).await;
		let stores = Stores::postgres(&db, index);
		let service = AugurService::with_providers(config, stores, providers);

		Ok(Self::from_service(service))
	}

	pub fn from_service(service: AugurService) -> Self {
		Self { service: Arc::new(service) }
	}
}

/// Falls back to a disabled index when Qdrant is switched off or cannot be bootstrapped, so the
/// relational evidence sources keep serving.
async fn vector_index(config: &Config, providers: &Providers) -> Arc<dyn VectorIndex> {
	let cfg = &config.storage.qdrant;

	if !cfg.enabled {
		tracing::info!("Qdrant disabled; vector evidence sources are unavailable.");

		return Arc::new(DisabledIndex);
	}

	let store = match QdrantStore::new(cfg) {
		Ok(store) => store,
		Err(err) => {
			tracing::warn!(url = %cfg.url, error = %err, "Failed to build Qdrant client; continuing without vector store.");

			return Arc::new(DisabledIndex);
		},
	};

	if let Err(err) = store.ensure_collections().await {
		tracing::warn!(url = %cfg.url, error = %err, "Failed to prepare Qdrant collections; continuing without vector store.");

		return Arc::new(DisabledIndex);
	}

	Arc::new(QdrantIndex::new(
		store,
		providers.embedding.clone(),
		config.providers.embedding.clone(),
	))
}
