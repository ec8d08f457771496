//! Similarity index seam. The concrete index is picked once at startup from configuration.

pub use augur_storage::qdrant::SearchHit;

use std::sync::Arc;

use augur_config::EmbeddingProviderConfig;
use augur_domain::{Branch, narrative::VectorDocument};
use augur_storage::qdrant::{self, QdrantStore};

use crate::{BoxFuture, EmbeddingProvider, Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
	MatchHistory,
	Predictions,
}
impl Collection {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::MatchHistory => "match_history",
			Self::Predictions => "predictions",
		}
	}

	/// The evidence branch search hits from this collection feed.
	pub fn branch(self) -> Branch {
		match self {
			Self::MatchHistory => Branch::MatchHistory,
			Self::Predictions => Branch::SimilarPredictions,
		}
	}
}

pub trait VectorIndex
where
	Self: Send + Sync,
{
	fn is_enabled(&self) -> bool;

	/// Documents most similar to `query`, best first.
	fn search<'a>(
		&'a self,
		collection: Collection,
		query: &'a str,
		limit: u32,
	) -> BoxFuture<'a, Result<Vec<SearchHit>>>;

	/// Inserts or replaces the point derived from `document.key`.
	fn upsert<'a>(
		&'a self,
		collection: Collection,
		document: &'a VectorDocument,
	) -> BoxFuture<'a, Result<()>>;

	fn count<'a>(&'a self, collection: Collection) -> BoxFuture<'a, Result<u64>>;
}

/// Embeds text through the configured provider and queries Qdrant.
pub struct QdrantIndex {
	store: QdrantStore,
	embedding: Arc<dyn EmbeddingProvider>,
	embedding_cfg: EmbeddingProviderConfig,
}
impl QdrantIndex {
	pub fn new(
		store: QdrantStore,
		embedding: Arc<dyn EmbeddingProvider>,
		embedding_cfg: EmbeddingProviderConfig,
	) -> Self {
		Self { store, embedding, embedding_cfg }
	}

	fn collection_name(&self, collection: Collection) -> &str {
		match collection {
			Collection::MatchHistory => &self.store.match_history_collection,
			Collection::Predictions => &self.store.predictions_collection,
		}
	}

	async fn embed_one(&self, text: &str) -> Result<Vec<f32>> {
		let texts = [text.to_string()];
		let vectors = self
			.embedding
			.embed(&self.embedding_cfg, &texts)
			.await
			.map_err(|err| Error::Provider { message: err.to_string() })?;
		let Some(vector) = vectors.into_iter().next() else {
			return Err(Error::Provider {
				message: "Embedding provider returned no vectors.".to_string(),
			});
		};

		if vector.len() != self.store.vector_dim as usize {
			return Err(Error::Provider {
				message: format!(
					"Embedding dimension {} does not match vector_dim {}.",
					vector.len(),
					self.store.vector_dim
				),
			});
		}

		Ok(vector)
	}
}
impl VectorIndex for QdrantIndex {
	fn is_enabled(&self) -> bool {
		true
	}

	fn search<'a>(
		&'a self,
		collection: Collection,
		query: &'a str,
		limit: u32,
	) -> BoxFuture<'a, Result<Vec<SearchHit>>> {
		Box::pin(async move {
			let vector = self.embed_one(query).await?;
			let hits =
				self.store.search(self.collection_name(collection), vector, u64::from(limit)).await?;

			Ok(hits)
		})
	}

	fn upsert<'a>(
		&'a self,
		collection: Collection,
		document: &'a VectorDocument,
	) -> BoxFuture<'a, Result<()>> {
		Box::pin(async move {
			let vector = self.embed_one(&document.text).await?;

			self.store
				.upsert(
					self.collection_name(collection),
					qdrant::point_id(&document.key),
					vector,
					&document.text,
					&document.metadata,
				)
				.await?;

			Ok(())
		})
	}

	fn count<'a>(&'a self, collection: Collection) -> BoxFuture<'a, Result<u64>> {
		Box::pin(async move { Ok(self.store.count(self.collection_name(collection)).await?) })
	}
}

/// Stand-in used when the similarity index is switched off or failed to start.
pub struct DisabledIndex;
impl VectorIndex for DisabledIndex {
	fn is_enabled(&self) -> bool {
		false
	}

	fn search<'a>(
		&'a self,
		_collection: Collection,
		_query: &'a str,
		_limit: u32,
	) -> BoxFuture<'a, Result<Vec<SearchHit>>> {
		Box::pin(async { Err(Error::VectorDisabled) })
	}

	fn upsert<'a>(
		&'a self,
		_collection: Collection,
		_document: &'a VectorDocument,
	) -> BoxFuture<'a, Result<()>> {
		Box::pin(async { Ok(()) })
	}

	fn count<'a>(&'a self, _collection: Collection) -> BoxFuture<'a, Result<u64>> {
		Box::pin(async { Ok(0) })
	}
}
