use std::collections::BTreeMap;

use qdrant_client::{
	Payload,
	qdrant::{
		CountPointsBuilder, CreateCollectionBuilder, Distance, PointStruct, Query,
		QueryPointsBuilder, ScoredPoint, UpsertPointsBuilder, VectorParamsBuilder, value::Kind,
	},
};
use uuid::Uuid;

use crate::Result;

/// Payload key holding the narrative text of a point.
pub const DOCUMENT_KEY: &str = "document";

#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
	pub document: String,
	pub score: f32,
}

pub struct QdrantStore {
	pub client: qdrant_client::Qdrant,
	pub match_history_collection: String,
	pub predictions_collection: String,
	pub vector_dim: u32,
}
impl QdrantStore {
	pub fn new(cfg: &augur_config::Qdrant) -> Result<Self> {
		let client = qdrant_client::Qdrant::from_url(&cfg.url).build()?;

		Ok(Self {
			client,
			match_history_collection: cfg.match_history_collection.clone(),
			predictions_collection: cfg.predictions_collection.clone(),
			vector_dim: cfg.vector_dim,
		})
	}

	/// Creates both collections with a single cosine vector when they are missing.
	pub async fn ensure_collections(&self) -> Result<()> {
		for collection in [&self.match_history_collection, &self.predictions_collection] {
			if self.client.collection_exists(collection.as_str()).await? {
				continue;
			}

			self.client
				.create_collection(CreateCollectionBuilder::new(collection.clone()).vectors_config(
					VectorParamsBuilder::new(self.vector_dim.into(), Distance::Cosine),
				))
				.await?;
		}

		Ok(())
	}

	pub async fn upsert(
		&self,
		collection: &str,
		point_id: Uuid,
		vector: Vec<f32>,
		document: &str,
		metadata: &BTreeMap<String, String>,
	) -> Result<()> {
		let mut payload = Payload::new();

		payload.insert(DOCUMENT_KEY, document.to_string());

		for (key, value) in metadata {
			payload.insert(key.as_str(), value.clone());
		}

		let point = PointStruct::new(point_id.to_string(), vector, payload);

		self.client
			.upsert_points(UpsertPointsBuilder::new(collection.to_string(), vec![point]).wait(true))
			.await?;

		Ok(())
	}

	/// Nearest neighbours of `vector`, best first. Points without a document are skipped.
	pub async fn search(
		&self,
		collection: &str,
		vector: Vec<f32>,
		limit: u64,
	) -> Result<Vec<SearchHit>> {
		let search = QueryPointsBuilder::new(collection.to_string())
			.query(Query::new_nearest(vector))
			.with_payload(true)
			.limit(limit);
		let response = self.client.query(search).await?;

		Ok(response.result.iter().filter_map(search_hit).collect())
	}

	pub async fn count(&self, collection: &str) -> Result<u64> {
		let response =
			self.client.count(CountPointsBuilder::new(collection.to_string()).exact(true)).await?;

		Ok(response.result.map(|result| result.count).unwrap_or_default())
	}
}

/// Stable point id for a narrative key such as `prediction:42`.
pub fn point_id(key: &str) -> Uuid {
	Uuid::new_v5(&Uuid::NAMESPACE_OID, key.as_bytes())
}

fn search_hit(point: &ScoredPoint) -> Option<SearchHit> {
	let value = point.payload.get(DOCUMENT_KEY)?;

	match &value.kind {
		Some(Kind::StringValue(text)) if !text.trim().is_empty() =>
			Some(SearchHit { document: text.clone(), score: point.score }),
		_ => None,
	}
}
