//! Writes finished predictions back into the similarity index so later requests can retrieve them.

use std::sync::Arc;

use tokio::task::JoinHandle;

use augur_domain::narrative::VectorDocument;

use crate::{
	Result,
	vector::{Collection, VectorIndex},
};

/// Returns `false` when the index is disabled and nothing was written.
pub async fn write_prediction_feedback(
	index: &dyn VectorIndex,
	document: &VectorDocument,
) -> Result<bool> {
	if !index.is_enabled() {
		tracing::debug!(key = document.key.as_str(), "Vector index disabled; skipping feedback.");

		return Ok(false);
	}

	index.upsert(Collection::Predictions, document).await?;

	Ok(true)
}

/// Best effort. Failures are logged and never reach the request that produced the prediction.
pub fn spawn_prediction_feedback(
	index: Arc<dyn VectorIndex>,
	document: VectorDocument,
) -> JoinHandle<()> {
	tokio::spawn(async move {
		match write_prediction_feedback(index.as_ref(), &document).await {
			Ok(true) => {
				tracing::debug!(key = document.key.as_str(), "Prediction indexed for retrieval.");
			},
			Ok(false) => {},
			Err(err) => {
				tracing::warn!(
					key = document.key.as_str(),
					error = %err,
					"Failed to index prediction for retrieval."
				);
			},
		}
	})
}
