use serde::Serialize;

use crate::{AugurService, PredictionResponse, Result, vector::Collection};

pub const MAX_LISTED_PREDICTIONS: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VectorStatus {
	pub enabled: bool,
	pub match_history_count: u64,
	pub prediction_count: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AccuracyReport {
	pub evaluated: u64,
	pub correct: u64,
	/// Percentage of evaluated predictions marked correct, two decimals. Zero when none are.
	pub accuracy_pct: f64,
}

impl AugurService {
	pub async fn vector_status(&self) -> Result<VectorStatus> {
		let index = self.stores.index.as_ref();

		if !index.is_enabled() {
			return Ok(VectorStatus { enabled: false, match_history_count: 0, prediction_count: 0 });
		}

		let (match_history_count, prediction_count) =
			tokio::try_join!(index.count(Collection::MatchHistory), index.count(Collection::Predictions))?;

		Ok(VectorStatus { enabled: true, match_history_count, prediction_count })
	}

	pub async fn accuracy(&self) -> Result<AccuracyReport> {
		let counts = self.stores.predictions.accuracy().await?;
		let evaluated = u64::try_from(counts.evaluated).unwrap_or_default();
		let correct = u64::try_from(counts.correct).unwrap_or_default();
		let accuracy_pct = if evaluated == 0 {
			0.0
		} else {
			(correct as f64 * 10_000.0 / evaluated as f64).round() / 100.0
		};

		Ok(AccuracyReport { evaluated, correct, accuracy_pct })
	}

	/// Stored predictions for one match, newest first.
	pub async fn predictions_for_match(
		&self,
		match_id: i64,
		limit: u32,
	) -> Result<Vec<PredictionResponse>> {
		let limit = limit.clamp(1, MAX_LISTED_PREDICTIONS);
		let rows = self.stores.predictions.for_match(match_id, limit).await?;

		rows.into_iter().map(PredictionResponse::from_row).collect()
	}
}
