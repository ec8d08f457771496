//! Match history indexing: finished results rendered as narratives and stored for similarity search.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use augur_domain::narrative;

use crate::{AugurService, Error, Result, vector::Collection};

pub const DEFAULT_INDEX_LIMIT: u32 = 1_000;

/// With both `from` and `to`, finished matches kicking off in that window are indexed. Otherwise
/// the most recent `limit` finished matches are.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IndexHistoryRequest {
	#[serde(default, with = "augur_domain::time_serde::option")]
	pub from: Option<OffsetDateTime>,
	#[serde(default, with = "augur_domain::time_serde::option")]
	pub to: Option<OffsetDateTime>,
	#[serde(default)]
	pub limit: Option<u32>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IndexReport {
	pub indexed: u32,
	pub failed: u32,
}

impl AugurService {
	pub async fn index_history(&self, req: IndexHistoryRequest) -> Result<IndexReport> {
		let index = self.stores.index.as_ref();

		if !index.is_enabled() {
			return Err(Error::VectorDisabled);
		}

		let records = match (req.from, req.to) {
			(Some(from), Some(to)) => {
				if from > to {
					return Err(Error::InvalidRequest {
						message: "from must not be later than to.".to_string(),
					});
				}

				self.stores.matches.matches_between_dates(from, to).await?
			},
			(None, None) =>
				self.stores
					.matches
					.finished_matches(req.limit.unwrap_or(DEFAULT_INDEX_LIMIT).max(1))
					.await?,
			_ => {
				return Err(Error::InvalidRequest {
					message: "from and to must be given together.".to_string(),
				});
			},
		};
		let mut report = IndexReport::default();

		for record in records.iter().filter(|record| record.is_finished()) {
			let document = narrative::match_history_document(record);

			match index.upsert(Collection::MatchHistory, &document).await {
				Ok(()) => report.indexed += 1,
				Err(err) => {
					report.failed += 1;

					tracing::warn!(
						match_id = record.match_id,
						error = %err,
						"Failed to index match history."
					);
				},
			}
		}

		tracing::info!(indexed = report.indexed, failed = report.failed, "Match history indexed.");

		Ok(report)
	}
}
