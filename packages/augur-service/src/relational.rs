//! Postgres-backed collaborators.

use sqlx::PgPool;
use time::OffsetDateTime;

use augur_domain::{Fixture, MatchRecord};
use augur_storage::{
	models::{AccuracyCounts, MatchRow, NewPrediction, PredictionRow},
	queries,
};

use crate::{BoxFuture, MatchHistory, PersistedPrediction, PredictionStore, Result};

const HEAD_TO_HEAD_LIMIT: i64 = 50;
const TEAM_MATCH_LIMIT: i64 = 20;

pub struct PgMatchHistory {
	pool: PgPool,
}
impl PgMatchHistory {
	pub fn new(pool: PgPool) -> Self {
		Self { pool }
	}
}
impl MatchHistory for PgMatchHistory {
	fn fixture<'a>(&'a self, match_id: i64) -> BoxFuture<'a, Result<Option<Fixture>>> {
		Box::pin(async move {
			let row = queries::fetch_match(&self.pool, match_id).await?;

			Ok(row.map(MatchRow::into_fixture))
		})
	}

	fn matches_between<'a>(
		&'a self,
		team_a: &'a str,
		team_b: &'a str,
	) -> BoxFuture<'a, Result<Vec<MatchRecord>>> {
		Box::pin(async move {
			let rows =
				queries::matches_between(&self.pool, team_a, team_b, HEAD_TO_HEAD_LIMIT).await?;

			to_records(&rows)
		})
	}

	fn matches_for_team<'a>(&'a self, team: &'a str) -> BoxFuture<'a, Result<Vec<MatchRecord>>> {
		Box::pin(async move {
			let rows = queries::matches_for_team(&self.pool, team, TEAM_MATCH_LIMIT).await?;

			to_records(&rows)
		})
	}

	fn finished_matches<'a>(&'a self, limit: u32) -> BoxFuture<'a, Result<Vec<MatchRecord>>> {
		Box::pin(async move {
			let rows = queries::finished_matches(&self.pool, i64::from(limit)).await?;

			to_records(&rows)
		})
	}

	fn matches_between_dates<'a>(
		&'a self,
		from: OffsetDateTime,
		to: OffsetDateTime,
	) -> BoxFuture<'a, Result<Vec<MatchRecord>>> {
		Box::pin(async move {
			let rows = queries::matches_between_dates(&self.pool, from, to).await?;

			to_records(&rows)
		})
	}
}

pub struct PgPredictionStore {
	pool: PgPool,
}
impl PgPredictionStore {
	pub fn new(pool: PgPool) -> Self {
		Self { pool }
	}
}
impl PredictionStore for PgPredictionStore {
	fn insert<'a>(&'a self, new: &'a NewPrediction) -> BoxFuture<'a, Result<PersistedPrediction>> {
		Box::pin(async move {
			let (prediction_id, created_at) = queries::insert_prediction(&self.pool, new).await?;

			Ok(PersistedPrediction { prediction_id, created_at })
		})
	}

	fn for_match<'a>(
		&'a self,
		match_id: i64,
		limit: u32,
	) -> BoxFuture<'a, Result<Vec<PredictionRow>>> {
		Box::pin(async move {
			let rows =
				queries::predictions_for_match(&self.pool, match_id, i64::from(limit)).await?;

			Ok(rows)
		})
	}

	fn accuracy<'a>(&'a self) -> BoxFuture<'a, Result<AccuracyCounts>> {
		Box::pin(async move { Ok(queries::prediction_accuracy(&self.pool).await?) })
	}
}

fn to_records(rows: &[MatchRow]) -> Result<Vec<MatchRecord>> {
	let records = rows.iter().map(MatchRow::to_record).collect::<augur_storage::Result<Vec<_>>>()?;

	Ok(records)
}
