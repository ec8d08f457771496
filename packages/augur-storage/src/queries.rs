use sqlx::{PgConnection, PgExecutor};
use time::OffsetDateTime;

use crate::{
	Result,
	models::{AccuracyCounts, MatchRow, NewMatch, NewPrediction, PredictionRow},
};

const MATCH_SELECT: &str = "\
SELECT
	m.match_id,
	h.name AS home_team,
	h.country AS home_country,
	a.name AS away_team,
	a.country AS away_country,
	m.league,
	m.venue,
	m.status,
	m.home_score,
	m.away_score,
	m.kickoff_at
FROM matches m
JOIN teams h ON h.team_id = m.home_team_id
JOIN teams a ON a.team_id = m.away_team_id";

const PREDICTION_SELECT: &str = "\
SELECT
	prediction_id,
	match_id,
	home_team,
	away_team,
	league,
	home_win_hundredths,
	draw_hundredths,
	away_win_hundredths,
	reasoning,
	confidence_score,
	model_version,
	parameters,
	is_correct,
	created_at
FROM ai_predictions";

pub async fn fetch_match(executor: impl PgExecutor<'_>, match_id: i64) -> Result<Option<MatchRow>> {
	let sql = format!("{MATCH_SELECT}\nWHERE m.match_id = $1");
	let row = sqlx::query_as::<_, MatchRow>(&sql).bind(match_id).fetch_optional(executor).await?;

	Ok(row)
}

/// Finished matches between two teams in either home/away arrangement, newest first.
pub async fn matches_between(
	executor: impl PgExecutor<'_>,
	team_a: &str,
	team_b: &str,
	limit: i64,
) -> Result<Vec<MatchRow>> {
	let sql = format!(
		"{MATCH_SELECT}
WHERE m.status = 'FINISHED'
	AND (
		(lower(h.name) = lower($1) AND lower(a.name) = lower($2))
		OR (lower(h.name) = lower($2) AND lower(a.name) = lower($1))
	)
ORDER BY m.kickoff_at DESC, m.match_id DESC
LIMIT $3"
	);
	let rows = sqlx::query_as::<_, MatchRow>(&sql)
		.bind(team_a.trim())
		.bind(team_b.trim())
		.bind(limit)
		.fetch_all(executor)
		.await?;

	Ok(rows)
}

/// Finished matches involving `team`, newest first.
pub async fn matches_for_team(
	executor: impl PgExecutor<'_>,
	team: &str,
	limit: i64,
) -> Result<Vec<MatchRow>> {
	let sql = format!(
		"{MATCH_SELECT}
WHERE m.status = 'FINISHED'
	AND (lower(h.name) = lower($1) OR lower(a.name) = lower($1))
ORDER BY m.kickoff_at DESC, m.match_id DESC
LIMIT $2"
	);
	let rows = sqlx::query_as::<_, MatchRow>(&sql)
		.bind(team.trim())
		.bind(limit)
		.fetch_all(executor)
		.await?;

	Ok(rows)
}

pub async fn finished_matches(executor: impl PgExecutor<'_>, limit: i64) -> Result<Vec<MatchRow>> {
	let sql = format!(
		"{MATCH_SELECT}
WHERE m.status = 'FINISHED'
ORDER BY m.kickoff_at DESC, m.match_id DESC
LIMIT $1"
	);
	let rows = sqlx::query_as::<_, MatchRow>(&sql).bind(limit).fetch_all(executor).await?;

	Ok(rows)
}

/// Matches of any status kicking off in `[from, to]`, oldest first.
pub async fn matches_between_dates(
	executor: impl PgExecutor<'_>,
	from: OffsetDateTime,
	to: OffsetDateTime,
) -> Result<Vec<MatchRow>> {
	let sql = format!(
		"{MATCH_SELECT}
WHERE m.kickoff_at BETWEEN $1 AND $2
ORDER BY m.kickoff_at ASC, m.match_id ASC"
	);
	let rows =
		sqlx::query_as::<_, MatchRow>(&sql).bind(from).bind(to).fetch_all(executor).await?;

	Ok(rows)
}

/// Inserts the team or refreshes its country, matching names case-insensitively.
pub async fn upsert_team(executor: impl PgExecutor<'_>, name: &str, country: &str) -> Result<i64> {
	let team_id: i64 = sqlx::query_scalar(
		"\
INSERT INTO teams (name, country)
VALUES ($1, $2)
ON CONFLICT ((lower(name))) DO UPDATE
SET country = CASE WHEN EXCLUDED.country <> '' THEN EXCLUDED.country ELSE teams.country END
RETURNING team_id",
	)
	.bind(name.trim())
	.bind(country.trim())
	.fetch_one(executor)
	.await?;

	Ok(team_id)
}

pub async fn insert_match(conn: &mut PgConnection, new: &NewMatch) -> Result<i64> {
	let home_team_id = upsert_team(&mut *conn, &new.home.name, &new.home.country).await?;
	let away_team_id = upsert_team(&mut *conn, &new.away.name, &new.away.country).await?;
	let match_id: i64 = sqlx::query_scalar(
		"\
INSERT INTO matches (
	home_team_id,
	away_team_id,
	league,
	venue,
	kickoff_at,
	status,
	home_score,
	away_score
)
VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
RETURNING match_id",
	)
	.bind(home_team_id)
	.bind(away_team_id)
	.bind(new.league.trim())
	.bind(new.venue.as_deref())
	.bind(new.kickoff_at)
	.bind(new.status.as_str())
	.bind(new.home_score)
	.bind(new.away_score)
	.fetch_one(&mut *conn)
	.await?;

	Ok(match_id)
}

/// Returns the assigned `(prediction_id, created_at)`.
pub async fn insert_prediction(
	executor: impl PgExecutor<'_>,
	new: &NewPrediction,
) -> Result<(i64, OffsetDateTime)> {
	let row: (i64, OffsetDateTime) = sqlx::query_as(
		"\
INSERT INTO ai_predictions (
	match_id,
	home_team,
	away_team,
	league,
	home_win_hundredths,
	draw_hundredths,
	away_win_hundredths,
	reasoning,
	confidence_score,
	model_version,
	parameters
)
VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
RETURNING prediction_id, created_at",
	)
	.bind(new.match_id)
	.bind(new.home_team.as_str())
	.bind(new.away_team.as_str())
	.bind(new.league.as_str())
	.bind(hundredths(new.home_win))
	.bind(hundredths(new.draw))
	.bind(hundredths(new.away_win))
	.bind(new.reasoning.as_str())
	.bind(new.confidence_score)
	.bind(new.model_version.as_str())
	.bind(&new.parameters)
	.fetch_one(executor)
	.await?;

	Ok(row)
}

pub async fn predictions_for_match(
	executor: impl PgExecutor<'_>,
	match_id: i64,
	limit: i64,
) -> Result<Vec<PredictionRow>> {
	let sql = format!(
		"{PREDICTION_SELECT}
WHERE match_id = $1
ORDER BY created_at DESC, prediction_id DESC
LIMIT $2"
	);
	let rows = sqlx::query_as::<_, PredictionRow>(&sql)
		.bind(match_id)
		.bind(limit)
		.fetch_all(executor)
		.await?;

	Ok(rows)
}

pub async fn prediction_accuracy(executor: impl PgExecutor<'_>) -> Result<AccuracyCounts> {
	let counts = sqlx::query_as::<_, AccuracyCounts>(
		"\
SELECT
	count(*) FILTER (WHERE is_correct IS NOT NULL) AS evaluated,
	count(*) FILTER (WHERE is_correct) AS correct
FROM ai_predictions",
	)
	.fetch_one(executor)
	.await?;

	Ok(counts)
}

fn hundredths(value: augur_domain::Percentage) -> i32 {
	// Bounded by 10_000.
	value.hundredths() as i32
}
