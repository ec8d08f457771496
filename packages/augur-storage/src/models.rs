use serde_json::Value;
use time::OffsetDateTime;

use augur_domain::{Fixture, MatchRecord, MatchStatus, Percentage, TeamRef};

use crate::{Error, Result};

/// A `matches` row joined with both team names.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct MatchRow {
	pub match_id: i64,
	pub home_team: String,
	pub home_country: String,
	pub away_team: String,
	pub away_country: String,
	pub league: String,
	pub venue: Option<String>,
	pub status: String,
	pub home_score: i32,
	pub away_score: i32,
	pub kickoff_at: OffsetDateTime,
}
impl MatchRow {
	pub fn to_record(&self) -> Result<MatchRecord> {
		let status = MatchStatus::parse(&self.status).ok_or_else(|| {
			Error::CorruptRow {
				table: "matches",
				message: format!("match {} has unknown status {:?}.", self.match_id, self.status),
			}
		})?;

		Ok(MatchRecord {
			match_id: self.match_id,
			home_team: self.home_team.clone(),
			away_team: self.away_team.clone(),
			league: self.league.clone(),
			venue: self.venue.clone(),
			status,
			home_score: self.home_score,
			away_score: self.away_score,
			kickoff_at: self.kickoff_at,
		})
	}

	pub fn into_fixture(self) -> Fixture {
		Fixture {
			match_id: Some(self.match_id),
			home: TeamRef { name: self.home_team, country: self.home_country },
			away: TeamRef { name: self.away_team, country: self.away_country },
			league: self.league,
			venue: self.venue,
			scheduled_at: self.kickoff_at,
		}
	}
}

#[derive(Debug, Clone)]
pub struct NewMatch {
	pub home: TeamRef,
	pub away: TeamRef,
	pub league: String,
	pub venue: Option<String>,
	pub kickoff_at: OffsetDateTime,
	pub status: MatchStatus,
	pub home_score: i32,
	pub away_score: i32,
}

#[derive(Debug, Clone)]
pub struct NewPrediction {
	pub match_id: Option<i64>,
	pub home_team: String,
	pub away_team: String,
	pub league: String,
	pub home_win: Percentage,
	pub draw: Percentage,
	pub away_win: Percentage,
	pub reasoning: String,
	pub confidence_score: f64,
	pub model_version: String,
	pub parameters: Value,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PredictionRow {
	pub prediction_id: i64,
	pub match_id: Option<i64>,
	pub home_team: String,
	pub away_team: String,
	pub league: String,
	pub home_win_hundredths: i32,
	pub draw_hundredths: i32,
	pub away_win_hundredths: i32,
	pub reasoning: String,
	pub confidence_score: f64,
	pub model_version: String,
	pub parameters: Value,
	pub is_correct: Option<bool>,
	pub created_at: OffsetDateTime,
}
impl PredictionRow {
	/// Returns `(home_win, draw, away_win)`.
	pub fn probabilities(&self) -> Result<(Percentage, Percentage, Percentage)> {
		Ok((
			percentage(self.prediction_id, self.home_win_hundredths)?,
			percentage(self.prediction_id, self.draw_hundredths)?,
			percentage(self.prediction_id, self.away_win_hundredths)?,
		))
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::FromRow)]
pub struct AccuracyCounts {
	pub evaluated: i64,
	pub correct: i64,
}

fn percentage(prediction_id: i64, hundredths: i32) -> Result<Percentage> {
	u32::try_from(hundredths).ok().and_then(Percentage::from_hundredths).ok_or_else(|| {
		Error::CorruptRow {
			table: "ai_predictions",
			message: format!("prediction {prediction_id} has out-of-range probability {hundredths}."),
		}
	})
}
