use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::fixture::same_team;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchStatus {
	Scheduled,
	Live,
	Finished,
	Postponed,
	Cancelled,
}
impl MatchStatus {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Scheduled => "SCHEDULED",
			Self::Live => "LIVE",
			Self::Finished => "FINISHED",
			Self::Postponed => "POSTPONED",
			Self::Cancelled => "CANCELLED",
		}
	}

	pub fn parse(raw: &str) -> Option<Self> {
		match raw.trim().to_ascii_uppercase().as_str() {
			"SCHEDULED" => Some(Self::Scheduled),
			"LIVE" | "IN_PROGRESS" => Some(Self::Live),
			"FINISHED" => Some(Self::Finished),
			"POSTPONED" => Some(Self::Postponed),
			"CANCELLED" | "CANCELED" => Some(Self::Cancelled),
			_ => None,
		}
	}

	/// Only finished matches count towards head-to-head and form.
	pub fn is_terminal(self) -> bool {
		matches!(self, Self::Finished)
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchRecord {
	pub match_id: i64,
	pub home_team: String,
	pub away_team: String,
	pub league: String,
	pub venue: Option<String>,
	pub status: MatchStatus,
	pub home_score: i32,
	pub away_score: i32,
	#[serde(with = "crate::time_serde")]
	pub kickoff_at: OffsetDateTime,
}
impl MatchRecord {
	pub fn is_finished(&self) -> bool {
		self.status.is_terminal()
	}

	pub fn involves(&self, team: &str) -> bool {
		same_team(&self.home_team, team) || same_team(&self.away_team, team)
	}

	/// Returns `(goals_for, goals_against, opponent)` from `team`'s side, if it played.
	pub fn perspective(&self, team: &str) -> Option<(i32, i32, &str)> {
		if same_team(&self.home_team, team) {
			Some((self.home_score, self.away_score, self.away_team.as_str()))
		} else if same_team(&self.away_team, team) {
			Some((self.away_score, self.home_score, self.home_team.as_str()))
		} else {
			None
		}
	}
}
