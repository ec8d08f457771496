use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

pub const VENUE_UNKNOWN: &str = "TBD";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FixtureReject {
	MissingHomeTeam,
	MissingAwayTeam,
	SameTeams,
	MissingLeague,
}
impl FixtureReject {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::MissingHomeTeam => "MISSING_HOME_TEAM",
			Self::MissingAwayTeam => "MISSING_AWAY_TEAM",
			Self::SameTeams => "SAME_TEAMS",
			Self::MissingLeague => "MISSING_LEAGUE",
		}
	}

	pub fn message(self) -> &'static str {
		match self {
			Self::MissingHomeTeam => "Home team name must be non-empty.",
			Self::MissingAwayTeam => "Away team name must be non-empty.",
			Self::SameTeams => "Home and away teams must be different.",
			Self::MissingLeague => "League must be non-empty.",
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamRef {
	pub name: String,
	#[serde(default)]
	pub country: String,
}

/// Snapshot of the match being predicted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fixture {
	/// Relational id when the fixture was loaded from the match table.
	#[serde(default)]
	pub match_id: Option<i64>,
	pub home: TeamRef,
	pub away: TeamRef,
	pub league: String,
	#[serde(default)]
	pub venue: Option<String>,
	#[serde(with = "crate::time_serde")]
	pub scheduled_at: OffsetDateTime,
}
impl Fixture {
	pub fn validate(&self) -> Result<(), FixtureReject> {
		if self.home.name.trim().is_empty() {
			return Err(FixtureReject::MissingHomeTeam);
		}
		if self.away.name.trim().is_empty() {
			return Err(FixtureReject::MissingAwayTeam);
		}
		if same_team(&self.home.name, &self.away.name) {
			return Err(FixtureReject::SameTeams);
		}
		if self.league.trim().is_empty() {
			return Err(FixtureReject::MissingLeague);
		}

		Ok(())
	}

	pub fn venue_or_unknown(&self) -> &str {
		self.venue
			.as_deref()
			.map(str::trim)
			.filter(|venue| !venue.is_empty())
			.unwrap_or(VENUE_UNKNOWN)
	}
}

/// Team names are compared trimmed and case-insensitively.
pub fn same_team(a: &str, b: &str) -> bool {
	a.trim().to_lowercase() == b.trim().to_lowercase()
}
