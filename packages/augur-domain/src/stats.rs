//! Head-to-head and recent-form aggregation over raw match history.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{fixture::same_team, record::MatchRecord};

pub const FORM_WINDOW: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchResult {
	#[serde(rename = "W")]
	Win,
	#[serde(rename = "D")]
	Draw,
	#[serde(rename = "L")]
	Loss,
}
impl MatchResult {
	pub fn from_goals(goals_for: i32, goals_against: i32) -> Self {
		match goals_for.cmp(&goals_against) {
			std::cmp::Ordering::Greater => Self::Win,
			std::cmp::Ordering::Equal => Self::Draw,
			std::cmp::Ordering::Less => Self::Loss,
		}
	}

	pub fn letter(self) -> char {
		match self {
			Self::Win => 'W',
			Self::Draw => 'D',
			Self::Loss => 'L',
		}
	}
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeadToHeadSummary {
	pub team_a: String,
	pub team_b: String,
	pub match_count: u32,
	pub wins_a: u32,
	pub draws: u32,
	pub wins_b: u32,
	pub avg_goals_a: f64,
	pub avg_goals_b: f64,
}
impl HeadToHeadSummary {
	pub fn is_empty(&self) -> bool {
		self.match_count == 0
	}

	pub fn render(&self) -> String {
		if self.is_empty() {
			return format!(
				"Head-to-head, {} vs {}: no previous matches found.",
				self.team_a, self.team_b
			);
		}

		let total = self.match_count;

		format!(
			"Head-to-head, {a} vs {b}.\nTotal matches: {total}.\n{a}: {wins_a} wins ({pct_a:.0}%).\nDraws: {draws} ({pct_draw:.0}%).\n{b}: {wins_b} wins ({pct_b:.0}%).\nAverage goals: {a} {goals_a:.1} - {goals_b:.1} {b}.",
			a = self.team_a,
			b = self.team_b,
			wins_a = self.wins_a,
			pct_a = share(self.wins_a, total),
			draws = self.draws,
			pct_draw = share(self.draws, total),
			wins_b = self.wins_b,
			pct_b = share(self.wins_b, total),
			goals_a = self.avg_goals_a,
			goals_b = self.avg_goals_b,
		)
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormEntry {
	pub opponent: String,
	pub goals_for: i32,
	pub goals_against: i32,
	pub result: MatchResult,
	#[serde(with = "crate::time_serde")]
	pub played_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormSummary {
	pub team: String,
	pub entries: Vec<FormEntry>,
	pub wins: u32,
	pub draws: u32,
	pub losses: u32,
}
impl FormSummary {
	pub fn points(&self) -> u32 {
		3 * self.wins + self.draws
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	pub fn render(&self) -> String {
		if self.is_empty() {
			return format!("Recent form, {}: no finished matches found.", self.team);
		}

		let mut out = format!("Recent form, {} (last {}):\n", self.team, self.entries.len());

		for entry in &self.entries {
			out.push_str(&format!(
				"  vs {}: {}-{} ({})\n",
				entry.opponent,
				entry.goals_for,
				entry.goals_against,
				entry.result.letter()
			));
		}

		out.push_str(&format!(
			"Form: {}W-{}D-{}L ({} points from {}).",
			self.wins,
			self.draws,
			self.losses,
			self.points(),
			3 * self.entries.len()
		));

		out
	}
}

/// Aggregates finished meetings from `team_a`'s perspective, whichever side hosted them.
pub fn compute_head_to_head(
	matches: &[MatchRecord],
	team_a: &str,
	team_b: &str,
) -> HeadToHeadSummary {
	let mut summary = HeadToHeadSummary {
		team_a: team_a.to_string(),
		team_b: team_b.to_string(),
		match_count: 0,
		wins_a: 0,
		draws: 0,
		wins_b: 0,
		avg_goals_a: 0.0,
		avg_goals_b: 0.0,
	};
	let mut goals_a: i64 = 0;
	let mut goals_b: i64 = 0;

	for record in matches.iter().filter(|record| record.is_finished()) {
		let Some((scored, conceded, opponent)) = record.perspective(team_a) else {
			continue;
		};

		if !same_team(opponent, team_b) {
			continue;
		}

		summary.match_count += 1;
		goals_a += i64::from(scored);
		goals_b += i64::from(conceded);

		match MatchResult::from_goals(scored, conceded) {
			MatchResult::Win => summary.wins_a += 1,
			MatchResult::Draw => summary.draws += 1,
			MatchResult::Loss => summary.wins_b += 1,
		}
	}

	if summary.match_count > 0 {
		summary.avg_goals_a = goals_a as f64 / f64::from(summary.match_count);
		summary.avg_goals_b = goals_b as f64 / f64::from(summary.match_count);
	}

	summary
}

/// Last `limit` finished matches of `team`, most recent first. Equal kickoffs keep input order.
pub fn compute_form(matches: &[MatchRecord], team: &str, limit: usize) -> FormSummary {
	let mut finished: Vec<&MatchRecord> =
		matches.iter().filter(|record| record.is_finished() && record.involves(team)).collect();

	finished.sort_by(|a, b| b.kickoff_at.cmp(&a.kickoff_at));
	finished.truncate(limit);

	let mut summary =
		FormSummary { team: team.to_string(), entries: Vec::new(), wins: 0, draws: 0, losses: 0 };

	for record in finished {
		let Some((goals_for, goals_against, opponent)) = record.perspective(team) else {
			continue;
		};
		let result = MatchResult::from_goals(goals_for, goals_against);

		match result {
			MatchResult::Win => summary.wins += 1,
			MatchResult::Draw => summary.draws += 1,
			MatchResult::Loss => summary.losses += 1,
		}

		summary.entries.push(FormEntry {
			opponent: opponent.to_string(),
			goals_for,
			goals_against,
			result,
			played_at: record.kickoff_at,
		});
	}

	summary
}

fn share(part: u32, total: u32) -> f64 {
	if total == 0 {
		return 0.0;
	}

	f64::from(part) * 100.0 / f64::from(total)
}
