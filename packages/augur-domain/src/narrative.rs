//! Narrative documents written back into the similarity index.

use std::collections::BTreeMap;

use time::{OffsetDateTime, UtcOffset, format_description::well_known::Rfc3339, macros::format_description};

use crate::{
	fixture::Fixture,
	prediction::PredictionDraft,
	record::MatchRecord,
	stats::MatchResult,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VectorDocument {
	/// Stable natural key; the point id is derived from it.
	pub key: String,
	pub text: String,
	pub metadata: BTreeMap<String, String>,
}

pub fn prediction_key(prediction_id: i64) -> String {
	format!("prediction:{prediction_id}")
}

pub fn match_key(match_id: i64) -> String {
	format!("match:{match_id}")
}

pub fn prediction_document(
	prediction_id: i64,
	fixture: &Fixture,
	draft: &PredictionDraft,
	created_at: OffsetDateTime,
) -> VectorDocument {
	let text = format!(
		"Prediction for {home} vs {away} in the {league} league.\n\
Predicted probabilities: home win {home_win}%, draw {draw}%, away win {away_win}%.\n\
Reasoning: {reasoning}\n\
Venue: {venue}. Date: {date}.\n\
Model: {model}. Confidence: {confidence:.2}.",
		home = fixture.home.name.trim(),
		away = fixture.away.name.trim(),
		league = fixture.league.trim(),
		home_win = draft.home_win,
		draw = draft.draw,
		away_win = draft.away_win,
		reasoning = draft.reasoning.trim(),
		venue = fixture.venue_or_unknown(),
		date = format_date(fixture.scheduled_at),
		model = draft.model_version,
		confidence = draft.confidence,
	);
	let mut metadata = BTreeMap::new();

	metadata.insert("kind".to_string(), "prediction".to_string());
	metadata.insert("prediction_id".to_string(), prediction_id.to_string());

	if let Some(match_id) = fixture.match_id {
		metadata.insert("match_id".to_string(), match_id.to_string());
	}

	metadata.insert("home_team".to_string(), fixture.home.name.trim().to_string());
	metadata.insert("away_team".to_string(), fixture.away.name.trim().to_string());
	metadata.insert("league".to_string(), fixture.league.trim().to_string());
	metadata.insert("home_prob".to_string(), draft.home_win.to_string());
	metadata.insert("draw_prob".to_string(), draft.draw.to_string());
	metadata.insert("away_prob".to_string(), draft.away_win.to_string());
	metadata.insert(
		"created_at".to_string(),
		created_at.format(&Rfc3339).unwrap_or_else(|_| created_at.to_string()),
	);

	VectorDocument { key: prediction_key(prediction_id), text, metadata }
}

pub fn match_history_document(record: &MatchRecord) -> VectorDocument {
	let outcome = match MatchResult::from_goals(record.home_score, record.away_score) {
		MatchResult::Win => format!("{} won at home", record.home_team),
		MatchResult::Draw => "The match ended in a draw".to_string(),
		MatchResult::Loss => format!("{} won away", record.away_team),
	};
	let winner = match MatchResult::from_goals(record.home_score, record.away_score) {
		MatchResult::Win => record.home_team.as_str(),
		MatchResult::Draw => "draw",
		MatchResult::Loss => record.away_team.as_str(),
	};
	let text = format!(
		"Historical match: {home} vs {away} in {league}.\n\
Final result: {home} {home_score} - {away_score} {away}.\n\
Venue: {venue}. Date: {date}.\n\
Outcome: {outcome}. Goal difference: {diff}.",
		home = record.home_team,
		away = record.away_team,
		league = record.league,
		home_score = record.home_score,
		away_score = record.away_score,
		venue = record.venue.as_deref().filter(|venue| !venue.trim().is_empty()).unwrap_or("Unknown"),
		date = format_date(record.kickoff_at),
		diff = (record.home_score - record.away_score).abs(),
	);
	let mut metadata = BTreeMap::new();

	metadata.insert("kind".to_string(), "match".to_string());
	metadata.insert("match_id".to_string(), record.match_id.to_string());
	metadata.insert("home_team".to_string(), record.home_team.clone());
	metadata.insert("away_team".to_string(), record.away_team.clone());
	metadata.insert("league".to_string(), record.league.clone());
	metadata.insert("result".to_string(), format!("{}-{}", record.home_score, record.away_score));
	metadata.insert("winner".to_string(), winner.to_string());

	VectorDocument { key: match_key(record.match_id), text, metadata }
}

fn format_date(at: OffsetDateTime) -> String {
	let utc = at.to_offset(UtcOffset::UTC);

	utc.format(format_description!("[year]-[month]-[day]")).unwrap_or_else(|_| utc.to_string())
}

#[cfg(test)]
mod tests {
	use time::macros::datetime;

	use super::*;
	use crate::{fixture::TeamRef, percent::Percentage, record::MatchStatus};

	#[test]
	fn prediction_document_carries_probabilities_and_reasoning() {
		let fixture = Fixture {
			match_id: Some(11),
			home: TeamRef { name: "Alpha FC".to_string(), country: String::new() },
			away: TeamRef { name: "Beta United".to_string(), country: String::new() },
			league: "Test League".to_string(),
			venue: None,
			scheduled_at: datetime!(2026-05-01 18:00 UTC),
		};
		let draft = PredictionDraft {
			home_win: Percentage::saturating(5_455),
			draw: Percentage::saturating(2_727),
			away_win: Percentage::saturating(1_818),
			reasoning: "Alpha dominates H2H.".to_string(),
			confidence: 0.75,
			model_version: "llama3.2-rag".to_string(),
		};
		let doc = prediction_document(42, &fixture, &draft, datetime!(2026-04-30 09:00 UTC));

		assert_eq!(doc.key, "prediction:42");
		assert!(doc.text.contains("home win 54.55%, draw 27.27%, away win 18.18%"));
		assert!(doc.text.contains("Reasoning: Alpha dominates H2H."));
		assert!(doc.text.contains("Venue: TBD. Date: 2026-05-01."));
		assert!(doc.text.contains("Model: llama3.2-rag. Confidence: 0.75."));
		assert_eq!(doc.metadata.get("match_id").map(String::as_str), Some("11"));
		assert_eq!(doc.metadata.get("created_at").map(String::as_str), Some("2026-04-30T09:00:00Z"));
	}

	#[test]
	fn match_history_document_describes_the_result() {
		let record = MatchRecord {
			match_id: 3,
			home_team: "Beta United".to_string(),
			away_team: "Alpha FC".to_string(),
			league: "Test League".to_string(),
			venue: Some("Beta Ground".to_string()),
			status: MatchStatus::Finished,
			home_score: 1,
			away_score: 3,
			kickoff_at: datetime!(2025-11-02 15:00 UTC),
		};
		let doc = match_history_document(&record);

		assert_eq!(doc.key, "match:3");
		assert!(doc.text.contains("Final result: Beta United 1 - 3 Alpha FC."));
		assert!(doc.text.contains("Outcome: Alpha FC won away. Goal difference: 2."));
		assert_eq!(doc.metadata.get("winner").map(String::as_str), Some("Alpha FC"));
	}
}
