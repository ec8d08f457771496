
use serde::{Deserialize, Serialize};
use time::{UtcOffset, macros::format_description};

use crate::{evidence::RetrievedContext, fixture::Fixture};

pub const OUTPUT_FORMAT: &str = "\
HOME_WIN: <integer 0-100>
DRAW: <integer 0-100>
AWAY_WIN: <integer 0-100>
REASONING: <one or more lines of free text>";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Persona {
	#[default]
	Analyst,
	Coach,
	Fan,
	Statistician,
}
impl Persona {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Analyst => "analyst",
			Self::Coach => "coach",
			Self::Fan => "fan",
			Self::Statistician => "statistician",
		}
	}

	pub fn from_label(label: &str) -> Option<Self> {
		match label.trim().to_ascii_lowercase().as_str() {
			"analyst" => Some(Self::Analyst),
			"coach" => Some(Self::Coach),
			"fan" => Some(Self::Fan),
			"statistician" => Some(Self::Statistician),
			_ => None,
		}
	}

	pub fn resolve(label: Option<&str>) -> Selection<Self> {
		Selection::resolve(label, Self::from_label)
	}

	fn instruction(self) -> &'static str {
		match self {
			Self::Analyst =>
				"You are a professional football analyst providing expert match predictions based on comprehensive analysis.",
			Self::Coach =>
				"You are an experienced football coach analyzing this match from a tactical perspective. Focus on formations, player matchups, and strategic advantages.",
			Self::Fan =>
				"You are an enthusiastic football fan providing an engaging and passionate prediction. Share your excitement and gut feelings about the match.",
			Self::Statistician =>
				"You are a data-driven sports statistician. Base your analysis primarily on historical data, head-to-head records, and statistical trends.",
		}
	}
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tone {
	#[default]
	Professional,
	Casual,
	Detailed,
	Brief,
}
impl Tone {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Professional => "professional",
			Self::Casual => "casual",
			Self::Detailed => "detailed",
			Self::Brief => "brief",
		}
	}

	pub fn from_label(label: &str) -> Option<Self> {
		match label.trim().to_ascii_lowercase().as_str() {
			"professional" => Some(Self::Professional),
			"casual" => Some(Self::Casual),
			"detailed" => Some(Self::Detailed),
			"brief" => Some(Self::Brief),
			_ => None,
		}
	}

	pub fn resolve(label: Option<&str>) -> Selection<Self> {
		Selection::resolve(label, Self::from_label)
	}

	fn instruction(self) -> &'static str {
		match self {
			Self::Professional => "Maintain a professional and balanced tone in your analysis.",
			Self::Casual => "Respond in a casual, friendly manner. Use conversational language.",
			Self::Detailed =>
				"Provide an extremely detailed and thorough analysis. Leave no stone unturned.",
			Self::Brief => "Keep your response concise and to the point. Focus only on key factors.",
		}
	}
}

/// A persona or tone picked from a caller label. `fell_back` is set when a label was given but
/// not recognized, so the default was used instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection<T> {
	pub value: T,
	pub fell_back: bool,
}
impl<T> Selection<T>
where
	T: Default,
{
	fn resolve(label: Option<&str>, parse: impl FnOnce(&str) -> Option<T>) -> Self {
		match label.map(str::trim).filter(|label| !label.is_empty()) {
			None => Self { value: T::default(), fell_back: false },
			Some(label) => match parse(label) {
				Some(value) => Self { value, fell_back: false },
				None => Self { value: T::default(), fell_back: true },
			},
		}
	}
}

#[derive(Debug, Clone, Copy)]
pub struct PromptInput<'a> {
	pub fixture: &'a Fixture,
	pub persona: Persona,
	pub tone: Tone,
	/// `None` renders the baseline prompt with no retrieval section.
	pub context: Option<&'a RetrievedContext>,
	pub focus: Option<&'a str>,
}

/// Renders the generation prompt. Identical inputs always produce identical text.
pub fn build_prompt(input: &PromptInput<'_>) -> String {
	let fixture = input.fixture;
	let mut out = String::new();

	out.push_str(input.persona.instruction());
	out.push('\n');
	out.push_str(input.tone.instruction());
	out.push_str("\n\n");

	out.push_str(&format!(
		"MATCH TO PREDICT:\nHome Team: {home}\nAway Team: {away}\nLeague: {league}\nVenue: {venue}\nDate: {date}\n",
		home = team_line(&fixture.home.name, &fixture.home.country),
		away = team_line(&fixture.away.name, &fixture.away.country),
		league = fixture.league.trim(),
		venue = fixture.venue_or_unknown(),
		date = format_kickoff(fixture),
	));

	if let Some(context) = input.context {
		out.push_str("\nRETRIEVED CONTEXT:\n");
		out.push_str(&context.render());
		out.push('\n');
	}
	if let Some(focus) = input.focus.map(str::trim).filter(|focus| !focus.is_empty()) {
		out.push_str(&format!("\nUser's specific focus: {focus}\n"));
	}

	out.push_str("\nYOUR TASK:\n");

	if input.context.is_some() {
		out.push_str(
			"Predict the result using the retrieved context above rather than general football knowledge.\n\
Your reasoning must cite concrete retrieved facts, such as scores, the head-to-head record, or recent form.\n\
If the context says no historical data is available, say so clearly.\n",
		);
	} else {
		out.push_str("Predict the result and explain your reasoning in line with your role.\n");
	}

	out.push_str(
		"Probabilities must be whole numbers between 0 and 100 and must sum to exactly 100.\n\n\
Format your response exactly as:\n",
	);
	out.push_str(OUTPUT_FORMAT);
	out.push('\n');

	out
}

fn team_line(name: &str, country: &str) -> String {
	let name = name.trim();
	let country = country.trim();

	if country.is_empty() { name.to_string() } else { format!("{name} ({country})") }
}

fn format_kickoff(fixture: &Fixture) -> String {
	let utc = fixture.scheduled_at.to_offset(UtcOffset::UTC);

	utc.format(format_description!("[year]-[month]-[day] [hour]:[minute] UTC"))
		.unwrap_or_else(|_| utc.to_string())
}

#[cfg(test)]
mod tests {
	use time::macros::datetime;

	use super::*;
	use crate::{
		evidence::{Branch, EvidenceFragment, Reachability, SENTINEL_CONTEXT},
		fixture::TeamRef,
	};

	fn fixture() -> Fixture {
		Fixture {
			match_id: Some(7),
			home: TeamRef { name: "Alpha FC".to_string(), country: "England".to_string() },
			away: TeamRef { name: "Beta United".to_string(), country: String::new() },
			league: "Test League".to_string(),
			venue: Some("Alpha Park".to_string()),
			scheduled_at: datetime!(2026-05-01 20:00 +02:00),
		}
	}

	#[test]
	fn unknown_labels_fall_back_and_say_so() {
		assert_eq!(Persona::resolve(None), Selection { value: Persona::Analyst, fell_back: false });
		assert_eq!(
			Persona::resolve(Some(" Coach ")),
			Selection { value: Persona::Coach, fell_back: false }
		);
		assert_eq!(
			Persona::resolve(Some("couch")),
			Selection { value: Persona::Analyst, fell_back: true }
		);
		assert_eq!(Tone::resolve(Some("")), Selection { value: Tone::Professional, fell_back: false });
		assert_eq!(
			Tone::resolve(Some("breif")),
			Selection { value: Tone::Professional, fell_back: true }
		);
	}

	#[test]
	fn augmented_prompt_carries_fixture_context_and_directive() {
		let fixture = fixture();
		let context = RetrievedContext::assemble(
			vec![EvidenceFragment::new(Branch::HeadToHead, "Alpha won twice.", 0)],
			Reachability::default(),
			1_000,
		);
		let prompt = build_prompt(&PromptInput {
			fixture: &fixture,
			persona: Persona::Statistician,
			tone: Tone::Brief,
			context: Some(&context),
			focus: Some("set pieces"),
		});

		assert!(prompt.starts_with("You are a data-driven sports statistician."));
		assert!(prompt.contains("Home Team: Alpha FC (England)\n"));
		assert!(prompt.contains("Away Team: Beta United\n"));
		assert!(prompt.contains("Date: 2026-05-01 18:00 UTC"));
		assert!(prompt.contains("=== HEAD-TO-HEAD ===\nAlpha won twice."));
		assert!(prompt.contains("User's specific focus: set pieces"));
		assert!(prompt.contains("must cite concrete retrieved facts"));
		assert!(prompt.contains("sum to exactly 100"));
		assert!(prompt.ends_with(&format!("{OUTPUT_FORMAT}\n")));
	}

	#[test]
	fn sentinel_context_is_rendered_honestly() {
		let fixture = fixture();
		let context = RetrievedContext::assemble(Vec::new(), Reachability::default(), 1_000);
		let prompt = build_prompt(&PromptInput {
			fixture: &fixture,
			persona: Persona::Analyst,
			tone: Tone::Professional,
			context: Some(&context),
			focus: None,
		});

		assert!(prompt.contains(SENTINEL_CONTEXT));
		assert!(!prompt.contains("User's specific focus"));
	}

	#[test]
	fn baseline_prompt_omits_retrieval() {
		let fixture = fixture();
		let prompt = build_prompt(&PromptInput {
			fixture: &fixture,
			persona: Persona::Fan,
			tone: Tone::Casual,
			context: None,
			focus: None,
		});

		assert!(!prompt.contains("RETRIEVED CONTEXT"));
		assert!(prompt.contains("HOME_WIN: <integer 0-100>"));
		assert!(prompt.contains("Respond in a casual, friendly manner."));
	}
}
