//! Line scanner that turns free-form model output into a probability triple and reasoning.
//!
//! The scanner has two states. While seeking fields, a line that starts with one of the
//! recognized keys sets that field. Once `REASONING` is seen, every following line belongs to
//! the reasoning text, even when it looks like a field.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::percent::{FULL_HUNDREDTHS, Percentage};

pub const DEFAULT_HOME_WIN: Percentage = Percentage::saturating(3_333);
pub const DEFAULT_DRAW: Percentage = Percentage::saturating(3_334);
pub const DEFAULT_AWAY_WIN: Percentage = Percentage::saturating(3_333);
pub const REASONING_FALLBACK_PREFIX: &str =
	"AI did not provide explicit reasoning. Full response: ";

// Raw values above this are treated as garbage rather than rescaled.
const MAX_RAW_PERCENT: f64 = 10_000.0;

static FIELD_LINE: LazyLock<Option<Regex>> = LazyLock::new(|| {
	Regex::new(
		r"(?i)^[\s*#>_-]*(home[\s_-]*win|draw|away[\s_-]*win|reasoning)[*_]*(?:\s*[:=][*_]*\s*|\s+|$)(.*)$",
	)
	.ok()
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Field {
	HomeWin,
	Draw,
	AwayWin,
	Reasoning,
}
impl Field {
	pub const ALL: [Self; 4] = [Self::HomeWin, Self::Draw, Self::AwayWin, Self::Reasoning];

	pub fn as_str(self) -> &'static str {
		match self {
			Self::HomeWin => "HOME_WIN",
			Self::Draw => "DRAW",
			Self::AwayWin => "AWAY_WIN",
			Self::Reasoning => "REASONING",
		}
	}

	fn from_key(key: &str) -> Option<Self> {
		let compact = key
			.chars()
			.filter(|ch| ch.is_ascii_alphabetic())
			.collect::<String>()
			.to_ascii_lowercase();

		match compact.as_str() {
			"homewin" => Some(Self::HomeWin),
			"draw" => Some(Self::Draw),
			"awaywin" => Some(Self::AwayWin),
			"reasoning" => Some(Self::Reasoning),
			_ => None,
		}
	}
}

/// What the parser had to repair. Stored next to the prediction, never inside it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseReport {
	pub missing: Vec<Field>,
	pub malformed: Vec<Field>,
	pub rescaled: bool,
	pub uniform_fallback: bool,
	pub reasoning_fallback: bool,
}
impl ParseReport {
	pub fn is_degraded(&self) -> bool {
		!self.missing.is_empty()
			|| !self.malformed.is_empty()
			|| self.uniform_fallback
			|| self.reasoning_fallback
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedResponse {
	pub home_win: Percentage,
	pub draw: Percentage,
	pub away_win: Percentage,
	pub reasoning: String,
	pub report: ParseReport,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
	SeekingField,
	InReasoning,
}

#[derive(Debug, Clone, Copy, Default)]
enum Slot {
	#[default]
	Unseen,
	Malformed,
	Value(u64),
}
impl Slot {
	fn assign(&mut self, raw: &str) {
		match parse_hundredths(raw) {
			Some(value) => *self = Self::Value(value),
			// A valid earlier value survives a later garbled line.
			None =>
				if !matches!(self, Self::Value(_)) {
					*self = Self::Malformed;
				},
		}
	}
}

pub fn parse_response(raw: &str) -> ParsedResponse {
	let mut state = ScanState::SeekingField;
	let mut slots = [Slot::Unseen; 3];
	let mut reasoning_seen = false;
	let mut reasoning_lines: Vec<&str> = Vec::new();

	for line in raw.lines() {
		let line = line.trim();

		match state {
			ScanState::SeekingField => {
				let Some((field, rest)) = match_field(line) else {
					continue;
				};

				match field {
					Field::HomeWin => slots[0].assign(rest),
					Field::Draw => slots[1].assign(rest),
					Field::AwayWin => slots[2].assign(rest),
					Field::Reasoning => {
						reasoning_seen = true;
						state = ScanState::InReasoning;

						if !rest.is_empty() {
							reasoning_lines.push(rest);
						}
					},
				}
			},
			ScanState::InReasoning =>
				if !line.is_empty() {
					reasoning_lines.push(line);
				},
		}
	}

	let mut report = ParseReport::default();

	for (slot, field) in slots.iter().zip([Field::HomeWin, Field::Draw, Field::AwayWin]) {
		match slot {
			Slot::Unseen => report.missing.push(field),
			Slot::Malformed => report.malformed.push(field),
			Slot::Value(_) => {},
		}
	}

	if !reasoning_seen {
		report.missing.push(Field::Reasoning);
	}

	let defaults = [DEFAULT_HOME_WIN, DEFAULT_DRAW, DEFAULT_AWAY_WIN];
	let raw_values: [u64; 3] = std::array::from_fn(|i| match slots[i] {
		Slot::Value(value) => value,
		_ => u64::from(defaults[i].hundredths()),
	});
	let (triple, outcome) = normalize(raw_values);

	match outcome {
		Normalization::Unchanged => {},
		Normalization::Rescaled => report.rescaled = true,
		Normalization::UniformFallback => report.uniform_fallback = true,
	}

	let reasoning = reasoning_lines.join(" ").trim().to_string();
	let reasoning = if reasoning.is_empty() {
		report.reasoning_fallback = true;

		format!("{REASONING_FALLBACK_PREFIX}{raw}")
	} else {
		reasoning
	};

	ParsedResponse {
		home_win: triple[0],
		draw: triple[1],
		away_win: triple[2],
		reasoning,
		report,
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Normalization {
	Unchanged,
	Rescaled,
	UniformFallback,
}

/// Rescales a (home, draw, away) triple of raw hundredths to sum to exactly `100.00`.
///
/// Home and away are rounded half-up to the nearest hundredth and the draw absorbs the
/// remainder, so `60/30/20` becomes `54.55/27.27/18.18`. An all-zero triple falls back to the
/// uniform default.
pub fn normalize(raw: [u64; 3]) -> ([Percentage; 3], Normalization) {
	let full = u64::from(FULL_HUNDREDTHS);
	let sum: u64 = raw.iter().sum();

	if sum == 0 {
		return ([DEFAULT_HOME_WIN, DEFAULT_DRAW, DEFAULT_AWAY_WIN], Normalization::UniformFallback);
	}
	if sum == full {
		return (raw.map(clamp_percentage), Normalization::Unchanged);
	}

	let home = scale(raw[0], sum).min(full);
	let away = scale(raw[2], sum).min(full - home);
	let draw = full - home - away;

	([home, draw, away].map(clamp_percentage), Normalization::Rescaled)
}

fn scale(value: u64, sum: u64) -> u64 {
	(value * u64::from(FULL_HUNDREDTHS) * 2 + sum) / (sum * 2)
}

fn clamp_percentage(hundredths: u64) -> Percentage {
	Percentage::saturating(hundredths.min(u64::from(FULL_HUNDREDTHS)) as u32)
}

fn match_field(line: &str) -> Option<(Field, &str)> {
	let captures = FIELD_LINE.as_ref()?.captures(line)?;
	let field = Field::from_key(captures.get(1)?.as_str())?;
	let rest = captures.get(2).map(|m| m.as_str().trim()).unwrap_or_default();

	Some((field, rest))
}

fn parse_hundredths(raw: &str) -> Option<u64> {
	let cleaned = raw.trim().trim_matches('*').trim();
	let cleaned = cleaned.strip_suffix('%').unwrap_or(cleaned).trim();
	let value: f64 = cleaned.parse().ok()?;

	if !value.is_finite() || !(0.0..=MAX_RAW_PERCENT).contains(&value) {
		return None;
	}

	Some((value * 100.0).round() as u64)
}

#[cfg(test)]
mod tests {
	use super::*;

	fn triple(parsed: &ParsedResponse) -> [u32; 3] {
		[parsed.home_win.hundredths(), parsed.draw.hundredths(), parsed.away_win.hundredths()]
	}

	#[test]
	fn reads_well_formed_response() {
		let parsed =
			parse_response("HOME_WIN: 55\nDRAW: 25\nAWAY_WIN: 20\nREASONING: Alpha dominates H2H.");

		assert_eq!(triple(&parsed), [5_500, 2_500, 2_000]);
		assert_eq!(parsed.reasoning, "Alpha dominates H2H.");
		assert!(!parsed.report.is_degraded());
		assert!(!parsed.report.rescaled);
	}

	#[test]
	fn tolerates_case_spacing_markdown_and_percent_signs() {
		let raw = "Here is my view.\n**Home Win**: 50%\ndraw 30 %\n- away_win = 20\n\nReasoning:\nHome side is strong.\n\nHOME_WIN: 99 is mentioned here too.";
		let parsed = parse_response(raw);

		assert_eq!(triple(&parsed), [5_000, 3_000, 2_000]);
		assert_eq!(
			parsed.reasoning,
			"Home side is strong. HOME_WIN: 99 is mentioned here too."
		);
	}

	#[test]
	fn no_fields_yield_default_triple_and_fallback_reasoning() {
		let raw = "I think it will be a close game.";
		let parsed = parse_response(raw);

		assert_eq!(triple(&parsed), [3_333, 3_334, 3_333]);
		assert_eq!(parsed.reasoning, format!("{REASONING_FALLBACK_PREFIX}{raw}"));
		assert_eq!(parsed.report.missing, Field::ALL.to_vec());
		assert!(parsed.report.reasoning_fallback);
	}

	#[test]
	fn malformed_value_keeps_default_for_that_field() {
		let parsed = parse_response("HOME_WIN: around half\nDRAW: 33.34\nAWAY_WIN: 33.33\nREASONING: x");

		assert_eq!(triple(&parsed), [3_333, 3_334, 3_333]);
		assert_eq!(parsed.report.malformed, vec![Field::HomeWin]);
		assert!(parsed.report.missing.is_empty());
	}

	#[test]
	fn negative_and_non_finite_values_are_malformed() {
		let parsed = parse_response("HOME_WIN: -10\nDRAW: NaN\nAWAY_WIN: inf\nREASONING: x");

		assert_eq!(parsed.report.malformed, vec![Field::HomeWin, Field::Draw, Field::AwayWin]);
		assert_eq!(triple(&parsed), [3_333, 3_334, 3_333]);
	}

	#[test]
	fn overfull_triple_is_rescaled_with_fixed_rounding() {
		let parsed = parse_response("HOME_WIN: 60\nDRAW: 30\nAWAY_WIN: 20");

		assert_eq!(triple(&parsed), [5_455, 2_727, 1_818]);
		assert!(parsed.report.rescaled);
		assert!(parsed.report.reasoning_fallback);
	}

	#[test]
	fn all_zero_triple_falls_back_to_uniform_default() {
		let parsed = parse_response("HOME_WIN: 0\nDRAW: 0\nAWAY_WIN: 0\nREASONING: nothing");

		assert_eq!(triple(&parsed), [3_333, 3_334, 3_333]);
		assert!(parsed.report.uniform_fallback);
	}

	#[test]
	fn words_starting_with_a_key_are_not_fields() {
		let parsed = parse_response("Drawing on history, the hosts lead.\nHOME_WIN: 40\nDRAW: 30\nAWAY_WIN: 30");

		assert!(parsed.report.malformed.is_empty());
		assert_eq!(triple(&parsed), [4_000, 3_000, 3_000]);
	}

	#[test]
	fn normalization_always_sums_to_one_hundred() {
		let samples = [0_u64, 1, 7, 33, 50, 3_333, 3_334, 9_999, 10_000, 12_345, 99_999, 1_000_000];

		for h in samples {
			for d in samples {
				for a in samples {
					let (triple, _) = normalize([h, d, a]);
					let sum: u32 = triple.iter().map(|p| p.hundredths()).sum();

					assert_eq!(sum, FULL_HUNDREDTHS, "triple {h}/{d}/{a}");
				}
			}
		}
	}

	#[test]
	fn half_way_rounding_never_overflows_the_draw() {
		let (triple, outcome) = normalize([100, 0, 3_100]);

		assert_eq!(outcome, Normalization::Rescaled);
		assert_eq!(triple.iter().map(|p| p.hundredths()).sum::<u32>(), FULL_HUNDREDTHS);
		assert_eq!(triple[1], Percentage::ZERO);
	}
}
