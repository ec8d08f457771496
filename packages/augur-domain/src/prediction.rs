use serde::{Deserialize, Serialize};

use crate::{parse::ParsedResponse, percent::Percentage};

/// Nominal confidence of a prediction grounded in retrieved evidence.
pub const AUGMENTED_CONFIDENCE: f64 = 0.75;
/// Nominal confidence of a persona-only prediction.
pub const BASELINE_CONFIDENCE: f64 = 0.50;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Pathway {
	Baseline,
	#[default]
	Augmented,
}
impl Pathway {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Baseline => "baseline",
			Self::Augmented => "augmented",
		}
	}

	pub fn confidence(self) -> f64 {
		match self {
			Self::Baseline => BASELINE_CONFIDENCE,
			Self::Augmented => AUGMENTED_CONFIDENCE,
		}
	}

	pub fn model_version(self, model: &str) -> String {
		match self {
			Self::Baseline => model.to_string(),
			Self::Augmented => format!("{model}-rag"),
		}
	}
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionDraft {
	pub home_win: Percentage,
	pub draw: Percentage,
	pub away_win: Percentage,
	pub reasoning: String,
	pub confidence: f64,
	pub model_version: String,
}
impl PredictionDraft {
	pub fn from_parsed(parsed: &ParsedResponse, pathway: Pathway, model: &str) -> Self {
		Self {
			home_win: parsed.home_win,
			draw: parsed.draw,
			away_win: parsed.away_win,
			reasoning: parsed.reasoning.clone(),
			confidence: pathway.confidence(),
			model_version: pathway.model_version(model),
		}
	}

	pub fn total_hundredths(&self) -> u32 {
		self.home_win.hundredths() + self.draw.hundredths() + self.away_win.hundredths()
	}
}
