use std::time::Duration;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use augur_domain::{
	Branch, Fixture, ParseReport, Pathway, Percentage, Persona, PredictionDraft, PromptInput, Tone,
	fixture::same_team, narrative, parse, prompt,
};
use augur_storage::models::{NewPrediction, PredictionRow};

use crate::{AugurService, Error, Result, feedback, retrieval};

/// Either `match_id` or an inline `fixture` must be given. An inline fixture that carries a match
/// id, its own or the request's, is checked against the stored match.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PredictRequest {
	#[serde(default)]
	pub match_id: Option<i64>,
	#[serde(default)]
	pub fixture: Option<Fixture>,
	#[serde(default)]
	pub persona: Option<String>,
	#[serde(default)]
	pub tone: Option<String>,
	#[serde(default)]
	pub focus: Option<String>,
	#[serde(default)]
	pub pathway: Pathway,
}

/// How a prediction was produced. Stored next to the numbers, never mixed into them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredictionMetadata {
	pub pathway: Pathway,
	pub persona: Persona,
	pub tone: Tone,
	pub persona_recognized: bool,
	pub tone_recognized: bool,
	pub contributing_sources: Vec<Branch>,
	pub reachable_sources: Vec<Branch>,
	pub retrieved_fragments: usize,
	pub context_truncated: bool,
	pub generation_attempts: u32,
	/// BLAKE3 of the exact prompt text sent to the model.
	pub prompt_fingerprint: String,
	pub parse: ParseReport,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResponse {
	pub prediction_id: i64,
	pub match_id: Option<i64>,
	pub home_team: String,
	pub away_team: String,
	pub league: String,
	pub home_win_probability: Percentage,
	pub draw_probability: Percentage,
	pub away_win_probability: Percentage,
	pub reasoning: String,
	pub confidence_score: f64,
	pub model_version: String,
	#[serde(with = "augur_domain::time_serde")]
	pub created_at: OffsetDateTime,
	/// Absent for stored rows whose parameters no longer decode.
	pub metadata: Option<PredictionMetadata>,
}
impl PredictionResponse {
	pub fn from_row(row: PredictionRow) -> Result<Self> {
		let (home_win, draw, away_win) = row.probabilities()?;
		let metadata = serde_json::from_value(row.parameters).ok();

		Ok(Self {
			prediction_id: row.prediction_id,
			match_id: row.match_id,
			home_team: row.home_team,
			away_team: row.away_team,
			league: row.league,
			home_win_probability: home_win,
			draw_probability: draw,
			away_win_probability: away_win,
			reasoning: row.reasoning,
			confidence_score: row.confidence_score,
			model_version: row.model_version,
			created_at: row.created_at,
			metadata,
		})
	}
}

fn validate_fixture(fixture: &Fixture) -> Result<()> {
	fixture.validate().map_err(|reject| Error::Validation {
		message: format!("{} ({})", reject.message(), reject.as_str()),
	})
}

impl AugurService {
	/// Runs the full pipeline for one fixture: retrieve, prompt, generate, parse, persist, feed back.
	pub async fn predict(&self, req: PredictRequest) -> Result<PredictionResponse> {
		let fixture = self.resolve_fixture(&req).await?;

		let persona = Persona::resolve(req.persona.as_deref());
		let tone = Tone::resolve(req.tone.as_deref());

		if persona.fell_back {
			tracing::warn!(
				label = req.persona.as_deref().unwrap_or_default(),
				fallback = persona.value.as_str(),
				"Unknown persona label; using the default persona."
			);
		}
		if tone.fell_back {
			tracing::warn!(
				label = req.tone.as_deref().unwrap_or_default(),
				fallback = tone.value.as_str(),
				"Unknown tone label; using the default tone."
			);
		}

		let pathway = req.pathway;
		let context = match pathway {
			Pathway::Augmented => Some(
				retrieval::retrieve_context(
					self.stores.matches.as_ref(),
					self.stores.index.as_ref(),
					&self.cfg.retrieval,
					&fixture,
				)
				.await,
			),
			Pathway::Baseline => None,
		};
		let prompt_text = prompt::build_prompt(&PromptInput {
			fixture: &fixture,
			persona: persona.value,
			tone: tone.value,
			context: context.as_ref(),
			focus: req.focus.as_deref(),
		});
		let (raw, attempts) = self.generate_with_retry(&prompt_text, fixture.match_id).await?;
		let parsed = parse::parse_response(&raw);

		if parsed.report.is_degraded() {
			tracing::info!(
				match_id = fixture.match_id,
				missing = parsed.report.missing.len(),
				malformed = parsed.report.malformed.len(),
				rescaled = parsed.report.rescaled,
				"Generated response needed repair."
			);
		}

		let draft =
			PredictionDraft::from_parsed(&parsed, pathway, &self.cfg.providers.generation.model);
		let metadata = PredictionMetadata {
			pathway,
			persona: persona.value,
			tone: tone.value,
			persona_recognized: !persona.fell_back,
			tone_recognized: !tone.fell_back,
			contributing_sources: context
				.as_ref()
				.map(|context| context.contributing_branches())
				.unwrap_or_default(),
			reachable_sources: context
				.as_ref()
				.map(|context| context.reachability.reachable())
				.unwrap_or_default(),
			retrieved_fragments: context.as_ref().map_or(0, |context| context.fragments.len()),
			context_truncated: context.as_ref().is_some_and(|context| context.truncated),
			generation_attempts: attempts,
			prompt_fingerprint: blake3::hash(prompt_text.as_bytes()).to_hex().to_string(),
			parse: parsed.report,
		};
		let parameters = serde_json::to_value(&metadata).map_err(|err| Error::Storage {
			message: format!("Failed to encode prediction metadata: {err}."),
		})?;
		let new = NewPrediction {
			match_id: fixture.match_id,
			home_team: fixture.home.name.trim().to_string(),
			away_team: fixture.away.name.trim().to_string(),
			league: fixture.league.trim().to_string(),
			home_win: draft.home_win,
			draw: draft.draw,
			away_win: draft.away_win,
			reasoning: draft.reasoning.clone(),
			confidence_score: draft.confidence,
			model_version: draft.model_version.clone(),
			parameters,
		};
		let persisted = self.stores.predictions.insert(&new).await?;
		let response = PredictionResponse {
			prediction_id: persisted.prediction_id,
			match_id: new.match_id,
			home_team: new.home_team,
			away_team: new.away_team,
			league: new.league,
			home_win_probability: draft.home_win,
			draw_probability: draft.draw,
			away_win_probability: draft.away_win,
			reasoning: new.reasoning,
			confidence_score: draft.confidence,
			model_version: new.model_version,
			created_at: persisted.created_at,
			metadata: Some(metadata),
		};

		if self.cfg.prediction.feedback_enabled {
			let document = narrative::prediction_document(
				persisted.prediction_id,
				&fixture,
				&draft,
				persisted.created_at,
			);

			feedback::spawn_prediction_feedback(self.stores.index.clone(), document);
		}

		tracing::info!(
			match_id = fixture.match_id,
			prediction_id = persisted.prediction_id,
			pathway = pathway.as_str(),
			attempts,
			"Prediction completed."
		);

		Ok(response)
	}

	/// An inline fixture that names a match must agree with the stored one on both teams.
	async fn resolve_fixture(&self, req: &PredictRequest) -> Result<Fixture> {
		let Some(inline) = &req.fixture else {
			let Some(match_id) = req.match_id else {
				return Err(Error::InvalidRequest {
					message: "Either match_id or fixture is required.".to_string(),
				});
			};
			let fixture = self.load_fixture(match_id).await?;

			validate_fixture(&fixture)?;

			return Ok(fixture);
		};

		validate_fixture(inline)?;

		let match_id = match (inline.match_id, req.match_id) {
			(Some(inner), Some(outer)) if inner != outer =>
				return Err(Error::InvalidRequest {
					message: format!("fixture.match_id {inner} conflicts with match_id {outer}."),
				}),
			(Some(id), _) | (None, Some(id)) => id,
			(None, None) => return Ok(inline.clone()),
		};
		let stored = self.load_fixture(match_id).await?;

		if !same_team(&stored.home.name, &inline.home.name)
			|| !same_team(&stored.away.name, &inline.away.name)
		{
			return Err(Error::Validation {
				message: format!(
					"Fixture {} vs {} does not match stored match {match_id} ({} vs {}).",
					inline.home.name, inline.away.name, stored.home.name, stored.away.name
				),
			});
		}

		Ok(Fixture { match_id: Some(match_id), ..inline.clone() })
	}

	async fn load_fixture(&self, match_id: i64) -> Result<Fixture> {
		self.stores.matches.fixture(match_id).await?.ok_or_else(|| Error::NotFound {
			message: format!("Match {match_id} does not exist."),
		})
	}

	/// Returns the raw completion and the number of attempts it took.
	async fn generate_with_retry(&self, prompt: &str, match_id: Option<i64>) -> Result<(String, u32)> {
		let cfg = &self.cfg.providers.generation;
		let timeout = Duration::from_millis(cfg.timeout_ms);
		let max_attempts = 1 + self.cfg.prediction.transport_retries.min(1);
		let mut attempt = 0;

		loop {
			attempt += 1;

			let outcome =
				match tokio::time::timeout(timeout, self.providers.generation.generate(cfg, prompt))
					.await
				{
					Ok(result) => result.map_err(Error::from),
					Err(_) => Err(Error::Transport {
						message: format!("Generation timed out after {} ms.", cfg.timeout_ms),
					}),
				};

			match outcome {
				Ok(text) => return Ok((text, attempt)),
				Err(err) if err.is_retryable() && attempt < max_attempts => {
					tracing::warn!(match_id, attempt, error = %err, "Generation transport failed; retrying.");
				},
				Err(err) => {
					tracing::warn!(match_id, attempt, error = %err, "Generation failed.");

					return Err(err);
				},
			}
		}
	}
}
