use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
	pub service: Service,
	pub storage: Storage,
	pub providers: Providers,
	#[serde(default)]
	pub retrieval: Retrieval,
	#[serde(default)]
	pub prediction: Prediction,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Service {
	pub http_bind: String,
	pub admin_bind: String,
	pub log_level: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Storage {
	pub postgres: Postgres,
	pub qdrant: Qdrant,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Postgres {
	pub dsn: String,
	pub pool_max_conns: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Qdrant {
	/// When false the service runs without a vector index and every similarity lookup reports
	/// the source as unavailable.
	#[serde(default = "default_true")]
	pub enabled: bool,
	pub url: String,
	#[serde(default = "default_match_history_collection")]
	pub match_history_collection: String,
	#[serde(default = "default_predictions_collection")]
	pub predictions_collection: String,
	pub vector_dim: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Providers {
	pub embedding: EmbeddingProviderConfig,
	pub generation: GenerationProviderConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmbeddingProviderConfig {
	pub provider_id: String,
	pub api_base: String,
	/// Empty for local servers that do not authenticate.
	#[serde(default)]
	pub api_key: String,
	pub path: String,
	pub model: String,
	pub dimensions: u32,
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GenerationProviderConfig {
	pub provider_id: String,
	pub api_base: String,
	#[serde(default)]
	pub api_key: String,
	pub path: String,
	pub model: String,
	pub temperature: f32,
	/// Must exceed `retrieval.source_timeout_ms`.
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Retrieval {
	#[serde(default = "default_source_timeout_ms")]
	pub source_timeout_ms: u64,
	#[serde(default = "default_context_char_budget")]
	pub context_char_budget: usize,
	#[serde(default = "default_match_history_top_k")]
	pub match_history_top_k: u32,
	#[serde(default = "default_similar_predictions_top_k")]
	pub similar_predictions_top_k: u32,
}
impl Default for Retrieval {
	fn default() -> Self {
		Self {
			source_timeout_ms: default_source_timeout_ms(),
			context_char_budget: default_context_char_budget(),
			match_history_top_k: default_match_history_top_k(),
			similar_predictions_top_k: default_similar_predictions_top_k(),
		}
	}
}

#[derive(Debug, Clone, Deserialize)]
pub struct Prediction {
	#[serde(default = "default_true")]
	pub feedback_enabled: bool,
	#[serde(default = "default_transport_retries")]
	pub transport_retries: u32,
}
impl Default for Prediction {
	fn default() -> Self {
		Self { feedback_enabled: true, transport_retries: default_transport_retries() }
	}
}

fn default_true() -> bool {
	true
}

fn default_match_history_collection() -> String {
	"match_history".to_string()
}

fn default_predictions_collection() -> String {
	"predictions".to_string()
}

fn default_source_timeout_ms() -> u64 {
	3_000
}

fn default_context_char_budget() -> usize {
	6_000
}

fn default_match_history_top_k() -> u32 {
	5
}

fn default_similar_predictions_top_k() -> u32 {
	3
}

fn default_transport_retries() -> u32 {
	1
}
