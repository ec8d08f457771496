use std::{
	env, fs,
	path::PathBuf,
	sync::atomic::{AtomicU64, Ordering},
	time::{SystemTime, UNIX_EPOCH},
};

use toml::Value;

use augur_config::{Config, Error};

const SAMPLE_CONFIG_TEMPLATE_TOML: &str = include_str!("fixtures/sample_config.template.toml");

fn sample_toml_with(section: &[&str], key: &str, value: Value) -> String {
	let mut root: Value =
		toml::from_str(SAMPLE_CONFIG_TEMPLATE_TOML).expect("Failed to parse template config.");
	let mut table = root.as_table_mut().expect("Template config must be a table.");

	for name in section {
		table = table
			.get_mut(*name)
			.and_then(Value::as_table_mut)
			.unwrap_or_else(|| panic!("Template config must include [{name}]."));
	}

	table.insert(key.to_string(), value);

	toml::to_string(&root).expect("Failed to render template config.")
}

fn sample_toml_without(section: &str) -> String {
	let mut root: Value =
		toml::from_str(SAMPLE_CONFIG_TEMPLATE_TOML).expect("Failed to parse template config.");

	root.as_table_mut().expect("Template config must be a table.").remove(section);

	toml::to_string(&root).expect("Failed to render template config.")
}

fn write_temp_config(payload: String) -> PathBuf {
	static COUNTER: AtomicU64 = AtomicU64::new(0);

	let nanos = SystemTime::now()
		.duration_since(UNIX_EPOCH)
		.expect("System time must be valid.")
		.as_nanos();
	let ordinal = COUNTER.fetch_add(1, Ordering::SeqCst);
	let pid = std::process::id();
	let mut path = env::temp_dir();

	path.push(format!("augur_config_test_{nanos}_{pid}_{ordinal}.toml"));

	fs::write(&path, payload).expect("Failed to write test config.");

	path
}

fn load_payload(payload: String) -> augur_config::Result<Config> {
	let path = write_temp_config(payload);
	let result = augur_config::load(&path);

	fs::remove_file(&path).expect("Failed to remove test config.");

	result
}

fn base_config() -> Config {
	toml::from_str(SAMPLE_CONFIG_TEMPLATE_TOML).expect("Failed to parse test config.")
}

#[test]
fn generation_timeout_must_exceed_source_timeout() {
	let payload = sample_toml_with(&["providers", "generation"], "timeout_ms", Value::Integer(3_000));
	let err = load_payload(payload).expect_err("Expected generation timeout validation error.");

	assert!(
		err.to_string().contains(
			"providers.generation.timeout_ms must be greater than retrieval.source_timeout_ms."
		),
		"Unexpected error: {err}"
	);
}

#[test]
fn embedding_dimensions_must_match_vector_dim() {
	let payload =
		sample_toml_with(&["providers", "embedding"], "dimensions", Value::Integer(1_024));
	let err = load_payload(payload).expect_err("Expected dimension validation error.");

	assert!(
		err.to_string()
			.contains("providers.embedding.dimensions must match storage.qdrant.vector_dim."),
		"Unexpected error: {err}"
	);
}

#[test]
fn disabled_qdrant_skips_vector_checks() {
	let mut cfg = base_config();

	cfg.storage.qdrant.enabled = false;
	cfg.storage.qdrant.url = String::new();
	cfg.providers.embedding.dimensions = 0;

	augur_config::validate(&cfg).expect("Disabled vector index should not require Qdrant settings.");
}

#[test]
fn collections_must_differ() {
	let mut cfg = base_config();

	cfg.storage.qdrant.predictions_collection = cfg.storage.qdrant.match_history_collection.clone();

	let err = augur_config::validate(&cfg).expect_err("Expected collection validation error.");

	assert!(
		err.to_string().contains("storage.qdrant.match_history_collection must differ"),
		"Unexpected error: {err}"
	);
}

#[test]
fn transport_retries_are_capped_at_one() {
	let payload = sample_toml_with(&["prediction"], "transport_retries", Value::Integer(2));
	let err = load_payload(payload).expect_err("Expected retry validation error.");

	assert!(
		err.to_string().contains("prediction.transport_retries must be 0 or 1."),
		"Unexpected error: {err}"
	);
}

#[test]
fn temperature_must_be_in_range() {
	let mut cfg = base_config();

	cfg.providers.generation.temperature = 3.5;

	let err = augur_config::validate(&cfg).expect_err("Expected temperature validation error.");

	assert!(
		err.to_string().contains("providers.generation.temperature must be in the range 0.0-2.0."),
		"Unexpected error: {err}"
	);

	cfg.providers.generation.temperature = f32::NAN;

	let err = augur_config::validate(&cfg).expect_err("Expected temperature validation error.");

	assert!(
		err.to_string().contains("providers.generation.temperature must be a finite number."),
		"Unexpected error: {err}"
	);
}

#[test]
fn context_budget_must_be_positive() {
	let payload = sample_toml_with(&["retrieval"], "context_char_budget", Value::Integer(0));
	let err = load_payload(payload).expect_err("Expected budget validation error.");

	assert!(
		err.to_string().contains("retrieval.context_char_budget must be greater than zero."),
		"Unexpected error: {err}"
	);
}

#[test]
fn retrieval_and_prediction_sections_default_when_absent() {
	let payload = sample_toml_without("retrieval");
	let payload = {
		let mut root: Value = toml::from_str(&payload).expect("Failed to parse payload.");

		root.as_table_mut().expect("Payload must be a table.").remove("prediction");

		toml::to_string(&root).expect("Failed to render payload.")
	};
	let cfg = load_payload(payload).expect("Expected defaults to validate.");

	assert_eq!(cfg.retrieval.source_timeout_ms, 3_000);
	assert_eq!(cfg.retrieval.context_char_budget, 6_000);
	assert_eq!(cfg.retrieval.match_history_top_k, 5);
	assert_eq!(cfg.retrieval.similar_predictions_top_k, 3);
	assert!(cfg.prediction.feedback_enabled);
	assert_eq!(cfg.prediction.transport_retries, 1);
}

#[test]
fn api_base_trailing_slash_is_trimmed() {
	let payload = sample_toml_with(
		&["providers", "generation"],
		"api_base",
		Value::String("http://127.0.0.1:11434/v1/".to_string()),
	);
	let cfg = load_payload(payload).expect("Expected config to load.");

	assert_eq!(cfg.providers.generation.api_base, "http://127.0.0.1:11434/v1");
}

#[test]
fn missing_file_reports_read_error() {
	let mut path = env::temp_dir();

	path.push("augur_config_test_missing.toml");

	let err = augur_config::load(&path).expect_err("Expected read error.");

	assert!(matches!(err, Error::ReadConfig { .. }), "Unexpected error: {err}");
}

#[test]
fn augur_example_toml_is_valid() {
	let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));

	path.push("../../augur.example.toml");

	augur_config::load(&path).expect("Expected augur.example.toml to be a valid config.");
}
