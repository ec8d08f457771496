//! Single-shot text generation against an OpenAI-compatible chat completions endpoint.
//!
//! No retries happen here. Callers decide whether a [`Error::Transport`] is worth repeating.

use std::time::Duration;

use reqwest::Client;
use serde_json::Value;

use crate::{Error, Result};

pub async fn generate(
	cfg: &augur_config::GenerationProviderConfig,
	prompt: &str,
	model: &str,
) -> Result<String> {
	let client = Client::builder().timeout(Duration::from_millis(cfg.timeout_ms)).build()?;
	let url = format!("{}{}", cfg.api_base, cfg.path);
	let body = serde_json::json!({
		"model": model,
		"temperature": cfg.temperature,
		"stream": false,
		"messages": [
			{ "role": "user", "content": prompt }
		],
	});
	let res = client
		.post(url)
		.headers(crate::auth_headers(&cfg.api_key, &cfg.default_headers)?)
		.json(&body)
		.send()
		.await?;
	let status = res.status();

	if !status.is_success() {
		let text = res.text().await.unwrap_or_default();

		return Err(Error::Transport {
			message: format!("Generation service returned {status}: {}", crate::snippet(&text)),
		});
	}

	let json: Value = res.json().await.map_err(|err| Error::Generation {
		message: format!("Generation response is not valid JSON: {err}"),
	})?;

	parse_generation_response(json)
}

fn parse_generation_response(json: Value) -> Result<String> {
	if let Some(error) = json.get("error").filter(|error| !error.is_null()) {
		let message = error
			.get("message")
			.and_then(|m| m.as_str())
			.or_else(|| error.as_str())
			.map(str::to_string)
			.unwrap_or_else(|| error.to_string());

		return Err(Error::Generation { message });
	}

	let content = json
		.get("choices")
		.and_then(|v| v.as_array())
		.and_then(|arr| arr.first())
		.and_then(|choice| choice.get("message"))
		.and_then(|msg| msg.get("content"))
		.and_then(|c| c.as_str())
		// Ollama's native generate endpoint.
		.or_else(|| json.get("response").and_then(|r| r.as_str()));

	match content {
		Some(text) if !text.trim().is_empty() => Ok(text.to_string()),
		Some(_) => Err(Error::Generation {
			message: "Generation response content is empty.".to_string(),
		}),
		None => Err(Error::Generation {
			message: "Generation response is missing message content.".to_string(),
		}),
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn reads_choice_content() {
		let json = serde_json::json!({
			"choices": [
				{ "message": { "role": "assistant", "content": "HOME_WIN: 40" } }
			]
		});

		assert_eq!(parse_generation_response(json).expect("parse failed"), "HOME_WIN: 40");
	}

	#[test]
	fn reads_native_ollama_response() {
		let json = serde_json::json!({ "model": "llama3.2", "response": "DRAW: 30", "done": true });

		assert_eq!(parse_generation_response(json).expect("parse failed"), "DRAW: 30");
	}

	#[test]
	fn reported_error_is_a_generation_error() {
		let json = serde_json::json!({ "error": { "message": "model not found" } });
		let err = parse_generation_response(json).expect_err("expected generation error");

		assert!(matches!(err, Error::Generation { ref message } if message == "model not found"));
		assert!(!err.is_transport());
	}

	#[test]
	fn empty_content_is_a_generation_error() {
		let json = serde_json::json!({ "choices": [{ "message": { "content": "  " } }] });

		assert!(matches!(parse_generation_response(json), Err(Error::Generation { .. })));
	}
}
