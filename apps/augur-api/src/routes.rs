use axum::{
	Json, Router,
	extract::{Path, Query, State, rejection::JsonRejection},
	http::StatusCode,
	response::{IntoResponse, Response},
	routing::{get, post},
};
use serde::{Deserialize, Serialize};

use augur_service::{
	AccuracyReport, Error, IndexHistoryRequest, IndexReport, PredictRequest, PredictionResponse,
	VectorStatus,
};

use crate::state::AppState;

const DEFAULT_LIST_LIMIT: u32 = 20;

pub fn router(state: AppState) -> Router {
	Router::new()
		.route("/health", get(health))
		.route("/v1/predictions", post(predict))
		.route("/v1/predictions/accuracy", get(accuracy))
		.route("/v1/matches/{match_id}/predictions", get(match_predictions))
		.route("/v1/vector/status", get(vector_status))
		.with_state(state)
}

pub fn admin_router(state: AppState) -> Router {
	Router::new().route("/v1/admin/index_history", post(index_history)).with_state(state)
}

#[derive(Debug, Deserialize)]
struct ListQuery {
	limit: Option<u32>,
}

async fn health() -> StatusCode {
	StatusCode::OK
}

async fn predict(
	State(state): State<AppState>,
	payload: Result<Json<PredictRequest>, JsonRejection>,
) -> Result<Json<PredictionResponse>, ApiError> {
	let Json(payload) = payload?;
	let response = state.service.predict(payload).await?;

	Ok(Json(response))
}

async fn accuracy(State(state): State<AppState>) -> Result<Json<AccuracyReport>, ApiError> {
	let response = state.service.accuracy().await?;

	Ok(Json(response))
}

async fn match_predictions(
	State(state): State<AppState>,
	Path(match_id): Path<i64>,
	Query(query): Query<ListQuery>,
) -> Result<Json<Vec<PredictionResponse>>, ApiError> {
	let limit = query.limit.unwrap_or(DEFAULT_LIST_LIMIT);
	let response = state.service.predictions_for_match(match_id, limit).await?;

	Ok(Json(response))
}

async fn vector_status(State(state): State<AppState>) -> Result<Json<VectorStatus>, ApiError> {
	let response = state.service.vector_status().await?;

	Ok(Json(response))
}

async fn index_history(
	State(state): State<AppState>,
	payload: Result<Json<IndexHistoryRequest>, JsonRejection>,
) -> Result<Json<IndexReport>, ApiError> {
	let Json(payload) = payload?;
	let response = state.service.index_history(payload).await?;

	Ok(Json(response))
}

#[derive(Debug, Serialize)]
struct ErrorBody {
	error_code: String,
	message: String,
	retryable: bool,
}

#[derive(Debug)]
pub struct ApiError {
	status: StatusCode,
	error_code: String,
	message: String,
	retryable: bool,
}
impl ApiError {
	fn new(status: StatusCode, error_code: impl Into<String>, message: impl Into<String>) -> Self {
		Self { status, error_code: error_code.into(), message: message.into(), retryable: false }
	}

	fn retryable(mut self) -> Self {
		self.retryable = true;

		self
	}
}

impl From<Error> for ApiError {
	fn from(err: Error) -> Self {
		match err {
			Error::Validation { .. } =>
				ApiError::new(StatusCode::UNPROCESSABLE_ENTITY, "invalid_fixture", err.to_string()),
			Error::InvalidRequest { .. } =>
				ApiError::new(StatusCode::BAD_REQUEST, "invalid_request", err.to_string()),
			Error::NotFound { .. } =>
				ApiError::new(StatusCode::NOT_FOUND, "not_found", err.to_string()),
			Error::Transport { .. } =>
				ApiError::new(StatusCode::SERVICE_UNAVAILABLE, "upstream_unavailable", err.to_string())
					.retryable(),
			Error::Generation { .. } =>
				ApiError::new(StatusCode::BAD_GATEWAY, "upstream_model_failed", err.to_string()),
			Error::Provider { .. } =>
				ApiError::new(StatusCode::BAD_GATEWAY, "provider_error", err.to_string()),
			Error::VectorDisabled =>
				ApiError::new(StatusCode::SERVICE_UNAVAILABLE, "vector_disabled", err.to_string()),
			Error::Storage { .. } | Error::Qdrant { .. } => {
				tracing::error!(error = %err, "Request failed on storage.");

				ApiError::new(
					StatusCode::INTERNAL_SERVER_ERROR,
					"storage_error",
					"Internal storage error.",
				)
			},
		}
	}
}

impl From<JsonRejection> for ApiError {
	fn from(rejection: JsonRejection) -> Self {
		ApiError::new(StatusCode::BAD_REQUEST, "invalid_request", rejection.body_text())
	}
}

impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		let body =
			ErrorBody { error_code: self.error_code, message: self.message, retryable: self.retryable };

		(self.status, Json(body)).into_response()
	}
}
