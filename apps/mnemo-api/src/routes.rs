use axum::{
	Json, Router,
	extract::State,
	http::StatusCode,
	response::{IntoResponse, Response},
	routing::{get, post},
};
use serde::Serialize;

use mnemo_service::{
	AggregateLookupRequest, AggregateLookupResponse, LearnRequest, LearnResponse, LookupRequest,
	LookupResponse, RetrieveRequest, RetrieveResponse, ServiceError,
};

use crate::state::AppState;

pub fn router(state: AppState) -> Router {
	Router::new()
		.route("/health", get(health))
		.route("/v1/lookup", post(lookup))
		.route("/v1/lookup/aggregate", post(lookup_aggregate))
		.route("/v1/memory/retrieve", post(memory_retrieve))
		.route("/v1/memory/learn", post(memory_learn))
		.with_state(state)
}

async fn health() -> StatusCode {
	StatusCode::OK
}

async fn lookup(
	State(state): State<AppState>,
	Json(payload): Json<LookupRequest>,
) -> Result<Json<LookupResponse>, ApiError> {
	let response = state.service.lookup(payload).await?;

	Ok(Json(response))
}

async fn lookup_aggregate(
	State(state): State<AppState>,
	Json(payload): Json<AggregateLookupRequest>,
) -> Result<Json<AggregateLookupResponse>, ApiError> {
	let response = state.service.lookup_aggregate(payload).await?;

	Ok(Json(response))
}

async fn memory_retrieve(
	State(state): State<AppState>,
	Json(payload): Json<RetrieveRequest>,
) -> Result<Json<RetrieveResponse>, ApiError> {
	let response = state.service.memory_retrieve(payload).await?;

	Ok(Json(response))
}

async fn memory_learn(
	State(state): State<AppState>,
	Json(payload): Json<LearnRequest>,
) -> Result<Json<LearnResponse>, ApiError> {
	let response = state.service.memory_learn(payload).await?;

	Ok(Json(response))
}

#[derive(Debug, Serialize)]
struct ErrorBody {
	error_code: String,
	message: String,
}

#[derive(Debug)]
pub struct ApiError {
	status: StatusCode,
	error_code: String,
	message: String,
}
impl ApiError {
	fn new(status: StatusCode, error_code: impl Into<String>, message: impl Into<String>) -> Self {
		Self { status, error_code: error_code.into(), message: message.into() }
	}
}
impl From<ServiceError> for ApiError {
	fn from(err: ServiceError) -> Self {
		match err {
			ServiceError::InvalidRequest { message } =>
				Self::new(StatusCode::UNPROCESSABLE_ENTITY, "invalid_request", message),
			ServiceError::Backend { message } =>
				Self::new(StatusCode::BAD_GATEWAY, "backend_error", message),
			ServiceError::Provider { message } =>
				Self::new(StatusCode::BAD_GATEWAY, "provider_error", message),
		}
	}
}
impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		let body = ErrorBody { error_code: self.error_code, message: self.message };

		(self.status, Json(body)).into_response()
	}
}
