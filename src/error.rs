use axum::{
	response::{IntoResponse, Response},
	Json,
};
use hyper::StatusCode;
use serde_json::json;
use thiserror::Error;

use crate::resource::Resource;

/// Failure at the store boundary. The message is surfaced verbatim to clients.
#[derive(Error, Debug)]
pub enum StoreError {
	#[error(transparent)]
	Pool(#[from] deadpool_postgres::PoolError),

	#[error(transparent)]
	Build(#[from] deadpool_postgres::BuildError),

	#[error(transparent)]
	Postgres(#[from] tokio_postgres::Error),

	#[error("{0}")]
	Unavailable(String),
}

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Error, Debug)]
pub enum ApiError {
	#[error("{0}")]
	BadRequest(String),

	#[error("{0}")]
	NotFound(String),

	#[error(transparent)]
	Store(#[from] StoreError),
}

impl ApiError {
	pub fn invalid_input() -> Self {
		Self::BadRequest("Invalid input".to_string())
	}

	pub fn invalid_id<R: Resource>() -> Self {
		Self::BadRequest(format!("Invalid {} ID", R::NAME.to_lowercase()))
	}

	pub fn not_found<R: Resource>() -> Self {
		Self::NotFound(format!("{} not found", R::NAME))
	}

	pub fn status(&self) -> StatusCode {
		match self {
			Self::BadRequest(_) => StatusCode::BAD_REQUEST,
			Self::NotFound(_) => StatusCode::NOT_FOUND,
			Self::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
		}
	}
}

impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		match &self {
			Self::Store(e) => log::error!("store error: {}", e),
			other => log::debug!("rejected request: {}", other),
		}
		let body = Json(json!({ "error": self.to_string() }));
		(self.status(), body).into_response()
	}
}
