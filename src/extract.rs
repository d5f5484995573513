use std::convert::Infallible;

use axum::{
	async_trait,
	body::Bytes,
	extract::{FromRequest, FromRequestParts, Path, Request},
	http::{header::CONTENT_TYPE, request::Parts, HeaderMap},
};
use serde::de::DeserializeOwned;

use crate::{error::ApiError, resource::parse_id};

/// JSON body parsed into a typed schema. A body not sent as
/// `application/json` is treated as empty; it and any read, syntax,
/// missing-field or type error is a 400 "Invalid input".
pub struct Input<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for Input<T>
where
	S: Send + Sync,
	T: DeserializeOwned,
{
	type Rejection = ApiError;

	async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
		if !is_json(req.headers()) {
			log::debug!("request body is not application/json");
			return Err(ApiError::invalid_input());
		}
		let body = Bytes::from_request(req, state).await.map_err(|e| {
			log::debug!("unreadable request body: {}", e);
			ApiError::invalid_input()
		})?;
		let value = serde_json::from_slice(&body).map_err(|e| {
			log::debug!("invalid request body: {}", e);
			ApiError::invalid_input()
		})?;
		Ok(Input(value))
	}
}

fn is_json(headers: &HeaderMap) -> bool {
	headers
		.get(CONTENT_TYPE)
		.and_then(|value| value.to_str().ok())
		.and_then(|value| value.split(';').next())
		.map_or(false, |mime| mime.trim().eq_ignore_ascii_case("application/json"))
}

/// The `:id` path segment run through [`parse_id`]. `None` when the segment
/// has no leading digits or is not valid UTF-8; each handler picks its own
/// 400 message for that.
pub struct PathId(pub Option<i64>);

#[async_trait]
impl<S> FromRequestParts<S> for PathId
where
	S: Send + Sync,
{
	type Rejection = Infallible;

	async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
		match Path::<String>::from_request_parts(parts, state).await {
			Ok(Path(raw)) => Ok(PathId(parse_id(&raw))),
			Err(e) => {
				log::debug!("unreadable path id: {}", e);
				Ok(PathId(None))
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use axum::http::HeaderValue;

	fn headers(content_type: Option<&'static str>) -> HeaderMap {
		let mut headers = HeaderMap::new();
		if let Some(value) = content_type {
			headers.insert(CONTENT_TYPE, HeaderValue::from_static(value));
		}
		headers
	}

	#[test]
	fn json_content_type_may_carry_parameters() {
		assert!(is_json(&headers(Some("application/json"))));
		assert!(is_json(&headers(Some("application/json; charset=utf-8"))));
		assert!(is_json(&headers(Some("Application/JSON"))));
	}

	#[test]
	fn other_content_types_are_not_json() {
		assert!(!is_json(&headers(None)));
		assert!(!is_json(&headers(Some("text/plain"))));
		assert!(!is_json(&headers(Some("application/x-www-form-urlencoded"))));
	}
}
