//! CRUD handlers shared by every resource.

use axum::{extract::State, routing::get, Json, Router};
use hyper::StatusCode;

use crate::{
	error::{ApiError, ApiResult},
	extract::{Input, PathId},
	resource::Resource,
	store::Repo,
};

/// `GET|POST {path}` and `GET|PUT|DELETE {path}/:id`, state still unbound so
/// callers can add resource-specific routes.
pub fn routes<R: Resource>(path: &str) -> Router<Repo<R>> {
	Router::new()
		.route(path, get(list::<R>).post(create::<R>))
		.route(&format!("{}/:id", path), get(fetch::<R>).put(update::<R>).delete(remove::<R>))
}

pub async fn list<R: Resource>(State(repo): State<Repo<R>>) -> ApiResult<Json<Vec<R>>> {
	Ok(Json(repo.list().await?))
}

/// A parsed id wider than the 32-bit key can't name a row.
fn key<R: Resource>(id: i64) -> ApiResult<i32> {
	i32::try_from(id).map_err(|_| ApiError::not_found::<R>())
}

pub async fn fetch<R: Resource>(State(repo): State<Repo<R>>, PathId(id): PathId) -> ApiResult<Json<R>> {
	let id = key::<R>(id.ok_or_else(ApiError::invalid_id::<R>)?)?;
	let record = repo.get(id).await?.ok_or_else(ApiError::not_found::<R>)?;
	Ok(Json(record))
}

pub async fn create<R: Resource>(
	State(repo): State<Repo<R>>,
	Input(fields): Input<R::Fields>,
) -> ApiResult<(StatusCode, Json<R>)> {
	let id = repo.insert(&fields).await?;
	log::debug!("created {} {}", R::NAME, id);
	Ok((StatusCode::CREATED, Json(R::assemble(id, fields))))
}

/// Full replace; the response echoes the request rather than re-reading the row.
pub async fn update<R: Resource>(
	State(repo): State<Repo<R>>,
	PathId(id): PathId,
	Input(fields): Input<R::Fields>,
) -> ApiResult<Json<R>> {
	let id = key::<R>(id.ok_or_else(ApiError::invalid_input)?)?;
	if repo.update(id, &fields).await? == 0 {
		return Err(ApiError::not_found::<R>());
	}
	Ok(Json(R::assemble(id, fields)))
}

/// Responds with what is left in the table.
pub async fn remove<R: Resource>(State(repo): State<Repo<R>>, PathId(id): PathId) -> ApiResult<Json<Vec<R>>> {
	let id = key::<R>(id.ok_or_else(ApiError::invalid_id::<R>)?)?;
	if repo.delete(id).await? == 0 {
		return Err(ApiError::not_found::<R>());
	}
	log::debug!("deleted {} {}", R::NAME, id);
	Ok(Json(repo.list().await?))
}
