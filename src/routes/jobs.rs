use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

use crate::dto::feed_dto::FeedQuery;
use crate::dto::job_dto::{CreateJobPayload, DeleteJobResponse, UpdateJobPayload};
use crate::error::Result;
use crate::middleware::auth::{actor_id, Claims};
use crate::services::feed_service;
use crate::AppState;

#[axum::debug_handler]
pub async fn create_job(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateJobPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let actor = actor_id(&claims)?;
    let job = state.job_service.create(actor, payload).await?;
    Ok((StatusCode::CREATED, Json(job)))
}

#[axum::debug_handler]
pub async fn list_my_jobs(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse> {
    let actor = actor_id(&claims)?;
    let jobs = state.job_service.list_owned(actor).await?;
    Ok(Json(jobs))
}

/// The feed the find-work screen renders: open jobs from other users,
/// distance-annotated from the requester's coordinates, filtered and
/// sorted by the query parameters.
#[axum::debug_handler]
pub async fn job_feed(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<FeedQuery>,
) -> Result<impl IntoResponse> {
    let actor = actor_id(&claims)?;
    let limit = crate::config::get_config().feed_page_limit;

    let rows = state.job_service.open_jobs_excluding(actor, limit).await?;
    let feed = feed_service::assemble(rows, query.origin(), &query.filter());

    Ok(Json(json!({
        "count": feed.len(),
        "jobs": feed,
    })))
}

#[axum::debug_handler]
pub async fn get_job(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let job = state.job_service.get_by_id(id).await?;
    Ok(Json(job))
}

#[axum::debug_handler]
pub async fn update_job(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateJobPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let actor = actor_id(&claims)?;
    let job = state.job_service.update(id, actor, payload).await?;
    Ok(Json(job))
}

#[axum::debug_handler]
pub async fn delete_job(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let actor = actor_id(&claims)?;
    state.job_service.delete(id, actor).await?;
    Ok(Json(DeleteJobResponse { deleted: true }))
}
