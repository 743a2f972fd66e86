use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use uuid::Uuid;

use crate::error::Result;
use crate::middleware::auth::{actor_id, Claims};
use crate::AppState;

#[axum::debug_handler]
pub async fn apply_to_job(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(job_id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let actor = actor_id(&claims)?;
    let application = state
        .application_service
        .apply(job_id, actor, &state.notification_service)
        .await?;
    Ok((StatusCode::CREATED, Json(application)))
}

#[axum::debug_handler]
pub async fn list_my_applications(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse> {
    let actor = actor_id(&claims)?;
    let applications = state.application_service.list_for_applicant(actor).await?;
    Ok(Json(applications))
}

#[axum::debug_handler]
pub async fn list_job_applications(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(job_id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let actor = actor_id(&claims)?;
    let applications = state.application_service.list_for_job(job_id, actor).await?;
    Ok(Json(applications))
}

#[axum::debug_handler]
pub async fn hire_applicant(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(application_id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let actor = actor_id(&claims)?;
    let outcome = state
        .application_service
        .hire(application_id, actor, &state.notification_service)
        .await?;
    Ok(Json(outcome))
}

#[axum::debug_handler]
pub async fn withdraw_application(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(application_id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let actor = actor_id(&claims)?;
    let application = state
        .application_service
        .withdraw(application_id, actor)
        .await?;
    Ok(Json(application))
}
