use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::dto::profile_dto::{CreateProfilePayload, UpdateProfilePayload};
use crate::error::Result;
use crate::middleware::auth::{actor_id, Claims};
use crate::AppState;

#[axum::debug_handler]
pub async fn create_profile(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateProfilePayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let actor = actor_id(&claims)?;
    let profile = state.profile_service.create(actor, payload).await?;
    Ok((StatusCode::CREATED, Json(profile)))
}

#[axum::debug_handler]
pub async fn get_profile(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let profile = state.profile_service.get_by_id(id).await?;
    Ok(Json(profile))
}

#[axum::debug_handler]
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateProfilePayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let actor = actor_id(&claims)?;
    let profile = state.profile_service.update_own(id, actor, payload).await?;
    Ok(Json(profile))
}
