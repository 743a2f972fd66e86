use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

use crate::dto::message_dto::SendMessagePayload;
use crate::error::Result;
use crate::middleware::auth::{actor_id, Claims};
use crate::AppState;

#[axum::debug_handler]
pub async fn send_message(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<SendMessagePayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let actor = actor_id(&claims)?;
    let message = state
        .message_service
        .send(actor, payload, &state.notification_service)
        .await?;
    Ok((StatusCode::CREATED, Json(message)))
}

#[axum::debug_handler]
pub async fn conversation_overview(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse> {
    let actor = actor_id(&claims)?;
    let conversations = state.message_service.overview(actor).await?;
    Ok(Json(conversations))
}

/// Opening a thread marks the partner's messages read, like the chat
/// screen does.
#[axum::debug_handler]
pub async fn get_conversation(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(user_id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let actor = actor_id(&claims)?;
    let messages = state.message_service.conversation(actor, user_id).await?;
    let _ = state.message_service.mark_read_from(actor, user_id).await;
    Ok(Json(messages))
}

#[axum::debug_handler]
pub async fn unread_message_count(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse> {
    let actor = actor_id(&claims)?;
    let count = state.message_service.unread_count(actor).await?;
    Ok(Json(json!({ "unread_count": count })))
}
