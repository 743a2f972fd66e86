use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Extension, Json,
};
use serde_json::json;
use uuid::Uuid;

use crate::dto::notification_dto::PollQuery;
use crate::error::Result;
use crate::middleware::auth::{actor_id, Claims};
use crate::AppState;

#[axum::debug_handler]
pub async fn poll_notifications(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<PollQuery>,
) -> Result<impl IntoResponse> {
    let actor = actor_id(&claims)?;
    let notifications = state
        .notification_service
        .poll_since(actor, query.since)
        .await?;
    let unread = state.notification_service.unread_count(actor).await?;

    Ok(Json(json!({
        "notifications": notifications,
        "unread": unread,
    })))
}

#[axum::debug_handler]
pub async fn mark_notification_read(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let actor = actor_id(&claims)?;
    let updated = state.notification_service.mark_read(id, actor).await?;
    Ok(Json(json!({ "updated": updated })))
}
