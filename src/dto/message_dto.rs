use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SendMessagePayload {
    pub receiver_id: Uuid,
    #[validate(length(min = 1, max = 4000))]
    pub content: String,
}

/// One row per chat partner in the conversation overview, newest first.
#[derive(Debug, Clone, Serialize)]
pub struct ConversationSummary {
    pub partner_id: Uuid,
    pub partner_username: Option<String>,
    pub partner_full_name: Option<String>,
    pub partner_avatar_url: Option<String>,
    pub last_content: String,
    pub last_at: DateTime<Utc>,
    pub unread: bool,
}
