use crate::dto::message_dto::{ConversationSummary, SendMessagePayload};
use crate::error::{Error, Result};
use crate::models::message::Message;
use crate::services::notification_service::{DomainEvent, NotificationService};
use sqlx::PgPool;
use std::collections::HashMap;
use uuid::Uuid;

#[derive(Clone)]
pub struct MessageService {
    pool: PgPool,
}

impl MessageService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn send(
        &self,
        sender_id: Uuid,
        payload: SendMessagePayload,
        notifications: &NotificationService,
    ) -> Result<Message> {
        if sender_id == payload.receiver_id {
            return Err(Error::BadRequest(
                "A message cannot have the same sender and receiver".to_string(),
            ));
        }

        let message = sqlx::query_as::<_, Message>(
            r#"
            INSERT INTO messages (sender_id, receiver_id, content)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(sender_id)
        .bind(payload.receiver_id)
        .bind(&payload.content)
        .fetch_one(&self.pool)
        .await?;

        let sender_name =
            sqlx::query_scalar::<_, String>(r#"SELECT username FROM profiles WHERE id = $1"#)
                .bind(sender_id)
                .fetch_optional(&self.pool)
                .await
                .ok()
                .flatten();

        let event = DomainEvent::MessageReceived {
            sender_id,
            receiver_id: payload.receiver_id,
            sender_name,
            content: payload.content.clone(),
        };
        if let Err(e) = notifications.record(payload.receiver_id, &event).await {
            tracing::warn!(message_id = %message.id, error = ?e, "Failed to record message notification");
        }

        Ok(message)
    }

    /// Full thread between two users, oldest first.
    pub async fn conversation(&self, me: Uuid, partner_id: Uuid) -> Result<Vec<Message>> {
        let messages = sqlx::query_as::<_, Message>(
            r#"
            SELECT * FROM messages
            WHERE (sender_id = $1 AND receiver_id = $2)
               OR (sender_id = $2 AND receiver_id = $1)
            ORDER BY created_at ASC
            "#,
        )
        .bind(me)
        .bind(partner_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(messages)
    }

    /// Flip the read flag on everything the partner sent me. Only the
    /// receiver side is touched; a sender cannot mark their own
    /// messages read for the other party.
    pub async fn mark_read_from(&self, me: Uuid, partner_id: Uuid) -> Result<u64> {
        let result = sqlx::query(
            r#"
            UPDATE messages
            SET is_read = TRUE
            WHERE receiver_id = $1 AND sender_id = $2 AND NOT is_read
            "#,
        )
        .bind(me)
        .bind(partner_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    pub async fn unread_count(&self, me: Uuid) -> Result<i64> {
        let count: (i64,) = sqlx::query_as(
            r#"SELECT COUNT(*) FROM messages WHERE receiver_id = $1 AND NOT is_read"#,
        )
        .bind(me)
        .fetch_one(&self.pool)
        .await?;

        Ok(count.0)
    }

    /// One row per chat partner with the latest message and an unread
    /// marker, newest conversation first.
    pub async fn overview(&self, me: Uuid) -> Result<Vec<ConversationSummary>> {
        let messages = sqlx::query_as::<_, Message>(
            r#"
            SELECT * FROM messages
            WHERE sender_id = $1 OR receiver_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(me)
        .fetch_all(&self.pool)
        .await?;

        let mut summaries: Vec<ConversationSummary> = Vec::new();
        let mut seen: HashMap<Uuid, usize> = HashMap::new();

        for msg in messages {
            let mine = msg.sender_id == me;
            let partner_id = if mine { msg.receiver_id } else { msg.sender_id };

            if let Some(&idx) = seen.get(&partner_id) {
                // Newest message already captured; only accumulate unread.
                if !mine && !msg.is_read {
                    summaries[idx].unread = true;
                }
                continue;
            }

            seen.insert(partner_id, summaries.len());
            summaries.push(ConversationSummary {
                partner_id,
                partner_username: None,
                partner_full_name: None,
                partner_avatar_url: None,
                last_content: msg.content,
                last_at: msg.created_at,
                unread: !mine && !msg.is_read,
            });
        }

        if summaries.is_empty() {
            return Ok(summaries);
        }

        let partner_ids: Vec<Uuid> = summaries.iter().map(|s| s.partner_id).collect();
        let profiles: Vec<(Uuid, String, Option<String>, Option<String>)> = sqlx::query_as(
            r#"SELECT id, username, full_name, avatar_url FROM profiles WHERE id = ANY($1)"#,
        )
        .bind(&partner_ids)
        .fetch_all(&self.pool)
        .await?;

        let by_id: HashMap<Uuid, (String, Option<String>, Option<String>)> = profiles
            .into_iter()
            .map(|(id, username, full_name, avatar_url)| (id, (username, full_name, avatar_url)))
            .collect();

        for summary in &mut summaries {
            if let Some((username, full_name, avatar_url)) = by_id.get(&summary.partner_id) {
                summary.partner_username = Some(username.clone());
                summary.partner_full_name = full_name.clone();
                summary.partner_avatar_url = avatar_url.clone();
            }
        }

        Ok(summaries)
    }
}
