use crate::dto::notification_dto::NotificationPayload;
use crate::error::{Error, Result};
use crate::models::notification::Notification;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

/// An inbound domain event as the realtime layer delivers it. Events
/// may arrive out of order relative to the fetches that produced them;
/// routing is per-event and stateless, so order does not matter here.
#[derive(Debug, Clone)]
pub enum DomainEvent {
    MessageReceived {
        sender_id: Uuid,
        receiver_id: Uuid,
        sender_name: Option<String>,
        content: String,
    },
    ApplicationReceived {
        owner_id: Uuid,
        applicant_name: Option<String>,
        job_id: Uuid,
        job_title: String,
    },
    ApplicationAccepted {
        applicant_id: Uuid,
        job_id: Uuid,
        job_title: String,
    },
}

impl DomainEvent {
    pub fn event_type(&self) -> &'static str {
        match self {
            DomainEvent::MessageReceived { .. } => "message",
            DomainEvent::ApplicationReceived { .. } => "application",
            DomainEvent::ApplicationAccepted { .. } => "hire",
        }
    }
}

/// Map an event to the payload shown to `viewer_id`. Events whose
/// intended recipient is someone else yield `Ok(None)`: subscriptions
/// are expected to be filtered upstream, but recipient identity is
/// re-checked here. A message whose sender equals its receiver is
/// invalid input.
pub fn route_event(event: &DomainEvent, viewer_id: Uuid) -> Result<Option<NotificationPayload>> {
    match event {
        DomainEvent::MessageReceived {
            sender_id,
            receiver_id,
            sender_name,
            content,
        } => {
            if sender_id == receiver_id {
                return Err(Error::BadRequest(
                    "A message cannot have the same sender and receiver".to_string(),
                ));
            }
            if *receiver_id != viewer_id {
                return Ok(None);
            }
            Ok(Some(NotificationPayload {
                headline: sender_name
                    .clone()
                    .unwrap_or_else(|| "New Message".to_string()),
                body: content.clone(),
                target_route: format!("/chat/{}", sender_id),
            }))
        }
        DomainEvent::ApplicationReceived {
            owner_id,
            applicant_name,
            job_id,
            job_title,
        } => {
            if *owner_id != viewer_id {
                return Ok(None);
            }
            Ok(Some(NotificationPayload {
                headline: "New applicant".to_string(),
                body: format!(
                    "{} applied to \"{}\"",
                    applicant_name.as_deref().unwrap_or("Someone"),
                    job_title
                ),
                target_route: format!("/job/{}", job_id),
            }))
        }
        DomainEvent::ApplicationAccepted {
            applicant_id,
            job_title,
            ..
        } => {
            if *applicant_id != viewer_id {
                return Ok(None);
            }
            Ok(Some(NotificationPayload {
                headline: "You're hired!".to_string(),
                body: format!("You got the job \"{}\"", job_title),
                target_route: "/my-applications".to_string(),
            }))
        }
    }
}

#[derive(Clone)]
pub struct NotificationService {
    pool: PgPool,
}

impl NotificationService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Route the event for its recipient and persist the payload into
    /// the outbox the poll endpoint drains. Returns `None` when the
    /// router filtered the event out.
    pub async fn record(
        &self,
        recipient_id: Uuid,
        event: &DomainEvent,
    ) -> Result<Option<Notification>> {
        let Some(payload) = route_event(event, recipient_id)? else {
            return Ok(None);
        };

        let row = sqlx::query_as::<_, Notification>(
            r#"
            INSERT INTO notifications (recipient_id, event_type, headline, body, target_route)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(recipient_id)
        .bind(event.event_type())
        .bind(&payload.headline)
        .bind(&payload.body)
        .bind(&payload.target_route)
        .fetch_one(&self.pool)
        .await?;

        Ok(Some(row))
    }

    pub async fn poll_since(
        &self,
        recipient_id: Uuid,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<Notification>> {
        let rows = sqlx::query_as::<_, Notification>(
            r#"
            SELECT * FROM notifications
            WHERE recipient_id = $1
              AND ($2::timestamptz IS NULL OR created_at > $2)
            ORDER BY created_at DESC
            LIMIT 100
            "#,
        )
        .bind(recipient_id)
        .bind(since)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    pub async fn unread_count(&self, recipient_id: Uuid) -> Result<i64> {
        let count: (i64,) = sqlx::query_as(
            r#"SELECT COUNT(*) FROM notifications WHERE recipient_id = $1 AND read_at IS NULL"#,
        )
        .bind(recipient_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count.0)
    }

    /// Only the recipient may mark their notification read.
    pub async fn mark_read(&self, id: Uuid, recipient_id: Uuid) -> Result<u64> {
        let result = sqlx::query(
            r#"
            UPDATE notifications
            SET read_at = NOW()
            WHERE id = $1 AND recipient_id = $2 AND read_at IS NULL
            "#,
        )
        .bind(id)
        .bind(recipient_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(n: u128) -> Uuid {
        Uuid::from_u128(n)
    }

    #[test]
    fn message_routes_to_chat_with_sender() {
        let event = DomainEvent::MessageReceived {
            sender_id: user(1),
            receiver_id: user(2),
            sender_name: Some("asha".to_string()),
            content: "Are you free Saturday?".to_string(),
        };
        let payload = route_event(&event, user(2)).unwrap().unwrap();
        assert_eq!(payload.headline, "asha");
        assert_eq!(payload.body, "Are you free Saturday?");
        assert_eq!(payload.target_route, format!("/chat/{}", user(1)));
    }

    #[test]
    fn message_for_someone_else_is_filtered_out() {
        let event = DomainEvent::MessageReceived {
            sender_id: user(1),
            receiver_id: user(2),
            sender_name: None,
            content: "hi".to_string(),
        };
        assert_eq!(route_event(&event, user(3)).unwrap(), None);
        // The sender viewing their own outbound message gets nothing either.
        assert_eq!(route_event(&event, user(1)).unwrap(), None);
    }

    #[test]
    fn self_addressed_message_is_rejected() {
        let event = DomainEvent::MessageReceived {
            sender_id: user(1),
            receiver_id: user(1),
            sender_name: None,
            content: "echo".to_string(),
        };
        assert!(route_event(&event, user(1)).is_err());
        // Invalid regardless of who is viewing.
        assert!(route_event(&event, user(2)).is_err());
    }

    #[test]
    fn hire_event_routes_to_applications_overview() {
        let event = DomainEvent::ApplicationAccepted {
            applicant_id: user(5),
            job_id: user(9),
            job_title: "Catering staff".to_string(),
        };
        let payload = route_event(&event, user(5)).unwrap().unwrap();
        assert_eq!(payload.target_route, "/my-applications");
        assert!(payload.body.contains("Catering staff"));

        assert_eq!(route_event(&event, user(6)).unwrap(), None);
    }

    #[test]
    fn application_event_routes_owner_to_the_job_page() {
        let event = DomainEvent::ApplicationReceived {
            owner_id: user(1),
            applicant_name: Some("ravi".to_string()),
            job_id: user(9),
            job_title: "Move boxes".to_string(),
        };
        let payload = route_event(&event, user(1)).unwrap().unwrap();
        assert_eq!(payload.target_route, format!("/job/{}", user(9)));
        assert!(payload.body.starts_with("ravi"));

        assert_eq!(route_event(&event, user(2)).unwrap(), None);
    }

    #[test]
    fn missing_sender_name_falls_back_to_generic_headline() {
        let event = DomainEvent::MessageReceived {
            sender_id: user(1),
            receiver_id: user(2),
            sender_name: None,
            content: "hello".to_string(),
        };
        let payload = route_event(&event, user(2)).unwrap().unwrap();
        assert_eq!(payload.headline, "New Message");
    }
}
