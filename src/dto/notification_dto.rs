use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What a client renders for one inbound event: a toast headline/body
/// and the route to open when tapped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationPayload {
    pub headline: String,
    pub body: String,
    pub target_route: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PollQuery {
    pub since: Option<DateTime<Utc>>,
}
