use chrono::{DateTime, Utc};
use serde::Serialize;

use super::entities::{Model, Verb};

/// Notification as returned to its recipient.
#[derive(Debug, Clone, Serialize)]
pub struct Notification {
    pub id: i64,
    /// Actor's username
    pub actor: String,
    pub actor_id: i64,
    pub verb: Verb,
    pub target_type: Option<String>,
    pub target_id: Option<i64>,
    pub read: bool,
    pub timestamp: DateTime<Utc>,
}

impl Notification {
    pub fn from_model(model: Model, actor: String) -> Self {
        Self {
            id: model.id,
            actor,
            actor_id: model.actor_id,
            verb: model.verb,
            target_type: model.target_type,
            target_id: model.target_id,
            read: model.read,
            timestamp: model.timestamp,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct Message {
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct MarkedAll {
    pub message: &'static str,
    pub updated: u64,
}

#[derive(Debug, Serialize)]
pub struct UnreadCount {
    pub unread_count: u64,
}
