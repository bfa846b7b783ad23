//! Fan-out of notifications from other modules.

use sea_orm::{ActiveModelTrait, ActiveValue::Set, ConnectionTrait, DbErr};

use super::entities::{self, Verb};

/// Object a notification refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    User(i64),
    Post(i64),
}

impl Target {
    fn parts(self) -> (&'static str, i64) {
        match self {
            Target::User(id) => ("user", id),
            Target::Post(id) => ("post", id),
        }
    }
}

/// Record that `actor_id` did `verb` to `recipient_id`.
///
/// Runs on the caller's connection so it commits or rolls back with the
/// action that triggered it. Acting on your own content notifies nobody.
pub async fn notify<C: ConnectionTrait>(
    conn: &C,
    recipient_id: i64,
    actor_id: i64,
    verb: Verb,
    target: Option<Target>,
) -> Result<Option<entities::Model>, DbErr> {
    if recipient_id == actor_id {
        tracing::debug!(user_id = actor_id, ?verb, "skipping self-notification");
        return Ok(None);
    }

    let (target_type, target_id) = match target.map(Target::parts) {
        Some((kind, id)) => (Some(kind.to_string()), Some(id)),
        None => (None, None),
    };

    let model = entities::ActiveModel {
        recipient_id: Set(recipient_id),
        actor_id: Set(actor_id),
        verb: Set(verb),
        target_type: Set(target_type),
        target_id: Set(target_id),
        read: Set(false),
        timestamp: Set(chrono::Utc::now()),
        ..Default::default()
    }
    .insert(conn)
    .await?;

    tracing::info!(
        notification_id = model.id,
        recipient_id,
        actor_id,
        verb = ?verb,
        "notification created"
    );
    Ok(Some(model))
}
