//! Notification inbox routes.

use std::collections::HashMap;

use agora_authz::{entities::User, CurrentUser};
use agora_http::{ApiResult, AppError};
use agora_kernel::AppState;
use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use sea_orm::{
    sea_query::Expr, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
};

use super::entities::{Column, Entity as Notifications};
use super::models::{MarkedAll, Message, Notification, UnreadCount};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_notifications))
        .route("/{id}/read", post(mark_read))
        .route("/read-all", post(mark_all_read))
        .route("/unread-count", get(unread_count))
}

/// The caller's notifications, newest first.
async fn list_notifications(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Json<Vec<Notification>>> {
    let rows = Notifications::find()
        .filter(Column::RecipientId.eq(user.id))
        .order_by_desc(Column::Timestamp)
        .order_by_desc(Column::Id)
        .all(&state.db)
        .await?;

    let actor_ids: Vec<i64> = rows.iter().map(|n| n.actor_id).collect();
    let actors: HashMap<i64, String> = User::find()
        .filter(agora_authz::entities::user::Column::Id.is_in(actor_ids))
        .all(&state.db)
        .await?
        .into_iter()
        .map(|u| (u.id, u.username))
        .collect();

    let notifications = rows
        .into_iter()
        .map(|n| {
            let actor = actors.get(&n.actor_id).cloned().unwrap_or_default();
            Notification::from_model(n, actor)
        })
        .collect();

    Ok(Json(notifications))
}

async fn mark_read(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<i64>,
) -> ApiResult<Json<Message>> {
    let result = Notifications::update_many()
        .col_expr(Column::Read, Expr::value(true))
        .filter(Column::Id.eq(id))
        .filter(Column::RecipientId.eq(user.id))
        .exec(&state.db)
        .await?;

    if result.rows_affected == 0 {
        return Err(AppError::not_found("Notification not found"));
    }

    Ok(Json(Message {
        message: "Notification marked as read",
    }))
}

async fn mark_all_read(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Json<MarkedAll>> {
    let result = Notifications::update_many()
        .col_expr(Column::Read, Expr::value(true))
        .filter(Column::RecipientId.eq(user.id))
        .filter(Column::Read.eq(false))
        .exec(&state.db)
        .await?;

    tracing::debug!(user_id = user.id, updated = result.rows_affected, "notifications marked read");

    Ok(Json(MarkedAll {
        message: "All notifications marked as read",
        updated: result.rows_affected,
    }))
}

async fn unread_count(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Json<UnreadCount>> {
    let unread_count = Notifications::find()
        .filter(Column::RecipientId.eq(user.id))
        .filter(Column::Read.eq(false))
        .count(&state.db)
        .await?;

    Ok(Json(UnreadCount { unread_count }))
}
