use agora_authz::{
    entities::{user, User},
    CurrentUser,
};
use agora_http::{ApiResult, AppError};
use agora_kernel::AppState;
use axum::{
    extract::{Path, State},
    Json,
};
use sea_orm::{
    sea_query::OnConflict, ActiveValue::Set, ColumnTrait, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, TransactionTrait,
};

use super::find_user;
use crate::modules::accounts::entities::{self as follows, Column, Entity as Follows};
use crate::modules::accounts::models::{FollowResponse, UnfollowResponse, UserSummary};
use crate::modules::notifications::{notify, Target, Verb};

pub(super) async fn follow(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(user_id): Path<i64>,
) -> ApiResult<Json<FollowResponse>> {
    let target = find_user(&state.db, user_id).await?;
    if target.id == user.id {
        return Err(AppError::bad_request("You cannot follow yourself"));
    }

    let txn = state.db.begin().await?;
    let inserted = Follows::insert(follows::ActiveModel {
        follower_id: Set(user.id),
        followee_id: Set(target.id),
        created_at: Set(chrono::Utc::now()),
    })
    .on_conflict(
        OnConflict::columns([Column::FollowerId, Column::FolloweeId])
            .do_nothing()
            .to_owned(),
    )
    .exec_without_returning(&txn)
    .await?;

    if inserted == 0 {
        txn.rollback().await?;
        return Err(AppError::bad_request("You are already following this user"));
    }

    notify(
        &txn,
        target.id,
        user.id,
        Verb::StartedFollowing,
        Some(Target::User(target.id)),
    )
    .await?;
    txn.commit().await?;

    tracing::info!(follower_id = user.id, followee_id = target.id, "user followed");
    Ok(Json(FollowResponse {
        message: format!("You are now following {}", target.username),
        following: target.username,
    }))
}

pub(super) async fn unfollow(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(user_id): Path<i64>,
) -> ApiResult<Json<UnfollowResponse>> {
    let target = find_user(&state.db, user_id).await?;
    if target.id == user.id {
        return Err(AppError::bad_request("You cannot unfollow yourself"));
    }

    let removed = Follows::delete_many()
        .filter(Column::FollowerId.eq(user.id))
        .filter(Column::FolloweeId.eq(target.id))
        .exec(&state.db)
        .await?;

    if removed.rows_affected == 0 {
        return Err(AppError::bad_request("You are not following this user"));
    }

    tracing::info!(follower_id = user.id, followee_id = target.id, "user unfollowed");
    Ok(Json(UnfollowResponse {
        message: format!("You have unfollowed {}", target.username),
        unfollowed: target.username,
    }))
}

/// Users following the caller.
pub(super) async fn followers(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Json<Vec<UserSummary>>> {
    let ids: Vec<i64> = Follows::find()
        .select_only()
        .column(Column::FollowerId)
        .filter(Column::FolloweeId.eq(user.id))
        .into_tuple()
        .all(&state.db)
        .await?;
    Ok(Json(summaries(&state, ids).await?))
}

/// Users the caller follows.
pub(super) async fn following(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Json<Vec<UserSummary>>> {
    let ids: Vec<i64> = Follows::find()
        .select_only()
        .column(Column::FolloweeId)
        .filter(Column::FollowerId.eq(user.id))
        .into_tuple()
        .all(&state.db)
        .await?;
    Ok(Json(summaries(&state, ids).await?))
}

async fn summaries(state: &AppState, ids: Vec<i64>) -> Result<Vec<UserSummary>, AppError> {
    let users = User::find()
        .filter(user::Column::Id.is_in(ids))
        .order_by_asc(user::Column::Username)
        .all(&state.db)
        .await?;
    Ok(users.into_iter().map(UserSummary::from).collect())
}
