use agora_authz::CurrentUser;
use agora_http::{ApiResult, AppError, Page, PageParams};
use agora_kernel::AppState;
use axum::{
    extract::{OriginalUri, Path, Query, State},
    http::StatusCode,
    Json,
};
use sea_orm::{
    sea_query::OnConflict, ActiveValue::Set, ColumnTrait, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, TransactionTrait,
};

use super::{page_of, posts::find_post};
use crate::modules::accounts::entities::{self as follows, Entity as Follows};
use crate::modules::notifications::{notify, Target, Verb};
use crate::modules::posts::entities::{like, post, Like as Likes, Post as Posts};
use crate::modules::posts::models::{Message, Post};
use crate::modules::posts::present;

/// Like a post once; the insert and the author's notification commit together.
pub(super) async fn like(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<i64>,
) -> ApiResult<(StatusCode, Json<Message>)> {
    let post = find_post(&state.db, id).await?;

    let txn = state.db.begin().await?;
    let inserted = Likes::insert(like::ActiveModel {
        user_id: Set(user.id),
        post_id: Set(post.id),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    })
    .on_conflict(
        OnConflict::columns([like::Column::UserId, like::Column::PostId])
            .do_nothing()
            .to_owned(),
    )
    .exec_without_returning(&txn)
    .await?;

    if inserted == 0 {
        txn.rollback().await?;
        return Err(AppError::bad_request("You have already liked this post"));
    }

    notify(
        &txn,
        post.author_id,
        user.id,
        Verb::Liked,
        Some(Target::Post(post.id)),
    )
    .await?;
    txn.commit().await?;

    tracing::info!(post_id = post.id, user_id = user.id, "post liked");
    Ok((
        StatusCode::CREATED,
        Json(Message {
            message: "Post liked",
        }),
    ))
}

pub(super) async fn unlike(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<i64>,
) -> ApiResult<Json<Message>> {
    let post = find_post(&state.db, id).await?;

    let removed = Likes::delete_many()
        .filter(like::Column::UserId.eq(user.id))
        .filter(like::Column::PostId.eq(post.id))
        .exec(&state.db)
        .await?;
    if removed.rows_affected == 0 {
        return Err(AppError::bad_request("You have not liked this post"));
    }

    tracing::info!(post_id = post.id, user_id = user.id, "post unliked");
    Ok(Json(Message {
        message: "Post unliked",
    }))
}

/// Posts by the users the caller follows, newest first.
pub(super) async fn feed(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    CurrentUser(user): CurrentUser,
    Query(page): Query<PageParams>,
) -> ApiResult<Json<Page<Post>>> {
    let request = page.resolve(&state.settings.pagination)?;

    let followed: Vec<i64> = Follows::find()
        .select_only()
        .column(follows::Column::FolloweeId)
        .filter(follows::Column::FollowerId.eq(user.id))
        .into_tuple()
        .all(&state.db)
        .await?;

    let select = Posts::find()
        .filter(post::Column::AuthorId.is_in(followed))
        .order_by_desc(post::Column::CreatedAt)
        .order_by_desc(post::Column::Id);

    let (rows, count) = page_of(&state.db, select, request).await?;
    let results = present::posts(&state.db, rows, Some(user.id)).await?;

    Ok(Json(Page::new(results, count, request, &uri)))
}
