use agora_authz::{permission::is_author_or_read_only, CurrentUser};
use agora_http::{ApiJson, ApiResult, AppError, FieldErrors, Page, PageParams};
use agora_kernel::AppState;
use axum::{
    extract::{OriginalUri, Path, Query, State},
    http::{Method, StatusCode},
    Json,
};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait, EntityTrait,
    IntoActiveModel, ModelTrait, QueryFilter, QueryOrder, TransactionTrait,
};

use super::page_of;
use crate::modules::notifications::{notify, Target, Verb};
use crate::modules::posts::entities::{comment, Comment as Comments, Post as Posts};
use crate::modules::posts::models::{field_errors, Comment, CommentFilter, CommentInput};
use crate::modules::posts::present;

/// Oldest first, optionally narrowed to one post.
pub(super) async fn list_comments(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    Query(page): Query<PageParams>,
    Query(filter): Query<CommentFilter>,
) -> ApiResult<Json<Page<Comment>>> {
    let request = page.resolve(&state.settings.pagination)?;

    let mut select = Comments::find();
    if let Some(raw) = filter.post.filter(|p| !p.trim().is_empty()) {
        let post_id: i64 = raw.parse().map_err(|_| {
            AppError::invalid_field(
                "post",
                "Select a valid choice. That choice is not one of the available choices.",
            )
        })?;
        select = select.filter(comment::Column::PostId.eq(post_id));
    }
    let select = select
        .order_by_asc(comment::Column::CreatedAt)
        .order_by_asc(comment::Column::Id);

    let (rows, count) = page_of(&state.db, select, request).await?;
    let results = present::comments(&state.db, rows).await?;

    Ok(Json(Page::new(results, count, request, &uri)))
}

/// Comment on a post and notify its author.
pub(super) async fn create_comment(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiJson(body): ApiJson<CommentInput>,
) -> ApiResult<(StatusCode, Json<Comment>)> {
    check_comment(&state.db, &body, false).await?;
    let post_id = body.post.unwrap_or_default();
    let post = Posts::find_by_id(post_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::invalid_fields(missing_post(post_id)))?;

    let now = chrono::Utc::now();
    let txn = state.db.begin().await?;
    let comment = comment::ActiveModel {
        post_id: Set(post.id),
        author_id: Set(user.id),
        content: Set(body.content.unwrap_or_default()),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await?;
    notify(
        &txn,
        post.author_id,
        user.id,
        Verb::Commented,
        Some(Target::Post(post.id)),
    )
    .await?;
    txn.commit().await?;

    tracing::info!(comment_id = comment.id, post_id = post.id, author_id = user.id, "comment created");
    Ok((StatusCode::CREATED, Json(Comment::new(comment, user.username))))
}

pub(super) async fn get_comment(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Comment>> {
    let comment = find_comment(&state.db, id).await?;
    let mut built = present::comments(&state.db, vec![comment]).await?;
    built
        .pop()
        .map(Json)
        .ok_or_else(|| AppError::not_found("No Comment matches the given query."))
}

/// Author-only. PUT needs `post` and `content`; PATCH takes either.
pub(super) async fn update_comment(
    State(state): State<AppState>,
    method: Method,
    CurrentUser(user): CurrentUser,
    Path(id): Path<i64>,
    body: Result<ApiJson<CommentInput>, AppError>,
) -> ApiResult<Json<Comment>> {
    let comment = find_comment(&state.db, id).await?;
    is_author_or_read_only(&method, &user, comment.author_id)?;
    let ApiJson(body) = body?;
    check_comment(&state.db, &body, method == Method::PATCH).await?;

    let mut active = comment.into_active_model();
    if let Some(post_id) = body.post {
        active.post_id = Set(post_id);
    }
    if let Some(content) = body.content {
        active.content = Set(content);
    }
    active.updated_at = Set(chrono::Utc::now());
    let comment = active.update(&state.db).await?;

    Ok(Json(Comment::new(comment, user.username)))
}

pub(super) async fn delete_comment(
    State(state): State<AppState>,
    method: Method,
    CurrentUser(user): CurrentUser,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    let comment = find_comment(&state.db, id).await?;
    is_author_or_read_only(&method, &user, comment.author_id)?;
    comment.delete(&state.db).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn find_comment<C: ConnectionTrait>(conn: &C, id: i64) -> Result<comment::Model, AppError> {
    Comments::find_by_id(id)
        .one(conn)
        .await?
        .ok_or_else(|| AppError::not_found("No Comment matches the given query."))
}

async fn check_comment<C: ConnectionTrait>(
    conn: &C,
    body: &CommentInput,
    partial: bool,
) -> Result<(), AppError> {
    let mut errors = field_errors(
        body,
        &[
            ("post", body.post.is_some()),
            ("content", body.content.is_some()),
        ],
        partial,
    );

    if let Some(post_id) = body.post {
        if Posts::find_by_id(post_id).one(conn).await?.is_none() {
            errors.merge(missing_post(post_id));
        }
    }

    errors.into_result()
}

fn missing_post(post_id: i64) -> FieldErrors {
    FieldErrors::single(
        "post",
        format!("Invalid pk \"{post_id}\" - object does not exist."),
    )
}
