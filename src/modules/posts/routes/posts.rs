use agora_authz::{permission::is_author_or_read_only, CurrentUser, MaybeUser};
use agora_http::{ApiJson, ApiResult, AppError, Page, PageParams};
use agora_kernel::AppState;
use axum::{
    extract::{OriginalUri, Path, Query, State},
    http::{Method, StatusCode},
    Json,
};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, Condition, ConnectionTrait, EntityTrait,
    IntoActiveModel, ModelTrait, QueryFilter, QueryOrder,
};

use super::page_of;
use crate::modules::posts::entities::{post, Post as Posts};
use crate::modules::posts::models::{field_errors, Post, PostInput, PostSearch};
use crate::modules::posts::present;
use crate::utils::{icontains, search_terms};

/// Newest first; `search` terms must each appear in the title or content.
pub(super) async fn list_posts(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    MaybeUser(user): MaybeUser,
    Query(page): Query<PageParams>,
    Query(search): Query<PostSearch>,
) -> ApiResult<Json<Page<Post>>> {
    let request = page.resolve(&state.settings.pagination)?;

    let mut select = Posts::find();
    for term in search_terms(search.search.as_deref()) {
        select = select.filter(
            Condition::any()
                .add(icontains(post::Column::Title, &term))
                .add(icontains(post::Column::Content, &term)),
        );
    }
    let select = select
        .order_by_desc(post::Column::CreatedAt)
        .order_by_desc(post::Column::Id);

    let (rows, count) = page_of(&state.db, select, request).await?;
    let results = present::posts(&state.db, rows, user.map(|u| u.id)).await?;

    Ok(Json(Page::new(results, count, request, &uri)))
}

pub(super) async fn create_post(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiJson(body): ApiJson<PostInput>,
) -> ApiResult<(StatusCode, Json<Post>)> {
    check_post(&body, false)?;

    let now = chrono::Utc::now();
    let post = post::ActiveModel {
        author_id: Set(user.id),
        title: Set(body.title.unwrap_or_default()),
        content: Set(body.content.unwrap_or_default()),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&state.db)
    .await?;

    tracing::info!(post_id = post.id, author_id = user.id, "post created");
    let body = present::post(&state.db, post, Some(user.id)).await?;
    Ok((StatusCode::CREATED, Json(body)))
}

pub(super) async fn get_post(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
    Path(id): Path<i64>,
) -> ApiResult<Json<Post>> {
    let post = find_post(&state.db, id).await?;
    Ok(Json(
        present::post(&state.db, post, user.map(|u| u.id)).await?,
    ))
}

/// Author-only. PUT needs both fields; PATCH takes either.
pub(super) async fn update_post(
    State(state): State<AppState>,
    method: Method,
    CurrentUser(user): CurrentUser,
    Path(id): Path<i64>,
    body: Result<ApiJson<PostInput>, AppError>,
) -> ApiResult<Json<Post>> {
    let post = find_post(&state.db, id).await?;
    is_author_or_read_only(&method, &user, post.author_id)?;
    let ApiJson(body) = body?;
    check_post(&body, method == Method::PATCH)?;

    let mut active = post.into_active_model();
    if let Some(title) = body.title {
        active.title = Set(title);
    }
    if let Some(content) = body.content {
        active.content = Set(content);
    }
    active.updated_at = Set(chrono::Utc::now());
    let post = active.update(&state.db).await?;

    Ok(Json(present::post(&state.db, post, Some(user.id)).await?))
}

pub(super) async fn delete_post(
    State(state): State<AppState>,
    method: Method,
    CurrentUser(user): CurrentUser,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    let post = find_post(&state.db, id).await?;
    is_author_or_read_only(&method, &user, post.author_id)?;
    post.delete(&state.db).await?;

    tracing::info!(post_id = id, "post deleted");
    Ok(StatusCode::NO_CONTENT)
}

pub(super) async fn find_post<C: ConnectionTrait>(conn: &C, id: i64) -> Result<post::Model, AppError> {
    Posts::find_by_id(id)
        .one(conn)
        .await?
        .ok_or_else(|| AppError::not_found("No Post matches the given query."))
}

fn check_post(body: &PostInput, partial: bool) -> Result<(), AppError> {
    field_errors(
        body,
        &[
            ("title", body.title.is_some()),
            ("content", body.content.is_some()),
        ],
        partial,
    )
    .into_result()
}
