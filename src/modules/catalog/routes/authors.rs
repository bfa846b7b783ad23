use agora_authz::{MaybeUser, Permission};
use agora_http::{ApiJson, ApiResult, AppError};
use agora_kernel::AppState;
use axum::{
    extract::{Path, State},
    http::{Method, StatusCode},
    Json,
};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ConnectionTrait, EntityTrait, IntoActiveModel,
    ModelTrait,
};

use crate::modules::catalog::entities::{author, Author as Authors, Book};
use crate::modules::catalog::models::{Author, NameInput};

pub(super) async fn list_authors(State(state): State<AppState>) -> ApiResult<Json<Vec<Author>>> {
    let rows = Authors::find()
        .find_with_related(Book)
        .all(&state.db)
        .await?;

    let mut authors: Vec<Author> = rows
        .into_iter()
        .map(|(author, books)| Author::new(author, books))
        .collect();
    authors.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));

    Ok(Json(authors))
}

pub(super) async fn create_author(
    State(state): State<AppState>,
    method: Method,
    MaybeUser(user): MaybeUser,
    body: Result<ApiJson<NameInput>, AppError>,
) -> ApiResult<(StatusCode, Json<Author>)> {
    Permission::IsAuthenticatedOrReadOnly.check(&method, user.as_ref())?;
    let ApiJson(body) = body?;
    let name = body.into_name().map_err(AppError::invalid_fields)?;

    let author = author::ActiveModel {
        name: Set(name),
        ..Default::default()
    }
    .insert(&state.db)
    .await?;

    tracing::info!(author_id = author.id, "author created");
    Ok((StatusCode::CREATED, Json(Author::new(author, Vec::new()))))
}

pub(super) async fn get_author(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Author>> {
    let author = find_author(&state.db, id).await?;
    Ok(Json(with_books(&state.db, author).await?))
}

/// PUT and PATCH both take the single `name` field.
pub(super) async fn update_author(
    State(state): State<AppState>,
    method: Method,
    MaybeUser(user): MaybeUser,
    Path(id): Path<i64>,
    body: Result<ApiJson<NameInput>, AppError>,
) -> ApiResult<Json<Author>> {
    Permission::IsAuthenticatedOrReadOnly.check(&method, user.as_ref())?;
    let author = find_author(&state.db, id).await?;
    let ApiJson(body) = body?;

    let author = if method == Method::PATCH && body.name.is_none() {
        author
    } else {
        let name = body.into_name().map_err(AppError::invalid_fields)?;
        let mut active = author.into_active_model();
        active.name = Set(name);
        active.update(&state.db).await?
    };

    Ok(Json(with_books(&state.db, author).await?))
}

/// Deleting an author deletes their books.
pub(super) async fn delete_author(
    State(state): State<AppState>,
    method: Method,
    MaybeUser(user): MaybeUser,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    Permission::IsAuthenticatedOrReadOnly.check(&method, user.as_ref())?;
    let author = find_author(&state.db, id).await?;
    author.delete(&state.db).await?;

    tracing::info!(author_id = id, "author deleted");
    Ok(StatusCode::NO_CONTENT)
}

async fn find_author<C: ConnectionTrait>(conn: &C, id: i64) -> Result<author::Model, AppError> {
    Authors::find_by_id(id)
        .one(conn)
        .await?
        .ok_or_else(|| AppError::not_found("No Author matches the given query."))
}

async fn with_books<C: ConnectionTrait>(conn: &C, author: author::Model) -> Result<Author, AppError> {
    let books = author.find_related(Book).all(conn).await?;
    Ok(Author::new(author, books))
}
