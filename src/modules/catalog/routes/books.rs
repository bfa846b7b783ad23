use agora_authz::{MaybeUser, Permission};
use agora_http::{ApiJson, ApiResult, AppError};
use agora_kernel::AppState;
use axum::{
    extract::{Path, Query, State},
    http::{Method, StatusCode},
    Json,
};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ConnectionTrait, EntityTrait, IntoActiveModel,
    ModelTrait,
};

use crate::modules::catalog::entities::{book, Author, Book as Books};
use crate::modules::catalog::filters::BookQuery;
use crate::modules::catalog::models::{Book, BookInput};

pub(super) async fn list_books(
    State(state): State<AppState>,
    Query(query): Query<BookQuery>,
) -> ApiResult<Json<Vec<Book>>> {
    let filter = query.parse()?;
    let books = filter.apply(Books::find()).all(&state.db).await?;
    Ok(Json(books.into_iter().map(Book::from).collect()))
}

pub(super) async fn create_book(
    State(state): State<AppState>,
    method: Method,
    MaybeUser(user): MaybeUser,
    body: Result<ApiJson<BookInput>, AppError>,
) -> ApiResult<(StatusCode, Json<Book>)> {
    Permission::IsAuthenticatedOrReadOnly.check(&method, user.as_ref())?;
    let ApiJson(body) = body?;
    check_book(&state.db, &body, false).await?;

    let book = book::ActiveModel {
        title: Set(body.title.unwrap_or_default()),
        publication_year: Set(body.publication_year.unwrap_or_default()),
        author_id: Set(body.author.unwrap_or_default()),
        ..Default::default()
    }
    .insert(&state.db)
    .await?;

    tracing::info!(book_id = book.id, title = %book.title, "book created");
    Ok((StatusCode::CREATED, Json(book.into())))
}

pub(super) async fn get_book(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Book>> {
    Ok(Json(find_book(&state.db, id).await?.into()))
}

/// PUT replaces every field; PATCH changes only those supplied.
pub(super) async fn update_book(
    State(state): State<AppState>,
    method: Method,
    MaybeUser(user): MaybeUser,
    Path(id): Path<i64>,
    body: Result<ApiJson<BookInput>, AppError>,
) -> ApiResult<Json<Book>> {
    Permission::IsAuthenticatedOrReadOnly.check(&method, user.as_ref())?;
    let book = find_book(&state.db, id).await?;
    let ApiJson(body) = body?;
    check_book(&state.db, &body, method == Method::PATCH).await?;

    let mut active = book.into_active_model();
    if let Some(title) = body.title {
        active.title = Set(title);
    }
    if let Some(year) = body.publication_year {
        active.publication_year = Set(year);
    }
    if let Some(author_id) = body.author {
        active.author_id = Set(author_id);
    }
    let book = active.update(&state.db).await?;

    Ok(Json(book.into()))
}

pub(super) async fn delete_book(
    State(state): State<AppState>,
    method: Method,
    MaybeUser(user): MaybeUser,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    Permission::IsAuthenticatedOrReadOnly.check(&method, user.as_ref())?;
    let book = find_book(&state.db, id).await?;
    book.delete(&state.db).await?;

    tracing::info!(book_id = id, "book deleted");
    Ok(StatusCode::NO_CONTENT)
}

pub(super) async fn find_book<C: ConnectionTrait>(conn: &C, id: i64) -> Result<book::Model, AppError> {
    Books::find_by_id(id)
        .one(conn)
        .await?
        .ok_or_else(|| AppError::not_found("No Book matches the given query."))
}

/// Field rules plus the referenced author's existence.
async fn check_book<C: ConnectionTrait>(
    conn: &C,
    body: &BookInput,
    partial: bool,
) -> Result<(), AppError> {
    let mut errors = body.field_errors(partial);

    if let Some(author_id) = body.author {
        if Author::find_by_id(author_id).one(conn).await?.is_none() {
            errors.add(
                "author",
                format!("Invalid pk \"{author_id}\" - object does not exist."),
            );
        }
    }

    errors.into_result()
}
