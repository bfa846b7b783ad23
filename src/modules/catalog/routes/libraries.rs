use agora_authz::{permission::LIBRARY_STAFF, MaybeUser, Permission};
use agora_db::is_unique_violation;
use agora_http::{ApiJson, ApiResult, AppError};
use agora_kernel::AppState;
use axum::{
    extract::{Path, State},
    http::{Method, StatusCode},
    Json,
};
use sea_orm::{
    sea_query::OnConflict, ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait,
    EntityTrait, IntoActiveModel, ModelTrait, QueryFilter, QueryOrder,
};

use super::books::find_book;
use crate::modules::catalog::entities::{
    librarian, library, library_book, Book, Librarian as Librarians, Library as Libraries,
    LibraryBook,
};
use crate::modules::catalog::models::{Librarian, Library, NameInput};

const STAFF: Permission = Permission::HasRole(LIBRARY_STAFF);

pub(super) async fn list_libraries(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<Library>>> {
    let libraries = Libraries::find()
        .order_by_asc(library::Column::Name)
        .all(&state.db)
        .await?;

    let mut out = Vec::with_capacity(libraries.len());
    for library in libraries {
        out.push(detail(&state.db, library).await?);
    }
    Ok(Json(out))
}

pub(super) async fn create_library(
    State(state): State<AppState>,
    method: Method,
    MaybeUser(user): MaybeUser,
    body: Result<ApiJson<NameInput>, AppError>,
) -> ApiResult<(StatusCode, Json<Library>)> {
    STAFF.check(&method, user.as_ref())?;
    let ApiJson(body) = body?;
    let name = body.into_name().map_err(AppError::invalid_fields)?;

    let taken = Libraries::find()
        .filter(library::Column::Name.eq(name.as_str()))
        .one(&state.db)
        .await?;
    if taken.is_some() {
        return Err(name_taken());
    }

    let library = library::ActiveModel {
        name: Set(name),
        ..Default::default()
    }
    .insert(&state.db)
    .await
    .map_err(|err| {
        if is_unique_violation(&err) {
            name_taken()
        } else {
            err.into()
        }
    })?;

    tracing::info!(library_id = library.id, "library created");
    Ok((StatusCode::CREATED, Json(Library::new(library, Vec::new(), None))))
}

pub(super) async fn get_library(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Library>> {
    let library = find_library(&state.db, id).await?;
    Ok(Json(detail(&state.db, library).await?))
}

pub(super) async fn delete_library(
    State(state): State<AppState>,
    method: Method,
    MaybeUser(user): MaybeUser,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    STAFF.check(&method, user.as_ref())?;
    let library = find_library(&state.db, id).await?;
    library.delete(&state.db).await?;

    tracing::info!(library_id = id, "library deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// Put a book on the library's shelf. Adding it twice is a no-op.
pub(super) async fn add_book(
    State(state): State<AppState>,
    method: Method,
    MaybeUser(user): MaybeUser,
    Path((id, book_id)): Path<(i64, i64)>,
) -> ApiResult<Json<Library>> {
    STAFF.check(&method, user.as_ref())?;
    let library = find_library(&state.db, id).await?;
    let book = find_book(&state.db, book_id).await?;

    LibraryBook::insert(library_book::ActiveModel {
        library_id: Set(library.id),
        book_id: Set(book.id),
    })
    .on_conflict(
        OnConflict::columns([library_book::Column::LibraryId, library_book::Column::BookId])
            .do_nothing()
            .to_owned(),
    )
    .exec_without_returning(&state.db)
    .await?;

    Ok(Json(detail(&state.db, library).await?))
}

pub(super) async fn remove_book(
    State(state): State<AppState>,
    method: Method,
    MaybeUser(user): MaybeUser,
    Path((id, book_id)): Path<(i64, i64)>,
) -> ApiResult<StatusCode> {
    STAFF.check(&method, user.as_ref())?;
    let library = find_library(&state.db, id).await?;

    let removed = LibraryBook::delete_many()
        .filter(library_book::Column::LibraryId.eq(library.id))
        .filter(library_book::Column::BookId.eq(book_id))
        .exec(&state.db)
        .await?;
    if removed.rows_affected == 0 {
        return Err(AppError::not_found("Book is not in this library."));
    }

    Ok(StatusCode::NO_CONTENT)
}

pub(super) async fn get_librarian(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Librarian>> {
    let library = find_library(&state.db, id).await?;
    library
        .find_related(Librarians)
        .one(&state.db)
        .await?
        .map(|l| Json(l.into()))
        .ok_or_else(|| AppError::not_found("This library has no librarian."))
}

/// Create the library's librarian, or rename the existing one.
pub(super) async fn assign_librarian(
    State(state): State<AppState>,
    method: Method,
    MaybeUser(user): MaybeUser,
    Path(id): Path<i64>,
    body: Result<ApiJson<NameInput>, AppError>,
) -> ApiResult<(StatusCode, Json<Librarian>)> {
    STAFF.check(&method, user.as_ref())?;
    let library = find_library(&state.db, id).await?;
    let ApiJson(body) = body?;
    let name = body.into_name().map_err(AppError::invalid_fields)?;

    let existing = library.find_related(Librarians).one(&state.db).await?;
    let (status, librarian) = match existing {
        Some(current) => {
            let mut active = current.into_active_model();
            active.name = Set(name);
            (StatusCode::OK, active.update(&state.db).await?)
        }
        None => {
            let created = librarian::ActiveModel {
                name: Set(name),
                library_id: Set(library.id),
                ..Default::default()
            }
            .insert(&state.db)
            .await?;
            (StatusCode::CREATED, created)
        }
    };

    tracing::info!(library_id = library.id, librarian_id = librarian.id, "librarian assigned");
    Ok((status, Json(librarian.into())))
}

fn name_taken() -> AppError {
    AppError::invalid_field("name", "library with this name already exists.")
}

async fn find_library<C: ConnectionTrait>(conn: &C, id: i64) -> Result<library::Model, AppError> {
    Libraries::find_by_id(id)
        .one(conn)
        .await?
        .ok_or_else(|| AppError::not_found("No Library matches the given query."))
}

async fn detail<C: ConnectionTrait>(conn: &C, library: library::Model) -> Result<Library, AppError> {
    let books = library.find_related(Book).all(conn).await?;
    let librarian = library.find_related(Librarians).one(conn).await?;
    Ok(Library::new(library, books, librarian))
}
