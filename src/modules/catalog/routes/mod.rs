//! Catalog routes. Reads are public; writes need a token, and library
//! management needs the librarian role.

mod authors;
mod books;
mod libraries;

use agora_kernel::AppState;
use axum::{
    routing::{get, put},
    Router,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/books", get(books::list_books).post(books::create_book))
        .route(
            "/books/{id}",
            get(books::get_book)
                .put(books::update_book)
                .patch(books::update_book)
                .delete(books::delete_book),
        )
        .route(
            "/authors",
            get(authors::list_authors).post(authors::create_author),
        )
        .route(
            "/authors/{id}",
            get(authors::get_author)
                .put(authors::update_author)
                .patch(authors::update_author)
                .delete(authors::delete_author),
        )
        .route(
            "/libraries",
            get(libraries::list_libraries).post(libraries::create_library),
        )
        .route(
            "/libraries/{id}",
            get(libraries::get_library).delete(libraries::delete_library),
        )
        .route(
            "/libraries/{id}/books/{book_id}",
            put(libraries::add_book).delete(libraries::remove_book),
        )
        .route(
            "/libraries/{id}/librarian",
            get(libraries::get_librarian).put(libraries::assign_librarian),
        )
}
