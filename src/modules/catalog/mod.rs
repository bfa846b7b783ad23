pub mod entities;
pub mod filters;
pub mod models;
pub mod routes;

use async_trait::async_trait;
use agora_kernel::{AppState, InitCtx, Migration, Module};
use axum::Router;
use serde_json::{json, Value};

/// Catalog module: authors, books, libraries and librarians
pub struct CatalogModule;

impl CatalogModule {
    pub const fn new() -> Self {
        Self
    }
}

fn error_ref(description: &str) -> Value {
    json!({
        "description": description,
        "content": { "application/json": { "schema": { "$ref": "#/components/schemas/ErrorResponse" } } }
    })
}

fn json_body(schema: &str) -> Value {
    json!({ "application/json": { "schema": { "$ref": format!("#/components/schemas/{schema}") } } })
}

fn json_list(schema: &str) -> Value {
    json!({ "application/json": { "schema": {
        "type": "array",
        "items": { "$ref": format!("#/components/schemas/{schema}") }
    } } })
}

fn id_params(names: &[&str]) -> Value {
    names
        .iter()
        .map(|name| json!({ "name": name, "in": "path", "required": true, "schema": { "type": "integer" } }))
        .collect()
}

#[async_trait]
impl Module for CatalogModule {
    fn name(&self) -> &'static str {
        "catalog"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            "catalog module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router<AppState> {
        routes::router()
    }

    fn openapi(&self) -> Option<Value> {
        let auth = json!([{ "tokenAuth": [] }]);
        let tag = json!(["Catalog"]);

        Some(json!({
            "paths": {
                "/books": {
                    "get": {
                        "summary": "List books",
                        "tags": tag,
                        "parameters": [
                            { "name": "title", "in": "query", "schema": { "type": "string" }, "description": "Exact title" },
                            { "name": "author", "in": "query", "schema": { "type": "integer" }, "description": "Author id" },
                            { "name": "publication_year", "in": "query", "schema": { "type": "integer" } },
                            { "name": "search", "in": "query", "schema": { "type": "string" }, "description": "Terms matched against title or author name" },
                            { "name": "ordering", "in": "query", "schema": { "type": "string" }, "description": "title, publication_year or id; prefix with - for descending" }
                        ],
                        "responses": {
                            "200": { "description": "Books", "content": json_list("Book") },
                            "400": error_ref("Invalid filter value")
                        }
                    },
                    "post": {
                        "summary": "Create a book",
                        "tags": tag,
                        "security": auth,
                        "requestBody": { "required": true, "content": json_body("BookInput") },
                        "responses": {
                            "201": { "description": "Created", "content": json_body("Book") },
                            "400": error_ref("Invalid input, e.g. a future publication year"),
                            "401": error_ref("Not authenticated")
                        }
                    }
                },
                "/books/{id}": {
                    "get": {
                        "summary": "Get a book",
                        "tags": tag,
                        "parameters": id_params(&["id"]),
                        "responses": { "200": { "description": "Book", "content": json_body("Book") }, "404": error_ref("Not found") }
                    },
                    "put": {
                        "summary": "Replace a book",
                        "tags": tag,
                        "security": auth,
                        "parameters": id_params(&["id"]),
                        "requestBody": { "required": true, "content": json_body("BookInput") },
                        "responses": { "200": { "description": "Updated", "content": json_body("Book") }, "400": error_ref("Invalid input"), "401": error_ref("Not authenticated"), "404": error_ref("Not found") }
                    },
                    "patch": {
                        "summary": "Update some fields of a book",
                        "tags": tag,
                        "security": auth,
                        "parameters": id_params(&["id"]),
                        "requestBody": { "required": true, "content": json_body("BookInput") },
                        "responses": { "200": { "description": "Updated", "content": json_body("Book") }, "400": error_ref("Invalid input"), "401": error_ref("Not authenticated"), "404": error_ref("Not found") }
                    },
                    "delete": {
                        "summary": "Delete a book",
                        "tags": tag,
                        "security": auth,
                        "parameters": id_params(&["id"]),
                        "responses": { "204": { "description": "Deleted" }, "401": error_ref("Not authenticated"), "404": error_ref("Not found") }
                    }
                },
                "/authors": {
                    "get": {
                        "summary": "List authors with their books",
                        "tags": tag,
                        "responses": { "200": { "description": "Authors", "content": json_list("Author") } }
                    },
                    "post": {
                        "summary": "Create an author",
                        "tags": tag,
                        "security": auth,
                        "requestBody": { "required": true, "content": json_body("NameInput") },
                        "responses": { "201": { "description": "Created", "content": json_body("Author") }, "400": error_ref("Invalid input"), "401": error_ref("Not authenticated") }
                    }
                },
                "/authors/{id}": {
                    "get": {
                        "summary": "Get an author with their books",
                        "tags": tag,
                        "parameters": id_params(&["id"]),
                        "responses": { "200": { "description": "Author", "content": json_body("Author") }, "404": error_ref("Not found") }
                    },
                    "put": {
                        "summary": "Rename an author",
                        "tags": tag,
                        "security": auth,
                        "parameters": id_params(&["id"]),
                        "requestBody": { "required": true, "content": json_body("NameInput") },
                        "responses": { "200": { "description": "Updated", "content": json_body("Author") }, "404": error_ref("Not found") }
                    },
                    "patch": {
                        "summary": "Rename an author",
                        "tags": tag,
                        "security": auth,
                        "parameters": id_params(&["id"]),
                        "responses": { "200": { "description": "Updated", "content": json_body("Author") }, "404": error_ref("Not found") }
                    },
                    "delete": {
                        "summary": "Delete an author and their books",
                        "tags": tag,
                        "security": auth,
                        "parameters": id_params(&["id"]),
                        "responses": { "204": { "description": "Deleted" }, "404": error_ref("Not found") }
                    }
                },
                "/libraries": {
                    "get": {
                        "summary": "List libraries",
                        "tags": tag,
                        "responses": { "200": { "description": "Libraries", "content": json_list("Library") } }
                    },
                    "post": {
                        "summary": "Create a library (librarian role)",
                        "tags": tag,
                        "security": auth,
                        "requestBody": { "required": true, "content": json_body("NameInput") },
                        "responses": { "201": { "description": "Created", "content": json_body("Library") }, "400": error_ref("Invalid or duplicate name"), "403": error_ref("Missing role") }
                    }
                },
                "/libraries/{id}": {
                    "get": {
                        "summary": "Get a library with its books and librarian",
                        "tags": tag,
                        "parameters": id_params(&["id"]),
                        "responses": { "200": { "description": "Library", "content": json_body("Library") }, "404": error_ref("Not found") }
                    },
                    "delete": {
                        "summary": "Delete a library (librarian role)",
                        "tags": tag,
                        "security": auth,
                        "parameters": id_params(&["id"]),
                        "responses": { "204": { "description": "Deleted" }, "403": error_ref("Missing role"), "404": error_ref("Not found") }
                    }
                },
                "/libraries/{id}/books/{book_id}": {
                    "put": {
                        "summary": "Add a book to a library (librarian role)",
                        "tags": tag,
                        "security": auth,
                        "parameters": id_params(&["id", "book_id"]),
                        "responses": { "200": { "description": "Library", "content": json_body("Library") }, "403": error_ref("Missing role"), "404": error_ref("Library or book not found") }
                    },
                    "delete": {
                        "summary": "Remove a book from a library (librarian role)",
                        "tags": tag,
                        "security": auth,
                        "parameters": id_params(&["id", "book_id"]),
                        "responses": { "204": { "description": "Removed" }, "403": error_ref("Missing role"), "404": error_ref("Not in this library") }
                    }
                },
                "/libraries/{id}/librarian": {
                    "get": {
                        "summary": "The library's librarian",
                        "tags": tag,
                        "parameters": id_params(&["id"]),
                        "responses": { "200": { "description": "Librarian", "content": json_body("Librarian") }, "404": error_ref("No librarian assigned") }
                    },
                    "put": {
                        "summary": "Assign or rename the librarian (librarian role)",
                        "tags": tag,
                        "security": auth,
                        "parameters": id_params(&["id"]),
                        "requestBody": { "required": true, "content": json_body("NameInput") },
                        "responses": {
                            "200": { "description": "Renamed", "content": json_body("Librarian") },
                            "201": { "description": "Assigned", "content": json_body("Librarian") },
                            "403": error_ref("Missing role")
                        }
                    }
                }
            },
            "components": {
                "schemas": {
                    "Book": {
                        "type": "object",
                        "properties": {
                            "id": { "type": "integer" },
                            "title": { "type": "string" },
                            "publication_year": { "type": "integer" },
                            "author": { "type": "integer", "description": "Author id" }
                        },
                        "required": ["id", "title", "publication_year", "author"]
                    },
                    "BookInput": {
                        "type": "object",
                        "properties": {
                            "title": { "type": "string", "maxLength": 300 },
                            "publication_year": { "type": "integer", "description": "Not later than the current year" },
                            "author": { "type": "integer" }
                        }
                    },
                    "NameInput": {
                        "type": "object",
                        "properties": { "name": { "type": "string", "maxLength": 200 } },
                        "required": ["name"]
                    },
                    "Author": {
                        "type": "object",
                        "properties": {
                            "id": { "type": "integer" },
                            "name": { "type": "string" },
                            "books": { "type": "array", "items": { "$ref": "#/components/schemas/Book" } }
                        }
                    },
                    "Librarian": {
                        "type": "object",
                        "properties": {
                            "id": { "type": "integer" },
                            "name": { "type": "string" },
                            "library": { "type": "integer" }
                        }
                    },
                    "Library": {
                        "type": "object",
                        "properties": {
                            "id": { "type": "integer" },
                            "name": { "type": "string" },
                            "books": { "type": "array", "items": { "$ref": "#/components/schemas/Book" } },
                            "librarian": { "$ref": "#/components/schemas/Librarian" }
                        }
                    }
                }
            }
        }))
    }

    fn migrations(&self) -> Vec<Migration> {
        vec![
            Migration {
                id: "001_authors_books",
                up: r#"
                    CREATE TABLE authors (
                        id   INTEGER PRIMARY KEY AUTOINCREMENT,
                        name TEXT NOT NULL
                    );
                    CREATE TABLE books (
                        id               INTEGER PRIMARY KEY AUTOINCREMENT,
                        title            TEXT NOT NULL,
                        publication_year INTEGER NOT NULL,
                        author_id        INTEGER NOT NULL REFERENCES authors (id) ON DELETE CASCADE
                    );
                    CREATE INDEX books_author ON books (author_id);
                "#,
            },
            Migration {
                id: "002_libraries",
                up: r#"
                    CREATE TABLE libraries (
                        id   INTEGER PRIMARY KEY AUTOINCREMENT,
                        name TEXT NOT NULL UNIQUE
                    );
                    CREATE TABLE library_books (
                        library_id INTEGER NOT NULL REFERENCES libraries (id) ON DELETE CASCADE,
                        book_id    INTEGER NOT NULL REFERENCES books (id) ON DELETE CASCADE,
                        PRIMARY KEY (library_id, book_id)
                    );
                    CREATE TABLE librarians (
                        id         INTEGER PRIMARY KEY AUTOINCREMENT,
                        name       TEXT NOT NULL,
                        library_id INTEGER NOT NULL UNIQUE REFERENCES libraries (id) ON DELETE CASCADE
                    );
                "#,
            },
        ]
    }

    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "catalog module started");
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "catalog module stopped");
        Ok(())
    }
}

/// Create a new instance of the catalog module
pub fn create_module() -> std::sync::Arc<dyn Module> {
    std::sync::Arc::new(CatalogModule::new())
}
