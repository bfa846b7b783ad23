pub mod entities;
pub mod models;
pub mod present;
pub mod routes;

use async_trait::async_trait;
use agora_kernel::{AppState, InitCtx, Migration, Module};
use axum::Router;
use serde_json::{json, Value};

/// Posts module: posts, comments, likes and the follow feed
pub struct PostsModule;

impl PostsModule {
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

fn schema(name: &str) -> Value {
    json!({ "application/json": { "schema": { "$ref": format!("#/components/schemas/{name}") } } })
}

fn page_schema(name: &str) -> Value {
    json!({ "application/json": { "schema": {
        "type": "object",
        "properties": {
            "count": { "type": "integer" },
            "next": { "type": "string", "nullable": true },
            "previous": { "type": "string", "nullable": true },
            "results": { "type": "array", "items": { "$ref": format!("#/components/schemas/{name}") } }
        }
    } } })
}

fn page_params() -> Vec<Value> {
    vec![
        json!({ "name": "page", "in": "query", "schema": { "type": "integer", "minimum": 1 } }),
        json!({ "name": "page_size", "in": "query", "schema": { "type": "integer", "maximum": 100 } }),
    ]
}

fn id_param() -> Value {
    json!({ "name": "id", "in": "path", "required": true, "schema": { "type": "integer" } })
}

#[async_trait]
impl Module for PostsModule {
    fn name(&self) -> &'static str {
        "posts"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            page_size = ctx.settings.pagination.page_size,
            "posts module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router<AppState> {
        routes::router()
    }

    fn openapi(&self) -> Option<Value> {
        let auth = json!([{ "tokenAuth": [] }]);
        let tag = json!(["Posts"]);

        let mut list_params = page_params();
        list_params.push(json!({ "name": "search", "in": "query", "schema": { "type": "string" } }));
        let mut comment_params = page_params();
        comment_params.push(json!({ "name": "post", "in": "query", "schema": { "type": "integer" } }));

        let item_ops = |noun: &str, input: &str, output: &str| {
            json!({
                "get": {
                    "summary": format!("Get a {noun}"),
                    "tags": tag,
                    "parameters": [id_param()],
                    "responses": { "200": { "description": noun, "content": schema(output) }, "404": error_ref("Not found") }
                },
                "put": {
                    "summary": format!("Replace a {noun} (author only)"),
                    "tags": tag,
                    "security": auth,
                    "parameters": [id_param()],
                    "requestBody": { "required": true, "content": schema(input) },
                    "responses": { "200": { "description": "Updated", "content": schema(output) }, "403": error_ref("Not the author"), "404": error_ref("Not found") }
                },
                "patch": {
                    "summary": format!("Update a {noun} (author only)"),
                    "tags": tag,
                    "security": auth,
                    "parameters": [id_param()],
                    "requestBody": { "required": true, "content": schema(input) },
                    "responses": { "200": { "description": "Updated", "content": schema(output) }, "403": error_ref("Not the author"), "404": error_ref("Not found") }
                },
                "delete": {
                    "summary": format!("Delete a {noun} (author only)"),
                    "tags": tag,
                    "security": auth,
                    "parameters": [id_param()],
                    "responses": { "204": { "description": "Deleted" }, "403": error_ref("Not the author"), "404": error_ref("Not found") }
                }
            })
        };

        Some(json!({
            "paths": {
                "/": {
                    "get": {
                        "summary": "List posts, newest first",
                        "tags": tag,
                        "parameters": list_params,
                        "responses": { "200": { "description": "Page of posts", "content": page_schema("Post") }, "404": error_ref("Invalid page") }
                    },
                    "post": {
                        "summary": "Create a post",
                        "tags": tag,
                        "security": auth,
                        "requestBody": { "required": true, "content": schema("PostInput") },
                        "responses": { "201": { "description": "Created", "content": schema("Post") }, "400": error_ref("Invalid input"), "401": error_ref("Not authenticated") }
                    }
                },
                "/{id}": item_ops("post", "PostInput", "Post"),
                "/{id}/like": {
                    "post": {
                        "summary": "Like a post",
                        "tags": tag,
                        "security": auth,
                        "parameters": [id_param()],
                        "responses": { "201": { "description": "Liked" }, "400": error_ref("Already liked"), "404": error_ref("Not found") }
                    }
                },
                "/{id}/unlike": {
                    "post": {
                        "summary": "Remove a like",
                        "tags": tag,
                        "security": auth,
                        "parameters": [id_param()],
                        "responses": { "200": { "description": "Unliked" }, "400": error_ref("Not liked"), "404": error_ref("Not found") }
                    }
                },
                "/feed": {
                    "get": {
                        "summary": "Posts by followed users, newest first",
                        "tags": tag,
                        "security": auth,
                        "parameters": page_params(),
                        "responses": { "200": { "description": "Page of posts", "content": page_schema("Post") }, "401": error_ref("Not authenticated") }
                    }
                },
                "/comments": {
                    "get": {
                        "summary": "List comments, oldest first",
                        "tags": tag,
                        "parameters": comment_params,
                        "responses": { "200": { "description": "Page of comments", "content": page_schema("Comment") } }
                    },
                    "post": {
                        "summary": "Comment on a post",
                        "tags": tag,
                        "security": auth,
                        "requestBody": { "required": true, "content": schema("CommentInput") },
                        "responses": { "201": { "description": "Created", "content": schema("Comment") }, "400": error_ref("Invalid input or unknown post") }
                    }
                },
                "/comments/{id}": item_ops("comment", "CommentInput", "Comment")
            },
            "components": {
                "schemas": {
                    "PostInput": {
                        "type": "object",
                        "properties": {
                            "title": { "type": "string", "maxLength": 200 },
                            "content": { "type": "string" }
                        }
                    },
                    "CommentInput": {
                        "type": "object",
                        "properties": {
                            "post": { "type": "integer" },
                            "content": { "type": "string" }
                        }
                    },
                    "Comment": {
                        "type": "object",
                        "properties": {
                            "id": { "type": "integer" },
                            "post": { "type": "integer" },
                            "author": { "type": "string" },
                            "author_id": { "type": "integer" },
                            "content": { "type": "string" },
                            "created_at": { "type": "string", "format": "date-time" },
                            "updated_at": { "type": "string", "format": "date-time" }
                        }
                    },
                    "Post": {
                        "type": "object",
                        "properties": {
                            "id": { "type": "integer" },
                            "author": { "type": "string" },
                            "author_id": { "type": "integer" },
                            "title": { "type": "string" },
                            "content": { "type": "string" },
                            "created_at": { "type": "string", "format": "date-time" },
                            "updated_at": { "type": "string", "format": "date-time" },
                            "comments": { "type": "array", "items": { "$ref": "#/components/schemas/Comment" } },
                            "comments_count": { "type": "integer" },
                            "likes_count": { "type": "integer" },
                            "liked_by_user": { "type": "boolean" }
                        }
                    }
                }
            }
        }))
    }

    fn migrations(&self) -> Vec<Migration> {
        vec![Migration {
            id: "001_init",
            up: r#"
                CREATE TABLE posts (
                    id         INTEGER PRIMARY KEY AUTOINCREMENT,
                    author_id  INTEGER NOT NULL REFERENCES users (id) ON DELETE CASCADE,
                    title      TEXT NOT NULL,
                    content    TEXT NOT NULL,
                    created_at TEXT NOT NULL,
                    updated_at TEXT NOT NULL
                );
                CREATE INDEX posts_author ON posts (author_id);
                CREATE TABLE comments (
                    id         INTEGER PRIMARY KEY AUTOINCREMENT,
                    post_id    INTEGER NOT NULL REFERENCES posts (id) ON DELETE CASCADE,
                    author_id  INTEGER NOT NULL REFERENCES users (id) ON DELETE CASCADE,
                    content    TEXT NOT NULL,
                    created_at TEXT NOT NULL,
                    updated_at TEXT NOT NULL
                );
                CREATE INDEX comments_post ON comments (post_id);
                CREATE TABLE likes (
                    id         INTEGER PRIMARY KEY AUTOINCREMENT,
                    user_id    INTEGER NOT NULL REFERENCES users (id) ON DELETE CASCADE,
                    post_id    INTEGER NOT NULL REFERENCES posts (id) ON DELETE CASCADE,
                    created_at TEXT NOT NULL,
                    UNIQUE (user_id, post_id)
                );
            "#,
        }]
    }
}

/// Create a new instance of the posts module
pub fn create_module() -> std::sync::Arc<dyn Module> {
    std::sync::Arc::new(PostsModule::new())
}
