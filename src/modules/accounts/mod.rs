pub mod entities;
pub mod models;
pub mod routes;

use async_trait::async_trait;
use agora_kernel::{AppState, InitCtx, Migration, Module};
use axum::Router;
use serde_json::{json, Value};

/// Accounts module: registration, login, profiles and the follow graph
pub struct AccountsModule;

impl AccountsModule {
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

fn user_id_param(name: &str) -> Value {
    json!([{ "name": name, "in": "path", "required": true, "schema": { "type": "integer" } }])
}

#[async_trait]
impl Module for AccountsModule {
    fn name(&self) -> &'static str {
        "accounts"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            "accounts module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router<AppState> {
        routes::router()
    }

    fn openapi(&self) -> Option<Value> {
        let auth = json!([{ "tokenAuth": [] }]);
        let profile = json!({ "application/json": { "schema": { "$ref": "#/components/schemas/Profile" } } });
        let auth_response = json!({ "application/json": { "schema": { "$ref": "#/components/schemas/AuthResponse" } } });
        let user_list = json!({ "application/json": { "schema": {
            "type": "array", "items": { "$ref": "#/components/schemas/UserSummary" }
        } } });

        Some(json!({
            "paths": {
                "/register": {
                    "post": {
                        "summary": "Create an account and its API token",
                        "tags": ["Accounts"],
                        "requestBody": { "required": true, "content": { "application/json": { "schema": { "$ref": "#/components/schemas/Register" } } } },
                        "responses": {
                            "201": { "description": "Account created", "content": auth_response },
                            "400": error_ref("Invalid or duplicate username, short password")
                        }
                    }
                },
                "/login": {
                    "post": {
                        "summary": "Exchange credentials for the account's token",
                        "tags": ["Accounts"],
                        "requestBody": { "required": true, "content": { "application/json": { "schema": { "$ref": "#/components/schemas/Login" } } } },
                        "responses": {
                            "200": { "description": "Logged in", "content": auth_response },
                            "401": error_ref("Invalid credentials")
                        }
                    }
                },
                "/logout": {
                    "post": {
                        "summary": "Revoke the caller's token",
                        "tags": ["Accounts"],
                        "security": auth,
                        "responses": { "204": { "description": "Logged out" }, "401": error_ref("Not authenticated") }
                    }
                },
                "/profile": {
                    "get": {
                        "summary": "The caller's profile",
                        "tags": ["Accounts"],
                        "security": auth,
                        "responses": { "200": { "description": "Profile", "content": profile }, "401": error_ref("Not authenticated") }
                    },
                    "put": {
                        "summary": "Replace email and bio (and optionally the picture)",
                        "tags": ["Accounts"],
                        "security": auth,
                        "responses": { "200": { "description": "Updated profile", "content": profile }, "400": error_ref("Invalid input") }
                    },
                    "patch": {
                        "summary": "Update some profile fields",
                        "tags": ["Accounts"],
                        "security": auth,
                        "responses": { "200": { "description": "Updated profile", "content": profile }, "400": error_ref("Invalid input") }
                    }
                },
                "/users/{id}": {
                    "get": {
                        "summary": "Public profile of a user",
                        "tags": ["Accounts"],
                        "parameters": user_id_param("id"),
                        "responses": { "200": { "description": "Profile", "content": profile }, "404": error_ref("No such user") }
                    }
                },
                "/follow/{user_id}": {
                    "post": {
                        "summary": "Follow a user",
                        "tags": ["Accounts"],
                        "security": auth,
                        "parameters": user_id_param("user_id"),
                        "responses": {
                            "200": { "description": "Now following" },
                            "400": error_ref("Self-follow or already following"),
                            "404": error_ref("No such user")
                        }
                    }
                },
                "/unfollow/{user_id}": {
                    "post": {
                        "summary": "Stop following a user",
                        "tags": ["Accounts"],
                        "security": auth,
                        "parameters": user_id_param("user_id"),
                        "responses": {
                            "200": { "description": "Unfollowed" },
                            "400": error_ref("Self-unfollow or not following"),
                            "404": error_ref("No such user")
                        }
                    }
                },
                "/followers": {
                    "get": {
                        "summary": "Users following the caller",
                        "tags": ["Accounts"],
                        "security": auth,
                        "responses": { "200": { "description": "Followers", "content": user_list } }
                    }
                },
                "/following": {
                    "get": {
                        "summary": "Users the caller follows",
                        "tags": ["Accounts"],
                        "security": auth,
                        "responses": { "200": { "description": "Followed users", "content": user_list } }
                    }
                }
            },
            "components": {
                "schemas": {
                    "Register": {
                        "type": "object",
                        "properties": {
                            "username": { "type": "string", "maxLength": 150 },
                            "password": { "type": "string", "minLength": 8 },
                            "email": { "type": "string", "format": "email" },
                            "bio": { "type": "string", "maxLength": 500 }
                        },
                        "required": ["username", "password"]
                    },
                    "Login": {
                        "type": "object",
                        "properties": {
                            "username": { "type": "string" },
                            "password": { "type": "string" }
                        },
                        "required": ["username", "password"]
                    },
                    "Profile": {
                        "type": "object",
                        "properties": {
                            "id": { "type": "integer" },
                            "username": { "type": "string" },
                            "email": { "type": "string", "nullable": true },
                            "bio": { "type": "string" },
                            "profile_picture": { "type": "string", "nullable": true },
                            "role": { "type": "string", "enum": ["admin", "librarian", "member"] },
                            "date_joined": { "type": "string", "format": "date-time" },
                            "followers_count": { "type": "integer" },
                            "following_count": { "type": "integer" }
                        }
                    },
                    "AuthResponse": {
                        "type": "object",
                        "properties": {
                            "user": { "$ref": "#/components/schemas/Profile" },
                            "token": { "type": "string" }
                        }
                    },
                    "UserSummary": {
                        "type": "object",
                        "properties": {
                            "id": { "type": "integer" },
                            "username": { "type": "string" }
                        }
                    }
                }
            }
        }))
    }

    fn migrations(&self) -> Vec<Migration> {
        vec![Migration {
            id: "001_follows",
            up: r#"
                CREATE TABLE user_follows (
                    follower_id INTEGER NOT NULL REFERENCES users (id) ON DELETE CASCADE,
                    followee_id INTEGER NOT NULL REFERENCES users (id) ON DELETE CASCADE,
                    created_at  TEXT NOT NULL,
                    PRIMARY KEY (follower_id, followee_id)
                );
                CREATE INDEX user_follows_followee ON user_follows (followee_id);
            "#,
        }]
    }
}

/// Create a new instance of the accounts module
pub fn create_module() -> std::sync::Arc<dyn Module> {
    std::sync::Arc::new(AccountsModule::new())
}
