pub mod entities;
pub mod models;
pub mod routes;
pub mod service;

use async_trait::async_trait;
use agora_kernel::{AppState, InitCtx, Migration, Module};
use axum::Router;

pub use entities::Verb;
pub use service::{notify, Target};

/// Notifications module: per-user inbox fed by follows, comments and likes
pub struct NotificationsModule;

impl NotificationsModule {
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Module for NotificationsModule {
    fn name(&self) -> &'static str {
        "notifications"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            "notifications module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router<AppState> {
        routes::router()
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        let auth = serde_json::json!([{ "tokenAuth": [] }]);
        let unauthorized = serde_json::json!({
            "description": "Not authenticated",
            "content": { "application/json": { "schema": { "$ref": "#/components/schemas/ErrorResponse" } } }
        });

        Some(serde_json::json!({
            "paths": {
                "/": {
                    "get": {
                        "summary": "List the caller's notifications, newest first",
                        "tags": ["Notifications"],
                        "security": auth,
                        "responses": {
                            "200": {
                                "description": "Notifications",
                                "content": { "application/json": { "schema": {
                                    "type": "array",
                                    "items": { "$ref": "#/components/schemas/Notification" }
                                } } }
                            },
                            "401": unauthorized
                        }
                    }
                },
                "/{id}/read": {
                    "post": {
                        "summary": "Mark one notification as read",
                        "tags": ["Notifications"],
                        "security": auth,
                        "parameters": [{ "name": "id", "in": "path", "required": true, "schema": { "type": "integer" } }],
                        "responses": {
                            "200": { "description": "Marked" },
                            "401": unauthorized,
                            "404": { "description": "Not found or not yours" }
                        }
                    }
                },
                "/read-all": {
                    "post": {
                        "summary": "Mark every unread notification as read",
                        "tags": ["Notifications"],
                        "security": auth,
                        "responses": { "200": { "description": "Count of updated notifications" }, "401": unauthorized }
                    }
                },
                "/unread-count": {
                    "get": {
                        "summary": "Number of unread notifications",
                        "tags": ["Notifications"],
                        "security": auth,
                        "responses": { "200": { "description": "Unread count" }, "401": unauthorized }
                    }
                }
            },
            "components": {
                "schemas": {
                    "Notification": {
                        "type": "object",
                        "properties": {
                            "id": { "type": "integer" },
                            "actor": { "type": "string" },
                            "actor_id": { "type": "integer" },
                            "verb": {
                                "type": "string",
                                "enum": ["started following you", "commented on your post", "liked your post"]
                            },
                            "target_type": { "type": "string", "nullable": true },
                            "target_id": { "type": "integer", "nullable": true },
                            "read": { "type": "boolean" },
                            "timestamp": { "type": "string", "format": "date-time" }
                        },
                        "required": ["id", "actor", "actor_id", "verb", "read", "timestamp"]
                    }
                }
            }
        }))
    }

    fn migrations(&self) -> Vec<Migration> {
        vec![Migration {
            id: "001_init",
            up: r#"
                CREATE TABLE notifications (
                    id           INTEGER PRIMARY KEY AUTOINCREMENT,
                    recipient_id INTEGER NOT NULL REFERENCES users (id) ON DELETE CASCADE,
                    actor_id     INTEGER NOT NULL REFERENCES users (id) ON DELETE CASCADE,
                    verb         TEXT NOT NULL,
                    target_type  TEXT,
                    target_id    INTEGER,
                    read         INTEGER NOT NULL DEFAULT 0,
                    timestamp    TEXT NOT NULL
                );
                CREATE INDEX notifications_recipient_read ON notifications (recipient_id, read);
            "#,
        }]
    }

    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "notifications module started");
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "notifications module stopped");
        Ok(())
    }
}

/// Create a new instance of the notifications module
pub fn create_module() -> std::sync::Arc<dyn Module> {
    std::sync::Arc::new(NotificationsModule::new())
}
