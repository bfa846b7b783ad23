//! Identity for Agora: users, API tokens, authentication extractors and
//! permission predicates. The `authz` core module owns the identity tables.

pub mod entities;
pub mod extract;
pub mod password;
pub mod permission;
pub mod token;
pub mod users;

use std::sync::Arc;

use agora_kernel::{InitCtx, Migration, Module};
use async_trait::async_trait;

pub use entities::user::Role;
pub use extract::{CurrentUser, MaybeUser};
pub use permission::Permission;

/// Core module owning `users` and `auth_tokens`.
pub struct AuthzModule;

#[async_trait]
impl Module for AuthzModule {
    fn name(&self) -> &'static str {
        "authz"
    }

    async fn init(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "token authentication enabled");
        Ok(())
    }

    fn migrations(&self) -> Vec<Migration> {
        vec![
            Migration {
                id: "001_users",
                up: r#"
                    CREATE TABLE users (
                        id              INTEGER PRIMARY KEY AUTOINCREMENT,
                        username        TEXT NOT NULL UNIQUE,
                        email           TEXT,
                        password_hash   TEXT NOT NULL,
                        bio             TEXT NOT NULL DEFAULT '',
                        profile_picture TEXT,
                        role            TEXT NOT NULL DEFAULT 'member',
                        date_joined     TEXT NOT NULL
                    );
                "#,
            },
            Migration {
                id: "002_auth_tokens",
                up: r#"
                    CREATE TABLE auth_tokens (
                        key        TEXT PRIMARY KEY,
                        user_id    INTEGER NOT NULL UNIQUE REFERENCES users (id) ON DELETE CASCADE,
                        created_at TEXT NOT NULL
                    );
                "#,
            },
        ]
    }
}

/// Create a new instance of the authz core module
pub fn create_module() -> Arc<dyn Module> {
    Arc::new(AuthzModule)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::users::NewUser;

    async fn db() -> sea_orm::DatabaseConnection {
        let db = agora_db::connect_in_memory().await.unwrap();
        let migrations: Vec<(String, Migration)> = AuthzModule
            .migrations()
            .into_iter()
            .map(|m| ("authz".to_string(), m))
            .collect();
        agora_db::migrate(&db, &migrations).await.unwrap();
        db
    }

    fn alice() -> NewUser {
        NewUser {
            username: "alice".into(),
            password: "wonderland".into(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn register_login_and_resolve_token() {
        let db = db().await;
        let user = users::create(&db, alice()).await.unwrap();
        assert_eq!(user.role, Role::Member);

        assert!(users::authenticate(&db, "alice", "wonderland")
            .await
            .unwrap()
            .is_some());
        assert!(users::authenticate(&db, "alice", "looking-glass")
            .await
            .unwrap()
            .is_none());

        let key = token::get_or_create(&db, user.id).await.unwrap();
        assert_eq!(token::get_or_create(&db, user.id).await.unwrap(), key);

        let resolved = token::resolve(&db, &key).await.unwrap().unwrap();
        assert_eq!(resolved.id, user.id);

        assert!(token::revoke(&db, user.id).await.unwrap());
        assert!(token::resolve(&db, &key).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn duplicate_username_surfaces_as_unique_violation() {
        let db = db().await;
        users::create(&db, alice()).await.unwrap();

        let err = users::create(&db, alice()).await.unwrap_err();
        let db_err = err.downcast_ref::<sea_orm::DbErr>().unwrap();
        assert!(agora_db::is_unique_violation(db_err));
    }

    #[tokio::test]
    async fn promote_changes_role() {
        let db = db().await;
        users::create(&db, alice()).await.unwrap();

        let updated = users::set_role(&db, "alice", Role::Librarian)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.role, Role::Librarian);
        assert!(users::set_role(&db, "nobody", Role::Admin)
            .await
            .unwrap()
            .is_none());
    }
}
