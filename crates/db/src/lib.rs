//! Database bootstrap for Agora: connection pool, migrations, and the `db`
//! core module.

pub mod migrate;

use std::sync::Arc;
use std::time::Duration;

use agora_kernel::settings::DatabaseSettings;
use agora_kernel::{InitCtx, Module};
use anyhow::Context;
use async_trait::async_trait;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr, SqlErr};
use tracing::log::LevelFilter;

pub use migrate::migrate;

/// Open a connection pool using the configured URL.
pub async fn connect(settings: &DatabaseSettings) -> anyhow::Result<DatabaseConnection> {
    let mut opt = ConnectOptions::new(&settings.url);

    opt.max_connections(settings.max_connections)
        .min_connections(settings.min_connections)
        .connect_timeout(Duration::from_secs(10))
        .acquire_timeout(Duration::from_secs(10))
        .sqlx_logging(settings.sqlx_logging)
        .sqlx_logging_level(LevelFilter::Debug);

    let db = Database::connect(opt)
        .await
        .with_context(|| format!("failed to connect to database at '{}'", settings.url))?;

    tracing::info!(target: "agora-db", url = %settings.url, "database connected");
    Ok(db)
}

/// Open a private in-memory database, mostly for tests and dry runs.
pub async fn connect_in_memory() -> anyhow::Result<DatabaseConnection> {
    connect(&DatabaseSettings::in_memory()).await
}

/// Whether `err` is a UNIQUE constraint failure, e.g. a check-then-insert
/// that lost a race.
pub fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

/// Core module that verifies the database is reachable during startup.
pub struct DbModule;

#[async_trait]
impl Module for DbModule {
    fn name(&self) -> &'static str {
        "db"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        ctx.db.ping().await.context("database ping failed")?;
        tracing::info!(
            module = self.name(),
            backend = ?ctx.db.get_database_backend(),
            "database reachable"
        );
        Ok(())
    }
}

/// Create a new instance of the db core module
pub fn create_module() -> Arc<dyn Module> {
    Arc::new(DbModule)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn duplicate_key_is_a_unique_violation() {
        let db = connect_in_memory().await.unwrap();
        db.execute_unprepared("CREATE TABLE shelves (name TEXT NOT NULL UNIQUE)")
            .await
            .unwrap();
        db.execute_unprepared("INSERT INTO shelves (name) VALUES ('fiction')")
            .await
            .unwrap();

        let err = db
            .execute_unprepared("INSERT INTO shelves (name) VALUES ('fiction')")
            .await
            .unwrap_err();
        assert!(is_unique_violation(&err));

        let other = db
            .execute_unprepared("INSERT INTO missing_table (name) VALUES ('x')")
            .await
            .unwrap_err();
        assert!(!is_unique_violation(&other));
    }
}
