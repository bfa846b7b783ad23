//! Applies module migrations exactly once, recording them in `schema_migrations`.

use std::collections::HashSet;

use agora_kernel::Migration;
use anyhow::Context;
use sea_orm::{ConnectionTrait, DatabaseConnection, Statement, TransactionTrait};

const CREATE_LEDGER: &str = r#"
    CREATE TABLE IF NOT EXISTS schema_migrations (
        module     TEXT NOT NULL,
        id         TEXT NOT NULL,
        applied_at TEXT NOT NULL,
        PRIMARY KEY (module, id)
    )
"#;

/// Run every migration not yet recorded. Returns how many were applied.
///
/// Each migration runs in its own transaction together with its ledger row.
pub async fn migrate(
    db: &DatabaseConnection,
    migrations: &[(String, Migration)],
) -> anyhow::Result<usize> {
    db.execute_unprepared(CREATE_LEDGER)
        .await
        .context("failed to create migration ledger")?;

    let applied = applied_migrations(db).await?;
    let backend = db.get_database_backend();
    let mut count = 0;

    for (module, migration) in migrations {
        if applied.contains(&(module.clone(), migration.id.to_string())) {
            tracing::debug!(
                target: "agora-db",
                module = %module,
                id = migration.id,
                "migration already applied"
            );
            continue;
        }

        let txn = db.begin().await?;
        for statement in split_statements(migration.up) {
            txn.execute_unprepared(statement)
                .await
                .with_context(|| format!("migration {module}/{} failed", migration.id))?;
        }
        txn.execute(Statement::from_sql_and_values(
            backend,
            "INSERT INTO schema_migrations (module, id, applied_at) VALUES (?, ?, ?)",
            [
                module.clone().into(),
                migration.id.into(),
                chrono::Utc::now().to_rfc3339().into(),
            ],
        ))
        .await?;
        txn.commit().await?;

        tracing::info!(target: "agora-db", module = %module, id = migration.id, "migration applied");
        count += 1;
    }

    Ok(count)
}

async fn applied_migrations(
    db: &DatabaseConnection,
) -> anyhow::Result<HashSet<(String, String)>> {
    let rows = db
        .query_all(Statement::from_string(
            db.get_database_backend(),
            "SELECT module, id FROM schema_migrations",
        ))
        .await
        .context("failed to read migration ledger")?;

    rows.iter()
        .map(|row| {
            let module: String = row.try_get("", "module")?;
            let id: String = row.try_get("", "id")?;
            Ok::<_, anyhow::Error>((module, id))
        })
        .collect()
}

fn split_statements(sql: &str) -> impl Iterator<Item = &str> {
    sql.split(';').map(str::trim).filter(|s| !s.is_empty())
}
