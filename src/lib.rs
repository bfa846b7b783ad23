//! Agora application library
//!
//! Wires the core modules and the domain modules (accounts, catalog, posts,
//! notifications) into a registry and brings them up against a database.

#![recursion_limit = "256"]

pub mod modules;
pub mod utils;

use agora_kernel::{AppState, InitCtx, ModuleRegistry, Settings};
use anyhow::Context;
use sea_orm::DatabaseConnection;

/// Registry with every core and domain module.
pub fn build_registry() -> ModuleRegistry {
    let mut registry = ModuleRegistry::new();
    registry.register_core(agora_db::create_module());
    registry.register_core(agora_authz::create_module());
    modules::register_all(&mut registry);
    registry
}

/// Initialize modules, apply pending migrations, then start modules.
pub async fn bring_up(
    registry: &ModuleRegistry,
    db: &DatabaseConnection,
    settings: &Settings,
) -> anyhow::Result<()> {
    let ctx = InitCtx { settings, db };

    registry.init_core_modules(&ctx).await?;
    registry.init_custom_modules(&ctx).await?;

    let applied = agora_db::migrate(db, &registry.collect_migrations())
        .await
        .context("failed to apply migrations")?;
    tracing::info!(applied, "migrations complete");

    registry.start_core_modules(&ctx).await?;
    registry.start_custom_modules(&ctx).await?;
    Ok(())
}

/// Connect to the configured database and bring every module up.
pub async fn bootstrap(settings: Settings) -> anyhow::Result<(ModuleRegistry, AppState)> {
    let db = agora_db::connect(&settings.database).await?;
    bootstrap_with(db, settings).await
}

/// Same as [`bootstrap`] over an existing connection.
pub async fn bootstrap_with(
    db: DatabaseConnection,
    settings: Settings,
) -> anyhow::Result<(ModuleRegistry, AppState)> {
    let registry = build_registry();
    bring_up(&registry, &db, &settings).await?;
    Ok((registry, AppState::new(db, settings)))
}

/// Stop modules in reverse order.
pub async fn shut_down(registry: &ModuleRegistry) -> anyhow::Result<()> {
    registry.stop_custom_modules().await?;
    registry.stop_core_modules().await?;
    Ok(())
}
