use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::settings::Settings;

/// State handed to every route handler.
///
/// Cloning is cheap: the connection is a pool handle and settings are shared.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub settings: Arc<Settings>,
}

impl AppState {
    pub fn new(db: DatabaseConnection, settings: Settings) -> Self {
        Self {
            db,
            settings: Arc::new(settings),
        }
    }
}
