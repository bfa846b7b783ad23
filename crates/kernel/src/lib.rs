//! Agora kernel: the module contract, its lifecycle registry, layered
//! settings and the state shared by every request handler.

pub mod module;
pub mod registry;
pub mod settings;
pub mod state;

pub use module::{InitCtx, Migration, Module};
pub use registry::ModuleRegistry;
pub use settings::Settings;
pub use state::AppState;
