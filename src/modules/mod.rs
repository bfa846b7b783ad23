pub mod accounts;
pub mod catalog;
pub mod notifications;
pub mod posts;

use agora_kernel::ModuleRegistry;

/// Register all project-specific modules with the registry
pub fn register_all(registry: &mut ModuleRegistry) {
    registry.register_custom(accounts::create_module());
    registry.register_custom(catalog::create_module());
    registry.register_custom(posts::create_module());
    registry.register_custom(notifications::create_module());
}
