//! Identity tables owned by the authz core module.

pub mod auth_token;
pub mod user;

pub use auth_token::Entity as AuthToken;
pub use user::Entity as User;
