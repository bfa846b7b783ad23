//! Permission predicates evaluated by route handlers.
//!
//! A missing principal is always a 401; a principal that fails the check is a
//! 403.

use agora_http::AppError;
use axum::http::Method;

use crate::entities::user::{self, Role};

/// Roles allowed to manage libraries and their librarians.
pub const LIBRARY_STAFF: &[Role] = &[Role::Librarian];

/// Request-level permission.
#[derive(Debug, Clone, Copy)]
pub enum Permission {
    AllowAny,
    IsAuthenticated,
    IsAuthenticatedOrReadOnly,
    /// Admins always pass.
    HasRole(&'static [Role]),
}

pub fn is_safe(method: &Method) -> bool {
    matches!(*method, Method::GET | Method::HEAD | Method::OPTIONS)
}

impl Permission {
    pub fn check(&self, method: &Method, user: Option<&user::Model>) -> Result<(), AppError> {
        match self {
            Permission::AllowAny => Ok(()),
            Permission::IsAuthenticatedOrReadOnly if is_safe(method) => Ok(()),
            Permission::IsAuthenticated | Permission::IsAuthenticatedOrReadOnly => {
                require_user(user).map(|_| ())
            }
            Permission::HasRole(roles) => {
                let user = require_user(user)?;
                if user.role == Role::Admin || roles.contains(&user.role) {
                    Ok(())
                } else {
                    Err(AppError::forbidden(
                        "You do not have permission to perform this action.",
                    ))
                }
            }
        }
    }
}

/// Object-level check: safe methods pass, otherwise `user` must own the object.
pub fn is_author_or_read_only(
    method: &Method,
    user: &user::Model,
    owner_id: i64,
) -> Result<(), AppError> {
    if is_safe(method) || user.id == owner_id {
        Ok(())
    } else {
        Err(AppError::forbidden(
            "You do not have permission to perform this action.",
        ))
    }
}

fn require_user(user: Option<&user::Model>) -> Result<&user::Model, AppError> {
    user.ok_or_else(not_authenticated)
}

pub(crate) fn not_authenticated() -> AppError {
    AppError::unauthorized("Authentication credentials were not provided.")
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    fn user(id: i64, role: Role) -> user::Model {
        user::Model {
            id,
            username: format!("user{id}"),
            email: None,
            password_hash: String::new(),
            bio: String::new(),
            profile_picture: None,
            role,
            date_joined: chrono::Utc::now(),
        }
    }

    #[test]
    fn read_only_lets_anonymous_read_but_not_write() {
        let p = Permission::IsAuthenticatedOrReadOnly;
        assert!(p.check(&Method::GET, None).is_ok());
        assert!(p.check(&Method::HEAD, None).is_ok());

        let err = p.check(&Method::POST, None).unwrap_err();
        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);

        let member = user(1, Role::Member);
        assert!(p.check(&Method::DELETE, Some(&member)).is_ok());
    }

    #[test]
    fn authenticated_required_even_for_reads() {
        let p = Permission::IsAuthenticated;
        assert!(p.check(&Method::GET, None).is_err());
        assert!(p.check(&Method::GET, Some(&user(1, Role::Member))).is_ok());
        assert!(Permission::AllowAny.check(&Method::POST, None).is_ok());
    }

    #[test]
    fn roles_gate_members_out() {
        let p = Permission::HasRole(LIBRARY_STAFF);
        assert_eq!(
            p.check(&Method::POST, Some(&user(1, Role::Member)))
                .unwrap_err()
                .status(),
            StatusCode::FORBIDDEN
        );
        assert!(p.check(&Method::POST, Some(&user(2, Role::Librarian))).is_ok());
        assert!(p.check(&Method::POST, Some(&user(3, Role::Admin))).is_ok());
        assert_eq!(
            p.check(&Method::POST, None).unwrap_err().status(),
            StatusCode::UNAUTHORIZED
        );
    }

    #[test]
    fn only_the_author_may_modify() {
        let author = user(7, Role::Member);
        let other = user(8, Role::Member);

        assert!(is_author_or_read_only(&Method::PUT, &author, 7).is_ok());
        assert!(is_author_or_read_only(&Method::GET, &other, 7).is_ok());
        assert_eq!(
            is_author_or_read_only(&Method::PATCH, &other, 7)
                .unwrap_err()
                .status(),
            StatusCode::FORBIDDEN
        );
    }
}
