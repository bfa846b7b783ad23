//! Token authentication extractors.

use agora_http::AppError;
use agora_kernel::AppState;
use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, HeaderValue},
};

use crate::entities::user;
use crate::permission::not_authenticated;
use crate::token;

/// The authenticated caller. Rejects with 401 when there is none.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub user::Model);

/// The caller if one authenticated. A bad token is still a 401.
#[derive(Debug, Clone)]
pub struct MaybeUser(pub Option<user::Model>);

impl FromRequestParts<AppState> for MaybeUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<CurrentUser>() {
            return Ok(MaybeUser(Some(user.0.clone())));
        }

        let Some(key) = parse_authorization(parts.headers.get(AUTHORIZATION))? else {
            return Ok(MaybeUser(None));
        };

        let user = token::resolve(&state.db, key)
            .await?
            .ok_or_else(|| AppError::unauthorized("Invalid token."))?;

        parts.extensions.insert(CurrentUser(user.clone()));
        Ok(MaybeUser(Some(user)))
    }
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let MaybeUser(user) = MaybeUser::from_request_parts(parts, state).await?;
        user.map(CurrentUser).ok_or_else(not_authenticated)
    }
}

/// Pull the key out of `Token <key>` or `Bearer <key>`.
///
/// Other schemes are ignored so they read as anonymous.
fn parse_authorization(header: Option<&HeaderValue>) -> Result<Option<&str>, AppError> {
    let Some(header) = header else {
        return Ok(None);
    };
    let value = header
        .to_str()
        .map_err(|_| AppError::unauthorized("Invalid token header."))?;

    let mut parts = value.split_whitespace();
    let scheme = parts.next().unwrap_or_default();
    if !scheme.eq_ignore_ascii_case("token") && !scheme.eq_ignore_ascii_case("bearer") {
        return Ok(None);
    }

    match (parts.next(), parts.next()) {
        (Some(key), None) => Ok(Some(key)),
        (None, _) => Err(AppError::unauthorized(
            "Invalid token header. No credentials provided.",
        )),
        (Some(_), Some(_)) => Err(AppError::unauthorized(
            "Invalid token header. Token string should not contain spaces.",
        )),
    }
}
