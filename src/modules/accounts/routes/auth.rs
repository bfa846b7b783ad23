use agora_authz::{token, users, users::NewUser, CurrentUser};
use agora_db::is_unique_violation;
use agora_http::{ApiJson, ApiResult, AppError, FieldErrors};
use agora_kernel::AppState;
use axum::{extract::State, http::StatusCode, Json};
use sea_orm::{DbErr, TransactionTrait};
use validator::Validate;

use super::profile_of;
use crate::modules::accounts::models::{AuthResponse, LoginRequest, RegisterRequest};

pub(super) async fn register(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<AuthResponse>)> {
    let mut errors: FieldErrors = body.validate().err().map(Into::into).unwrap_or_default();
    errors.merge(body.check_username());
    errors.into_result()?;

    let RegisterRequest {
        username,
        password,
        email,
        bio,
    } = body;
    let username = username.unwrap_or_default();

    if users::find_by_username(&state.db, &username).await?.is_some() {
        return Err(username_taken());
    }

    let txn = state.db.begin().await?;
    let created = users::create(
        &txn,
        NewUser {
            username,
            password: password.unwrap_or_default(),
            email: email.filter(|e| !e.is_empty()),
            bio: bio.unwrap_or_default(),
            ..Default::default()
        },
    )
    .await;
    let user = match created {
        Ok(user) => user,
        Err(err) if err.downcast_ref::<DbErr>().is_some_and(is_unique_violation) => {
            txn.rollback().await?;
            return Err(username_taken());
        }
        Err(err) => return Err(err.into()),
    };
    let token = token::get_or_create(&txn, user.id).await?;
    txn.commit().await?;

    let user = profile_of(&state.db, user).await?;
    Ok((StatusCode::CREATED, Json(AuthResponse { user, token })))
}

pub(super) async fn login(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<LoginRequest>,
) -> ApiResult<Json<AuthResponse>> {
    body.validate()?;
    let username = body.username.unwrap_or_default();
    let password = body.password.unwrap_or_default();

    let Some(user) = users::authenticate(&state.db, &username, &password).await? else {
        tracing::info!(%username, "login rejected");
        return Err(AppError::unauthorized("Invalid credentials"));
    };

    let token = token::get_or_create(&state.db, user.id).await?;
    tracing::info!(user_id = user.id, "user logged in");

    let user = profile_of(&state.db, user).await?;
    Ok(Json(AuthResponse { user, token }))
}

pub(super) async fn logout(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<StatusCode> {
    token::revoke(&state.db, user.id).await?;
    tracing::info!(user_id = user.id, "user logged out");
    Ok(StatusCode::NO_CONTENT)
}

fn username_taken() -> AppError {
    AppError::invalid_field("username", "A user with that username already exists.")
}
