use agora_authz::CurrentUser;
use agora_http::{ApiJson, ApiResult, FieldErrors};
use agora_kernel::AppState;
use axum::{
    extract::{Path, State},
    http::Method,
    Json,
};
use sea_orm::{ActiveModelTrait, ActiveValue::Set, IntoActiveModel};
use validator::Validate;

use super::{find_user, profile_of};
use crate::modules::accounts::models::{Profile, ProfileUpdate};

pub(super) async fn me(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Json<Profile>> {
    Ok(Json(profile_of(&state.db, user).await?))
}

/// PUT replaces `email` and `bio`; PATCH changes only what is sent.
pub(super) async fn update_me(
    State(state): State<AppState>,
    method: Method,
    CurrentUser(user): CurrentUser,
    ApiJson(body): ApiJson<ProfileUpdate>,
) -> ApiResult<Json<Profile>> {
    let mut errors: FieldErrors = body.validate().err().map(Into::into).unwrap_or_default();
    if method == Method::PUT {
        errors.merge(body.require_full());
    }
    errors.into_result()?;

    let mut active = user.into_active_model();
    if let Some(email) = body.email {
        active.email = Set(Some(email).filter(|e| !e.is_empty()));
    }
    if let Some(bio) = body.bio {
        active.bio = Set(bio);
    }
    if let Some(picture) = body.profile_picture {
        active.profile_picture = Set(Some(picture));
    }
    let user = active.update(&state.db).await?;

    Ok(Json(profile_of(&state.db, user).await?))
}

pub(super) async fn public_profile(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Profile>> {
    let user = find_user(&state.db, id).await?;
    Ok(Json(profile_of(&state.db, user).await?.public()))
}
