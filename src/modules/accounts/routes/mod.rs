//! Account routes: registration, tokens, profiles and the follow graph.

mod auth;
mod follow;
mod profile;

use agora_authz::entities::{user, User};
use agora_http::AppError;
use agora_kernel::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use sea_orm::{ColumnTrait, ConnectionTrait, DbErr, EntityTrait, PaginatorTrait, QueryFilter};

use super::entities::{Column, Entity as Follows};
use super::models::Profile;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        .route(
            "/profile",
            get(profile::me)
                .put(profile::update_me)
                .patch(profile::update_me),
        )
        .route("/users/{id}", get(profile::public_profile))
        .route("/follow/{user_id}", post(follow::follow))
        .route("/unfollow/{user_id}", post(follow::unfollow))
        .route("/followers", get(follow::followers))
        .route("/following", get(follow::following))
}

async fn find_user<C: ConnectionTrait>(conn: &C, id: i64) -> Result<user::Model, AppError> {
    User::find_by_id(id)
        .one(conn)
        .await?
        .ok_or_else(|| AppError::not_found("No user matches the given query."))
}

async fn profile_of<C: ConnectionTrait>(conn: &C, user: user::Model) -> Result<Profile, DbErr> {
    let followers = Follows::find()
        .filter(Column::FolloweeId.eq(user.id))
        .count(conn)
        .await?;
    let following = Follows::find()
        .filter(Column::FollowerId.eq(user.id))
        .count(conn)
        .await?;
    Ok(Profile::new(user, followers, following))
}
