//! User records: creation, credential checks and role changes.

use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait, DbErr, EntityTrait,
    IntoActiveModel, QueryFilter,
};

use crate::entities::user::{self, Role};
use crate::entities::User;
use crate::password;

/// Fields needed to create an account.
#[derive(Debug, Clone, Default)]
pub struct NewUser {
    pub username: String,
    pub password: String,
    pub email: Option<String>,
    pub bio: String,
    pub role: Role,
}

/// Insert a user with a freshly hashed password.
pub async fn create<C: ConnectionTrait>(conn: &C, new: NewUser) -> anyhow::Result<user::Model> {
    let password_hash = password::hash_password(&new.password)?;
    let model = user::ActiveModel {
        username: Set(new.username),
        email: Set(new.email),
        password_hash: Set(password_hash),
        bio: Set(new.bio),
        profile_picture: Set(None),
        role: Set(new.role),
        date_joined: Set(chrono::Utc::now()),
        ..Default::default()
    }
    .insert(conn)
    .await?;

    tracing::info!(target: "agora-authz", user_id = model.id, username = %model.username, "user created");
    Ok(model)
}

pub async fn find_by_username<C: ConnectionTrait>(
    conn: &C,
    username: &str,
) -> Result<Option<user::Model>, DbErr> {
    User::find()
        .filter(user::Column::Username.eq(username))
        .one(conn)
        .await
}

/// Return the user when the username exists and the password matches.
pub async fn authenticate<C: ConnectionTrait>(
    conn: &C,
    username: &str,
    password: &str,
) -> Result<Option<user::Model>, DbErr> {
    let user = find_by_username(conn, username).await?;
    Ok(user.filter(|u| password::verify_password(password, &u.password_hash)))
}

/// Change a user's role. `None` when the username is unknown.
pub async fn set_role<C: ConnectionTrait>(
    conn: &C,
    username: &str,
    role: Role,
) -> Result<Option<user::Model>, DbErr> {
    let Some(existing) = find_by_username(conn, username).await? else {
        return Ok(None);
    };
    let mut active = existing.into_active_model();
    active.role = Set(role);
    let updated = active.update(conn).await?;

    tracing::info!(target: "agora-authz", user_id = updated.id, role = ?updated.role, "role changed");
    Ok(Some(updated))
}
