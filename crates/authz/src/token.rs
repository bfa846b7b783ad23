//! Opaque API tokens: one per user, created on register/login, revoked on
//! logout.

use rand::RngCore;
use sea_orm::{
    sea_query::OnConflict, ActiveValue::Set, ColumnTrait, ConnectionTrait, DbErr, EntityTrait,
    QueryFilter,
};

use crate::entities::{auth_token, user, AuthToken, User};

/// Length of a token key in hex characters.
pub const KEY_LEN: usize = 40;

/// Generate a fresh random key.
pub fn generate_key() -> String {
    let mut bytes = [0u8; KEY_LEN / 2];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Return the user's token, creating one if none exists.
pub async fn get_or_create<C: ConnectionTrait>(conn: &C, user_id: i64) -> Result<String, DbErr> {
    let candidate = auth_token::ActiveModel {
        key: Set(generate_key()),
        user_id: Set(user_id),
        created_at: Set(chrono::Utc::now()),
    };

    // A concurrent login may have inserted first; the unique user_id keeps one.
    AuthToken::insert(candidate)
        .on_conflict(
            OnConflict::column(auth_token::Column::UserId)
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(conn)
        .await?;

    let token = AuthToken::find()
        .filter(auth_token::Column::UserId.eq(user_id))
        .one(conn)
        .await?
        .ok_or_else(|| DbErr::RecordNotFound(format!("token for user {user_id}")))?;

    Ok(token.key)
}

/// Delete the user's token. Returns whether one existed.
pub async fn revoke<C: ConnectionTrait>(conn: &C, user_id: i64) -> Result<bool, DbErr> {
    let result = AuthToken::delete_many()
        .filter(auth_token::Column::UserId.eq(user_id))
        .exec(conn)
        .await?;
    Ok(result.rows_affected > 0)
}

/// Look up the user owning `key`.
pub async fn resolve<C: ConnectionTrait>(
    conn: &C,
    key: &str,
) -> Result<Option<user::Model>, DbErr> {
    let found = AuthToken::find_by_id(key.to_string())
        .find_also_related(User)
        .one(conn)
        .await?;
    Ok(found.and_then(|(_, user)| user))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_forty_lowercase_hex_chars() {
        let key = generate_key();
        assert_eq!(key.len(), KEY_LEN);
        assert!(key
            .chars()
            .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
        assert_ne!(key, generate_key());
    }
}
