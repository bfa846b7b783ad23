use agora_authz::{entities::user, Role};
use agora_http::FieldErrors;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(required, length(min = 1, max = 150))]
    pub username: Option<String>,
    #[validate(required, length(min = 8, max = 128))]
    pub password: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(max = 500))]
    pub bio: Option<String>,
}

impl RegisterRequest {
    /// Field rules beyond what the derive expresses.
    pub fn check_username(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        if let Some(username) = &self.username {
            let allowed = |c: char| c.is_alphanumeric() || "@.+-_".contains(c);
            if !username.is_empty() && !username.chars().all(allowed) {
                errors.add(
                    "username",
                    "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters.",
                );
            }
        }
        errors
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(required)]
    pub username: Option<String>,
    #[validate(required)]
    pub password: Option<String>,
}

/// Profile changes. PUT requires `email` and `bio`; PATCH takes any subset.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct ProfileUpdate {
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(max = 500))]
    pub bio: Option<String>,
    #[validate(url)]
    pub profile_picture: Option<String>,
}

impl ProfileUpdate {
    pub fn require_full(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        if self.email.is_none() {
            errors.add("email", "This field is required.");
        }
        if self.bio.is_none() {
            errors.add("bio", "This field is required.");
        }
        errors
    }
}

/// Account details with follow counts.
#[derive(Debug, Clone, Serialize)]
pub struct Profile {
    pub id: i64,
    pub username: String,
    /// Only shown to the account owner
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub bio: String,
    pub profile_picture: Option<String>,
    pub role: Role,
    pub date_joined: DateTime<Utc>,
    pub followers_count: u64,
    pub following_count: u64,
}

impl Profile {
    pub fn new(user: user::Model, followers_count: u64, following_count: u64) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            bio: user.bio,
            profile_picture: user.profile_picture,
            role: user.role,
            date_joined: user.date_joined,
            followers_count,
            following_count,
        }
    }

    pub fn public(mut self) -> Self {
        self.email = None;
        self
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct UserSummary {
    pub id: i64,
    pub username: String,
}

impl From<user::Model> for UserSummary {
    fn from(user: user::Model) -> Self {
        Self {
            id: user.id,
            username: user.username,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub user: Profile,
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct FollowResponse {
    pub message: String,
    pub following: String,
}

#[derive(Debug, Serialize)]
pub struct UnfollowResponse {
    pub message: String,
    pub unfollowed: String,
}
