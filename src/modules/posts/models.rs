use agora_http::FieldErrors;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::entities::comment;

/// Post payload; PUT requires both fields, PATCH either.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct PostInput {
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    #[validate(length(min = 1))]
    pub content: Option<String>,
}

/// Comment payload. `post` is required on create.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct CommentInput {
    pub post: Option<i64>,
    #[validate(length(min = 1))]
    pub content: Option<String>,
}

/// Validate `input` and, unless `partial`, require every listed field.
pub fn field_errors<T: Validate>(input: &T, required: &[(&str, bool)], partial: bool) -> FieldErrors {
    let mut errors: FieldErrors = input.validate().err().map(Into::into).unwrap_or_default();
    if !partial {
        for (field, present) in required {
            if !present {
                errors.add(*field, "This field is required.");
            }
        }
    }
    errors
}

#[derive(Debug, Clone, Serialize)]
pub struct Comment {
    pub id: i64,
    pub post: i64,
    /// Author's username
    pub author: String,
    pub author_id: i64,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Comment {
    pub fn new(model: comment::Model, author: String) -> Self {
        Self {
            id: model.id,
            post: model.post_id,
            author,
            author_id: model.author_id,
            content: model.content,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Post {
    pub id: i64,
    /// Author's username
    pub author: String,
    pub author_id: i64,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub comments: Vec<Comment>,
    pub comments_count: u64,
    pub likes_count: u64,
    /// Whether the requesting user likes this post; false for anonymous callers
    pub liked_by_user: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PostSearch {
    pub search: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CommentFilter {
    pub post: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct Message {
    pub message: &'static str,
}
