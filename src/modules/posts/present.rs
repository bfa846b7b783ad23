//! Turns post and comment rows into their JSON shapes, batching the lookups
//! for authors, comments and likes.

use std::collections::{HashMap, HashSet};

use agora_authz::entities::{user, User};
use sea_orm::{ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder};

use super::entities::{comment, like, post, Comment as Comments, Like as Likes};
use super::models::{Comment, Post};

async fn usernames<C: ConnectionTrait>(
    conn: &C,
    ids: HashSet<i64>,
) -> Result<HashMap<i64, String>, DbErr> {
    let users = User::find()
        .filter(user::Column::Id.is_in(ids))
        .all(conn)
        .await?;
    Ok(users.into_iter().map(|u| (u.id, u.username)).collect())
}

pub async fn comments<C: ConnectionTrait>(
    conn: &C,
    rows: Vec<comment::Model>,
) -> Result<Vec<Comment>, DbErr> {
    let names = usernames(conn, rows.iter().map(|c| c.author_id).collect()).await?;
    Ok(rows
        .into_iter()
        .map(|c| {
            let author = names.get(&c.author_id).cloned().unwrap_or_default();
            Comment::new(c, author)
        })
        .collect())
}

/// Build post bodies; `viewer` decides `liked_by_user`.
pub async fn posts<C: ConnectionTrait>(
    conn: &C,
    rows: Vec<post::Model>,
    viewer: Option<i64>,
) -> Result<Vec<Post>, DbErr> {
    let post_ids: Vec<i64> = rows.iter().map(|p| p.id).collect();

    let comment_rows = Comments::find()
        .filter(comment::Column::PostId.is_in(post_ids.clone()))
        .order_by_asc(comment::Column::CreatedAt)
        .order_by_asc(comment::Column::Id)
        .all(conn)
        .await?;
    let likes = Likes::find()
        .filter(like::Column::PostId.is_in(post_ids))
        .all(conn)
        .await?;

    let mut like_counts: HashMap<i64, u64> = HashMap::new();
    let mut liked: HashSet<i64> = HashSet::new();
    for like in &likes {
        *like_counts.entry(like.post_id).or_default() += 1;
        if Some(like.user_id) == viewer {
            liked.insert(like.post_id);
        }
    }

    let mut by_post: HashMap<i64, Vec<Comment>> = HashMap::new();
    for comment in comments(conn, comment_rows).await? {
        by_post.entry(comment.post).or_default().push(comment);
    }

    let names = usernames(conn, rows.iter().map(|p| p.author_id).collect()).await?;

    Ok(rows
        .into_iter()
        .map(|p| {
            let comments = by_post.remove(&p.id).unwrap_or_default();
            Post {
                id: p.id,
                author: names.get(&p.author_id).cloned().unwrap_or_default(),
                author_id: p.author_id,
                title: p.title,
                content: p.content,
                created_at: p.created_at,
                updated_at: p.updated_at,
                comments_count: comments.len() as u64,
                comments,
                likes_count: like_counts.get(&p.id).copied().unwrap_or_default(),
                liked_by_user: liked.contains(&p.id),
            }
        })
        .collect())
}

pub async fn post<C: ConnectionTrait>(
    conn: &C,
    row: post::Model,
    viewer: Option<i64>,
) -> Result<Post, DbErr> {
    let mut built = posts(conn, vec![row], viewer).await?;
    built
        .pop()
        .ok_or_else(|| DbErr::RecordNotFound("post vanished while loading".to_string()))
}
