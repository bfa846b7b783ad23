//! Post, comment, like and feed routes.

mod comments;
mod posts;
mod social;

use agora_http::{AppError, PageRequest};
use agora_kernel::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use sea_orm::{
    ConnectionTrait, EntityTrait, FromQueryResult, PaginatorTrait, QuerySelect, Select,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(posts::list_posts).post(posts::create_post))
        .route("/feed", get(social::feed))
        .route(
            "/comments",
            get(comments::list_comments).post(comments::create_comment),
        )
        .route(
            "/comments/{id}",
            get(comments::get_comment)
                .put(comments::update_comment)
                .patch(comments::update_comment)
                .delete(comments::delete_comment),
        )
        .route(
            "/{id}",
            get(posts::get_post)
                .put(posts::update_post)
                .patch(posts::update_post)
                .delete(posts::delete_post),
        )
        .route("/{id}/like", post(social::like))
        .route("/{id}/unlike", post(social::unlike))
}

/// Count the full result, reject out-of-range pages, then fetch one page.
async fn page_of<C, E>(
    conn: &C,
    select: Select<E>,
    request: PageRequest,
) -> Result<(Vec<E::Model>, u64), AppError>
where
    C: ConnectionTrait,
    E: EntityTrait,
    E::Model: FromQueryResult + Send + Sync,
{
    let count = select.clone().count(conn).await?;
    request.ensure_in_range(count)?;

    let rows = select
        .offset(request.offset())
        .limit(request.limit())
        .all(conn)
        .await?;
    Ok((rows, count))
}
