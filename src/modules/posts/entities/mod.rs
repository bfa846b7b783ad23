pub mod comment;
pub mod like;
pub mod post;

pub use comment::Entity as Comment;
pub use like::Entity as Like;
pub use post::Entity as Post;
