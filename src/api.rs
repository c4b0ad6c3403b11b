//! Transport wrapper around the remote REST test service.
//!
//! Each [`Gateway`] call issues exactly one request. Retry and chaining
//! live in [`crate::core`].

mod client;
pub mod model;

use async_trait::async_trait;
pub use client::HttpGateway;
pub use model::{Comment, NewPost, Post, PostDraft, User};

use crate::error::Result;

/// The three remote operations the client exercises.
#[async_trait]
pub trait Gateway: Send + Sync {
    /// `GET /users`
    async fn list_users(&self) -> Result<Vec<User>>;

    /// `POST /posts`. The returned post carries the id assigned by the remote.
    async fn create_post(&self, post: &NewPost) -> Result<Post>;

    /// `GET /comments?postId=<id>`
    async fn list_comments(&self, post_id: u64) -> Result<Vec<Comment>>;
}
