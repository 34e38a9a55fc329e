//! Client for the users/posts/comments REST API.

mod client;
mod config;
mod error;
mod http;

use async_trait::async_trait;
use core_types::{Comment, Post, PostId, User, UserId};

pub use crate::client::ApiClient;
pub use crate::config::{ApiConfig, DEFAULT_BASE_URL, DEFAULT_TIMEOUT, DEFAULT_USER_AGENT};
pub use crate::error::FetchError;
pub use crate::http::{Endpoint, HttpApi};

/// The four read-only calls, each independently failable.
#[async_trait]
pub trait Api: Send + Sync {
    /// `GET /users`
    async fn users(&self) -> Result<Vec<User>, FetchError>;
    /// `GET /users/{id}`
    async fn user(&self, id: UserId) -> Result<User, FetchError>;
    /// `GET /posts?userId={id}`
    async fn user_posts(&self, id: UserId) -> Result<Vec<Post>, FetchError>;
    /// `GET /comments?postId={id}`
    async fn post_comments(&self, id: PostId) -> Result<Vec<Comment>, FetchError>;
}
