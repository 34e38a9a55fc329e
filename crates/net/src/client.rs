use core_types::{Comment, Post, PostId, User, UserId};

use crate::{Api, FetchError};

/// Call-site failure policy over an [`Api`].
///
/// Every failure is logged and downgraded: list calls yield an empty `Vec`,
/// the single-user call yields `None`. Nothing is retried.
pub struct ApiClient<A> {
    api: A,
}

impl<A: Api> ApiClient<A> {
    pub fn new(api: A) -> Self {
        Self { api }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub async fn users(&self) -> Vec<User> {
        or_empty(self.api.users().await, || "users".to_string())
    }

    pub async fn user(&self, id: UserId) -> Option<User> {
        match self.api.user(id).await {
            Ok(user) => Some(user),
            Err(err) => {
                log::warn!(target: "net", "Error fetching user {id}: {err}");
                None
            }
        }
    }

    pub async fn user_posts(&self, id: UserId) -> Vec<Post> {
        or_empty(self.api.user_posts(id).await, || format!("posts for user {id}"))
    }

    pub async fn post_comments(&self, id: PostId) -> Vec<Comment> {
        or_empty(self.api.post_comments(id).await, || {
            format!("comments for post {id}")
        })
    }
}

fn or_empty<T>(result: Result<Vec<T>, FetchError>, what: impl FnOnce() -> String) -> Vec<T> {
    result.unwrap_or_else(|err| {
        log::warn!(target: "net", "Error fetching {}: {err}", what());
        Vec::new()
    })
}
