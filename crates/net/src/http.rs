use std::time::Instant;

use async_trait::async_trait;
use core_types::{Comment, Post, PostId, User, UserId};
use serde::de::DeserializeOwned;
use url::Url;

use crate::{Api, ApiConfig, FetchError};

/// The four read-only resources the page knows how to ask for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Endpoint {
    Users,
    User(UserId),
    UserPosts(UserId),
    PostComments(PostId),
}

impl Endpoint {
    pub fn url(&self, base: &Url) -> Result<Url, FetchError> {
        let mut url = base.clone();
        url.set_query(None);
        url.set_fragment(None);
        {
            let mut segments = url.path_segments_mut().map_err(|_| FetchError::Url {
                base: base.to_string(),
            })?;
            segments.pop_if_empty();
            match self {
                Endpoint::Users => {
                    segments.push("users");
                }
                Endpoint::User(id) => {
                    segments.push("users").push(&id.to_string());
                }
                Endpoint::UserPosts(_) => {
                    segments.push("posts");
                }
                Endpoint::PostComments(_) => {
                    segments.push("comments");
                }
            }
        }
        match self {
            Endpoint::UserPosts(id) => {
                url.query_pairs_mut().append_pair("userId", &id.to_string());
            }
            Endpoint::PostComments(id) => {
                url.query_pairs_mut().append_pair("postId", &id.to_string());
            }
            Endpoint::Users | Endpoint::User(_) => {}
        }
        Ok(url)
    }
}

/// [`Api`] over HTTP with `reqwest`.
pub struct HttpApi {
    client: reqwest::Client,
    base: Url,
}

impl HttpApi {
    pub fn new(config: &ApiConfig) -> Result<Self, FetchError> {
        let base = Url::parse(&config.base_url).map_err(|_| FetchError::Url {
            base: config.base_url.clone(),
        })?;
        if base.cannot_be_a_base() {
            return Err(FetchError::Url {
                base: config.base_url.clone(),
            });
        }
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(FetchError::Client)?;
        Ok(Self { client, base })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    async fn get_json<T: DeserializeOwned>(&self, endpoint: Endpoint) -> Result<T, FetchError> {
        let url = endpoint.url(&self.base)?;
        let start = Instant::now();
        log::debug!(target: "net", "GET {url}");

        let resp = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|source| FetchError::Transport {
                url: url.to_string(),
                source,
            })?;
        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        let body = resp.bytes().await.map_err(|source| FetchError::Transport {
            url: url.to_string(),
            source,
        })?;
        log::debug!(
            target: "net",
            "GET {url} -> {} ({} bytes, {} ms)",
            status.as_u16(),
            body.len(),
            start.elapsed().as_millis()
        );

        serde_json::from_slice(&body).map_err(|source| FetchError::Decode {
            url: url.to_string(),
            source,
        })
    }
}

#[async_trait]
impl Api for HttpApi {
    async fn users(&self) -> Result<Vec<User>, FetchError> {
        self.get_json(Endpoint::Users).await
    }

    async fn user(&self, id: UserId) -> Result<User, FetchError> {
        self.get_json(Endpoint::User(id)).await
    }

    async fn user_posts(&self, id: UserId) -> Result<Vec<Post>, FetchError> {
        self.get_json(Endpoint::UserPosts(id)).await
    }

    async fn post_comments(&self, id: PostId) -> Result<Vec<Comment>, FetchError> {
        self.get_json(Endpoint::PostComments(id)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn builds_resource_urls() {
        let base = base("https://jsonplaceholder.typicode.com");
        assert_eq!(
            Endpoint::Users.url(&base).unwrap().as_str(),
            "https://jsonplaceholder.typicode.com/users"
        );
        assert_eq!(
            Endpoint::User(UserId(3)).url(&base).unwrap().as_str(),
            "https://jsonplaceholder.typicode.com/users/3"
        );
        assert_eq!(
            Endpoint::UserPosts(UserId(1)).url(&base).unwrap().as_str(),
            "https://jsonplaceholder.typicode.com/posts?userId=1"
        );
        assert_eq!(
            Endpoint::PostComments(PostId(7)).url(&base).unwrap().as_str(),
            "https://jsonplaceholder.typicode.com/comments?postId=7"
        );
    }

    #[test]
    fn keeps_base_path_prefix() {
        let base = base("http://localhost:8080/api/v1/?stale=1");
        assert_eq!(
            Endpoint::UserPosts(UserId(2)).url(&base).unwrap().as_str(),
            "http://localhost:8080/api/v1/posts?userId=2"
        );
    }

    #[test]
    fn rejects_unusable_base_urls() {
        let config = ApiConfig::default().with_base_url("not a url");
        assert!(matches!(HttpApi::new(&config), Err(FetchError::Url { .. })));

        let config = ApiConfig::default().with_base_url("mailto:someone@example.com");
        assert!(matches!(HttpApi::new(&config), Err(FetchError::Url { .. })));
    }
}
