//! Shared fixtures for page tests: a scripted [`Api`] and DOM snapshot helpers.

use async_trait::async_trait;
use core_types::{Comment, CommentId, Company, Post, PostId, User, UserId};
use dom::dom_snapshot::{DomSnapshot, DomSnapshotOptions};
use dom::{Document, NodeKey};
use net::{Api, Endpoint, FetchError};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, Once};
use std::time::Duration;

static INIT: Once = Once::new();

/// Route `log` output through `env_logger` in test mode; safe to call from every test.
pub fn init_test_logging() {
    INIT.call_once(|| {
        let _ = env_logger::builder().is_test(true).try_init();
    });
}

pub fn user(id: u64, name: &str, company: &str, catch_phrase: &str) -> User {
    User {
        id: UserId(id),
        name: name.to_string(),
        username: None,
        email: None,
        company: Company {
            name: company.to_string(),
            catch_phrase: catch_phrase.to_string(),
        },
    }
}

pub fn post(id: u64, user_id: u64, title: &str) -> Post {
    Post {
        id: PostId(id),
        user_id: UserId(user_id),
        title: title.to_string(),
        body: format!("body of {title}"),
    }
}

pub fn comment(id: u64, post_id: u64, name: &str) -> Comment {
    Comment {
        id: CommentId(id),
        post_id: PostId(post_id),
        name: name.to_string(),
        email: format!("{}@example.test", name.to_ascii_lowercase()),
        body: format!("{name} says hi"),
    }
}

#[derive(Default)]
struct FakeState {
    users: Vec<User>,
    posts: Vec<Post>,
    comments: Vec<Comment>,
    failing: Vec<Endpoint>,
    fail_everything: bool,
    author_delays: HashMap<UserId, Duration>,
    calls: Vec<Endpoint>,
}

/// In-memory [`Api`] with injectable failures and per-author latency.
///
/// Clones share state, so a test can keep a handle while the controller owns another.
#[derive(Clone, Default)]
pub struct FakeApi {
    state: Arc<Mutex<FakeState>>,
}

impl FakeApi {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().expect("fake api state poisoned")
    }

    pub fn with_users(self, users: impl IntoIterator<Item = User>) -> Self {
        self.state().users.extend(users);
        self
    }

    pub fn with_posts(self, posts: impl IntoIterator<Item = Post>) -> Self {
        self.state().posts.extend(posts);
        self
    }

    pub fn with_comments(self, comments: impl IntoIterator<Item = Comment>) -> Self {
        self.state().comments.extend(comments);
        self
    }

    /// Make exactly this call fail with a 503.
    pub fn failing(self, endpoint: Endpoint) -> Self {
        self.state().failing.push(endpoint);
        self
    }

    /// Make every call fail, as if the network were down.
    pub fn offline(self) -> Self {
        self.state().fail_everything = true;
        self
    }

    /// Delay `GET /users/{id}` by `delay`.
    pub fn with_author_delay(self, id: u64, delay: Duration) -> Self {
        self.state().author_delays.insert(UserId(id), delay);
        self
    }

    /// Calls seen so far, in order.
    pub fn calls(&self) -> Vec<Endpoint> {
        self.state().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.state().calls.clear();
    }

    fn record(&self, endpoint: Endpoint) -> Result<(), FetchError> {
        let mut state = self.state();
        state.calls.push(endpoint);
        if state.fail_everything || state.failing.contains(&endpoint) {
            return Err(FetchError::Status {
                url: format!("fake://{endpoint:?}"),
                status: 503,
            });
        }
        Ok(())
    }
}

#[async_trait]
impl Api for FakeApi {
    async fn users(&self) -> Result<Vec<User>, FetchError> {
        self.record(Endpoint::Users)?;
        Ok(self.state().users.clone())
    }

    async fn user(&self, id: UserId) -> Result<User, FetchError> {
        self.record(Endpoint::User(id))?;
        let delay = self.state().author_delays.get(&id).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        let found = self.state().users.iter().find(|u| u.id == id).cloned();
        found.ok_or(FetchError::Status {
            url: format!("fake://users/{id}"),
            status: 404,
        })
    }

    async fn user_posts(&self, id: UserId) -> Result<Vec<Post>, FetchError> {
        self.record(Endpoint::UserPosts(id))?;
        Ok(self
            .state()
            .posts
            .iter()
            .filter(|p| p.user_id == id)
            .cloned()
            .collect())
    }

    async fn post_comments(&self, id: PostId) -> Result<Vec<Comment>, FetchError> {
        self.record(Endpoint::PostComments(id))?;
        Ok(self
            .state()
            .comments
            .iter()
            .filter(|c| c.post_id == id)
            .cloned()
            .collect())
    }
}

/// Snapshot lines of the subtree at `key`, keys omitted.
pub fn snapshot(doc: &Document, key: NodeKey) -> Vec<String> {
    let node = doc
        .materialize(key)
        .unwrap_or_else(|err| panic!("cannot snapshot {key:?}: {err}"));
    DomSnapshot::new(&node, DomSnapshotOptions::default())
        .as_lines()
        .to_vec()
}

/// Text of each direct element child of `parent`, in order.
pub fn child_texts(doc: &Document, parent: NodeKey) -> Vec<String> {
    doc.children(parent)
        .unwrap_or_default()
        .iter()
        .filter(|&&k| doc.tag_name(k).is_some())
        .map(|&k| doc.text_content(k).unwrap_or_default())
        .collect()
}
