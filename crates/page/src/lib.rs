//! # page
//!
//! Renders users, posts and comment threads into an owned [`dom::Document`]
//! and keeps that document in step with the selected user.
//!
//! [`PageController`] binds to a host document (see [`host::build_host_document`]),
//! fills the user selector, and on each selection change replaces the `main`
//! region with one freshly rendered generation of post articles. Each post
//! carries a collapsed comment section toggled by its button.

mod controller;
mod error;
pub mod host;
pub mod listeners;
pub mod render;
mod state;

pub use controller::{
    DispatchOutcome, PageController, RefreshReport, SelectionOutcome, ToggleOutcome,
    delete_child_elements,
};
pub use error::PageError;
pub use listeners::{
    DomEvent, EventKind, Listener, ListenerRegistry, add_button_listeners, remove_button_listeners,
};
pub use render::{create_comments, create_posts, create_select_options, display_comments};
pub use state::RenderState;

/// `id` of the user selection control.
pub const SELECT_MENU_ID: &str = "selectMenu";
pub const MAIN_TAG: &str = "main";
/// `data-*` name linking a button and its comment section to a post.
pub const POST_ID_DATA: &str = "post-id";
pub const COMMENTS_CLASS: &str = "comments";
pub const SHOW_COMMENTS: &str = "Show Comments";
pub const HIDE_COMMENTS: &str = "Hide Comments";
pub const NO_POSTS: &str = "No posts available.";
