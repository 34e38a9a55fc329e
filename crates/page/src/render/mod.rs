//! Detached subtree builders for comments, posts and select options.

mod comments;
mod posts;
mod select;

pub use comments::create_comments;
pub use posts::{create_posts, display_comments};
pub use select::create_select_options;
