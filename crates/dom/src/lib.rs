//! In-memory DOM for rendering pages without a display surface.
//!
//! The [`Document`] arena owns every node; callers hold [`NodeKey`]s and
//! materialize [`Node`] snapshots when they need an owned tree.

pub mod dom_snapshot;
pub mod dom_utils;

mod builder;
mod document;
mod error;
mod types;

pub use crate::builder::TextElement;
pub use crate::document::Document;
pub use crate::error::DomError;
pub use crate::types::{Attribute, Node, NodeKey};
