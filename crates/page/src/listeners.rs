use core_types::PostId;
use dom::{Document, NodeKey};
use std::collections::HashMap;

use crate::POST_ID_DATA;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventKind {
    Click,
    Change,
}

/// What a registered node does when its event fires.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Listener {
    SelectUser,
    ToggleComments { post_id: PostId },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DomEvent {
    pub kind: EventKind,
    pub target: NodeKey,
    /// Control value at dispatch time; only change events carry one.
    pub value: Option<String>,
}

impl DomEvent {
    pub fn click(target: NodeKey) -> Self {
        Self {
            kind: EventKind::Click,
            target,
            value: None,
        }
    }

    pub fn change(target: NodeKey, value: impl Into<String>) -> Self {
        Self {
            kind: EventKind::Change,
            target,
            value: Some(value.into()),
        }
    }
}

/// Listeners keyed by `(node, event kind)`; at most one per pair.
///
/// Node keys are never reused, so an entry for a freed node can only go stale,
/// never fire for a different node.
#[derive(Debug, Default)]
pub struct ListenerRegistry {
    entries: HashMap<(NodeKey, EventKind), Listener>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` if the pair already had a listener (which is replaced).
    pub fn add(&mut self, target: NodeKey, kind: EventKind, listener: Listener) -> bool {
        self.entries.insert((target, kind), listener).is_none()
    }

    pub fn remove(&mut self, target: NodeKey, kind: EventKind) -> Option<Listener> {
        self.entries.remove(&(target, kind))
    }

    pub fn listener_for(&self, target: NodeKey, kind: EventKind) -> Option<Listener> {
        self.entries.get(&(target, kind)).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn post_buttons(doc: &Document, scope: NodeKey) -> impl Iterator<Item = (NodeKey, PostId)> + '_ {
    doc.query_all_with_data(scope, "button", POST_ID_DATA)
        .into_iter()
        .filter_map(move |button| {
            let raw = doc.data(button, POST_ID_DATA)?;
            match raw.parse::<PostId>() {
                Ok(post_id) => Some((button, post_id)),
                Err(_) => {
                    log::warn!(target: "page", "button {button:?} has bad post id {raw:?}");
                    None
                }
            }
        })
}

/// Register a click listener on every `button[data-post-id]` under `scope`.
///
/// Returns how many buttons got a new listener.
pub fn add_button_listeners(doc: &Document, scope: NodeKey, registry: &mut ListenerRegistry) -> usize {
    post_buttons(doc, scope)
        .filter(|&(button, post_id)| {
            registry.add(button, EventKind::Click, Listener::ToggleComments { post_id })
        })
        .count()
}

/// Drop the click listener of every `button[data-post-id]` under `scope`.
///
/// Returns how many listeners were removed.
pub fn remove_button_listeners(
    doc: &Document,
    scope: NodeKey,
    registry: &mut ListenerRegistry,
) -> usize {
    post_buttons(doc, scope)
        .filter(|&(button, _)| registry.remove(button, EventKind::Click).is_some())
        .count()
}
