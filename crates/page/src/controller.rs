use core_types::{Post, PostId, UserId};
use dom::dom_utils::HIDDEN_CLASS;
use dom::{Document, DomError, NodeKey, TextElement};
use net::{Api, ApiClient};

use crate::listeners::{
    DomEvent, EventKind, Listener, ListenerRegistry, add_button_listeners, remove_button_listeners,
};
use crate::render::{create_posts, create_select_options};
use crate::{
    HIDE_COMMENTS, MAIN_TAG, NO_POSTS, PageError, POST_ID_DATA, RenderState, SELECT_MENU_ID,
    SHOW_COMMENTS,
};

const DISABLED: &str = "disabled";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RefreshReport {
    /// Button listeners dropped from the previous generation.
    pub detached: usize,
    /// Button listeners registered on the new generation.
    pub attached: usize,
    pub generation: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SelectionOutcome {
    /// The control was disabled; nothing fetched.
    Ignored,
    Refreshed {
        user_id: UserId,
        post_count: usize,
        report: RefreshReport,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ToggleOutcome {
    pub section: NodeKey,
    pub button: NodeKey,
    pub expanded: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// No listener for this target and event kind.
    Unhandled,
    Selection(SelectionOutcome),
    Toggle(Option<ToggleOutcome>),
}

/// Remove every child of `parent`, freeing their subtrees. Returns how many were removed.
pub fn delete_child_elements(doc: &mut Document, parent: NodeKey) -> Result<usize, DomError> {
    doc.remove_children(parent)
}

/// Owns the page document and keeps it in step with the selected user.
///
/// Handlers take `&mut self`, so one controller never runs two of them at once.
/// The `disabled` flag on the selection control is still kept current, since
/// hosts observe it and selection events honor it.
pub struct PageController<A> {
    doc: Document,
    api: ApiClient<A>,
    select: NodeKey,
    main: NodeKey,
    listeners: ListenerRegistry,
    state: RenderState,
    generation: u64,
}

impl<A: Api> PageController<A> {
    /// Bind to `select#selectMenu` and the first `main` of `doc`.
    pub fn attach(doc: Document, api: A) -> Result<Self, PageError> {
        let select = doc
            .element_by_id(SELECT_MENU_ID)
            .ok_or(PageError::MissingElement("select#selectMenu"))?;
        let main = doc
            .query_tag(doc.root(), MAIN_TAG)
            .ok_or(PageError::MissingElement("main"))?;
        Ok(Self {
            doc,
            api: ApiClient::new(api),
            select,
            main,
            listeners: ListenerRegistry::new(),
            state: RenderState::Empty,
            generation: 0,
        })
    }

    // -- Accessors ---

    pub fn document(&self) -> &Document {
        &self.doc
    }

    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.doc
    }

    pub fn into_document(self) -> Document {
        self.doc
    }

    pub fn api(&self) -> &A {
        self.api.api()
    }

    pub fn select_menu(&self) -> NodeKey {
        self.select
    }

    pub fn main(&self) -> NodeKey {
        self.main
    }

    pub fn listeners(&self) -> &ListenerRegistry {
        &self.listeners
    }

    pub fn state(&self) -> RenderState {
        self.state
    }

    /// Completed refreshes so far.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_select_disabled(&self) -> bool {
        self.doc.has_attribute(self.select, DISABLED)
    }

    pub fn button_for(&self, post_id: PostId) -> Option<NodeKey> {
        self.doc
            .query_data(self.main, "button", POST_ID_DATA, &post_id.to_string())
    }

    pub fn section_for(&self, post_id: PostId) -> Option<NodeKey> {
        self.doc
            .query_data(self.main, "section", POST_ID_DATA, &post_id.to_string())
    }

    // -- Page lifecycle ---

    /// Fill the selection control with one option per user and start listening to it.
    ///
    /// Returns the number of options added; a failed users fetch adds none.
    pub async fn init_page(&mut self) -> Result<usize, PageError> {
        let users = self.api.users().await;
        let options = create_select_options(&mut self.doc, &users)?;
        for &option in &options {
            self.doc.append_child(self.select, option)?;
        }
        self.listeners
            .add(self.select, EventKind::Change, Listener::SelectUser);
        self.doc.set_flag(self.select, DISABLED, false)?;
        log::info!(target: "page", "select menu ready with {} users", options.len());
        Ok(options.len())
    }

    /// Handle a change on the selection control.
    ///
    /// The control is disabled for the duration and re-enabled afterwards, also
    /// when the refresh fails. A missing or unparsable value selects user 1.
    pub async fn on_selection_changed(
        &mut self,
        event: &DomEvent,
    ) -> Result<SelectionOutcome, PageError> {
        if self.is_select_disabled() {
            log::debug!(target: "page", "selection change ignored while disabled");
            return Ok(SelectionOutcome::Ignored);
        }
        self.doc.set_flag(self.select, DISABLED, true)?;

        let user_id = event
            .value
            .as_deref()
            .and_then(|v| v.parse::<UserId>().ok())
            .unwrap_or(UserId::FALLBACK);
        log::info!(target: "page", "loading posts for user {user_id}");

        let posts = self.api.user_posts(user_id).await;
        let refreshed = self.refresh_posts(&posts).await;
        let enabled = self.doc.set_flag(self.select, DISABLED, false);
        let report = refreshed?;
        enabled?;

        Ok(SelectionOutcome::Refreshed {
            user_id,
            post_count: posts.len(),
            report,
        })
    }

    /// Replace whatever `main` holds with a fresh generation rendered from `posts`.
    pub async fn refresh_posts(&mut self, posts: &[Post]) -> Result<RefreshReport, PageError> {
        self.state = RenderState::Rendering;
        match self.render_generation(posts).await {
            Ok(report) => {
                self.state = if posts.is_empty() {
                    RenderState::Empty
                } else {
                    RenderState::Rendered { posts: posts.len() }
                };
                log::debug!(
                    target: "page",
                    "generation {} rendered: {} posts, {} listeners swapped for {}",
                    report.generation,
                    posts.len(),
                    report.detached,
                    report.attached
                );
                Ok(report)
            }
            Err(err) => {
                log::error!(target: "page", "refresh failed: {err}");
                self.state = RenderState::Empty;
                Err(err)
            }
        }
    }

    async fn render_generation(&mut self, posts: &[Post]) -> Result<RefreshReport, PageError> {
        let detached = remove_button_listeners(&self.doc, self.main, &mut self.listeners);
        delete_child_elements(&mut self.doc, self.main)?;
        self.display_posts(posts).await?;
        let attached = add_button_listeners(&self.doc, self.main, &mut self.listeners);
        self.generation += 1;
        Ok(RefreshReport {
            detached,
            attached,
            generation: self.generation,
        })
    }

    async fn display_posts(&mut self, posts: &[Post]) -> Result<(), PageError> {
        if posts.is_empty() {
            let placeholder = TextElement::paragraph(NO_POSTS).build(&mut self.doc);
            self.doc.append_child(self.main, placeholder)?;
            return Ok(());
        }
        let fragment = create_posts(&mut self.doc, &self.api, posts).await?;
        self.doc.append_child(self.main, fragment)?;
        Ok(())
    }

    // -- Comment toggles ---

    /// Handle a click on a post's comments button.
    ///
    /// `Ok(None)` when the button has no usable post id or no matching section exists.
    pub fn on_toggle_clicked(&mut self, event: &DomEvent) -> Result<Option<ToggleOutcome>, PageError> {
        let button = event.target;
        let Some(post_id) = self
            .doc
            .data(button, POST_ID_DATA)
            .and_then(|raw| raw.parse::<PostId>().ok())
        else {
            log::debug!(target: "page", "click on {button:?} without a post id");
            return Ok(None);
        };
        self.toggle_from_button(button, post_id)
    }

    fn toggle_from_button(
        &mut self,
        button: NodeKey,
        post_id: PostId,
    ) -> Result<Option<ToggleOutcome>, PageError> {
        let Some(section) = self.section_for(post_id) else {
            log::debug!(target: "page", "no comment section for post {post_id}");
            return Ok(None);
        };
        self.toggle(section, button).map(Some)
    }

    /// Toggle the comment section of `post_id` as if its button were clicked.
    pub fn toggle_comments(&mut self, post_id: PostId) -> Result<Option<ToggleOutcome>, PageError> {
        match (self.section_for(post_id), self.button_for(post_id)) {
            (Some(section), Some(button)) => self.toggle(section, button).map(Some),
            _ => Ok(None),
        }
    }

    fn toggle(&mut self, section: NodeKey, button: NodeKey) -> Result<ToggleOutcome, PageError> {
        let hidden = self.doc.toggle_class(section, HIDDEN_CLASS)?;
        let label = if hidden { SHOW_COMMENTS } else { HIDE_COMMENTS };
        self.doc.set_text_content(button, label)?;
        Ok(ToggleOutcome {
            section,
            button,
            expanded: !hidden,
        })
    }

    // -- Events ---

    /// Route `event` to the listener registered for its target, if any.
    pub async fn dispatch(&mut self, event: DomEvent) -> Result<DispatchOutcome, PageError> {
        match self.listeners.listener_for(event.target, event.kind) {
            None => {
                log::trace!(target: "page", "{:?} on {:?} has no listener", event.kind, event.target);
                Ok(DispatchOutcome::Unhandled)
            }
            Some(Listener::SelectUser) => self
                .on_selection_changed(&event)
                .await
                .map(DispatchOutcome::Selection),
            Some(Listener::ToggleComments { post_id }) => self
                .toggle_from_button(event.target, post_id)
                .map(DispatchOutcome::Toggle),
        }
    }

    /// Set the control's value to `user_id` and fire a change event on it.
    pub async fn select_user(&mut self, user_id: UserId) -> Result<DispatchOutcome, PageError> {
        let value = user_id.to_string();
        self.doc.set_attribute(self.select, "value", value.as_str())?;
        self.dispatch(DomEvent::change(self.select, value)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::build_host_document;
    use page_test_support::{FakeApi, child_texts, init_test_logging, post, user};

    fn controller(api: FakeApi) -> PageController<FakeApi> {
        init_test_logging();
        PageController::attach(build_host_document().unwrap(), api).unwrap()
    }

    #[test]
    fn attach_requires_select_and_main() {
        let mut doc = Document::new();
        let main = doc.create_element("main");
        doc.append_child(doc.root(), main).unwrap();
        let err = PageController::attach(doc, FakeApi::new()).err();
        assert_eq!(err, Some(PageError::MissingElement("select#selectMenu")));

        let mut doc = Document::new();
        let select = doc.create_element("select");
        doc.set_attribute(select, "id", SELECT_MENU_ID).unwrap();
        doc.append_child(doc.root(), select).unwrap();
        let err = PageController::attach(doc, FakeApi::new()).err();
        assert_eq!(err, Some(PageError::MissingElement("main")));
    }

    #[tokio::test]
    async fn init_appends_options_after_placeholder() {
        let mut page = controller(FakeApi::new().with_users([
            user(1, "Leanne", "Romaguera", "x"),
            user(2, "Ervin", "Deckow", "y"),
        ]));
        assert_eq!(page.init_page().await.unwrap(), 2);
        assert_eq!(
            child_texts(page.document(), page.select_menu()),
            ["Select a user", "Leanne", "Ervin"]
        );
        assert!(!page.is_select_disabled());
        assert_eq!(
            page.listeners().listener_for(page.select_menu(), EventKind::Change),
            Some(Listener::SelectUser)
        );
    }

    #[tokio::test]
    async fn disabled_select_ignores_changes() {
        let api = FakeApi::new().with_posts([post(1, 1, "one")]);
        let mut page = controller(api.clone());
        page.init_page().await.unwrap();
        let select = page.select_menu();
        page.document_mut().set_flag(select, DISABLED, true).unwrap();
        api.clear_calls();

        let outcome = page
            .on_selection_changed(&DomEvent::change(select, "1"))
            .await
            .unwrap();
        assert_eq!(outcome, SelectionOutcome::Ignored);
        assert!(api.calls().is_empty());
        assert_eq!(page.state(), RenderState::Empty);
    }

    #[tokio::test]
    async fn selection_falls_back_to_first_user() {
        let api = FakeApi::new().with_posts([post(1, 1, "one"), post(2, 2, "two")]);
        let mut page = controller(api);
        let select = page.select_menu();

        for value in ["", "abc"] {
            let outcome = page
                .on_selection_changed(&DomEvent::change(select, value))
                .await
                .unwrap();
            let SelectionOutcome::Refreshed { user_id, post_count, .. } = outcome else {
                panic!("expected a refresh, got {outcome:?}");
            };
            assert_eq!(user_id, UserId(1));
            assert_eq!(post_count, 1);
        }
        assert!(!page.is_select_disabled());
    }

    #[tokio::test]
    async fn selection_reenables_control() {
        let mut page = controller(FakeApi::new().offline());
        let select = page.select_menu();
        let outcome = page
            .on_selection_changed(&DomEvent::change(select, "4"))
            .await
            .unwrap();
        assert!(matches!(
            outcome,
            SelectionOutcome::Refreshed { user_id: UserId(4), post_count: 0, .. }
        ));
        assert!(!page.is_select_disabled());
        assert_eq!(page.state(), RenderState::Empty);
        assert_eq!(child_texts(page.document(), page.main()), [NO_POSTS]);
    }

    #[test]
    fn toggle_without_section_is_noop() {
        let mut page = controller(FakeApi::new());
        let doc = page.document_mut();
        let stray = TextElement::new("button", SHOW_COMMENTS).build(doc);
        doc.set_data(stray, POST_ID_DATA, "42").unwrap();

        assert_eq!(page.on_toggle_clicked(&DomEvent::click(stray)).unwrap(), None);
        assert_eq!(page.toggle_comments(PostId(42)).unwrap(), None);
        assert_eq!(page.document().text_content(stray).unwrap(), SHOW_COMMENTS);
    }

    #[tokio::test]
    async fn click_toggles_the_post_registered_for_the_button() {
        let mut page = controller(FakeApi::new().with_users([user(1, "Leanne", "Acme", "x")]));
        page.refresh_posts(&[post(7, 1, "seven"), post(8, 1, "eight")])
            .await
            .unwrap();
        let button = page.button_for(PostId(7)).unwrap();
        page.document_mut()
            .set_data(button, POST_ID_DATA, "8")
            .unwrap();

        let outcome = page.dispatch(DomEvent::click(button)).await.unwrap();
        let seven = page.section_for(PostId(7)).unwrap();
        assert!(matches!(
            outcome,
            DispatchOutcome::Toggle(Some(t)) if t.section == seven && t.expanded
        ));
        let eight = page.section_for(PostId(8)).unwrap();
        assert!(page.document().has_class(eight, HIDDEN_CLASS));
    }

    #[tokio::test]
    async fn refresh_state_follows_post_count() {
        let mut page = controller(FakeApi::new());
        page.refresh_posts(&[post(1, 1, "one")]).await.unwrap();
        assert_eq!(page.state(), RenderState::Rendered { posts: 1 });
        page.refresh_posts(&[]).await.unwrap();
        assert_eq!(page.state(), RenderState::Empty);
        assert_eq!(page.generation(), 2);
    }

    #[tokio::test]
    async fn unregistered_targets_are_unhandled() {
        let mut page = controller(FakeApi::new());
        let main = page.main();
        let outcome = page.dispatch(DomEvent::click(main)).await.unwrap();
        assert_eq!(outcome, DispatchOutcome::Unhandled);
    }

    #[tokio::test]
    async fn delete_child_elements_empties_parent() {
        let mut page = controller(FakeApi::new().with_posts([post(1, 1, "a"), post(2, 1, "b")]));
        page.refresh_posts(&[post(1, 1, "a"), post(2, 1, "b")])
            .await
            .unwrap();
        let main = page.main();
        assert_eq!(delete_child_elements(page.document_mut(), main).unwrap(), 2);
        assert!(page.document().children(main).unwrap().is_empty());
    }
}
