use core_types::{Post, PostId, User};
use dom::dom_utils::HIDDEN_CLASS;
use dom::{Document, DomError, NodeKey, TextElement};
use net::{Api, ApiClient};

use super::create_comments;
use crate::{COMMENTS_CLASS, POST_ID_DATA, SHOW_COMMENTS};

/// One `<article>` per post, appended to a fragment in input order.
///
/// Posts are rendered strictly one after another: each post's author and
/// comment fetches finish before the next post starts, so the output order
/// never depends on response latency.
pub async fn create_posts<A: Api>(
    doc: &mut Document,
    api: &ApiClient<A>,
    posts: &[Post],
) -> Result<NodeKey, DomError> {
    let fragment = doc.create_fragment();
    for post in posts {
        let article = create_post_article(doc, api, post).await?;
        doc.append_child(fragment, article)?;
    }
    Ok(fragment)
}

async fn create_post_article<A: Api>(
    doc: &mut Document,
    api: &ApiClient<A>,
    post: &Post,
) -> Result<NodeKey, DomError> {
    let article = doc.create_element("article");
    let title = TextElement::new("h2", &post.title).build(doc);
    let body = TextElement::paragraph(&post.body).build(doc);
    let id_line = format!("Post ID: {}", post.id);
    let id_line = TextElement::paragraph(&id_line).build(doc);

    let author = match api.user(post.user_id).await {
        Some(author) => author,
        None => {
            log::warn!(
                target: "page",
                "author {} of post {} unavailable, rendering placeholder",
                post.user_id,
                post.id
            );
            User::unknown(post.user_id)
        }
    };
    let byline = format!("Author: {} with {}", author.name, author.company.name);
    let byline = TextElement::paragraph(&byline).build(doc);
    let catch_phrase = TextElement::paragraph(&author.company.catch_phrase).build(doc);

    let button = TextElement::new("button", SHOW_COMMENTS).build(doc);
    doc.set_data(button, POST_ID_DATA, post.id.to_string())?;

    let section = display_comments(doc, api, post.id).await?;

    for child in [title, body, id_line, byline, catch_phrase, button, section] {
        doc.append_child(article, child)?;
    }
    Ok(article)
}

/// Collapsed `<section class="comments hide" data-post-id="…">` holding the post's comments.
///
/// Comments are fetched eagerly, when the post is rendered, not on first
/// expand: every post costs one comments request up front, and toggling a
/// section open never waits on the network.
pub async fn display_comments<A: Api>(
    doc: &mut Document,
    api: &ApiClient<A>,
    post_id: PostId,
) -> Result<NodeKey, DomError> {
    let section = doc.create_element("section");
    doc.set_data(section, POST_ID_DATA, post_id.to_string())?;
    doc.add_class(section, COMMENTS_CLASS)?;
    doc.add_class(section, HIDDEN_CLASS)?;

    let comments = api.post_comments(post_id).await;
    let fragment = create_comments(doc, &comments)?;
    doc.append_child(section, fragment)?;
    Ok(section)
}
