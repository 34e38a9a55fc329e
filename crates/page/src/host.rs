//! The standard host page the controller binds to.

use dom::{Document, DomError, TextElement};

use crate::{MAIN_TAG, SELECT_MENU_ID};

/// `html > head > title`, `html > body > header > (h1, select#selectMenu)` and `body > main`.
///
/// The select starts with one empty-valued placeholder option.
pub fn build_host_document() -> Result<Document, DomError> {
    let mut doc = Document::new();
    let html = doc.create_element("html");
    let head = doc.create_element("head");
    let title = TextElement::new("title", "Postboard").build(&mut doc);
    doc.append_child(head, title)?;

    let body = doc.create_element("body");
    let header = doc.create_element("header");
    let heading = TextElement::new("h1", "Posts").build(&mut doc);
    let select = doc.create_element("select");
    doc.set_attribute(select, "id", SELECT_MENU_ID)?;
    let placeholder = TextElement::new("option", "Select a user").build(&mut doc);
    doc.set_attribute(placeholder, "value", "")?;
    doc.append_child(select, placeholder)?;
    doc.append_child(header, heading)?;
    doc.append_child(header, select)?;

    let main = doc.create_element(MAIN_TAG);
    doc.append_child(body, header)?;
    doc.append_child(body, main)?;

    doc.append_child(html, head)?;
    doc.append_child(html, body)?;
    doc.append_child(doc.root(), html)?;
    Ok(doc)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skeleton_has_select_and_main() {
        let doc = build_host_document().unwrap();
        let select = doc.element_by_id(SELECT_MENU_ID).unwrap();
        assert_eq!(doc.tag_name(select), Some("select"));
        assert_eq!(doc.children(select).unwrap().len(), 1);

        let main = doc.query_tag(doc.root(), MAIN_TAG).unwrap();
        assert!(doc.children(main).unwrap().is_empty());
        assert_eq!(doc.tag_name(doc.parent(main).unwrap()), Some("body"));
    }
}
