use core_types::User;
use dom::{Document, DomError, NodeKey, TextElement};

/// One detached `<option value="{id}">{name}</option>` per user.
pub fn create_select_options(doc: &mut Document, users: &[User]) -> Result<Vec<NodeKey>, DomError> {
    users
        .iter()
        .map(|user| {
            let option = TextElement::new("option", &user.name).build(doc);
            doc.set_attribute(option, "value", user.id.to_string())?;
            Ok(option)
        })
        .collect()
}
