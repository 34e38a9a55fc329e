use crate::{Document, NodeKey};

/// One tagged, text-bearing element, optionally classed.
///
/// Defaults to an empty `<p>`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TextElement<'a> {
    pub tag: &'a str,
    pub text: &'a str,
    pub class: Option<&'a str>,
}

impl Default for TextElement<'_> {
    fn default() -> Self {
        Self {
            tag: "p",
            text: "",
            class: None,
        }
    }
}

impl<'a> TextElement<'a> {
    pub fn new(tag: &'a str, text: &'a str) -> Self {
        Self {
            tag,
            text,
            class: None,
        }
    }

    pub fn paragraph(text: &'a str) -> Self {
        Self {
            text,
            ..Self::default()
        }
    }

    pub fn with_class(mut self, class: &'a str) -> Self {
        self.class = Some(class);
        self
    }

    /// Create the element, detached. Only touches nodes it just created.
    pub fn build(self, doc: &mut Document) -> NodeKey {
        let class = self.class.filter(|c| !c.is_empty());
        doc.create_text_element(self.tag, self.text, class)
    }
}
