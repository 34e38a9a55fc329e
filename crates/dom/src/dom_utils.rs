use crate::Node;

/// Class that marks a subtree as collapsed/hidden.
pub const HIDDEN_CLASS: &str = "hide";

/// Collect the text a reader would see, skipping subtrees carrying [`HIDDEN_CLASS`].
pub fn collect_visible_text(node: &Node, out: &mut String) {
    match node {
        Node::Text { text, .. } => {
            let t = text.trim();
            if !t.is_empty() {
                if !out.is_empty() && !out.ends_with('\n') {
                    out.push(' ');
                }
                out.push_str(t);
            }
        }
        Node::Element { name, children, .. } => {
            if node.has_class(HIDDEN_CLASS) {
                return;
            }
            for c in children {
                collect_visible_text(c, out);
            }
            match &name.to_ascii_lowercase()[..] {
                "p" | "div" | "section" | "article" | "header" | "footer" | "main" | "h1"
                | "h2" | "h3" | "h4" | "h5" | "h6" | "li" | "button" | "option" => {
                    if !out.is_empty() && !out.ends_with('\n') {
                        out.push('\n');
                    }
                }
                _ => {}
            }
        }
        Node::Document { children, .. } | Node::Fragment { children, .. } => {
            for c in children {
                collect_visible_text(c, out);
            }
        }
    }
}

/// Indented one-line-per-node outline, at most `cap` lines.
pub fn outline_from_dom(root: &Node, cap: usize) -> Vec<String> {
    fn walk(node: &Node, depth: usize, out: &mut Vec<String>, left: &mut usize) {
        if *left == 0 {
            return;
        }
        *left -= 1;
        let indent = "  ".repeat(depth);
        match node {
            Node::Document { children, .. } => {
                out.push(format!("{indent}#document"));
                for c in children {
                    walk(c, depth + 1, out, left);
                }
            }
            Node::Fragment { children, .. } => {
                out.push(format!("{indent}#fragment"));
                for c in children {
                    walk(c, depth + 1, out, left);
                }
            }
            Node::Element { name, children, .. } => {
                let mut line = format!("{indent}<{name}");
                for attr in ["id", "class", "data-post-id", "value"] {
                    if let Some(v) = node.attr(attr).filter(|v| !v.is_empty()) {
                        line.push_str(&format!(r#" {attr}="{v}""#));
                    }
                }
                if node.has_attr("disabled") {
                    line.push_str(" disabled");
                }
                line.push('>');
                out.push(line);
                for c in children {
                    walk(c, depth + 1, out, left);
                }
            }
            Node::Text { text, .. } => {
                let t = text.replace('\n', " ").trim().to_string();
                if !t.is_empty() {
                    let show = if t.chars().count() > 40 {
                        format!("{}…", t.chars().take(40).collect::<String>())
                    } else {
                        t
                    };
                    out.push(format!("{indent}\"{show}\""));
                }
            }
        }
    }
    let mut out = Vec::new();
    let mut left = cap;
    walk(root, 0, &mut out, &mut left);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Document, TextElement};

    fn sample() -> Node {
        let mut doc = Document::new();
        let article = doc.create_element("article");
        let h2 = TextElement::new("h2", "Title").build(&mut doc);
        let section = doc.create_element("section");
        doc.set_attribute(section, "class", "comments hide").unwrap();
        doc.set_data(section, "post-id", "7").unwrap();
        let hidden = TextElement::paragraph("secret").build(&mut doc);
        doc.append_child(section, hidden).unwrap();
        let button = TextElement::new("button", "Show Comments").build(&mut doc);
        doc.set_flag(button, "disabled", true).unwrap();
        doc.append_child(article, h2).unwrap();
        doc.append_child(article, button).unwrap();
        doc.append_child(article, section).unwrap();
        doc.append_child(doc.root(), article).unwrap();
        doc.materialize(doc.root()).unwrap()
    }

    #[test]
    fn visible_text_skips_hidden_sections() {
        let node = sample();
        let mut out = String::new();
        collect_visible_text(&node, &mut out);
        assert!(out.contains("Title"));
        assert!(out.contains("Show Comments"));
        assert!(!out.contains("secret"));
    }

    #[test]
    fn outline_lists_tags_and_key_attributes() {
        let node = sample();
        let lines = outline_from_dom(&node, 100);
        assert_eq!(lines[0], "#document");
        assert_eq!(lines[1], "  <article>");
        assert!(lines.contains(&"    <button disabled>".to_string()));
        assert!(lines.contains(&r#"    <section class="comments hide" data-post-id="7">"#.to_string()));
        assert!(lines.contains(&"        \"secret\"".to_string()));
    }

    #[test]
    fn outline_respects_cap() {
        let node = sample();
        assert_eq!(outline_from_dom(&node, 2).len(), 2);
    }
}
