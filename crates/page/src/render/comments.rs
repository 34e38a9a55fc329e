use core_types::Comment;
use dom::{Document, DomError, NodeKey, TextElement};

/// One `<article>` per comment: author heading, body, sender line.
///
/// Returns a fragment; an empty slice gives an empty fragment.
pub fn create_comments(doc: &mut Document, comments: &[Comment]) -> Result<NodeKey, DomError> {
    let fragment = doc.create_fragment();
    for comment in comments {
        let article = doc.create_element("article");
        let heading = TextElement::new("h3", &comment.name).build(doc);
        let body = TextElement::paragraph(&comment.body).build(doc);
        let from = format!("From: {}", comment.email);
        let from = TextElement::paragraph(&from).build(doc);
        for child in [heading, body, from] {
            doc.append_child(article, child)?;
        }
        doc.append_child(fragment, article)?;
    }
    Ok(fragment)
}

#[cfg(test)]
mod tests {
    use super::*;
    use page_test_support::{comment, snapshot};

    #[test]
    fn renders_one_article_per_comment_in_order() {
        let mut doc = Document::new();
        let comments = vec![
            comment(1, 7, "Alpha"),
            comment(2, 7, "Bravo"),
            comment(3, 7, "Charlie"),
        ];
        let fragment = create_comments(&mut doc, &comments).unwrap();

        let articles = doc.children(fragment).unwrap().to_vec();
        assert_eq!(articles.len(), comments.len());
        let headings: Vec<_> = articles
            .iter()
            .map(|&a| doc.text_content(doc.children(a).unwrap()[0]).unwrap())
            .collect();
        assert_eq!(headings, ["Alpha", "Bravo", "Charlie"]);
    }

    #[test]
    fn article_layout() {
        let mut doc = Document::new();
        let fragment = create_comments(&mut doc, &[comment(1, 7, "Alpha")]).unwrap();
        let article = doc.children(fragment).unwrap()[0];
        assert_eq!(
            snapshot(&doc, article),
            [
                "<article>",
                "  <h3>",
                r#"    "Alpha""#,
                "  <p>",
                r#"    "Alpha says hi""#,
                "  <p>",
                r#"    "From: alpha@example.test""#,
            ]
        );
    }

    #[test]
    fn empty_input_gives_empty_fragment() {
        let mut doc = Document::new();
        let fragment = create_comments(&mut doc, &[]).unwrap();
        assert!(doc.children(fragment).unwrap().is_empty());
    }
}
