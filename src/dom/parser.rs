use crate::dom::{DomNode, DomTree};
use scraper::{ElementRef, Html, Node};
use std::collections::HashMap;

/// Tags whose children should be stripped (invisible/script content)
const SKIP_CHILDREN: &[&str] = &["script", "style", "noscript", "svg"];

/// Markup that cannot be used as a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Blank body, nothing to parse.
    Empty,
    /// Parsed, but the document carries no elements or text at all.
    NoContent,
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseError::Empty => write!(f, "empty document"),
            ParseError::NoContent => write!(f, "document has no content"),
        }
    }
}

impl std::error::Error for ParseError {}

/// Parse markup into a queryable `scraper` document.
///
/// html5ever accepts anything, so "unparsable" here means there is nothing
/// usable: a blank body or a bare `html/head/body` skeleton.
pub fn parse_document(markup: &str) -> Result<Html, ParseError> {
    if markup.trim().is_empty() {
        return Err(ParseError::Empty);
    }
    let document = Html::parse_document(markup);
    let root = document.root_element();
    let has_content = root
        .descendants()
        .any(|node| match node.value() {
            Node::Element(el) => !matches!(el.name(), "html" | "head" | "body"),
            Node::Text(t) => !t.text.trim().is_empty(),
            _ => false,
        });
    if !has_content {
        return Err(ParseError::NoContent);
    }
    Ok(document)
}

/// Parse raw HTML string into an owned, mutable DomTree
pub fn parse_html(html: &str) -> DomTree {
    let document = Html::parse_document(html);
    let root = convert_element(document.root_element());
    DomTree {
        root: DomNode::document(vec![root]),
    }
}

fn convert_element(el: ElementRef<'_>) -> DomNode {
    let tag = el.value().name.local.as_ref().to_string();
    let attributes: HashMap<String, String> = el
        .value()
        .attrs()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

    // Skip children of invisible elements
    if SKIP_CHILDREN.contains(&tag.as_str()) {
        return DomNode::element(tag, attributes, Vec::new());
    }

    let mut children = Vec::new();

    for child_ref in el.children() {
        match child_ref.value() {
            Node::Element(_) => {
                if let Some(child_el) = ElementRef::wrap(child_ref) {
                    children.push(convert_element(child_el));
                }
            }
            Node::Text(t) => {
                let s = t.text.to_string();
                if !s.trim().is_empty() {
                    children.push(DomNode::text(s));
                }
            }
            _ => {}
        }
    }

    DomNode::element(tag, attributes, children)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_simple_html() {
        let html = r#"
        <html>
            <head><title>Test Page</title></head>
            <body>
                <h1>Hello, friends</h1>
                <p>Content paragraph</p>
            </body>
        </html>
        "#;

        let tree = parse_html(html);
        assert_eq!(tree.body_text(), "Hello, friends Content paragraph");
        assert!(tree.visible_text().starts_with("Test Page"));
    }

    #[test]
    fn strips_script_children() {
        let html = r#"
        <html><body>
            <p>Visible</p>
            <script>alert("hidden");</script>
        </body></html>
        "#;

        let tree = parse_html(html);
        let text = tree.visible_text();
        assert!(text.contains("Visible"));
        assert!(!text.contains("alert"));
    }

    #[test]
    fn blank_markup_is_rejected() {
        assert_eq!(parse_document("   \n").unwrap_err(), ParseError::Empty);
        assert_eq!(
            parse_document("<html><head></head><body>  </body></html>").unwrap_err(),
            ParseError::NoContent
        );
    }

    #[test]
    fn text_only_body_is_usable() {
        assert!(parse_document("just text").is_ok());
        assert!(parse_document("<title>x</title>").is_ok());
    }
}
