//! Inline markup reader and writer for documents.
//!
//! The syntax is the small subset of HTML the toggle engine deals in: text,
//! elements with an optional `class` attribute, and entity escapes. It lets
//! fixtures and hosts describe a document the way it renders, for example
//! `hello <code class="inline-code">world</code>`.
//!
//! ```
//! use inline_code_engine::markup;
//!
//! let dom = markup::parse(r#"hello <code class="inline-code">world</code>"#).unwrap();
//! assert_eq!(dom.text_content(dom.root()), "hello world");
//! assert_eq!(markup::render(&dom), r#"hello <code class="inline-code">world</code>"#);
//! ```

pub mod lexer;

use std::sync::OnceLock;

use regex::Regex;

use crate::dom::{Dom, DomError, Element, Fragment, NodeId, NodeKind};
use lexer::{TokenKind, lex};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MarkupError {
    #[error("unexpected closing tag </{tag}> at byte {at}")]
    UnexpectedClose { tag: String, at: usize },
    #[error("closing tag </{found}> at byte {at} does not match <{expected}>")]
    MismatchedClose {
        expected: String,
        found: String,
        at: usize,
    },
    #[error("<{tag}> is never closed")]
    Unclosed { tag: String },
    #[error("unsupported attribute `{name}` at byte {at}")]
    UnsupportedAttribute { name: String, at: usize },
    #[error(transparent)]
    Dom(#[from] DomError),
}

fn attribute_regex() -> &'static Regex {
    static ATTRIBUTE: OnceLock<Regex> = OnceLock::new();
    ATTRIBUTE.get_or_init(|| {
        Regex::new(r#"([A-Za-z_:][A-Za-z0-9_:.-]*)="([^"]*)""#).expect("Invalid attribute regex")
    })
}

/// Tag name of an open or close tag token.
fn tag_name(token: &str) -> &str {
    token
        .trim_start_matches("</")
        .trim_start_matches('<')
        .split(|c: char| c.is_whitespace() || c == '>' || c == '/')
        .next()
        .unwrap_or_default()
}

/// Build an element from an open tag token; the flag is true for `<tag/>`.
fn open_tag(token: &str, at: usize) -> Result<(Element, bool), MarkupError> {
    let mut element = Element::new(tag_name(token));
    for capture in attribute_regex().captures_iter(token) {
        let (_, [name, value]) = capture.extract();
        if name != "class" {
            return Err(MarkupError::UnsupportedAttribute {
                name: name.to_owned(),
                at,
            });
        }
        let value = html_escape::decode_html_entities(value);
        for class in value.split_whitespace() {
            element.add_class(class);
        }
    }
    Ok((element, token.ends_with("/>")))
}

/// Parse markup into a fresh document.
pub fn parse(input: &str) -> Result<Dom, MarkupError> {
    let mut dom = Dom::new();
    let mut open = vec![dom.root()];

    for (token, span) in lex(input) {
        let parent = open.last().copied().unwrap_or(dom.root());
        match token.kind {
            TokenKind::Text => {
                let text = html_escape::decode_html_entities(token.text);
                // A stray `<` lexes as its own text token; keep one node per run.
                let previous = dom.children(parent).last().copied();
                match previous.and_then(|node| dom.text(node).map(|head| (node, head))) {
                    Some((node, head)) => {
                        let joined = format!("{head}{text}");
                        dom.set_text(node, joined)?;
                    }
                    None => {
                        let node = dom.create_text(text);
                        dom.append_child(parent, node)?;
                    }
                }
            }
            TokenKind::OpenTag => {
                let (element, self_closing) = open_tag(token.text, span.start)?;
                let node = dom.create_element(element);
                dom.append_child(parent, node)?;
                if !self_closing {
                    open.push(node);
                }
            }
            TokenKind::CloseTag => {
                let found = tag_name(token.text);
                if open.len() == 1 {
                    return Err(MarkupError::UnexpectedClose {
                        tag: found.to_owned(),
                        at: span.start,
                    });
                }
                let expected = dom.element(parent).map(Element::tag).unwrap_or_default();
                if !expected.eq_ignore_ascii_case(found) {
                    return Err(MarkupError::MismatchedClose {
                        expected: expected.to_owned(),
                        found: found.to_owned(),
                        at: span.start,
                    });
                }
                open.pop();
            }
        }
    }

    if let Some(&unclosed) = open.get(1..).and_then(<[NodeId]>::last) {
        let tag = dom.element(unclosed).map(Element::tag).unwrap_or_default();
        return Err(MarkupError::Unclosed {
            tag: tag.to_owned(),
        });
    }
    Ok(dom)
}

/// Render the whole document.
pub fn render(dom: &Dom) -> String {
    render_node(dom, dom.root())
}

/// Render one node. The root renders as its children only.
pub fn render_node(dom: &Dom, node: NodeId) -> String {
    let mut out = String::new();
    write_node(dom, node, &mut out);
    out
}

/// Render the detached nodes of a fragment in order.
pub fn render_fragment(dom: &Dom, fragment: &Fragment) -> String {
    let mut out = String::new();
    for &node in fragment.nodes() {
        write_node(dom, node, &mut out);
    }
    out
}

fn write_node(dom: &Dom, node: NodeId, out: &mut String) {
    match dom.kind(node) {
        Ok(NodeKind::Root) => write_children(dom, node, out),
        Ok(NodeKind::Element(element)) => {
            out.push('<');
            out.push_str(element.tag());
            if !element.classes().is_empty() {
                out.push_str(" class=\"");
                out.push_str(&html_escape::encode_double_quoted_attribute(
                    &element.classes().join(" "),
                ));
                out.push('"');
            }
            out.push('>');
            write_children(dom, node, out);
            out.push_str("</");
            out.push_str(element.tag());
            out.push('>');
        }
        Ok(NodeKind::Text(text)) => out.push_str(&html_escape::encode_text(text)),
        Err(_) => {}
    }
}

fn write_children(dom: &Dom, node: NodeId, out: &mut String) {
    for &child in dom.children(node) {
        write_node(dom, child, out);
    }
}
