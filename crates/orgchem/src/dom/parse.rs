//! Forgiving HTML fragment parser for the headless document
//!
//! Builds a tree of [`Node`]s out of fragment markup. It is not an HTML5
//! parser: it knows void and raw-text elements, closes unmatched tags at the
//! end of the fragment and ignores stray end tags. Fragments served by the
//! site are hand-written and well formed, which is all it has to handle.

use super::memory::{MemoryElement, Node};
use once_cell::sync::Lazy;
use regex::Regex;
use std::rc::Rc;

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style", "textarea", "title"];

static ATTRIBUTE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"([^\s"'<>/=]+)(?:\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'=<>`]+)))?"#)
        .expect("attribute pattern is valid")
});

pub(crate) fn is_void(tag: &str) -> bool {
    VOID_ELEMENTS.contains(&tag)
}

pub(crate) fn is_raw_text(tag: &str) -> bool {
    RAW_TEXT_ELEMENTS.contains(&tag)
}

/// Parses fragment markup into detached nodes
pub(crate) fn parse_fragment(html: &str) -> Vec<Node> {
    let bytes = html.as_bytes();
    let mut roots: Vec<Node> = Vec::new();
    let mut stack: Vec<Rc<MemoryElement>> = Vec::new();
    let mut pos = 0;
    let mut text_start = 0;

    while pos < bytes.len() {
        if bytes[pos] != b'<' {
            pos += 1;
            continue;
        }

        let rest = &html[pos..];

        let raw_end = if rest.starts_with("<!--") {
            Some(rest.find("-->").map(|e| pos + e + 3).unwrap_or(html.len()))
        } else if rest.starts_with("<!") || rest.starts_with("<?") {
            Some(find_tag_end(html, pos))
        } else {
            None
        };

        if let Some(end) = raw_end {
            flush_text(html, text_start, pos, &stack, &mut roots);
            push_node(Node::Raw(html[pos..end].to_string()), &stack, &mut roots);
            pos = end;
            text_start = pos;
            continue;
        }

        if let Some(name) = rest.strip_prefix("</").and_then(tag_name) {
            flush_text(html, text_start, pos, &stack, &mut roots);
            close_element(&name.to_ascii_lowercase(), &mut stack);
            pos = find_tag_end(html, pos);
            text_start = pos;
            continue;
        }

        let Some(name) = tag_name(&rest[1..]) else {
            pos += 1;
            continue;
        };

        flush_text(html, text_start, pos, &stack, &mut roots);

        let tag = name.to_ascii_lowercase();
        let end = find_tag_end(html, pos);
        let inner_end = if html[..end].ends_with('>') { end - 1 } else { end };
        let inner = html[pos + 1 + name.len()..inner_end].trim_end();
        let self_closing = inner.ends_with('/');
        let attributes = parse_attributes(inner.trim_end_matches('/'));

        let element = MemoryElement::with_attributes(&tag, attributes);
        push_node(Node::Element(Rc::clone(&element)), &stack, &mut roots);
        pos = end;
        text_start = pos;

        if is_void(&tag) || self_closing {
            continue;
        }

        if is_raw_text(&tag) {
            let closing = format!("</{}", tag);
            let lowered = html[pos..].to_ascii_lowercase();
            let (text_end, next) = match lowered.find(&closing) {
                Some(offset) => (pos + offset, find_tag_end(html, pos + offset)),
                None => (html.len(), html.len()),
            };
            if text_end > pos {
                element.append_node(Node::Text(html[pos..text_end].to_string()));
            }
            pos = next;
            text_start = pos;
            continue;
        }

        stack.push(element);
    }

    flush_text(html, text_start, bytes.len(), &stack, &mut roots);
    roots
}

/// Leading tag name of `s`, if it starts with one
fn tag_name(s: &str) -> Option<&str> {
    let first = s.chars().next()?;
    if !first.is_ascii_alphabetic() {
        return None;
    }
    let len = s
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '-' || c == ':'))
        .unwrap_or(s.len());
    Some(&s[..len])
}

/// Index just past the `>` closing the tag opened at `start`, honoring quotes
fn find_tag_end(html: &str, start: usize) -> usize {
    let mut quote: Option<u8> = None;
    for (offset, &b) in html.as_bytes()[start..].iter().enumerate() {
        match (quote, b) {
            (Some(q), _) if b == q => quote = None,
            (Some(_), _) => {}
            (None, b'"') | (None, b'\'') => quote = Some(b),
            (None, b'>') => return start + offset + 1,
            _ => {}
        }
    }
    html.len()
}

pub(crate) fn parse_attributes(input: &str) -> Vec<(String, String)> {
    ATTRIBUTE
        .captures_iter(input)
        .map(|caps| {
            let name = caps[1].to_ascii_lowercase();
            let value = caps
                .get(2)
                .or_else(|| caps.get(3))
                .or_else(|| caps.get(4))
                .map(|m| decode_entities(m.as_str()))
                .unwrap_or_default();
            (name, value)
        })
        .collect()
}

fn close_element(tag: &str, stack: &mut Vec<Rc<MemoryElement>>) {
    if let Some(index) = stack.iter().rposition(|el| el.tag() == tag) {
        stack.truncate(index);
    }
}

fn push_node(node: Node, stack: &[Rc<MemoryElement>], roots: &mut Vec<Node>) {
    match stack.last() {
        Some(parent) => parent.append_node(node),
        None => roots.push(node),
    }
}

fn flush_text(
    html: &str,
    start: usize,
    end: usize,
    stack: &[Rc<MemoryElement>],
    roots: &mut Vec<Node>,
) {
    if end > start {
        push_node(Node::Text(html[start..end].to_string()), stack, roots);
    }
}

/// Decodes the handful of entities the site's markup uses
pub(crate) fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&nbsp;", "\u{a0}")
        .replace("&amp;", "&")
}

/// Escapes text for use as element content
pub(crate) fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Escapes text for use inside a double-quoted attribute
pub(crate) fn escape_attribute(value: &str) -> String {
    value.replace('&', "&amp;").replace('"', "&quot;")
}
