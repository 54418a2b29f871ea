//! Minimal CSS selector engine for the headless document
//!
//! Supports selector lists (`a, b`), descendant combinators, type selectors,
//! `#id`, `.class` and `[attr]` / `[attr=value]`. That covers every selector
//! the site client uses.

use std::rc::Rc;

/// Something a selector can be matched against
pub(crate) trait SelectorTarget: Sized {
    fn selector_tag(&self) -> String;
    fn selector_attribute(&self, name: &str) -> Option<String>;
    fn selector_parent(&self) -> Option<Rc<Self>>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct AttrMatch {
    name: String,
    value: Option<String>,
}

/// One compound selector, e.g. `a.chapter-link[data-scroll]`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Compound {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    attributes: Vec<AttrMatch>,
}

impl Compound {
    fn parse(input: &str) -> Option<Self> {
        let mut compound = Compound::default();
        let chars: Vec<char> = input.chars().collect();
        let mut i = 0;

        let read_ident = |i: &mut usize| -> String {
            let start = *i;
            while *i < chars.len() && !matches!(chars[*i], '#' | '.' | '[') {
                *i += 1;
            }
            chars[start..*i].iter().collect()
        };

        if i < chars.len() && !matches!(chars[i], '#' | '.' | '[') {
            let tag = read_ident(&mut i);
            if tag != "*" {
                compound.tag = Some(tag.to_ascii_lowercase());
            }
        }

        while i < chars.len() {
            match chars[i] {
                '#' => {
                    i += 1;
                    compound.id = Some(read_ident(&mut i));
                }
                '.' => {
                    i += 1;
                    compound.classes.push(read_ident(&mut i));
                }
                '[' => {
                    let end = chars[i..].iter().position(|&c| c == ']')? + i;
                    let body: String = chars[i + 1..end].iter().collect();
                    compound.attributes.push(parse_attr(&body));
                    i = end + 1;
                }
                _ => return None,
            }
        }

        Some(compound)
    }

    fn matches<T: SelectorTarget>(&self, el: &T) -> bool {
        if let Some(tag) = &self.tag {
            if &el.selector_tag() != tag {
                return false;
            }
        }

        if let Some(id) = &self.id {
            if el.selector_attribute("id").as_deref() != Some(id.as_str()) {
                return false;
            }
        }

        if !self.classes.is_empty() {
            let class_attr = el.selector_attribute("class").unwrap_or_default();
            let present: Vec<&str> = class_attr.split_whitespace().collect();
            if !self.classes.iter().all(|c| present.contains(&c.as_str())) {
                return false;
            }
        }

        self.attributes.iter().all(|attr| match (&attr.value, el.selector_attribute(&attr.name)) {
            (_, None) => false,
            (None, Some(_)) => true,
            (Some(expected), Some(actual)) => expected == &actual,
        })
    }
}

fn parse_attr(body: &str) -> AttrMatch {
    match body.split_once('=') {
        Some((name, value)) => AttrMatch {
            name: name.trim().to_ascii_lowercase(),
            value: Some(value.trim().trim_matches(|c| c == '"' || c == '\'').to_string()),
        },
        None => AttrMatch {
            name: body.trim().to_ascii_lowercase(),
            value: None,
        },
    }
}

/// A parsed selector list
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Selector {
    /// Each group is a descendant chain; the last compound is the subject
    groups: Vec<Vec<Compound>>,
}

impl Selector {
    /// Parses a selector list. Unsupported syntax yields a selector that
    /// matches nothing.
    pub(crate) fn parse(input: &str) -> Self {
        let groups = input
            .split(',')
            .filter_map(|group| {
                group
                    .split_whitespace()
                    .filter(|part| *part != ">")
                    .map(Compound::parse)
                    .collect::<Option<Vec<_>>>()
                    .filter(|chain| !chain.is_empty())
            })
            .collect();

        Self { groups }
    }

    pub(crate) fn matches<T: SelectorTarget>(&self, el: &Rc<T>) -> bool {
        self.groups.iter().any(|chain| chain_matches(chain, el))
    }
}

fn chain_matches<T: SelectorTarget>(chain: &[Compound], el: &Rc<T>) -> bool {
    let Some((subject, ancestors)) = chain.split_last() else {
        return false;
    };

    if !subject.matches(el.as_ref()) {
        return false;
    }

    let mut remaining = ancestors.iter().rev().peekable();
    let mut current = el.selector_parent();

    while let Some(wanted) = remaining.peek() {
        match current {
            Some(node) => {
                if wanted.matches(node.as_ref()) {
                    remaining.next();
                }
                current = node.selector_parent();
            }
            None => return false,
        }
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Node {
        tag: &'static str,
        attrs: Vec<(&'static str, &'static str)>,
        parent: Option<Rc<Node>>,
    }

    impl SelectorTarget for Node {
        fn selector_tag(&self) -> String {
            self.tag.to_string()
        }

        fn selector_attribute(&self, name: &str) -> Option<String> {
            self.attrs
                .iter()
                .find(|(n, _)| *n == name)
                .map(|(_, v)| v.to_string())
        }

        fn selector_parent(&self) -> Option<Rc<Self>> {
            self.parent.clone()
        }
    }

    fn node(tag: &'static str, attrs: Vec<(&'static str, &'static str)>, parent: Option<Rc<Node>>) -> Rc<Node> {
        Rc::new(Node { tag, attrs, parent })
    }

    #[test]
    fn test_compound_matching() {
        let link = node("a", vec![("href", "/about"), ("data-link", ""), ("class", "nav-link active")], None);

        assert!(Selector::parse("a[data-link]").matches(&link));
        assert!(Selector::parse(".nav-link.active").matches(&link));
        assert!(Selector::parse("[href=\"/about\"]").matches(&link));
        assert!(!Selector::parse("a[data-scroll]").matches(&link));
        assert!(!Selector::parse("div.nav-link").matches(&link));
    }

    #[test]
    fn test_descendant_and_list() {
        let content = node("div", vec![("class", "lesson-content")], None);
        let heading = node("h1", vec![], Some(content));

        assert!(Selector::parse(".lesson-content h1").matches(&heading));
        assert!(!Selector::parse(".sidebar h1").matches(&heading));
        assert!(Selector::parse(".content-title, h1").matches(&heading));
    }

    #[test]
    fn test_invalid_selector_matches_nothing() {
        let el = node("div", vec![("id", "app")], None);
        assert!(!Selector::parse("div:first-child").matches(&el));
        assert!(Selector::parse("#app").matches(&el));
    }
}
