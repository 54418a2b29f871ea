//! Topic registry
//!
//! The ordered list of lessons. Order defines previous/next adjacency;
//! lookups for unknown ids fall back to a capitalized title and the default
//! accent color and never fail.

use serde::{Deserialize, Serialize};

/// Accent color for topics without one
pub const DEFAULT_TOPIC_COLOR: &str = "#667eea";

/// A lesson topic
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topic {
    pub id: String,
    pub title: String,
    pub color: String,
}

impl Topic {
    fn new(id: &str, title: &str, color: &str) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            color: color.to_string(),
        }
    }

    /// Application path of this topic's lesson
    pub fn path(&self) -> String {
        orgchem_router::lesson_path(&self.id)
    }
}

/// Neighbours of a topic in lesson order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Adjacency<'a> {
    pub previous: Option<&'a Topic>,
    pub next: Option<&'a Topic>,
}

impl Adjacency<'_> {
    pub fn has_neighbour(&self) -> bool {
        self.previous.is_some() || self.next.is_some()
    }
}

/// Position of a topic in lesson order
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Progress {
    /// 1-based position
    pub number: usize,
    pub count: usize,
}

impl Progress {
    /// Share of the course completed, in percent
    pub fn percent(&self) -> f64 {
        self.number as f64 / self.count as f64 * 100.0
    }
}

/// Ordered, immutable list of topics
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicRegistry {
    topics: Vec<Topic>,
    default_color: String,
}

impl Default for TopicRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl TopicRegistry {
    pub fn new(topics: Vec<Topic>) -> Self {
        Self {
            topics,
            default_color: DEFAULT_TOPIC_COLOR.to_string(),
        }
    }

    /// The site's lessons, in teaching order
    pub fn builtin() -> Self {
        Self::new(vec![
            Topic::new("haloalkanes", "HaloAlkanes", "#ff6b6b"),
            Topic::new("haloarenes", "HaloArenes", "#a29bfe"),
            Topic::new("alcohols", "Alcohols", "#00cec9"),
            Topic::new("phenols", "Phenols", "#fd79a8"),
            Topic::new("ethers", "Ethers", "#fdcb6e"),
            Topic::new("aldehydes", "Aldehydes", "#74b9ff"),
            Topic::new("ketones", "Ketones", "#55efc4"),
            Topic::new("carboxylicacids", "Carboxylic Acids", "#e17055"),
            Topic::new("amines", "Amines", "#a29bfe"),
        ])
    }

    pub fn with_default_color(mut self, color: &str) -> Self {
        self.default_color = color.to_string();
        self
    }

    pub fn topics(&self) -> &[Topic] {
        &self.topics
    }

    pub fn len(&self) -> usize {
        self.topics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.topics.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Topic> {
        self.topics.iter().find(|t| t.id == id)
    }

    /// Index of a topic in lesson order
    pub fn position(&self, id: &str) -> Option<usize> {
        self.topics.iter().position(|t| t.id == id)
    }

    /// Display title; unknown ids get their first letter capitalized
    pub fn title(&self, id: &str) -> String {
        match self.get(id) {
            Some(topic) => topic.title.clone(),
            None => capitalize(id),
        }
    }

    /// Accent color; unknown ids get the default
    pub fn color(&self, id: &str) -> &str {
        self.get(id)
            .map(|t| t.color.as_str())
            .unwrap_or(&self.default_color)
    }

    /// Previous and next topics; both absent for unknown ids
    pub fn adjacency(&self, id: &str) -> Adjacency<'_> {
        let Some(index) = self.position(id) else {
            return Adjacency {
                previous: None,
                next: None,
            };
        };

        Adjacency {
            previous: index.checked_sub(1).and_then(|i| self.topics.get(i)),
            next: self.topics.get(index + 1),
        }
    }

    /// Position in the course; `None` for unknown ids
    pub fn progress(&self, id: &str) -> Option<Progress> {
        self.position(id).map(|index| Progress {
            number: index + 1,
            count: self.topics.len(),
        })
    }
}

/// Uppercases the first character
pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("haloalkanes", None, Some("haloarenes"))]
    #[case("alcohols", Some("haloarenes"), Some("phenols"))]
    #[case("amines", Some("carboxylicacids"), None)]
    #[case("nitriles", None, None)]
    fn test_adjacency(#[case] id: &str, #[case] previous: Option<&str>, #[case] next: Option<&str>) {
        let registry = TopicRegistry::builtin();
        let adjacency = registry.adjacency(id);
        assert_eq!(adjacency.previous.map(|t| t.id.as_str()), previous);
        assert_eq!(adjacency.next.map(|t| t.id.as_str()), next);
    }

    #[test]
    fn test_adjacency_matches_position() {
        let registry = TopicRegistry::builtin();
        let last = registry.len() - 1;
        for (index, topic) in registry.topics().iter().enumerate() {
            let adjacency = registry.adjacency(&topic.id);
            assert_eq!(adjacency.previous.is_some(), index > 0);
            assert_eq!(adjacency.next.is_some(), index < last);
        }
    }

    #[test]
    fn test_unknown_topic_fallbacks() {
        let registry = TopicRegistry::builtin();
        assert_eq!(registry.title("nitriles"), "Nitriles");
        assert_eq!(registry.color("nitriles"), DEFAULT_TOPIC_COLOR);
        assert_eq!(registry.progress("nitriles"), None);
        assert_eq!(registry.title(""), "");
    }

    #[test]
    fn test_known_topic() {
        let registry = TopicRegistry::builtin();
        assert_eq!(registry.title("carboxylicacids"), "Carboxylic Acids");
        assert_eq!(registry.color("ketones"), "#55efc4");
        assert_eq!(registry.get("ethers").unwrap().path(), "/lessons/ethers");

        let progress = registry.progress("alcohols").unwrap();
        assert_eq!(progress.number, 3);
        assert_eq!(progress.count, 9);
    }

    #[test]
    fn test_custom_default_color() {
        let registry = TopicRegistry::builtin().with_default_color("#123456");
        assert_eq!(registry.color("nitriles"), "#123456");
    }
}
