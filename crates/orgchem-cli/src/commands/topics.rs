use super::load_config;
use anyhow::Result;
use colored::Colorize;
use orgchem::TopicRegistry;
use std::path::Path;

pub fn execute(config: Option<&Path>) -> Result<()> {
    let config = load_config(config, None)?;
    let registry = config.topic_registry();

    println!("{}", format!("{} topics", registry.len()).green().bold());
    println!();
    for row in rows(&registry) {
        println!(
            "{:>2}. {:<16} {:<18} {}  {} {}  {} {}",
            row.number,
            row.id.cyan(),
            row.title,
            row.color.dimmed(),
            "←".dimmed(),
            row.previous.as_deref().unwrap_or("-"),
            "→".dimmed(),
            row.next.as_deref().unwrap_or("-")
        );
    }

    Ok(())
}

/// One line of the topic listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicRow {
    pub number: usize,
    pub id: String,
    pub title: String,
    pub color: String,
    pub previous: Option<String>,
    pub next: Option<String>,
}

pub fn rows(registry: &TopicRegistry) -> Vec<TopicRow> {
    registry
        .topics()
        .iter()
        .enumerate()
        .map(|(index, topic)| {
            let adjacency = registry.adjacency(&topic.id);
            TopicRow {
                number: index + 1,
                id: topic.id.clone(),
                title: topic.title.clone(),
                color: topic.color.clone(),
                previous: adjacency.previous.map(|t| t.id.clone()),
                next: adjacency.next.map(|t| t.id.clone()),
            }
        })
        .collect()
}
