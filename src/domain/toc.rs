//! Table of contents derived from the headings a render pass encountered.

use serde::{Deserialize, Serialize};

/// One heading seen while rendering, in document order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TocEntry {
    pub level: u8,
    pub anchor: String,
    pub text: String,
}

impl TocEntry {
    pub fn new(level: u8, anchor: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            level,
            anchor: anchor.into(),
            text: text.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TocNode {
    pub level: u8,
    pub anchor: String,
    pub text: String,
    pub children: Vec<TocNode>,
}

impl TocNode {
    fn leaf(entry: &TocEntry) -> Self {
        Self {
            level: entry.level,
            anchor: entry.anchor.clone(),
            text: entry.text.trim().to_string(),
            children: Vec::new(),
        }
    }
}

/// Nest entries by level: each entry becomes a child of the closest
/// preceding entry with a strictly smaller level, or a root otherwise.
///
/// Level gaps are tolerated (`h1` followed by `h3` nests the `h3` directly
/// under the `h1`) and a document starting below level 1 simply has deeper
/// roots.
pub fn build_toc(entries: &[TocEntry]) -> Vec<TocNode> {
    let mut roots = Vec::new();
    for entry in entries {
        insert_node(&mut roots, TocNode::leaf(entry));
    }
    roots
}

fn insert_node(siblings: &mut Vec<TocNode>, node: TocNode) {
    match siblings.last_mut() {
        Some(previous) if previous.level < node.level => {
            insert_node(&mut previous.children, node)
        }
        _ => siblings.push(node),
    }
}

/// Flat event stream for templates, which cannot recurse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TocEvent {
    StartList,
    EndList,
    StartItem {
        anchor: String,
        title: String,
        level: u8,
    },
    EndItem,
}

pub fn toc_events(nodes: &[TocNode]) -> Vec<TocEvent> {
    let mut events = Vec::new();
    if !nodes.is_empty() {
        append_toc_events(nodes, &mut events);
    }
    events
}

fn append_toc_events(nodes: &[TocNode], events: &mut Vec<TocEvent>) {
    events.push(TocEvent::StartList);

    for node in nodes {
        events.push(TocEvent::StartItem {
            anchor: node.anchor.clone(),
            title: node.text.clone(),
            level: node.level,
        });

        if !node.children.is_empty() {
            append_toc_events(&node.children, events);
        }

        events.push(TocEvent::EndItem);
    }

    events.push(TocEvent::EndList);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shape(nodes: &[TocNode]) -> Vec<(String, Vec<String>)> {
        nodes
            .iter()
            .map(|node| {
                (
                    node.anchor.clone(),
                    node.children.iter().map(|c| c.anchor.clone()).collect(),
                )
            })
            .collect()
    }

    #[test]
    fn nests_entries_under_shallower_headings() {
        let entries = vec![
            TocEntry::new(1, "intro", "Intro"),
            TocEntry::new(2, "setup", "Setup"),
            TocEntry::new(2, "usage", "Usage"),
            TocEntry::new(1, "next", "Next"),
        ];

        let tree = build_toc(&entries);
        assert_eq!(
            shape(&tree),
            vec![
                (
                    "intro".to_string(),
                    vec!["setup".to_string(), "usage".to_string()]
                ),
                ("next".to_string(), vec![]),
            ]
        );
    }

    #[test]
    fn level_gaps_and_deep_starts_are_tolerated() {
        let entries = vec![
            TocEntry::new(3, "deep", "Deep"),
            TocEntry::new(1, "top", "Top"),
            TocEntry::new(3, "skip", "Skip"),
        ];

        let tree = build_toc(&entries);
        assert_eq!(tree.len(), 2);
        assert_eq!(tree[0].anchor, "deep");
        assert_eq!(tree[1].children[0].anchor, "skip");
    }

    #[test]
    fn events_are_balanced() {
        let entries = vec![
            TocEntry::new(1, "a", "A"),
            TocEntry::new(2, "b", "B"),
            TocEntry::new(3, "c", "C"),
            TocEntry::new(1, "d", "D"),
        ];

        let events = toc_events(&build_toc(&entries));
        let starts = events
            .iter()
            .filter(|event| matches!(event, TocEvent::StartList))
            .count();
        let ends = events
            .iter()
            .filter(|event| matches!(event, TocEvent::EndList))
            .count();
        assert_eq!(starts, 3);
        assert_eq!(starts, ends);
        assert_eq!(events.first(), Some(&TocEvent::StartList));
        assert_eq!(events.last(), Some(&TocEvent::EndList));
    }

    #[test]
    fn empty_toc_has_no_events() {
        assert!(toc_events(&build_toc(&[])).is_empty());
    }
}
