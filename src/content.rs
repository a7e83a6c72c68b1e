//! Backend-neutral content nodes produced by the section renderers.

use serde::Serialize;

use crate::model::{Placement, SectionType};
use crate::richtext::Block;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ContentNode {
    /// Section heading.
    Title { text: String },
    /// The person's name at the top of the document header.
    Headline { text: String },
    /// A secondary line: role, company, date range.
    Subtitle { text: String, emphasis: bool },
    Paragraph { blocks: Vec<Block> },
    TagGroup { tags: Vec<String> },
    Image { src: String, alt: String },
    /// Label-free values joined on one line.
    KeyValueLine { parts: Vec<String> },
}

impl ContentNode {
    pub fn subtitle(text: impl Into<String>) -> Self {
        ContentNode::Subtitle {
            text: text.into(),
            emphasis: false,
        }
    }

    pub fn emphasized(text: impl Into<String>) -> Self {
        ContentNode::Subtitle {
            text: text.into(),
            emphasis: true,
        }
    }

    /// Plain-text rendering used by flat emitters and tests.
    pub fn plain_text(&self) -> String {
        match self {
            ContentNode::Title { text }
            | ContentNode::Headline { text }
            | ContentNode::Subtitle { text, .. } => text.clone(),
            ContentNode::Paragraph { blocks } => crate::richtext::plain_text(blocks),
            ContentNode::TagGroup { tags } => tags.join(", "),
            ContentNode::Image { alt, .. } => alt.clone(),
            ContentNode::KeyValueLine { parts } => parts.join(" | "),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ContentNode::Title { .. } => "title",
            ContentNode::Headline { .. } => "headline",
            ContentNode::Subtitle { .. } => "subtitle",
            ContentNode::Paragraph { .. } => "paragraph",
            ContentNode::TagGroup { .. } => "tag_group",
            ContentNode::Image { .. } => "image",
            ContentNode::KeyValueLine { .. } => "key_value_line",
        }
    }
}

/// One repeatable entry of a section (an experience, a skill group, ...).
/// Pagination never splits inside an item.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SectionItem {
    pub nodes: Vec<ContentNode>,
}

impl SectionItem {
    pub fn new(nodes: Vec<ContentNode>) -> Self {
        Self { nodes }
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Output of one section renderer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedSection {
    pub id: String,
    pub section_type: SectionType,
    pub display_order: i32,
    /// Index in the document's section sequence after ordering; page breaks
    /// split the document by it.
    #[serde(skip)]
    pub position: usize,
    #[serde(skip)]
    pub placement: Option<Placement>,
    /// `None` for the document header and page breaks.
    pub title: Option<String>,
    pub items: Vec<SectionItem>,
}

impl RenderedSection {
    /// Title node (when any) followed by every item's nodes.
    pub fn nodes(&self) -> Vec<ContentNode> {
        let title = self.title.iter().map(|text| ContentNode::Title { text: text.clone() });
        title
            .chain(self.items.iter().flat_map(|i| i.nodes.iter().cloned()))
            .collect()
    }

    pub fn is_page_break(&self) -> bool {
        self.section_type == SectionType::PageBreak
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nodes_put_title_first() {
        let section = RenderedSection {
            id: "x".into(),
            section_type: SectionType::Achievements,
            display_order: 1,
            position: 0,
            placement: None,
            title: Some("Achievements".into()),
            items: vec![SectionItem::new(vec![ContentNode::subtitle("Award")])],
        };
        let nodes = section.nodes();
        assert_eq!(nodes[0], ContentNode::Title { text: "Achievements".into() });
        assert_eq!(nodes[1].plain_text(), "Award");
    }

    #[test]
    fn nodes_serialize_with_kind_tag() {
        let json = serde_json::to_value(ContentNode::TagGroup {
            tags: vec!["Rust".into()],
        })
        .unwrap();
        assert_eq!(json["kind"], "tag_group");
        assert_eq!(json["tags"][0], "Rust");
    }
}
