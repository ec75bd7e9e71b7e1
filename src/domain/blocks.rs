//! Content blocks as the renderer sees them.
//!
//! Blocks are decoded from the loosely-typed wire objects once, at the edge,
//! into a closed set of kinds. Anything the renderer does not understand is
//! kept as [`BlockKind::Unsupported`] so newer remote schemas never break a
//! build.

use blocksite_notion_types::{BlockContent, RawBlock, RichTextObject};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Highest heading level emitted as an `<hN>` element.
pub const MAX_HEADING_LEVEL: u8 = 6;

/// One styled run of text. Formatting is decorative and dropped on decode.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RichText {
    pub plain_text: String,
}

impl RichText {
    pub fn new(plain_text: impl Into<String>) -> Self {
        Self {
            plain_text: plain_text.into(),
        }
    }
}

impl From<&RichTextObject> for RichText {
    fn from(object: &RichTextObject) -> Self {
        Self::new(object.plain())
    }
}

/// Concatenate runs in order without separators.
pub fn flatten(runs: &[RichText]) -> String {
    runs.iter().map(|run| run.plain_text.as_str()).collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlockKind {
    Paragraph,
    Heading { level: u8 },
    BulletedListItem,
    NumberedListItem,
    Code { language: Option<String> },
    Image { url: Option<String>, caption: Vec<RichText> },
    Quote,
    Callout { icon: Option<String> },
    Divider,
    ToDo { checked: bool },
    Toggle,
    Unsupported { tag: String },
}

impl BlockKind {
    /// Map a wire type tag plus its payload onto a kind.
    fn from_tag(tag: &str, content: &BlockContent) -> Self {
        match tag {
            "paragraph" => BlockKind::Paragraph,
            "bulleted_list_item" => BlockKind::BulletedListItem,
            "numbered_list_item" => BlockKind::NumberedListItem,
            "code" => BlockKind::Code {
                language: content
                    .language
                    .as_ref()
                    .map(|language| language.trim().to_string())
                    .filter(|language| !language.is_empty()),
            },
            "image" => BlockKind::Image {
                url: content.file_url().map(str::to_string),
                caption: content.caption.iter().map(RichText::from).collect(),
            },
            "quote" => BlockKind::Quote,
            "callout" => BlockKind::Callout {
                icon: content
                    .icon
                    .as_ref()
                    .and_then(|icon| icon.emoji())
                    .map(str::to_string),
            },
            "divider" => BlockKind::Divider,
            "to_do" => BlockKind::ToDo {
                checked: content.checked.unwrap_or(false),
            },
            "toggle" => BlockKind::Toggle,
            other => match parse_heading_level(other) {
                Some(level) => BlockKind::Heading { level },
                None => BlockKind::Unsupported {
                    tag: other.to_string(),
                },
            },
        }
    }
}

fn parse_heading_level(tag: &str) -> Option<u8> {
    let level: u8 = tag.strip_prefix("heading_")?.parse().ok()?;
    (1..=MAX_HEADING_LEVEL).contains(&level).then_some(level)
}

/// A node of the content tree. Children are empty until the tree is
/// materialised from the content source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub id: String,
    pub kind: BlockKind,
    pub text: Vec<RichText>,
    pub has_children: bool,
    pub children: Vec<Block>,
}

impl Block {
    pub fn new(kind: BlockKind, text: &str) -> Self {
        let text = if text.is_empty() {
            Vec::new()
        } else {
            vec![RichText::new(text)]
        };
        Self {
            id: String::new(),
            kind,
            text,
            has_children: false,
            children: Vec::new(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_children(mut self, children: Vec<Block>) -> Self {
        self.has_children = !children.is_empty();
        self.children = children;
        self
    }

    /// Decode a wire block. Missing or malformed payload fields fall back to
    /// their defaults one by one; the rest of the payload is kept.
    pub fn from_raw(raw: &RawBlock) -> Self {
        let decoded = raw.content();
        for field in &decoded.dropped {
            debug!(
                target = "domain::blocks",
                block_id = %raw.id,
                kind = %raw.kind,
                field = %field,
                "malformed payload field replaced by its default"
            );
        }
        let content = decoded.content;
        let kind = BlockKind::from_tag(raw.kind.as_str(), &content);
        Self {
            id: raw.id.clone(),
            kind,
            text: content.rich_text.iter().map(RichText::from).collect(),
            has_children: raw.has_children,
            children: Vec::new(),
        }
    }

    pub fn plain_text(&self) -> String {
        flatten(&self.text)
    }
}
