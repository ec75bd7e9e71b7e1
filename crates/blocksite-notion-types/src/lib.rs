//! Wire models for the subset of the Notion API that blocksite reads.
//!
//! Every field is optional on the wire: the remote schema grows new block
//! kinds and properties over time, so deserialisation never rejects unknown
//! members and absent members fall back to their defaults.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::{Map, Value};

/// Paginated list envelope returned by `blocks/{id}/children`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListResponse<T> {
    #[serde(default = "Vec::new")]
    pub results: Vec<T>,
    #[serde(default)]
    pub has_more: bool,
    #[serde(default)]
    pub next_cursor: Option<String>,
}

/// A block object. The kind-specific payload lives under a key named after
/// the block type, so it is kept as raw JSON and decoded on demand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawBlock {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub has_children: bool,
    #[serde(flatten)]
    pub payload: Map<String, Value>,
}

impl RawBlock {
    /// Decode the payload stored under the block's own type key.
    ///
    /// Fields are decoded one at a time: a field that is absent or `null`
    /// takes its default, and a field that does not match its expected shape
    /// takes its default and is named in [`DecodedContent::dropped`]. Rich
    /// text lists keep every run that decodes.
    pub fn content(&self) -> DecodedContent {
        let mut dropped = Vec::new();
        let payload = match self.payload.get(&self.kind) {
            None | Some(Value::Null) => {
                return DecodedContent {
                    content: BlockContent::default(),
                    dropped,
                };
            }
            Some(Value::Object(payload)) => payload,
            Some(_) => {
                dropped.push(PAYLOAD_FIELD);
                return DecodedContent {
                    content: BlockContent::default(),
                    dropped,
                };
            }
        };

        let content = BlockContent {
            rich_text: runs(payload, "rich_text", &mut dropped),
            language: field(payload, "language", &mut dropped),
            icon: field(payload, "icon", &mut dropped),
            checked: field(payload, "checked", &mut dropped),
            caption: runs(payload, "caption", &mut dropped),
            file: field(payload, "file", &mut dropped),
            external: field(payload, "external", &mut dropped),
        };
        DecodedContent { content, dropped }
    }
}

/// Name reported in [`DecodedContent::dropped`] when the payload itself is
/// not an object.
pub const PAYLOAD_FIELD: &str = "payload";

/// A decoded payload together with the fields that had to be discarded.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DecodedContent {
    pub content: BlockContent,
    /// Payload keys whose values were malformed, in decode order. A rich
    /// text key appears once even when several of its runs were discarded.
    pub dropped: Vec<&'static str>,
}

fn field<T>(
    payload: &Map<String, Value>,
    key: &'static str,
    dropped: &mut Vec<&'static str>,
) -> T
where
    T: DeserializeOwned + Default,
{
    match payload.get(key) {
        None | Some(Value::Null) => T::default(),
        Some(value) => T::deserialize(value).unwrap_or_else(|_| {
            dropped.push(key);
            T::default()
        }),
    }
}

fn runs(
    payload: &Map<String, Value>,
    key: &'static str,
    dropped: &mut Vec<&'static str>,
) -> Vec<RichTextObject> {
    let items = match payload.get(key) {
        None | Some(Value::Null) => return Vec::new(),
        Some(Value::Array(items)) => items,
        Some(_) => {
            dropped.push(key);
            return Vec::new();
        }
    };

    let mut decoded = Vec::with_capacity(items.len());
    let mut lossy = false;
    for item in items {
        match RichTextObject::deserialize(item) {
            Ok(run) => decoded.push(run),
            Err(_) => lossy = true,
        }
    }
    if lossy {
        dropped.push(key);
    }
    decoded
}

/// Union of the payload fields used by the block kinds blocksite renders.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BlockContent {
    #[serde(default)]
    pub rich_text: Vec<RichTextObject>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub icon: Option<Icon>,
    #[serde(default)]
    pub checked: Option<bool>,
    #[serde(default)]
    pub caption: Vec<RichTextObject>,
    #[serde(default)]
    pub file: Option<FileObject>,
    #[serde(default)]
    pub external: Option<FileObject>,
}

impl BlockContent {
    /// URL of a hosted or external file payload, hosted files first.
    pub fn file_url(&self) -> Option<&str> {
        self.file
            .as_ref()
            .or(self.external.as_ref())
            .map(|file| file.url.as_str())
            .filter(|url| !url.is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RichTextObject {
    #[serde(default)]
    pub plain_text: String,
    #[serde(default)]
    pub text: Option<TextContent>,
}

impl RichTextObject {
    /// Plain text of the run. Older payloads only carry `text.content`.
    pub fn plain(&self) -> &str {
        if !self.plain_text.is_empty() {
            return &self.plain_text;
        }
        self.text
            .as_ref()
            .map(|text| text.content.as_str())
            .unwrap_or("")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextContent {
    #[serde(default)]
    pub content: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FileObject {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub expiry_time: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Icon {
    Emoji {
        #[serde(default)]
        emoji: String,
    },
    External {
        #[serde(default)]
        external: FileObject,
    },
    File {
        #[serde(default)]
        file: FileObject,
    },
    #[serde(other)]
    Other,
}

impl Icon {
    pub fn emoji(&self) -> Option<&str> {
        match self {
            Icon::Emoji { emoji } if !emoji.is_empty() => Some(emoji.as_str()),
            _ => None,
        }
    }
}

/// A page object returned by `pages/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawPage {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub last_edited_time: Option<String>,
    #[serde(default)]
    pub properties: BTreeMap<String, PageProperty>,
}

impl RawPage {
    /// Flattened text of the page's title property, if it has any text.
    ///
    /// Standalone pages name the property `title`; database rows use any
    /// name, so the property is located by its type.
    pub fn title(&self) -> Option<String> {
        let property = self
            .properties
            .get("title")
            .filter(|property| property.kind == "title")
            .or_else(|| {
                self.properties
                    .values()
                    .find(|property| property.kind == "title")
            })?;

        let text: String = property.title.iter().map(RichTextObject::plain).collect();
        let trimmed = text.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageProperty {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub title: Vec<RichTextObject>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_payload_is_decoded_from_its_type_key() {
        let block: RawBlock = serde_json::from_str(
            r#"{
                "object": "block",
                "id": "b1",
                "type": "code",
                "has_children": false,
                "code": {
                    "rich_text": [{"plain_text": "fn main() {}"}],
                    "language": "rust"
                }
            }"#,
        )
        .expect("block decodes");

        let decoded = block.content();
        let content = decoded.content;
        assert!(decoded.dropped.is_empty());
        assert_eq!(block.kind, "code");
        assert_eq!(content.language.as_deref(), Some("rust"));
        assert_eq!(content.rich_text[0].plain(), "fn main() {}");
    }

    #[test]
    fn malformed_fields_are_dropped_individually() {
        let block: RawBlock = serde_json::from_str(
            r#"{
                "id": "c1",
                "type": "callout",
                "callout": {
                    "icon": {"emoji": "x"},
                    "checked": "yes",
                    "rich_text": [{"plain_text": "Tip"}, {"plain_text": 7}, {"plain_text": "!"}]
                }
            }"#,
        )
        .expect("block decodes");

        let decoded = block.content();
        let text: Vec<&str> = decoded
            .content
            .rich_text
            .iter()
            .map(RichTextObject::plain)
            .collect();
        assert_eq!(text, vec!["Tip", "!"]);
        assert_eq!(decoded.content.icon, None);
        assert_eq!(decoded.content.checked, None);
        assert_eq!(decoded.dropped, vec!["rich_text", "icon", "checked"]);
    }

    #[test]
    fn null_fields_take_defaults_silently() {
        let block: RawBlock = serde_json::from_str(
            r#"{"id": "i1", "type": "image",
                "image": {"external": {"url": "https://x/a.png"}, "caption": null, "file": null}}"#,
        )
        .expect("block decodes");

        let decoded = block.content();
        assert!(decoded.dropped.is_empty());
        assert!(decoded.content.caption.is_empty());
        assert_eq!(decoded.content.file_url(), Some("https://x/a.png"));
    }

    #[test]
    fn non_object_payload_is_reported() {
        let block: RawBlock =
            serde_json::from_str(r#"{"id": "p", "type": "paragraph", "paragraph": "text"}"#)
                .expect("block decodes");

        let decoded = block.content();
        assert_eq!(decoded.content, BlockContent::default());
        assert_eq!(decoded.dropped, vec![PAYLOAD_FIELD]);
    }

    #[test]
    fn unknown_icon_types_fall_back_to_other() {
        let icon: Icon =
            serde_json::from_str(r#"{"type": "custom_emoji", "custom_emoji": {}}"#).expect("icon");
        assert_eq!(icon, Icon::Other);
        assert_eq!(icon.emoji(), None);
    }

    #[test]
    fn page_title_is_found_by_property_type() {
        let page: RawPage = serde_json::from_str(
            r#"{
                "id": "p1",
                "last_edited_time": "2024-05-01T10:00:00.000Z",
                "properties": {
                    "Name": {"type": "title", "title": [{"text": {"content": "Handbook"}}]},
                    "Tags": {"type": "multi_select", "multi_select": []}
                }
            }"#,
        )
        .expect("page decodes");

        assert_eq!(page.title().as_deref(), Some("Handbook"));
    }

    #[test]
    fn list_response_defaults_missing_members() {
        let list: ListResponse<RawBlock> = serde_json::from_str("{}").expect("list decodes");
        assert!(list.results.is_empty());
        assert!(!list.has_more);
        assert_eq!(list.next_cursor, None);
    }
}
