//! Content source backed by recorded API responses on disk.
//!
//! Layout under the snapshot root:
//!
//! - `pages/<id>.json`: page object for a document.
//! - `blocks/<id>.json`: first page of the child listing of a block or page.
//! - `blocks/<id>.<cursor>.json`: the page fetched with `start_cursor`.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use blocksite_notion_types::{ListResponse, RawBlock, RawPage};
use serde::de::DeserializeOwned;
use tokio::fs;
use tracing::{debug, warn};

use crate::application::repos::{ContentSource, SourceError};
use crate::domain::blocks::Block;
use crate::domain::pages::{DocumentId, DocumentMetadata};

const PAGES_DIR: &str = "pages";
const BLOCKS_DIR: &str = "blocks";

#[derive(Debug, Clone)]
pub struct SnapshotSource {
    root: PathBuf,
}

impl SnapshotSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn page_path(&self, id: &str) -> PathBuf {
        self.root.join(PAGES_DIR).join(format!("{id}.json"))
    }

    fn children_path(&self, parent_id: &str, cursor: Option<&str>) -> PathBuf {
        let name = match cursor {
            Some(cursor) => format!("{parent_id}.{cursor}.json"),
            None => format!("{parent_id}.json"),
        };
        self.root.join(BLOCKS_DIR).join(name)
    }
}

#[async_trait]
impl ContentSource for SnapshotSource {
    async fn fetch_children(&self, parent_id: &str) -> Result<Vec<Block>, SourceError> {
        ensure_file_safe(parent_id)?;

        let mut blocks = Vec::new();
        let mut seen_cursors = HashSet::new();
        let mut cursor: Option<String> = None;

        loop {
            let path = self.children_path(parent_id, cursor.as_deref());
            let listing: ListResponse<RawBlock> = match read_json(&path).await {
                Ok(listing) => listing,
                Err(SourceError::NotFound { .. }) if cursor.is_none() => {
                    warn!(
                        target = "infra::snapshot",
                        parent = parent_id,
                        path = %path.display(),
                        "no recorded children; treating as empty"
                    );
                    return Ok(Vec::new());
                }
                Err(err) => return Err(err),
            };

            blocks.extend(listing.results.iter().map(Block::from_raw));

            let next = match (listing.has_more, listing.next_cursor) {
                (true, Some(next)) => next,
                _ => break,
            };
            ensure_file_safe(&next)?;
            if !seen_cursors.insert(next.clone()) {
                return Err(SourceError::malformed(
                    path.display().to_string(),
                    format!("cursor `{next}` repeats"),
                ));
            }
            cursor = Some(next);
        }

        debug!(
            target = "infra::snapshot",
            parent = parent_id,
            count = blocks.len(),
            pages = seen_cursors.len() + 1,
            "children loaded"
        );
        Ok(blocks)
    }

    async fn fetch_metadata(
        &self,
        document: &DocumentId,
    ) -> Result<DocumentMetadata, SourceError> {
        ensure_file_safe(document.as_str())?;

        let page: RawPage = read_json(&self.page_path(document.as_str())).await?;
        let last_modified = page.last_edited_time.clone().unwrap_or_default();
        if last_modified.is_empty() {
            debug!(
                target = "infra::snapshot",
                document = %document,
                "page has no last_edited_time; cache will not apply"
            );
        }
        Ok(DocumentMetadata::new(page.title(), last_modified))
    }
}

/// Identifiers and cursors become file name segments.
fn ensure_file_safe(segment: &str) -> Result<(), SourceError> {
    let valid = !segment.is_empty()
        && segment
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '-' | '_' | '='));
    if valid {
        Ok(())
    } else {
        Err(SourceError::malformed(
            segment,
            "identifier is not a valid snapshot file name",
        ))
    }
}

async fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, SourceError> {
    let bytes = match fs::read(path).await {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return Err(SourceError::not_found(path.display().to_string()));
        }
        Err(err) => {
            return Err(SourceError::Io {
                path: path.display().to_string(),
                source: err,
            });
        }
    };

    serde_json::from_slice(&bytes)
        .map_err(|err| SourceError::malformed(path.display().to_string(), err))
}

#[cfg(test)]
mod tests {
    use tempfile::{TempDir, tempdir};

    use super::*;
    use crate::domain::blocks::BlockKind;

    fn snapshot() -> (TempDir, SnapshotSource) {
        let dir = tempdir().expect("tempdir");
        std::fs::create_dir_all(dir.path().join(PAGES_DIR)).expect("pages dir");
        std::fs::create_dir_all(dir.path().join(BLOCKS_DIR)).expect("blocks dir");
        let source = SnapshotSource::new(dir.path());
        (dir, source)
    }

    fn write(dir: &TempDir, relative: &str, body: &str) {
        std::fs::write(dir.path().join(relative), body).expect("write fixture");
    }

    #[tokio::test]
    async fn metadata_reads_title_and_stamp() {
        let (dir, source) = snapshot();
        write(
            &dir,
            "pages/doc1.json",
            r#"{"id": "doc1", "last_edited_time": "2024-05-01T10:00:00.000Z",
                "properties": {"Name": {"type": "title", "title": [{"plain_text": "Guide"}]}}}"#,
        );

        let metadata = source
            .fetch_metadata(&DocumentId::new("doc1"))
            .await
            .expect("metadata");
        assert_eq!(metadata.title, "Guide");
        assert_eq!(metadata.last_modified, "2024-05-01T10:00:00.000Z");
    }

    #[tokio::test]
    async fn metadata_defaults_missing_title() {
        let (dir, source) = snapshot();
        write(&dir, "pages/doc2.json", r#"{"id": "doc2"}"#);

        let metadata = source
            .fetch_metadata(&DocumentId::new("doc2"))
            .await
            .expect("metadata");
        assert_eq!(metadata.title, "Untitled");
        assert_eq!(metadata.last_modified, "");
    }

    #[tokio::test]
    async fn missing_page_is_not_found() {
        let (_dir, source) = snapshot();
        let err = source
            .fetch_metadata(&DocumentId::new("absent"))
            .await
            .expect_err("missing page");
        assert!(matches!(err, SourceError::NotFound { .. }));
    }

    #[tokio::test]
    async fn children_follow_cursor_pages() {
        let (dir, source) = snapshot();
        write(
            &dir,
            "blocks/doc.json",
            r#"{"results": [{"id": "p1", "type": "paragraph", "paragraph": {"rich_text": [{"plain_text": "one"}]}}],
                "has_more": true, "next_cursor": "c2"}"#,
        );
        write(
            &dir,
            "blocks/doc.c2.json",
            r#"{"results": [{"id": "h1", "type": "heading_1", "has_children": false, "heading_1": {"rich_text": [{"plain_text": "two"}]}}],
                "has_more": false, "next_cursor": null}"#,
        );

        let blocks = source.fetch_children("doc").await.expect("children");
        let ids: Vec<&str> = blocks.iter().map(|block| block.id.as_str()).collect();
        assert_eq!(ids, vec!["p1", "h1"]);
        assert_eq!(blocks[1].kind, BlockKind::Heading { level: 1 });
    }

    #[tokio::test]
    async fn missing_child_listing_is_empty() {
        let (_dir, source) = snapshot();
        assert!(source.fetch_children("leaf").await.expect("children").is_empty());
    }

    #[tokio::test]
    async fn repeating_cursor_is_malformed() {
        let (dir, source) = snapshot();
        write(
            &dir,
            "blocks/doc.json",
            r#"{"results": [], "has_more": true, "next_cursor": "again"}"#,
        );
        write(
            &dir,
            "blocks/doc.again.json",
            r#"{"results": [], "has_more": true, "next_cursor": "again"}"#,
        );

        let err = source.fetch_children("doc").await.expect_err("cursor loop");
        assert!(matches!(err, SourceError::Malformed { .. }));
    }

    #[tokio::test]
    async fn path_like_identifiers_are_rejected() {
        let (_dir, source) = snapshot();
        let err = source
            .fetch_children("../secret")
            .await
            .expect_err("unsafe id");
        assert!(matches!(err, SourceError::Malformed { .. }));
    }

    #[tokio::test]
    async fn missing_cursor_page_fails() {
        let (dir, source) = snapshot();
        write(
            &dir,
            "blocks/doc.json",
            r#"{"results": [], "has_more": true, "next_cursor": "gone"}"#,
        );

        let err = source.fetch_children("doc").await.expect_err("missing page");
        assert!(matches!(err, SourceError::NotFound { .. }));
    }
}
