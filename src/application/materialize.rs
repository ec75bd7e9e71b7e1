//! Fetch a document's full block tree before it is rendered.

use futures::future::BoxFuture;
use tracing::debug;

use crate::application::render::DEFAULT_MAX_DEPTH;
use crate::application::repos::{ContentSource, SourceError};
use crate::domain::blocks::{Block, BlockKind};

/// Walks a content source depth-first and fills in every `children` list.
///
/// Siblings are fetched strictly in order and a block's subtree is complete
/// before its next sibling is requested. Children of unsupported blocks are
/// never fetched since they would not be rendered.
pub struct TreeMaterializer<'a> {
    source: &'a dyn ContentSource,
    max_depth: usize,
}

impl<'a> TreeMaterializer<'a> {
    pub fn new(source: &'a dyn ContentSource) -> Self {
        Self {
            source,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Top-level blocks of `root_id` with all descendants attached.
    pub async fn materialize(&self, root_id: &str) -> Result<Vec<Block>, SourceError> {
        self.fetch_level(root_id.to_string(), 0).await
    }

    fn fetch_level<'s>(
        &'s self,
        parent_id: String,
        depth: usize,
    ) -> BoxFuture<'s, Result<Vec<Block>, SourceError>> {
        Box::pin(async move {
            let mut blocks = self.source.fetch_children(&parent_id).await?;

            for block in &mut blocks {
                if !block.has_children {
                    continue;
                }
                if let BlockKind::Unsupported { tag } = &block.kind {
                    debug!(
                        target = "application::materialize",
                        block_id = %block.id,
                        tag = %tag,
                        "not descending into unsupported block"
                    );
                    continue;
                }
                if depth + 1 > self.max_depth {
                    return Err(SourceError::TooDeep {
                        block_id: block.id.clone(),
                        max_depth: self.max_depth,
                    });
                }

                block.children = self.fetch_level(block.id.clone(), depth + 1).await?;
            }

            Ok(blocks)
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::domain::pages::{DocumentId, DocumentMetadata};

    #[derive(Default)]
    struct MemorySource {
        children: HashMap<String, Vec<Block>>,
        requests: Mutex<Vec<String>>,
    }

    impl MemorySource {
        fn with(mut self, parent: &str, blocks: Vec<Block>) -> Self {
            self.children.insert(parent.to_string(), blocks);
            self
        }

        fn requests(&self) -> Vec<String> {
            self.requests.lock().expect("requests lock").clone()
        }
    }

    #[async_trait]
    impl ContentSource for MemorySource {
        async fn fetch_children(&self, parent_id: &str) -> Result<Vec<Block>, SourceError> {
            self.requests
                .lock()
                .expect("requests lock")
                .push(parent_id.to_string());
            self.children
                .get(parent_id)
                .cloned()
                .ok_or_else(|| SourceError::not_found(parent_id))
        }

        async fn fetch_metadata(
            &self,
            document: &DocumentId,
        ) -> Result<DocumentMetadata, SourceError> {
            Err(SourceError::not_found(document.as_str()))
        }
    }

    fn parent(id: &str, kind: BlockKind) -> Block {
        let mut block = Block::new(kind, id).with_id(id);
        block.has_children = true;
        block
    }

    #[tokio::test]
    async fn fetches_depth_first_in_sibling_order() {
        let source = MemorySource::default()
            .with(
                "doc",
                vec![
                    parent("a", BlockKind::BulletedListItem),
                    parent("b", BlockKind::Toggle),
                ],
            )
            .with("a", vec![parent("a1", BlockKind::Quote)])
            .with("a1", vec![Block::new(BlockKind::Paragraph, "deep")])
            .with("b", vec![Block::new(BlockKind::Paragraph, "inside b")]);

        let tree = TreeMaterializer::new(&source)
            .materialize("doc")
            .await
            .expect("tree");

        assert_eq!(source.requests(), vec!["doc", "a", "a1", "b"]);
        assert_eq!(tree[0].children[0].children[0].plain_text(), "deep");
        assert_eq!(tree[1].children[0].plain_text(), "inside b");
    }

    #[tokio::test]
    async fn skips_children_of_unsupported_blocks() {
        let unsupported = parent(
            "u",
            BlockKind::Unsupported {
                tag: "column_list".to_string(),
            },
        );
        let source = MemorySource::default().with("doc", vec![unsupported]);

        let tree = TreeMaterializer::new(&source)
            .materialize("doc")
            .await
            .expect("tree");

        assert_eq!(source.requests(), vec!["doc"]);
        assert!(tree[0].children.is_empty());
    }

    #[tokio::test]
    async fn missing_children_fail_the_document() {
        let source =
            MemorySource::default().with("doc", vec![parent("gone", BlockKind::Paragraph)]);

        let err = TreeMaterializer::new(&source)
            .materialize("doc")
            .await
            .expect_err("missing child list");
        assert!(matches!(err, SourceError::NotFound { id } if id == "gone"));
    }

    #[tokio::test]
    async fn cyclic_trees_hit_the_depth_limit() {
        let source = MemorySource::default()
            .with("doc", vec![parent("loop", BlockKind::Toggle)])
            .with("loop", vec![parent("loop", BlockKind::Toggle)]);

        let err = TreeMaterializer::new(&source)
            .with_max_depth(4)
            .materialize("doc")
            .await
            .expect_err("depth limit");
        assert!(matches!(err, SourceError::TooDeep { max_depth: 4, .. }));
    }
}
