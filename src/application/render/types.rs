use thiserror::Error;

use crate::domain::blocks::Block;
use crate::domain::toc::TocEntry;

/// Output of rendering one block sequence.
///
/// `html` holds fragments in emission order. List markers are synthesized
/// fragments, so fragments do not map one-to-one onto blocks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderResult {
    pub html: Vec<String>,
    pub toc_entries: Vec<TocEntry>,
}

impl RenderResult {
    /// Joined document body, one fragment per line.
    pub fn to_html(&self) -> String {
        self.html.join("\n")
    }

    /// Splice a nested result after everything emitted so far.
    pub(crate) fn append(&mut self, nested: RenderResult) {
        self.html.extend(nested.html);
        self.toc_entries.extend(nested.toc_entries);
    }
}

/// Structured errors surfaced by the rendering pipeline.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RenderError {
    #[error("block `{block_id}` is nested deeper than {max_depth} levels")]
    DepthExceeded { block_id: String, max_depth: usize },
}

/// Implementations must be pure and deterministic: given the same blocks,
/// they return identical outputs or errors. Anchors are unique per call.
pub trait RenderService: Send + Sync {
    fn render(&self, blocks: &[Block]) -> Result<RenderResult, RenderError>;
}
