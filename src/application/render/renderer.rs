use tracing::debug;

use crate::domain::blocks::{Block, BlockKind, flatten};
use crate::domain::slug::AnchorSlugger;
use crate::domain::toc::TocEntry;

use super::escape::{escape_attribute, escape_prose, escape_text};
use super::lists::ListGrouping;
use super::types::{RenderError, RenderResult, RenderService};

pub const DEFAULT_MAX_DEPTH: usize = 64;
const DEFAULT_CODE_LANGUAGE: &str = "plaintext";
const DEFAULT_IMAGE_ALT: &str = "Image";

/// Renders materialised block trees into HTML fragments and TOC entries.
#[derive(Debug, Clone)]
pub struct BlockRenderer {
    max_depth: usize,
}

impl BlockRenderer {
    pub fn new() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    pub fn with_max_depth(max_depth: usize) -> Self {
        Self { max_depth }
    }
}

impl Default for BlockRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderService for BlockRenderer {
    fn render(&self, blocks: &[Block]) -> Result<RenderResult, RenderError> {
        let mut pass = RenderPass {
            slugger: AnchorSlugger::new(),
            max_depth: self.max_depth,
        };
        pass.render_sequence(blocks, 0)
    }
}

/// State scoped to a single `render` call.
struct RenderPass {
    slugger: AnchorSlugger,
    max_depth: usize,
}

impl RenderPass {
    fn render_sequence(
        &mut self,
        blocks: &[Block],
        depth: usize,
    ) -> Result<RenderResult, RenderError> {
        let mut result = RenderResult::default();
        let mut lists = ListGrouping::default();

        for block in blocks {
            if let BlockKind::Unsupported { tag } = &block.kind {
                debug!(
                    target = "application::render",
                    block_id = %block.id,
                    tag = %tag,
                    "skipping unsupported block"
                );
                continue;
            }

            lists.visit(&block.kind, &mut result.html);
            self.render_block(block, depth, &mut result)?;
        }

        lists.finish(&mut result.html);
        Ok(result)
    }

    fn render_block(
        &mut self,
        block: &Block,
        depth: usize,
        out: &mut RenderResult,
    ) -> Result<(), RenderError> {
        let text = flatten(&block.text);

        let closing = match &block.kind {
            BlockKind::Paragraph => {
                out.html.push(format!("<p>{}</p>", escape_prose(&text)));
                None
            }
            BlockKind::Heading { level } => {
                let anchor = self.slugger.anchor_for(&text);
                out.html.push(format!(
                    "<h{level} id=\"{}\">{}</h{level}>",
                    escape_attribute(&anchor),
                    escape_prose(&text)
                ));
                out.toc_entries.push(TocEntry::new(*level, anchor, text.trim()));
                None
            }
            BlockKind::BulletedListItem | BlockKind::NumberedListItem => {
                Some(open(out, format!("<li>{}", escape_prose(&text)), "</li>"))
            }
            BlockKind::Code { language } => {
                let language = language.as_deref().unwrap_or(DEFAULT_CODE_LANGUAGE);
                out.html.push(format!(
                    "<pre><code class=\"language-{}\">{}</code></pre>",
                    escape_attribute(language),
                    escape_text(&text)
                ));
                None
            }
            BlockKind::Image { url, caption } => {
                if let Some(url) = url {
                    out.html.push(image_html(url, &flatten(caption)));
                }
                None
            }
            BlockKind::Quote => Some(open(
                out,
                format!("<blockquote>{}", escape_prose(&text)),
                "</blockquote>",
            )),
            BlockKind::Callout { icon } => {
                let icon_html = icon
                    .as_deref()
                    .map(|icon| format!("<span class=\"callout-icon\">{}</span> ", escape_text(icon)))
                    .unwrap_or_default();
                Some(open(
                    out,
                    format!("<div class=\"callout\">{icon_html}{}", escape_prose(&text)),
                    "</div>",
                ))
            }
            BlockKind::Divider => {
                out.html.push("<hr>".to_string());
                None
            }
            BlockKind::ToDo { checked } => {
                let checked = if *checked { " checked" } else { "" };
                Some(open(
                    out,
                    format!(
                        "<div class=\"to-do\"><input type=\"checkbox\" disabled{checked}> {}",
                        escape_prose(&text)
                    ),
                    "</div>",
                ))
            }
            BlockKind::Toggle => Some(open(
                out,
                format!("<details><summary>{}</summary>", escape_prose(&text)),
                "</details>",
            )),
            BlockKind::Unsupported { .. } => return Ok(()),
        };

        let emitted = out.html.len();
        if !block.children.is_empty() {
            if depth >= self.max_depth {
                return Err(RenderError::DepthExceeded {
                    block_id: block.id.clone(),
                    max_depth: self.max_depth,
                });
            }
            let nested = self.render_sequence(&block.children, depth + 1)?;
            out.append(nested);
        }

        if let Some(closing) = closing {
            close(out, closing, out.html.len() == emitted);
        }

        Ok(())
    }
}

/// Push an opening fragment and hand back its closing tag.
fn open(out: &mut RenderResult, opening: String, closing: &'static str) -> &'static str {
    out.html.push(opening);
    closing
}

/// Wrappers that emitted no child fragments fold into a single fragment.
fn close(out: &mut RenderResult, closing: &'static str, childless: bool) {
    match out.html.last_mut() {
        Some(last) if childless => last.push_str(closing),
        _ => out.html.push(closing.to_string()),
    }
}

fn image_html(url: &str, caption: &str) -> String {
    let caption = caption.trim();
    let alt = if caption.is_empty() {
        DEFAULT_IMAGE_ALT
    } else {
        caption
    };

    let mut html = String::with_capacity(url.len() + alt.len() + 96);
    html.push_str("<figure><img src=\"");
    html.push_str(&escape_attribute(url));
    html.push_str("\" alt=\"");
    html.push_str(&escape_attribute(alt));
    html.push_str("\" loading=\"lazy\" decoding=\"async\">");
    if !caption.is_empty() {
        html.push_str("<figcaption>");
        html.push_str(&escape_prose(caption));
        html.push_str("</figcaption>");
    }
    html.push_str("</figure>");
    html
}
