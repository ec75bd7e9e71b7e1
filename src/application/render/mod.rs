//! Block rendering.
//!
//! The pipeline is pure: it accepts a fully materialised block tree and
//! produces deterministic HTML fragments plus TOC entries. Fetching children
//! happens before rendering, in the materializer.

mod escape;
mod lists;
mod renderer;
mod types;

pub use lists::{ListGrouping, ListState};
pub use renderer::{BlockRenderer, DEFAULT_MAX_DEPTH};
pub use types::{RenderError, RenderResult, RenderService};
