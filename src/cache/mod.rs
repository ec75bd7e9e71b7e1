//! Incremental render cache.
//!
//! A document whose last-modified stamp matches the cached one is not
//! fetched or rendered again; its cached page is reused verbatim. The cache
//! is persisted between runs as a versioned JSON file:
//!
//! ```json
//! {
//!   "format_version": 1,
//!   "entries": {
//!     "<document id>": { "last_modified": "...", "page": { ... } }
//!   }
//! }
//! ```

mod persist;
mod store;

pub use persist::{CACHE_FORMAT_VERSION, CacheError, CacheFile};
pub use store::{CacheEntry, RenderCache};
