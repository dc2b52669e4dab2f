//! Presentation of finished probe runs.

pub mod summary;

// Re-export public API
pub use summary::{render_summary, summarize};
