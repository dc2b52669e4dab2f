//! Application initialization and resource setup.
//!
//! This module provides functions to initialize shared resources:
//! - Logger (plain or JSON)
//! - Per-sequence HTTP client and cookie jar

mod client;
mod logger;

// Re-export public API
pub use client::init_probe_context;
pub use logger::init_logger_with;
