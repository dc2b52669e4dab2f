//! Error handling.
//!
//! Errors are split by concern:
//! - **Configuration**: invalid sequence setup, fatal before any request
//! - **Probe**: transport and validation failures, recorded per step
//! - **Storage**: database failures, classified retryable or fatal
//! - **Initialization**: logger and HTTP client setup

mod types;

// Re-export public API
pub use types::{
    ConfigError, DatabaseError, InitializationError, ProbeError, StoreError, ValidationError,
};
