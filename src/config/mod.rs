//! Application configuration and constants.
//!
//! This module provides:
//! - Configuration constants (timeouts, limits, scraping tokens)
//! - CLI option types and the library `Config`
//! - The JSON sequence file describing which resolvers to run

mod constants;
mod sequence;
mod types;

// Re-export all constants
pub use constants::*;
pub use sequence::{
    load_sequences, parse_sequences, Parameter, ResolverConfig, ResolverKindConfig, SequenceConfig,
    ValidatorConfig,
};
pub use types::{Config, LogFormat, LogLevel, Opt};
