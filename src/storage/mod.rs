// storage/mod.rs
// Database operations module

pub mod insert;
pub mod migrations;
pub mod pool;
pub mod query;
pub mod retry;
pub mod store;

#[cfg(test)]
pub(crate) mod test_helpers;

// Re-export commonly used items
pub use migrations::run_migrations;
pub use pool::init_db_pool_with_path;
pub use query::{load_sequence_result, load_sequence_results};
pub use retry::{classify, RetryBudget, RetryPolicy, RetryableErrorClass};
pub use store::ResultStore;
