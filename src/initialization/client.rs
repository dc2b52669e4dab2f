//! HTTP client initialization.
//!
//! Every sequence run gets its own client and cookie jar, so sessions from one
//! federation never leak into another.

use std::sync::Arc;

use reqwest::cookie::Jar;
use reqwest::ClientBuilder;

use crate::config::Config;
use crate::error_handling::InitializationError;
use crate::fetch::ProbeContext;

/// Builds a fresh shared context for one sequence run.
///
/// The client has automatic redirects disabled because the execution core
/// walks redirect chains itself, and stores cookies in a dedicated jar.
///
/// # Errors
///
/// Returns `InitializationError::HttpClientError` if the client cannot be built.
pub fn init_probe_context(config: &Config) -> Result<ProbeContext, InitializationError> {
    let cookies = Arc::new(Jar::default());
    let client = ClientBuilder::new()
        .redirect(reqwest::redirect::Policy::none())
        .cookie_provider(Arc::clone(&cookies))
        .timeout(config.request_timeout())
        .user_agent(config.user_agent.clone())
        .build()?;
    Ok(ProbeContext::new(client, cookies, config.max_redirects))
}
