//! Configuration constants.
//!
//! This module defines the defaults used throughout the probe: timeouts,
//! redirect limits, retry backoff and the fixed tokens scraped from SSO pages.

use std::time::Duration;

pub const DB_PATH: &str = "./sso_probe.db";

/// Per-request timeout in seconds
pub const REQUEST_TIMEOUT_SECS: u64 = 10;

/// External deadline for one full sequence run.
/// Resolvers cannot be cancelled mid-flight, so the whole run is bounded instead.
pub const SEQUENCE_TIMEOUT: Duration = Duration::from_secs(120);

/// Default User-Agent string for HTTP requests.
///
/// Some identity providers serve a reduced login page to unknown agents, so the
/// probe presents itself as a regular desktop browser.
/// Users can override this via the `--user-agent` CLI flag.
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

// Redirect handling
/// Maximum number of redirect hops followed within one step
/// Prevents redirect cycles between identity providers from looping forever
pub const MAX_REDIRECT_HOPS: usize = 10;

// Storage retry strategy
/// Default shared retry budget for persisting one batch of results
pub const TRANSACTION_RETRIES: u32 = 5;
/// Delay in milliseconds before the first storage retry
pub const RETRY_INITIAL_DELAY_MS: u64 = 50;
/// Growth of the retry delay between consecutive attempts (delays run 50ms, 100ms, 200ms, ...)
pub const RETRY_FACTOR: u64 = 2;
/// Maximum delay between storage retries in seconds
pub const RETRY_MAX_DELAY_SECS: u64 = 2;

// Azure AD
pub const AZURE_AUTH_URL_KEY: &str = "AuthURL";
pub const AZURE_DEFAULT_API_VERSION: &str = "2.1";
pub const AZURE_DEFAULT_USER_REALM_URL: &str =
    "https://login.microsoftonline.com/common/userrealm/";
pub const AZURE_PARAM_USER: &str = "user";
pub const AZURE_PARAM_API_VERSION: &str = "api-version";
pub const AZURE_PARAM_STS_REQUEST: &str = "stsRequest";
/// Attribute prefix of the hidden `ctx` input carrying the STS request
pub const AZURE_CTX_TOKEN: &str = "name=\"ctx\" value";

// Summary lines
pub const SUMMARY_NO_CONTEXT: &str = "ERROR: No context available";
pub const SUMMARY_NO_RESULTS: &str = "ERROR: No results available";
