//! Redirect hop resolution.
//!
//! Redirects are followed manually so that every hop goes through the shared
//! cookie jar and the last request target tracks the real host.

use crate::error_handling::ProbeError;
use crate::fetch::ProbeContext;
use crate::models::{FetchedResponse, Step};

/// Builds the step for the next hop if the response carries a `Location` header.
///
/// A relative `Location` is completed against the current target's scheme, host and port.
pub(crate) fn next_hop(
    ctx: &ProbeContext,
    resolver: &str,
    response: &FetchedResponse,
) -> Result<Option<Step>, ProbeError> {
    let Some(location) = response.header(reqwest::header::LOCATION.as_str()) else {
        return Ok(None);
    };
    log::debug!("Found a value for Location-header: {}", location);
    let url = ctx
        .complete_url(location)
        .map_err(|source| ProbeError::InvalidUrl {
            resolver: resolver.to_string(),
            url: location.to_string(),
            source,
        })?;
    Ok(Some(Step::new(url)))
}
