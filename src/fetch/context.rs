//! Shared per-sequence HTTP context.
//!
//! One `ProbeContext` is owned by exactly one sequence run. It carries the HTTP
//! client, the cookie jar every hop writes into, and the last request target used
//! to complete relative URLs.

use std::sync::Arc;

use reqwest::cookie::Jar;
use reqwest::Url;

/// Context threaded through every resolver of one sequence run.
///
/// The client never follows redirects itself; the execution core walks them so
/// that each hop is visible and lands its cookies in `cookies`.
pub struct ProbeContext {
    client: reqwest::Client,
    cookies: Arc<Jar>,
    last_target: Option<Url>,
    max_redirects: usize,
}

impl ProbeContext {
    /// Creates a context around a client that was built with `cookies` as its cookie provider.
    pub fn new(client: reqwest::Client, cookies: Arc<Jar>, max_redirects: usize) -> Self {
        Self {
            client,
            cookies,
            last_target: None,
            max_redirects,
        }
    }

    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }

    /// Cookies accumulated over the whole sequence so far.
    pub fn cookies(&self) -> &Jar {
        &self.cookies
    }

    /// The URL of the most recent request, including hops inside redirect chains.
    pub fn last_target(&self) -> Option<&Url> {
        self.last_target.as_ref()
    }

    pub(crate) fn set_last_target(&mut self, target: Url) {
        self.last_target = Some(target);
    }

    pub fn max_redirects(&self) -> usize {
        self.max_redirects
    }

    /// Completes a scraped or `Location` URL against the last request target.
    ///
    /// URLs containing `://` are returned untouched. Anything else is joined onto
    /// the last target, keeping its scheme, host and any non-default port.
    pub fn complete_url(&self, source: &str) -> Result<String, url::ParseError> {
        if source.contains("://") {
            return Ok(source.to_string());
        }
        match &self.last_target {
            Some(base) => base.join(source).map(String::from),
            None => {
                log::warn!("No previous request target to complete {}", source);
                Ok(source.to_string())
            }
        }
    }
}

/// Context whose last request went to `target`, for scraping tests.
#[cfg(test)]
pub(crate) fn context_with_target(target: &str) -> ProbeContext {
    let jar = Arc::new(Jar::default());
    let client = reqwest::Client::builder()
        .cookie_provider(Arc::clone(&jar))
        .build()
        .expect("Failed to build client");
    let mut ctx = ProbeContext::new(client, jar, 10);
    ctx.set_last_target(Url::parse(target).expect("valid URL"));
    ctx
}
