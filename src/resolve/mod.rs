//! Sequence step resolvers.
//!
//! A resolver turns the previous step into the next one: it performs one HTTP
//! exchange through the execution core and scrapes the next target out of the
//! response. The scraping rule is chosen by `ResolverKind`; the id, validators,
//! redirect policy and fallback URL are shared by every kind.

mod add_parameters;
mod azure;
mod form_post;
pub mod scrape;
mod search_key;

pub use add_parameters::AddParameters;
pub use azure::AzureUserRealm;
pub use form_post::FormPostTarget;
pub use search_key::SearchKey;

use crate::error_handling::{ConfigError, ProbeError};
use crate::fetch::{self, ProbeContext};
use crate::models::{FetchedResponse, Step};
use crate::validate::ResponseValidator;

/// The scraping rule a resolver applies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolverKind {
    AddParameters(AddParameters),
    AzureAuthUrl,
    AzureUserRealm(AzureUserRealm),
    FormPostTarget(FormPostTarget),
    SearchKey(SearchKey),
}

/// One configured step of a monitoring sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolver {
    id: String,
    kind: ResolverKind,
    validators: Vec<ResponseValidator>,
    follow_redirects: bool,
    result_url: Option<String>,
}

impl Resolver {
    /// Creates a resolver that follows redirects and has no validators.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if `id` is blank.
    pub fn new(id: impl Into<String>, kind: ResolverKind) -> Result<Self, ConfigError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(ConfigError::Invalid("Resolver id cannot be empty".to_string()));
        }
        Ok(Self {
            id,
            kind,
            validators: Vec::new(),
            follow_redirects: true,
            result_url: None,
        })
    }

    pub fn with_validator(mut self, validator: ResponseValidator) -> Self {
        self.validators.push(validator);
        self
    }

    pub fn with_follow_redirects(mut self, follow: bool) -> Self {
        self.follow_redirects = follow;
        self
    }

    /// Sets the URL used for the next step when none can be scraped.
    pub fn with_result_url(mut self, url: impl Into<String>) -> Self {
        self.result_url = Some(url.into());
        self
    }

    /// Logical identity of the monitored phase; adjacent resolvers sharing it are merged.
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn kind(&self) -> &ResolverKind {
        &self.kind
    }

    pub fn validators(&self) -> &[ResponseValidator] {
        &self.validators
    }

    pub fn follow_redirects(&self) -> bool {
        self.follow_redirects
    }

    pub fn result_url(&self) -> Option<&str> {
        self.result_url.as_deref()
    }

    /// Resolves the next step from `step`.
    ///
    /// # Errors
    ///
    /// Returns a `ProbeError` on transport failure, validator rejection or a
    /// missing scraping token.
    pub async fn resolve(&self, ctx: &mut ProbeContext, step: Step) -> Result<Step, ProbeError> {
        match &self.kind {
            ResolverKind::AddParameters(rule) => rule.resolve(self, ctx, step).await,
            ResolverKind::AzureAuthUrl => azure::resolve_auth_url(self, ctx, step).await,
            ResolverKind::AzureUserRealm(rule) => rule.resolve(self, ctx, step).await,
            ResolverKind::FormPostTarget(rule) => rule.resolve(self, ctx, step).await,
            ResolverKind::SearchKey(rule) => rule.resolve(self, ctx, step).await,
        }
    }

    /// Runs the HTTP exchange for `step` with this resolver's redirect policy and validators.
    pub(crate) async fn fetch(
        &self,
        ctx: &mut ProbeContext,
        step: &Step,
    ) -> Result<FetchedResponse, ProbeError> {
        fetch::execute(ctx, &self.id, step, self.follow_redirects, &self.validators).await
    }

    /// Fresh output step, pre-filled with the fallback URL if configured.
    pub(crate) fn init_result_step(&self) -> Step {
        Step::with_fallback(self.result_url())
    }

    /// Completes a scraped URL against the last request target.
    pub(crate) fn complete_url(&self, ctx: &ProbeContext, url: &str) -> Result<String, ProbeError> {
        ctx.complete_url(url)
            .map_err(|source| ProbeError::InvalidUrl {
                resolver: self.id.clone(),
                url: url.to_string(),
                source,
            })
    }

    /// Next step taken from a non-followed redirect's `Location`, if there is one.
    pub(crate) fn unfollowed_redirect(
        &self,
        ctx: &ProbeContext,
        response: &FetchedResponse,
    ) -> Result<Option<Step>, ProbeError> {
        if self.follow_redirects {
            return Ok(None);
        }
        match response.header(reqwest::header::LOCATION.as_str()) {
            Some(location) => Ok(Some(Step::new(self.complete_url(ctx, location)?))),
            None => Ok(None),
        }
    }
}
