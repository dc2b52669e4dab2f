//! Resolver that follows the first quoted value after a search key.

use log::debug;

use crate::error_handling::{ConfigError, ProbeError, ValidationError};
use crate::fetch::ProbeContext;
use crate::models::Step;

use super::scrape::{attribute_value, decode_url_entities, element_value};
use super::Resolver;

/// Takes the next URL from a `key="…"` token and optionally carries over
/// element values found next to quoted parameter keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchKey {
    key: String,
    parameter_keys: Vec<String>,
}

impl SearchKey {
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if `key` is blank.
    pub fn new(key: impl Into<String>, parameter_keys: Vec<String>) -> Result<Self, ConfigError> {
        let key = key.into();
        if key.trim().is_empty() {
            return Err(ConfigError::Invalid("searchKey cannot be empty!".to_string()));
        }
        for parameter_key in &parameter_keys {
            debug!("Added param search key {}", parameter_key);
        }
        Ok(Self {
            key,
            parameter_keys,
        })
    }

    pub(crate) fn scrape(
        &self,
        resolver: &Resolver,
        ctx: &ProbeContext,
        body: &str,
    ) -> Result<Step, ProbeError> {
        if body.trim().is_empty() {
            return Err(ValidationError::new("Empty response content from the server").into());
        }
        let mut result = resolver.init_result_step();
        let url = attribute_value(body, &self.key)
            .filter(|url| !url.trim().is_empty())
            .ok_or_else(|| {
                ValidationError::with_body(
                    format!("Could not find an URL with the key {}", self.key),
                    body,
                )
            })?;
        result.url = Some(resolver.complete_url(ctx, &decode_url_entities(url))?);

        debug!("Starting to process parameter keys {}", self.parameter_keys.len());
        for parameter_key in &self.parameter_keys {
            if let Some(value) = element_value(body, parameter_key) {
                debug!("Found value {} for {}", value, parameter_key);
                result
                    .parameters
                    .push((parameter_key.clone(), value.to_string()));
            }
        }
        Ok(result)
    }

    pub(crate) async fn resolve(
        &self,
        resolver: &Resolver,
        ctx: &mut ProbeContext,
        step: Step,
    ) -> Result<Step, ProbeError> {
        let response = resolver.fetch(ctx, &step).await?;
        self.scrape(resolver, ctx, &response.body)
    }
}
