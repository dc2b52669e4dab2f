//! Resolver that appends fixed query parameters to the incoming URL.

use crate::error_handling::ProbeError;
use crate::fetch::ProbeContext;
use crate::models::Step;

use super::Resolver;

/// Appends fixed query parameters to the incoming step's URL before fetching it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddParameters {
    parameters: Vec<(String, String)>,
}

impl AddParameters {
    pub fn new(parameters: Vec<(String, String)>) -> Self {
        Self { parameters }
    }

    /// The step URL with every configured `key=value` pair appended in order.
    pub(crate) fn augment_url(&self, url: &str) -> String {
        let mut augmented = url.to_string();
        for (key, value) in &self.parameters {
            augmented.push(if augmented.contains('?') { '&' } else { '?' });
            augmented.push_str(key);
            augmented.push('=');
            augmented.push_str(value);
        }
        augmented
    }

    pub(crate) async fn resolve(
        &self,
        resolver: &Resolver,
        ctx: &mut ProbeContext,
        mut step: Step,
    ) -> Result<Step, ProbeError> {
        if let Some(url) = step.target() {
            step.url = Some(self.augment_url(url));
        }
        let response = resolver.fetch(ctx, &step).await?;
        if let Some(next) = resolver.unfollowed_redirect(ctx, &response)? {
            return Ok(next);
        }
        Ok(step)
    }
}
