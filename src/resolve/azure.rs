//! Azure AD specific resolvers.

use log::debug;

use crate::config::{
    AZURE_AUTH_URL_KEY, AZURE_CTX_TOKEN, AZURE_DEFAULT_API_VERSION, AZURE_DEFAULT_USER_REALM_URL,
    AZURE_PARAM_API_VERSION, AZURE_PARAM_STS_REQUEST, AZURE_PARAM_USER,
};
use crate::error_handling::{ConfigError, ProbeError, ValidationError};
use crate::fetch::ProbeContext;
use crate::models::Step;

use super::scrape::attribute_value;
use super::Resolver;

/// Extracts the `"AuthURL":"…"` value from a JSON-ish body.
pub(crate) fn extract_auth_url(body: &str) -> Result<&str, ValidationError> {
    let key = format!("\"{AZURE_AUTH_URL_KEY}\":\"");
    let Some(key_start) = body.find(&key) else {
        return Err(ValidationError::with_body(
            format!("Could not find '{key}' from the response!"),
            body,
        ));
    };
    let value_start = key_start + key.len();
    let Some(len) = body[value_start..].find('"') else {
        return Err(ValidationError::with_body(
            format!("No trailing \" for the '{key}'"),
            body,
        ));
    };
    Ok(&body[value_start..value_start + len])
}

/// Follows the federated authentication URL Azure hands back for a home realm.
pub(crate) async fn resolve_auth_url(
    resolver: &Resolver,
    ctx: &mut ProbeContext,
    step: Step,
) -> Result<Step, ProbeError> {
    let response = resolver.fetch(ctx, &step).await?;
    let auth_url = extract_auth_url(&response.body)?;
    debug!("Found the authentication URL {}", auth_url);
    let mut result = resolver.init_result_step();
    result.url = Some(auth_url.to_string());
    Ok(result)
}

/// Builds the Azure user realm discovery call from the login page's `ctx` token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AzureUserRealm {
    username: String,
    api_version: String,
    realm_url: String,
}

impl AzureUserRealm {
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if any value is blank.
    pub fn new(
        username: impl Into<String>,
        api_version: impl Into<String>,
        realm_url: impl Into<String>,
    ) -> Result<Self, ConfigError> {
        let (username, api_version, realm_url) =
            (username.into(), api_version.into(), realm_url.into());
        for (value, name) in [
            (&username, "userid"),
            (&api_version, "api version"),
            (&realm_url, "realmUrl"),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::Invalid(format!("{name} cannot be empty!")));
            }
        }
        Ok(Self {
            username,
            api_version,
            realm_url,
        })
    }

    /// Uses the public Azure AD realm endpoint and API version.
    pub fn with_defaults(username: impl Into<String>) -> Result<Self, ConfigError> {
        Self::new(
            username,
            AZURE_DEFAULT_API_VERSION,
            AZURE_DEFAULT_USER_REALM_URL,
        )
    }

    pub(crate) fn realm_query_url(&self, sts_request: &str) -> String {
        format!(
            "{}?{}={}&{}={}&{}={}",
            self.realm_url,
            AZURE_PARAM_USER,
            self.username,
            AZURE_PARAM_API_VERSION,
            self.api_version,
            AZURE_PARAM_STS_REQUEST,
            sts_request
        )
    }

    pub(crate) async fn resolve(
        &self,
        resolver: &Resolver,
        ctx: &mut ProbeContext,
        step: Step,
    ) -> Result<Step, ProbeError> {
        let response = resolver.fetch(ctx, &step).await?;
        let sts_request = attribute_value(&response.body, AZURE_CTX_TOKEN).ok_or_else(|| {
            ValidationError::with_body(
                "Could not find ctx value from the response",
                response.body.as_str(),
            )
        })?;
        let mut result = resolver.init_result_step();
        result.url = Some(self.realm_query_url(sts_request));
        Ok(result)
    }
}
