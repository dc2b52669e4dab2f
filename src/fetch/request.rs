//! HTTP request building.
//!
//! A step without parameters becomes a GET; a step with parameters becomes a POST
//! with a URL-encoded form body, which is how SSO pages hand SAML/WS-Fed
//! messages from one party to the next.

use reqwest::{RequestBuilder, Url};

use crate::error_handling::ProbeError;
use crate::models::Step;

/// Browser-like request headers.
///
/// Login pages commonly vary their markup on content negotiation, so every hop
/// presents the same headers a desktop browser would.
pub(crate) struct RequestHeaders;

impl RequestHeaders {
    pub(crate) fn apply_to_request_builder(builder: RequestBuilder) -> RequestBuilder {
        builder
            .header(
                reqwest::header::ACCEPT,
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            )
            .header(reqwest::header::ACCEPT_LANGUAGE, "en-US,en;q=0.9")
    }
}

/// Parses the step's target URL.
///
/// # Errors
///
/// Returns `ProbeError::MissingUrl` for a step without a (non-blank) URL and
/// `ProbeError::InvalidUrl` when the URL cannot be parsed.
pub(crate) fn target_url(resolver: &str, step: &Step) -> Result<Url, ProbeError> {
    let raw = step.target().ok_or_else(|| {
        log::error!("The starting step does not contain URL");
        ProbeError::MissingUrl {
            resolver: resolver.to_string(),
        }
    })?;
    Url::parse(raw).map_err(|source| ProbeError::InvalidUrl {
        resolver: resolver.to_string(),
        url: raw.to_string(),
        source,
    })
}

/// Builds the request for a step against an already parsed target.
pub(crate) fn build_request(client: &reqwest::Client, target: Url, step: &Step) -> RequestBuilder {
    let builder = if step.parameters.is_empty() {
        client.get(target)
    } else {
        client.post(target).form(&step.parameters)
    };
    RequestHeaders::apply_to_request_builder(builder)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_without_parameters() {
        let client = reqwest::Client::new();
        let step = Step::new("http://localhost/start");
        let target = target_url("r", &step).unwrap();
        let request = build_request(&client, target, &step).build().unwrap();
        assert_eq!(request.method(), reqwest::Method::GET);
        assert!(request.body().is_none());
    }

    #[test]
    fn test_post_with_form_parameters() {
        let client = reqwest::Client::new();
        let step = Step::new("http://localhost/acs")
            .with_parameter("SAMLResponse", "PHNhbWw+")
            .with_parameter("RelayState", "a b");
        let target = target_url("r", &step).unwrap();
        let request = build_request(&client, target, &step).build().unwrap();
        assert_eq!(request.method(), reqwest::Method::POST);
        let body = request
            .body()
            .and_then(|b| b.as_bytes())
            .map(|b| String::from_utf8_lossy(b).to_string());
        assert_eq!(
            body.as_deref(),
            Some("SAMLResponse=PHNhbWw%2B&RelayState=a+b")
        );
        assert_eq!(
            request
                .headers()
                .get(reqwest::header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok()),
            Some("application/x-www-form-urlencoded")
        );
    }

    #[test]
    fn test_missing_url() {
        let err = target_url("idp", &Step::default()).unwrap_err();
        assert!(matches!(err, ProbeError::MissingUrl { .. }));
        assert_eq!(err.to_string(), "idp: The starting step does not contain URL");
    }

    #[test]
    fn test_invalid_url() {
        let err = target_url("idp", &Step::new("not a url")).unwrap_err();
        assert!(matches!(err, ProbeError::InvalidUrl { .. }));
    }
}
