//! Response validators.
//!
//! A validator is a pass/fail check attached to a resolver and run against the
//! terminal response of its HTTP exchange.

use log::{debug, trace, warn};

use crate::error_handling::ValidationError;
use crate::models::FetchedResponse;

/// A check run against a completed HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseValidator {
    /// Fails unless the status code equals `expected`.
    StatusCode { expected: u16 },
    /// Fails unless some `header` value, trimmed, contains `expected`.
    HeaderContains { header: String, expected: String },
    /// Fails unless the body contains `expected`.
    BodyContains { expected: String },
}

impl ResponseValidator {
    pub fn status_code(expected: u16) -> Self {
        ResponseValidator::StatusCode { expected }
    }

    pub fn header_contains(header: impl Into<String>, expected: impl Into<String>) -> Self {
        ResponseValidator::HeaderContains {
            header: header.into(),
            expected: expected.into(),
        }
    }

    pub fn body_contains(expected: impl Into<String>) -> Self {
        ResponseValidator::BodyContains {
            expected: expected.into(),
        }
    }

    /// Checks the response.
    ///
    /// # Errors
    ///
    /// Returns a `ValidationError` with a one-line reason. Status and body
    /// failures carry the response body as diagnostic payload.
    pub fn validate(&self, response: &FetchedResponse) -> Result<(), ValidationError> {
        match self {
            ResponseValidator::StatusCode { expected } => {
                trace!("Status code is {}", response.status);
                if response.status != *expected {
                    warn!(
                        "Invalid status code! Found {} but expected {}!",
                        response.status, expected
                    );
                    return Err(ValidationError::with_body(
                        format!(
                            "Invalid status code! Got {}, expected {}",
                            response.status, expected
                        ),
                        response.body.as_str(),
                    ));
                }
                Ok(())
            }
            ResponseValidator::HeaderContains { header, expected } => {
                for value in response.header_values(header) {
                    let value = value.trim();
                    trace!("Header {} has value {}", header, value);
                    if !value.is_empty() && value.contains(expected.as_str()) {
                        debug!(
                            "Header {} value {} contains the expected {}",
                            header, value, expected
                        );
                        return Ok(());
                    }
                }
                warn!(
                    "Header {} values did not contain the expected {}",
                    header, expected
                );
                Err(ValidationError::new(format!(
                    "No header {} containing {} found!",
                    header, expected
                )))
            }
            ResponseValidator::BodyContains { expected } => {
                if !response.body.contains(expected.as_str()) {
                    debug!("{} not included in the response", expected);
                    trace!("The full content was {}", response.body);
                    return Err(ValidationError::with_body(
                        format!("Expected string '{}' missing!", expected),
                        response.body.as_str(),
                    ));
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(status: u16, headers: &[(&str, &str)], body: &str) -> FetchedResponse {
        FetchedResponse {
            status,
            headers: headers
                .iter()
                .map(|(n, v)| (n.to_string(), v.to_string()))
                .collect(),
            body: body.to_string(),
        }
    }

    #[test]
    fn test_status_code_match() {
        let validator = ResponseValidator::status_code(200);
        assert!(validator.validate(&response(200, &[], "")).is_ok());
    }

    #[test]
    fn test_status_code_mismatch_carries_body() {
        let validator = ResponseValidator::status_code(302);
        let err = validator
            .validate(&response(200, &[], "<html>login</html>"))
            .unwrap_err();
        assert_eq!(err.reason, "Invalid status code! Got 200, expected 302");
        assert_eq!(err.body.as_deref(), Some("<html>login</html>"));
    }

    #[test]
    fn test_header_contains_any_occurrence() {
        let validator = ResponseValidator::header_contains("Set-Cookie", "shib_idp_session");
        let resp = response(
            200,
            &[
                ("set-cookie", "JSESSIONID=1; Path=/"),
                ("set-cookie", "  shib_idp_session=abc; Secure  "),
            ],
            "",
        );
        assert!(validator.validate(&resp).is_ok());
    }

    #[test]
    fn test_header_contains_missing() {
        let validator = ResponseValidator::header_contains("Location", "/idp/profile");
        let err = validator
            .validate(&response(302, &[("Location", "https://elsewhere/")], ""))
            .unwrap_err();
        assert_eq!(err.reason, "No header Location containing /idp/profile found!");
        assert!(err.body.is_none());
    }

    #[test]
    fn test_header_contains_ignores_blank_values() {
        let validator = ResponseValidator::header_contains("X-Test", " ");
        let err = validator.validate(&response(200, &[("X-Test", "   ")], ""));
        assert!(err.is_err());
    }

    #[test]
    fn test_body_contains() {
        let validator = ResponseValidator::body_contains("SAMLResponse");
        assert!(validator
            .validate(&response(200, &[], "<input name=\"SAMLResponse\">"))
            .is_ok());
        let err = validator.validate(&response(200, &[], "nope")).unwrap_err();
        assert_eq!(err.reason, "Expected string 'SAMLResponse' missing!");
        assert_eq!(err.body.as_deref(), Some("nope"));
    }

    #[test]
    fn test_body_contains_empty_body() {
        let validator = ResponseValidator::body_contains("x");
        assert!(validator.validate(&response(200, &[], "")).is_err());
    }
}
