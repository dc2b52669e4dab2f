//! Resolver that turns an HTML form into the next POST step.

use log::debug;

use crate::error_handling::{ProbeError, ValidationError};
use crate::fetch::ProbeContext;
use crate::models::Step;

use super::scrape::{attribute_value, decode_url_entities, element_value, unescape_html};
use super::Resolver;

/// Scrapes an HTML form: its `action` becomes the next URL and the named inputs
/// become the next step's POST parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormPostTarget {
    initial_parameters: Vec<(String, String)>,
    output_parameters: Vec<String>,
}

impl FormPostTarget {
    /// `output_parameters` names the form inputs whose values are carried over.
    pub fn new(output_parameters: Vec<String>) -> Self {
        Self {
            initial_parameters: Vec::new(),
            output_parameters,
        }
    }

    /// Parameters added to the incoming step before it is posted.
    pub fn with_initial_parameters(mut self, parameters: Vec<(String, String)>) -> Self {
        self.initial_parameters = parameters;
        self
    }

    /// Derives the next step from a form page.
    pub(crate) fn scrape(
        &self,
        resolver: &Resolver,
        ctx: &ProbeContext,
        body: &str,
    ) -> Result<Step, ProbeError> {
        if body.trim().is_empty() {
            return Err(ValidationError::new("The response is empty!").into());
        }
        let mut result = resolver.init_result_step();
        let action = attribute_value(body, "action");
        debug!("Parsed action {:?}", action);

        let parameters: Vec<(String, String)> = self
            .output_parameters
            .iter()
            .filter_map(|name| {
                element_value(body, name).map(|value| (name.clone(), unescape_html(value)))
            })
            .collect();

        if let Some(action) = action {
            let url = decode_url_entities(action).replace("&amp;", "&");
            result.url = Some(resolver.complete_url(ctx, &url)?);
        }
        if !parameters.is_empty() {
            result.parameters = parameters;
        }
        Ok(result)
    }

    pub(crate) async fn resolve(
        &self,
        resolver: &Resolver,
        ctx: &mut ProbeContext,
        mut step: Step,
    ) -> Result<Step, ProbeError> {
        if !self.initial_parameters.is_empty() {
            debug!("Adding the step parameters {:?}", self.initial_parameters);
            step.parameters
                .extend(self.initial_parameters.iter().cloned());
        }
        let response = resolver.fetch(ctx, &step).await?;
        if let Some(next) = resolver.unfollowed_redirect(ctx, &response)? {
            return Ok(next);
        }
        self.scrape(resolver, ctx, &response.body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::context_with_target;
    use crate::resolve::ResolverKind;

    const BASE_URL: &str = "http://localhost:8997";

    fn resolver(rule: &FormPostTarget) -> Resolver {
        Resolver::new("form", ResolverKind::FormPostTarget(rule.clone())).unwrap()
    }

    #[test]
    fn test_empty_body_fails() {
        let rule = FormPostTarget::default();
        let ctx = context_with_target(BASE_URL);
        let err = rule.scrape(&resolver(&rule), &ctx, "  \n").unwrap_err();
        assert_eq!(err.to_string(), "The response is empty!");
    }

    #[test]
    fn test_no_action_yields_no_url() {
        let rule = FormPostTarget::default();
        let ctx = context_with_target(BASE_URL);
        let step = rule.scrape(&resolver(&rule), &ctx, "mockContent").unwrap();
        assert_eq!(step.url, None);
        assert!(step.parameters.is_empty());
    }

    #[test]
    fn test_no_action_falls_back_to_result_url() {
        let rule = FormPostTarget::default();
        let ctx = context_with_target(BASE_URL);
        let resolver = resolver(&rule).with_result_url("http://fallback/");
        let step = rule.scrape(&resolver, &ctx, "mockContent").unwrap();
        assert_eq!(step.url.as_deref(), Some("http://fallback/"));
    }

    #[test]
    fn test_relative_action_and_parameter() {
        let rule = FormPostTarget::new(vec!["p".to_string()]);
        let ctx = context_with_target(BASE_URL);
        let step = rule
            .scrape(
                &resolver(&rule),
                &ctx,
                r#"<form action="/a"><input name="p" value="v"></form>"#,
            )
            .unwrap();
        assert_eq!(step.url.as_deref(), Some("http://localhost:8997/a"));
        assert_eq!(step.parameters, vec![("p".to_string(), "v".to_string())]);
    }

    #[test]
    fn test_entity_encoded_action_and_values() {
        let rule = FormPostTarget::new(vec![
            "SAMLResponse".to_string(),
            "RelayState".to_string(),
            "missing".to_string(),
        ]);
        let ctx = context_with_target(BASE_URL);
        let body = concat!(
            r#"<form method="post" action="https&#x3a;&#x2f;&#x2f;sp.example&#x2f;acs?a=1&amp;b=2">"#,
            r#"<input type="hidden" name="RelayState" value="ss&#x3a;mem&#x3a;1"/>"#,
            r#"<input type="hidden" name="SAMLResponse" value="PHNhbWw&#x2b;"/>"#,
            r#"</form>"#
        );
        let step = rule.scrape(&resolver(&rule), &ctx, body).unwrap();
        assert_eq!(step.url.as_deref(), Some("https://sp.example/acs?a=1&b=2"));
        assert_eq!(
            step.parameters,
            vec![
                ("SAMLResponse".to_string(), "PHNhbWw+".to_string()),
                ("RelayState".to_string(), "ss:mem:1".to_string()),
            ]
        );
    }
}
