//! Monitoring sequence file format.
//!
//! The sequence file is a JSON array; each entry describes one SSO flow and the
//! resolvers that replay it. Loading checks every value up front so a broken
//! configuration fails before any request is made.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::config::constants::{AZURE_DEFAULT_API_VERSION, AZURE_DEFAULT_USER_REALM_URL};
use crate::error_handling::ConfigError;
use crate::resolve::{
    AddParameters, AzureUserRealm, FormPostTarget, Resolver, ResolverKind, SearchKey,
};
use crate::sequence::MonitoringSequence;
use crate::validate::ResponseValidator;

/// A name/value pair sent as a query or form parameter.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Parameter {
    pub name: String,
    pub value: String,
}

fn into_pairs(parameters: &[Parameter]) -> Vec<(String, String)> {
    parameters
        .iter()
        .map(|p| (p.name.clone(), p.value.clone()))
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SequenceConfig {
    pub id: String,
    pub initial_url: String,
    #[serde(default)]
    pub resolvers: Vec<ResolverConfig>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ResolverConfig {
    pub id: String,
    #[serde(default = "follow_by_default")]
    pub follow_redirects: bool,
    #[serde(default)]
    pub result_url: Option<String>,
    #[serde(default)]
    pub validators: Vec<ValidatorConfig>,
    pub kind: ResolverKindConfig,
}

fn follow_by_default() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResolverKindConfig {
    AddParameters {
        parameters: Vec<Parameter>,
    },
    AzureAuthUrl,
    AzureUserRealm {
        username: String,
        #[serde(default)]
        api_version: Option<String>,
        #[serde(default)]
        realm_url: Option<String>,
    },
    FormPostTarget {
        #[serde(default)]
        initial_parameters: Vec<Parameter>,
        output_parameters: Vec<String>,
    },
    SearchKey {
        key: String,
        #[serde(default)]
        parameter_keys: Vec<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ValidatorConfig {
    StatusCode { expected: u16 },
    HeaderContains { header: String, expected: String },
    BodyContains { expected: String },
}

impl ValidatorConfig {
    fn build(&self, resolver: &str) -> Result<ResponseValidator, ConfigError> {
        let blank = |value: &str, what: &str| {
            if value.trim().is_empty() {
                Err(ConfigError::Invalid(format!(
                    "{resolver}: validator {what} cannot be empty"
                )))
            } else {
                Ok(())
            }
        };
        match self {
            ValidatorConfig::StatusCode { expected } => {
                Ok(ResponseValidator::status_code(*expected))
            }
            ValidatorConfig::HeaderContains { header, expected } => {
                blank(header, "header name")?;
                blank(expected, "expected value")?;
                Ok(ResponseValidator::header_contains(header, expected))
            }
            ValidatorConfig::BodyContains { expected } => {
                blank(expected, "expected value")?;
                Ok(ResponseValidator::body_contains(expected))
            }
        }
    }
}

impl ResolverKindConfig {
    fn build(&self) -> Result<ResolverKind, ConfigError> {
        Ok(match self {
            ResolverKindConfig::AddParameters { parameters } => {
                ResolverKind::AddParameters(AddParameters::new(into_pairs(parameters)))
            }
            ResolverKindConfig::AzureAuthUrl => ResolverKind::AzureAuthUrl,
            ResolverKindConfig::AzureUserRealm {
                username,
                api_version,
                realm_url,
            } => ResolverKind::AzureUserRealm(AzureUserRealm::new(
                username.as_str(),
                api_version.as_deref().unwrap_or(AZURE_DEFAULT_API_VERSION),
                realm_url.as_deref().unwrap_or(AZURE_DEFAULT_USER_REALM_URL),
            )?),
            ResolverKindConfig::FormPostTarget {
                initial_parameters,
                output_parameters,
            } => ResolverKind::FormPostTarget(
                FormPostTarget::new(output_parameters.clone())
                    .with_initial_parameters(into_pairs(initial_parameters)),
            ),
            ResolverKindConfig::SearchKey {
                key,
                parameter_keys,
            } => ResolverKind::SearchKey(SearchKey::new(key.as_str(), parameter_keys.clone())?),
        })
    }
}

impl ResolverConfig {
    pub fn build(&self) -> Result<Resolver, ConfigError> {
        let mut resolver = Resolver::new(self.id.as_str(), self.kind.build()?)?
            .with_follow_redirects(self.follow_redirects);
        if let Some(url) = &self.result_url {
            resolver = resolver.with_result_url(url.as_str());
        }
        for validator in &self.validators {
            resolver = resolver.with_validator(validator.build(&self.id)?);
        }
        Ok(resolver)
    }
}

impl SequenceConfig {
    pub fn build(&self) -> Result<MonitoringSequence, ConfigError> {
        let resolvers = self
            .resolvers
            .iter()
            .map(ResolverConfig::build)
            .collect::<Result<Vec<_>, _>>()?;
        MonitoringSequence::new(self.id.as_str(), self.initial_url.as_str(), resolvers)
    }
}

/// Parses and validates a JSON array of sequences.
pub fn parse_sequences(json: &str) -> Result<Vec<MonitoringSequence>, ConfigError> {
    let configs: Vec<SequenceConfig> = serde_json::from_str(json)?;
    configs.iter().map(SequenceConfig::build).collect()
}

/// Reads, parses and validates a sequence file.
pub fn load_sequences(path: &Path) -> Result<Vec<MonitoringSequence>, ConfigError> {
    let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.display().to_string(),
        source,
    })?;
    let sequences = parse_sequences(&json)?;
    log::info!(
        "Loaded {} monitoring sequences from {}",
        sequences.len(),
        path.display()
    );
    Ok(sequences)
}
