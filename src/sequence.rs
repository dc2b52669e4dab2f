//! Monitoring sequence orchestration.
//!
//! Runs the configured resolvers strictly in order over one shared context,
//! timing each monitored phase. Adjacent resolvers sharing an id form a single
//! phase, and the first failure ends the run.

use log::{debug, info, trace, warn};

use crate::error_handling::{ConfigError, ProbeError};
use crate::fetch::ProbeContext;
use crate::models::{now_millis, SequenceResult, Step, StepResult};
use crate::resolve::Resolver;

/// One end-to-end monitored SSO flow.
#[derive(Debug, Clone)]
pub struct MonitoringSequence {
    id: String,
    initial_url: String,
    resolvers: Vec<Resolver>,
}

impl MonitoringSequence {
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if the id or the initial URL is blank.
    pub fn new(
        id: impl Into<String>,
        initial_url: impl Into<String>,
        resolvers: Vec<Resolver>,
    ) -> Result<Self, ConfigError> {
        let (id, initial_url) = (id.into(), initial_url.into());
        if id.trim().is_empty() {
            return Err(ConfigError::Invalid("Sequence id cannot be empty".to_string()));
        }
        if initial_url.trim().is_empty() {
            return Err(ConfigError::Invalid(format!(
                "{id}: The initial URL cannot be empty"
            )));
        }
        Ok(Self {
            id,
            initial_url,
            resolvers,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn initial_url(&self) -> &str {
        &self.initial_url
    }

    pub fn resolvers(&self) -> &[Resolver] {
        &self.resolvers
    }

    /// Groups adjacent resolvers sharing an id, paired with the index of the
    /// group's first resolver.
    ///
    /// Only neighbours are merged: ids `A, B, A` yield three groups.
    pub fn phases(&self) -> impl Iterator<Item = (usize, &[Resolver])> {
        self.resolvers
            .chunk_by(|a, b| a.id() == b.id())
            .scan(0usize, |index, group| {
                let first = *index;
                *index += group.len();
                Some((first, group))
            })
    }

    /// Runs the sequence to completion or to its first failure.
    ///
    /// Never fails: transport and validation errors are recorded on the step
    /// result of the phase that raised them, and no later resolver runs.
    pub async fn run(&self, ctx: &mut ProbeContext) -> SequenceResult {
        let mut result = SequenceResult::start(&self.id);
        let mut step = Step::new(&self.initial_url);

        for (first_index, group) in self.phases() {
            let mut step_result = StepResult::start(group[0].id(), phase_id(first_index));
            let outcome = run_phase(ctx, first_index, group, step).await;
            step_result.end_time = now_millis();
            match outcome {
                Ok(next) => {
                    result.step_results.push(step_result);
                    step = next;
                }
                Err(e) => {
                    warn!("{}: Response validation failed: {}", self.id, e);
                    if let Some(body) = e.response_body() {
                        trace!("The full response was {}", body);
                    }
                    step_result.error_message = Some(e.to_string());
                    step_result.validation_error = e.validation().cloned();
                    result.step_results.push(step_result);
                    break;
                }
            }
        }

        result.end_time = now_millis();
        info!(
            "{}: sequence finished in {}ms with {} step results",
            self.id,
            result.duration_millis(),
            result.step_results.len()
        );
        result
    }
}

fn phase_id(index: usize) -> i32 {
    i32::try_from(index).unwrap_or(i32::MAX)
}

/// Runs every resolver of one phase, threading the step through them.
async fn run_phase(
    ctx: &mut ProbeContext,
    first_index: usize,
    group: &[Resolver],
    mut step: Step,
) -> Result<Step, ProbeError> {
    for (offset, resolver) in group.iter().enumerate() {
        debug!("Performing step {} : {}", first_index + offset, step);
        step = resolver.resolve(ctx, step).await?;
    }
    Ok(step)
}
