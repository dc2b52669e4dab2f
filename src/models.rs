//! Value objects passed between resolvers and the timing records of a run.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error_handling::ValidationError;

/// Milliseconds since the Unix epoch, the resolution used for every timestamp.
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Description of the next HTTP call to make.
///
/// A GET is issued when `parameters` is empty, otherwise a form POST.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Step {
    pub url: Option<String>,
    pub parameters: Vec<(String, String)>,
}

impl Step {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            parameters: Vec::new(),
        }
    }

    /// Starts an output step, pre-filled with the resolver's fallback URL if it has one.
    pub fn with_fallback(result_url: Option<&str>) -> Self {
        Self {
            url: result_url.map(str::to_string),
            parameters: Vec::new(),
        }
    }

    pub fn with_parameter(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.parameters.push((name.into(), value.into()));
        self
    }

    /// The target URL, if present and not blank.
    pub fn target(&self) -> Option<&str> {
        self.url.as_deref().filter(|u| !u.trim().is_empty())
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "URL: {}, parameters: {:?}",
            self.url.as_deref().unwrap_or("<none>"),
            self.parameters
        )
    }
}

/// A fetched HTTP response, kept only while the current step is validated and scraped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl FetchedResponse {
    /// Every value of the named header, in response order. Names compare case-insensitively.
    pub fn header_values<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.headers
            .iter()
            .filter(move |(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// First value of the named header, trimmed; blank values count as absent.
    pub fn header(&self, name: &str) -> Option<&str> {
        let value = self
            .headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.trim())?;
        log::trace!("Found value {} for {}", value, name);
        (!value.is_empty()).then_some(value)
    }
}

/// Timing record of one monitored phase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepResult {
    pub id: String,
    pub phase_id: i32,
    pub start_time: i64,
    pub end_time: i64,
    pub error_message: Option<String>,
    /// Full validator failure detail; not persisted.
    #[serde(skip)]
    pub validation_error: Option<ValidationError>,
}

impl StepResult {
    pub fn start(id: impl Into<String>, phase_id: i32) -> Self {
        let start_time = now_millis();
        Self {
            id: id.into(),
            phase_id,
            start_time,
            end_time: start_time,
            error_message: None,
            validation_error: None,
        }
    }

    pub fn is_error(&self) -> bool {
        self.error_message.is_some()
    }
}

/// Timing record of one end-to-end sequence run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequenceResult {
    pub id: String,
    pub start_time: i64,
    pub end_time: i64,
    pub step_results: Vec<StepResult>,
}

impl SequenceResult {
    pub fn start(id: impl Into<String>) -> Self {
        let start_time = now_millis();
        Self {
            id: id.into(),
            start_time,
            end_time: start_time,
            step_results: Vec::new(),
        }
    }

    /// The first recorded error message, if any step failed.
    pub fn first_error(&self) -> Option<&str> {
        self.step_results
            .iter()
            .find_map(|s| s.error_message.as_deref())
    }

    pub fn duration_millis(&self) -> i64 {
        self.end_time - self.start_time
    }
}

/// Results produced by one probe invocation, in completion order.
///
/// Handed to storage and to the summary renderer once every sequence has finished.
#[derive(Debug, Clone, Default)]
pub struct MonitoringResults {
    results: Vec<SequenceResult>,
}

impl MonitoringResults {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_result(&mut self, result: SequenceResult) {
        self.results.push(result);
    }

    pub fn results(&self) -> &[SequenceResult] {
        &self.results
    }

    pub fn latest(&self) -> Option<&SequenceResult> {
        self.results.last()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}
