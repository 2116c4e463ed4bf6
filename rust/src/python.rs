//! PyO3 bindings.
//!
//! Requests and outcomes cross the boundary as JSON so the Python side can
//! keep using its own pydantic models; only the configuration is a class.

// Allow clippy warning triggered by PyO3 macro expansion
#![allow(clippy::useless_conversion)]

use chrono::{Duration, NaiveDateTime};
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use serde_json::json;

use crate::config::PlanningConfig;
use crate::critical_path::analyze;
use crate::graph::DependencyGraph;
use crate::models::{Activity, Dependency};
use crate::scheduler::{PlanningRequest, TimelinePlanner};

fn value_error(err: impl std::fmt::Display) -> PyErr {
    PyValueError::new_err(err.to_string())
}

/// Planning configuration exposed to Python.
#[pyclass(name = "PlanningConfig")]
#[derive(Clone, Debug)]
pub struct PyPlanningConfig {
    #[pyo3(get, set)]
    pub daily_window: Duration,
    #[pyo3(get, set)]
    pub buffer_after: Duration,
    #[pyo3(get, set)]
    pub min_buffer: Duration,
    #[pyo3(get, set)]
    pub max_buffer: Duration,
    #[pyo3(get, set)]
    pub excess_slack_threshold: Duration,
    #[pyo3(get, set)]
    pub long_critical_duration: Duration,
    #[pyo3(get, set)]
    pub critical_share_threshold: f64,
    #[pyo3(get, set)]
    pub apply_duration_adjustments: bool,
    #[pyo3(get, set)]
    pub apply_context_adjustments: bool,
    #[pyo3(get, set)]
    pub verbosity: u8,
}

impl From<PlanningConfig> for PyPlanningConfig {
    fn from(config: PlanningConfig) -> Self {
        Self {
            daily_window: config.daily_window,
            buffer_after: config.buffer_after,
            min_buffer: config.min_buffer,
            max_buffer: config.max_buffer,
            excess_slack_threshold: config.excess_slack_threshold,
            long_critical_duration: config.long_critical_duration,
            critical_share_threshold: config.critical_share_threshold,
            apply_duration_adjustments: config.apply_duration_adjustments,
            apply_context_adjustments: config.apply_context_adjustments,
            verbosity: config.verbosity,
        }
    }
}

impl From<PyPlanningConfig> for PlanningConfig {
    fn from(config: PyPlanningConfig) -> Self {
        Self {
            daily_window: config.daily_window,
            buffer_after: config.buffer_after,
            min_buffer: config.min_buffer,
            max_buffer: config.max_buffer,
            excess_slack_threshold: config.excess_slack_threshold,
            long_critical_duration: config.long_critical_duration,
            critical_share_threshold: config.critical_share_threshold,
            apply_duration_adjustments: config.apply_duration_adjustments,
            apply_context_adjustments: config.apply_context_adjustments,
            verbosity: config.verbosity,
        }
    }
}

#[pymethods]
impl PyPlanningConfig {
    #[new]
    #[pyo3(signature = (
        daily_window=None,
        buffer_after=None,
        min_buffer=None,
        max_buffer=None,
        excess_slack_threshold=None,
        long_critical_duration=None,
        critical_share_threshold=None,
        apply_duration_adjustments=None,
        apply_context_adjustments=None,
        verbosity=None
    ))]
    #[allow(clippy::too_many_arguments)]
    fn new(
        daily_window: Option<Duration>,
        buffer_after: Option<Duration>,
        min_buffer: Option<Duration>,
        max_buffer: Option<Duration>,
        excess_slack_threshold: Option<Duration>,
        long_critical_duration: Option<Duration>,
        critical_share_threshold: Option<f64>,
        apply_duration_adjustments: Option<bool>,
        apply_context_adjustments: Option<bool>,
        verbosity: Option<u8>,
    ) -> PyResult<Self> {
        let defaults = PlanningConfig::default();
        let config = PlanningConfig {
            daily_window: daily_window.unwrap_or(defaults.daily_window),
            buffer_after: buffer_after.unwrap_or(defaults.buffer_after),
            min_buffer: min_buffer.unwrap_or(defaults.min_buffer),
            max_buffer: max_buffer.unwrap_or(defaults.max_buffer),
            excess_slack_threshold: excess_slack_threshold
                .unwrap_or(defaults.excess_slack_threshold),
            long_critical_duration: long_critical_duration
                .unwrap_or(defaults.long_critical_duration),
            critical_share_threshold: critical_share_threshold
                .unwrap_or(defaults.critical_share_threshold),
            apply_duration_adjustments: apply_duration_adjustments
                .unwrap_or(defaults.apply_duration_adjustments),
            apply_context_adjustments: apply_context_adjustments
                .unwrap_or(defaults.apply_context_adjustments),
            verbosity: verbosity.unwrap_or(defaults.verbosity),
        };
        config.validate().map_err(value_error)?;
        Ok(config.into())
    }

    fn __repr__(&self) -> String {
        format!(
            "PlanningConfig(daily_window={}s, buffer_after={}s, verbosity={})",
            self.daily_window.num_seconds(),
            self.buffer_after.num_seconds(),
            self.verbosity
        )
    }
}

/// Plan an event timeline.
///
/// # Arguments
/// * `request_json` - JSON object with `activities`, `dependencies`, `context`
///   and `project_start`
/// * `config` - Planning configuration (defaults when omitted)
///
/// # Returns
/// * JSON object with the timeline, structured advisories, and a `messages`
///   object holding each advisory as a display string
///
/// # Raises
/// * ValueError on malformed input, invalid dependencies or a cycle
#[pyfunction]
#[pyo3(signature = (request_json, config=None))]
fn plan_timeline(request_json: &str, config: Option<PyPlanningConfig>) -> PyResult<String> {
    let request: PlanningRequest = serde_json::from_str(request_json).map_err(value_error)?;
    let planner = TimelinePlanner::new(config.map(PlanningConfig::from).unwrap_or_default());
    let outcome = planner.plan(request).map_err(value_error)?;

    let mut value = serde_json::to_value(&outcome).map_err(value_error)?;
    value["messages"] = json!({
        "conflicts": outcome.conflicts.iter().map(|c| c.to_string()).collect::<Vec<_>>(),
        "suggestions": outcome.suggestions.iter().map(|s| s.to_string()).collect::<Vec<_>>(),
        "validation_issues": outcome
            .validation_issues
            .iter()
            .map(|i| i.to_string())
            .collect::<Vec<_>>(),
    });
    value["over_constrained"] = json!(outcome.is_over_constrained());
    serde_json::to_string(&value).map_err(value_error)
}

/// Critical path ids for activities and explicit dependencies (implicit
/// dependencies are inferred).
#[pyfunction]
#[pyo3(signature = (activities_json, dependencies_json, project_start, verbosity=0))]
fn critical_path(
    activities_json: &str,
    dependencies_json: &str,
    project_start: NaiveDateTime,
    verbosity: u8,
) -> PyResult<Vec<String>> {
    let activities: Vec<Activity> = serde_json::from_str(activities_json).map_err(value_error)?;
    let dependencies: Vec<Dependency> =
        serde_json::from_str(dependencies_json).map_err(value_error)?;

    let mut graph = DependencyGraph::from_parts(&activities, &dependencies, true, verbosity)
        .map_err(value_error)?;
    analyze(&mut graph, project_start, verbosity).map_err(value_error)?;
    Ok(graph.critical_path)
}

/// The plano_timeline Python module.
#[pymodule]
fn plano_timeline(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PyPlanningConfig>()?;

    m.add_function(wrap_pyfunction!(plan_timeline, m)?)?;
    m.add_function(wrap_pyfunction!(critical_path, m)?)?;

    Ok(())
}
