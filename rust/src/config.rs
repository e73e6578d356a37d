//! Configuration for placement and simulation runs.

use pyo3::prelude::*;

/// Default phantom worker name prefix; worker `i` is named `phantom-{i}`.
pub const DEFAULT_PHANTOM_PREFIX: &str = "phantom-";

/// Weekdays used for any worker that does not specify its own.
pub const DEFAULT_WORKDAYS: [&str; 5] = ["Mon", "Tue", "Wed", "Thu", "Fri"];

/// Configuration shared by deterministic placement and simulation.
#[pyclass]
#[derive(Clone, Debug)]
pub struct SchedulingConfig {
    /// Prefix for generated phantom worker ids
    #[pyo3(get, set)]
    pub phantom_prefix: String,
    /// Workdays for phantom workers and assignees without their own
    #[pyo3(get, set)]
    pub default_workdays: Vec<String>,
    /// Verbosity level: 0=silent, 1=changes, 2=checks, 3=debug
    #[pyo3(get, set)]
    pub verbosity: u8,
    /// Run simulation trials on the rayon thread pool
    #[pyo3(get, set)]
    pub parallel: bool,
}

impl Default for SchedulingConfig {
    fn default() -> Self {
        Self {
            phantom_prefix: DEFAULT_PHANTOM_PREFIX.to_string(),
            default_workdays: DEFAULT_WORKDAYS.iter().map(|d| d.to_string()).collect(),
            verbosity: 0,
            parallel: true,
        }
    }
}

impl SchedulingConfig {
    /// Id of the `index`-th phantom worker.
    pub fn phantom_name(&self, index: usize) -> String {
        format!("{}{}", self.phantom_prefix, index)
    }
}

#[pymethods]
impl SchedulingConfig {
    #[new]
    #[pyo3(signature = (
        phantom_prefix=None,
        default_workdays=None,
        verbosity=None,
        parallel=None
    ))]
    fn new(
        phantom_prefix: Option<String>,
        default_workdays: Option<Vec<String>>,
        verbosity: Option<u8>,
        parallel: Option<bool>,
    ) -> Self {
        let defaults = Self::default();
        Self {
            phantom_prefix: phantom_prefix.unwrap_or(defaults.phantom_prefix),
            default_workdays: default_workdays.unwrap_or(defaults.default_workdays),
            verbosity: verbosity.unwrap_or(defaults.verbosity),
            parallel: parallel.unwrap_or(defaults.parallel),
        }
    }

    fn __repr__(&self) -> String {
        format!(
            "SchedulingConfig(phantom_prefix={:?}, default_workdays={:?}, verbosity={}, parallel={})",
            self.phantom_prefix, self.default_workdays, self.verbosity, self.parallel
        )
    }
}
