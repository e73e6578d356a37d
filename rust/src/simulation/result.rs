//! Python-facing simulation result.

use chrono::NaiveDate;
use pyo3::prelude::*;
use std::collections::{BTreeMap, HashMap};

use super::distribution::CompletionDistribution;
use crate::error::ScheduleError;

/// Completion-date distributions per milestone and synthetic project key.
#[pyclass]
#[derive(Clone, Debug, Default)]
pub struct SimulationResult {
    #[pyo3(get)]
    pub trial_count: usize,
    #[pyo3(get)]
    pub seed: u64,
    pub distributions: HashMap<String, CompletionDistribution>,
}

impl SimulationResult {
    pub fn distribution(&self, key: &str) -> Option<&CompletionDistribution> {
        self.distributions.get(key)
    }

    /// Completion keys, sorted.
    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.distributions.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }

    /// Percentile date for one key, `None` if the key is unknown.
    pub fn percentile(&self, key: &str, p: f64) -> Result<Option<NaiveDate>, ScheduleError> {
        match self.distributions.get(key) {
            Some(dist) => dist.percentile(p),
            None => {
                // Still reject a bad percentile for unknown keys
                CompletionDistribution::default().percentile(p)
            }
        }
    }

    /// Percentile date for every key.
    pub fn percentiles(&self, p: f64) -> Result<HashMap<String, NaiveDate>, ScheduleError> {
        let mut dates = HashMap::with_capacity(self.distributions.len());
        for (key, dist) in &self.distributions {
            if let Some(date) = dist.percentile(p)? {
                dates.insert(key.clone(), date);
            }
        }
        Ok(dates)
    }

    pub fn histogram(&self, key: &str) -> Option<BTreeMap<NaiveDate, usize>> {
        self.distributions.get(key).map(CompletionDistribution::histogram)
    }
}

fn to_py_err(e: ScheduleError) -> PyErr {
    pyo3::exceptions::PyValueError::new_err(e.to_string())
}

#[pymethods]
impl SimulationResult {
    /// Sorted completion dates per key.
    #[getter(distributions)]
    fn py_distributions(&self) -> HashMap<String, Vec<NaiveDate>> {
        self.distributions
            .iter()
            .map(|(key, dist)| (key.clone(), dist.dates().to_vec()))
            .collect()
    }

    #[pyo3(name = "keys")]
    fn py_keys(&self) -> Vec<String> {
        self.keys().into_iter().map(str::to_string).collect()
    }

    #[pyo3(name = "percentile")]
    fn py_percentile(&self, key: &str, p: f64) -> PyResult<Option<NaiveDate>> {
        self.percentile(key, p).map_err(to_py_err)
    }

    #[pyo3(name = "percentiles")]
    fn py_percentiles(&self, p: f64) -> PyResult<HashMap<String, NaiveDate>> {
        self.percentiles(p).map_err(to_py_err)
    }

    #[pyo3(name = "histogram")]
    fn py_histogram(&self, key: &str) -> Option<BTreeMap<NaiveDate, usize>> {
        self.histogram(key)
    }

    fn __repr__(&self) -> String {
        format!(
            "SimulationResult(trial_count={}, seed={}, keys={:?})",
            self.trial_count,
            self.seed,
            self.keys()
        )
    }
}
