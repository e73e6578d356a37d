//! Rust implementation of the qlu scheduling engine.
//!
//! Places prioritized tasks on per-worker calendars and runs Monte Carlo
//! simulations over triangular duration estimates to produce completion-date
//! distributions per milestone.

// Allow clippy warning triggered by PyO3 macro expansion
#![allow(clippy::useless_conversion)]

use chrono::NaiveDate;
use pyo3::prelude::*;
use std::collections::HashMap;

pub mod calendar;
mod config;
pub mod error;
mod interner;
pub mod logging;
mod models;
pub mod sampler;
pub mod scheduler;
pub mod simulation;
pub mod work_graph;

pub use calendar::{Calendar, HolidayCalendar, WorkerCalendar};
pub use config::{SchedulingConfig, DEFAULT_PHANTOM_PREFIX, DEFAULT_WORKDAYS};
pub use error::ScheduleError;
pub use models::{
    completion_dates, project_key, Assignee, Estimate, Milestone, ScheduleResult, ScheduledTask,
    Task, TrialResult, WHOLE_PROJECT_KEY,
};
pub use sampler::{RandomSource, XorShiftRng};
pub use scheduler::{Placement, Scheduler};
pub use simulation::{CompletionDistribution, SimulationCancellation, SimulationResult, Simulator};
pub use work_graph::WorkGraph;

/// Place every task once using its likely estimate.
///
/// Validates the whole input first; nothing is placed if any of it is invalid.
#[allow(clippy::too_many_arguments)]
pub fn place_schedule(
    tasks: Vec<Task>,
    milestones: Vec<Milestone>,
    assignees: Vec<Assignee>,
    phantom_worker_count: usize,
    holidays: Vec<NaiveDate>,
    personal_holidays: &HashMap<String, Vec<NaiveDate>>,
    start_date: NaiveDate,
    config: &SchedulingConfig,
) -> Result<ScheduleResult, ScheduleError> {
    Scheduler::new(
        tasks,
        milestones,
        assignees,
        phantom_worker_count,
        holidays,
        personal_holidays,
        start_date,
        config,
    )?
    .schedule()
}

/// Run `trial_count` seeded trials and collect completion-date distributions.
#[allow(clippy::too_many_arguments)]
pub fn simulate_schedule(
    tasks: Vec<Task>,
    milestones: Vec<Milestone>,
    assignees: Vec<Assignee>,
    phantom_worker_count: usize,
    holidays: Vec<NaiveDate>,
    personal_holidays: &HashMap<String, Vec<NaiveDate>>,
    start_date: NaiveDate,
    trial_count: usize,
    seed: u64,
    config: &SchedulingConfig,
) -> Result<SimulationResult, ScheduleError> {
    let scheduler = Scheduler::new(
        tasks,
        milestones,
        assignees,
        phantom_worker_count,
        holidays,
        personal_holidays,
        start_date,
        config,
    )?;
    Simulator::new(scheduler, config).run(trial_count, seed)
}

/// Compute the deterministic schedule.
///
/// # Arguments
/// * `tasks` - Tasks to place; lower priority values are placed first
/// * `milestones` - Milestones referenced by the tasks
/// * `start_date` - Earliest date any task may start
/// * `assignees` - Real workers with their workdays and personal holidays
/// * `phantom_worker_count` - Synthetic workers that absorb unassigned tasks
/// * `holidays` - Non-working dates for every worker
/// * `personal_holidays` - Extra non-working dates per worker id
/// * `config` - Scheduling configuration (defaults if omitted)
///
/// # Raises
/// * ValueError on invalid input (unknown ids, cycles, bad estimates, ...)
#[pyfunction]
#[pyo3(name = "place_schedule")]
#[pyo3(signature = (
    tasks,
    milestones,
    start_date,
    assignees=Vec::new(),
    phantom_worker_count=0,
    holidays=Vec::new(),
    personal_holidays=HashMap::new(),
    config=None
))]
#[allow(clippy::too_many_arguments)]
fn py_place_schedule(
    tasks: Vec<Task>,
    milestones: Vec<Milestone>,
    start_date: NaiveDate,
    assignees: Vec<Assignee>,
    phantom_worker_count: usize,
    holidays: Vec<NaiveDate>,
    personal_holidays: HashMap<String, Vec<NaiveDate>>,
    config: Option<SchedulingConfig>,
) -> PyResult<ScheduleResult> {
    let config = config.unwrap_or_default();
    match place_schedule(
        tasks,
        milestones,
        assignees,
        phantom_worker_count,
        holidays,
        &personal_holidays,
        start_date,
        &config,
    ) {
        Ok(result) => Ok(result),
        Err(e) => Err(pyo3::exceptions::PyValueError::new_err(e.to_string())),
    }
}

/// Run a seeded Monte Carlo simulation of the schedule.
///
/// Takes the same arguments as `place_schedule` plus `trial_count` and
/// `seed`. The GIL is released while trials run.
#[pyfunction]
#[pyo3(name = "simulate_schedule")]
#[pyo3(signature = (
    tasks,
    milestones,
    start_date,
    trial_count,
    seed,
    assignees=Vec::new(),
    phantom_worker_count=0,
    holidays=Vec::new(),
    personal_holidays=HashMap::new(),
    config=None
))]
#[allow(clippy::too_many_arguments)]
fn py_simulate_schedule(
    py: Python<'_>,
    tasks: Vec<Task>,
    milestones: Vec<Milestone>,
    start_date: NaiveDate,
    trial_count: usize,
    seed: u64,
    assignees: Vec<Assignee>,
    phantom_worker_count: usize,
    holidays: Vec<NaiveDate>,
    personal_holidays: HashMap<String, Vec<NaiveDate>>,
    config: Option<SchedulingConfig>,
) -> PyResult<SimulationResult> {
    let config = config.unwrap_or_default();
    py.allow_threads(|| {
        simulate_schedule(
            tasks,
            milestones,
            assignees,
            phantom_worker_count,
            holidays,
            &personal_holidays,
            start_date,
            trial_count,
            seed,
            &config,
        )
    })
    .map_err(|e| pyo3::exceptions::PyValueError::new_err(e.to_string()))
}

/// The qlu.rust Python module.
#[pymodule]
fn rust(m: &Bound<'_, PyModule>) -> PyResult<()> {
    // Input records
    m.add_class::<Estimate>()?;
    m.add_class::<Task>()?;
    m.add_class::<Milestone>()?;
    m.add_class::<Assignee>()?;

    // Results
    m.add_class::<ScheduledTask>()?;
    m.add_class::<ScheduleResult>()?;
    m.add_class::<SimulationResult>()?;

    // Config types
    m.add_class::<SchedulingConfig>()?;

    // Algorithms
    m.add_function(wrap_pyfunction!(py_place_schedule, m)?)?;
    m.add_function(wrap_pyfunction!(py_simulate_schedule, m)?)?;

    Ok(())
}
