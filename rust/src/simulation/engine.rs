//! Monte Carlo trial runner.

use chrono::NaiveDate;
use rayon::prelude::*;
use rustc_hash::FxHashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::distribution::CompletionDistribution;
use super::result::SimulationResult;
use crate::config::SchedulingConfig;
use crate::error::ScheduleError;
use crate::logging::VERBOSITY_DEBUG;
use crate::models::TrialResult;
use crate::sampler::{sample_durations, trial_seed, XorShiftRng};
use crate::scheduler::Scheduler;
use crate::{log_changes, log_debug};

/// Cancellation handle for a simulation run.
///
/// Cloned handles share one flag. Checked before every trial.
#[derive(Debug, Clone)]
pub struct SimulationCancellation {
    flag: Arc<AtomicBool>,
}

impl SimulationCancellation {
    pub fn new() -> Self {
        Self {
            flag: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }

    pub fn reset(&self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}

impl Default for SimulationCancellation {
    fn default() -> Self {
        Self::new()
    }
}

/// Runs independent placement trials over one validated [`Scheduler`].
#[derive(Clone, Debug)]
pub struct Simulator {
    scheduler: Scheduler,
    parallel: bool,
    verbosity: u8,
}

impl Simulator {
    pub fn new(scheduler: Scheduler, config: &SchedulingConfig) -> Self {
        Self {
            scheduler,
            parallel: config.parallel,
            verbosity: config.verbosity,
        }
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn run(&self, trial_count: usize, seed: u64) -> Result<SimulationResult, ScheduleError> {
        self.run_with_cancellation(trial_count, seed, &SimulationCancellation::new())
    }

    /// Run `trial_count` trials and merge their completion dates.
    ///
    /// Trial `i` depends only on `seed` and `i`, so parallel and sequential
    /// runs produce identical results. Any failing trial aborts the run.
    pub fn run_with_cancellation(
        &self,
        trial_count: usize,
        seed: u64,
        cancellation: &SimulationCancellation,
    ) -> Result<SimulationResult, ScheduleError> {
        log_changes!(
            self.verbosity,
            "Simulating {} trials (seed {}, parallel {})",
            trial_count,
            seed,
            self.parallel
        );

        let guarded = |trial: usize| -> Result<TrialResult, ScheduleError> {
            if cancellation.is_cancelled() {
                return Err(ScheduleError::Cancelled);
            }
            self.run_trial(trial, seed)
        };

        let trials: Vec<TrialResult> = if self.parallel {
            (0..trial_count)
                .into_par_iter()
                .map(guarded)
                .collect::<Result<Vec<_>, _>>()?
        } else {
            (0..trial_count)
                .map(guarded)
                .collect::<Result<Vec<_>, _>>()?
        };

        Ok(merge_trials(trials, trial_count, seed))
    }

    /// Sample durations for one trial and place them with fresh cursors.
    pub fn run_trial(&self, trial: usize, seed: u64) -> Result<TrialResult, ScheduleError> {
        let trial_seed = trial_seed(seed, trial);
        let mut rng = XorShiftRng::new(trial_seed);
        let durations = sample_durations(self.scheduler.graph().tasks(), &mut rng)?;

        log_debug!(
            self.verbosity,
            "Trial {} seed {:#018x} durations {:?}",
            trial,
            trial_seed,
            durations
        );

        // Per-task placement logs only at debug level inside trials
        let placement_verbosity = if self.verbosity >= VERBOSITY_DEBUG {
            self.verbosity
        } else {
            0
        };
        let placement = self
            .scheduler
            .place_with_verbosity(&durations, placement_verbosity)?;

        Ok(TrialResult {
            trial_index: trial,
            completions: self.scheduler.completions(&placement),
        })
    }
}

/// Group completion dates by key, then sort each key's dates.
fn merge_trials(trials: Vec<TrialResult>, trial_count: usize, seed: u64) -> SimulationResult {
    let mut merged: FxHashMap<String, Vec<NaiveDate>> = FxHashMap::default();
    for trial in trials {
        for (key, date) in trial.completions {
            merged
                .entry(key)
                .or_insert_with(|| Vec::with_capacity(trial_count))
                .push(date);
        }
    }

    SimulationResult {
        trial_count,
        seed,
        distributions: merged
            .into_iter()
            .map(|(key, dates)| (key, CompletionDistribution::from_unsorted(dates)))
            .collect(),
    }
}
