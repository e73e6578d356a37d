//! Per-run placement state.

use chrono::NaiveDate;

use crate::error::ScheduleError;
use crate::interner::Idx;

/// Mutable state owned by exactly one placement run.
///
/// Built fresh for every run (and every simulation trial), so worker cursors
/// never leak from one run into another.
#[derive(Clone, Debug)]
pub struct PlacementContext {
    /// Next date each worker is free, indexed by worker
    cursors: Vec<NaiveDate>,
    /// Placed (start, end) per task, indexed by task
    spans: Vec<Option<(NaiveDate, NaiveDate)>>,
    /// Task indices in the order they were placed
    order: Vec<Idx>,
    /// Task indices per worker in placement order
    by_worker: Vec<Vec<Idx>>,
}

impl PlacementContext {
    pub fn new(worker_count: usize, task_count: usize, start_date: NaiveDate) -> Self {
        Self {
            cursors: vec![start_date; worker_count],
            spans: vec![None; task_count],
            order: Vec::with_capacity(task_count),
            by_worker: vec![Vec::new(); worker_count],
        }
    }

    #[inline]
    pub fn cursor(&self, worker: Idx) -> NaiveDate {
        self.cursors[worker as usize]
    }

    #[inline]
    pub fn span(&self, task: Idx) -> Option<(NaiveDate, NaiveDate)> {
        self.spans[task as usize]
    }

    /// Record a placement and move the worker's cursor to the day after `end`.
    pub fn record(
        &mut self,
        task: Idx,
        worker: Idx,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<(), ScheduleError> {
        self.cursors[worker as usize] = end.succ_opt().ok_or(ScheduleError::DateOutOfRange)?;
        self.spans[task as usize] = Some((start, end));
        self.order.push(task);
        self.by_worker[worker as usize].push(task);
        Ok(())
    }

    pub fn placed_count(&self) -> usize {
        self.order.len()
    }

    /// Freeze the run into its result.
    ///
    /// Returns `None` if any task was left unplaced.
    pub fn finish(self) -> Option<Placement> {
        let spans = self.spans.into_iter().collect::<Option<Vec<_>>>()?;
        Some(Placement {
            spans,
            order: self.order,
            by_worker: self.by_worker,
        })
    }
}

/// Completed placement: one span per task, indexed by task.
#[derive(Clone, Debug, PartialEq)]
pub struct Placement {
    pub spans: Vec<(NaiveDate, NaiveDate)>,
    pub order: Vec<Idx>,
    pub by_worker: Vec<Vec<Idx>>,
}
