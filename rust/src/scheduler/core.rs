//! Deterministic, calendar-aware task placement.

use chrono::NaiveDate;
use rustc_hash::FxHashMap;
use std::collections::HashMap;

use crate::calendar::Calendar;
use crate::config::SchedulingConfig;
use crate::error::ScheduleError;
use crate::interner::Idx;
use crate::models::{completion_dates, Assignee, Milestone, ScheduleResult, ScheduledTask, Task};
use crate::work_graph::WorkGraph;
use crate::{log_changes, log_checks, log_debug};

use super::roster::Roster;
use super::state::{Placement, PlacementContext};

/// Validated scheduling problem, reusable across any number of placement runs.
///
/// Holds only immutable data; every run builds its own [`PlacementContext`].
#[derive(Clone, Debug)]
pub struct Scheduler {
    graph: WorkGraph,
    roster: Roster,
    start_date: NaiveDate,
    verbosity: u8,
}

impl Scheduler {
    /// Validate the input and resolve every reference.
    ///
    /// All input errors surface here, before anything is placed.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        tasks: Vec<Task>,
        milestones: Vec<Milestone>,
        assignees: Vec<Assignee>,
        phantom_worker_count: usize,
        holidays: Vec<NaiveDate>,
        personal_holidays: &HashMap<String, Vec<NaiveDate>>,
        start_date: NaiveDate,
        config: &SchedulingConfig,
    ) -> Result<Self, ScheduleError> {
        let graph = WorkGraph::new(tasks, milestones)?;
        let roster = Roster::build(
            &graph,
            assignees,
            phantom_worker_count,
            holidays,
            personal_holidays,
            config,
        )?;

        log_debug!(
            config.verbosity,
            "Scheduler ready: {} tasks, {} workers, start {}",
            graph.len(),
            roster.calendar.worker_count(),
            start_date
        );

        Ok(Self {
            graph,
            roster,
            start_date,
            verbosity: config.verbosity,
        })
    }

    pub fn graph(&self) -> &WorkGraph {
        &self.graph
    }

    pub fn calendar(&self) -> &Calendar {
        &self.roster.calendar
    }

    pub fn start_date(&self) -> NaiveDate {
        self.start_date
    }

    /// Place every task using its likely estimate.
    pub fn schedule(&self) -> Result<ScheduleResult, ScheduleError> {
        let durations = self.graph.likely_durations();
        let placement = self.place(&durations)?;
        Ok(self.to_result(&placement, &durations))
    }

    /// Place every task with caller-supplied whole-day durations.
    ///
    /// `durations` is indexed like the input task list. The source of the
    /// durations (point estimate or sample) does not matter here.
    pub fn place(&self, durations: &[u32]) -> Result<Placement, ScheduleError> {
        self.place_with_verbosity(durations, self.verbosity)
    }

    pub(crate) fn place_with_verbosity(
        &self,
        durations: &[u32],
        verbosity: u8,
    ) -> Result<Placement, ScheduleError> {
        if durations.len() != self.graph.len() {
            return Err(ScheduleError::InvalidEstimate {
                task_id: String::new(),
                reason: format!(
                    "expected {} durations, got {}",
                    self.graph.len(),
                    durations.len()
                ),
            });
        }

        let calendar = &self.roster.calendar;
        let mut ctx =
            PlacementContext::new(calendar.worker_count(), self.graph.len(), self.start_date);
        let mut pending: Vec<Idx> = self.graph.priority_order().to_vec();

        // Every pass places at least one task or fails, so len() passes suffice
        for pass in 0..self.graph.len() {
            if pending.is_empty() {
                break;
            }
            let before = pending.len();
            let mut deferred: Vec<Idx> = Vec::new();

            for task in pending {
                let Some(candidate) = self.earliest_candidate(&ctx, task, verbosity)? else {
                    log_checks!(
                        verbosity,
                        "  Deferring {} (pass {}): predecessor not placed",
                        self.graph.task(task).id,
                        pass
                    );
                    deferred.push(task);
                    continue;
                };

                let worker = self.roster.worker_of(task);
                let days = durations[task as usize];
                let start = calendar.next_working_day(worker, candidate)?;
                let end = calendar.advance_days(worker, start, days)?;
                ctx.record(task, worker, start, end)?;

                log_changes!(
                    verbosity,
                    "  Placed {} on {} from {} to {} ({} days)",
                    self.graph.task(task).id,
                    calendar.worker_id(worker),
                    start,
                    end,
                    days
                );
            }

            if deferred.len() == before {
                return Err(self.unresolvable(&deferred));
            }
            pending = deferred;
        }

        if !pending.is_empty() {
            return Err(self.unresolvable(&pending));
        }

        let placed = ctx.placed_count();
        ctx.finish().ok_or_else(|| {
            log_debug!(verbosity, "  Only {} tasks placed", placed);
            ScheduleError::UnresolvablePlacement {
                task_ids: Vec::new(),
            }
        })
    }

    /// Earliest date a task may occupy, or `None` if a predecessor is unplaced.
    fn earliest_candidate(
        &self,
        ctx: &PlacementContext,
        task: Idx,
        verbosity: u8,
    ) -> Result<Option<NaiveDate>, ScheduleError> {
        let mut candidate = ctx.cursor(self.roster.worker_of(task));

        if let Some(milestone) = self.graph.milestone_of(task) {
            if milestone.start_date > candidate {
                log_checks!(
                    verbosity,
                    "    {} gated by milestone {} until {}",
                    self.graph.task(task).id,
                    milestone.id,
                    milestone.start_date
                );
                candidate = milestone.start_date;
            }
        }

        for &pred in self.graph.predecessors(task) {
            let Some((_, pred_end)) = ctx.span(pred) else {
                return Ok(None);
            };
            let after = pred_end.succ_opt().ok_or(ScheduleError::DateOutOfRange)?;
            candidate = candidate.max(after);
        }

        Ok(Some(candidate))
    }

    fn unresolvable(&self, remaining: &[Idx]) -> ScheduleError {
        ScheduleError::UnresolvablePlacement {
            task_ids: remaining
                .iter()
                .map(|&t| self.graph.task(t).id.clone())
                .collect(),
        }
    }

    /// Completion date per milestone and synthetic project key for a placement.
    pub fn completions(&self, placement: &Placement) -> FxHashMap<String, NaiveDate> {
        completion_dates(self.graph.tasks().iter().zip(&placement.spans).map(
            |(task, &(_, end))| (task.project_id.as_str(), task.milestone_id.as_deref(), end),
        ))
    }

    /// Build the public result records for a placement.
    pub fn to_result(&self, placement: &Placement, durations: &[u32]) -> ScheduleResult {
        let calendar = &self.roster.calendar;

        let scheduled_tasks = placement
            .order
            .iter()
            .map(|&idx| {
                let task = self.graph.task(idx);
                let (start_date, end_date) = placement.spans[idx as usize];
                let worker = self.roster.worker_of(idx);
                let late = self
                    .graph
                    .milestone_of(idx)
                    .map_or(false, |m| end_date > m.target_end_date);
                ScheduledTask {
                    task_id: task.id.clone(),
                    project_id: task.project_id.clone(),
                    milestone_id: task.milestone_id.clone(),
                    assignee: calendar.worker_id(worker).to_string(),
                    phantom: self.roster.is_phantom(worker),
                    start_date,
                    end_date,
                    duration_days: durations[idx as usize],
                    late,
                }
            })
            .collect();

        let by_assignee = placement
            .by_worker
            .iter()
            .enumerate()
            .filter(|(_, tasks)| !tasks.is_empty())
            .map(|(worker, tasks)| {
                (
                    calendar.worker_id(worker as Idx).to_string(),
                    tasks
                        .iter()
                        .map(|&t| self.graph.task(t).id.clone())
                        .collect(),
                )
            })
            .collect();

        ScheduleResult {
            scheduled_tasks,
            by_assignee,
        }
    }
}
