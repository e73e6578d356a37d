//! Worker roster: real assignees, phantom capacity and task-to-worker binding.

use chrono::NaiveDate;
use rustc_hash::FxHashMap;
use std::collections::HashMap;

use crate::calendar::{Calendar, HolidayCalendar, WorkerCalendar};
use crate::config::SchedulingConfig;
use crate::error::ScheduleError;
use crate::interner::Idx;
use crate::models::Assignee;
use crate::work_graph::WorkGraph;
use crate::{log_changes, log_checks};

/// Every worker's calendar plus the worker each task is placed on.
#[derive(Clone, Debug)]
pub struct Roster {
    pub calendar: Calendar,
    /// Worker index per task index
    pub task_worker: Vec<Idx>,
    /// Phantom flag per worker index
    pub phantom: Vec<bool>,
}

/// Merge assignee records that share an id.
///
/// Personal holidays are unioned; the first non-empty workday list wins.
fn merge_assignees(assignees: Vec<Assignee>) -> Vec<Assignee> {
    let mut merged: Vec<Assignee> = Vec::with_capacity(assignees.len());
    let mut position: FxHashMap<String, usize> = FxHashMap::default();
    for assignee in assignees {
        match position.get(&assignee.id) {
            Some(&i) => {
                let existing = &mut merged[i];
                if existing.workdays.is_empty() {
                    existing.workdays = assignee.workdays;
                }
                existing.personal_holidays.extend(assignee.personal_holidays);
            }
            None => {
                position.insert(assignee.id.clone(), merged.len());
                merged.push(assignee);
            }
        }
    }
    merged
}

impl Roster {
    /// Build calendars for every worker and bind each task to one.
    ///
    /// Unassigned tasks rotate over the phantom workers in priority order.
    pub fn build(
        graph: &WorkGraph,
        assignees: Vec<Assignee>,
        phantom_worker_count: usize,
        holidays: Vec<NaiveDate>,
        personal_holidays: &HashMap<String, Vec<NaiveDate>>,
        config: &SchedulingConfig,
    ) -> Result<Self, ScheduleError> {
        let verbosity = config.verbosity;
        let mut calendar = Calendar::new(HolidayCalendar::from_dates(holidays));
        let mut phantom: Vec<bool> = Vec::new();

        let extra_holidays = |id: &str| -> Vec<NaiveDate> {
            match personal_holidays.get(id) {
                Some(dates) => dates.clone(),
                None => {
                    log_checks!(verbosity, "No personal holidays given for {}", id);
                    Vec::new()
                }
            }
        };

        for assignee in merge_assignees(assignees) {
            let workdays = if assignee.workdays.is_empty() {
                config.default_workdays.as_slice()
            } else {
                assignee.workdays.as_slice()
            };
            let mut days_off = assignee.personal_holidays.clone();
            days_off.extend(extra_holidays(&assignee.id));
            let worker = WorkerCalendar::new(assignee.id.as_str(), workdays, days_off)?;
            calendar.add_worker(worker);
            phantom.push(false);
        }

        // Assignees named on tasks but never described get the default calendar
        for task in graph.tasks() {
            let Some(assignee) = task.assignee.as_deref() else {
                continue;
            };
            if calendar.worker_index(assignee).is_some() {
                continue;
            }
            log_checks!(
                verbosity,
                "Assignee {} has no calendar, using default workdays",
                assignee
            );
            let worker = WorkerCalendar::new(
                assignee,
                config.default_workdays.as_slice(),
                extra_holidays(assignee),
            )?;
            calendar.add_worker(worker);
            phantom.push(false);
        }

        let mut phantoms: Vec<Idx> = Vec::with_capacity(phantom_worker_count);
        for i in 0..phantom_worker_count {
            let name = config.phantom_name(i);
            if calendar.worker_index(&name).is_some() {
                return Err(ScheduleError::DuplicateWorker { worker_id: name });
            }
            let worker = WorkerCalendar::new(name, config.default_workdays.as_slice(), Vec::new())?;
            phantoms.push(calendar.add_worker(worker));
            phantom.push(true);
        }

        let mut task_worker: Vec<Idx> = vec![0; graph.len()];
        let mut rotation = 0usize;
        for &task_idx in graph.priority_order() {
            let task = graph.task(task_idx);
            let worker = match task.assignee.as_deref() {
                Some(assignee) => calendar
                    .worker_index(assignee)
                    .ok_or_else(|| ScheduleError::NoAssignee {
                        task_id: task.id.clone(),
                    })?,
                None => {
                    if phantoms.is_empty() {
                        return Err(ScheduleError::NoAssignee {
                            task_id: task.id.clone(),
                        });
                    }
                    let worker = phantoms[rotation % phantoms.len()];
                    rotation += 1;
                    log_changes!(
                        verbosity,
                        "Assigning phantom worker {} to task {}",
                        calendar.worker_id(worker),
                        task.id
                    );
                    worker
                }
            };
            task_worker[task_idx as usize] = worker;
        }

        Ok(Self {
            calendar,
            task_worker,
            phantom,
        })
    }

    #[inline]
    pub fn worker_of(&self, task: Idx) -> Idx {
        self.task_worker[task as usize]
    }

    pub fn is_phantom(&self, worker: Idx) -> bool {
        self.phantom[worker as usize]
    }
}
