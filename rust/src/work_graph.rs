//! Validated task graph: milestone links, predecessors and priority order.
//!
//! All id references are resolved to dense indices here, once, so placement
//! never looks anything up by string and never sees a dangling reference.

use crate::calendar::whole_days;
use crate::error::ScheduleError;
use crate::interner::{IdInterner, Idx};
use crate::models::{is_reserved_key, Milestone, Task};

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    InProgress,
    Done,
}

/// Find a cycle in the predecessor relation with an iterative depth-first search.
///
/// Returns the indices along the cycle with the first index repeated at the end.
fn find_cycle(predecessors: &[Vec<Idx>]) -> Option<Vec<Idx>> {
    let mut marks = vec![Mark::Unvisited; predecessors.len()];

    for root in 0..predecessors.len() {
        if marks[root] != Mark::Unvisited {
            continue;
        }
        marks[root] = Mark::InProgress;
        // (node, position of the next edge to explore)
        let mut stack: Vec<(usize, usize)> = vec![(root, 0)];

        while let Some(frame) = stack.last_mut() {
            let (node, edge) = *frame;
            match predecessors[node].get(edge) {
                Some(&next) => {
                    frame.1 += 1;
                    let next = next as usize;
                    match marks[next] {
                        Mark::Unvisited => {
                            marks[next] = Mark::InProgress;
                            stack.push((next, 0));
                        }
                        Mark::InProgress => {
                            let start = stack.iter().position(|&(n, _)| n == next)?;
                            let mut cycle: Vec<Idx> =
                                stack[start..].iter().map(|&(n, _)| n as Idx).collect();
                            cycle.push(next as Idx);
                            return Some(cycle);
                        }
                        Mark::Done => {}
                    }
                }
                None => {
                    marks[node] = Mark::Done;
                    stack.pop();
                }
            }
        }
    }

    None
}

/// Tasks and milestones with every reference resolved and validated.
#[derive(Clone, Debug)]
pub struct WorkGraph {
    tasks: Vec<Task>,
    task_ids: IdInterner,
    milestones: Vec<Milestone>,
    milestone_of: Vec<Option<Idx>>,
    predecessors: Vec<Vec<Idx>>,
    order: Vec<Idx>,
}

impl WorkGraph {
    /// Validate and resolve the input.
    ///
    /// Fails on the first problem found; nothing is placed from a graph that
    /// did not build.
    pub fn new(tasks: Vec<Task>, milestones: Vec<Milestone>) -> Result<Self, ScheduleError> {
        if tasks.is_empty() {
            return Err(ScheduleError::EmptyTaskList);
        }

        let mut milestone_ids = IdInterner::with_capacity(milestones.len());
        for milestone in &milestones {
            if is_reserved_key(&milestone.id) {
                return Err(ScheduleError::ReservedMilestoneId {
                    milestone_id: milestone.id.clone(),
                });
            }
            if milestone_ids.intern_unique(&milestone.id).is_none() {
                return Err(ScheduleError::DuplicateMilestone {
                    milestone_id: milestone.id.clone(),
                });
            }
            if milestone.target_end_date < milestone.start_date {
                return Err(ScheduleError::InvalidMilestone {
                    milestone_id: milestone.id.clone(),
                });
            }
        }

        let mut task_ids = IdInterner::with_capacity(tasks.len());
        for task in &tasks {
            if task_ids.intern_unique(&task.id).is_none() {
                return Err(ScheduleError::DuplicateTask {
                    task_id: task.id.clone(),
                });
            }
            task.estimate
                .validate()
                .map_err(|reason| ScheduleError::InvalidEstimate {
                    task_id: task.id.clone(),
                    reason,
                })?;
        }

        let mut milestone_of = Vec::with_capacity(tasks.len());
        let mut predecessors = Vec::with_capacity(tasks.len());
        for task in &tasks {
            let milestone = match &task.milestone_id {
                Some(milestone_id) => Some(milestone_ids.get(milestone_id).ok_or_else(|| {
                    ScheduleError::UnknownMilestone {
                        task_id: task.id.clone(),
                        milestone_id: milestone_id.clone(),
                    }
                })?),
                None => None,
            };
            milestone_of.push(milestone);

            let mut preds: Vec<Idx> = Vec::with_capacity(task.depends_on.len());
            for dep_id in &task.depends_on {
                let dep = task_ids
                    .get(dep_id)
                    .ok_or_else(|| ScheduleError::UnknownPredecessor {
                        task_id: task.id.clone(),
                        predecessor_id: dep_id.clone(),
                    })?;
                if !preds.contains(&dep) {
                    preds.push(dep);
                }
            }
            predecessors.push(preds);
        }

        if let Some(cycle) = find_cycle(&predecessors) {
            return Err(ScheduleError::CyclicDependency {
                cycle: cycle
                    .into_iter()
                    .map(|idx| task_ids.resolve(idx).to_string())
                    .collect(),
            });
        }

        // Stable sort keeps input order for equal priorities
        let mut order: Vec<Idx> = (0..tasks.len() as Idx).collect();
        order.sort_by_key(|&idx| tasks[idx as usize].priority);

        Ok(Self {
            tasks,
            task_ids,
            milestones,
            milestone_of,
            predecessors,
            order,
        })
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Tasks in input order; indices into this slice are task indices.
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    #[inline]
    pub fn task(&self, idx: Idx) -> &Task {
        &self.tasks[idx as usize]
    }

    pub fn task_index(&self, id: &str) -> Option<Idx> {
        self.task_ids.get(id)
    }


    /// Milestone linked to a task, if any.
    #[inline]
    pub fn milestone_of(&self, idx: Idx) -> Option<&Milestone> {
        self.milestone_of[idx as usize].map(|m| &self.milestones[m as usize])
    }

    #[inline]
    pub fn predecessors(&self, idx: Idx) -> &[Idx] {
        &self.predecessors[idx as usize]
    }

    /// Task indices by ascending priority, ties in input order.
    ///
    /// Not a topological order: a task may come before its predecessors.
    pub fn priority_order(&self) -> &[Idx] {
        &self.order
    }

    /// Likely estimate of every task as whole days, in input order.
    pub fn likely_durations(&self) -> Vec<u32> {
        self.tasks
            .iter()
            .map(|t| whole_days(t.estimate.likely_days))
            .collect()
    }
}
