//! Error types shared by every stage of the scheduling engine.

use thiserror::Error;

/// Errors that can occur while validating input, placing tasks or simulating.
///
/// Every variant is fatal to the operation that produced it.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScheduleError {
    #[error("Task {task_id} references unknown milestone {milestone_id}")]
    UnknownMilestone {
        task_id: String,
        milestone_id: String,
    },
    #[error("Task {task_id} depends on unknown task {predecessor_id}")]
    UnknownPredecessor {
        task_id: String,
        predecessor_id: String,
    },
    #[error("Circular dependency detected: {}", cycle.join(" -> "))]
    CyclicDependency { cycle: Vec<String> },
    #[error("Task {task_id} has an invalid estimate: {reason}")]
    InvalidEstimate { task_id: String, reason: String },
    #[error("Failed to place tasks: {task_ids:?}")]
    UnresolvablePlacement { task_ids: Vec<String> },
    #[error("Task {task_id} has no assignee and no phantom workers are configured")]
    NoAssignee { task_id: String },
    #[error("Duplicate task id: {task_id}")]
    DuplicateTask { task_id: String },
    #[error("Duplicate milestone id: {milestone_id}")]
    DuplicateMilestone { milestone_id: String },
    #[error("Milestone {milestone_id} ends before it starts")]
    InvalidMilestone { milestone_id: String },
    #[error("Milestone id {milestone_id} is reserved for project completion keys")]
    ReservedMilestoneId { milestone_id: String },
    #[error("Phantom worker {worker_id} collides with a real assignee")]
    DuplicateWorker { worker_id: String },
    #[error("Invalid workday for {worker}: {value:?}")]
    InvalidWorkday { worker: String, value: String },
    #[error("No tasks to schedule")]
    EmptyTaskList,
    #[error("Date arithmetic out of range")]
    DateOutOfRange,
    #[error("Percentile must be within 0..=100, got {0}")]
    InvalidPercentile(f64),
    #[error("Simulation cancelled")]
    Cancelled,
}
