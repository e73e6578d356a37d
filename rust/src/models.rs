//! Core data types for the scheduling engine.

use chrono::NaiveDate;
use pyo3::prelude::*;
use rustc_hash::FxHashMap;
use std::collections::{BTreeMap, HashMap};

// Note: We use std HashMap here for PyO3 interface compatibility

/// Completion key for the synthetic milestone covering every task.
pub const WHOLE_PROJECT_KEY: &str = "__project__";

/// Completion key for the synthetic milestone covering one project's tasks.
pub fn project_key(project_id: &str) -> String {
    format!("{}:{}", WHOLE_PROJECT_KEY, project_id)
}

/// True if `id` would collide with a synthetic project completion key.
pub fn is_reserved_key(id: &str) -> bool {
    id == WHOLE_PROJECT_KEY
        || id
            .strip_prefix(WHOLE_PROJECT_KEY)
            .is_some_and(|rest| rest.starts_with(':'))
}

/// Three-point duration estimate in working days.
#[pyclass]
#[derive(Clone, Debug, PartialEq)]
pub struct Estimate {
    #[pyo3(get, set)]
    pub min_days: f64,
    #[pyo3(get, set)]
    pub likely_days: f64,
    #[pyo3(get, set)]
    pub max_days: f64,
}

impl Estimate {
    pub fn new(min_days: f64, likely_days: f64, max_days: f64) -> Self {
        Self {
            min_days,
            likely_days,
            max_days,
        }
    }

    /// Estimate where all three points are the same value.
    pub fn fixed(days: f64) -> Self {
        Self::new(days, days, days)
    }

    /// Check `0 < min <= likely <= max`, all finite.
    ///
    /// Returns the reason for the first violated condition.
    pub fn validate(&self) -> Result<(), String> {
        let values = [self.min_days, self.likely_days, self.max_days];
        if values.iter().any(|v| !v.is_finite()) {
            return Err(format!("non-finite value in {:?}", values));
        }
        if self.min_days <= 0.0 {
            return Err(format!("min_days must be positive, got {}", self.min_days));
        }
        if self.min_days > self.likely_days || self.likely_days > self.max_days {
            return Err(format!(
                "expected min <= likely <= max, got ({}, {}, {})",
                self.min_days, self.likely_days, self.max_days
            ));
        }
        Ok(())
    }

    pub fn is_degenerate(&self) -> bool {
        self.min_days == self.max_days
    }
}

#[pymethods]
impl Estimate {
    #[new]
    fn py_new(min_days: f64, likely_days: f64, max_days: f64) -> Self {
        Self::new(min_days, likely_days, max_days)
    }

    fn __repr__(&self) -> String {
        format!(
            "Estimate(min={}, likely={}, max={})",
            self.min_days, self.likely_days, self.max_days
        )
    }
}

/// A unit of work to be placed on a worker's calendar.
///
/// Lower `priority` values are placed first; equal values keep input order.
#[pyclass]
#[derive(Clone, Debug)]
pub struct Task {
    #[pyo3(get, set)]
    pub id: String,
    #[pyo3(get, set)]
    pub label: String,
    #[pyo3(get, set)]
    pub project_id: String,
    #[pyo3(get, set)]
    pub milestone_id: Option<String>,
    #[pyo3(get, set)]
    pub assignee: Option<String>,
    #[pyo3(get, set)]
    pub estimate: Estimate,
    #[pyo3(get, set)]
    pub priority: i64,
    #[pyo3(get, set)]
    pub depends_on: Vec<String>,
}

impl Task {
    /// Create an unassigned task with no milestone, project or predecessors.
    pub fn new(id: impl Into<String>, priority: i64, estimate: Estimate) -> Self {
        let id = id.into();
        Self {
            label: id.clone(),
            id,
            project_id: String::new(),
            milestone_id: None,
            assignee: None,
            estimate,
            priority,
            depends_on: Vec::new(),
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn with_project(mut self, project_id: impl Into<String>) -> Self {
        self.project_id = project_id.into();
        self
    }

    pub fn with_milestone(mut self, milestone_id: impl Into<String>) -> Self {
        self.milestone_id = Some(milestone_id.into());
        self
    }

    pub fn with_assignee(mut self, assignee: impl Into<String>) -> Self {
        self.assignee = Some(assignee.into());
        self
    }

    pub fn with_depends_on<S: Into<String>>(mut self, ids: impl IntoIterator<Item = S>) -> Self {
        self.depends_on = ids.into_iter().map(Into::into).collect();
        self
    }
}

#[pymethods]
impl Task {
    #[new]
    #[pyo3(signature = (
        id,
        priority,
        estimate,
        project_id=String::new(),
        assignee=None,
        milestone_id=None,
        depends_on=Vec::new(),
        label=None
    ))]
    #[allow(clippy::too_many_arguments)]
    fn py_new(
        id: String,
        priority: i64,
        estimate: Estimate,
        project_id: String,
        assignee: Option<String>,
        milestone_id: Option<String>,
        depends_on: Vec<String>,
        label: Option<String>,
    ) -> Self {
        Self {
            label: label.unwrap_or_else(|| id.clone()),
            id,
            project_id,
            milestone_id,
            assignee,
            estimate,
            priority,
            depends_on,
        }
    }

    fn __repr__(&self) -> String {
        format!(
            "Task(id={:?}, priority={}, project_id={:?}, milestone_id={:?}, assignee={:?}, deps={})",
            self.id,
            self.priority,
            self.project_id,
            self.milestone_id,
            self.assignee,
            self.depends_on.len()
        )
    }
}

/// A gate on when linked tasks may start, with a target for lateness.
#[pyclass]
#[derive(Clone, Debug, PartialEq)]
pub struct Milestone {
    #[pyo3(get, set)]
    pub id: String,
    #[pyo3(get, set)]
    pub project_id: String,
    #[pyo3(get, set)]
    pub start_date: NaiveDate,
    #[pyo3(get, set)]
    pub target_end_date: NaiveDate,
}

impl Milestone {
    pub fn new(id: impl Into<String>, start_date: NaiveDate, target_end_date: NaiveDate) -> Self {
        Self {
            id: id.into(),
            project_id: String::new(),
            start_date,
            target_end_date,
        }
    }

    pub fn with_project(mut self, project_id: impl Into<String>) -> Self {
        self.project_id = project_id.into();
        self
    }
}

#[pymethods]
impl Milestone {
    #[new]
    #[pyo3(signature = (id, start_date, target_end_date, project_id=String::new()))]
    fn py_new(
        id: String,
        start_date: NaiveDate,
        target_end_date: NaiveDate,
        project_id: String,
    ) -> Self {
        Self {
            id,
            project_id,
            start_date,
            target_end_date,
        }
    }

    fn __repr__(&self) -> String {
        format!(
            "Milestone(id={:?}, start={}, target_end={})",
            self.id, self.start_date, self.target_end_date
        )
    }
}

/// A real worker and their availability.
///
/// An empty `workdays` list means the configured default workdays.
#[pyclass]
#[derive(Clone, Debug, Default)]
pub struct Assignee {
    #[pyo3(get, set)]
    pub id: String,
    #[pyo3(get, set)]
    pub workdays: Vec<String>,
    #[pyo3(get, set)]
    pub personal_holidays: Vec<NaiveDate>,
}

impl Assignee {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    pub fn with_workdays<S: Into<String>>(mut self, days: impl IntoIterator<Item = S>) -> Self {
        self.workdays = days.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_personal_holidays(mut self, dates: impl IntoIterator<Item = NaiveDate>) -> Self {
        self.personal_holidays = dates.into_iter().collect();
        self
    }
}

#[pymethods]
impl Assignee {
    #[new]
    #[pyo3(signature = (id, workdays=Vec::new(), personal_holidays=Vec::new()))]
    fn py_new(id: String, workdays: Vec<String>, personal_holidays: Vec<NaiveDate>) -> Self {
        Self {
            id,
            workdays,
            personal_holidays,
        }
    }

    fn __repr__(&self) -> String {
        format!(
            "Assignee(id={:?}, workdays={:?}, personal_holidays={})",
            self.id,
            self.workdays,
            self.personal_holidays.len()
        )
    }
}

/// A task that has been placed.
#[pyclass]
#[derive(Clone, Debug, PartialEq)]
pub struct ScheduledTask {
    #[pyo3(get)]
    pub task_id: String,
    #[pyo3(get)]
    pub project_id: String,
    #[pyo3(get)]
    pub milestone_id: Option<String>,
    /// Worker that received the task (real or phantom)
    #[pyo3(get)]
    pub assignee: String,
    #[pyo3(get)]
    pub phantom: bool,
    #[pyo3(get)]
    pub start_date: NaiveDate,
    #[pyo3(get)]
    pub end_date: NaiveDate,
    /// Whole working days consumed
    #[pyo3(get)]
    pub duration_days: u32,
    /// End date falls after the linked milestone's target end date
    #[pyo3(get)]
    pub late: bool,
}

#[pymethods]
impl ScheduledTask {
    fn __repr__(&self) -> String {
        format!(
            "ScheduledTask(task_id={:?}, assignee={:?}, start={}, end={}, late={})",
            self.task_id, self.assignee, self.start_date, self.end_date, self.late
        )
    }
}

/// Fold end dates into per-milestone, per-project and whole-project completions.
///
/// Tasks without a project id only count towards the whole-project key.
///
/// Shared by deterministic results and simulation trials so both report the
/// same keys.
pub fn completion_dates<'a>(
    entries: impl IntoIterator<Item = (&'a str, Option<&'a str>, NaiveDate)>,
) -> FxHashMap<String, NaiveDate> {
    let mut completions: FxHashMap<String, NaiveDate> = FxHashMap::default();
    let mut bump = |key: String, end: NaiveDate| {
        completions
            .entry(key)
            .and_modify(|d| *d = (*d).max(end))
            .or_insert(end);
    };
    for (project_id, milestone_id, end) in entries {
        if let Some(milestone_id) = milestone_id {
            bump(milestone_id.to_string(), end);
        }
        if !project_id.is_empty() {
            bump(project_key(project_id), end);
        }
        bump(WHOLE_PROJECT_KEY.to_string(), end);
    }
    completions
}

/// Result of one deterministic placement run.
#[pyclass]
#[derive(Clone, Debug, Default)]
pub struct ScheduleResult {
    /// Tasks in placement order
    #[pyo3(get)]
    pub scheduled_tasks: Vec<ScheduledTask>,
    /// Worker id -> task ids in placement order
    #[pyo3(get)]
    pub by_assignee: HashMap<String, Vec<String>>,
}

impl ScheduleResult {
    pub fn get(&self, task_id: &str) -> Option<&ScheduledTask> {
        self.scheduled_tasks.iter().find(|t| t.task_id == task_id)
    }

    /// Scheduled tasks sorted by end date, optionally for a single worker.
    pub fn sorted_tasks(&self, assignee: Option<&str>) -> Vec<&ScheduledTask> {
        let mut tasks: Vec<&ScheduledTask> = self
            .scheduled_tasks
            .iter()
            .filter(|t| assignee.map_or(true, |a| t.assignee == a))
            .collect();
        tasks.sort_by(|a, b| {
            a.end_date
                .cmp(&b.end_date)
                .then(a.start_date.cmp(&b.start_date))
                .then(a.task_id.cmp(&b.task_id))
        });
        tasks
    }

    /// Latest-ending task, overall or for a single worker.
    pub fn final_task(&self, assignee: Option<&str>) -> Option<&ScheduledTask> {
        self.sorted_tasks(assignee).pop()
    }

    pub fn final_date(&self, assignee: Option<&str>) -> Option<NaiveDate> {
        self.final_task(assignee).map(|t| t.end_date)
    }

    /// Tasks grouped by milestone id. Tasks without a milestone are left out.
    pub fn milestone_tasks(&self) -> BTreeMap<&str, Vec<&ScheduledTask>> {
        let mut groups: BTreeMap<&str, Vec<&ScheduledTask>> = BTreeMap::new();
        for task in &self.scheduled_tasks {
            if let Some(milestone_id) = task.milestone_id.as_deref() {
                groups.entry(milestone_id).or_default().push(task);
            }
        }
        groups
    }

    pub fn milestone_completion_dates(&self) -> HashMap<String, NaiveDate> {
        completion_dates(self.scheduled_tasks.iter().map(|t| {
            (
                t.project_id.as_str(),
                t.milestone_id.as_deref(),
                t.end_date,
            )
        }))
        .into_iter()
        .collect()
    }

    pub fn late_tasks(&self) -> Vec<&ScheduledTask> {
        self.scheduled_tasks.iter().filter(|t| t.late).collect()
    }
}

#[pymethods]
impl ScheduleResult {
    /// Worker ids that received at least one task, sorted.
    pub fn assignees(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.by_assignee.keys().cloned().collect();
        ids.sort();
        ids
    }

    #[pyo3(name = "tasks", signature = (assignee=None))]
    fn py_tasks(&self, assignee: Option<String>) -> Vec<ScheduledTask> {
        self.sorted_tasks(assignee.as_deref())
            .into_iter()
            .cloned()
            .collect()
    }

    #[pyo3(name = "final_date", signature = (assignee=None))]
    fn py_final_date(&self, assignee: Option<String>) -> Option<NaiveDate> {
        self.final_date(assignee.as_deref())
    }

    #[pyo3(name = "final_task", signature = (assignee=None))]
    fn py_final_task(&self, assignee: Option<String>) -> Option<ScheduledTask> {
        self.final_task(assignee.as_deref()).cloned()
    }

    #[pyo3(name = "milestone_tasks")]
    fn py_milestone_tasks(&self) -> BTreeMap<String, Vec<ScheduledTask>> {
        self.milestone_tasks()
            .into_iter()
            .map(|(id, tasks)| (id.to_string(), tasks.into_iter().cloned().collect()))
            .collect()
    }

    #[pyo3(name = "milestone_completion_dates")]
    fn py_milestone_completion_dates(&self) -> HashMap<String, NaiveDate> {
        self.milestone_completion_dates()
    }

    #[pyo3(name = "late_tasks")]
    fn py_late_tasks(&self) -> Vec<ScheduledTask> {
        self.late_tasks().into_iter().cloned().collect()
    }

    fn __repr__(&self) -> String {
        format!(
            "ScheduleResult(scheduled_tasks={}, assignees={})",
            self.scheduled_tasks.len(),
            self.by_assignee.len()
        )
    }
}

/// Completion dates for a single simulation trial.
#[derive(Clone, Debug, PartialEq)]
pub struct TrialResult {
    pub trial_index: usize,
    pub completions: FxHashMap<String, NaiveDate>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn placed(id: &str, assignee: &str, milestone: Option<&str>, start: NaiveDate, end: NaiveDate) -> ScheduledTask {
        ScheduledTask {
            task_id: id.to_string(),
            project_id: "p".to_string(),
            milestone_id: milestone.map(str::to_string),
            assignee: assignee.to_string(),
            phantom: false,
            start_date: start,
            end_date: end,
            duration_days: 1,
            late: false,
        }
    }

    fn sample_result() -> ScheduleResult {
        let tasks = vec![
            placed("t1", "alice", Some("m1"), d(2025, 1, 6), d(2025, 1, 8)),
            placed("t2", "bob", Some("m1"), d(2025, 1, 6), d(2025, 1, 7)),
            placed("t3", "alice", Some("m2"), d(2025, 1, 9), d(2025, 1, 13)),
            placed("t4", "bob", None, d(2025, 1, 8), d(2025, 1, 8)),
        ];
        let mut by_assignee = HashMap::new();
        by_assignee.insert("alice".to_string(), vec!["t1".to_string(), "t3".to_string()]);
        by_assignee.insert("bob".to_string(), vec!["t2".to_string(), "t4".to_string()]);
        ScheduleResult {
            scheduled_tasks: tasks,
            by_assignee,
        }
    }

    #[test]
    fn test_estimate_validation() {
        assert!(Estimate::new(2.0, 3.0, 5.0).validate().is_ok());
        assert!(Estimate::fixed(3.0).validate().is_ok());
        assert!(Estimate::new(0.0, 3.0, 5.0).validate().is_err());
        assert!(Estimate::new(-1.0, 3.0, 5.0).validate().is_err());
        assert!(Estimate::new(4.0, 3.0, 5.0).validate().is_err());
        assert!(Estimate::new(2.0, 6.0, 5.0).validate().is_err());
        assert!(Estimate::new(2.0, f64::NAN, 5.0).validate().is_err());
    }

    #[test]
    fn test_estimate_degenerate() {
        assert!(Estimate::fixed(3.0).is_degenerate());
        assert!(!Estimate::new(2.0, 3.0, 5.0).is_degenerate());
    }

    #[test]
    fn test_reserved_keys() {
        assert!(is_reserved_key(WHOLE_PROJECT_KEY));
        assert!(is_reserved_key(&project_key("p")));
        assert!(is_reserved_key(&project_key("")));
        assert!(!is_reserved_key("__project__x"));
        assert!(!is_reserved_key("m1"));
    }

    #[test]
    fn test_no_project_key_without_project_id() {
        let completions = completion_dates([
            ("", Some("m"), d(2025, 1, 6)),
            ("", None, d(2025, 1, 13)),
        ]);
        assert_eq!(completions.len(), 2);
        assert_eq!(completions["m"], d(2025, 1, 6));
        assert_eq!(completions[WHOLE_PROJECT_KEY], d(2025, 1, 13));
        assert!(!completions.contains_key(&project_key("")));
    }

    #[test]
    fn test_task_builder() {
        let task = Task::new("t1", 3, Estimate::fixed(2.0))
            .with_project("p")
            .with_milestone("m")
            .with_assignee("alice")
            .with_depends_on(["t0"]);
        assert_eq!(task.label, "t1");
        assert_eq!(task.milestone_id.as_deref(), Some("m"));
        assert_eq!(task.assignee.as_deref(), Some("alice"));
        assert_eq!(task.depends_on, vec!["t0".to_string()]);
    }

    #[test]
    fn test_sorted_tasks_by_end_date() {
        let result = sample_result();
        let ids: Vec<&str> = result
            .sorted_tasks(None)
            .iter()
            .map(|t| t.task_id.as_str())
            .collect();
        assert_eq!(ids, vec!["t2", "t1", "t4", "t3"]);

        let bob: Vec<&str> = result
            .sorted_tasks(Some("bob"))
            .iter()
            .map(|t| t.task_id.as_str())
            .collect();
        assert_eq!(bob, vec!["t2", "t4"]);
    }

    #[test]
    fn test_final_date() {
        let result = sample_result();
        assert_eq!(result.final_date(None), Some(d(2025, 1, 13)));
        assert_eq!(result.final_date(Some("bob")), Some(d(2025, 1, 8)));
        assert_eq!(result.final_date(Some("nobody")), None);
        assert_eq!(result.assignees(), vec!["alice".to_string(), "bob".to_string()]);
    }

    #[test]
    fn test_owned_views() {
        let mut result = sample_result();
        result.scheduled_tasks[2].late = true;

        assert_eq!(result.py_final_task(None).map(|t| t.task_id), Some("t3".to_string()));
        assert_eq!(
            result.py_final_task(Some("bob".to_string())).map(|t| t.task_id),
            Some("t4".to_string())
        );
        assert!(result.py_final_task(Some("nobody".to_string())).is_none());

        let groups = result.py_milestone_tasks();
        assert_eq!(groups.keys().collect::<Vec<_>>(), vec!["m1", "m2"]);
        assert_eq!(groups["m2"][0].task_id, "t3");

        let late: Vec<String> = result.py_late_tasks().into_iter().map(|t| t.task_id).collect();
        assert_eq!(late, vec!["t3".to_string()]);
    }

    #[test]
    fn test_milestone_grouping_and_completion() {
        let result = sample_result();
        let groups = result.milestone_tasks();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups["m1"].len(), 2);

        let completions = result.milestone_completion_dates();
        assert_eq!(completions["m1"], d(2025, 1, 8));
        assert_eq!(completions["m2"], d(2025, 1, 13));
        assert_eq!(completions[WHOLE_PROJECT_KEY], d(2025, 1, 13));
        assert_eq!(completions[&project_key("p")], d(2025, 1, 13));
        assert_eq!(completions.len(), 4);
    }
}
