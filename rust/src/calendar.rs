//! Working-day calendars for real and phantom workers.
//!
//! A date is a working day for a worker when its weekday is one of the
//! worker's workdays, it is not a global holiday, and it is not one of the
//! worker's personal holidays.

use chrono::{Datelike, NaiveDate, Weekday};
use rustc_hash::FxHashSet;

use crate::error::ScheduleError;
use crate::interner::{IdInterner, Idx};

/// Number of whole working days a (possibly fractional) duration occupies.
///
/// Fractions round up and every task occupies at least one day. Used for both
/// point estimates and sampled durations.
pub fn whole_days(duration_days: f64) -> u32 {
    duration_days.ceil().max(1.0) as u32
}

/// Parse a weekday label such as `"Mon"`, `"monday"` or `"MON"`.
///
/// Only the first three letters are significant.
pub fn parse_weekday(worker: &str, label: &str) -> Result<Weekday, ScheduleError> {
    let normalized: String = label.trim().to_lowercase().chars().take(3).collect();
    let weekday = match normalized.as_str() {
        "mon" => Weekday::Mon,
        "tue" => Weekday::Tue,
        "wed" => Weekday::Wed,
        "thu" => Weekday::Thu,
        "fri" => Weekday::Fri,
        "sat" => Weekday::Sat,
        "sun" => Weekday::Sun,
        _ => {
            return Err(ScheduleError::InvalidWorkday {
                worker: worker.to_string(),
                value: label.to_string(),
            })
        }
    };
    Ok(weekday)
}

/// Set of weekdays packed into a bitmask (bit 0 = Monday).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct WeekdayMask(u8);

impl WeekdayMask {
    pub fn from_labels<S: AsRef<str>>(worker: &str, labels: &[S]) -> Result<Self, ScheduleError> {
        let mut mask = Self::default();
        for label in labels {
            mask.insert(parse_weekday(worker, label.as_ref())?);
        }
        if mask.is_empty() {
            return Err(ScheduleError::InvalidWorkday {
                worker: worker.to_string(),
                value: String::new(),
            });
        }
        Ok(mask)
    }

    pub fn insert(&mut self, weekday: Weekday) {
        self.0 |= 1 << weekday.num_days_from_monday();
    }

    #[inline]
    pub fn contains(&self, weekday: Weekday) -> bool {
        self.0 & (1 << weekday.num_days_from_monday()) != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }
}

/// Dates that are non-working for every worker.
///
/// This is where external holiday sources plug in: they only need to resolve
/// to a set of dates.
#[derive(Clone, Debug, Default)]
pub struct HolidayCalendar {
    dates: FxHashSet<NaiveDate>,
}

impl HolidayCalendar {
    pub fn from_dates(dates: impl IntoIterator<Item = NaiveDate>) -> Self {
        Self {
            dates: dates.into_iter().collect(),
        }
    }

    #[inline]
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.dates.contains(&date)
    }
}

/// Weekly availability and personal days off for a single worker.
#[derive(Clone, Debug)]
pub struct WorkerCalendar {
    pub id: String,
    pub workdays: WeekdayMask,
    pub personal_holidays: FxHashSet<NaiveDate>,
}

impl WorkerCalendar {
    pub fn new<S: AsRef<str>>(
        id: impl Into<String>,
        workdays: &[S],
        personal_holidays: impl IntoIterator<Item = NaiveDate>,
    ) -> Result<Self, ScheduleError> {
        let id = id.into();
        let workdays = WeekdayMask::from_labels(&id, workdays)?;
        Ok(Self {
            id,
            workdays,
            personal_holidays: personal_holidays.into_iter().collect(),
        })
    }
}

/// Global holidays combined with every known worker's calendar.
///
/// Immutable once built: all queries take `&self` and never touch caller state.
#[derive(Clone, Debug, Default)]
pub struct Calendar {
    holidays: HolidayCalendar,
    workers: Vec<WorkerCalendar>,
    ids: IdInterner,
}

impl Calendar {
    pub fn new(holidays: HolidayCalendar) -> Self {
        Self {
            holidays,
            workers: Vec::new(),
            ids: IdInterner::default(),
        }
    }

    /// Register a worker and return its index.
    ///
    /// Registering an id twice replaces the earlier calendar.
    pub fn add_worker(&mut self, worker: WorkerCalendar) -> Idx {
        let idx = self.ids.intern(&worker.id);
        if (idx as usize) < self.workers.len() {
            self.workers[idx as usize] = worker;
        } else {
            self.workers.push(worker);
        }
        idx
    }

    pub fn worker_index(&self, id: &str) -> Option<Idx> {
        self.ids.get(id)
    }

    pub fn worker_id(&self, worker: Idx) -> &str {
        self.ids.resolve(worker)
    }

    pub fn worker_count(&self) -> usize {
        self.ids.len()
    }

    /// Whether `date` is a working day for `worker`.
    pub fn is_working_day(&self, worker: Idx, date: NaiveDate) -> bool {
        let calendar = &self.workers[worker as usize];
        calendar.workdays.contains(date.weekday())
            && !self.holidays.contains(date)
            && !calendar.personal_holidays.contains(&date)
    }

    /// First working day on or after `date`.
    pub fn next_working_day(&self, worker: Idx, date: NaiveDate) -> Result<NaiveDate, ScheduleError> {
        let mut current = date;
        while !self.is_working_day(worker, current) {
            current = current.succ_opt().ok_or(ScheduleError::DateOutOfRange)?;
        }
        Ok(current)
    }

    /// Consume `duration_days` working days starting at `start` and return
    /// the last day consumed.
    ///
    /// `start` counts as the first day if it is a working day. Fractional
    /// durations round up to whole days.
    pub fn advance(
        &self,
        worker: Idx,
        start: NaiveDate,
        duration_days: f64,
    ) -> Result<NaiveDate, ScheduleError> {
        self.advance_days(worker, start, whole_days(duration_days))
    }

    /// Whole-day form of [`Calendar::advance`]. Zero is treated as one day.
    pub fn advance_days(
        &self,
        worker: Idx,
        start: NaiveDate,
        days: u32,
    ) -> Result<NaiveDate, ScheduleError> {
        let mut current = self.next_working_day(worker, start)?;
        for _ in 1..days.max(1) {
            let next = current.succ_opt().ok_or(ScheduleError::DateOutOfRange)?;
            current = self.next_working_day(worker, next)?;
        }
        Ok(current)
    }

    /// Number of working days in the inclusive range `from..=to`.
    pub fn working_days_between(&self, worker: Idx, from: NaiveDate, to: NaiveDate) -> u32 {
        from.iter_days()
            .take_while(|date| *date <= to)
            .filter(|date| self.is_working_day(worker, *date))
            .count() as u32
    }
}
