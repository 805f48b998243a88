//! Recurrence rules and occurrence date arithmetic.

use super::TaskDomainError;
use chrono::{DateTime, Datelike, Months, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

/// How often a recurring task repeats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecurrencePattern {
    /// Every `interval` days.
    Daily,
    /// Every `interval` weeks.
    Weekly,
    /// Every `interval` calendar months.
    Monthly,
    /// Every `interval` calendar years.
    Yearly,
    /// On selected weekdays.
    Custom,
}

/// Recurrence configuration carried by a recurring task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecurrenceRule {
    pattern: RecurrencePattern,
    interval: u32,
    end_date: Option<DateTime<Utc>>,
    max_occurrences: Option<u32>,
    current_occurrence: u32,
    days_of_week: Vec<u8>,
}

impl RecurrenceRule {
    /// Creates a rule repeating every `interval` units of `pattern`.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidRecurrenceInterval`] when
    /// `interval` is zero.
    pub fn new(pattern: RecurrencePattern, interval: u32) -> Result<Self, TaskDomainError> {
        if interval == 0 {
            return Err(TaskDomainError::InvalidRecurrenceInterval(interval));
        }
        Ok(Self {
            pattern,
            interval,
            end_date: None,
            max_occurrences: None,
            current_occurrence: 0,
            days_of_week: Vec::new(),
        })
    }

    /// Creates a custom rule firing on the given weekdays (0 = Sunday).
    ///
    /// Duplicates are removed and the days are kept in ascending order.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidWeekday`] for values above 6.
    pub fn on_weekdays(days: impl IntoIterator<Item = u8>) -> Result<Self, TaskDomainError> {
        let mut days_of_week = Vec::new();
        for day in days {
            if day > 6 {
                return Err(TaskDomainError::InvalidWeekday(day));
            }
            days_of_week.push(day);
        }
        days_of_week.sort_unstable();
        days_of_week.dedup();

        let mut rule = Self::new(RecurrencePattern::Custom, 1)?;
        rule.days_of_week = days_of_week;
        Ok(rule)
    }

    /// Stops generating occurrences after the given instant.
    #[must_use]
    pub const fn with_end_date(mut self, end_date: DateTime<Utc>) -> Self {
        self.end_date = Some(end_date);
        self
    }

    /// Caps the number of generated occurrences.
    #[must_use]
    pub const fn with_max_occurrences(mut self, max_occurrences: u32) -> Self {
        self.max_occurrences = Some(max_occurrences);
        self
    }

    /// Sets the occurrence counter, e.g. when restoring an existing series.
    #[must_use]
    pub const fn with_current_occurrence(mut self, current_occurrence: u32) -> Self {
        self.current_occurrence = current_occurrence;
        self
    }

    /// Returns the repeat pattern.
    #[must_use]
    pub const fn pattern(&self) -> RecurrencePattern {
        self.pattern
    }

    /// Returns the repeat interval.
    #[must_use]
    pub const fn interval(&self) -> u32 {
        self.interval
    }

    /// Returns the instant after which no occurrence is generated.
    #[must_use]
    pub const fn end_date(&self) -> Option<DateTime<Utc>> {
        self.end_date
    }

    /// Returns the occurrence cap, if any.
    #[must_use]
    pub const fn max_occurrences(&self) -> Option<u32> {
        self.max_occurrences
    }

    /// Returns how many occurrences precede this one.
    #[must_use]
    pub const fn current_occurrence(&self) -> u32 {
        self.current_occurrence
    }

    /// Returns the weekdays of a custom rule (0 = Sunday).
    #[must_use]
    pub fn days_of_week(&self) -> &[u8] {
        &self.days_of_week
    }

    /// Returns `true` while the series may still produce an occurrence at
    /// `now`.
    #[must_use]
    pub fn permits_next(&self, now: DateTime<Utc>) -> bool {
        let before_end = self.end_date.is_none_or(|end| end >= now);
        let below_cap = self
            .max_occurrences
            .is_none_or(|cap| self.current_occurrence < cap);
        before_end && below_cap
    }

    /// Computes the occurrence following `start` under this rule.
    #[must_use]
    pub fn next_after(&self, start: DateTime<Utc>) -> DateTime<Utc> {
        next_occurrence(start, self.pattern, self.interval, &self.days_of_week)
    }

    /// Returns the rule for the following occurrence.
    #[must_use]
    pub(crate) fn advanced(&self) -> Self {
        Self {
            current_occurrence: self.current_occurrence.saturating_add(1),
            ..self.clone()
        }
    }
}

/// Computes the next occurrence after `start`.
///
/// Monthly and yearly steps clamp the day to the end of a shorter target
/// month. A custom pattern scans the following seven days for the first
/// weekday listed in `days_of_week` and falls back to the next day. A zero
/// `interval` is treated as one.
#[must_use]
pub fn next_occurrence(
    start: DateTime<Utc>,
    pattern: RecurrencePattern,
    interval: u32,
    days_of_week: &[u8],
) -> DateTime<Utc> {
    let step = interval.max(1);
    match pattern {
        RecurrencePattern::Daily => add_days(start, i64::from(step)),
        RecurrencePattern::Weekly => add_days(start, i64::from(step) * 7),
        RecurrencePattern::Monthly => add_months(start, step),
        RecurrencePattern::Yearly => add_months(start, step.saturating_mul(12)),
        RecurrencePattern::Custom => (1..=7)
            .map(|offset| add_days(start, offset))
            .find(|candidate| days_of_week.contains(&weekday_index(*candidate)))
            .unwrap_or_else(|| add_days(start, 1)),
    }
}

fn add_days(start: DateTime<Utc>, days: i64) -> DateTime<Utc> {
    TimeDelta::try_days(days)
        .and_then(|delta| start.checked_add_signed(delta))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

fn add_months(start: DateTime<Utc>, months: u32) -> DateTime<Utc> {
    start
        .checked_add_months(Months::new(months))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

fn weekday_index(date: DateTime<Utc>) -> u8 {
    u8::try_from(date.weekday().num_days_from_sunday()).unwrap_or(u8::MAX)
}
