use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Date format used both for input and for the store.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// How many days ahead of today a task still counts as due soon.
pub const DUE_SOON_DAYS: i64 = 3;

/// Identifier of a task for the lifetime of a session. It is assigned on
/// load and on creation, and is never written to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(pub u64);

/// A single to-do entry, saved as one record of the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub description: String,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub status: Status,
    #[serde(default)]
    pub priority: Priority,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    #[default]
    Pending,
    Completed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

/// Derived note attached to a task when it is displayed. Never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DueNote {
    Overdue,
    DueSoon,
}

/// The filters offered by the view operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Filter {
    All,
    Completed,
    Pending,
    DueSoon,
}

impl Task {
    /// A new task always starts pending.
    pub fn new(description: String, due_date: Option<NaiveDate>, priority: Priority) -> Self {
        Task {
            description,
            due_date,
            status: Status::Pending,
            priority,
        }
    }

    /// Return the due note of the task relative to `today`, if any.
    pub fn due_note(&self, today: NaiveDate) -> Option<DueNote> {
        let due = self.due_date?;
        if due < today {
            Some(DueNote::Overdue)
        } else if due <= due_soon_limit(today) {
            Some(DueNote::DueSoon)
        } else {
            None
        }
    }

    /// Whether the task is kept by `filter` on the given day. The due soon
    /// filter has no lower bound: overdue tasks with a date are included.
    pub fn matches(&self, filter: Filter, today: NaiveDate) -> bool {
        match filter {
            Filter::All => true,
            Filter::Completed => self.status == Status::Completed,
            Filter::Pending => self.status == Status::Pending,
            Filter::DueSoon => self
                .due_date
                .map_or(false, |due| due <= due_soon_limit(today)),
        }
    }
}

/// Last day that still counts as due soon.
fn due_soon_limit(today: NaiveDate) -> NaiveDate {
    today + Duration::days(DUE_SOON_DAYS)
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Pending => write!(f, "pending"),
            Status::Completed => write!(f, "completed"),
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Priority::Low => write!(f, "low"),
            Priority::Medium => write!(f, "medium"),
            Priority::High => write!(f, "high"),
        }
    }
}

impl fmt::Display for DueNote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DueNote::Overdue => write!(f, "overdue"),
            DueNote::DueSoon => write!(f, "due soon"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, DATE_FORMAT).unwrap()
    }

    fn due(date: Option<&str>) -> Task {
        Task::new("task".to_string(), date.map(day), Priority::Medium)
    }

    #[test]
    fn new_task_is_pending() {
        let task = Task::new("Buy milk".to_string(), None, Priority::High);
        assert_eq!(task.status, Status::Pending);
        assert_eq!(task.priority, Priority::High);
    }

    #[rstest]
    #[case("2024-06-08", Some(DueNote::Overdue))]
    #[case("2024-06-09", Some(DueNote::Overdue))]
    #[case("2024-06-10", Some(DueNote::DueSoon))]
    #[case("2024-06-13", Some(DueNote::DueSoon))]
    #[case("2024-06-14", None)]
    fn due_note_is_relative_to_today(#[case] date: &str, #[case] expected: Option<DueNote>) {
        assert_eq!(due(Some(date)).due_note(day("2024-06-10")), expected);
    }

    #[test]
    fn undated_task_has_no_note() {
        assert_eq!(due(None).due_note(day("2024-06-10")), None);
    }

    #[rstest]
    #[case(Some("2024-06-01"), true)]
    #[case(Some("2024-06-13"), true)]
    #[case(Some("2024-06-14"), false)]
    #[case(None, false)]
    fn due_soon_filter_has_no_lower_bound(#[case] date: Option<&str>, #[case] expected: bool) {
        assert_eq!(
            due(date).matches(Filter::DueSoon, day("2024-06-10")),
            expected
        );
    }

    #[test]
    fn status_filters() {
        let today = day("2024-06-10");
        let mut task = due(None);
        assert!(task.matches(Filter::Pending, today));
        assert!(!task.matches(Filter::Completed, today));
        task.status = Status::Completed;
        assert!(task.matches(Filter::Completed, today));
        assert!(!task.matches(Filter::Pending, today));
        assert!(task.matches(Filter::All, today));
    }
}
