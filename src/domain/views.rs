use super::filter::SortKey;
use super::task::Task;
use chrono::{DateTime, Duration, Local};
use std::cmp::Ordering;

/// Urgency assigned to incomplete tasks without a deadline: after every
/// dated task, before completed ones (which score +inf).
pub const NO_DEADLINE_URGENCY: f64 = f64::MAX;

/// Incomplete tasks due within this many hours are "due soon"
pub const DUE_SOON_HOURS: f64 = 12.0;

/// Incomplete tasks due within this many hours get a live countdown
pub const COUNTDOWN_WINDOW_HOURS: f64 = 2.0;

/// Deadline classification used for styling a row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeadlineStatus {
    Completed,
    NoDeadline,
    Overdue,
    DueSoon,
    Normal,
}

impl DeadlineStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::NoDeadline => "no-deadline",
            Self::Overdue => "overdue",
            Self::DueSoon => "due-soon",
            Self::Normal => "normal",
        }
    }
}

/// Countdown lifecycle of a rendered row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowPhase {
    Idle,
    Countdown,
    Expired,
}

/// A task plus everything derived from it for display
#[derive(Debug, Clone)]
pub struct TaskRow {
    pub task: Task,
    pub status: DeadlineStatus,
    pub deadline_label: String,
    pub phase: RowPhase,
}

impl TaskRow {
    pub fn new(task: Task, now: DateTime<Local>) -> Self {
        let mut row = Self {
            status: DeadlineStatus::Normal,
            deadline_label: String::new(),
            phase: RowPhase::Idle,
            task,
        };
        row.refresh(now);
        row
    }

    /// Recompute status and label. A row enters the countdown phase when
    /// its deadline is inside the countdown window.
    pub fn refresh(&mut self, now: DateTime<Local>) {
        self.status = deadline_status(self.task.deadline, self.task.completed, now);
        if needs_countdown(&self.task, now) {
            self.phase = RowPhase::Countdown;
            if let Some(deadline) = self.task.deadline {
                self.deadline_label = countdown_label(deadline, now).0;
            }
        } else {
            if self.phase == RowPhase::Countdown {
                self.phase = RowPhase::Idle;
            }
            self.deadline_label = static_deadline_label(&self.task, now);
        }
    }

    /// Countdown update. Returns false once the deadline has passed; the
    /// row is then marked expired.
    pub fn update_countdown(&mut self, now: DateTime<Local>) -> bool {
        let Some(deadline) = self.task.deadline else {
            return false;
        };
        let (label, running) = countdown_label(deadline, now);
        self.deadline_label = label;
        self.status = deadline_status(Some(deadline), self.task.completed, now);
        if !running {
            self.phase = RowPhase::Expired;
        }
        running
    }
}

fn hours_until(deadline: DateTime<Local>, now: DateTime<Local>) -> f64 {
    (deadline - now).num_milliseconds() as f64 / 3_600_000.0
}

/// Lower is more urgent
pub fn urgency_score(task: &Task, now: DateTime<Local>) -> f64 {
    if task.completed {
        return f64::INFINITY;
    }
    match task.deadline {
        None => NO_DEADLINE_URGENCY,
        Some(deadline) => hours_until(deadline, now),
    }
}

pub fn deadline_status(
    deadline: Option<DateTime<Local>>,
    completed: bool,
    now: DateTime<Local>,
) -> DeadlineStatus {
    if completed {
        return DeadlineStatus::Completed;
    }
    let Some(deadline) = deadline else {
        return DeadlineStatus::NoDeadline;
    };

    let hours_left = hours_until(deadline, now);
    if hours_left < 0.0 {
        DeadlineStatus::Overdue
    } else if hours_left <= DUE_SOON_HOURS {
        DeadlineStatus::DueSoon
    } else {
        DeadlineStatus::Normal
    }
}

/// Whether a task gets a live countdown right now
pub fn needs_countdown(task: &Task, now: DateTime<Local>) -> bool {
    if task.completed {
        return false;
    }
    match task.deadline {
        Some(deadline) => {
            let hours_left = hours_until(deadline, now);
            hours_left > 0.0 && hours_left <= COUNTDOWN_WINDOW_HOURS
        }
        None => false,
    }
}

/// Stable sort by the given key
pub fn sort_tasks(tasks: &mut [Task], key: SortKey, now: DateTime<Local>) {
    match key {
        SortKey::Urgency => {
            tasks.sort_by(|a, b| urgency_score(a, now).total_cmp(&urgency_score(b, now)));
        }
        SortKey::Deadline => {
            tasks.sort_by(|a, b| match (a.deadline, b.deadline) {
                (Some(x), Some(y)) => x.cmp(&y),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            });
        }
        SortKey::CreatedAt => {
            let created = |task: &Task| task.created_at.map(|dt| dt.timestamp_millis()).unwrap_or(0);
            tasks.sort_by(|a, b| created(b).cmp(&created(a)));
        }
    }
}

/// Sort a copy of the tasks and derive their rows
pub fn build_rows(tasks: &[Task], key: SortKey, now: DateTime<Local>) -> Vec<TaskRow> {
    let mut sorted = tasks.to_vec();
    sort_tasks(&mut sorted, key, now);
    sorted.into_iter().map(|task| TaskRow::new(task, now)).collect()
}

/// Format a time difference like "1d 3h", "2h 15m", "4m 10s"
pub fn format_time_diff(diff: Duration) -> String {
    let total_seconds = diff.num_seconds().abs();
    let days = total_seconds / 86_400;
    let hours = (total_seconds % 86_400) / 3_600;
    let minutes = (total_seconds % 3_600) / 60;
    let seconds = total_seconds % 60;

    let mut parts = Vec::new();
    if days > 0 {
        parts.push(format!("{}d", days));
    }
    if hours > 0 {
        parts.push(format!("{}h", hours));
    }
    // Minutes only under a day, seconds only under an hour
    if minutes > 0 && days == 0 {
        parts.push(format!("{}m", minutes));
    }
    if seconds > 0 && days == 0 && hours == 0 {
        parts.push(format!("{}s", seconds));
    }

    if parts.is_empty() {
        "0s".to_string()
    } else {
        parts.join(" ")
    }
}

/// Format a timestamp as YYYY-MM-DD HH:MM
pub fn format_timestamp(dt: &DateTime<Local>) -> String {
    dt.format("%Y-%m-%d %H:%M").to_string()
}

/// Countdown label and whether the countdown should keep running
pub fn countdown_label(deadline: DateTime<Local>, now: DateTime<Local>) -> (String, bool) {
    let diff = deadline - now;
    let base = format!("due {}", format_timestamp(&deadline));
    if diff > Duration::zero() {
        (format!("{} ({} left)", base, format_time_diff(diff)), true)
    } else {
        (format!("{} (overdue by {})", base, format_time_diff(diff)), false)
    }
}

/// Label for rows without a running countdown
pub fn static_deadline_label(task: &Task, now: DateTime<Local>) -> String {
    let Some(deadline) = task.deadline else {
        return "no deadline".to_string();
    };

    let mut label = format!("due {}", format_timestamp(&deadline));
    if !task.completed && deadline < now {
        label.push_str(&format!(" (overdue by {})", format_time_diff(now - deadline)));
    }
    label
}
