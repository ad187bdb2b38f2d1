// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
use chrono::{NaiveDateTime, NaiveTime, TimeDelta};
use common::{Priority, Status, Task};
use tracing::debug;

/// A reminder to be spoken right now. Nothing about it is persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReminderEvent {
    pub task_id: i64,
    pub message: String,
}

/// What a task's priority policy decided to announce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Announcement {
    DueSoon,
    DueInDays(i64),
    DueInHours(i64),
}

impl Announcement {
    pub fn message(self, task_id: i64) -> String {
        match self {
            Self::DueSoon => format!("Reminder: Task ID {task_id} is due soon."),
            Self::DueInDays(days) => format!("Reminder: Task ID {task_id} is due in {days} days."),
            Self::DueInHours(hours) => {
                format!("Reminder: Task ID {task_id} is due in {hours} hours.")
            }
        }
    }
}

/// Low priority brackets, widest first.
fn low_thresholds() -> [TimeDelta; 4] {
    [
        TimeDelta::hours(5),
        TimeDelta::hours(1),
        TimeDelta::minutes(30),
        TimeDelta::minutes(5),
    ]
}

/// Scans `tasks` and returns the reminders due at `now`, in input order.
///
/// Only pending tasks are considered. The call is stateless: a task still
/// inside a window on the next call is announced again.
pub fn check(now: NaiveDateTime, tasks: &[Task]) -> Vec<ReminderEvent> {
    tasks
        .iter()
        .filter(|task| task.status == Status::Pending)
        .filter_map(|task| {
            let due = task.due_date.and_time(NaiveTime::MIN);
            let remaining = due - now;
            let announcement = announce(task.priority, remaining)?;
            debug!(
                "Task {} ({}) has {} left: {:?}",
                task.id, task.priority, remaining, announcement
            );
            Some(ReminderEvent {
                task_id: task.id,
                message: announcement.message(task.id),
            })
        })
        .collect()
}

/// Applies the priority's threshold policy to the time left before the due
/// date. `remaining` is negative for overdue tasks and is not clamped.
pub fn announce(priority: Priority, remaining: TimeDelta) -> Option<Announcement> {
    match priority {
        // First bracket that holds fires, the rest are skipped.
        Priority::Low => low_thresholds()
            .into_iter()
            .find(|threshold| remaining <= *threshold)
            .map(|_| Announcement::DueSoon),
        Priority::Medium => {
            if remaining <= TimeDelta::days(5) {
                Some(Announcement::DueInDays(whole_days(remaining)))
            } else if remaining <= TimeDelta::days(1) {
                Some(Announcement::DueInHours(whole_hours(
                    remaining - TimeDelta::days(1),
                )))
            } else {
                None
            }
        }
        Priority::High => {
            if remaining <= TimeDelta::days(10) {
                Some(Announcement::DueInDays(whole_days(remaining)))
            } else if remaining <= TimeDelta::days(3) {
                Some(Announcement::DueInHours(whole_hours(
                    remaining - TimeDelta::days(3),
                )))
            } else if remaining <= TimeDelta::hours(1) {
                Some(Announcement::DueSoon)
            } else {
                None
            }
        }
    }
}

/// Seconds in `delta`, rounded toward negative infinity.
fn floor_seconds(delta: TimeDelta) -> i64 {
    let seconds = delta.num_seconds();
    if delta.subsec_nanos() < 0 {
        seconds - 1
    } else {
        seconds
    }
}

/// Whole days, floored: -1 second is day -1, 4 days 20 hours is day 4.
pub fn whole_days(delta: TimeDelta) -> i64 {
    floor_seconds(delta).div_euclid(86_400)
}

/// Whole hours, floored.
pub fn whole_hours(delta: TimeDelta) -> i64 {
    floor_seconds(delta).div_euclid(3_600)
}
