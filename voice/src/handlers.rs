// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
use crate::error::AssistantError;
use crate::interpreter::Intent;
use crate::notes::ReminderNotes;
use crate::store::TaskStore;

use chrono::{NaiveDate, NaiveTime};
use common::{NewTask, Priority, Status, Task};
use tracing::{debug, error, info};

/// Runs one intent against the store (or the note log) and returns the
/// sentence to speak. Failures are folded into the reply.
pub async fn execute<S: TaskStore>(store: &S, notes: &ReminderNotes, intent: Intent) -> String {
    match intent {
        Intent::AddTask {
            description,
            due_date,
            priority,
        } => add_task(store, description, due_date, priority).await,
        Intent::UpdateTask { id, status } => update_task(store, id, status).await,
        Intent::DeleteTask { id } => delete_task(store, id).await,
        Intent::SearchTask { keyword } => search_tasks(store, &keyword).await,
        Intent::ViewTasks => view_tasks(store).await,
        Intent::SetReminder { text, time } => set_reminder(notes, &text, time).await,
        Intent::Unrecognized { clarification } => {
            debug!("Replying with clarification: {}", clarification);
            clarification.to_string()
        }
    }
}

/// Handler for adding a new task.
pub async fn add_task<S: TaskStore>(
    store: &S,
    description: String,
    due_date: NaiveDate,
    priority: Priority,
) -> String {
    let payload = NewTask {
        description,
        due_date,
        priority,
    };

    match store.insert(&payload).await {
        Ok(id) => {
            info!("Task created successfully with ID: {}", id);
            format!(
                "Task '{}' added with due date {} and priority {}.",
                payload.description, payload.due_date, payload.priority
            )
        }
        Err(err) => failure(err, "adding the task"),
    }
}

/// Handler for marking a task pending or completed.
pub async fn update_task<S: TaskStore>(store: &S, id: i64, status: Status) -> String {
    match store.update(id, status).await {
        Ok(()) => format!("Task ID {id} marked as {status}."),
        Err(err) => failure(err, "updating the task"),
    }
}

/// Handler for deleting a task by ID.
pub async fn delete_task<S: TaskStore>(store: &S, id: i64) -> String {
    match store.delete(id).await {
        Ok(()) => format!("Task ID {id} deleted."),
        Err(err) => failure(err, "deleting the task"),
    }
}

pub async fn search_tasks<S: TaskStore>(store: &S, keyword: &str) -> String {
    match store.search(keyword).await {
        Ok(tasks) if tasks.is_empty() => "No tasks found.".to_string(),
        Ok(tasks) => format!("Tasks found: {}", describe_tasks(&tasks)),
        Err(err) => failure(err, "searching for tasks"),
    }
}

pub async fn view_tasks<S: TaskStore>(store: &S) -> String {
    match store.list().await {
        Ok(tasks) if tasks.is_empty() => "No tasks available.".to_string(),
        Ok(tasks) => {
            info!("Successfully retrieved {} tasks.", tasks.len());
            format!("Tasks: {}", describe_tasks(&tasks))
        }
        Err(err) => failure(err, "viewing tasks"),
    }
}

/// Handler for ad hoc reminders: they are only written down.
pub async fn set_reminder(notes: &ReminderNotes, text: &str, time: NaiveTime) -> String {
    match notes.append(text, time).await {
        Ok(()) => format!("Reminder set for {} at {}.", text, time.format("%H:%M")),
        Err(err) => failure(err, "setting the reminder"),
    }
}

/// `ID 1: buy milk (pending) due by 2025-01-01 priority high, ID 2: ...`
pub fn describe_tasks(tasks: &[Task]) -> String {
    tasks
        .iter()
        .map(|task| {
            format!(
                "ID {}: {} ({}) due by {} priority {}",
                task.id, task.description, task.status, task.due_date, task.priority
            )
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Turns an error into the spoken reply. A missing task is named; anything
/// else gets a generic sentence and a diagnostic log line.
pub fn failure(err: AssistantError, doing: &str) -> String {
    match err {
        AssistantError::TaskNotFound(_) => {
            error!("{}", err);
            err.to_string()
        }
        other => {
            error!("Error while {}: {:?}", doing, other);
            format!("An error occurred while {doing}.")
        }
    }
}
