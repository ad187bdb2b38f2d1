// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
use crate::error::{AssistantError, Result};
use crate::store::TaskStore;

use anyhow::Context;
use common::{NewTask, Status, Task};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{migrate::MigrateDatabase, Sqlite, SqlitePool};
use tracing::{debug, info};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS tasks (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    task TEXT NOT NULL CHECK(length(task) > 0),
    status TEXT NOT NULL CHECK(status IN ('pending', 'completed')),
    due_date TEXT NOT NULL,
    priority TEXT NOT NULL CHECK(priority IN ('low', 'medium', 'high')),
    reminder_set INTEGER NOT NULL DEFAULT 0
);
"#;

const TASK_COLUMNS: &str = "id, task, status, due_date, priority, reminder_set";

/// Establishes the database connection pool.
/// If the database does not exist, it creates it.
/// It also ensures the `tasks` table has the correct schema.
pub async fn establish_connection_pool(database_url: &str) -> anyhow::Result<SqlitePool> {
    if !Sqlite::database_exists(database_url).await.unwrap_or(false) {
        info!("Creating database {}", database_url);
        Sqlite::create_database(database_url)
            .await
            .context("Failed to create database")?;
    } else {
        info!("Database already exists.");
    }

    let pool = SqlitePool::connect(database_url)
        .await
        .context("Failed to connect to database")?;

    create_schema(&pool)
        .await
        .context("Failed to create 'tasks' table")?;

    info!("'tasks' table is ready.");

    Ok(pool)
}

/// Opens a private in-memory database with the schema applied.
///
/// The pool is pinned to a single connection that never expires, otherwise
/// every new connection would see its own empty database.
pub async fn establish_in_memory_pool() -> anyhow::Result<SqlitePool> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .context("Failed to open in-memory database")?;

    create_schema(&pool)
        .await
        .context("Failed to create 'tasks' table")?;

    Ok(pool)
}

pub async fn create_schema(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(SCHEMA).execute(pool).await?;
    Ok(())
}

/// `TaskStore` backed by SQLite. Owns its pool; call `close` on shutdown.
#[derive(Debug, Clone)]
pub struct SqliteTaskStore {
    pool: SqlitePool,
}

impl SqliteTaskStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Waits for in-flight queries and closes every connection.
    pub async fn close(&self) {
        self.pool.close().await;
        info!("Database connections closed.");
    }
}

impl TaskStore for SqliteTaskStore {
    async fn insert(&self, task: &NewTask) -> Result<i64> {
        debug!(
            "Insert values: task={}, due_date={}, priority={}",
            task.description, task.due_date, task.priority
        );

        let id = sqlx::query(
            "INSERT INTO tasks (task, status, due_date, priority) VALUES (?, ?, ?, ?)",
        )
        .bind(&task.description)
        .bind(Status::Pending)
        .bind(task.due_date)
        .bind(task.priority)
        .execute(&self.pool)
        .await?
        .last_insert_rowid();

        info!("Inserted task with ID: {}", id);
        Ok(id)
    }

    async fn update(&self, id: i64, status: Status) -> Result<()> {
        debug!("Attempting to set status of task {} to {}", id, status);

        let result = sqlx::query("UPDATE tasks SET status = ? WHERE id = ?")
            .bind(status)
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AssistantError::TaskNotFound(id));
        }

        info!("Task ID {} marked as {}.", id, status);
        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<()> {
        debug!("Attempting to delete task with ID: {}", id);

        let result = sqlx::query("DELETE FROM tasks WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AssistantError::TaskNotFound(id));
        }

        info!("Deleted task with ID: {}", id);
        Ok(())
    }

    async fn search(&self, keyword: &str) -> Result<Vec<Task>> {
        let tasks = sqlx::query_as::<_, Task>(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE instr(lower(task), lower(?)) > 0 ORDER BY id ASC"
        ))
        .bind(keyword)
        .fetch_all(&self.pool)
        .await?;

        debug!("Search for '{}' matched {} tasks.", keyword, tasks.len());
        Ok(tasks)
    }

    async fn list(&self) -> Result<Vec<Task>> {
        let tasks = sqlx::query_as::<_, Task>(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks ORDER BY id ASC"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(tasks)
    }
}
