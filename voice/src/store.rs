// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
use common::{NewTask, Status, Task};

use crate::error::Result;

/// Persistence capability used by the assistant.
///
/// `update` and `delete` report `AssistantError::TaskNotFound` when no row
/// carries the id; every other failure is `AssistantError::Storage`.
#[allow(async_fn_in_trait)]
pub trait TaskStore {
    /// Inserts a pending task and returns the id the store assigned to it.
    async fn insert(&self, task: &NewTask) -> Result<i64>;

    async fn update(&self, id: i64, status: Status) -> Result<()>;

    async fn delete(&self, id: i64) -> Result<()>;

    /// Substring match on the description.
    async fn search(&self, keyword: &str) -> Result<Vec<Task>>;

    async fn list(&self) -> Result<Vec<Task>>;
}
