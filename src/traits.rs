use async_trait::async_trait;
use chrono::NaiveDate;

use crate::error::TodoResult;
use crate::task::{NewTask, Task, TaskId, TaskUpdate};

/// A source of truth for tasks, usually a remote server.
///
/// Implementors own whatever credentials they need, callers never pass them along.
#[async_trait]
pub trait TaskApi: Send + Sync {
    /// Returns every task of the given day
    async fn list_by_date(&self, date: NaiveDate) -> TodoResult<Vec<Task>>;
    /// Store a new task, and return it as it has been stored (with its new ID)
    async fn create(&self, new_task: &NewTask) -> TodoResult<Task>;
    /// Change some fields of a task, and return the updated task
    async fn update(&self, id: &TaskId, update: &TaskUpdate) -> TodoResult<Task>;
    /// Flip the completion status of a task, and return the updated task
    async fn toggle(&self, id: &TaskId) -> TodoResult<Task>;
    async fn delete(&self, id: &TaskId) -> TodoResult<()>;
}
