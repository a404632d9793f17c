//! An in-memory task server.
//!
//! It behaves like the real server (it assigns IDs, knows about every date, rejects unknown IDs),
//! and its [`MockBehaviour`] can be tweaked so that some requests fail with an HTTP 500.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::error::{TodoError, TodoResult};
use crate::task::{NewTask, Task, TaskId, TaskUpdate};
use crate::traits::TaskApi;

/// A request the mock server can be told to fail
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operation {
    List,
    Create,
    Update,
    Toggle,
    Delete,
}

impl Operation {
    /// How this operation is named in error messages
    pub fn description(self) -> &'static str {
        match self {
            Operation::List => "load the tasks",
            Operation::Create => "create the task",
            Operation::Update => "update the task",
            Operation::Toggle => "toggle the task",
            Operation::Delete => "delete the task",
        }
    }
}

/// The next `successes` requests go through, then the following `failures` ones get an HTTP 500.
/// Every request after that goes through.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FailurePlan {
    pub successes: u32,
    pub failures: u32,
}

impl FailurePlan {
    pub fn new(successes: u32, failures: u32) -> Self {
        Self { successes, failures }
    }

    /// Use up one request. Returns whether it must fail
    fn next_fails(&mut self) -> bool {
        if self.successes > 0 {
            self.successes -= 1;
            false
        } else if self.failures > 0 {
            self.failures -= 1;
            true
        } else {
            false
        }
    }
}

/// Which requests of a [`MockTaskApi`] must fail
#[derive(Clone, Debug, Default)]
pub struct MockBehaviour {
    /// While suspended, every request goes through and the plans are left untouched
    pub is_suspended: bool,

    pub list: FailurePlan,
    pub create: FailurePlan,
    pub update: FailurePlan,
    pub toggle: FailurePlan,
    pub delete: FailurePlan,
}

impl MockBehaviour {
    pub fn new() -> Self {
        Self::default()
    }

    /// The next `n_fails` requests of every operation fail
    pub fn fail_now(n_fails: u32) -> Self {
        let plan = FailurePlan::new(0, n_fails);
        Self { is_suspended: false, list: plan, create: plan, update: plan, toggle: plan, delete: plan }
    }

    /// The next `n_fails` requests of `operation` fail, the other operations always succeed
    pub fn failing(operation: Operation, n_fails: u32) -> Self {
        let mut behaviour = Self::default();
        *behaviour.plan_mut(operation) = FailurePlan::new(0, n_fails);
        behaviour
    }

    pub fn suspend(&mut self) {
        self.is_suspended = true;
    }
    pub fn resume(&mut self) {
        self.is_suspended = false;
    }

    /// Called by the mock server before it handles a request
    pub fn check(&mut self, operation: Operation) -> TodoResult<()> {
        if self.is_suspended || self.plan_mut(operation).next_fails() == false {
            return Ok(());
        }
        log::debug!("Mock server: failing a request to {}", operation.description());
        Err(TodoError::Status {
            operation: operation.description(),
            status: 500,
            body: "Internal Server Error".to_string(),
        })
    }

    fn plan_mut(&mut self, operation: Operation) -> &mut FailurePlan {
        match operation {
            Operation::List => &mut self.list,
            Operation::Create => &mut self.create,
            Operation::Update => &mut self.update,
            Operation::Toggle => &mut self.toggle,
            Operation::Delete => &mut self.delete,
        }
    }
}

fn not_found(operation: Operation, id: &TaskId) -> TodoError {
    TodoError::Status{ operation: operation.description(), status: 404, body: format!("No task with ID {}", id) }
}

/// How many times each operation has been requested
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CallCounts {
    pub list: u32,
    pub create: u32,
    pub update: u32,
    pub toggle: u32,
    pub delete: u32,
}

impl CallCounts {
    pub fn total(&self) -> u32 {
        self.list + self.create + self.update + self.toggle + self.delete
    }
}

#[derive(Default, Debug)]
struct MockState {
    tasks: HashMap<TaskId, Task>,
    behaviour: MockBehaviour,
    calls: CallCounts,
}

/// A [`TaskApi`] that keeps its tasks in memory
#[derive(Default, Debug)]
pub struct MockTaskApi {
    state: Mutex<MockState>,
}

impl MockTaskApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_behaviour(behaviour: MockBehaviour) -> Self {
        let mock = Self::default();
        mock.set_behaviour(behaviour);
        mock
    }

    pub fn set_behaviour(&self, behaviour: MockBehaviour) {
        self.lock().behaviour = behaviour;
    }

    /// Add a task directly into the server storage, as if another client had created it
    pub fn insert(&self, task: Task) {
        self.lock().tasks.insert(task.id().clone(), task);
    }

    /// Same as [`Self::insert`], but builds the task with a fresh ID
    pub fn insert_new(&self, title: &str, date: NaiveDate, done: bool) -> Task {
        let task = Task::new(TaskId::random(), title.to_string(), None, date, None, done);
        self.insert(task.clone());
        task
    }

    /// Returns the task as it is stored on the server
    pub fn stored(&self, id: &TaskId) -> Option<Task> {
        self.lock().tasks.get(id).cloned()
    }

    pub fn len(&self) -> usize {
        self.lock().tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn calls(&self) -> CallCounts {
        self.lock().calls
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MockState> {
        // A poisoned mutex only means a test panicked while holding it, the data is still usable
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl TaskApi for MockTaskApi {
    async fn list_by_date(&self, date: NaiveDate) -> TodoResult<Vec<Task>> {
        let mut state = self.lock();
        state.calls.list += 1;
        state.behaviour.check(Operation::List)?;

        let mut tasks: Vec<Task> = state.tasks.values()
            .filter(|task| task.date() == date)
            .cloned()
            .collect();
        // Servers usually return tasks sorted by due time
        tasks.sort_by(|a, b| (a.due_time(), a.title()).cmp(&(b.due_time(), b.title())));
        Ok(tasks)
    }

    async fn create(&self, new_task: &NewTask) -> TodoResult<Task> {
        let mut state = self.lock();
        state.calls.create += 1;
        state.behaviour.check(Operation::Create)?;

        let task = new_task.clone().into_task(TaskId::random());
        state.tasks.insert(task.id().clone(), task.clone());
        Ok(task)
    }

    async fn update(&self, id: &TaskId, update: &TaskUpdate) -> TodoResult<Task> {
        let mut state = self.lock();
        state.calls.update += 1;
        state.behaviour.check(Operation::Update)?;

        let task = state.tasks.get_mut(id).ok_or_else(|| not_found(Operation::Update, id))?;
        task.apply(update);
        Ok(task.clone())
    }

    async fn toggle(&self, id: &TaskId) -> TodoResult<Task> {
        let mut state = self.lock();
        state.calls.toggle += 1;
        state.behaviour.check(Operation::Toggle)?;

        let task = state.tasks.get_mut(id).ok_or_else(|| not_found(Operation::Toggle, id))?;
        task.toggle();
        Ok(task.clone())
    }

    async fn delete(&self, id: &TaskId) -> TodoResult<()> {
        let mut state = self.lock();
        state.calls.delete += 1;
        state.behaviour.check(Operation::Delete)?;

        match state.tasks.remove(id) {
            None => Err(not_found(Operation::Delete, id)),
            Some(_) => Ok(()),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn failed_operation(result: TodoResult<()>) -> Option<(&'static str, u16)> {
        match result {
            Err(TodoError::Status{ operation, status, .. }) => Some((operation, status)),
            _ => None,
        }
    }

    #[test]
    fn only_the_planned_operation_fails() {
        let mut behaviour = MockBehaviour{ toggle: FailurePlan::new(1, 2), ..MockBehaviour::default() };

        assert!(behaviour.check(Operation::Toggle).is_ok());
        assert_eq!(failed_operation(behaviour.check(Operation::Toggle)), Some(("toggle the task", 500)));
        // Other operations are not affected, and do not use up the plan
        assert!(behaviour.check(Operation::Delete).is_ok());
        assert!(behaviour.check(Operation::List).is_ok());
        assert_eq!(failed_operation(behaviour.check(Operation::Toggle)), Some(("toggle the task", 500)));
        assert!(behaviour.check(Operation::Toggle).is_ok());
        assert_eq!(behaviour.toggle, FailurePlan::default());
    }

    #[test]
    fn fail_now_hits_every_operation() {
        let mut behaviour = MockBehaviour::fail_now(1);
        for operation in [Operation::List, Operation::Create, Operation::Update, Operation::Toggle, Operation::Delete] {
            assert_eq!(failed_operation(behaviour.check(operation)), Some((operation.description(), 500)));
            assert!(behaviour.check(operation).is_ok());
        }

        let mut behaviour = MockBehaviour::failing(Operation::Create, 1);
        behaviour.suspend();
        assert!(behaviour.check(Operation::Create).is_ok());
        behaviour.resume();
        assert_eq!(failed_operation(behaviour.check(Operation::Create)), Some(("create the task", 500)));
    }

    #[tokio::test]
    async fn mock_server_semantics() {
        let mock = MockTaskApi::new();
        let day = NaiveDate::from_ymd(2024, 5, 1);
        let task = mock.insert_new("Stretch", day, false);
        mock.insert_new("Elsewhere", NaiveDate::from_ymd(2024, 5, 2), false);

        let listed = mock.list_by_date(day).await.unwrap();
        assert_eq!(listed, vec![task.clone()]);

        let toggled = mock.toggle(task.id()).await.unwrap();
        assert!(toggled.done());
        assert_eq!(mock.stored(task.id()), Some(toggled));

        assert!(mock.delete(&TaskId::from("unknown")).await.is_err());
        mock.delete(task.id()).await.unwrap();
        assert_eq!(mock.len(), 1);
        assert_eq!(mock.calls(), CallCounts{ list: 1, toggle: 1, delete: 2, ..CallCounts::default() });
    }
}
