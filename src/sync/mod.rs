//! This module keeps a local copy of the tasks of one day, consistent with a [`TaskApi`]
//!
//! The server is always trusted: the local list is only changed once the server has confirmed an operation,
//! and it is then changed to whatever the server replied.

use std::fmt::{Display, Formatter};

use chrono::{NaiveDate, NaiveTime};

use crate::clock::Clock;
use crate::error::{TodoError, TodoResult};
use crate::task::{NewTask, Task, TaskId, TaskUpdate};
use crate::traits::TaskApi;

pub mod feedback;
use feedback::{Feedback, FeedbackSender, SyncEvent};

/// How many tasks of the selected day are done
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TaskSummary {
    pub done: usize,
    pub total: usize,
}

impl Display for TaskSummary {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "{}/{} done", self.done, self.total)
    }
}

/// The tasks of the selected date, as known by the server.
///
/// The list always holds the tasks of exactly one date. Selecting another date replaces the whole list.
#[derive(Debug)]
pub struct TaskList<A, C>
where
    A: TaskApi,
    C: Clock,
{
    api: A,
    clock: C,

    selected_date: NaiveDate,
    tasks: Vec<Task>,
    /// Whether `tasks` has been fetched from the server for `selected_date`
    loaded: bool,
    last_error: Option<String>,

    feedback: Feedback,
}

impl<A, C> TaskList<A, C>
where
    A: TaskApi,
    C: Clock,
{
    /// Create an empty list, with today as the selected date.
    ///
    /// Nothing is fetched until [`Self::load_tasks_for_date`] (or [`Self::reload`]) is called.
    pub fn new(api: A, clock: C) -> Self {
        Self::with_feedback(api, clock, Feedback::new())
    }

    /// Same as [`Self::new`], but every change will be reported to `sender`
    pub fn new_with_feedback(api: A, clock: C, sender: FeedbackSender) -> Self {
        Self::with_feedback(api, clock, Feedback::new_with_channel(sender))
    }

    fn with_feedback(api: A, clock: C, feedback: Feedback) -> Self {
        let selected_date = clock.today();
        Self {
            api, clock,
            selected_date,
            tasks: Vec::new(),
            loaded: false,
            last_error: None,
            feedback,
        }
    }

    pub fn api(&self) -> &A { &self.api }
    pub fn clock(&self) -> &C { &self.clock }
    pub fn selected_date(&self) -> NaiveDate { self.selected_date }
    pub fn tasks(&self) -> &[Task] { &self.tasks }
    pub fn is_loaded(&self) -> bool { self.loaded }
    /// A human-readable description of the last failure, cleared by the next success
    pub fn last_error(&self) -> Option<&str> { self.last_error.as_deref() }

    pub fn get_task(&self, id: &TaskId) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id() == id)
    }

    pub fn summary(&self) -> TaskSummary {
        TaskSummary {
            done: self.tasks.iter().filter(|task| task.done()).count(),
            total: self.tasks.len(),
        }
    }

    /// Fetch the tasks of `date`, and make it the selected date.
    ///
    /// In case of failure, both the selected date and the list are left as they were.
    pub async fn load_tasks_for_date(&mut self, date: NaiveDate) -> TodoResult<&[Task]> {
        self.feedback.debug(&format!("Loading tasks of {}", date));
        self.feedback.send(SyncEvent::Loading{ date });

        let tasks = match self.api.list_by_date(date).await {
            Err(err) => return Err(self.failed(err)),
            Ok(tasks) => tasks,
        };

        let (tasks, foreign): (Vec<Task>, Vec<Task>) = tasks.into_iter().partition(|task| task.date() == date);
        if foreign.is_empty() == false {
            log::warn!("The server returned {} task(s) that do not belong to {}. Ignoring them", foreign.len(), date);
        }

        self.selected_date = date;
        self.tasks = tasks;
        self.loaded = true;
        self.last_error = None;
        self.feedback.info(&format!("Loaded {} task(s) for {}", self.tasks.len(), date));
        self.feedback.send(SyncEvent::Loaded{ date, count: self.tasks.len() });
        Ok(&self.tasks)
    }

    /// Fetch the tasks of the selected date again
    pub async fn reload(&mut self) -> TodoResult<&[Task]> {
        let date = self.selected_date;
        self.load_tasks_for_date(date).await
    }

    /// Select today (as told by the clock) and fetch its tasks
    pub async fn select_today(&mut self) -> TodoResult<&[Task]> {
        let today = self.clock.today();
        self.load_tasks_for_date(today).await
    }

    /// Create a task on the server.
    ///
    /// A blank title is rejected before anything is sent. The created task is added to the list only if it belongs to the selected date,
    /// and that date has been loaded (otherwise the list would not hold all the tasks of the date).
    pub async fn create_task(&mut self, title: &str, description: Option<&str>, date: NaiveDate, due_time: Option<NaiveTime>) -> TodoResult<Task> {
        let description = description
            .map(str::trim)
            .filter(|d| d.is_empty() == false)
            .map(String::from);
        let new_task = match NewTask::new(title.to_string(), description, date, due_time) {
            Err(err) => return Err(self.failed(err)),
            Ok(t) => t,
        };

        let created = match self.api.create(&new_task).await {
            Err(err) => return Err(self.failed(err)),
            Ok(task) => task,
        };

        self.feedback.info(&format!("Created task {} ({}) for {}", created.id(), created.title(), created.date()));
        if self.loaded && created.date() == self.selected_date {
            self.tasks.push(created.clone());
        }
        self.changed();
        Ok(created)
    }

    /// Flip the completion status of a task.
    ///
    /// Nothing is flipped locally before the server replies: the cached task is replaced with the server's version.
    pub async fn toggle_task(&mut self, id: &TaskId) -> TodoResult<Task> {
        let toggled = match self.api.toggle(id).await {
            Err(err) => return Err(self.failed(err)),
            Ok(task) => task,
        };

        self.feedback.info(&format!("Task {} is now {}", id, if toggled.done() { "done" } else { "not done" }));
        self.replace(id, toggled.clone());
        self.changed();
        Ok(toggled)
    }

    /// Change some fields of a task
    pub async fn update_task(&mut self, id: &TaskId, fields: &TaskUpdate) -> TodoResult<Task> {
        if let Err(err) = fields.validate() {
            return Err(self.failed(err));
        }

        let updated = match self.api.update(id, fields).await {
            Err(err) => return Err(self.failed(err)),
            Ok(task) => task,
        };

        self.feedback.info(&format!("Updated task {}", id));
        self.replace(id, updated.clone());
        self.changed();
        Ok(updated)
    }

    pub async fn delete_task(&mut self, id: &TaskId) -> TodoResult<()> {
        if let Err(err) = self.api.delete(id).await {
            return Err(self.failed(err));
        }

        self.feedback.info(&format!("Deleted task {}", id));
        self.tasks.retain(|task| task.id() != id);
        self.changed();
        Ok(())
    }

    /// Put the server's version of a task in place of the cached one.
    ///
    /// Tasks the server moved to another date leave the list. Tasks that were not cached are not added.
    fn replace(&mut self, id: &TaskId, new_version: Task) {
        let position = match self.tasks.iter().position(|task| task.id() == id) {
            None => {
                self.feedback.debug(&format!("Task {} is not in the list of {}, nothing to replace", id, self.selected_date));
                return;
            },
            Some(pos) => pos,
        };

        if new_version.date() == self.selected_date {
            self.tasks[position] = new_version;
        } else {
            self.feedback.debug(&format!("Task {} has moved to {}, removing it from the list", id, new_version.date()));
            self.tasks.remove(position);
        }
    }

    fn changed(&mut self) {
        self.last_error = None;
        self.feedback.send(SyncEvent::Changed{ date: self.selected_date, count: self.tasks.len() });
    }

    fn failed(&mut self, err: TodoError) -> TodoError {
        let message = err.user_message();
        self.feedback.error(&format!("Task operation failed: {}", err));
        self.feedback.send(SyncEvent::Failed{ message: message.clone() });
        self.last_error = Some(message);
        err
    }
}
