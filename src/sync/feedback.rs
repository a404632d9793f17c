//! Utilities to tell a front-end what the task list is doing

use std::fmt::{Display, Formatter};

use chrono::NaiveDate;
use tokio::sync::watch;

/// The last thing that happened to a [`TaskList`](crate::sync::TaskList)
#[derive(Clone, Debug, Default, PartialEq)]
pub enum SyncEvent {
    /// Nothing has been loaded yet
    #[default]
    NotStarted,
    /// The tasks of a day are being fetched
    Loading{ date: NaiveDate },
    /// The tasks of a day have been fetched and replace the previous list
    Loaded{ date: NaiveDate, count: usize },
    /// The list has been changed after a successful create, update, toggle or delete
    Changed{ date: NaiveDate, count: usize },
    /// An operation failed. The list has been left untouched
    Failed{ message: String },
}

impl SyncEvent {
    /// The day the list is about, unless nothing happened yet or the last operation failed
    pub fn date(&self) -> Option<NaiveDate> {
        match self {
            SyncEvent::Loading{ date } | SyncEvent::Loaded{ date, .. } | SyncEvent::Changed{ date, .. } => Some(*date),
            SyncEvent::NotStarted | SyncEvent::Failed{ .. } => None,
        }
    }
}

/// A status line, as a front-end would show it
impl Display for SyncEvent {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            SyncEvent::NotStarted => Ok(()),
            SyncEvent::Loading{ date } => write!(f, "{}: loading...", date),
            SyncEvent::Loaded{ date, count } | SyncEvent::Changed{ date, count } => write!(f, "{}: {} task(s)", date, count),
            SyncEvent::Failed{ message } => f.write_str(message),
        }
    }
}

/// Publishes the last [`SyncEvent`] of a task list
pub type FeedbackSender = watch::Sender<SyncEvent>;
/// Follows the last [`SyncEvent`] of a task list
pub type FeedbackReceiver = watch::Receiver<SyncEvent>;

/// Create a channel to follow a task list, see [`TaskList::new_with_feedback`](crate::sync::TaskList::new_with_feedback).
///
/// Only the latest event is kept: a slow listener misses intermediate ones.
pub fn feedback_channel() -> (FeedbackSender, FeedbackReceiver) {
    watch::channel(SyncEvent::NotStarted)
}

/// Logs what happens to a task list, counts its errors, and forwards events to a listener (if any)
#[derive(Debug, Default)]
pub struct Feedback {
    n_errors: u32,
    channel: Option<FeedbackSender>,
}

impl Feedback {
    pub fn new() -> Self {
        Self { n_errors: 0, channel: None }
    }
    pub fn new_with_channel(channel: FeedbackSender) -> Self {
        Self { n_errors: 0, channel: Some(channel) }
    }

    /// How many operations failed so far
    pub fn n_errors(&self) -> u32 {
        self.n_errors
    }

    /// Log an error
    pub fn error(&mut self, text: &str) {
        log::error!("{}", text);
        self.n_errors += 1;
    }
    /// Log an info
    pub fn info(&mut self, text: &str) {
        log::info!("{}", text);
    }
    /// Log a debug message
    pub fn debug(&mut self, text: &str) {
        log::debug!("{}", text);
    }
    /// Send an event as a feedback to the listener (if any).
    pub fn send(&mut self, event: SyncEvent) {
        if let Some(sender) = &self.channel {
            // Nobody listening anymore is not an error
            let _ = sender.send(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_reach_the_listener() {
        let (sender, receiver) = feedback_channel();
        assert_eq!(*receiver.borrow(), SyncEvent::NotStarted);

        let mut feedback = Feedback::new_with_channel(sender);
        let date = NaiveDate::from_ymd(2024, 5, 1);
        feedback.send(SyncEvent::Loaded{ date, count: 2 });
        assert_eq!(*receiver.borrow(), SyncEvent::Loaded{ date, count: 2 });
        assert_eq!(receiver.borrow().to_string(), "2024-05-01: 2 task(s)");
        assert_eq!(receiver.borrow().date(), Some(date));

        feedback.send(SyncEvent::Failed{ message: "Unable to load the tasks.".to_string() });
        assert_eq!(receiver.borrow().to_string(), "Unable to load the tasks.");
        assert_eq!(receiver.borrow().date(), None);

        feedback.error("something went wrong");
        assert_eq!(feedback.n_errors(), 1);
    }
}
