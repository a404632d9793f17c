//! This crate provides a way to manage daily to-do lists stored on a remote server.
//!
//! It provides an HTTP client in the [`client`] module, that handles authentication and implements [`TaskApi`](traits::TaskApi).
//!
//! Front-ends usually do not use the client directly, but rather a [`TaskList`](sync::TaskList). \
//! A `TaskList` holds the tasks of a selected date, and keeps them consistent with the server after every create, update, toggle and delete. \
//! It only changes its local copy once the server has confirmed an operation.
//!
//! Sessions are explicit values (see [`session`]), and "today" is given by an injected [`Clock`](clock::Clock),
//! so that a [`mock`] server and a fixed clock can replace the real ones in tests.

pub mod traits;

mod task;
pub use task::{NewTask, Task, TaskId, TaskUpdate, parse_due_time, validate_title};
pub mod error;
pub use error::{TodoError, TodoResult};
pub mod sync;
pub use sync::TaskList;

pub mod client;
pub use client::Client;
pub mod session;
pub use session::{Session, SessionStore, UserProfile};
pub mod clock;
pub mod mock;

pub mod config;
pub mod utils;
