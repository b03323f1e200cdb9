//! Core of weekcal, a weekly task calendar.
//!
//! This crate provides everything but the HTTP and terminal surfaces:
//! - `task` for the task model and the week view
//! - `remote` for the document store (Firestore, in-memory)
//! - `local` for the per-user snapshots used when the store is unreachable
//! - `sync` and `mutation` for loading and changing a signed-in user's tasks
//! - `auth` and `session` for the identity boundary

pub mod auth;
pub mod config;
pub mod constants;
pub mod error;
pub mod local;
pub mod mutation;
pub mod notification;
pub mod remote;
pub mod session;
pub mod sync;
pub mod task;

pub use error::{WeekcalError, WeekcalResult};
pub use notification::{Notification, NotificationKind};
pub use task::{DayColumn, Task, TaskTime, WeekView, Weekday};
