//! `rollbook` - A local-first student record manager
//!
//! This library provides the record store, search and filter view, and form
//! logic behind the `rollbook` command-line tool. Records are kept in a
//! single key of a local `SQLite` key-value table and rewritten on every
//! change.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod app;
pub mod cli;
pub mod config;
pub mod error;
pub mod form;
pub mod logging;
pub mod query;
pub mod record;
pub mod render;
pub mod shell;
pub mod storage;
pub mod store;

pub use app::{Action, App, Outcome};
pub use config::Config;
pub use error::{Error, Result};
pub use form::{FormController, FormErrors, FormIntent, FormMode};
pub use logging::init_logging;
pub use query::{filter_records, EnrollmentFilter, Query};
pub use record::{Grade, StudentDraft, StudentRecord, ValidStudent};
pub use storage::{KeyValueStore, MemoryStore, SqliteStore};
pub use store::{RecordStats, RecordStore};
