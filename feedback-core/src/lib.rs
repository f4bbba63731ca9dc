//! Core library for the feedback tracker.
//!
//! This crate provides the domain models, SQLite persistence and the
//! [`Tracker`] service that enforces the feedback lifecycle, the comment
//! thread rules and the feedback-request workflow, independent of any
//! transport layer (HTTP, CLI, etc.).
//!
//! # Usage
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use feedback_core::identity::StaticDirectory;
//! use feedback_core::notify::LogNotifier;
//! use feedback_core::{Database, Tracker};
//!
//! let db = Database::open_default()?;
//! db.migrate()?;
//!
//! let directory = StaticDirectory::from_json(r#"[
//!     {"id": 1, "name": "Ada", "email": "ada@example.com", "role": "manager"}
//! ]"#)?;
//! let tracker = Tracker::new(db, Arc::new(directory), Arc::new(LogNotifier::default()));
//! tracker.sync_directory()?;
//!
//! let ada = tracker.resolve_actor(1)?;
//! let feedback = tracker.list_feedback(&ada)?;
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod db;
pub mod error;
pub mod identity;
pub mod models;
pub mod notify;
pub mod report;
pub mod service;

// Re-export commonly used types at crate root
pub use db::Database;
pub use error::{Error, Result};
pub use service::Tracker;
