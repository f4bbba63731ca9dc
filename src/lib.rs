//! HTTP surface and command-line configuration for the feedback tracker.
//!
//! All rules live in [`feedback_core`]; this crate only maps requests onto
//! [`feedback_core::Tracker`] calls and their results onto JSON responses.

pub mod api;
pub mod config;
