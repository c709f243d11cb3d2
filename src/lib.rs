//! wortklar: an adaptive vocabulary drill trainer.
//!
//! The [`scheduler`] picks the next card from the [`catalog`] based on
//! per-card history, and the [`store`] persists that history across
//! sessions, falling back to memory when persistent storage is unavailable.

pub mod catalog;
pub mod config;
pub mod db;
pub mod models;
pub mod scheduler;
pub mod session;
pub mod store;

/// Current time in epoch milliseconds.
pub fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
