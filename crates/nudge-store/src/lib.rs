//! Flat-file storage for the nudge to-do list.

pub mod config;
pub mod models;
pub mod store;

pub use config::StoreConfig;
pub use models::{LAZY_THRESHOLD, TaskRecord, is_lazy, lazy_score};
pub use store::{StoreError, TaskStore};
