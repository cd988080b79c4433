//! Local storage module for data that must survive a restart
//!
//! This module provides database operations using SeaORM for:
//! - The task list snapshot used as an offline fallback
//! - The persisted session

pub mod cache;
pub mod db;

pub use cache::LocalCache;
pub use db::LocalStorage;
