//! tasksync - optimistic to-do list synchronization
//!
//! This library keeps a to-do list responsive while a remote server stays the
//! source of truth. Changes show up immediately, are confirmed in the
//! background, and are reconciled or undone depending on the server's answer.
//! When the server cannot be reached, the last fetched list is served from a
//! local SQLite cache.
//!
//! # Modules
//!
//! * [`backend`] - Remote store interface and its HTTP implementation
//! * [`config`] - Application configuration management
//! * [`storage`] - Local database and the task list snapshot cache
//! * [`sync`] - The task sync controller
//! * [`task`] - Task model

/// Remote store abstraction and implementations
pub mod backend;

/// Configuration module for managing application settings
pub mod config;

/// Application constants and default values
pub mod constants;

/// SeaORM entity models for database tables
pub mod entities;

/// Logging setup and the in-memory log buffer
pub mod logger;

/// Repository layer for database operations
pub mod repositories;

/// Session context and its persistence
pub mod session;

/// Local storage layer for the offline snapshot
pub mod storage;

/// Optimistic synchronization of the task list
pub mod sync;

/// Task model and ordering
pub mod task;
