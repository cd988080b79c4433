//! Repository layer for database operations.
//!
//! Repositories encapsulate database queries so entities stay plain data
//! models, following the Data Mapper pattern recommended by SeaORM.

pub mod cache_entry;

pub use cache_entry::CacheEntryRepository;
