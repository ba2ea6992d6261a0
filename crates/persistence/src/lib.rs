//! Persistence layer for the Moi Sushi backend.
//!
//! This crate contains:
//! - Database connection management
//! - Entity definitions (database row mappings)
//! - Postgres repositories implementing the domain store ports
//! - In-memory stores for tests and local runs without a database

pub mod db;
pub mod entities;
pub mod memory;
pub mod metrics;
pub mod repositories;

pub use memory::{InMemoryEmailSettingStore, InMemoryFeedbackStore};
pub use repositories::{EmailSettingRepository, FeedbackRepository};
