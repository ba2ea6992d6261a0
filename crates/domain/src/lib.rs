//! Domain layer for the Moi Sushi backend.
//!
//! This crate contains:
//! - Domain models and request DTOs (email settings, feedback, email, printer, notifications)
//! - Storage ports implemented by the persistence crate
//! - Email provider selection

pub mod models;
pub mod services;
