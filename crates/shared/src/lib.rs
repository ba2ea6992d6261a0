//! Shared utilities for the Moi Sushi backend.
//!
//! This crate provides common functionality used across all other crates:
//! - Request validation helpers (email format, non-blank text)
//! - Secret masking for settings display and logs

pub mod masking;
pub mod validation;
