//! HTTP API for the Moi Sushi & Poké Bowl restaurant website.
//!
//! Routes form submissions to email, the receipt printers and the kitchen
//! notification relay.

pub mod app;
pub mod config;
pub mod error;
pub mod extractors;
pub mod middleware;
pub mod routes;
pub mod services;
