//! Custom Axum extractors.

pub mod client_info;
pub mod json_body;
pub mod query_params;

pub use client_info::{client_ip, ClientInfo};
pub use json_body::JsonBody;
pub use query_params::QueryParams;
