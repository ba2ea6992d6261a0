//! HTTP route handlers.

pub mod admin;
pub mod email;
pub mod feedback;
pub mod health;
pub mod notify;
pub mod printer;
pub mod sendgrid;
pub mod transactional;
