//! Database entity definitions.
//!
//! Entities are direct mappings to database rows.

pub mod email_setting;
pub mod feedback;

pub use email_setting::EmailSettingEntity;
pub use feedback::FeedbackEntity;
