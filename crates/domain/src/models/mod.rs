//! Domain models for the Moi Sushi backend.

pub mod email;
pub mod email_setting;
pub mod feedback;
pub mod notification;
pub mod printer;

pub use email::{EmailMessage, EmailTemplate};
pub use email_setting::{EmailProvider, EmailSetting, EmailSettingsSnapshot};
pub use feedback::{FeedbackEntry, FeedbackType, NewFeedback};
pub use notification::{NotificationEvent, NotificationType};
pub use printer::TcpPrintJob;
