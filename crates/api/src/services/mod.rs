//! External service integrations.

pub mod email;
pub mod email_router;
pub mod email_templates;
pub mod notifier;
pub mod printer;
pub mod sendgrid;
pub mod smtp;

pub use email::{EmailError, EmailSender};
pub use email_router::{Dispatch, EmailRouter, SendOutcome};
pub use notifier::{NotifyError, WebSocketNotifier};
pub use printer::{EposHttpPrinter, PrintError, PrinterClient, TcpPrinter};
