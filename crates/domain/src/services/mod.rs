//! Domain services for the Moi Sushi backend.
//!
//! Storage ports and the pure decision logic the API layer builds on.

pub mod provider_selection;
pub mod stores;

pub use provider_selection::{
    force_sendgrid, resolve_sendgrid_key, select_provider, ProviderChoice, ProviderEnvironment,
    SelectionError,
};
pub use stores::{EmailSettingStore, FeedbackStore, StoreError};
