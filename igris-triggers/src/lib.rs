//! Persistent keyword-trigger registry.

/// Error taxonomy for trigger validation and storage.
pub mod error;
/// Trigger keys and definitions.
pub mod model;
/// File-backed registry store.
pub mod store;

pub use error::TriggerError;
pub use model::{
    MAX_CONTENT_CHARS, MAX_KEY_CHARS, TriggerDefinition, TriggerKey, TriggerKind,
    is_valid_image_url,
};
pub use store::TriggerStore;
