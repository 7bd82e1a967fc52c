//! Message domain module.
//!
//! Provides the message model, the folder and folder-view vocabulary,
//! the restricted mutation set, and ingest validation.

mod model;
mod validation;

pub use model::{EmailAddress, Folder, FolderView, Message, MessageChange, MessageDraft};
pub use validation::{ValidationError, ValidationResult, validate_message};
