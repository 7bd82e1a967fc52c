//! # mailfold-core
//!
//! Mailbox indexing and thread-aggregation engine for the `mailfold`
//! webmail backend.
//!
//! This crate provides:
//! - Message and thread domain models
//! - Composite folder indexes ordered by recency (including the derived
//!   "starred" view)
//! - Incremental thread aggregation with flag re-derivation on mutation
//! - The mailbox query service: folder listing (flat or threaded),
//!   message lookup, ingestion, and the restricted mutation protocol
//!
//! Canonical message and thread bodies live in the
//! [`RecordStore`](mailfold_store::RecordStore); folder indexes hold only
//! derived sort keys and can always be rebuilt from record state via
//! [`MailboxService::reconcile`].

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod clock;
pub mod config;
mod error;
mod id;
pub mod index;
pub mod mailbox;
pub mod message;
pub mod thread;
pub mod user;

pub use clock::now_ms;
pub use config::MailboxConfig;
pub use error::{Error, Result};
pub use id::new_id;
pub use index::{FolderIndex, sort_key};
pub use mailbox::MailboxService;
pub use message::{
    EmailAddress, Folder, FolderView, Message, MessageChange, MessageDraft, ValidationError,
    ValidationResult, validate_message,
};
pub use thread::{Thread, group_threads};
pub use user::User;
