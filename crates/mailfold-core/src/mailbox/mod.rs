//! Mailbox query service module.
//!
//! The public-facing component: folder listing (flat or threaded),
//! message lookup, and the write path (ingest, mutate) that keeps the
//! record store, folder indexes, and thread aggregates consistent.

mod seed;
mod service;

pub use service::MailboxService;
