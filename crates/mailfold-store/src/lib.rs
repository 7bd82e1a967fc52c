//! # mailfold-store
//!
//! Durable storage primitives for the `mailfold` mailbox engine:
//!
//! - [`RecordStore`] - key-value storage of JSON-serialized entities,
//!   keyed by `(kind, id)`
//! - [`OrderedIndex`] - named sorted sets of opaque string keys with
//!   bounded range paging
//!
//! Both are backed by `SQLite` and deliberately expose only key-value
//! gets/puts and ordered range scans; no relational queries leak through
//! this boundary. Higher-level consistency (folder indexes, thread
//! aggregates) is built on top in `mailfold-core`.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod error;
mod index;
mod page;
mod record;

pub use error::{Error, Result};
pub use index::OrderedIndex;
pub use page::Page;
pub use record::RecordStore;
