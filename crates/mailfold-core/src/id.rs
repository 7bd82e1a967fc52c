//! Unique id generation.

use uuid::Uuid;

/// Generate a fresh unique id for messages, threads, and users.
#[must_use]
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}
