//! Thread aggregation module.
//!
//! A thread is the set of messages sharing a `thread_id`, folded into one
//! display aggregate. Append-only fields (members, participants, the
//! `last_message_at` maximum) are maintained incrementally; flag-derived
//! fields (`unread_count`, `is_starred`) are re-derived from member state
//! whenever a member's flags change.

mod model;

pub use model::{Thread, group_threads};
