//! Thread aggregate model.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::message::{Folder, Message};

/// A conversation aggregate over messages sharing a thread id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Thread {
    /// Thread identifier (the members' `thread_id`).
    pub id: String,
    /// Subject of the thread, taken from its first message.
    pub subject: String,
    /// Member messages, in order of arrival.
    pub messages: Vec<Message>,
    /// Distinct sender names, in insertion order.
    pub participant_names: Vec<String>,
    /// Timestamp of the most recent member, epoch milliseconds.
    pub last_message_at: i64,
    /// Snippet of the most recent member.
    pub snippet: String,
    /// Number of unread members.
    pub unread_count: u32,
    /// Whether any member is starred.
    pub is_starred: bool,
    /// Folder of the most recently processed member (display grouping only).
    pub folder: Folder,
}

impl Thread {
    /// Seed a new thread aggregate from its first message.
    #[must_use]
    pub fn new(message: &Message) -> Self {
        Self {
            id: message.thread_id.clone(),
            subject: message.subject.clone(),
            messages: vec![message.clone()],
            participant_names: vec![message.from.name.clone()],
            last_message_at: message.timestamp,
            snippet: message.snippet.clone(),
            unread_count: u32::from(!message.is_read),
            is_starred: message.is_starred,
            folder: message.folder,
        }
    }

    /// Fold a newly ingested message into the aggregate.
    ///
    /// Must be called exactly once per distinct message: the unread
    /// increment is only valid for first-time ingestion. Later flag
    /// mutations go through [`Thread::update_member`], which re-derives
    /// the flag-dependent fields instead of incrementing. A message
    /// already present is skipped, so a retried ingest cannot
    /// double-count.
    pub fn fold(&mut self, message: &Message) {
        if self.messages.iter().any(|m| m.id == message.id) {
            return;
        }

        if !self.participant_names.contains(&message.from.name) {
            self.participant_names.push(message.from.name.clone());
        }

        // Last-writer-wins by timestamp; ties favor the incoming message.
        if message.timestamp >= self.last_message_at {
            self.snippet.clone_from(&message.snippet);
        }
        self.last_message_at = self.last_message_at.max(message.timestamp);

        if !message.is_read {
            self.unread_count += 1;
        }
        self.is_starred = self.is_starred || message.is_starred;
        self.folder = message.folder;

        self.messages.push(message.clone());
    }

    /// Replace a member message with its mutated state and re-derive the
    /// flag-dependent aggregate fields.
    ///
    /// Returns `false` when no member has the given id, leaving the
    /// aggregate untouched.
    pub fn update_member(&mut self, message: &Message) -> bool {
        let Some(member) = self.messages.iter_mut().find(|m| m.id == message.id) else {
            return false;
        };

        *member = message.clone();
        self.folder = message.folder;
        self.refresh_flags();
        true
    }

    /// Re-derive `unread_count` and `is_starred` from current member
    /// state.
    pub fn refresh_flags(&mut self) {
        self.unread_count = u32::try_from(
            self.messages.iter().filter(|m| !m.is_read).count(),
        )
        .unwrap_or(u32::MAX);
        self.is_starred = self.messages.iter().any(|m| m.is_starred);
    }

    /// Returns the number of messages in the thread.
    #[must_use]
    pub const fn message_count(&self) -> usize {
        self.messages.len()
    }

    /// Returns a display string for participants (e.g., "Alice, Bob +2 others").
    #[must_use]
    pub fn participants_display(&self) -> String {
        match self.participant_names.len() {
            0 => String::new(),
            1 => self.participant_names[0].clone(),
            2 => format!("{}, {}", self.participant_names[0], self.participant_names[1]),
            n => format!(
                "{}, {} +{} others",
                self.participant_names[0],
                self.participant_names[1],
                n - 2
            ),
        }
    }
}

/// Group messages into threads by repeated fold, most recent thread first.
#[must_use]
pub fn group_threads(messages: &[Message]) -> Vec<Thread> {
    let mut threads: HashMap<String, Thread> = HashMap::new();

    for message in messages {
        if let Some(thread) = threads.get_mut(&message.thread_id) {
            thread.fold(message);
        } else {
            threads.insert(message.thread_id.clone(), Thread::new(message));
        }
    }

    let mut thread_list: Vec<Thread> = threads.into_values().collect();
    thread_list.sort_by(|a, b| {
        b.last_message_at
            .cmp(&a.last_message_at)
            .then_with(|| a.id.cmp(&b.id))
    });
    thread_list
}
