//! Message model types.

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Maximum number of characters in a derived snippet.
const SNIPPET_CHARS: usize = 100;

/// A named email address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailAddress {
    /// Display name.
    pub name: String,
    /// Address, e.g. `user@example.com`.
    pub address: String,
}

impl EmailAddress {
    /// Create a new address.
    #[must_use]
    pub fn new(name: &str, address: &str) -> Self {
        Self {
            name: name.to_string(),
            address: address.to_string(),
        }
    }
}

/// Stored folder of a message.
///
/// "starred" is deliberately absent: it is a derived view over these
/// folders, never a stored value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Folder {
    /// Incoming mail.
    #[default]
    Inbox,
    /// Mail sent by the user.
    Sent,
    /// Deleted mail.
    Trash,
}

impl Folder {
    /// All stored folders.
    pub const ALL: [Self; 3] = [Self::Inbox, Self::Sent, Self::Trash];

    /// Stable string name, used as index name and wire value.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Inbox => "inbox",
            Self::Sent => "sent",
            Self::Trash => "trash",
        }
    }
}

impl std::str::FromStr for Folder {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "inbox" => Ok(Self::Inbox),
            "sent" => Ok(Self::Sent),
            "trash" => Ok(Self::Trash),
            other => Err(Error::InvalidArgument(format!(
                "unsupported folder: {other}"
            ))),
        }
    }
}

impl std::fmt::Display for Folder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A listable view over the mailbox: the stored folders plus the derived
/// "starred" view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FolderView {
    /// Messages with `folder == inbox`.
    Inbox,
    /// Messages with `folder == sent`.
    Sent,
    /// Messages with `folder == trash`.
    Trash,
    /// Starred messages outside the trash.
    Starred,
}

impl FolderView {
    /// All listable views.
    pub const ALL: [Self; 4] = [Self::Inbox, Self::Sent, Self::Trash, Self::Starred];

    /// Stable string name, used as index name and wire value.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Inbox => "inbox",
            Self::Sent => "sent",
            Self::Trash => "trash",
            Self::Starred => "starred",
        }
    }

    /// The view that lists a stored folder.
    #[must_use]
    pub const fn of(folder: Folder) -> Self {
        match folder {
            Folder::Inbox => Self::Inbox,
            Folder::Sent => Self::Sent,
            Folder::Trash => Self::Trash,
        }
    }

    /// Whether a message's current state belongs in this view.
    #[must_use]
    pub fn matches(&self, message: &Message) -> bool {
        match self {
            Self::Inbox => message.folder == Folder::Inbox,
            Self::Sent => message.folder == Folder::Sent,
            Self::Trash => message.folder == Folder::Trash,
            Self::Starred => message.is_starred && message.folder != Folder::Trash,
        }
    }
}

impl std::str::FromStr for FolderView {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "inbox" => Ok(Self::Inbox),
            "sent" => Ok(Self::Sent),
            "trash" => Ok(Self::Trash),
            "starred" => Ok(Self::Starred),
            other => Err(Error::InvalidArgument(format!(
                "unsupported folder: {other}"
            ))),
        }
    }
}

impl std::fmt::Display for FolderView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single email message.
///
/// Only `is_read`, `is_starred`, and `folder` are mutable after creation;
/// everything else is fixed at ingest time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    /// Unique identifier.
    pub id: String,
    /// Conversation this message belongs to. Never empty.
    pub thread_id: String,
    /// Sender.
    pub from: EmailAddress,
    /// Recipients, in order.
    pub to: Vec<EmailAddress>,
    /// Subject line.
    pub subject: String,
    /// Full body text.
    pub body: String,
    /// Short preview derived from the body.
    pub snippet: String,
    /// Creation time, epoch milliseconds. Set once, never mutated.
    pub timestamp: i64,
    /// Whether the message has been read.
    pub is_read: bool,
    /// Whether the message is starred.
    pub is_starred: bool,
    /// Stored folder.
    pub folder: Folder,
}

impl Message {
    /// Derive a snippet from a body: the first [`SNIPPET_CHARS`]
    /// characters of the first non-empty line.
    #[must_use]
    pub fn snippet_of(body: &str) -> String {
        let line = body
            .lines()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .unwrap_or_default();

        if line.chars().count() <= SNIPPET_CHARS {
            line.to_string()
        } else {
            let mut snippet: String = line.chars().take(SNIPPET_CHARS).collect();
            snippet.push_str("...");
            snippet
        }
    }

    /// Apply one mutation to this message's mutable state.
    pub const fn apply(&mut self, change: MessageChange) {
        match change {
            MessageChange::SetReadState(is_read) => self.is_read = is_read,
            MessageChange::SetStarred(is_starred) => self.is_starred = is_starred,
            MessageChange::MoveToFolder(folder) => self.folder = folder,
        }
    }
}

/// The closed set of allowed message mutations.
///
/// Immutable fields (sender, recipients, subject, body, timestamp,
/// thread id) are not representable here, so a patch cannot touch them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageChange {
    /// Mark the message read or unread.
    SetReadState(bool),
    /// Star or unstar the message.
    SetStarred(bool),
    /// Move the message to another stored folder.
    MoveToFolder(Folder),
}

/// Input for composing a new outgoing message.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageDraft {
    /// Recipients.
    pub to: Vec<EmailAddress>,
    /// Subject line.
    pub subject: String,
    /// Body text.
    pub body: String,
    /// Existing conversation to reply into, if any. A fresh thread id is
    /// generated when absent.
    pub thread_id: Option<String>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_folder_roundtrip() {
        for folder in Folder::ALL {
            assert_eq!(Folder::from_str(folder.as_str()).unwrap(), folder);
        }
    }

    #[test]
    fn test_folder_view_roundtrip() {
        for view in FolderView::ALL {
            assert_eq!(FolderView::from_str(view.as_str()).unwrap(), view);
        }
    }

    #[test]
    fn test_unsupported_folder_is_rejected() {
        assert!(Folder::from_str("starred").is_err());
        assert!(FolderView::from_str("archive").is_err());
    }

    #[test]
    fn test_starred_view_excludes_trash() {
        let mut message = Message {
            id: "m1".to_string(),
            thread_id: "t1".to_string(),
            from: EmailAddress::new("Alice", "alice@example.com"),
            to: vec![EmailAddress::new("Bob", "bob@example.com")],
            subject: "Hi".to_string(),
            body: "Hello".to_string(),
            snippet: "Hello".to_string(),
            timestamp: 1000,
            is_read: false,
            is_starred: true,
            folder: Folder::Inbox,
        };

        assert!(FolderView::Starred.matches(&message));
        assert!(FolderView::Inbox.matches(&message));

        message.folder = Folder::Trash;
        assert!(!FolderView::Starred.matches(&message));
        assert!(FolderView::Trash.matches(&message));
    }

    #[test]
    fn test_snippet_of_short_body() {
        assert_eq!(Message::snippet_of("Hello there"), "Hello there");
    }

    #[test]
    fn test_snippet_of_skips_blank_lines() {
        assert_eq!(Message::snippet_of("\n\n  First real line\nmore"), "First real line");
    }

    #[test]
    fn test_snippet_of_truncates_long_body() {
        let body = "x".repeat(300);
        let snippet = Message::snippet_of(&body);
        assert_eq!(snippet.chars().count(), 103);
        assert!(snippet.ends_with("..."));
    }

    #[test]
    fn test_apply_changes() {
        let mut message = Message {
            id: "m1".to_string(),
            thread_id: "t1".to_string(),
            from: EmailAddress::new("Alice", "alice@example.com"),
            to: vec![],
            subject: String::new(),
            body: String::new(),
            snippet: String::new(),
            timestamp: 1,
            is_read: false,
            is_starred: false,
            folder: Folder::Inbox,
        };

        message.apply(MessageChange::SetReadState(true));
        message.apply(MessageChange::SetStarred(true));
        message.apply(MessageChange::MoveToFolder(Folder::Trash));

        assert!(message.is_read);
        assert!(message.is_starred);
        assert_eq!(message.folder, Folder::Trash);
    }
}
