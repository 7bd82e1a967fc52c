//! Mailbox query service.

use mailfold_store::{OrderedIndex, RecordStore};
use tracing::{debug, info, warn};

use super::seed;
use crate::clock::now_ms;
use crate::config::MailboxConfig;
use crate::error::{Error, Result};
use crate::id::new_id;
use crate::index::{FolderIndex, message_id_of};
use crate::message::{
    EmailAddress, Folder, FolderView, Message, MessageChange, MessageDraft, validate_message,
};
use crate::thread::{Thread, group_threads};
use crate::user::User;

const KIND_MESSAGE: &str = "message";
const KIND_THREAD: &str = "thread";
const KIND_USER: &str = "user";

/// The public-facing mailbox engine.
///
/// Orchestrates the write path (ingest, mutate) across the record store,
/// the composite folder indexes, and the per-thread aggregates, and
/// answers folder and message queries.
///
/// Message records are the source of truth; index entries are derived and
/// rebuildable, so a write failure after the message persist is recovered
/// by idempotent retry (inside [`FolderIndex`]) or, as a backstop, by
/// [`MailboxService::reconcile`]. Nothing here rolls a message write back.
pub struct MailboxService {
    records: RecordStore,
    index: FolderIndex,
    config: MailboxConfig,
}

impl MailboxService {
    /// Open a mailbox backed by the given database path.
    ///
    /// # Errors
    ///
    /// Returns an error if the database connection fails or schema creation fails.
    pub async fn new(database_path: &str) -> Result<Self> {
        Self::with_config(database_path, MailboxConfig::default()).await
    }

    /// Open a mailbox with explicit configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the database connection fails or schema creation fails.
    pub async fn with_config(database_path: &str, config: MailboxConfig) -> Result<Self> {
        let records = RecordStore::new(database_path).await?;
        let index = OrderedIndex::new(database_path).await?;
        Ok(Self {
            records,
            index: FolderIndex::new(index, config.index_retry_budget),
            config,
        })
    }

    /// Create an in-memory mailbox for testing.
    ///
    /// # Errors
    ///
    /// Returns an error if the database connection fails or schema creation fails.
    pub async fn in_memory() -> Result<Self> {
        let config = MailboxConfig::default();
        let records = RecordStore::in_memory().await?;
        let index = OrderedIndex::in_memory().await?;
        Ok(Self {
            records,
            index: FolderIndex::new(index, config.index_retry_budget),
            config,
        })
    }

    /// List a folder newest-first as a flat sequence of messages.
    ///
    /// `starred` lists starred messages outside the trash; the stored
    /// folders list by exact match. A zero limit selects the configured
    /// default page size.
    ///
    /// # Errors
    ///
    /// Returns an error if storage reads fail.
    pub async fn list_folder(&self, view: FolderView, limit: u32) -> Result<Vec<Message>> {
        let limit = self.config.normalize_limit(limit);
        self.resolve_view(view, limit as usize).await
    }

    /// List a folder newest-first grouped into threads.
    ///
    /// Scans a bounded window of the folder's newest index entries,
    /// groups them by thread id via repeated fold, sorts threads by last
    /// activity, and truncates to `limit`.
    ///
    /// # Errors
    ///
    /// Returns an error if storage reads fail.
    pub async fn list_threads(&self, view: FolderView, limit: u32) -> Result<Vec<Thread>> {
        let limit = self.config.normalize_limit(limit);
        let messages = self
            .resolve_view(view, self.config.thread_scan_window as usize)
            .await?;

        let mut threads = group_threads(&messages);
        threads.truncate(limit as usize);
        Ok(threads)
    }

    /// Fetch a single message by id.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if no such message exists.
    pub async fn get_message(&self, id: &str) -> Result<Message> {
        self.records
            .get(KIND_MESSAGE, id)
            .await?
            .ok_or_else(|| Error::not_found("message", id))
    }

    /// Fetch a stored thread aggregate by id.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if no such thread exists.
    pub async fn get_thread(&self, id: &str) -> Result<Thread> {
        self.records
            .get(KIND_THREAD, id)
            .await?
            .ok_or_else(|| Error::not_found("thread", id))
    }

    /// Ingest a new message: validate, persist, index, and fold into its
    /// thread aggregate.
    ///
    /// An empty thread id marks a new top-level conversation and gets a
    /// fresh id. Returns the message as stored.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] for missing required fields or
    /// a reused message id, [`Error::IndexInconsistency`] if an index
    /// entry could not be written within the retry budget.
    pub async fn ingest(&self, mut message: Message) -> Result<Message> {
        if message.thread_id.trim().is_empty() {
            message.thread_id = new_id();
        }

        validate_message(&message).map_err(|errors| {
            let detail = errors
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("; ");
            Error::InvalidArgument(detail)
        })?;

        if self.records.exists(KIND_MESSAGE, &message.id).await? {
            return Err(Error::InvalidArgument(format!(
                "message id already exists: {}",
                message.id
            )));
        }

        self.records
            .put(KIND_MESSAGE, &message.id, &message)
            .await?;
        self.index.apply(&message, false).await?;

        // The fold runs exactly once per distinct message; flag mutations
        // later re-derive the aggregate instead of folding again.
        let thread = match self.records.get::<Thread>(KIND_THREAD, &message.thread_id).await? {
            Some(mut thread) => {
                thread.fold(&message);
                thread
            }
            None => Thread::new(&message),
        };
        self.records.put(KIND_THREAD, &thread.id, &thread).await?;

        debug!(id = %message.id, thread = %message.thread_id, folder = %message.folder, "ingested message");
        Ok(message)
    }

    /// Apply a set of mutations to a message's mutable state.
    ///
    /// Index entries are moved only where `folder` or `is_starred`
    /// actually changed; the owning thread's flag-derived fields are then
    /// re-derived from member state. Applying an already-applied change
    /// set again leaves storage untouched. An empty change set is a
    /// no-op.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if no such message exists,
    /// [`Error::IndexInconsistency`] if an index entry could not be
    /// moved within the retry budget.
    pub async fn mutate(&self, id: &str, changes: &[MessageChange]) -> Result<Message> {
        let before = self.get_message(id).await?;

        let mut after = before.clone();
        for change in changes {
            after.apply(*change);
        }
        if after == before {
            return Ok(before);
        }

        self.index.apply_transition(&before, &after).await?;
        self.records.put(KIND_MESSAGE, id, &after).await?;

        match self.records.get::<Thread>(KIND_THREAD, &after.thread_id).await? {
            Some(mut thread) => {
                if thread.update_member(&after) {
                    self.records.put(KIND_THREAD, &thread.id, &thread).await?;
                } else {
                    warn!(id, thread = %after.thread_id, "mutated message missing from its thread aggregate");
                }
            }
            None => {
                warn!(id, thread = %after.thread_id, "mutated message has no thread aggregate");
            }
        }

        debug!(id, changes = changes.len(), "mutated message");
        Ok(after)
    }

    /// Compose and ingest an outgoing message into the sent folder.
    ///
    /// The draft's thread id, when present, threads the message into an
    /// existing conversation; otherwise a fresh conversation starts.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if the draft has no recipients.
    pub async fn send(&self, from: EmailAddress, draft: MessageDraft) -> Result<Message> {
        let message = Message {
            id: new_id(),
            thread_id: draft.thread_id.unwrap_or_default(),
            from,
            to: draft.to,
            subject: draft.subject,
            snippet: Message::snippet_of(&draft.body),
            body: draft.body,
            timestamp: now_ms(),
            is_read: true,
            is_starred: false,
            folder: Folder::Sent,
        };

        self.ingest(message).await
    }

    /// Generate an unread inbox message from the fixed simulator sender,
    /// as a stand-in for real inbound delivery.
    ///
    /// # Errors
    ///
    /// Returns an error if the write path fails.
    pub async fn simulate_inbound(&self, subject: &str) -> Result<Message> {
        let body = "Generated automatically for testing.";
        let message = Message {
            id: new_id(),
            thread_id: new_id(),
            from: EmailAddress::new("System Simulator", "sim@aeromail.dev"),
            to: vec![EmailAddress::new("User", "user@aeromail.dev")],
            subject: subject.to_string(),
            snippet: "This is a simulated incoming email.".to_string(),
            body: body.to_string(),
            timestamp: now_ms(),
            is_read: false,
            is_starred: false,
            folder: Folder::Inbox,
        };

        self.ingest(message).await
    }

    /// The mailbox owner profile, if one exists.
    ///
    /// # Errors
    ///
    /// Returns an error if storage reads fail.
    pub async fn current_user(&self) -> Result<Option<User>> {
        let page = self.records.list::<User>(KIND_USER, None, 1).await?;
        Ok(page.items.into_iter().next())
    }

    /// Seed an owner profile and starter conversations into an empty
    /// mailbox. Returns whether anything was seeded.
    ///
    /// Seed ids are fixed, so a run interrupted mid-way is completed by
    /// the next call rather than duplicated.
    ///
    /// # Errors
    ///
    /// Returns an error if the write path fails.
    pub async fn ensure_seed(&self) -> Result<bool> {
        if self.current_user().await?.is_some() {
            return Ok(false);
        }

        // The user record is the seed-complete marker; it is written
        // only after every starter message is in.
        for message in seed::seed_messages(now_ms()) {
            if self.records.exists(KIND_MESSAGE, &message.id).await? {
                continue;
            }
            self.ingest(message).await?;
        }

        let user = seed::seed_user();
        self.records.put(KIND_USER, &user.id, &user).await?;

        info!("seeded mailbox with starter data");
        Ok(true)
    }

    /// Rebuild every folder index from canonical message records.
    ///
    /// The recovery path for a crash between a message persist and its
    /// index update: each view's index is cleared, then re-derived by
    /// walking all stored messages in bounded pages. Returns the number
    /// of messages re-indexed.
    ///
    /// # Errors
    ///
    /// Returns an error if storage reads or index writes fail.
    pub async fn reconcile(&self) -> Result<u64> {
        for view in FolderView::ALL {
            self.index.clear(view).await?;
        }

        let mut cursor: Option<String> = None;
        let mut count: u64 = 0;
        loop {
            let page = self
                .records
                .list::<Message>(KIND_MESSAGE, cursor.as_deref(), self.config.max_page_limit)
                .await?;
            for message in &page.items {
                self.index.apply(message, false).await?;
                count += 1;
            }
            match page.next_cursor {
                Some(next) => cursor = Some(next),
                None => break,
            }
        }

        info!(count, "rebuilt folder indexes from record state");
        Ok(count)
    }

    /// Walk a view's index newest-first and resolve up to `want` live
    /// messages.
    ///
    /// Entries whose message is gone, or whose message no longer
    /// satisfies the view (a stale index is legal; record state is
    /// authoritative), are skipped.
    async fn resolve_view(&self, view: FolderView, want: usize) -> Result<Vec<Message>> {
        let mut messages = Vec::with_capacity(want.min(64));
        let mut cursor: Option<String> = None;

        while messages.len() < want {
            let page = self
                .index
                .page_desc(view, cursor.as_deref(), self.config.max_page_limit)
                .await?;
            if page.items.is_empty() {
                break;
            }

            for key in &page.items {
                if messages.len() >= want {
                    break;
                }
                let Some(id) = message_id_of(key) else {
                    warn!(view = %view, key, "malformed index key");
                    continue;
                };
                match self.records.get::<Message>(KIND_MESSAGE, id).await? {
                    Some(message) if view.matches(&message) => messages.push(message),
                    Some(_) => {
                        debug!(view = %view, id, "skipping stale index entry");
                    }
                    None => {
                        warn!(view = %view, id, "index entry points at missing message");
                    }
                }
            }

            match page.next_cursor {
                Some(next) => cursor = Some(next),
                None => break,
            }
        }

        Ok(messages)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_seed_messages_have_stable_ids() {
        let first: Vec<String> = seed::seed_messages(1000).into_iter().map(|m| m.id).collect();
        let second: Vec<String> = seed::seed_messages(2000).into_iter().map(|m| m.id).collect();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_ensure_seed_resumes_a_partial_seed() {
        let mailbox = MailboxService::in_memory().await.unwrap();

        // A seed run interrupted after one message has written no user
        // record yet.
        let first = seed::seed_messages(now_ms()).remove(0);
        mailbox.ingest(first).await.unwrap();
        assert!(mailbox.current_user().await.unwrap().is_none());

        assert!(mailbox.ensure_seed().await.unwrap());
        assert!(mailbox.current_user().await.unwrap().is_some());

        let expected = seed::seed_messages(now_ms()).len();
        let inbox = mailbox.list_folder(FolderView::Inbox, 0).await.unwrap();
        let sent = mailbox.list_folder(FolderView::Sent, 0).await.unwrap();
        assert_eq!(inbox.len() + sent.len(), expected);
    }
}
