//! Composite folder indexes.
//!
//! One ordered index per folder, keyed so lexicographic order equals
//! chronological order, plus the virtual "starred" index for starred,
//! non-trashed messages. The indexes hold derived sort keys only; the
//! authoritative read/star/folder flags always live in the message
//! record, so a stale entry is recoverable, never fatal.

mod key;

pub use key::{message_id_of, sort_key};

use mailfold_store::{OrderedIndex, Page};
use tracing::warn;

use crate::error::{Error, Result};
use crate::message::{FolderView, Message};

/// Maintains the per-folder indexes and the derived "starred" index.
pub struct FolderIndex {
    index: OrderedIndex,
    retry_budget: u32,
}

impl FolderIndex {
    /// Wrap an ordered-index store with the given retry budget for
    /// transient add/remove failures.
    #[must_use]
    pub const fn new(index: OrderedIndex, retry_budget: u32) -> Self {
        Self {
            index,
            retry_budget: if retry_budget == 0 { 1 } else { retry_budget },
        }
    }

    /// The index entries a message's current state produces: its folder's
    /// entry, plus the "starred" entry when starred outside the trash.
    #[must_use]
    pub fn entries_for(message: &Message) -> Vec<(&'static str, String)> {
        let key = sort_key(message.timestamp, &message.id);
        let mut entries = vec![(message.folder.as_str(), key.clone())];
        if FolderView::Starred.matches(message) {
            entries.push((FolderView::Starred.as_str(), key));
        }
        entries
    }

    /// Add (`removing = false`) or remove (`removing = true`) every index
    /// entry for a message's current state.
    ///
    /// Both directions are idempotent, so the whole call is safe to
    /// repeat after a partial failure.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IndexInconsistency`] when an entry keeps failing
    /// past the retry budget.
    pub async fn apply(&self, message: &Message, removing: bool) -> Result<()> {
        for (name, key) in Self::entries_for(message) {
            self.apply_entry(name, &key, removing).await?;
        }
        Ok(())
    }

    /// Move a message's index entries from its previous state to its new
    /// state, touching only entries that actually changed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IndexInconsistency`] when an entry keeps failing
    /// past the retry budget.
    pub async fn apply_transition(&self, before: &Message, after: &Message) -> Result<()> {
        let old = Self::entries_for(before);
        let new = Self::entries_for(after);

        for (name, key) in &old {
            if !new.iter().any(|(n, k)| n == name && k == key) {
                self.apply_entry(name, key, true).await?;
            }
        }
        for (name, key) in &new {
            if !old.iter().any(|(n, k)| n == name && k == key) {
                self.apply_entry(name, key, false).await?;
            }
        }
        Ok(())
    }

    /// Fetch the newest `limit` keys of a view's index, descending.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying index read fails.
    pub async fn page_desc(
        &self,
        view: FolderView,
        cursor: Option<&str>,
        limit: u32,
    ) -> Result<Page<String>> {
        Ok(self.index.page_desc(view.as_str(), cursor, limit).await?)
    }

    /// Drop every entry of a view's index, ahead of a rebuild.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying index write fails.
    pub async fn clear(&self, view: FolderView) -> Result<()> {
        Ok(self.index.clear(view.as_str()).await?)
    }

    /// Number of entries in a view's index.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying index read fails.
    pub async fn len(&self, view: FolderView) -> Result<u64> {
        Ok(self.index.len(view.as_str()).await?)
    }

    /// One idempotent add/remove, retried within the budget.
    async fn apply_entry(&self, name: &str, key: &str, removing: bool) -> Result<()> {
        let mut attempt = 0;
        loop {
            let result = if removing {
                self.index.remove(name, key).await
            } else {
                self.index.add(name, key).await
            };

            match result {
                Ok(()) => return Ok(()),
                Err(e) => {
                    attempt += 1;
                    if attempt >= self.retry_budget {
                        let op = if removing { "remove" } else { "add" };
                        return Err(Error::IndexInconsistency(format!(
                            "{op} of {key} on index {name} failed after {attempt} attempts: {e}"
                        )));
                    }
                    warn!(index = name, key, attempt, error = %e, "index update failed, retrying");
                }
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::message::{EmailAddress, Folder};

    fn message(id: &str, timestamp: i64, is_starred: bool, folder: Folder) -> Message {
        Message {
            id: id.to_string(),
            thread_id: "t1".to_string(),
            from: EmailAddress::new("Alice", "alice@example.com"),
            to: vec![EmailAddress::new("User", "user@example.com")],
            subject: "Hi".to_string(),
            body: "Hello".to_string(),
            snippet: "Hello".to_string(),
            timestamp,
            is_read: false,
            is_starred,
            folder,
        }
    }

    async fn folder_index() -> FolderIndex {
        FolderIndex::new(OrderedIndex::in_memory().await.unwrap(), 3)
    }

    #[test]
    fn test_entries_for_plain_message() {
        let entries = FolderIndex::entries_for(&message("m1", 42, false, Folder::Inbox));
        assert_eq!(entries, vec![("inbox", sort_key(42, "m1"))]);
    }

    #[test]
    fn test_entries_for_starred_message() {
        let entries = FolderIndex::entries_for(&message("m1", 42, true, Folder::Inbox));
        assert_eq!(
            entries,
            vec![
                ("inbox", sort_key(42, "m1")),
                ("starred", sort_key(42, "m1")),
            ]
        );
    }

    #[test]
    fn test_entries_for_starred_trash_has_no_starred_entry() {
        let entries = FolderIndex::entries_for(&message("m1", 42, true, Folder::Trash));
        assert_eq!(entries, vec![("trash", sort_key(42, "m1"))]);
    }

    #[tokio::test]
    async fn test_apply_and_remove() {
        let index = folder_index().await;
        let starred = message("m1", 42, true, Folder::Inbox);

        index.apply(&starred, false).await.unwrap();
        assert_eq!(index.len(FolderView::Inbox).await.unwrap(), 1);
        assert_eq!(index.len(FolderView::Starred).await.unwrap(), 1);

        index.apply(&starred, true).await.unwrap();
        assert_eq!(index.len(FolderView::Inbox).await.unwrap(), 0);
        assert_eq!(index.len(FolderView::Starred).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_apply_is_idempotent() {
        let index = folder_index().await;
        let starred = message("m1", 42, true, Folder::Inbox);

        index.apply(&starred, false).await.unwrap();
        index.apply(&starred, false).await.unwrap();

        assert_eq!(index.len(FolderView::Inbox).await.unwrap(), 1);
        assert_eq!(index.len(FolderView::Starred).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_transition_star_then_unstar() {
        let index = folder_index().await;
        let plain = message("m1", 42, false, Folder::Inbox);
        let starred = message("m1", 42, true, Folder::Inbox);

        index.apply(&plain, false).await.unwrap();
        index.apply_transition(&plain, &starred).await.unwrap();
        assert_eq!(index.len(FolderView::Starred).await.unwrap(), 1);

        index.apply_transition(&starred, &plain).await.unwrap();
        assert_eq!(index.len(FolderView::Starred).await.unwrap(), 0);
        assert_eq!(index.len(FolderView::Inbox).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_transition_move_to_trash_drops_starred_entry() {
        let index = folder_index().await;
        let starred = message("m1", 42, true, Folder::Inbox);
        let mut trashed = starred.clone();
        trashed.folder = Folder::Trash;

        index.apply(&starred, false).await.unwrap();
        index.apply_transition(&starred, &trashed).await.unwrap();

        assert_eq!(index.len(FolderView::Inbox).await.unwrap(), 0);
        assert_eq!(index.len(FolderView::Starred).await.unwrap(), 0);
        assert_eq!(index.len(FolderView::Trash).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_apply_surfaces_inconsistency_after_retry_budget() {
        let backend = OrderedIndex::in_memory().await.unwrap();
        backend.close().await;
        let index = FolderIndex::new(backend, 3);
        let starred = message("m1", 42, true, Folder::Inbox);

        match index.apply(&starred, false).await.unwrap_err() {
            Error::IndexInconsistency(detail) => {
                assert!(detail.contains("after 3 attempts"), "{detail}");
            }
            other => panic!("expected index inconsistency, got {other}"),
        }

        // The removal direction goes through the same budget.
        assert!(matches!(
            index.apply(&starred, true).await.unwrap_err(),
            Error::IndexInconsistency(_)
        ));
    }

    #[tokio::test]
    async fn test_reapply_completes_a_partial_write() {
        let index = folder_index().await;
        let starred = message("m1", 42, true, Folder::Inbox);

        // Only the folder entry landed before an interruption.
        index.index.add("inbox", &sort_key(42, "m1")).await.unwrap();

        index.apply(&starred, false).await.unwrap();
        assert_eq!(index.len(FolderView::Inbox).await.unwrap(), 1);
        assert_eq!(index.len(FolderView::Starred).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_transition_noop_when_nothing_changed() {
        let index = folder_index().await;
        let plain = message("m1", 42, false, Folder::Inbox);

        index.apply(&plain, false).await.unwrap();
        index.apply_transition(&plain, &plain).await.unwrap();

        assert_eq!(index.len(FolderView::Inbox).await.unwrap(), 1);
    }
}
