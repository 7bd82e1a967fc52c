//! Ordered string-key indexes.

use sqlx::Row;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};

use crate::page::Page;
use crate::Result;

/// Named sorted sets of opaque string keys.
///
/// Keys within one index are compared as plain strings, so any ordering
/// the caller wants must be encoded into the key itself (the mailbox
/// engine uses zero-padded timestamps for this). `add` and `remove` are
/// idempotent, which makes them safe to retry after a partial failure.
pub struct OrderedIndex {
    pool: SqlitePool,
}

impl OrderedIndex {
    /// Create a new index store with the given database path.
    ///
    /// Creates the database and tables if they don't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the database connection fails or schema creation fails.
    pub async fn new(database_path: &str) -> Result<Self> {
        let url = format!("sqlite:{database_path}?mode=rwc");
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(&url)
            .await?;

        let index = Self { pool };
        index.initialize().await?;
        Ok(index)
    }

    /// Create an in-memory index store for testing.
    ///
    /// # Errors
    ///
    /// Returns an error if the database connection fails or schema creation fails.
    pub async fn in_memory() -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;

        let index = Self { pool };
        index.initialize().await?;
        Ok(index)
    }

    /// Initialize database schema.
    async fn initialize(&self) -> Result<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS index_entries (
                index_name TEXT NOT NULL,
                sort_key TEXT NOT NULL,
                PRIMARY KEY (index_name, sort_key)
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Insert a key into a named index. Idempotent if already present.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn add(&self, index: &str, key: &str) -> Result<()> {
        sqlx::query(
            r"
            INSERT INTO index_entries (index_name, sort_key)
            VALUES (?, ?)
            ON CONFLICT(index_name, sort_key) DO NOTHING
            ",
        )
        .bind(index)
        .bind(key)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Remove a key from a named index. No-op if absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn remove(&self, index: &str, key: &str) -> Result<()> {
        sqlx::query(r"DELETE FROM index_entries WHERE index_name = ? AND sort_key = ?")
            .bind(index)
            .bind(key)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Check whether a key is present in a named index.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn contains(&self, index: &str, key: &str) -> Result<bool> {
        let row = sqlx::query(
            r"
            SELECT COUNT(*) as count
            FROM index_entries
            WHERE index_name = ? AND sort_key = ?
            ",
        )
        .bind(index)
        .bind(key)
        .fetch_one(&self.pool)
        .await?;

        let count: i64 = row.get("count");
        Ok(count > 0)
    }

    /// Number of keys in a named index.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn len(&self, index: &str) -> Result<u64> {
        let row = sqlx::query(
            r"SELECT COUNT(*) as count FROM index_entries WHERE index_name = ?",
        )
        .bind(index)
        .fetch_one(&self.pool)
        .await?;

        let count: i64 = row.get("count");
        Ok(count.unsigned_abs())
    }

    /// Fetch up to `limit` keys in ascending lexicographic order,
    /// starting strictly after `cursor` (`None` = from the start).
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn page(
        &self,
        index: &str,
        cursor: Option<&str>,
        limit: u32,
    ) -> Result<Page<String>> {
        let rows = sqlx::query(
            r"
            SELECT sort_key FROM index_entries
            WHERE index_name = ? AND (? IS NULL OR sort_key > ?)
            ORDER BY sort_key ASC
            LIMIT ?
            ",
        )
        .bind(index)
        .bind(cursor)
        .bind(cursor)
        .bind(i64::from(limit) + 1)
        .fetch_all(&self.pool)
        .await?;

        Ok(page_from_rows(&rows, limit))
    }

    /// Fetch up to `limit` keys in descending lexicographic order,
    /// starting strictly before `cursor` (`None` = from the end).
    ///
    /// With timestamp-prefixed keys this yields the most recent entries
    /// first at a cost proportional to the page, not the index.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn page_desc(
        &self,
        index: &str,
        cursor: Option<&str>,
        limit: u32,
    ) -> Result<Page<String>> {
        let rows = sqlx::query(
            r"
            SELECT sort_key FROM index_entries
            WHERE index_name = ? AND (? IS NULL OR sort_key < ?)
            ORDER BY sort_key DESC
            LIMIT ?
            ",
        )
        .bind(index)
        .bind(cursor)
        .bind(cursor)
        .bind(i64::from(limit) + 1)
        .fetch_all(&self.pool)
        .await?;

        Ok(page_from_rows(&rows, limit))
    }

    /// Close the underlying connection pool.
    ///
    /// Every operation on this index fails once closed.
    pub async fn close(&self) {
        self.pool.close().await;
    }

    /// Remove every key from a named index.
    ///
    /// Used when rebuilding an index from canonical record state.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn clear(&self, index: &str) -> Result<()> {
        sqlx::query(r"DELETE FROM index_entries WHERE index_name = ?")
            .bind(index)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

fn page_from_rows(rows: &[sqlx::sqlite::SqliteRow], limit: u32) -> Page<String> {
    let has_more = rows.len() > limit as usize;
    let items: Vec<String> = rows
        .iter()
        .take(limit as usize)
        .map(|row| row.get("sort_key"))
        .collect();
    let next_cursor = if has_more {
        items.last().cloned()
    } else {
        None
    };

    Page { items, next_cursor }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_add_is_idempotent() {
        let index = OrderedIndex::in_memory().await.unwrap();

        index.add("inbox", "001:a").await.unwrap();
        index.add("inbox", "001:a").await.unwrap();

        assert_eq!(index.len("inbox").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_remove_absent_is_noop() {
        let index = OrderedIndex::in_memory().await.unwrap();

        index.remove("inbox", "missing").await.unwrap();
        assert_eq!(index.len("inbox").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_page_ascending_with_cursor() {
        let index = OrderedIndex::in_memory().await.unwrap();

        for key in ["003:c", "001:a", "002:b", "004:d"] {
            index.add("inbox", key).await.unwrap();
        }

        let first = index.page("inbox", None, 2).await.unwrap();
        assert_eq!(first.items, vec!["001:a", "002:b"]);

        let second = index
            .page("inbox", first.next_cursor.as_deref(), 2)
            .await
            .unwrap();
        assert_eq!(second.items, vec!["003:c", "004:d"]);
        assert!(second.next_cursor.is_none());
    }

    #[tokio::test]
    async fn test_page_desc_returns_latest_first() {
        let index = OrderedIndex::in_memory().await.unwrap();

        for key in ["001:a", "003:c", "002:b"] {
            index.add("inbox", key).await.unwrap();
        }

        let page = index.page_desc("inbox", None, 2).await.unwrap();
        assert_eq!(page.items, vec!["003:c", "002:b"]);

        let rest = index
            .page_desc("inbox", page.next_cursor.as_deref(), 2)
            .await
            .unwrap();
        assert_eq!(rest.items, vec!["001:a"]);
    }

    #[tokio::test]
    async fn test_indexes_are_isolated() {
        let index = OrderedIndex::in_memory().await.unwrap();

        index.add("inbox", "001:a").await.unwrap();
        index.add("sent", "002:b").await.unwrap();

        assert!(index.contains("inbox", "001:a").await.unwrap());
        assert!(!index.contains("sent", "001:a").await.unwrap());
    }

    #[tokio::test]
    async fn test_clear() {
        let index = OrderedIndex::in_memory().await.unwrap();

        index.add("inbox", "001:a").await.unwrap();
        index.add("inbox", "002:b").await.unwrap();
        index.clear("inbox").await.unwrap();

        assert_eq!(index.len("inbox").await.unwrap(), 0);
    }
}
