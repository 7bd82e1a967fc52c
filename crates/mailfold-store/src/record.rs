//! Key-value record storage.

use serde::Serialize;
use serde::de::DeserializeOwned;
use sqlx::Row;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};

use crate::page::Page;
use crate::Result;

/// Durable key-value storage of entities, keyed by `(kind, id)`.
///
/// Values are stored as JSON text; the caller chooses the concrete type
/// on both ends. Operations on a single `(kind, id)` are serialized by
/// the underlying database; no cross-key transaction is offered.
pub struct RecordStore {
    pool: SqlitePool,
}

impl RecordStore {
    /// Create a new store with the given database path.
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

        let store = Self { pool };
        store.initialize().await?;
        Ok(store)
    }

    /// Create an in-memory store for testing.
    ///
    /// # Errors
    ///
    /// Returns an error if the database connection fails or schema creation fails.
    pub async fn in_memory() -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;

        let store = Self { pool };
        store.initialize().await?;
        Ok(store)
    }

    /// Initialize database schema.
    async fn initialize(&self) -> Result<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS records (
                kind TEXT NOT NULL,
                id TEXT NOT NULL,
                value TEXT NOT NULL,
                PRIMARY KEY (kind, id)
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Store a record, replacing any existing value for the same key.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the database query fails.
    pub async fn put<T: Serialize>(&self, kind: &str, id: &str, value: &T) -> Result<()> {
        let body = serde_json::to_string(value)?;

        sqlx::query(
            r"
            INSERT INTO records (kind, id, value)
            VALUES (?, ?, ?)
            ON CONFLICT(kind, id) DO UPDATE SET
                value = excluded.value
            ",
        )
        .bind(kind)
        .bind(id)
        .bind(body)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Fetch a record by key.
    ///
    /// Returns `None` if the key does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query or deserialization fails.
    pub async fn get<T: DeserializeOwned>(&self, kind: &str, id: &str) -> Result<Option<T>> {
        let row = sqlx::query(r"SELECT value FROM records WHERE kind = ? AND id = ?")
            .bind(kind)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => {
                let body: String = row.get("value");
                Ok(Some(serde_json::from_str(&body)?))
            }
            None => Ok(None),
        }
    }

    /// Delete a record. No-op if the key does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn delete(&self, kind: &str, id: &str) -> Result<()> {
        sqlx::query(r"DELETE FROM records WHERE kind = ? AND id = ?")
            .bind(kind)
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Check whether a record exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn exists(&self, kind: &str, id: &str) -> Result<bool> {
        let row = sqlx::query(
            r"SELECT COUNT(*) as count FROM records WHERE kind = ? AND id = ?",
        )
        .bind(kind)
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        let count: i64 = row.get("count");
        Ok(count > 0)
    }

    /// List records of a kind in ascending id order, one bounded page at
    /// a time.
    ///
    /// Pass `None` as the cursor to start from the beginning; pass the
    /// returned `next_cursor` to resume.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query or deserialization fails.
    pub async fn list<T: DeserializeOwned>(
        &self,
        kind: &str,
        cursor: Option<&str>,
        limit: u32,
    ) -> Result<Page<T>> {
        // Fetch one extra row to learn whether another page exists.
        let rows = sqlx::query(
            r"
            SELECT id, value FROM records
            WHERE kind = ? AND (? IS NULL OR id > ?)
            ORDER BY id ASC
            LIMIT ?
            ",
        )
        .bind(kind)
        .bind(cursor)
        .bind(cursor)
        .bind(i64::from(limit) + 1)
        .fetch_all(&self.pool)
        .await?;

        let has_more = rows.len() > limit as usize;
        let mut items = Vec::with_capacity(rows.len().min(limit as usize));
        let mut last_id = None;

        for row in rows.iter().take(limit as usize) {
            let id: String = row.get("id");
            let body: String = row.get("value");
            items.push(serde_json::from_str(&body)?);
            last_id = Some(id);
        }

        Ok(Page {
            items,
            next_cursor: if has_more { last_id } else { None },
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    struct Note {
        id: String,
        text: String,
    }

    fn note(id: &str, text: &str) -> Note {
        Note {
            id: id.to_string(),
            text: text.to_string(),
        }
    }

    #[tokio::test]
    async fn test_put_and_get() {
        let store = RecordStore::in_memory().await.unwrap();

        let value = note("n1", "hello");
        store.put("note", "n1", &value).await.unwrap();

        let loaded: Option<Note> = store.get("note", "n1").await.unwrap();
        assert_eq!(loaded, Some(value));
    }

    #[tokio::test]
    async fn test_get_missing_returns_none() {
        let store = RecordStore::in_memory().await.unwrap();

        let loaded: Option<Note> = store.get("note", "nope").await.unwrap();
        assert!(loaded.is_none());
    }

    #[tokio::test]
    async fn test_put_overwrites() {
        let store = RecordStore::in_memory().await.unwrap();

        store.put("note", "n1", &note("n1", "first")).await.unwrap();
        store.put("note", "n1", &note("n1", "second")).await.unwrap();

        let loaded: Option<Note> = store.get("note", "n1").await.unwrap();
        assert_eq!(loaded.unwrap().text, "second");
    }

    #[tokio::test]
    async fn test_delete_and_exists() {
        let store = RecordStore::in_memory().await.unwrap();

        store.put("note", "n1", &note("n1", "x")).await.unwrap();
        assert!(store.exists("note", "n1").await.unwrap());

        store.delete("note", "n1").await.unwrap();
        assert!(!store.exists("note", "n1").await.unwrap());

        // Deleting again is a no-op.
        store.delete("note", "n1").await.unwrap();
    }

    #[tokio::test]
    async fn test_kinds_are_isolated() {
        let store = RecordStore::in_memory().await.unwrap();

        store.put("note", "n1", &note("n1", "x")).await.unwrap();
        assert!(!store.exists("draft", "n1").await.unwrap());
    }

    #[tokio::test]
    async fn test_list_pages_in_id_order() {
        let store = RecordStore::in_memory().await.unwrap();

        for id in ["c", "a", "b", "d", "e"] {
            store.put("note", id, &note(id, id)).await.unwrap();
        }

        let first: Page<Note> = store.list("note", None, 2).await.unwrap();
        assert_eq!(
            first.items.iter().map(|n| n.id.as_str()).collect::<Vec<_>>(),
            vec!["a", "b"]
        );
        let cursor = first.next_cursor.unwrap();

        let second: Page<Note> = store.list("note", Some(&cursor), 2).await.unwrap();
        assert_eq!(
            second.items.iter().map(|n| n.id.as_str()).collect::<Vec<_>>(),
            vec!["c", "d"]
        );

        let third: Page<Note> = store
            .list("note", second.next_cursor.as_deref(), 2)
            .await
            .unwrap();
        assert_eq!(third.items.len(), 1);
        assert!(third.next_cursor.is_none());
    }
}
