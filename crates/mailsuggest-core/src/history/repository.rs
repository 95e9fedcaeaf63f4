//! Recipient history storage in `SQLite`.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use sqlx::Row;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions, SqliteRow};
use tracing::info;

use super::model::{RecipientKind, RecipientRecord};
use super::store::RecipientStore;
use crate::{Error, Result};

/// Repository for recipient history storage and retrieval.
pub struct SqliteHistoryStore {
    pool: SqlitePool,
}

impl SqliteHistoryStore {
    /// Create a new repository with the given database path.
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

        let repo = Self { pool };
        repo.initialize().await?;
        Ok(repo)
    }

    /// Create an in-memory repository for testing.
    ///
    /// # Errors
    ///
    /// Returns an error if the database connection fails or schema creation fails.
    pub async fn in_memory() -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;

        let repo = Self { pool };
        repo.initialize().await?;
        Ok(repo)
    }

    /// Initialize database schema.
    async fn initialize(&self) -> Result<()> {
        // email uses the default BINARY collation: removal is case-sensitive
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS recipient_history (
                email TEXT PRIMARY KEY NOT NULL,
                position INTEGER NOT NULL,
                name TEXT NOT NULL DEFAULT '',
                use_count INTEGER NOT NULL DEFAULT 0,
                last_used TEXT NOT NULL DEFAULT '',
                kind TEXT NOT NULL DEFAULT 'person'
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r"
            CREATE INDEX IF NOT EXISTS idx_recipient_history_position
            ON recipient_history(position)
            ",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Record a use of a recipient.
    ///
    /// The first existing entry (email compared case-insensitively, lowest
    /// position) gets its use count incremented, `last_used` refreshed and its
    /// name replaced when `name` is not empty. Other case variants of the address
    /// are left alone. A new entry is appended with a use count of 1.
    ///
    /// # Errors
    ///
    /// Returns an error if `email` is blank or the database query fails.
    pub async fn record(&self, name: &str, email: &str, kind: RecipientKind) -> Result<()> {
        let email = email.trim();
        let name = name.trim();
        if email.is_empty() {
            return Err(Error::InvalidRecipient("email address is empty".into()));
        }
        let now = Utc::now().to_rfc3339();

        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query(
            r"
            UPDATE recipient_history SET
                name = CASE WHEN ? != '' THEN ? ELSE name END,
                use_count = use_count + 1,
                last_used = ?,
                kind = ?
            WHERE rowid = (
                SELECT rowid FROM recipient_history
                WHERE LOWER(email) = LOWER(?)
                ORDER BY position ASC
                LIMIT 1
            )
            ",
        )
        .bind(name)
        .bind(name)
        .bind(&now)
        .bind(kind.as_str())
        .bind(email)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if updated == 0 {
            sqlx::query(
                r"
                INSERT INTO recipient_history (email, position, name, use_count, last_used, kind)
                VALUES (?, (SELECT COALESCE(MAX(position) + 1, 0) FROM recipient_history), ?, 1, ?, ?)
                ",
            )
            .bind(email)
            .bind(name)
            .bind(&now)
            .bind(kind.as_str())
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// Remove recipients whose email exactly matches one of `emails`.
    ///
    /// Returns the number of removed entries.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn remove(&self, emails: &HashSet<String>) -> Result<u64> {
        let mut tx = self.pool.begin().await?;
        let mut removed = 0;

        for email in emails {
            removed += sqlx::query("DELETE FROM recipient_history WHERE email = ?")
                .bind(email)
                .execute(&mut *tx)
                .await?
                .rows_affected();
        }

        tx.commit().await?;
        Ok(removed)
    }

    /// Count stored recipients.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn count(&self) -> Result<u64> {
        let row = sqlx::query("SELECT COUNT(*) AS total FROM recipient_history")
            .fetch_one(&self.pool)
            .await?;

        Ok(u64::try_from(row.get::<i64, _>("total")).unwrap_or(0))
    }
}

impl RecipientStore for SqliteHistoryStore {
    async fn load(&self) -> Result<Vec<RecipientRecord>> {
        let rows = sqlx::query(
            r"
            SELECT name, email, use_count, last_used, kind
            FROM recipient_history
            ORDER BY position ASC
            ",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(record_from_row).collect())
    }

    async fn save(&self, records: &[RecipientRecord]) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM recipient_history")
            .execute(&mut *tx)
            .await?;

        let mut position: i64 = 0;
        for record in records {
            // Later duplicates of an address keep the first entry's position
            sqlx::query(
                r"
                INSERT INTO recipient_history (email, position, name, use_count, last_used, kind)
                VALUES (?, ?, ?, ?, ?, ?)
                ON CONFLICT(email) DO UPDATE SET
                    name = excluded.name,
                    use_count = excluded.use_count,
                    last_used = excluded.last_used,
                    kind = excluded.kind
                ",
            )
            .bind(&record.email)
            .bind(position)
            .bind(&record.name)
            .bind(i64::from(record.use_count))
            .bind(record.last_used.to_rfc3339())
            .bind(record.kind.as_str())
            .execute(&mut *tx)
            .await?;
            position += 1;
        }

        tx.commit().await?;
        info!(count = records.len(), "Recipient history saved");
        Ok(())
    }
}

fn record_from_row(row: &SqliteRow) -> RecipientRecord {
    let last_used: String = row.get("last_used");
    let kind: String = row.get("kind");

    RecipientRecord {
        name: row.get("name"),
        email: row.get("email"),
        use_count: u32::try_from(row.get::<i64, _>("use_count")).unwrap_or(0),
        last_used: DateTime::parse_from_rfc3339(&last_used)
            .map(|time| time.with_timezone(&Utc))
            .unwrap_or_default(),
        kind: RecipientKind::parse(&kind),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_record_and_load() {
        let repo = SqliteHistoryStore::in_memory().await.unwrap();

        repo.record("Alice Smith", "alice@example.com", RecipientKind::Person)
            .await
            .unwrap();
        repo.record("Bob Jones", "bob@example.com", RecipientKind::Person)
            .await
            .unwrap();

        let records = repo.load().await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].email, "alice@example.com");
        assert_eq!(records[0].name, "Alice Smith");
        assert_eq!(records[0].use_count, 1);
        assert_eq!(records[1].email, "bob@example.com");
    }

    #[tokio::test]
    async fn test_increment_use_count() {
        let repo = SqliteHistoryStore::in_memory().await.unwrap();

        repo.record("Test User", "test@example.com", RecipientKind::Person)
            .await
            .unwrap();
        repo.record("", "TEST@example.com", RecipientKind::Person)
            .await
            .unwrap();
        repo.record("", "test@example.com", RecipientKind::Person)
            .await
            .unwrap();

        let records = repo.load().await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].use_count, 3);
        // Name and stored spelling should be preserved
        assert_eq!(records[0].name, "Test User");
        assert_eq!(records[0].email, "test@example.com");
    }

    #[tokio::test]
    async fn test_record_updates_first_case_variant_only() {
        let repo = SqliteHistoryStore::in_memory().await.unwrap();
        let history = vec![
            RecipientRecord::new("Bob", "Bob@x.com").with_use_count(1),
            RecipientRecord::new("bob", "bob@x.com").with_use_count(1),
        ];
        repo.save(&history).await.unwrap();

        repo.record("", "BOB@X.COM", RecipientKind::Person)
            .await
            .unwrap();

        let mut expected = history;
        assert!(crate::history::record_use(
            &mut expected,
            "",
            "BOB@X.COM",
            RecipientKind::Person,
            Utc::now(),
        ));

        let loaded = repo.load().await.unwrap();
        let counts: Vec<u32> = loaded.iter().map(|r| r.use_count).collect();
        assert_eq!(counts, vec![2, 1]);
        let expected_counts: Vec<u32> = expected.iter().map(|r| r.use_count).collect();
        assert_eq!(counts, expected_counts);
        assert_eq!(loaded[0].email, "Bob@x.com");
    }

    #[tokio::test]
    async fn test_record_rejects_blank_email() {
        let repo = SqliteHistoryStore::in_memory().await.unwrap();

        let result = repo.record("Nobody", "  ", RecipientKind::Person).await;
        assert!(matches!(result, Err(Error::InvalidRecipient(_))));
    }

    #[tokio::test]
    async fn test_save_replaces_and_keeps_order() {
        let repo = SqliteHistoryStore::in_memory().await.unwrap();
        repo.record("Old", "old@example.com", RecipientKind::Person)
            .await
            .unwrap();

        let last_used = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        let records = vec![
            RecipientRecord::new("Zed", "zed@example.com")
                .with_use_count(4)
                .with_last_used(last_used),
            RecipientRecord::new("Team", "team@example.com")
                .with_kind(RecipientKind::DistributionList),
        ];
        repo.save(&records).await.unwrap();

        let loaded = repo.load().await.unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].email, "zed@example.com");
        assert_eq!(loaded[0].use_count, 4);
        assert_eq!(loaded[0].last_used, last_used);
        assert_eq!(loaded[1].kind, RecipientKind::DistributionList);
    }

    #[tokio::test]
    async fn test_remove_is_case_sensitive() {
        let repo = SqliteHistoryStore::in_memory().await.unwrap();
        repo.record("Bob", "bob@x.com", RecipientKind::Person)
            .await
            .unwrap();
        repo.record("Alice", "alice@x.com", RecipientKind::Person)
            .await
            .unwrap();

        let upper: HashSet<String> = ["BOB@X.COM".to_string()].into();
        assert_eq!(repo.remove(&upper).await.unwrap(), 0);

        let exact: HashSet<String> = ["bob@x.com".to_string()].into();
        assert_eq!(repo.remove(&exact).await.unwrap(), 1);

        assert_eq!(repo.count().await.unwrap(), 1);
        assert_eq!(repo.load().await.unwrap()[0].email, "alice@x.com");
    }
}
