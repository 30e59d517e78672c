/// SQL query functions for database operations

use crate::db::models::*;
use crate::db::Database;
use crate::error::Result;
use chrono::Utc;
use sqlx::Row;

/// Values kept per kind in `query_values`
pub const MAX_VALUES_PER_KIND: i64 = 20;

impl Database {
    /// Append a finished command to the history
    ///
    /// # Returns
    /// * `Ok(i64)` - The command ID
    /// * `Err(LdapieError)` - If database operation fails
    pub async fn record_command(&self, record: CommandRecord) -> Result<i64> {
        let result = sqlx::query(
            r#"
            INSERT INTO commands (session_id, raw_text, intent, succeeded, timestamp)
            VALUES (?, ?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(&record.session_id)
        .bind(&record.raw_text)
        .bind(record.intent.map(|intent| intent.name()))
        .bind(record.succeeded)
        .bind(Utc::now().to_rfc3339())
        .fetch_one(self.pool())
        .await?;

        Ok(result.get(0))
    }

    /// Most recent commands first
    pub async fn get_recent_commands(&self, limit: i64) -> Result<Vec<StoredCommand>> {
        let commands = sqlx::query_as::<_, StoredCommand>(
            "SELECT * FROM commands ORDER BY id DESC LIMIT ?",
        )
        .bind(limit)
        .fetch_all(self.pool())
        .await?;

        Ok(commands)
    }

    /// Commands of one session, oldest first
    pub async fn get_session_commands(&self, session_id: &str) -> Result<Vec<StoredCommand>> {
        let commands = sqlx::query_as::<_, StoredCommand>(
            "SELECT * FROM commands WHERE session_id = ? ORDER BY id ASC",
        )
        .bind(session_id)
        .fetch_all(self.pool())
        .await?;

        Ok(commands)
    }

    /// Search commands by text (case-insensitive), most recent first
    pub async fn search_commands(&self, query: &str, limit: i64) -> Result<Vec<StoredCommand>> {
        let pattern = format!("%{}%", query);

        let commands = sqlx::query_as::<_, StoredCommand>(
            "SELECT * FROM commands WHERE raw_text LIKE ? ORDER BY id DESC LIMIT ?",
        )
        .bind(&pattern)
        .bind(limit)
        .fetch_all(self.pool())
        .await?;

        Ok(commands)
    }

    /// Remember a host, base DN or filter.
    ///
    /// Re-using a value moves it to the front. Only the
    /// [`MAX_VALUES_PER_KIND`] most recent values of each kind are kept.
    pub async fn record_value(&self, kind: ValueKind, value: &str) -> Result<()> {
        let value = value.trim();
        if value.is_empty() {
            return Ok(());
        }

        let mut tx = self.pool().begin().await?;

        sqlx::query(
            r#"
            INSERT INTO query_values (kind, value, usage_count, last_used, touched)
            VALUES (?, ?, 1, ?, (SELECT COALESCE(MAX(touched), 0) + 1 FROM query_values))
            ON CONFLICT(kind, value) DO UPDATE SET
                usage_count = usage_count + 1,
                last_used = excluded.last_used,
                touched = excluded.touched
            "#,
        )
        .bind(kind.as_str())
        .bind(value)
        .bind(Utc::now().to_rfc3339())
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            DELETE FROM query_values
            WHERE kind = ? AND value NOT IN (
                SELECT value FROM query_values WHERE kind = ? ORDER BY touched DESC LIMIT ?
            )
            "#,
        )
        .bind(kind.as_str())
        .bind(kind.as_str())
        .bind(MAX_VALUES_PER_KIND)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(())
    }

    /// Remembered values of one kind, most recently used first
    pub async fn get_values(&self, kind: ValueKind, limit: i64) -> Result<Vec<QueryValue>> {
        let values = sqlx::query_as::<_, QueryValue>(
            "SELECT kind, value, usage_count, last_used FROM query_values WHERE kind = ? ORDER BY touched DESC LIMIT ?",
        )
        .bind(kind.as_str())
        .bind(limit)
        .fetch_all(self.pool())
        .await?;

        Ok(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intelligence::Intent;

    fn record(session: &str, text: &str, intent: Option<Intent>, succeeded: bool) -> CommandRecord {
        CommandRecord {
            session_id: session.to_string(),
            raw_text: text.to_string(),
            intent,
            succeeded,
        }
    }

    #[tokio::test]
    async fn test_record_and_retrieve_command() {
        let db = Database::new_in_memory().await.unwrap();

        let id = db
            .record_command(record("s1", "search host dc=x", Some(Intent::Search), true))
            .await
            .unwrap();
        assert!(id > 0);

        let recent = db.get_recent_commands(10).await.unwrap();
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].raw_text, "search host dc=x");
        assert_eq!(recent[0].intent(), Some(Intent::Search));
        assert!(recent[0].succeeded);
    }

    #[tokio::test]
    async fn test_get_recent_commands() {
        let db = Database::new_in_memory().await.unwrap();

        for i in 1..=5 {
            db.record_command(record("s1", &format!("info host{}", i), Some(Intent::Info), true))
                .await
                .unwrap();
        }

        let recent = db.get_recent_commands(3).await.unwrap();
        assert_eq!(recent.len(), 3);
        // Most recent should be first
        assert_eq!(recent[0].raw_text, "info host5");
    }

    #[tokio::test]
    async fn test_session_commands() {
        let db = Database::new_in_memory().await.unwrap();

        db.record_command(record("a", "info one", Some(Intent::Info), true)).await.unwrap();
        db.record_command(record("b", "serch", None, false)).await.unwrap();
        db.record_command(record("a", "info two", Some(Intent::Info), true)).await.unwrap();

        let commands = db.get_session_commands("a").await.unwrap();
        let texts: Vec<_> = commands.iter().map(|c| c.raw_text.as_str()).collect();
        assert_eq!(texts, vec!["info one", "info two"]);

        let stats = db.stats().await.unwrap();
        assert_eq!(stats.total_commands, 3);
        assert_eq!(stats.succeeded_commands, 2);
        assert_eq!(stats.sessions, 2);
    }

    #[tokio::test]
    async fn test_search_commands() {
        let db = Database::new_in_memory().await.unwrap();

        for cmd in ["search host dc=x", "search host dc=y", "info host"] {
            db.record_command(record("s", cmd, None, true)).await.unwrap();
        }

        let results = db.search_commands("SEARCH", 10).await.unwrap();
        assert_eq!(results.len(), 2);
    }

    #[tokio::test]
    async fn test_record_value_moves_to_front() {
        let db = Database::new_in_memory().await.unwrap();

        db.record_value(ValueKind::Host, "a.example.com").await.unwrap();
        db.record_value(ValueKind::Host, "b.example.com").await.unwrap();
        db.record_value(ValueKind::Host, "a.example.com").await.unwrap();
        db.record_value(ValueKind::Base, "dc=example,dc=com").await.unwrap();

        let hosts = db.get_values(ValueKind::Host, 10).await.unwrap();
        let names: Vec<_> = hosts.iter().map(|v| v.value.as_str()).collect();
        assert_eq!(names, vec!["a.example.com", "b.example.com"]);
        assert_eq!(hosts[0].usage_count, 2);

        let bases = db.get_values(ValueKind::Base, 10).await.unwrap();
        assert_eq!(bases.len(), 1);
    }

    #[tokio::test]
    async fn test_values_are_capped_per_kind() {
        let db = Database::new_in_memory().await.unwrap();

        for i in 0..25 {
            db.record_value(ValueKind::Filter, &format!("(cn=user{})", i)).await.unwrap();
        }
        db.record_value(ValueKind::Host, "kept.example.com").await.unwrap();

        let filters = db.get_values(ValueKind::Filter, 100).await.unwrap();
        assert_eq!(filters.len(), MAX_VALUES_PER_KIND as usize);
        assert_eq!(filters[0].value, "(cn=user24)");
        assert!(filters.iter().all(|v| v.value != "(cn=user0)"));

        let hosts = db.get_values(ValueKind::Host, 100).await.unwrap();
        assert_eq!(hosts.len(), 1);
    }

    #[tokio::test]
    async fn test_blank_values_are_ignored() {
        let db = Database::new_in_memory().await.unwrap();
        db.record_value(ValueKind::Host, "   ").await.unwrap();
        assert!(db.get_values(ValueKind::Host, 10).await.unwrap().is_empty());
    }
}
