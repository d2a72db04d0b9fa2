//! # Settings Repository
//!
//! Load and replace the single store settings document.

use chrono::Utc;
use souq_core::Settings;
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::DbResult;

/// Row id of the one settings document.
const SETTINGS_ROW_ID: i64 = 1;

/// Repository for the settings document.
#[derive(Debug, Clone)]
pub struct SettingsRepository {
    pool: SqlitePool,
}

impl SettingsRepository {
    /// Creates a new SettingsRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SettingsRepository { pool }
    }

    /// Loads the stored document, or `None` on a fresh database.
    ///
    /// Selectable lists reconcile while decoding, so a hand-edited row with
    /// a dangling default comes back with that default cleared.
    pub async fn load(&self) -> DbResult<Option<Settings>> {
        let document: Option<String> =
            sqlx::query_scalar("SELECT document FROM settings WHERE id = ?1")
                .bind(SETTINGS_ROW_ID)
                .fetch_optional(&self.pool)
                .await?;

        match document {
            Some(json) => {
                debug!(bytes = json.len(), "Settings document loaded");
                Ok(Some(serde_json::from_str(&json)?))
            }
            None => Ok(None),
        }
    }

    /// Replaces the whole document (last write wins).
    pub async fn replace(&self, settings: &Settings) -> DbResult<()> {
        let json = serde_json::to_string(settings)?;

        sqlx::query(
            r#"
            INSERT INTO settings (id, document, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(id) DO UPDATE SET
                document = excluded.document,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(SETTINGS_ROW_ID)
        .bind(&json)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        info!(bytes = json.len(), "Settings document replaced");
        Ok(())
    }

    /// Writes the document only if none is stored yet.
    ///
    /// ## Returns
    /// * `true` - The document was written
    /// * `false` - A document already existed and was left alone
    pub async fn seed(&self, settings: &Settings) -> DbResult<bool> {
        let json = serde_json::to_string(settings)?;

        let result = sqlx::query(
            "INSERT OR IGNORE INTO settings (id, document, updated_at) VALUES (?1, ?2, ?3)",
        )
        .bind(SETTINGS_ROW_ID)
        .bind(&json)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use crate::{Database, DbConfig};
    use souq_core::{Currency, Settings};

    async fn db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    #[tokio::test]
    async fn test_load_from_fresh_database() {
        let db = db().await;
        assert!(db.settings().load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_replace_is_last_write_wins() {
        let db = db().await;
        let repo = db.settings();

        let mut first = Settings::with_defaults();
        first.site.name = "First".to_string();
        repo.replace(&first).await.unwrap();

        let mut second = Settings::with_defaults();
        second.site.name = "Second".to_string();
        repo.replace(&second).await.unwrap();

        let loaded = repo.load().await.unwrap().unwrap();
        assert_eq!(loaded, second);

        let rows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM settings")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(rows, 1);
    }

    #[tokio::test]
    async fn test_seed_does_not_overwrite() {
        let db = db().await;
        let repo = db.settings();

        let mut custom = Settings::with_defaults();
        custom.common.page_size = 24;
        assert!(repo.seed(&custom).await.unwrap());
        assert!(!repo.seed(&Settings::with_defaults()).await.unwrap());

        let loaded = repo.load().await.unwrap().unwrap();
        assert_eq!(loaded.common.page_size, 24);
    }

    #[tokio::test]
    async fn test_load_reconciles_dangling_default() {
        let db = db().await;
        let repo = db.settings();
        repo.replace(&Settings::with_defaults()).await.unwrap();

        // Drop SAR behind the repository's back, leaving default = "SAR"
        sqlx::query("UPDATE settings SET document = json_remove(document, '$.currencies.entries[0]')")
            .execute(db.pool())
            .await
            .unwrap();

        let loaded = repo.load().await.unwrap().unwrap();
        let codes: Vec<&str> = loaded
            .currencies
            .entries()
            .iter()
            .map(|c: &Currency| c.code.as_str())
            .collect();
        assert_eq!(codes, vec!["USD"]);
        assert_eq!(loaded.currencies.default_key(), None);
    }
}
