//! # Setting Repository
//!
//! Key/value settings (contact phone, company name, ...). Values are stored
//! as text with a type tag; decoding lives on [`Setting::typed_value`].

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use rentline_core::{Setting, SettingType};

/// Repository for settings.
#[derive(Debug, Clone)]
pub struct SettingRepository {
    pool: SqlitePool,
}

impl SettingRepository {
    /// Creates a new SettingRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SettingRepository { pool }
    }

    /// Lists every setting, ordered by key.
    pub async fn list(&self) -> DbResult<Vec<Setting>> {
        let settings = sqlx::query_as::<_, Setting>(
            "SELECT key, value, type, description FROM settings ORDER BY key",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(settings)
    }

    /// Gets a setting by key.
    pub async fn get(&self, key: &str) -> DbResult<Option<Setting>> {
        let setting = sqlx::query_as::<_, Setting>(
            "SELECT key, value, type, description FROM settings WHERE key = ?1",
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;

        Ok(setting)
    }

    /// Creates or replaces a setting.
    ///
    /// A `None` description keeps the stored one on update.
    ///
    /// ## Returns
    /// * `Ok((setting, true))` - A new key was created
    /// * `Ok((setting, false))` - An existing key was updated
    pub async fn upsert(
        &self,
        key: &str,
        value: &str,
        kind: SettingType,
        description: Option<&str>,
    ) -> DbResult<(Setting, bool)> {
        debug!(key = %key, kind = ?kind, "Upserting setting");

        let mut tx = self.pool.begin().await?;

        let existed: Option<i64> = sqlx::query_scalar("SELECT 1 FROM settings WHERE key = ?1")
            .bind(key)
            .fetch_optional(&mut *tx)
            .await?;

        sqlx::query(
            r#"
            INSERT INTO settings (key, value, type, description)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                type = excluded.type,
                description = COALESCE(excluded.description, settings.description)
            "#,
        )
        .bind(key)
        .bind(value)
        .bind(kind)
        .bind(description)
        .execute(&mut *tx)
        .await?;

        let setting = sqlx::query_as::<_, Setting>(
            "SELECT key, value, type, description FROM settings WHERE key = ?1",
        )
        .bind(key)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok((setting, existed.is_none()))
    }

    /// Inserts a setting only if the key is absent.
    ///
    /// ## Returns
    /// * `true` if the row was created
    pub async fn insert_if_absent(
        &self,
        key: &str,
        value: &str,
        kind: SettingType,
        description: Option<&str>,
    ) -> DbResult<bool> {
        let result = sqlx::query(
            "INSERT INTO settings (key, value, type, description) VALUES (?1, ?2, ?3, ?4) \
             ON CONFLICT(key) DO NOTHING",
        )
        .bind(key)
        .bind(value)
        .bind(kind)
        .bind(description)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use crate::{Database, DbConfig};
    use rentline_core::SettingType;

    #[tokio::test]
    async fn test_upsert_reports_creation() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.settings();

        let (s, created) = repo
            .upsert("contact_phone", "+213 771 39 14 80", SettingType::String, Some("Contact phone number"))
            .await
            .unwrap();
        assert!(created);
        assert_eq!(s.value, "+213 771 39 14 80");

        let (s, created) = repo
            .upsert("contact_phone", "+213 555 00 00 00", SettingType::String, None)
            .await
            .unwrap();
        assert!(!created);
        assert_eq!(s.value, "+213 555 00 00 00");
        assert_eq!(s.description.as_deref(), Some("Contact phone number"));
    }

    #[tokio::test]
    async fn test_get_and_list() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.settings();
        assert!(repo.get("company_name").await.unwrap().is_none());

        repo.upsert("b", "2", SettingType::Number, None).await.unwrap();
        repo.upsert("a", "true", SettingType::Boolean, None).await.unwrap();

        let keys: Vec<_> = repo.list().await.unwrap().into_iter().map(|s| s.key).collect();
        assert_eq!(keys, vec!["a", "b"]);
        assert_eq!(repo.get("b").await.unwrap().unwrap().kind, SettingType::Number);
    }

    #[tokio::test]
    async fn test_insert_if_absent_keeps_existing() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.settings();
        repo.upsert("company_name", "Custom", SettingType::String, None).await.unwrap();

        let created = repo
            .insert_if_absent("company_name", "FANDIAUTO", SettingType::String, None)
            .await
            .unwrap();
        assert!(!created);
        assert_eq!(repo.get("company_name").await.unwrap().unwrap().value, "Custom");
    }
}
