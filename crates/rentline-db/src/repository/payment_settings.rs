//! # Payment Settings Repository
//!
//! The single `payment_settings` row (id = 1). Reading it when absent
//! creates it with [`PaymentSettings::defaults`].

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::DbResult;
use rentline_core::PaymentSettings;

const SELECT_PAYMENT_SETTINGS: &str = r#"
    SELECT
        bank_name, account_holder_name, iban, bic_swift,
        stripe_public_key, stripe_secret_key,
        paypal_business_email, paypal_instructions,
        bank_transfer_enabled, stripe_enabled, paypal_enabled,
        updated_at
    FROM payment_settings
    WHERE id = 1
"#;

/// Repository for the payment settings singleton.
#[derive(Debug, Clone)]
pub struct PaymentSettingsRepository {
    pool: SqlitePool,
}

impl PaymentSettingsRepository {
    /// Creates a new PaymentSettingsRepository.
    pub fn new(pool: SqlitePool) -> Self {
        PaymentSettingsRepository { pool }
    }

    /// Returns the payment settings, creating the default row if needed.
    pub async fn get_or_create_default(&self) -> DbResult<PaymentSettings> {
        if let Some(settings) = self.fetch().await? {
            return Ok(settings);
        }

        let defaults = PaymentSettings::defaults(Utc::now());
        info!("Creating default payment settings");

        // Another request may have created the row meanwhile
        self.write(&defaults, true).await?;

        match self.fetch().await? {
            Some(settings) => Ok(settings),
            None => Ok(defaults),
        }
    }

    /// Replaces the stored payment settings.
    pub async fn update(&self, settings: &PaymentSettings) -> DbResult<PaymentSettings> {
        debug!("Updating payment settings");

        let mut stored = settings.clone();
        stored.updated_at = Utc::now();
        self.write(&stored, false).await?;

        Ok(stored)
    }

    async fn fetch(&self) -> DbResult<Option<PaymentSettings>> {
        let settings = sqlx::query_as::<_, PaymentSettings>(SELECT_PAYMENT_SETTINGS)
            .fetch_optional(&self.pool)
            .await?;

        Ok(settings)
    }

    async fn write(&self, s: &PaymentSettings, keep_existing: bool) -> DbResult<()> {
        let on_conflict = if keep_existing {
            "DO NOTHING"
        } else {
            r#"DO UPDATE SET
                bank_name = excluded.bank_name,
                account_holder_name = excluded.account_holder_name,
                iban = excluded.iban,
                bic_swift = excluded.bic_swift,
                stripe_public_key = excluded.stripe_public_key,
                stripe_secret_key = excluded.stripe_secret_key,
                paypal_business_email = excluded.paypal_business_email,
                paypal_instructions = excluded.paypal_instructions,
                bank_transfer_enabled = excluded.bank_transfer_enabled,
                stripe_enabled = excluded.stripe_enabled,
                paypal_enabled = excluded.paypal_enabled,
                updated_at = excluded.updated_at"#
        };

        let sql = format!(
            r#"
            INSERT INTO payment_settings (
                id, bank_name, account_holder_name, iban, bic_swift,
                stripe_public_key, stripe_secret_key,
                paypal_business_email, paypal_instructions,
                bank_transfer_enabled, stripe_enabled, paypal_enabled,
                updated_at
            ) VALUES (1, ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
            ON CONFLICT(id) {on_conflict}
            "#
        );

        sqlx::query(&sql)
            .bind(&s.bank_name)
            .bind(&s.account_holder_name)
            .bind(&s.iban)
            .bind(&s.bic_swift)
            .bind(&s.stripe_public_key)
            .bind(&s.stripe_secret_key)
            .bind(&s.paypal_business_email)
            .bind(&s.paypal_instructions)
            .bind(s.bank_transfer_enabled)
            .bind(s.stripe_enabled)
            .bind(s.paypal_enabled)
            .bind(s.updated_at)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::{Database, DbConfig};
    use rentline_core::PaymentSettingsPatch;

    #[tokio::test]
    async fn test_defaults_created_once() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.payment_settings();

        let first = repo.get_or_create_default().await.unwrap();
        assert_eq!(first.account_holder_name, "FANDIAUTO");
        assert!(first.bank_transfer_enabled);
        assert!(!first.paypal_enabled);

        let second = repo.get_or_create_default().await.unwrap();
        assert_eq!(first, second);

        let rows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM payment_settings")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(rows, 1);
    }

    #[tokio::test]
    async fn test_update_persists_patch() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.payment_settings();

        let mut settings = repo.get_or_create_default().await.unwrap();
        settings.apply_patch(PaymentSettingsPatch {
            paypal_enabled: Some(true),
            paypal_business_email: Some("pay@fandiauto.com".into()),
            stripe_secret_key: Some("sk_test_123".into()),
            ..Default::default()
        });
        repo.update(&settings).await.unwrap();

        let stored = repo.get_or_create_default().await.unwrap();
        assert!(stored.paypal_enabled);
        assert_eq!(stored.paypal_business_email, "pay@fandiauto.com");
        assert_eq!(stored.stripe_secret_key, "sk_test_123");
        assert_eq!(stored.iban, "DZ00 0000 0000 0000 0000 0000");
    }
}
