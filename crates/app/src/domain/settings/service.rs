//! Settings service.

use async_trait::async_trait;
use mockall::automock;
use nutbasket::pricing::PricingSettings;
use rust_decimal::Decimal;
use tracing::info;

use crate::{
    database::Db,
    domain::settings::{
        FREE_SHIPPING_AMOUNT_KEY, SHIPPING_AMOUNT_KEY, TAX_RATE_KEY,
        errors::SettingsServiceError, repository::PgSettingsRepository,
    },
};

#[derive(Debug, Clone)]
pub struct PgSettingsService {
    db: Db,
    repository: PgSettingsRepository,
}

impl PgSettingsService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            repository: PgSettingsRepository::new(),
        }
    }
}

#[async_trait]
impl SettingsService for PgSettingsService {
    async fn pricing_settings(&self) -> Result<PricingSettings, SettingsServiceError> {
        let mut tx = self.db.begin().await?;

        let settings = self.repository.get_pricing_settings(&mut tx).await?;

        tx.commit().await?;

        Ok(settings)
    }

    #[tracing::instrument(
        name = "settings.service.update_pricing_settings",
        skip(self, settings),
        fields(
            tax_rate = %settings.tax_rate,
            shipping_amount = %settings.shipping_flat,
            free_shipping_amount = %settings.free_shipping_threshold
        ),
        err
    )]
    async fn update_pricing_settings(
        &self,
        settings: PricingSettings,
    ) -> Result<PricingSettings, SettingsServiceError> {
        for (key, value) in [
            (TAX_RATE_KEY, settings.tax_rate),
            (SHIPPING_AMOUNT_KEY, settings.shipping_flat),
            (FREE_SHIPPING_AMOUNT_KEY, settings.free_shipping_threshold),
        ] {
            if value < Decimal::ZERO {
                return Err(SettingsServiceError::NegativeValue(key));
            }
        }

        let mut tx = self.db.begin().await?;

        self.repository
            .put_pricing_settings(&mut tx, &settings)
            .await?;

        let stored = self.repository.get_pricing_settings(&mut tx).await?;

        tx.commit().await?;

        info!("updated pricing settings");

        Ok(stored)
    }
}

#[automock]
#[async_trait]
pub trait SettingsService: Send + Sync {
    /// Current tax rate, flat shipping charge and free shipping threshold.
    async fn pricing_settings(&self) -> Result<PricingSettings, SettingsServiceError>;

    /// Replace all pricing settings at once.
    async fn update_pricing_settings(
        &self,
        settings: PricingSettings,
    ) -> Result<PricingSettings, SettingsServiceError>;
}
