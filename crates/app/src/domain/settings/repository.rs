//! Settings Repository

use nutbasket::pricing::PricingSettings;
use rust_decimal::Decimal;
use rustc_hash::FxHashMap;
use sqlx::{Postgres, Transaction, query, query_as};

use crate::domain::settings::{FREE_SHIPPING_AMOUNT_KEY, SHIPPING_AMOUNT_KEY, TAX_RATE_KEY};

const GET_SETTINGS_SQL: &str = include_str!("sql/get_settings.sql");
const PUT_SETTING_SQL: &str = include_str!("sql/put_setting.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgSettingsRepository;

impl PgSettingsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    /// Load the pricing parameters. Keys that were never set read as zero.
    pub(crate) async fn get_pricing_settings(
        &self,
        tx: &mut Transaction<'_, Postgres>,
    ) -> Result<PricingSettings, sqlx::Error> {
        let keys = [TAX_RATE_KEY, SHIPPING_AMOUNT_KEY, FREE_SHIPPING_AMOUNT_KEY];

        let rows: Vec<(String, String)> = query_as(GET_SETTINGS_SQL)
            .bind(&keys[..])
            .fetch_all(&mut **tx)
            .await?;

        let values: FxHashMap<String, String> = rows.into_iter().collect();

        Ok(PricingSettings {
            tax_rate: decimal_setting(&values, TAX_RATE_KEY)?,
            shipping_flat: decimal_setting(&values, SHIPPING_AMOUNT_KEY)?,
            free_shipping_threshold: decimal_setting(&values, FREE_SHIPPING_AMOUNT_KEY)?,
        })
    }

    pub(crate) async fn put_pricing_settings(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        settings: &PricingSettings,
    ) -> Result<(), sqlx::Error> {
        for (key, value) in [
            (TAX_RATE_KEY, settings.tax_rate),
            (SHIPPING_AMOUNT_KEY, settings.shipping_flat),
            (FREE_SHIPPING_AMOUNT_KEY, settings.free_shipping_threshold),
        ] {
            query(PUT_SETTING_SQL)
                .bind(key)
                .bind(value.normalize().to_string())
                .execute(&mut **tx)
                .await?;
        }

        Ok(())
    }
}

fn decimal_setting(values: &FxHashMap<String, String>, key: &str) -> Result<Decimal, sqlx::Error> {
    values
        .get(key)
        .map(|value| value.trim().parse::<Decimal>())
        .transpose()
        .map(Option::unwrap_or_default)
        .map_err(|e| sqlx::Error::ColumnDecode {
            index: key.to_string(),
            source: Box::new(e),
        })
}

#[cfg(test)]
mod tests {
    use rust_decimal::dec;
    use testresult::TestResult;

    use super::*;

    #[test]
    fn missing_settings_read_as_zero() -> TestResult {
        let values = FxHashMap::default();

        assert_eq!(decimal_setting(&values, TAX_RATE_KEY)?, Decimal::ZERO);

        Ok(())
    }

    #[test]
    fn stored_settings_are_trimmed_and_parsed() -> TestResult {
        let values = FxHashMap::from_iter([(TAX_RATE_KEY.to_string(), " 18.5 ".to_string())]);

        assert_eq!(decimal_setting(&values, TAX_RATE_KEY)?, dec!(18.5));

        Ok(())
    }

    #[test]
    fn garbage_settings_fail_to_decode() {
        let values = FxHashMap::from_iter([(SHIPPING_AMOUNT_KEY.to_string(), "free".to_string())]);

        assert!(matches!(
            decimal_setting(&values, SHIPPING_AMOUNT_KEY),
            Err(sqlx::Error::ColumnDecode { .. })
        ));
    }
}
