//! Coupons service.

use async_trait::async_trait;
use jiff::civil::Date;
use mockall::automock;
use nutbasket::coupons::{CouponStatus, normalize_code};
use rust_decimal::Decimal;
use tracing::{Span, info};

use crate::{
    database::Db,
    domain::{
        coupons::{
            data::NewCoupon,
            errors::CouponsServiceError,
            records::{CouponRecord, CouponSummary, CouponUuid, CouponValidation},
            repository::PgCouponsRepository,
            validation::{CouponLock, check_coupon},
        },
        users::UserUuid,
    },
};

#[derive(Debug, Clone)]
pub struct PgCouponsService {
    db: Db,
    repository: PgCouponsRepository,
}

impl PgCouponsService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            repository: PgCouponsRepository::new(),
        }
    }
}

#[async_trait]
impl CouponsService for PgCouponsService {
    #[tracing::instrument(
        name = "coupons.service.validate_coupon",
        skip(self, code, subtotal),
        fields(
            code = %normalize_code(code),
            subtotal = %subtotal,
            valid = tracing::field::Empty
        ),
        err
    )]
    async fn validate_coupon(
        &self,
        code: &str,
        subtotal: Decimal,
        user: Option<UserUuid>,
        today: Date,
    ) -> Result<CouponValidation, CouponsServiceError> {
        let mut tx = self.db.begin().await?;

        let validation = check_coupon(
            &self.repository,
            &mut tx,
            code,
            subtotal,
            user,
            today,
            CouponLock::Shared,
        )
        .await?;

        tx.commit().await?;

        Span::current().record("valid", validation.is_valid());

        Ok(validation)
    }

    #[tracing::instrument(
        name = "coupons.service.create_coupon",
        skip(self, coupon),
        fields(coupon_uuid = %coupon.uuid, discount_type = %coupon.discount_type),
        err
    )]
    async fn create_coupon(&self, coupon: NewCoupon) -> Result<CouponRecord, CouponsServiceError> {
        let code = normalize_code(&coupon.code);

        if code.is_empty() {
            return Err(CouponsServiceError::MissingRequiredData);
        }

        let mut tx = self.db.begin().await?;

        let created = self
            .repository
            .create_coupon(&mut tx, NewCoupon { code, ..coupon })
            .await?;

        tx.commit().await?;

        info!(code = %created.code, "created coupon");

        Ok(created)
    }

    #[tracing::instrument(
        name = "coupons.service.set_coupon_status",
        skip(self, coupon, status),
        fields(coupon_uuid = %coupon, status = %status),
        err
    )]
    async fn set_coupon_status(
        &self,
        coupon: CouponUuid,
        status: CouponStatus,
    ) -> Result<CouponRecord, CouponsServiceError> {
        let mut tx = self.db.begin().await?;

        let updated = self
            .repository
            .set_coupon_status(&mut tx, coupon, status)
            .await?;

        tx.commit().await?;

        Ok(updated)
    }

    async fn get_coupon(&self, coupon: CouponUuid) -> Result<CouponRecord, CouponsServiceError> {
        let mut tx = self.db.begin().await?;

        let coupon = self.repository.get_coupon(&mut tx, coupon).await?;

        tx.commit().await?;

        Ok(coupon)
    }

    async fn list_coupons(&self) -> Result<Vec<CouponSummary>, CouponsServiceError> {
        let mut tx = self.db.begin().await?;

        let coupons = self.repository.list_coupons(&mut tx).await?;

        tx.commit().await?;

        Ok(coupons)
    }
}

#[automock]
#[async_trait]
pub trait CouponsService: Send + Sync {
    /// Check whether `code` can be applied to a cart worth `subtotal` today. Rejections are
    /// returned as [`CouponValidation::Invalid`], not as errors.
    async fn validate_coupon(
        &self,
        code: &str,
        subtotal: Decimal,
        user: Option<UserUuid>,
        today: Date,
    ) -> Result<CouponValidation, CouponsServiceError>;

    /// Create a coupon. Codes are stored trimmed and upper-cased.
    async fn create_coupon(&self, coupon: NewCoupon) -> Result<CouponRecord, CouponsServiceError>;

    async fn set_coupon_status(
        &self,
        coupon: CouponUuid,
        status: CouponStatus,
    ) -> Result<CouponRecord, CouponsServiceError>;

    async fn get_coupon(&self, coupon: CouponUuid) -> Result<CouponRecord, CouponsServiceError>;

    /// Every coupon, newest first, with its redemption count.
    async fn list_coupons(&self) -> Result<Vec<CouponSummary>, CouponsServiceError>;
}

#[cfg(test)]
mod tests {
    use jiff::civil::date;
    use nutbasket::coupons::{CouponRejection, DiscountType};
    use rust_decimal::dec;
    use testresult::TestResult;

    use crate::test::{TestContext, helpers::new_coupon};

    use super::*;

    const TODAY: Date = date(2026, 3, 15);

    async fn rejection(
        ctx: &TestContext,
        code: &str,
        subtotal: Decimal,
    ) -> Result<Option<CouponRejection>, CouponsServiceError> {
        let validation = ctx
            .coupons
            .validate_coupon(code, subtotal, Some(UserUuid::new()), TODAY)
            .await?;

        Ok(match validation {
            CouponValidation::Valid(_) => None,
            CouponValidation::Invalid(rejection) => Some(rejection),
        })
    }

    #[tokio::test]
    async fn valid_coupon_carries_its_discount() -> TestResult {
        let ctx = TestContext::new().await;

        let coupon = ctx
            .coupons
            .create_coupon(NewCoupon {
                max_discount_amount: Some(dec!(20)),
                ..new_coupon("save10", DiscountType::Percentage, dec!(10))
            })
            .await?;

        let validation = ctx
            .coupons
            .validate_coupon("  Save10 ", dec!(300), None, TODAY)
            .await?;

        let CouponValidation::Valid(applied) = validation else {
            panic!("expected a valid coupon, got {validation:?}");
        };

        assert_eq!(applied.uuid, coupon.uuid);
        assert_eq!(applied.code, "SAVE10");
        assert_eq!(applied.discount.max_discount, Some(dec!(20)));
        assert_eq!(CouponValidation::Valid(applied).message(), "Coupon applied.");

        Ok(())
    }

    #[tokio::test]
    async fn unknown_code_is_not_found() -> TestResult {
        let ctx = TestContext::new().await;

        let validation = ctx
            .coupons
            .validate_coupon("NOPE", dec!(100), None, TODAY)
            .await?;

        assert_eq!(validation.message(), "Coupon not found.");

        Ok(())
    }

    #[tokio::test]
    async fn coupon_that_expired_yesterday_is_rejected() -> TestResult {
        let ctx = TestContext::new().await;

        ctx.coupons
            .create_coupon(NewCoupon {
                valid_to: Some(date(2026, 3, 14)),
                ..new_coupon("LASTDAY", DiscountType::Fixed, dec!(50))
            })
            .await?;

        let validation = ctx
            .coupons
            .validate_coupon("LASTDAY", dec!(1000), None, TODAY)
            .await?;

        assert_eq!(validation, CouponValidation::Invalid(CouponRejection::Expired));
        assert_eq!(validation.message(), "Coupon has expired.");

        Ok(())
    }

    #[tokio::test]
    async fn rules_reject_in_order() -> TestResult {
        let ctx = TestContext::new().await;

        let inactive = ctx
            .coupons
            .create_coupon(NewCoupon {
                valid_to: Some(date(2026, 1, 1)),
                ..new_coupon("OFF", DiscountType::Fixed, dec!(5))
            })
            .await?;
        ctx.coupons
            .set_coupon_status(inactive.uuid, CouponStatus::Inactive)
            .await?;

        ctx.coupons
            .create_coupon(NewCoupon {
                valid_from: Some(date(2026, 4, 1)),
                ..new_coupon("SOON", DiscountType::Fixed, dec!(5))
            })
            .await?;

        ctx.coupons
            .create_coupon(NewCoupon {
                min_order_amount: dec!(500),
                ..new_coupon("BIGBASKET", DiscountType::Fixed, dec!(5))
            })
            .await?;

        // Inactive wins over expired.
        assert_eq!(
            rejection(&ctx, "off", dec!(100)).await?,
            Some(CouponRejection::Inactive)
        );
        assert_eq!(
            rejection(&ctx, "soon", dec!(100)).await?,
            Some(CouponRejection::NotYetActive)
        );
        assert_eq!(
            rejection(&ctx, "bigbasket", dec!(499.99)).await?,
            Some(CouponRejection::MinimumNotMet)
        );
        assert_eq!(rejection(&ctx, "bigbasket", dec!(500)).await?, None);

        Ok(())
    }

    #[tokio::test]
    async fn create_coupon_rejects_duplicate_codes_ignoring_case() -> TestResult {
        let ctx = TestContext::new().await;

        ctx.coupons
            .create_coupon(new_coupon("WELCOME", DiscountType::Fixed, dec!(25)))
            .await?;

        let result = ctx
            .coupons
            .create_coupon(new_coupon("welcome", DiscountType::Fixed, dec!(30)))
            .await;

        assert!(
            matches!(result, Err(CouponsServiceError::AlreadyExists)),
            "expected AlreadyExists, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn create_coupon_rejects_percentages_over_one_hundred() {
        let ctx = TestContext::new().await;

        let result = ctx
            .coupons
            .create_coupon(new_coupon("GREEDY", DiscountType::Percentage, dec!(150)))
            .await;

        assert!(
            matches!(result, Err(CouponsServiceError::InvalidData)),
            "expected InvalidData, got {result:?}"
        );
    }

    #[tokio::test]
    async fn create_coupon_rejects_blank_codes() {
        let ctx = TestContext::new().await;

        let result = ctx
            .coupons
            .create_coupon(new_coupon("   ", DiscountType::Fixed, dec!(10)))
            .await;

        assert!(
            matches!(result, Err(CouponsServiceError::MissingRequiredData)),
            "expected MissingRequiredData, got {result:?}"
        );
    }

    #[tokio::test]
    async fn list_coupons_reports_unused_coupons() -> TestResult {
        let ctx = TestContext::new().await;

        let coupon = ctx
            .coupons
            .create_coupon(new_coupon("FRESH", DiscountType::Fixed, dec!(10)))
            .await?;

        let coupons = ctx.coupons.list_coupons().await?;

        assert_eq!(coupons.len(), 1);
        assert_eq!(coupons[0].coupon.uuid, coupon.uuid);
        assert_eq!(coupons[0].times_used, 0);

        Ok(())
    }

    #[tokio::test]
    async fn get_coupon_unknown_uuid_returns_not_found() {
        let ctx = TestContext::new().await;

        let result = ctx.coupons.get_coupon(CouponUuid::new()).await;

        assert!(
            matches!(result, Err(CouponsServiceError::NotFound)),
            "expected NotFound, got {result:?}"
        );
    }
}
