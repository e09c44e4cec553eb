//! Carts service.

use async_trait::async_trait;
use mockall::automock;
use nutbasket::carts::{self, check_quantity};
use rust_decimal::Decimal;
use sqlx::{Connection, Postgres, Transaction, error::ErrorKind};
use tracing::{Span, info, warn};

use crate::{
    database::Db,
    domain::{
        carts::{
            data::CartOwner,
            errors::CartsServiceError,
            records::{CartItemRecord, CartItemUuid, CartLine},
            repository::PgCartItemsRepository,
        },
        products::{
            PgProductsRepository,
            records::{ProductRecord, ProductUuid},
        },
        users::UserUuid,
    },
};

const CART_LINE_ATTEMPTS: usize = 2;

const CART_LINE_CONSTRAINTS: [&str; 2] = ["cart_items_user_product", "cart_items_session_product"];

#[derive(Debug, Clone)]
pub struct PgCartsService {
    db: Db,
    items: PgCartItemsRepository,
    products: PgProductsRepository,
}

impl PgCartsService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            items: PgCartItemsRepository::new(),
            products: PgProductsRepository::new(),
        }
    }
}

#[async_trait]
impl CartsService for PgCartsService {
    async fn get_cart_items(&self, owner: &CartOwner) -> Result<Vec<CartLine>, CartsServiceError> {
        let mut tx = self.db.begin().await?;

        let lines = self.items.get_cart_lines(&mut tx, owner).await?;

        tx.commit().await?;

        Ok(lines)
    }

    async fn calculate_cart_total(&self, owner: &CartOwner) -> Result<Decimal, CartsServiceError> {
        let lines = self.get_cart_items(owner).await?;

        Ok(carts::subtotal(&lines))
    }

    #[tracing::instrument(
        name = "carts.service.add_to_cart",
        skip(self, owner, product),
        fields(owner = %owner, product_uuid = %product, cart_item_uuid = tracing::field::Empty),
        err
    )]
    async fn add_to_cart(
        &self,
        owner: &CartOwner,
        product: ProductUuid,
        quantity: i64,
    ) -> Result<CartItemRecord, CartsServiceError> {
        if quantity <= 0 {
            return Err(CartsServiceError::InvalidQuantity);
        }

        let mut tx = self.db.begin().await?;

        let product = self
            .products
            .find_product(&mut tx, product)
            .await?
            .filter(ProductRecord::is_active)
            .ok_or(CartsServiceError::ProductUnavailable)?;

        let item = put_in_cart(&self.items, &mut tx, owner, &product, quantity).await?;

        tx.commit().await?;

        Span::current().record("cart_item_uuid", tracing::field::display(item.uuid));

        info!(quantity = item.quantity, "added to cart");

        Ok(item)
    }

    #[tracing::instrument(
        name = "carts.service.update_cart_quantity",
        skip(self, owner, item),
        fields(owner = %owner, cart_item_uuid = %item),
        err
    )]
    async fn update_cart_quantity(
        &self,
        owner: &CartOwner,
        item: CartItemUuid,
        quantity: i64,
    ) -> Result<CartItemRecord, CartsServiceError> {
        let mut tx = self.db.begin().await?;

        let line = self.items.get_cart_line(&mut tx, owner, item).await?;

        let quantity = check_quantity(quantity, line.stock_quantity)?;

        let updated = self
            .items
            .set_cart_item_quantity(&mut tx, line.item_uuid, quantity)
            .await?;

        tx.commit().await?;

        Ok(updated)
    }

    #[tracing::instrument(
        name = "carts.service.remove_from_cart",
        skip(self, owner, item),
        fields(owner = %owner, cart_item_uuid = %item),
        err
    )]
    async fn remove_from_cart(
        &self,
        owner: &CartOwner,
        item: CartItemUuid,
    ) -> Result<(), CartsServiceError> {
        let mut tx = self.db.begin().await?;

        let rows_affected = self.items.delete_cart_item(&mut tx, owner, item).await?;

        if rows_affected == 0 {
            return Err(CartsServiceError::NotFound);
        }

        tx.commit().await?;

        Ok(())
    }

    async fn clear_cart(&self, owner: &CartOwner) -> Result<u64, CartsServiceError> {
        let mut tx = self.db.begin().await?;

        let removed = self.items.clear_cart(&mut tx, owner).await?;

        tx.commit().await?;

        Ok(removed)
    }

    async fn cart_count(&self, owner: &CartOwner) -> Result<u64, CartsServiceError> {
        let mut tx = self.db.begin().await?;

        let units = self.items.count_cart_units(&mut tx, owner).await?;

        tx.commit().await?;

        Ok(units)
    }

    #[tracing::instrument(
        name = "carts.service.merge_session_cart",
        skip(self, session),
        fields(user_uuid = %user, merged_lines = tracing::field::Empty),
        err
    )]
    async fn merge_session_cart(
        &self,
        session: String,
        user: UserUuid,
    ) -> Result<usize, CartsServiceError> {
        let session = CartOwner::Session(session);
        let owner = CartOwner::User(user);

        let mut tx = self.db.begin().await?;

        let lines = self.items.get_cart_lines(&mut tx, &session).await?;

        for line in &lines {
            match self
                .items
                .find_cart_item(&mut tx, &owner, line.product_uuid)
                .await?
            {
                Some(existing) => {
                    // Never shrink the user's own line; never merge past stock.
                    let merged = existing
                        .quantity
                        .saturating_add(line.quantity)
                        .min(line.stock_quantity)
                        .max(existing.quantity);

                    if merged != existing.quantity {
                        self.items
                            .set_cart_item_quantity(&mut tx, existing.uuid, merged)
                            .await?;
                    }

                    self.items
                        .delete_cart_item(&mut tx, &session, line.item_uuid)
                        .await?;
                }
                None => {
                    self.items
                        .move_cart_item(&mut tx, line.item_uuid, user)
                        .await?;
                }
            }
        }

        tx.commit().await?;

        Span::current().record("merged_lines", lines.len());

        Ok(lines.len())
    }
}

#[automock]
#[async_trait]
pub trait CartsService: Send + Sync {
    /// The owner's cart lines with live product data. An empty cart is an empty list.
    async fn get_cart_items(&self, owner: &CartOwner) -> Result<Vec<CartLine>, CartsServiceError>;

    /// Sum of `price × quantity` at current catalog prices.
    async fn calculate_cart_total(&self, owner: &CartOwner) -> Result<Decimal, CartsServiceError>;

    /// Put `quantity` units of a product in the cart, topping up an existing line for the same
    /// product rather than adding a second one.
    async fn add_to_cart(
        &self,
        owner: &CartOwner,
        product: ProductUuid,
        quantity: i64,
    ) -> Result<CartItemRecord, CartsServiceError>;

    /// Set a line's quantity outright.
    async fn update_cart_quantity(
        &self,
        owner: &CartOwner,
        item: CartItemUuid,
        quantity: i64,
    ) -> Result<CartItemRecord, CartsServiceError>;

    async fn remove_from_cart(
        &self,
        owner: &CartOwner,
        item: CartItemUuid,
    ) -> Result<(), CartsServiceError>;

    /// Empty the cart, returning how many lines were removed.
    async fn clear_cart(&self, owner: &CartOwner) -> Result<u64, CartsServiceError>;

    /// Total units in the cart.
    async fn cart_count(&self, owner: &CartOwner) -> Result<u64, CartsServiceError>;

    /// Move an anonymous cart onto a user who just signed in. Products already in the user's
    /// cart are combined into one line, capped at stock.
    async fn merge_session_cart(
        &self,
        session: String,
        user: UserUuid,
    ) -> Result<usize, CartsServiceError>;
}

/// Add `quantity` of `product` to `owner`'s line for it, creating the line if there is none.
///
/// The insert runs in a savepoint. When a concurrent request creates the same line first, the
/// clash is rolled back and the now-committed line is topped up instead.
async fn put_in_cart(
    items: &PgCartItemsRepository,
    tx: &mut Transaction<'_, Postgres>,
    owner: &CartOwner,
    product: &ProductRecord,
    quantity: i64,
) -> Result<CartItemRecord, CartsServiceError> {
    for _ in 0..CART_LINE_ATTEMPTS {
        let existing = items.find_cart_item(tx, owner, product.uuid).await?;

        let current = existing.as_ref().map_or(0, |item| item.quantity);
        let wanted = check_quantity(
            i64::from(current).saturating_add(quantity),
            product.stock_quantity,
        )?;

        if let Some(item) = existing {
            return Ok(items.set_cart_item_quantity(tx, item.uuid, wanted).await?);
        }

        let mut savepoint = Connection::begin(&mut **tx).await?;

        match items
            .create_cart_item(&mut savepoint, owner, product.uuid, wanted)
            .await
        {
            Ok(item) => {
                savepoint.commit().await?;

                return Ok(item);
            }
            Err(error) if is_cart_line_clash(&error) => {
                savepoint.rollback().await?;

                warn!("cart line created concurrently, topping it up");
            }
            Err(error) => return Err(error.into()),
        }
    }

    Err(CartsServiceError::AlreadyExists)
}

fn is_cart_line_clash(error: &sqlx::Error) -> bool {
    error.as_database_error().is_some_and(|error| {
        matches!(error.kind(), ErrorKind::UniqueViolation)
            && error
                .constraint()
                .is_some_and(|name| CART_LINE_CONSTRAINTS.contains(&name))
    })
}

#[cfg(test)]
mod tests {
    use rust_decimal::dec;
    use testresult::TestResult;

    use crate::test::{
        TestContext,
        helpers::{create_inactive_product, create_product},
    };

    use super::*;

    fn guest() -> CartOwner {
        CartOwner::Session(format!("sess-{}", uuid::Uuid::now_v7()))
    }

    #[tokio::test]
    async fn empty_cart_totals_zero() -> TestResult {
        let ctx = TestContext::new().await;
        let owner = guest();

        assert!(ctx.carts.get_cart_items(&owner).await?.is_empty());
        assert_eq!(ctx.carts.calculate_cart_total(&owner).await?, Decimal::ZERO);
        assert_eq!(ctx.carts.cart_count(&owner).await?, 0);

        Ok(())
    }

    #[tokio::test]
    async fn cart_total_uses_live_prices() -> TestResult {
        let ctx = TestContext::new().await;
        let owner = CartOwner::User(UserUuid::new());

        let cashews = create_product(&ctx, "Cashews", dec!(250), 10).await?;
        let dates = create_product(&ctx, "Dates", dec!(125.50), 10).await?;

        ctx.carts.add_to_cart(&owner, cashews.uuid, 2).await?;
        ctx.carts.add_to_cart(&owner, dates.uuid, 3).await?;

        assert_eq!(ctx.carts.calculate_cart_total(&owner).await?, dec!(876.50));
        assert_eq!(ctx.carts.cart_count(&owner).await?, 5);

        Ok(())
    }

    #[tokio::test]
    async fn adding_same_product_twice_tops_up_one_line() -> TestResult {
        let ctx = TestContext::new().await;
        let owner = guest();
        let product = create_product(&ctx, "Almonds", dec!(600), 10).await?;

        let first = ctx.carts.add_to_cart(&owner, product.uuid, 2).await?;
        let second = ctx.carts.add_to_cart(&owner, product.uuid, 3).await?;

        assert_eq!(first.uuid, second.uuid);
        assert_eq!(second.quantity, 5);
        assert_eq!(ctx.carts.get_cart_items(&owner).await?.len(), 1);

        Ok(())
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn concurrent_first_adds_share_one_line() -> TestResult {
        let ctx = TestContext::new().await;
        let owner = CartOwner::User(UserUuid::new());

        let almonds = create_product(&ctx, "Almonds", dec!(300), 10).await?;

        let (first, second) = tokio::join!(
            ctx.carts.add_to_cart(&owner, almonds.uuid, 2),
            ctx.carts.add_to_cart(&owner, almonds.uuid, 3),
        );

        assert_eq!(first?.uuid, second?.uuid);

        let lines = ctx.carts.get_cart_items(&owner).await?;

        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].quantity, 5);
        assert_eq!(ctx.carts.cart_count(&owner).await?, 5);

        Ok(())
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn concurrent_first_adds_still_respect_stock() -> TestResult {
        let ctx = TestContext::new().await;
        let owner = guest();

        let walnuts = create_product(&ctx, "Walnuts", dec!(420), 4).await?;

        let (first, second) = tokio::join!(
            ctx.carts.add_to_cart(&owner, walnuts.uuid, 3),
            ctx.carts.add_to_cart(&owner, walnuts.uuid, 3),
        );

        let rejected = [first, second]
            .into_iter()
            .filter_map(Result::err)
            .collect::<Vec<_>>();

        assert_eq!(rejected.len(), 1);
        assert!(matches!(
            rejected[0],
            CartsServiceError::InsufficientStock { available: 4 }
        ));
        assert_eq!(ctx.carts.cart_count(&owner).await?, 3);

        Ok(())
    }

    #[tokio::test]
    async fn add_to_cart_rejects_more_than_stock() -> TestResult {
        let ctx = TestContext::new().await;
        let owner = guest();
        let product = create_product(&ctx, "Saffron", dec!(999), 3).await?;

        ctx.carts.add_to_cart(&owner, product.uuid, 2).await?;

        let result = ctx.carts.add_to_cart(&owner, product.uuid, 2).await;

        assert!(
            matches!(result, Err(CartsServiceError::InsufficientStock { available: 3 })),
            "expected InsufficientStock, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn add_to_cart_rejects_non_positive_quantity() -> TestResult {
        let ctx = TestContext::new().await;
        let product = create_product(&ctx, "Walnuts", dec!(700), 3).await?;

        let result = ctx.carts.add_to_cart(&guest(), product.uuid, 0).await;

        assert!(
            matches!(result, Err(CartsServiceError::InvalidQuantity)),
            "expected InvalidQuantity, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn add_to_cart_rejects_inactive_and_unknown_products() -> TestResult {
        let ctx = TestContext::new().await;
        let hidden = create_inactive_product(&ctx, "Old Stock", dec!(10), 10).await?;

        for product in [hidden.uuid, ProductUuid::new()] {
            let result = ctx.carts.add_to_cart(&guest(), product, 1).await;

            assert!(
                matches!(result, Err(CartsServiceError::ProductUnavailable)),
                "expected ProductUnavailable, got {result:?}"
            );
        }

        Ok(())
    }

    #[tokio::test]
    async fn update_cart_quantity_checks_bounds() -> TestResult {
        let ctx = TestContext::new().await;
        let owner = guest();
        let product = create_product(&ctx, "Pecans", dec!(800), 4).await?;

        let item = ctx.carts.add_to_cart(&owner, product.uuid, 1).await?;

        let updated = ctx.carts.update_cart_quantity(&owner, item.uuid, 4).await?;
        assert_eq!(updated.quantity, 4);

        let too_many = ctx.carts.update_cart_quantity(&owner, item.uuid, 5).await;
        assert!(
            matches!(too_many, Err(CartsServiceError::InsufficientStock { available: 4 })),
            "expected InsufficientStock, got {too_many:?}"
        );

        let zero = ctx.carts.update_cart_quantity(&owner, item.uuid, 0).await;
        assert!(
            matches!(zero, Err(CartsServiceError::InvalidQuantity)),
            "expected InvalidQuantity, got {zero:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn other_owners_cannot_touch_a_line() -> TestResult {
        let ctx = TestContext::new().await;
        let owner = guest();
        let product = create_product(&ctx, "Hazelnuts", dec!(450), 4).await?;

        let item = ctx.carts.add_to_cart(&owner, product.uuid, 1).await?;

        let update = ctx.carts.update_cart_quantity(&guest(), item.uuid, 2).await;
        assert!(
            matches!(update, Err(CartsServiceError::NotFound)),
            "expected NotFound, got {update:?}"
        );

        let remove = ctx.carts.remove_from_cart(&guest(), item.uuid).await;
        assert!(
            matches!(remove, Err(CartsServiceError::NotFound)),
            "expected NotFound, got {remove:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn remove_and_clear_empty_the_cart() -> TestResult {
        let ctx = TestContext::new().await;
        let owner = guest();
        let first = create_product(&ctx, "Figs", dec!(300), 4).await?;
        let second = create_product(&ctx, "Prunes", dec!(200), 4).await?;

        let item = ctx.carts.add_to_cart(&owner, first.uuid, 1).await?;
        ctx.carts.add_to_cart(&owner, second.uuid, 1).await?;

        ctx.carts.remove_from_cart(&owner, item.uuid).await?;
        assert_eq!(ctx.carts.get_cart_items(&owner).await?.len(), 1);

        assert_eq!(ctx.carts.clear_cart(&owner).await?, 1);
        assert!(ctx.carts.get_cart_items(&owner).await?.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn merge_session_cart_combines_lines_capped_at_stock() -> TestResult {
        let ctx = TestContext::new().await;
        let user = UserUuid::new();
        let session_id = format!("sess-{}", uuid::Uuid::now_v7());
        let session = CartOwner::Session(session_id.clone());
        let owner = CartOwner::User(user);

        let shared = create_product(&ctx, "Pistachios", dec!(500), 5).await?;
        let only_guest = create_product(&ctx, "Raisins", dec!(100), 5).await?;

        ctx.carts.add_to_cart(&owner, shared.uuid, 3).await?;
        ctx.carts.add_to_cart(&session, shared.uuid, 4).await?;
        ctx.carts.add_to_cart(&session, only_guest.uuid, 2).await?;

        let merged = ctx.carts.merge_session_cart(session_id, user).await?;
        assert_eq!(merged, 2);

        assert!(ctx.carts.get_cart_items(&session).await?.is_empty());

        let lines = ctx.carts.get_cart_items(&owner).await?;
        let quantity_of = |product: ProductUuid| {
            lines
                .iter()
                .find(|line| line.product_uuid == product)
                .map(|line| line.quantity)
        };

        assert_eq!(quantity_of(shared.uuid), Some(5));
        assert_eq!(quantity_of(only_guest.uuid), Some(2));

        Ok(())
    }
}
