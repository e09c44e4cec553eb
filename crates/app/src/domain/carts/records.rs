//! Cart Records

use jiff::Timestamp;
use nutbasket::{carts::Priced, catalog::ProductStatus};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::{domain::products::records::ProductUuid, uuids::TypedUuid};

/// Cart Item UUID
pub type CartItemUuid = TypedUuid<CartItemRecord>;

/// Cart Item Record
#[derive(Debug, Clone, Serialize)]
pub struct CartItemRecord {
    pub uuid: CartItemUuid,
    pub product_uuid: ProductUuid,
    pub quantity: u32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A cart item joined with the product as it is right now. Prices are never cached on the cart,
/// so totals always use `price` from the catalog.
#[derive(Debug, Clone, Serialize)]
pub struct CartLine {
    pub item_uuid: CartItemUuid,
    pub product_uuid: ProductUuid,
    pub name: String,
    pub slug: String,
    pub image: Option<String>,
    pub price: Decimal,
    pub stock_quantity: u32,
    pub status: ProductStatus,
    pub quantity: u32,
}

impl Priced for CartLine {
    fn unit_price(&self) -> Decimal {
        self.price
    }

    fn quantity(&self) -> u32 {
        self.quantity
    }
}
