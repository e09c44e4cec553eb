//! Product Records

use jiff::Timestamp;
use nutbasket::catalog::{self, ProductStatus};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::uuids::TypedUuid;

/// Product UUID
pub type ProductUuid = TypedUuid<ProductRecord>;

/// Product Record
#[derive(Debug, Clone, Serialize)]
pub struct ProductRecord {
    pub uuid: ProductUuid,
    pub name: String,
    pub slug: String,
    pub image: Option<String>,
    pub price: Decimal,
    pub compare_price: Option<Decimal>,
    pub stock_quantity: u32,
    pub low_stock_threshold: u32,
    pub status: ProductStatus,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl ProductRecord {
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status == ProductStatus::Active
    }

    #[must_use]
    pub fn is_low_stock(&self) -> bool {
        catalog::is_low_stock(self.stock_quantity, self.low_stock_threshold)
    }
}
