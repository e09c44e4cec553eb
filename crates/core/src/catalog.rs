//! Catalog

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::variants::UnknownVariant;

/// Whether a product is offered for sale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductStatus {
    /// Listed and purchasable while in stock.
    Active,

    /// Hidden from the storefront; cannot be added to carts or ordered.
    Inactive,
}

impl ProductStatus {
    /// Storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
        }
    }
}

impl fmt::Display for ProductStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProductStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "inactive" => Ok(Self::Inactive),
            other => Err(UnknownVariant::new("product status", other)),
        }
    }
}

/// Stock is low once it falls to the product's threshold.
#[must_use]
pub fn is_low_stock(stock_quantity: u32, low_stock_threshold: u32) -> bool {
    stock_quantity <= low_stock_threshold
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stock_at_threshold_is_low() {
        assert!(is_low_stock(5, 5));
        assert!(is_low_stock(0, 5));
        assert!(!is_low_stock(6, 5));
    }

    #[test]
    fn product_status_parses() {
        assert_eq!("inactive".parse(), Ok(ProductStatus::Inactive));
        assert!("archived".parse::<ProductStatus>().is_err());
    }
}
