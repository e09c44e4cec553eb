//! Nutbasket
//!
//! Pricing, coupon and order rules for the Nutbasket storefront. Everything in this crate is
//! pure and synchronous; persistence lives in `nutbasket-app`.

pub mod carts;
pub mod catalog;
pub mod coupons;
pub mod money;
pub mod order_numbers;
pub mod orders;
pub mod pricing;
pub mod variants;

pub use variants::UnknownVariant;
