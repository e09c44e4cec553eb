//! Settings

pub mod errors;
mod repository;
pub mod service;

pub(crate) use repository::PgSettingsRepository;

pub use errors::SettingsServiceError;
pub use service::*;

/// Sales tax, as a percentage of the subtotal.
pub const TAX_RATE_KEY: &str = "tax_rate";

/// Flat shipping charge below the free shipping threshold.
pub const SHIPPING_AMOUNT_KEY: &str = "shipping_amount";

/// Subtotal from which shipping is free.
pub const FREE_SHIPPING_AMOUNT_KEY: &str = "free_shipping_amount";
