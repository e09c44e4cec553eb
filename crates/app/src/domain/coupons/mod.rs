//! Coupons

pub mod data;
pub mod errors;
pub mod records;
mod repository;
pub mod service;
mod validation;

pub(crate) use repository::PgCouponsRepository;
pub(crate) use validation::{CouponLock, check_coupon};

pub use errors::CouponsServiceError;
pub use service::*;
