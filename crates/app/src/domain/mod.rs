//! Nutbasket Domain Concerns

pub mod addresses;
pub mod carts;
pub mod coupons;
pub mod orders;
pub mod products;
pub mod settings;
pub mod users;
