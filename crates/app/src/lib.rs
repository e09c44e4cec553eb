//! Persistence, services and notifications for the Nutbasket storefront.

pub mod context;
pub mod database;
pub mod domain;
pub mod notifications;

#[cfg(test)]
mod test;

mod uuids;
