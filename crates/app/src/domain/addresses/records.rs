//! Address Records

use jiff::Timestamp;
use serde::Serialize;

use crate::{domain::users::UserUuid, uuids::TypedUuid};

/// Address UUID
pub type AddressUuid = TypedUuid<AddressRecord>;

/// Address Record
#[derive(Debug, Clone, Serialize)]
pub struct AddressRecord {
    pub uuid: AddressUuid,
    pub user_uuid: Option<UserUuid>,
    pub recipient: String,
    pub line1: String,
    pub line2: Option<String>,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub phone: String,
    pub created_at: Timestamp,
}

impl AddressRecord {
    /// A user may ship to their own addresses; a guest only to guest addresses.
    #[must_use]
    pub fn usable_by(&self, user: Option<UserUuid>) -> bool {
        self.user_uuid == user
    }
}
