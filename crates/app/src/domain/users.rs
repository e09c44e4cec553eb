//! Users
//!
//! Identity is owned by an external provider; the storefront only ever sees a user's UUID.

use crate::uuids::TypedUuid;

/// Marker for identifiers issued by the identity provider.
#[derive(Debug)]
pub struct UserRecord;

/// User UUID
pub type UserUuid = TypedUuid<UserRecord>;
