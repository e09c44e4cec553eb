//! Cart Data

use std::fmt;

use uuid::Uuid;

use crate::domain::users::UserUuid;

/// Whose cart is being read or changed.
///
/// Signed-in shoppers own their cart by user UUID; anonymous shoppers by the session key handed
/// out by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CartOwner {
    User(UserUuid),
    Session(String),
}

impl CartOwner {
    #[must_use]
    pub fn user(&self) -> Option<UserUuid> {
        match self {
            Self::User(user) => Some(*user),
            Self::Session(_) => None,
        }
    }

    pub(crate) fn user_uuid(&self) -> Option<Uuid> {
        self.user().map(UserUuid::into_uuid)
    }

    pub(crate) fn session_id(&self) -> Option<&str> {
        match self {
            Self::User(_) => None,
            Self::Session(session) => Some(session),
        }
    }
}

impl fmt::Display for CartOwner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User(user) => write!(f, "user:{user}"),
            Self::Session(session) => write!(f, "session:{session}"),
        }
    }
}

impl From<UserUuid> for CartOwner {
    fn from(user: UserUuid) -> Self {
        Self::User(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn owner_binds_exactly_one_key() {
        let user = UserUuid::new();

        let owner = CartOwner::from(user);
        assert_eq!(owner.user_uuid(), Some(user.into_uuid()));
        assert_eq!(owner.session_id(), None);

        let owner = CartOwner::Session("sess-42".to_string());
        assert_eq!(owner.user_uuid(), None);
        assert_eq!(owner.session_id(), Some("sess-42"));
        assert_eq!(owner.to_string(), "session:sess-42");
    }
}
