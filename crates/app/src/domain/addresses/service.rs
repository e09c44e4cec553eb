//! Addresses service.

use async_trait::async_trait;
use mockall::automock;

use crate::{
    database::Db,
    domain::{
        addresses::{
            data::NewAddress,
            errors::AddressesServiceError,
            records::{AddressRecord, AddressUuid},
            repository::PgAddressesRepository,
        },
        users::UserUuid,
    },
};

#[derive(Debug, Clone)]
pub struct PgAddressesService {
    db: Db,
    repository: PgAddressesRepository,
}

impl PgAddressesService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            repository: PgAddressesRepository::new(),
        }
    }
}

#[async_trait]
impl AddressesService for PgAddressesService {
    async fn create_address(
        &self,
        address: NewAddress,
    ) -> Result<AddressRecord, AddressesServiceError> {
        let mut tx = self.db.begin().await?;

        let created = self.repository.create_address(&mut tx, address).await?;

        tx.commit().await?;

        Ok(created)
    }

    async fn get_address(
        &self,
        user: Option<UserUuid>,
        address: AddressUuid,
    ) -> Result<AddressRecord, AddressesServiceError> {
        let mut tx = self.db.begin().await?;

        let address = self
            .repository
            .find_address(&mut tx, address)
            .await?
            .filter(|address| address.usable_by(user))
            .ok_or(AddressesServiceError::NotFound)?;

        tx.commit().await?;

        Ok(address)
    }
}

#[automock]
#[async_trait]
pub trait AddressesService: Send + Sync {
    async fn create_address(
        &self,
        address: NewAddress,
    ) -> Result<AddressRecord, AddressesServiceError>;

    /// Fetch an address `user` may ship to. Addresses belonging to someone else are reported as
    /// not found.
    async fn get_address(
        &self,
        user: Option<UserUuid>,
        address: AddressUuid,
    ) -> Result<AddressRecord, AddressesServiceError>;
}
