use std::sync::Arc;

use tracing::{debug, info};

use crate::{
    dao::{models::UserId, registry_store::RegistryStore},
    error::ServiceError,
    services::{password::PasswordScheme, require_non_blank},
};

/// User identity and password verification.
///
/// Only the Argon2id hash of a password is ever persisted.
#[derive(Clone)]
pub struct CredentialStore {
    store: Arc<dyn RegistryStore>,
    passwords: PasswordScheme,
}

impl CredentialStore {
    /// Build the credential store over `store`, hashing with `passwords`.
    pub fn new(store: Arc<dyn RegistryStore>, passwords: PasswordScheme) -> Self {
        Self { store, passwords }
    }

    /// Create a user. A taken identifier is reported as [`ServiceError::Conflict`]
    /// by the storage insert itself; there is no separate existence check.
    pub async fn register(&self, identifier: &str, password: &str) -> Result<UserId, ServiceError> {
        require_non_blank("identifier", identifier)?;
        if password.is_empty() {
            return Err(ServiceError::InvalidInput(
                "password must not be empty".into(),
            ));
        }

        let password_hash = self.passwords.hash(password.to_owned()).await?;
        let id = self
            .store
            .insert_user(identifier.to_owned(), password_hash)
            .await?;

        info!(%id, "registered user");
        Ok(id)
    }

    /// Return the id of `identifier` when `password` verifies against its stored hash.
    ///
    /// Unknown identifiers and wrong passwords both yield [`ServiceError::AuthFailure`].
    pub async fn authenticate(
        &self,
        identifier: &str,
        password: &str,
    ) -> Result<UserId, ServiceError> {
        let user = self.store.find_user(identifier.to_owned()).await?;
        let (id, stored) = match user {
            Some(user) => (Some(user.id), Some(user.password_hash)),
            None => (None, None),
        };

        let verified = self.passwords.verify(password.to_owned(), stored).await?;
        match id {
            Some(id) if verified => Ok(id),
            _ => {
                debug!("authentication rejected");
                Err(ServiceError::AuthFailure)
            }
        }
    }
}
