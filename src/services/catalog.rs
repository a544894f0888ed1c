use std::sync::Arc;

use tracing::info;

use crate::{
    dao::{models::GameId, registry_store::RegistryStore},
    error::ServiceError,
    services::require_non_blank,
};

/// Maps game names to ids. Registration is not idempotent: a taken name is a conflict.
#[derive(Clone)]
pub struct GameCatalog {
    store: Arc<dyn RegistryStore>,
}

impl GameCatalog {
    /// Build the catalog over `store`.
    pub fn new(store: Arc<dyn RegistryStore>) -> Self {
        Self { store }
    }

    /// Create a game named `name`.
    pub async fn register(&self, name: &str) -> Result<GameId, ServiceError> {
        require_non_blank("game name", name)?;

        let id = self.store.insert_game(name.to_owned()).await?;
        info!(game = %name, %id, "registered game");
        Ok(id)
    }

    /// Delete the game and every server entry and save record that references it.
    pub async fn remove(&self, name: &str) -> Result<(), ServiceError> {
        require_non_blank("game name", name)?;

        if !self.store.delete_game(name.to_owned()).await? {
            return Err(ServiceError::NotFound);
        }
        info!(game = %name, "removed game");
        Ok(())
    }

    /// Id of the game named `name`, or `NotFound`.
    pub async fn resolve(&self, name: &str) -> Result<GameId, ServiceError> {
        require_non_blank("game name", name)?;

        self.store
            .find_game(name.to_owned())
            .await?
            .map(|game| game.id)
            .ok_or(ServiceError::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dao::registry_store::MemoryRegistryStore;

    fn catalog() -> GameCatalog {
        GameCatalog::new(Arc::new(MemoryRegistryStore::new()))
    }

    #[tokio::test]
    async fn register_then_resolve() {
        let catalog = catalog();
        let id = catalog.register("Doom").await.unwrap();

        assert_eq!(catalog.resolve("Doom").await.unwrap(), id);
    }

    #[tokio::test]
    async fn duplicate_name_conflicts() {
        let catalog = catalog();
        catalog.register("Doom").await.unwrap();

        assert!(matches!(
            catalog.register("Doom").await,
            Err(ServiceError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn unknown_game_is_not_found() {
        let catalog = catalog();

        assert!(matches!(
            catalog.resolve("Quake").await,
            Err(ServiceError::NotFound)
        ));
        assert!(matches!(
            catalog.remove("Quake").await,
            Err(ServiceError::NotFound)
        ));
    }

    #[tokio::test]
    async fn removed_game_no_longer_resolves() {
        let catalog = catalog();
        catalog.register("Doom").await.unwrap();
        catalog.remove("Doom").await.unwrap();

        assert!(matches!(
            catalog.resolve("Doom").await,
            Err(ServiceError::NotFound)
        ));
        // The name is free again.
        assert!(catalog.register("Doom").await.is_ok());
    }

    #[tokio::test]
    async fn blank_name_is_rejected_before_storage() {
        let catalog = catalog();

        assert!(matches!(
            catalog.register("   ").await,
            Err(ServiceError::InvalidInput(_))
        ));
    }
}
