use std::sync::Arc;

use tracing::{debug, info};

use crate::{
    dao::{
        models::{Endpoint, ServerId},
        registry_store::RegistryStore,
    },
    error::ServiceError,
    services::require_non_blank,
};

/// Tracks live game-server endpoints per game.
///
/// Entries are keyed by their network binding: a server re-announcing the same
/// `(address, port)` under another game takes over its existing slot.
#[derive(Clone)]
pub struct ServerRegistry {
    store: Arc<dyn RegistryStore>,
}

impl ServerRegistry {
    /// Build the registry over `store`.
    pub fn new(store: Arc<dyn RegistryStore>) -> Self {
        Self { store }
    }

    /// Endpoints currently registered for `game_name`, in no particular order.
    ///
    /// An unknown game has no servers, so its listing is empty.
    pub async fn list(&self, game_name: &str) -> Result<Vec<Endpoint>, ServiceError> {
        let Some(game) = self.store.find_game(game_name.to_owned()).await? else {
            debug!(game = %game_name, "listing servers of unknown game");
            return Ok(Vec::new());
        };
        let servers = self.store.list_servers(game.id).await?;

        Ok(servers.into_iter().map(|server| server.endpoint).collect())
    }

    /// Register `address:port` for `game_name`, or rebind it if already registered.
    pub async fn register(
        &self,
        address: &str,
        port: u16,
        game_name: &str,
    ) -> Result<ServerId, ServiceError> {
        require_non_blank("address", address)?;
        require_non_blank("game name", game_name)?;
        if port == 0 {
            return Err(ServiceError::InvalidInput("port must not be 0".into()));
        }

        let endpoint = Endpoint::new(address, port);
        let id = self
            .store
            .upsert_server(endpoint.clone(), game_name.to_owned())
            .await?
            .ok_or(ServiceError::NotFound)?;

        info!(%endpoint, game = %game_name, %id, "registered server");
        Ok(id)
    }

    /// Remove the entry `id`; unknown ids are ignored.
    pub async fn deregister(&self, id: ServerId) -> Result<(), ServiceError> {
        if self.store.delete_server(id).await? {
            info!(%id, "deregistered server");
        } else {
            debug!(%id, "deregister ignored unknown server");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{dao::registry_store::MemoryRegistryStore, services::catalog::GameCatalog};

    async fn registry_with(games: &[&str]) -> ServerRegistry {
        let store: Arc<dyn RegistryStore> = Arc::new(MemoryRegistryStore::new());
        let catalog = GameCatalog::new(store.clone());
        for game in games {
            catalog.register(game).await.unwrap();
        }
        ServerRegistry::new(store)
    }

    #[tokio::test]
    async fn reannouncing_under_another_game_moves_the_slot() {
        let registry = registry_with(&["Doom", "Quake"]).await;

        let first = registry.register("1.2.3.4", 7777, "Doom").await.unwrap();
        let second = registry.register("1.2.3.4", 7777, "Quake").await.unwrap();

        assert_eq!(first, second);
        assert!(registry.list("Doom").await.unwrap().is_empty());
        assert_eq!(
            registry.list("Quake").await.unwrap(),
            vec![Endpoint::new("1.2.3.4", 7777)]
        );
    }

    #[tokio::test]
    async fn distinct_ports_are_distinct_entries() {
        let registry = registry_with(&["Doom"]).await;

        let a = registry.register("1.2.3.4", 7777, "Doom").await.unwrap();
        let b = registry.register("1.2.3.4", 7778, "Doom").await.unwrap();

        assert_ne!(a, b);
        let mut listed = registry.list("Doom").await.unwrap();
        listed.sort_by_key(|endpoint| endpoint.port);
        assert_eq!(
            listed,
            vec![Endpoint::new("1.2.3.4", 7777), Endpoint::new("1.2.3.4", 7778)]
        );
    }

    #[tokio::test]
    async fn deregister_is_idempotent() {
        let registry = registry_with(&["Doom"]).await;
        let id = registry.register("1.2.3.4", 7777, "Doom").await.unwrap();

        registry.deregister(id).await.unwrap();
        registry.deregister(id).await.unwrap();
        registry.deregister(ServerId(424242)).await.unwrap();

        assert!(registry.list("Doom").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn registering_for_unknown_game_fails() {
        let registry = registry_with(&[]).await;

        assert!(matches!(
            registry.register("1.2.3.4", 7777, "Doom").await,
            Err(ServiceError::NotFound)
        ));
    }

    #[tokio::test]
    async fn unknown_game_lists_no_servers() {
        let registry = registry_with(&["Doom"]).await;
        registry.register("1.2.3.4", 7777, "Doom").await.unwrap();

        assert!(registry.list("NoSuchGame").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn invalid_endpoint_is_rejected() {
        let registry = registry_with(&["Doom"]).await;

        assert!(matches!(
            registry.register("", 7777, "Doom").await,
            Err(ServiceError::InvalidInput(_))
        ));
        assert!(matches!(
            registry.register("1.2.3.4", 0, "Doom").await,
            Err(ServiceError::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn removing_the_game_drops_its_servers() {
        let registry = registry_with(&["Doom"]).await;
        registry.register("1.2.3.4", 7777, "Doom").await.unwrap();

        let catalog = GameCatalog::new(registry.store.clone());
        catalog.remove("Doom").await.unwrap();
        catalog.register("Doom").await.unwrap();

        assert!(registry.list("Doom").await.unwrap().is_empty());
    }
}
