use std::sync::Arc;

use tracing::{debug, info};

use crate::{
    dao::{models::UserId, registry_store::RegistryStore},
    error::ServiceError,
    services::{catalog::GameCatalog, require_non_blank},
};

/// One opaque save blob per `(user, game)`, overwritten on every put.
///
/// Blob size is not bounded here; the HTTP layer caps request bodies.
#[derive(Clone)]
pub struct SaveStore {
    store: Arc<dyn RegistryStore>,
    catalog: GameCatalog,
}

impl SaveStore {
    /// Build the save store over `store`.
    pub fn new(store: Arc<dyn RegistryStore>) -> Self {
        let catalog = GameCatalog::new(store.clone());
        Self { store, catalog }
    }

    /// Blob saved by `user_id` in `game_name`; `NotFound` when the game or the save is missing.
    pub async fn get(&self, user_id: UserId, game_name: &str) -> Result<Vec<u8>, ServiceError> {
        let game_id = self.catalog.resolve(game_name).await?;

        self.store
            .find_save(user_id, game_id)
            .await?
            .ok_or(ServiceError::NotFound)
    }

    /// Store `blob` for `user_id` in `game_name`, replacing any previous save.
    pub async fn put(
        &self,
        user_id: UserId,
        game_name: &str,
        blob: Vec<u8>,
    ) -> Result<(), ServiceError> {
        require_non_blank("game name", game_name)?;
        // Users are never deleted, so this check cannot go stale.
        if !self.store.user_exists(user_id).await? {
            debug!(%user_id, "save rejected for unknown user");
            return Err(ServiceError::NotFound);
        }

        let size = blob.len();
        if !self
            .store
            .upsert_save(user_id, game_name.to_owned(), blob)
            .await?
        {
            debug!(%user_id, game = %game_name, "save rejected for unknown game");
            return Err(ServiceError::NotFound);
        }

        info!(%user_id, game = %game_name, size, "stored save");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dao::registry_store::MemoryRegistryStore;

    async fn setup() -> (SaveStore, UserId) {
        let store: Arc<dyn RegistryStore> = Arc::new(MemoryRegistryStore::new());
        GameCatalog::new(store.clone()).register("Doom").await.unwrap();
        let user = store
            .insert_user("alice".into(), "hash".into())
            .await
            .unwrap();
        (SaveStore::new(store), user)
    }

    #[tokio::test]
    async fn put_overwrites_previous_blob() {
        let (saves, user) = setup().await;

        saves.put(user, "Doom", b"blob-a".to_vec()).await.unwrap();
        assert_eq!(saves.get(user, "Doom").await.unwrap(), b"blob-a");

        saves.put(user, "Doom", b"b".to_vec()).await.unwrap();
        assert_eq!(saves.get(user, "Doom").await.unwrap(), b"b");
    }

    #[tokio::test]
    async fn missing_record_is_not_found() {
        let (saves, _) = setup().await;

        assert!(matches!(
            saves.get(UserId(999), "Doom").await,
            Err(ServiceError::NotFound)
        ));
    }

    #[tokio::test]
    async fn unknown_user_or_game_cannot_save() {
        let (saves, user) = setup().await;

        assert!(matches!(
            saves.put(UserId(999), "Doom", vec![1]).await,
            Err(ServiceError::NotFound)
        ));
        assert!(matches!(
            saves.put(user, "Quake", vec![1]).await,
            Err(ServiceError::NotFound)
        ));
    }

    #[tokio::test]
    async fn empty_and_binary_blobs_round_trip_untouched() {
        let (saves, user) = setup().await;
        let blob: Vec<u8> = (0..=255).collect();

        saves.put(user, "Doom", Vec::new()).await.unwrap();
        assert!(saves.get(user, "Doom").await.unwrap().is_empty());

        saves.put(user, "Doom", blob.clone()).await.unwrap();
        assert_eq!(saves.get(user, "Doom").await.unwrap(), blob);
    }
}
