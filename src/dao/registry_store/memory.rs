//! Process-local registry backend built on concurrent maps.
//!
//! Uniqueness is enforced through `DashMap` entries: the shard lock held by an
//! entry makes each check-and-write a single atomic step, mirroring the unique
//! indexes of the MongoDB backend.
//!
//! Writes that reference a game hold a read guard on that game's entry while
//! they write, so a concurrent `delete_game` either happens first (the write
//! sees no game) or waits and then sweeps the new row.

use std::sync::{
    Arc,
    atomic::{AtomicI64, Ordering},
};

use dashmap::{DashMap, DashSet, mapref::entry::Entry};
use futures::future::BoxFuture;
use tracing::debug;

use super::{GAME_NAME_CONSTRAINT, RegistryStore, USER_IDENTIFIER_CONSTRAINT};
use crate::dao::{
    models::{Endpoint, GameEntity, GameId, ServerEntity, ServerId, UserEntity, UserId},
    storage::{StorageError, StorageResult},
};

/// In-memory [`RegistryStore`] used for `STORAGE=memory` deployments and tests.
#[derive(Clone, Default)]
pub struct MemoryRegistryStore {
    inner: Arc<MemoryInner>,
}

#[derive(Default)]
struct MemoryInner {
    games: DashMap<String, GameId>,
    servers: DashMap<Endpoint, ServerEntity>,
    users: DashMap<String, UserEntity>,
    user_ids: DashSet<UserId>,
    saves: DashMap<(UserId, GameId), Vec<u8>>,
    sequences: Sequences,
}

#[derive(Default)]
struct Sequences {
    games: AtomicI64,
    servers: AtomicI64,
    users: AtomicI64,
}

fn next(sequence: &AtomicI64) -> i64 {
    sequence.fetch_add(1, Ordering::Relaxed) + 1
}

impl MemoryRegistryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn insert_game(&self, name: String) -> StorageResult<GameId> {
        match self.inner.games.entry(name) {
            Entry::Occupied(_) => Err(StorageError::conflict(GAME_NAME_CONSTRAINT)),
            Entry::Vacant(slot) => {
                let id = GameId(next(&self.inner.sequences.games));
                slot.insert(id);
                Ok(id)
            }
        }
    }

    fn delete_game(&self, name: &str) -> bool {
        let Some((_, id)) = self.inner.games.remove(name) else {
            return false;
        };

        self.inner.servers.retain(|_, server| server.game_id != id);
        self.inner.saves.retain(|(_, game_id), _| *game_id != id);
        debug!(game = %name, %id, "removed game and its dependents");
        true
    }

    fn find_game(&self, name: &str) -> Option<GameEntity> {
        self.inner.games.get(name).map(|id| GameEntity {
            id: *id,
            name: name.to_owned(),
        })
    }

    fn list_servers(&self, game_id: GameId) -> Vec<ServerEntity> {
        self.inner
            .servers
            .iter()
            .filter(|server| server.game_id == game_id)
            .map(|server| server.value().clone())
            .collect()
    }

    fn upsert_server(&self, endpoint: Endpoint, game_name: &str) -> Option<ServerId> {
        let game = self.inner.games.get(game_name)?;
        let game_id = *game;

        let id = match self.inner.servers.entry(endpoint) {
            Entry::Occupied(mut slot) => {
                let server = slot.get_mut();
                server.game_id = game_id;
                server.id
            }
            Entry::Vacant(slot) => {
                let id = ServerId(next(&self.inner.sequences.servers));
                let endpoint = slot.key().clone();
                slot.insert(ServerEntity {
                    id,
                    game_id,
                    endpoint,
                });
                id
            }
        };

        drop(game);
        Some(id)
    }

    fn delete_server(&self, id: ServerId) -> bool {
        let before = self.inner.servers.len();
        self.inner.servers.retain(|_, server| server.id != id);
        self.inner.servers.len() < before
    }

    fn insert_user(&self, identifier: String, password_hash: String) -> StorageResult<UserId> {
        match self.inner.users.entry(identifier) {
            Entry::Occupied(_) => Err(StorageError::conflict(USER_IDENTIFIER_CONSTRAINT)),
            Entry::Vacant(slot) => {
                let id = UserId(next(&self.inner.sequences.users));
                let identifier = slot.key().clone();
                slot.insert(UserEntity {
                    id,
                    identifier,
                    password_hash,
                });
                self.inner.user_ids.insert(id);
                Ok(id)
            }
        }
    }

    fn find_user(&self, identifier: &str) -> Option<UserEntity> {
        self.inner
            .users
            .get(identifier)
            .map(|user| user.value().clone())
    }

    fn user_exists(&self, id: UserId) -> bool {
        self.inner.user_ids.contains(&id)
    }

    fn find_save(&self, user_id: UserId, game_id: GameId) -> Option<Vec<u8>> {
        self.inner
            .saves
            .get(&(user_id, game_id))
            .map(|blob| blob.value().clone())
    }

    fn upsert_save(&self, user_id: UserId, game_name: &str, blob: Vec<u8>) -> bool {
        let Some(game) = self.inner.games.get(game_name) else {
            return false;
        };

        self.inner.saves.insert((user_id, *game), blob);
        drop(game);
        true
    }
}

impl RegistryStore for MemoryRegistryStore {
    fn insert_game(&self, name: String) -> BoxFuture<'static, StorageResult<GameId>> {
        let store = self.clone();
        Box::pin(async move { store.insert_game(name) })
    }

    fn delete_game(&self, name: String) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        Box::pin(async move { Ok(store.delete_game(&name)) })
    }

    fn find_game(&self, name: String) -> BoxFuture<'static, StorageResult<Option<GameEntity>>> {
        let store = self.clone();
        Box::pin(async move { Ok(store.find_game(&name)) })
    }

    fn list_servers(&self, game_id: GameId) -> BoxFuture<'static, StorageResult<Vec<ServerEntity>>> {
        let store = self.clone();
        Box::pin(async move { Ok(store.list_servers(game_id)) })
    }

    fn upsert_server(
        &self,
        endpoint: Endpoint,
        game_name: String,
    ) -> BoxFuture<'static, StorageResult<Option<ServerId>>> {
        let store = self.clone();
        Box::pin(async move { Ok(store.upsert_server(endpoint, &game_name)) })
    }

    fn delete_server(&self, id: ServerId) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        Box::pin(async move { Ok(store.delete_server(id)) })
    }

    fn insert_user(
        &self,
        identifier: String,
        password_hash: String,
    ) -> BoxFuture<'static, StorageResult<UserId>> {
        let store = self.clone();
        Box::pin(async move { store.insert_user(identifier, password_hash) })
    }

    fn find_user(&self, identifier: String) -> BoxFuture<'static, StorageResult<Option<UserEntity>>> {
        let store = self.clone();
        Box::pin(async move { Ok(store.find_user(&identifier)) })
    }

    fn user_exists(&self, id: UserId) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        Box::pin(async move { Ok(store.user_exists(id)) })
    }

    fn find_save(
        &self,
        user_id: UserId,
        game_id: GameId,
    ) -> BoxFuture<'static, StorageResult<Option<Vec<u8>>>> {
        let store = self.clone();
        Box::pin(async move { Ok(store.find_save(user_id, game_id)) })
    }

    fn upsert_save(
        &self,
        user_id: UserId,
        game_name: String,
        blob: Vec<u8>,
    ) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        Box::pin(async move { Ok(store.upsert_save(user_id, &game_name, blob)) })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(async { Ok(()) })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(async { Ok(()) })
    }
}
