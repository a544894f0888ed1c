pub mod memory;
#[cfg(feature = "mongo-store")]
pub mod mongodb;

use crate::dao::models::{
    Endpoint, GameEntity, GameId, ServerEntity, ServerId, UserEntity, UserId,
};
use crate::dao::storage::StorageResult;
use futures::future::BoxFuture;

pub use memory::MemoryRegistryStore;

/// Name of the unique constraint on game names.
pub const GAME_NAME_CONSTRAINT: &str = "games.name";
/// Name of the unique constraint on server bindings.
pub const SERVER_ENDPOINT_CONSTRAINT: &str = "active_servers.address_port";
/// Name of the unique constraint on user identifiers.
pub const USER_IDENTIFIER_CONSTRAINT: &str = "users.identifier";
/// Name of the unique constraint on save ownership.
pub const SAVE_OWNER_CONSTRAINT: &str = "saves.user_game";

/// Abstraction over the persistence layer shared by the catalog, registry,
/// credential and save façades.
///
/// Every write that can race is a single conditional operation guarded by a
/// unique constraint; implementations must never split it into a read
/// followed by a write.
///
/// Writes that reference a game take its name and resolve it themselves: a
/// row must never survive the removal of its game, even when the removal runs
/// concurrently with the write.
pub trait RegistryStore: Send + Sync {
    /// Insert a game. Fails with [`StorageError::Conflict`](crate::dao::storage::StorageError::Conflict)
    /// when the name is taken.
    fn insert_game(&self, name: String) -> BoxFuture<'static, StorageResult<GameId>>;
    /// Delete a game together with its server entries and save records.
    /// Returns whether a game was removed.
    fn delete_game(&self, name: String) -> BoxFuture<'static, StorageResult<bool>>;
    /// Look a game up by its unique name.
    fn find_game(&self, name: String) -> BoxFuture<'static, StorageResult<Option<GameEntity>>>;

    /// Server entries bound to `game_id`, in no particular order.
    fn list_servers(&self, game_id: GameId) -> BoxFuture<'static, StorageResult<Vec<ServerEntity>>>;
    /// Insert the endpoint or rebind the existing entry to the game named
    /// `game_name`, atomically. Returns `None` when no such game exists,
    /// including when it is removed while the write is in flight.
    fn upsert_server(
        &self,
        endpoint: Endpoint,
        game_name: String,
    ) -> BoxFuture<'static, StorageResult<Option<ServerId>>>;
    /// Returns whether an entry was removed.
    fn delete_server(&self, id: ServerId) -> BoxFuture<'static, StorageResult<bool>>;

    /// Insert a user. Fails with a conflict when the identifier is taken.
    fn insert_user(
        &self,
        identifier: String,
        password_hash: String,
    ) -> BoxFuture<'static, StorageResult<UserId>>;
    /// Look a user up by login identifier.
    fn find_user(&self, identifier: String) -> BoxFuture<'static, StorageResult<Option<UserEntity>>>;
    /// Whether a user with primary key `id` exists.
    fn user_exists(&self, id: UserId) -> BoxFuture<'static, StorageResult<bool>>;

    /// Save blob of `user_id` in `game_id`, if any.
    fn find_save(
        &self,
        user_id: UserId,
        game_id: GameId,
    ) -> BoxFuture<'static, StorageResult<Option<Vec<u8>>>>;
    /// Insert or overwrite the save of `user_id` in the game named `game_name`,
    /// atomically. Returns `false` when no such game exists, with the same
    /// guarantee as [`RegistryStore::upsert_server`].
    fn upsert_save(
        &self,
        user_id: UserId,
        game_name: String,
        blob: Vec<u8>,
    ) -> BoxFuture<'static, StorageResult<bool>>;

    /// Cheap liveness probe used by the storage supervisor.
    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>>;
    /// Re-establish the underlying connection after a failed health check.
    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>>;
}
