use std::sync::Arc;

use futures::{TryStreamExt, future::BoxFuture};
use mongodb::{
    Collection, Database, IndexModel,
    bson::{Document, doc},
    error::Error as MongoError,
    options::{IndexOptions, ReturnDocument},
};
use tokio::sync::RwLock;
use tracing::{debug, info};

use super::{
    config::MongoConfig,
    connection::establish_connection,
    error::{MongoDaoError, MongoResult},
    models::{
        MongoCounterDocument, MongoGameDocument, MongoSaveDocument, MongoServerDocument,
        MongoUserDocument, blob_as_binary,
    },
};
use crate::dao::{
    models::{Endpoint, GameEntity, GameId, ServerEntity, ServerId, UserEntity, UserId},
    registry_store::{
        GAME_NAME_CONSTRAINT, RegistryStore, SAVE_OWNER_CONSTRAINT, SERVER_ENDPOINT_CONSTRAINT,
        USER_IDENTIFIER_CONSTRAINT,
    },
    storage::StorageResult,
};

const GAME_COLLECTION_NAME: &str = "games";
const SERVER_COLLECTION_NAME: &str = "active_servers";
const USER_COLLECTION_NAME: &str = "users";
const SAVE_COLLECTION_NAME: &str = "saves";
const COUNTER_COLLECTION_NAME: &str = "counters";

/// [`RegistryStore`] backed by MongoDB collections with unique indexes.
#[derive(Clone)]
pub struct MongoRegistryStore {
    inner: Arc<MongoInner>,
}

struct MongoInner {
    database: RwLock<Database>,
    config: MongoConfig,
}

impl MongoInner {
    async fn ping(&self) -> MongoResult<()> {
        let database = self.database.read().await.clone();

        database
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|source| MongoDaoError::HealthPing { source })?;
        Ok(())
    }

    async fn reconnect(&self) -> MongoResult<()> {
        let database =
            establish_connection(&self.config.options, &self.config.database_name).await?;
        *self.database.write().await = database;
        info!("MongoDB connection re-established");
        Ok(())
    }
}

impl MongoRegistryStore {
    /// Establish a connection to MongoDB and ensure indexes are present.
    pub async fn connect(config: MongoConfig) -> MongoResult<Self> {
        let database = establish_connection(&config.options, &config.database_name).await?;

        let inner = Arc::new(MongoInner {
            database: RwLock::new(database),
            config,
        });

        let store = Self { inner };
        store.ensure_indexes().await?;
        Ok(store)
    }

    async fn ensure_indexes(&self) -> MongoResult<()> {
        let database = self.database().await;
        ensure_unique_index(
            &database,
            GAME_COLLECTION_NAME,
            doc! {"name": 1},
            GAME_NAME_CONSTRAINT,
        )
        .await?;
        ensure_unique_index(
            &database,
            SERVER_COLLECTION_NAME,
            doc! {"address": 1, "port": 1},
            SERVER_ENDPOINT_CONSTRAINT,
        )
        .await?;
        ensure_unique_index(
            &database,
            USER_COLLECTION_NAME,
            doc! {"identifier": 1},
            USER_IDENTIFIER_CONSTRAINT,
        )
        .await?;
        ensure_unique_index(
            &database,
            SAVE_COLLECTION_NAME,
            doc! {"user_id": 1, "game_id": 1},
            SAVE_OWNER_CONSTRAINT,
        )
        .await?;
        // Cascading deletes filter on game_id.
        let model = IndexModel::builder()
            .keys(doc! {"game_id": 1})
            .options(
                IndexOptions::builder()
                    .name(Some("active_servers.game_id".to_owned()))
                    .build(),
            )
            .build();
        database
            .collection::<Document>(SERVER_COLLECTION_NAME)
            .create_index(model)
            .await
            .map_err(|source| MongoDaoError::EnsureIndex {
                collection: SERVER_COLLECTION_NAME,
                index: "game_id",
                source,
            })?;

        Ok(())
    }

    async fn database(&self) -> Database {
        self.inner.database.read().await.clone()
    }

    async fn games(&self) -> Collection<MongoGameDocument> {
        self.database().await.collection(GAME_COLLECTION_NAME)
    }

    async fn servers(&self) -> Collection<MongoServerDocument> {
        self.database().await.collection(SERVER_COLLECTION_NAME)
    }

    async fn users(&self) -> Collection<MongoUserDocument> {
        self.database().await.collection(USER_COLLECTION_NAME)
    }

    async fn saves(&self) -> Collection<MongoSaveDocument> {
        self.database().await.collection(SAVE_COLLECTION_NAME)
    }

    /// Allocate the next id of `collection` from its counter document.
    async fn next_id(&self, collection: &'static str) -> MongoResult<i64> {
        let counters = self
            .database()
            .await
            .collection::<MongoCounterDocument>(COUNTER_COLLECTION_NAME);

        let counter = counters
            .find_one_and_update(doc! {"_id": collection}, doc! {"$inc": {"seq": 1_i64}})
            .upsert(true)
            .return_document(ReturnDocument::After)
            .await
            .map_err(|source| MongoDaoError::NextId { collection, source })?;

        counter
            .map(|counter| counter.seq)
            .ok_or(MongoDaoError::MissingCounter { collection })
    }

    async fn insert_game(&self, name: String) -> MongoResult<GameId> {
        let id = self.next_id(GAME_COLLECTION_NAME).await?;
        let document = MongoGameDocument {
            id,
            name: name.clone(),
        };

        self.games()
            .await
            .insert_one(&document)
            .await
            .map_err(|source| {
                MongoDaoError::on_write(GAME_NAME_CONSTRAINT, source, |source| {
                    MongoDaoError::SaveGame { name, source }
                })
            })?;

        Ok(GameId(id))
    }

    async fn delete_game(&self, name: String) -> MongoResult<bool> {
        let removed = self
            .games()
            .await
            .find_one_and_delete(doc! {"name": name.as_str()})
            .await
            .map_err(|source| MongoDaoError::DeleteGame {
                name: name.clone(),
                source,
            })?;

        let Some(game) = removed else {
            return Ok(false);
        };

        let servers = self
            .servers()
            .await
            .delete_many(doc! {"game_id": game.id})
            .await
            .map_err(|source| MongoDaoError::DeleteGame {
                name: name.clone(),
                source,
            })?;
        let saves = self
            .saves()
            .await
            .delete_many(doc! {"game_id": game.id})
            .await
            .map_err(|source| MongoDaoError::DeleteGame {
                name: name.clone(),
                source,
            })?;

        debug!(
            game = %name,
            servers = servers.deleted_count,
            saves = saves.deleted_count,
            "removed game and its dependents"
        );
        Ok(true)
    }

    async fn find_game(&self, name: String) -> MongoResult<Option<GameEntity>> {
        let document = self
            .games()
            .await
            .find_one(doc! {"name": name.as_str()})
            .await
            .map_err(|source| MongoDaoError::LoadGame { name, source })?;

        Ok(document.map(Into::into))
    }

    async fn list_servers(&self, game_id: GameId) -> MongoResult<Vec<ServerEntity>> {
        let documents: Vec<MongoServerDocument> = self
            .servers()
            .await
            .find(doc! {"game_id": game_id.0})
            .await
            .map_err(|source| MongoDaoError::ListServers {
                game_id: game_id.0,
                source,
            })?
            .try_collect()
            .await
            .map_err(|source| MongoDaoError::ListServers {
                game_id: game_id.0,
                source,
            })?;

        Ok(documents.into_iter().map(Into::into).collect())
    }

    /// Whether the game with primary key `game_id` still exists.
    async fn game_exists(&self, game_id: i64, name: &str) -> MongoResult<bool> {
        let count = self
            .games()
            .await
            .count_documents(doc! {"_id": game_id})
            .limit(1)
            .await
            .map_err(|source| MongoDaoError::LoadGame {
                name: name.to_owned(),
                source,
            })?;

        Ok(count > 0)
    }

    async fn upsert_server(
        &self,
        endpoint: Endpoint,
        game_name: String,
    ) -> MongoResult<Option<ServerId>> {
        let Some(game) = self.find_game(game_name.clone()).await? else {
            return Ok(None);
        };
        let game_id = game.id.0;

        // Only consumed when the upsert inserts; otherwise the sequence skips a value.
        let candidate = self.next_id(SERVER_COLLECTION_NAME).await?;
        let save_error = |source: MongoError| MongoDaoError::SaveServer {
            endpoint: endpoint.to_string(),
            source,
        };

        let document = self
            .servers()
            .await
            .find_one_and_update(
                doc! {"address": endpoint.address.as_str(), "port": i32::from(endpoint.port)},
                doc! {
                    "$set": {"game_id": game_id},
                    "$setOnInsert": {"_id": candidate},
                },
            )
            .upsert(true)
            .return_document(ReturnDocument::After)
            .await
            .map_err(|source| {
                MongoDaoError::on_write(SERVER_ENDPOINT_CONSTRAINT, source, save_error)
            })?;

        let server = document.ok_or_else(|| MongoDaoError::MissingServer {
            endpoint: endpoint.to_string(),
        })?;

        // delete_game removes the game before sweeping its servers, so a game
        // still present here guarantees the sweep will see this row.
        if !self.game_exists(game_id, &game_name).await? {
            self.servers()
                .await
                .delete_one(doc! {"_id": server.id, "game_id": game_id})
                .await
                .map_err(save_error)?;
            debug!(%endpoint, game = %game_name, "game removed during server registration");
            return Ok(None);
        }

        Ok(Some(ServerId(server.id)))
    }

    async fn delete_server(&self, id: ServerId) -> MongoResult<bool> {
        let result = self
            .servers()
            .await
            .delete_one(doc! {"_id": id.0})
            .await
            .map_err(|source| MongoDaoError::DeleteServer { id: id.0, source })?;

        Ok(result.deleted_count > 0)
    }

    async fn insert_user(&self, identifier: String, password_hash: String) -> MongoResult<UserId> {
        let id = self.next_id(USER_COLLECTION_NAME).await?;
        let document = MongoUserDocument {
            id,
            identifier: identifier.clone(),
            password_hash,
        };

        self.users()
            .await
            .insert_one(&document)
            .await
            .map_err(|source| {
                MongoDaoError::on_write(USER_IDENTIFIER_CONSTRAINT, source, |source| {
                    MongoDaoError::SaveUser { identifier, source }
                })
            })?;

        Ok(UserId(id))
    }

    async fn find_user(&self, identifier: String) -> MongoResult<Option<UserEntity>> {
        let document = self
            .users()
            .await
            .find_one(doc! {"identifier": identifier})
            .await
            .map_err(|source| MongoDaoError::LoadUser { source })?;

        Ok(document.map(Into::into))
    }

    async fn user_exists(&self, id: UserId) -> MongoResult<bool> {
        let count = self
            .users()
            .await
            .count_documents(doc! {"_id": id.0})
            .limit(1)
            .await
            .map_err(|source| MongoDaoError::LoadUser { source })?;

        Ok(count > 0)
    }

    async fn find_save(&self, user_id: UserId, game_id: GameId) -> MongoResult<Option<Vec<u8>>> {
        let document = self
            .saves()
            .await
            .find_one(doc! {"user_id": user_id.0, "game_id": game_id.0})
            .await
            .map_err(|source| MongoDaoError::LoadSave {
                user_id: user_id.0,
                game_id: game_id.0,
                source,
            })?;

        Ok(document.map(|save| save.blob.bytes))
    }

    async fn upsert_save(
        &self,
        user_id: UserId,
        game_name: String,
        blob: Vec<u8>,
    ) -> MongoResult<bool> {
        let Some(game) = self.find_game(game_name.clone()).await? else {
            return Ok(false);
        };
        let game_id = game.id.0;
        let filter = doc! {"user_id": user_id.0, "game_id": game_id};
        let save_error = |source: MongoError| MongoDaoError::SaveSave {
            user_id: user_id.0,
            game_id,
            source,
        };

        self.saves()
            .await
            .update_one(filter.clone(), doc! {"$set": {"blob": blob_as_binary(blob)}})
            .upsert(true)
            .await
            .map_err(|source| {
                MongoDaoError::on_write(SAVE_OWNER_CONSTRAINT, source, save_error)
            })?;

        if !self.game_exists(game_id, &game_name).await? {
            self.saves()
                .await
                .delete_one(filter)
                .await
                .map_err(save_error)?;
            debug!(%user_id, game = %game_name, "game removed during save upload");
            return Ok(false);
        }

        Ok(true)
    }
}

async fn ensure_unique_index(
    database: &Database,
    collection: &'static str,
    keys: Document,
    name: &'static str,
) -> MongoResult<()> {
    let model = IndexModel::builder()
        .keys(keys)
        .options(
            IndexOptions::builder()
                .name(Some(name.to_owned()))
                .unique(Some(true))
                .build(),
        )
        .build();

    database
        .collection::<Document>(collection)
        .create_index(model)
        .await
        .map_err(|source| MongoDaoError::EnsureIndex {
            collection,
            index: name,
            source,
        })?;
    Ok(())
}

impl RegistryStore for MongoRegistryStore {
    fn insert_game(&self, name: String) -> BoxFuture<'static, StorageResult<GameId>> {
        let store = self.clone();
        Box::pin(async move { store.insert_game(name).await.map_err(Into::into) })
    }

    fn delete_game(&self, name: String) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        Box::pin(async move { store.delete_game(name).await.map_err(Into::into) })
    }

    fn find_game(&self, name: String) -> BoxFuture<'static, StorageResult<Option<GameEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.find_game(name).await.map_err(Into::into) })
    }

    fn list_servers(&self, game_id: GameId) -> BoxFuture<'static, StorageResult<Vec<ServerEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.list_servers(game_id).await.map_err(Into::into) })
    }

    fn upsert_server(
        &self,
        endpoint: Endpoint,
        game_name: String,
    ) -> BoxFuture<'static, StorageResult<Option<ServerId>>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .upsert_server(endpoint, game_name)
                .await
                .map_err(Into::into)
        })
    }

    fn delete_server(&self, id: ServerId) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        Box::pin(async move { store.delete_server(id).await.map_err(Into::into) })
    }

    fn insert_user(
        &self,
        identifier: String,
        password_hash: String,
    ) -> BoxFuture<'static, StorageResult<UserId>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .insert_user(identifier, password_hash)
                .await
                .map_err(Into::into)
        })
    }

    fn find_user(&self, identifier: String) -> BoxFuture<'static, StorageResult<Option<UserEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.find_user(identifier).await.map_err(Into::into) })
    }

    fn user_exists(&self, id: UserId) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        Box::pin(async move { store.user_exists(id).await.map_err(Into::into) })
    }

    fn find_save(
        &self,
        user_id: UserId,
        game_id: GameId,
    ) -> BoxFuture<'static, StorageResult<Option<Vec<u8>>>> {
        let store = self.clone();
        Box::pin(async move { store.find_save(user_id, game_id).await.map_err(Into::into) })
    }

    fn upsert_save(
        &self,
        user_id: UserId,
        game_name: String,
        blob: Vec<u8>,
    ) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .upsert_save(user_id, game_name, blob)
                .await
                .map_err(Into::into)
        })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.inner.ping().await.map_err(Into::into) })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.inner.reconnect().await.map_err(Into::into) })
    }
}
