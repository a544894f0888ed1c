use mongodb::error::{Error as MongoError, ErrorKind, WriteFailure};
use thiserror::Error;

/// Convenient result alias returning [`MongoDaoError`] failures.
pub type MongoResult<T> = std::result::Result<T, MongoDaoError>;

/// Server error code reported when a write violates a unique index.
const DUPLICATE_KEY_CODE: i32 = 11000;

/// Failures that can occur while interacting with MongoDB.
#[derive(Debug, Error)]
pub enum MongoDaoError {
    /// The connection string could not be parsed.
    #[error("failed to parse MongoDB connection URI `{uri}`")]
    InvalidUri {
        uri: String,
        #[source]
        source: MongoError,
    },
    /// The driver rejected the parsed client options.
    #[error("failed to build MongoDB client from options")]
    ClientConstruction {
        #[source]
        source: MongoError,
    },
    /// The server never answered a ping while connecting.
    #[error("MongoDB ping failed during initial connection after {attempts} attempt(s)")]
    InitialPing {
        attempts: u32,
        #[source]
        source: MongoError,
    },
    /// A periodic ping failed.
    #[error("MongoDB ping health check failed")]
    HealthPing {
        #[source]
        source: MongoError,
    },
    /// An index could not be created at startup.
    #[error("failed to ensure index `{index}` on collection `{collection}`")]
    EnsureIndex {
        collection: &'static str,
        index: &'static str,
        #[source]
        source: MongoError,
    },
    /// A write hit the unique index named `constraint`.
    #[error("unique index `{constraint}` rejected the write")]
    Duplicate {
        constraint: &'static str,
        #[source]
        source: MongoError,
    },
    /// The id counter could not be incremented.
    #[error("failed to allocate an id for collection `{collection}`")]
    NextId {
        collection: &'static str,
        #[source]
        source: MongoError,
    },
    /// The counter upsert returned no document.
    #[error("id counter for collection `{collection}` was not returned")]
    MissingCounter { collection: &'static str },
    /// Inserting a game failed.
    #[error("failed to save game `{name}`")]
    SaveGame {
        name: String,
        #[source]
        source: MongoError,
    },
    /// Deleting a game or its dependents failed.
    #[error("failed to delete game `{name}`")]
    DeleteGame {
        name: String,
        #[source]
        source: MongoError,
    },
    /// Reading a game failed.
    #[error("failed to load game `{name}`")]
    LoadGame {
        name: String,
        #[source]
        source: MongoError,
    },
    /// Listing the servers of a game failed.
    #[error("failed to list servers of game `{game_id}`")]
    ListServers {
        game_id: i64,
        #[source]
        source: MongoError,
    },
    /// Upserting a server entry failed.
    #[error("failed to register server `{endpoint}`")]
    SaveServer {
        endpoint: String,
        #[source]
        source: MongoError,
    },
    /// The server upsert returned no document.
    #[error("upsert of server `{endpoint}` returned no document")]
    MissingServer { endpoint: String },
    /// Deleting a server entry failed.
    #[error("failed to delete server `{id}`")]
    DeleteServer {
        id: i64,
        #[source]
        source: MongoError,
    },
    /// Inserting a user failed.
    #[error("failed to save user `{identifier}`")]
    SaveUser {
        identifier: String,
        #[source]
        source: MongoError,
    },
    /// Reading a user failed.
    #[error("failed to load user")]
    LoadUser {
        #[source]
        source: MongoError,
    },
    /// Reading a save failed.
    #[error("failed to load save of user `{user_id}` for game `{game_id}`")]
    LoadSave {
        user_id: i64,
        game_id: i64,
        #[source]
        source: MongoError,
    },
    /// Upserting a save failed.
    #[error("failed to store save of user `{user_id}` for game `{game_id}`")]
    SaveSave {
        user_id: i64,
        game_id: i64,
        #[source]
        source: MongoError,
    },
}

impl MongoDaoError {
    /// Wrap a write failure, turning unique index violations into [`MongoDaoError::Duplicate`].
    pub fn on_write(
        constraint: &'static str,
        source: MongoError,
        otherwise: impl FnOnce(MongoError) -> Self,
    ) -> Self {
        if is_duplicate_key(&source) {
            MongoDaoError::Duplicate { constraint, source }
        } else {
            otherwise(source)
        }
    }
}

fn is_duplicate_key(err: &MongoError) -> bool {
    match err.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(write)) => write.code == DUPLICATE_KEY_CODE,
        ErrorKind::Command(command) => command.code == DUPLICATE_KEY_CODE,
        _ => false,
    }
}
