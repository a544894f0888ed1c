use mongodb::bson::{Binary, spec::BinarySubtype};
use serde::{Deserialize, Serialize};

use crate::dao::models::{Endpoint, GameEntity, GameId, ServerEntity, ServerId, UserEntity, UserId};

/// Document stored in the `games` collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoGameDocument {
    #[serde(rename = "_id")]
    pub id: i64,
    pub name: String,
}

impl From<MongoGameDocument> for GameEntity {
    fn from(value: MongoGameDocument) -> Self {
        Self {
            id: GameId(value.id),
            name: value.name,
        }
    }
}

/// Document stored in the `active_servers` collection, unique on `(address, port)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoServerDocument {
    #[serde(rename = "_id")]
    pub id: i64,
    pub game_id: i64,
    pub address: String,
    pub port: u16,
}

impl From<MongoServerDocument> for ServerEntity {
    fn from(value: MongoServerDocument) -> Self {
        Self {
            id: ServerId(value.id),
            game_id: GameId(value.game_id),
            endpoint: Endpoint::new(value.address, value.port),
        }
    }
}

/// Document stored in the `users` collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoUserDocument {
    #[serde(rename = "_id")]
    pub id: i64,
    pub identifier: String,
    pub password_hash: String,
}

impl From<MongoUserDocument> for UserEntity {
    fn from(value: MongoUserDocument) -> Self {
        Self {
            id: UserId(value.id),
            identifier: value.identifier,
            password_hash: value.password_hash,
        }
    }
}

/// Document stored in the `saves` collection, unique on `(user_id, game_id)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoSaveDocument {
    pub user_id: i64,
    pub game_id: i64,
    pub blob: Binary,
}

/// Monotonic id sequence, one document per collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoCounterDocument {
    #[serde(rename = "_id")]
    pub collection: String,
    pub seq: i64,
}

/// Wrap raw save bytes as a generic BSON binary.
pub fn blob_as_binary(blob: Vec<u8>) -> Binary {
    Binary {
        subtype: BinarySubtype::Generic,
        bytes: blob,
    }
}
