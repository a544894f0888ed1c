use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl From<i64> for $name {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }
    };
}

entity_id!(
    /// Primary key of a game in the catalog.
    GameId
);
entity_id!(
    /// Primary key of a registered server endpoint.
    ServerId
);
entity_id!(
    /// Primary key of a registered user.
    UserId
);

/// Game known to the catalog.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GameEntity {
    /// Primary key of the game.
    pub id: GameId,
    /// Unique game name.
    pub name: String,
}

/// Network binding of a live game-server process.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Endpoint {
    /// IP address or hostname the server listens on.
    pub address: String,
    /// Port the server listens on.
    pub port: u16,
}

impl Endpoint {
    /// Build an endpoint from its address and port.
    pub fn new(address: impl Into<String>, port: u16) -> Self {
        Self {
            address: address.into(),
            port,
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.address, self.port)
    }
}

/// Registered server endpoint bound to a game.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ServerEntity {
    /// Primary key of the entry.
    pub id: ServerId,
    /// Game the server currently announces.
    pub game_id: GameId,
    /// Unique network binding.
    pub endpoint: Endpoint,
}

/// Stored user identity. The password only ever exists in hashed form.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserEntity {
    /// Primary key of the user.
    pub id: UserId,
    /// Unique login identifier.
    pub identifier: String,
    /// PHC-formatted password hash (algorithm, parameters and salt embedded).
    pub password_hash: String,
}
