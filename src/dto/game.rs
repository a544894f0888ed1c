use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::{dao::models::GameId, dto::validation::validate_not_blank};

/// Payload naming a game to create or remove.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct GameNameRequest {
    /// Unique game name.
    #[validate(length(min = 1, max = 64), custom(function = validate_not_blank))]
    pub name: String,
}

/// Identifier of a game in the catalog.
#[derive(Debug, Serialize, ToSchema)]
pub struct GameIdResponse {
    /// Catalog id of the game.
    pub id: i64,
}

impl From<GameId> for GameIdResponse {
    fn from(value: GameId) -> Self {
        Self { id: value.0 }
    }
}
