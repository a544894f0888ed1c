use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::dto::validation::validate_not_blank;

/// Header carrying the owner of an uploaded save.
pub const USER_ID_HEADER: &str = "user-id";
/// Header carrying the game of an uploaded save.
pub const GAME_NAME_HEADER: &str = "game-name";

/// Request for the save of one player in one game.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct GetSaveRequest {
    /// User id returned at login.
    pub id: i64,
    /// Game name.
    #[validate(length(min = 1, max = 64), custom(function = validate_not_blank))]
    pub game: String,
}
