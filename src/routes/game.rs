use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
};
use validator::Validate;

use crate::{
    dto::game::{GameIdResponse, GameNameRequest},
    error::AppError,
    state::SharedState,
};

/// Routes managing the game catalog.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/game", post(create_game).delete(delete_game))
        .route("/game/{name}", get(get_game))
}

/// Add a game to the catalog.
#[utoipa::path(
    post,
    path = "/game",
    tag = "game",
    request_body = GameNameRequest,
    responses(
        (status = 200, description = "Game created", body = GameIdResponse),
        (status = 409, description = "Name already taken")
    )
)]
pub async fn create_game(
    State(state): State<SharedState>,
    Json(payload): Json<GameNameRequest>,
) -> Result<Json<GameIdResponse>, AppError> {
    payload.validate()?;
    let id = state.catalog().await?.register(&payload.name).await?;
    Ok(Json(id.into()))
}

/// Remove a game together with its registered servers and saves.
#[utoipa::path(
    delete,
    path = "/game",
    tag = "game",
    request_body = GameNameRequest,
    responses(
        (status = 204, description = "Game removed"),
        (status = 404, description = "Unknown game")
    )
)]
pub async fn delete_game(
    State(state): State<SharedState>,
    Json(payload): Json<GameNameRequest>,
) -> Result<StatusCode, AppError> {
    payload.validate()?;
    state.catalog().await?.remove(&payload.name).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Resolve a game name to its id.
#[utoipa::path(
    get,
    path = "/game/{name}",
    tag = "game",
    params(("name" = String, Path, description = "Game name")),
    responses(
        (status = 200, description = "Game found", body = GameIdResponse),
        (status = 404, description = "Unknown game")
    )
)]
pub async fn get_game(
    State(state): State<SharedState>,
    Path(name): Path<String>,
) -> Result<Json<GameIdResponse>, AppError> {
    let id = state.catalog().await?.resolve(&name).await?;
    Ok(Json(id.into()))
}
