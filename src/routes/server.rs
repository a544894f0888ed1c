use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
};
use validator::Validate;

use crate::{
    dao::models::ServerId,
    dto::server::{DeregisterServerRequest, EndpointDto, RegisterServerRequest, ServerIdResponse},
    error::AppError,
    state::SharedState,
};

/// Routes through which game servers announce and withdraw themselves.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route(
            "/active_server",
            post(register_server).delete(deregister_server),
        )
        .route("/active_server/{name}", get(list_servers))
}

/// List reachable servers of a game.
#[utoipa::path(
    get,
    path = "/active_server/{name}",
    tag = "servers",
    params(("name" = String, Path, description = "Game name")),
    responses(
        (status = 200, description = "Registered endpoints; empty for an unknown game", body = [EndpointDto])
    )
)]
pub async fn list_servers(
    State(state): State<SharedState>,
    Path(name): Path<String>,
) -> Result<Json<Vec<EndpointDto>>, AppError> {
    let endpoints = state.servers().await?.list(&name).await?;
    Ok(Json(endpoints.into_iter().map(Into::into).collect()))
}

/// Register a server endpoint, or move an existing one to another game.
#[utoipa::path(
    post,
    path = "/active_server",
    tag = "servers",
    request_body = RegisterServerRequest,
    responses(
        (status = 200, description = "Server registered", body = ServerIdResponse),
        (status = 404, description = "Unknown game")
    )
)]
pub async fn register_server(
    State(state): State<SharedState>,
    Json(payload): Json<RegisterServerRequest>,
) -> Result<Json<ServerIdResponse>, AppError> {
    payload.validate()?;
    let id = state
        .servers()
        .await?
        .register(&payload.ip, payload.port, &payload.game_name)
        .await?;
    Ok(Json(id.into()))
}

/// Withdraw a server. Unknown ids succeed as well.
#[utoipa::path(
    delete,
    path = "/active_server",
    tag = "servers",
    request_body = DeregisterServerRequest,
    responses((status = 204, description = "Server no longer registered"))
)]
pub async fn deregister_server(
    State(state): State<SharedState>,
    Json(payload): Json<DeregisterServerRequest>,
) -> Result<StatusCode, AppError> {
    state
        .servers()
        .await?
        .deregister(ServerId(payload.id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
