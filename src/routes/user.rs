use axum::{Json, Router, extract::State, routing::post};
use validator::Validate;

use crate::{
    dto::user::{CredentialsRequest, UserIdResponse},
    error::AppError,
    state::SharedState,
};

/// Account registration and login.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
}

/// Create an account.
#[utoipa::path(
    post,
    path = "/register",
    tag = "users",
    request_body = CredentialsRequest,
    responses(
        (status = 200, description = "User registered", body = UserIdResponse),
        (status = 409, description = "Identifier already registered")
    )
)]
pub async fn register(
    State(state): State<SharedState>,
    Json(payload): Json<CredentialsRequest>,
) -> Result<Json<UserIdResponse>, AppError> {
    payload.validate()?;
    let id = state
        .credentials()
        .await?
        .register(&payload.identifier, &payload.password)
        .await?;
    Ok(Json(id.into()))
}

/// Check credentials and return the user id.
#[utoipa::path(
    post,
    path = "/login",
    tag = "users",
    request_body = CredentialsRequest,
    responses(
        (status = 200, description = "Authenticated", body = UserIdResponse),
        (status = 401, description = "Invalid identifier or password")
    )
)]
pub async fn login(
    State(state): State<SharedState>,
    Json(payload): Json<CredentialsRequest>,
) -> Result<Json<UserIdResponse>, AppError> {
    payload.validate()?;
    let id = state
        .credentials()
        .await?
        .authenticate(&payload.identifier, &payload.password)
        .await?;
    Ok(Json(id.into()))
}
