use axum::{
    Json, Router,
    body::Bytes,
    extract::{DefaultBodyLimit, State},
    http::{HeaderMap, StatusCode, header},
    response::IntoResponse,
    routing::post,
};
use validator::Validate;

use crate::{
    dao::models::UserId,
    dto::{
        save::{GAME_NAME_HEADER, GetSaveRequest, USER_ID_HEADER},
        validation::validate_not_blank,
    },
    error::AppError,
    state::SharedState,
};

/// Largest save blob accepted by `POST /save`.
pub const MAX_SAVE_BYTES: usize = 8 * 1024 * 1024;

/// Save upload and download.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/get_save", post(get_save))
        .route(
            "/save",
            post(put_save).layer(DefaultBodyLimit::max(MAX_SAVE_BYTES)),
        )
}

/// Download the save of a player for a game.
#[utoipa::path(
    post,
    path = "/get_save",
    tag = "saves",
    request_body = GetSaveRequest,
    responses(
        (status = 200, description = "Save blob", body = Vec<u8>, content_type = "application/octet-stream"),
        (status = 404, description = "No save stored")
    )
)]
pub async fn get_save(
    State(state): State<SharedState>,
    Json(payload): Json<GetSaveRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let blob = state
        .saves()
        .await?
        .get(UserId(payload.id), &payload.game)
        .await?;
    Ok(([(header::CONTENT_TYPE, "application/octet-stream")], blob))
}

/// Upload the save of a player, replacing the previous one.
#[utoipa::path(
    post,
    path = "/save",
    tag = "saves",
    params(
        ("user-id" = i64, Header, description = "Owner of the save"),
        ("game-name" = String, Header, description = "Game the save belongs to")
    ),
    request_body(content = Vec<u8>, content_type = "application/octet-stream"),
    responses(
        (status = 204, description = "Save stored"),
        (status = 404, description = "Unknown user or game")
    )
)]
pub async fn put_save(
    State(state): State<SharedState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<StatusCode, AppError> {
    let user_id = header_value(&headers, USER_ID_HEADER)?
        .parse::<i64>()
        .map_err(|_| AppError::BadRequest(format!("`{USER_ID_HEADER}` must be an integer")))?;
    let game_name = header_value(&headers, GAME_NAME_HEADER)?;
    validate_not_blank(game_name)
        .map_err(|_| AppError::BadRequest(format!("`{GAME_NAME_HEADER}` must not be blank")))?;

    state
        .saves()
        .await?
        .put(UserId(user_id), game_name, body.to_vec())
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

fn header_value<'a>(headers: &'a HeaderMap, name: &str) -> Result<&'a str, AppError> {
    headers
        .get(name)
        .ok_or_else(|| AppError::BadRequest(format!("missing `{name}` header")))?
        .to_str()
        .map_err(|_| AppError::BadRequest(format!("`{name}` header is not valid text")))
}
