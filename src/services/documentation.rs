use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for the game registry.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::game::create_game,
        crate::routes::game::delete_game,
        crate::routes::game::get_game,
        crate::routes::server::list_servers,
        crate::routes::server::register_server,
        crate::routes::server::deregister_server,
        crate::routes::user::register,
        crate::routes::user::login,
        crate::routes::save::get_save,
        crate::routes::save::put_save,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::game::GameNameRequest,
            crate::dto::game::GameIdResponse,
            crate::dto::server::RegisterServerRequest,
            crate::dto::server::DeregisterServerRequest,
            crate::dto::server::ServerIdResponse,
            crate::dto::server::EndpointDto,
            crate::dto::user::CredentialsRequest,
            crate::dto::user::UserIdResponse,
            crate::dto::save::GetSaveRequest,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "game", description = "Game catalog"),
        (name = "servers", description = "Live game-server registry"),
        (name = "users", description = "Registration and login"),
        (name = "saves", description = "Per-player save blobs"),
    )
)]
pub struct ApiDoc;
