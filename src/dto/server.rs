use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    dao::models::{Endpoint, ServerId},
    dto::validation::{validate_address, validate_not_blank},
};

/// Announcement sent by a game server when it starts accepting players.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct RegisterServerRequest {
    /// IP address or hostname players should connect to.
    #[validate(custom(function = validate_address))]
    pub ip: String,
    /// Listening port.
    #[validate(range(min = 1))]
    pub port: u16,
    /// Game the server hosts.
    #[validate(length(min = 1, max = 64), custom(function = validate_not_blank))]
    pub game_name: String,
}

/// Request removing a registered server.
#[derive(Debug, Deserialize, ToSchema)]
pub struct DeregisterServerRequest {
    /// Id returned at registration.
    pub id: i64,
}

/// Identifier of a registered server.
#[derive(Debug, Serialize, ToSchema)]
pub struct ServerIdResponse {
    /// Registry id of the endpoint.
    pub id: i64,
}

impl From<ServerId> for ServerIdResponse {
    fn from(value: ServerId) -> Self {
        Self { id: value.0 }
    }
}

/// Reachable server endpoint.
#[derive(Debug, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct EndpointDto {
    /// IP address or hostname.
    pub address: String,
    /// Listening port.
    pub port: u16,
}

impl From<Endpoint> for EndpointDto {
    fn from(value: Endpoint) -> Self {
        Self {
            address: value.address,
            port: value.port,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(ip: &str, port: u16, game_name: &str) -> RegisterServerRequest {
        RegisterServerRequest {
            ip: ip.into(),
            port,
            game_name: game_name.into(),
        }
    }

    #[test]
    fn valid_announcement_passes() {
        assert!(request("1.2.3.4", 7777, "Doom").validate().is_ok());
    }

    #[test]
    fn each_field_is_checked() {
        let errors = request("not an ip", 0, " ").validate().unwrap_err();
        let fields = errors.field_errors();

        assert!(fields.contains_key("ip"));
        assert!(fields.contains_key("port"));
        assert!(fields.contains_key("game_name"));
    }
}
