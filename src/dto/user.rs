use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::{dao::models::UserId, dto::validation::validate_not_blank};

/// Identifier and clear-text password, used for both registration and login.
#[derive(Deserialize, ToSchema, Validate)]
pub struct CredentialsRequest {
    /// Unique login identifier.
    #[validate(length(min = 1, max = 64), custom(function = validate_not_blank))]
    pub identifier: String,
    /// Clear-text password; only its hash is stored.
    #[validate(length(min = 1, max = 256))]
    pub password: String,
}

// Keeps passwords out of request traces.
impl std::fmt::Debug for CredentialsRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialsRequest")
            .field("identifier", &self.identifier)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Identifier of a user.
#[derive(Debug, Serialize, ToSchema)]
pub struct UserIdResponse {
    /// Id of the registered or authenticated user.
    pub id: i64,
}

impl From<UserId> for UserIdResponse {
    fn from(value: UserId) -> Self {
        Self { id: value.0 }
    }
}
