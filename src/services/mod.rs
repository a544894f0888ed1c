/// Game name to id mapping.
pub mod catalog;
/// User registration and authentication.
pub mod credentials;
/// OpenAPI documentation generation.
pub mod documentation;
/// Health check service.
pub mod health_service;
/// Argon2id password hashing.
pub mod password;
/// Live server endpoint registry.
pub mod registry;
/// Per-player per-game save blobs.
pub mod saves;
/// Storage connection supervision and degraded mode.
pub mod storage_supervisor;

use crate::error::ServiceError;

/// Reject empty or whitespace-only values before they reach storage.
fn require_non_blank(field: &str, value: &str) -> Result<(), ServiceError> {
    if value.trim().is_empty() {
        return Err(ServiceError::InvalidInput(format!(
            "{field} must not be empty"
        )));
    }
    Ok(())
}
