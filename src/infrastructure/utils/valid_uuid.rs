use uuid::Uuid;

use crate::errors::AppError;

/// Parses a path segment as a UUID; anything else is a client error.
pub fn valid_uuid(id: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(id).map_err(|_| AppError::InvalidInput(format!("Not a valid UUID: {}", id)))
}
