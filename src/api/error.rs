//! HTTP mapping for circulation errors

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::domain::CirculationError;

impl CirculationError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            CirculationError::BookUnavailable
            | CirculationError::AlreadyBorrowed
            | CirculationError::HasOverdueBooks
            | CirculationError::InvalidState(_)
            | CirculationError::AlreadyPaid
            | CirculationError::DuplicateKey(_) => StatusCode::CONFLICT,
            CirculationError::NotFound(_) => StatusCode::NOT_FOUND,
            CirculationError::PermissionDenied(_) => StatusCode::FORBIDDEN,
            CirculationError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            CirculationError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<JsonRejection> for CirculationError {
    fn from(rejection: JsonRejection) -> Self {
        CirculationError::Validation(rejection.body_text())
    }
}

impl IntoResponse for CirculationError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if let CirculationError::Database(ref e) = self {
            tracing::error!("Database error: {}", e);
        } else {
            tracing::debug!("Request rejected ({}): {}", self.kind(), self);
        }

        (
            status,
            Json(json!({
                "error": self.kind(),
                "message": self.to_string()
            })),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conflicts_and_lookups() {
        assert_eq!(
            CirculationError::HasOverdueBooks.status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            CirculationError::DuplicateKey("isbn").status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            CirculationError::NotFound("Book").status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            CirculationError::Validation("bad".into()).status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }
}
