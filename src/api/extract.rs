//! Request body extractor that rejects with a structured error

use axum::extract::FromRequest;

use crate::domain::CirculationError;

/// `Json` whose rejections (bad content type, malformed body, field that
/// fails to parse) become `CirculationError::Validation`.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(CirculationError))]
pub struct ApiJson<T>(pub T);
