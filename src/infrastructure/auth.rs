//! Identity adapter: turns a bearer JWT into a [`Caller`].
//!
//! Tokens are issued by the external identity provider; `create_jwt` exists for
//! tooling and tests that need to act as that provider.

use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::env;

use axum::{
    async_trait,
    extract::{FromRequestParts, Json},
    http::{StatusCode, request::Parts},
};
use serde_json::json;

use crate::domain::{Caller, Role};

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // user id
    pub role: String,
    pub exp: usize,
}

impl Claims {
    pub fn caller(&self) -> Result<Caller, String> {
        let user_id = self
            .sub
            .parse::<i32>()
            .map_err(|_| format!("Invalid subject '{}'", self.sub))?;
        let role = Role::parse(&self.role).ok_or_else(|| format!("Unknown role '{}'", self.role))?;
        Ok(Caller { user_id, role })
    }
}

type Rejection = (StatusCode, Json<serde_json::Value>);

fn unauthorized(message: &str) -> Rejection {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "error": "unauthorized", "message": message })),
    )
}

#[async_trait]
impl<S> FromRequestParts<S> for Caller
where
    S: Send + Sync,
{
    type Rejection = Rejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("Authorization")
            .and_then(|h| h.to_str().ok())
            .ok_or_else(|| unauthorized("Missing Authorization header"))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or_else(|| unauthorized("Invalid Authorization header format"))?;

        let claims = decode_jwt(token).map_err(|e| {
            tracing::debug!("Rejected token: {}", e);
            unauthorized("Invalid or expired token")
        })?;

        claims.caller().map_err(|e| {
            tracing::debug!("Rejected claims: {}", e);
            (
                StatusCode::FORBIDDEN,
                Json(json!({ "error": "permission_denied", "message": e })),
            )
        })
    }
}

fn get_jwt_secret() -> Result<String, String> {
    match env::var("JWT_SECRET") {
        Ok(secret) => Ok(secret),
        Err(_) if cfg!(debug_assertions) => Ok("secret".to_string()),
        Err(_) => Err("JWT_SECRET environment variable must be set in production".to_string()),
    }
}

pub fn create_jwt(user_id: i32, role: Role) -> Result<String, String> {
    let secret = get_jwt_secret()?;
    let expiration = Utc::now()
        .checked_add_signed(Duration::hours(24))
        .ok_or_else(|| "Expiration out of range".to_string())?
        .timestamp();

    let claims = Claims {
        sub: user_id.to_string(),
        role: role.as_str().to_owned(),
        exp: expiration as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| e.to_string())
}

pub fn decode_jwt(token: &str) -> Result<Claims, String> {
    let secret = get_jwt_secret()?;
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jwt_round_trip_carries_role() {
        let token = create_jwt(42, Role::Librarian).expect("Failed to create JWT");
        let claims = decode_jwt(&token).expect("Failed to verify JWT");
        assert_eq!(claims.caller(), Ok(Caller::librarian(42)));
    }

    #[test]
    fn test_unknown_role_is_rejected() {
        let claims = Claims {
            sub: "5".to_string(),
            role: "admin".to_string(),
            exp: 0,
        };
        assert!(claims.caller().is_err());
    }

    #[test]
    fn test_garbage_token_is_rejected() {
        assert!(decode_jwt("not.a.token").is_err());
    }
}
