//! Caller identity extraction.
//!
//! The upstream identity provider stays external; this service only
//! needs a stable per-user identifier. Handlers take an [`AuthUser`]
//! argument and get a 401 rejection when no identity is present.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts},
};

use crate::error::ApiError;

/// Authenticated caller, extracted from `Authorization: Bearer <id>`
/// or the `x-user-id` header.
#[derive(Debug, Clone)]
pub struct AuthUser(pub String);

impl AuthUser {
    pub fn id(&self) -> &str {
        &self.0
    }
}

fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

fn user_id_header(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get("x-user-id")?
        .to_str()
        .ok()
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        bearer_token(parts)
            .or_else(|| user_id_header(parts))
            .map(|id| AuthUser(id.to_string()))
            .ok_or(ApiError::Unauthorized)
    }
}
