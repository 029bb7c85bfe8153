//! `AuthUser` extractor: validates the bearer token and yields a request context.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use tracing::debug;

use chathub_core::error::AppError;
use chathub_service::RequestContext;

use crate::error::ApiError;
use crate::state::AppState;

/// The authenticated caller.
#[derive(Debug, Clone)]
pub struct AuthUser(pub RequestContext);

impl std::ops::Deref for AuthUser {
    type Target = RequestContext;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| AppError::authentication("No token, authorization denied"))?;

        let token = header.strip_prefix("Bearer ").unwrap_or(header).trim();

        let claims = state.jwt_decoder.decode(token).map_err(|e| {
            debug!(error = %e, "Rejected bearer token");
            AppError::authentication("Token is not valid")
        })?;

        Ok(AuthUser(RequestContext::new(claims.user_id(), claims.email)))
    }
}
