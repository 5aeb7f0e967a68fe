use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use hostelbyte_auth::{Claims, Role, verify_token};
use hostelbyte_core::AppError;
use uuid::Uuid;

use crate::state::AppState;

/// Extractor that validates the bearer token and exposes its claims.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Claims);

impl AuthUser {
    pub fn user_id(&self) -> Result<Uuid, AppError> {
        Uuid::parse_str(&self.0.sub)
            .map_err(|_| AppError::unauthorized("Invalid user ID in token"))
    }

    pub fn role(&self) -> Role {
        self.0.role
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::unauthorized("Missing authorization header"))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::unauthorized("Invalid authorization header format"))?;

        let claims = verify_token(token, &state.jwt_config)?;

        Ok(AuthUser(claims))
    }
}

/// An authenticated student. Rejects admin tokens with 403.
#[derive(Debug, Clone)]
pub struct StudentUser(pub AuthUser);

impl StudentUser {
    pub fn student_id(&self) -> Result<Uuid, AppError> {
        self.0.user_id()
    }
}

impl FromRequestParts<AppState> for StudentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_user = AuthUser::from_request_parts(parts, state).await?;
        if auth_user.role() != Role::Student {
            return Err(AppError::forbidden("Access denied. Students only"));
        }
        Ok(StudentUser(auth_user))
    }
}
