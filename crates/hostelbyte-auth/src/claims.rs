//! JWT claim structures for access tokens.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Principal kind embedded in every access token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Student,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Student => "student",
        }
    }
}

/// JWT claims for access tokens.
///
/// - `sub`: admin or student ID
/// - `role`: which API surface the bearer may use
/// - `exp` / `iat`: expiry and issued-at Unix timestamps
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Claims {
    /// Principal ID (subject claim)
    pub sub: String,
    /// Principal kind
    pub role: Role,
    /// Token expiration timestamp (Unix timestamp)
    pub exp: usize,
    /// Token issued-at timestamp (Unix timestamp)
    pub iat: usize,
}
