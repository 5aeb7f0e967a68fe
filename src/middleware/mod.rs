//! Authentication extractors and role middleware.
//!
//! 1. Client sends `Authorization: Bearer <token>`
//! 2. [`auth::AuthUser`] verifies the JWT and exposes its claims
//! 3. [`role::require_admin`] guards the admin API as a route layer
//! 4. [`auth::StudentUser`] guards the student portal handlers
//!
//! ```ignore
//! async fn get_profile(student: StudentUser, State(state): State<AppState>) { /* ... */ }
//! ```

pub mod auth;
pub mod role;
