//! Role-based authorization middleware.

use axum::{
    extract::{FromRequestParts, Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use hostelbyte_auth::Role;
use hostelbyte_core::AppError;

use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// Lets the request through only if the bearer token carries `required`.
///
/// The verified [`AuthUser`] is stored in the request extensions.
pub async fn require_role(
    State(state): State<AppState>,
    req: Request,
    next: Next,
    required: Role,
) -> Result<Response, AppError> {
    let (mut parts, body) = req.into_parts();
    let auth_user = AuthUser::from_request_parts(&mut parts, &state).await?;

    if auth_user.role() != required {
        return Err(AppError::forbidden(format!(
            "Access denied. Required role: {}, but user has role: {}",
            required.as_str(),
            auth_user.role().as_str()
        )));
    }

    parts.extensions.insert(auth_user);
    Ok(next.run(Request::from_parts(parts, body)).await)
}

/// Layer function for the admin API.
///
/// ```rust,ignore
/// Router::new()
///     .nest("/rooms", init_rooms_router())
///     .route_layer(middleware::from_fn_with_state(state.clone(), require_admin));
/// ```
pub async fn require_admin(State(state): State<AppState>, req: Request, next: Next) -> Response {
    match require_role(State(state), req, next, Role::Admin).await {
        Ok(response) => response,
        Err(err) => err.into_response(),
    }
}
