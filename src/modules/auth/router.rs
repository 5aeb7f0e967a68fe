use crate::state::AppState;
use axum::{Router, routing::post};

use super::controller::{login_admin, login_student};

pub fn init_auth_router() -> Router<AppState> {
    Router::new()
        .route("/admin/login", post(login_admin))
        .route("/student/login", post(login_student))
}
