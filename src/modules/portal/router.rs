use crate::state::AppState;
use axum::{
    Router,
    routing::{get, put},
};

use super::controller::{change_password, get_profile};

pub fn init_portal_router() -> Router<AppState> {
    Router::new()
        .route("/profile", get(get_profile))
        .route("/password", put(change_password))
}
