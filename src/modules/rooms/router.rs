use crate::modules::rooms::controller::{
    create_room, delete_room, get_rooms, update_room, upload_rooms,
};
use crate::state::AppState;
use axum::{
    Router,
    routing::{post, put},
};

pub fn init_rooms_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_room).get(get_rooms))
        .route("/upload", post(upload_rooms))
        .route("/{id}", put(update_room).delete(delete_room))
}
