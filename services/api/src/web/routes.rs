//! services/api/src/web/routes.rs
//!
//! Builds the HTTP router shared by the server binary and the integration tests.

use axum::{
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::web::{
    playlists::{
        create_playlist_handler, delete_playlist_handler, list_playlists_handler,
        update_playlist_handler,
    },
    rest::health_handler,
    state::AppState,
    users::register_user_handler,
};

/// All API routes with CORS open to every origin.
pub fn router(app_state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Segments at the same depth must share a parameter name: `{id}` is the
    // user id for GET/PUT and the playlist id for DELETE.
    Router::new()
        .route("/health", get(health_handler))
        .route("/api/user/register", post(register_user_handler))
        .route("/api/playlists", post(create_playlist_handler))
        .route(
            "/api/playlists/{id}",
            get(list_playlists_handler).delete(delete_playlist_handler),
        )
        .route("/api/playlists/{id}/{playlist_id}", put(update_playlist_handler))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(app_state)
}
