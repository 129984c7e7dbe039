//! services/api/src/web/rest.rs
//!
//! Contains the master definition for the OpenAPI specification, the
//! payloads shared across endpoints and the health check.

use crate::config::Environment;
use crate::error::ErrorResponse;
use crate::web::playlists::{
    CreatePlaylistRequest, PlaylistInput, PlaylistResponse, PlaylistRowResponse, TrackInput,
    TrackResponse, UpdatePlaylistRequest,
};
use crate::web::state::AppState;
use crate::web::users::RegisterUserRequest;
use axum::{extract::State, Json};
use serde::Serialize;
use std::sync::Arc;
use utoipa::{OpenApi, ToSchema};

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        health_handler,
        crate::web::users::register_user_handler,
        crate::web::playlists::list_playlists_handler,
        crate::web::playlists::create_playlist_handler,
        crate::web::playlists::delete_playlist_handler,
        crate::web::playlists::update_playlist_handler,
    ),
    components(
        schemas(
            MessageResponse,
            HealthResponse,
            ErrorResponse,
            RegisterUserRequest,
            TrackInput,
            CreatePlaylistRequest,
            PlaylistInput,
            UpdatePlaylistRequest,
            TrackResponse,
            PlaylistResponse,
            PlaylistRowResponse,
        )
    ),
    tags(
        (name = "Clip Playlist API", description = "User registration and playlists of clipped catalog tracks.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// Shared Payloads
//=========================================================================================

/// A plain confirmation message.
#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub environment: String,
}

//=========================================================================================
// Handlers
//=========================================================================================

/// Liveness check. Does not touch the store.
#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service is up", body = HealthResponse))
)]
pub async fn health_handler(State(app_state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let environment = match app_state.config.environment {
        Environment::Production => "production",
        Environment::Local => "local",
    };
    Json(HealthResponse {
        status: "ok".to_string(),
        environment: environment.to_string(),
    })
}
