//! services/api/src/web/users.rs
//!
//! User registration endpoint.

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use playlist_core::domain::User;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, warn};
use utoipa::ToSchema;

use crate::error::{ErrorResponse, HandlerError};
use crate::web::rest::MessageResponse;
use crate::web::state::AppState;

//=========================================================================================
// Request/Response Types
//=========================================================================================

/// The identity-provider profile of the user being registered.
///
/// Any JSON object is accepted; absent fields are stored as empty strings.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(default)]
pub struct RegisterUserRequest {
    pub spotify_id: String,
    pub spotify_display_name: String,
    pub spotify_email: String,
}

//=========================================================================================
// Handlers
//=========================================================================================

/// POST /api/user/register - Register a user on first sign-in.
///
/// Registering an id that already exists is a no-op; stored fields are never updated.
#[utoipa::path(
    post,
    path = "/api/user/register",
    request_body = RegisterUserRequest,
    responses(
        (status = 200, description = "User registered, or already registered", body = MessageResponse),
        (status = 400, description = "Body is not a JSON object", body = ErrorResponse)
    )
)]
pub async fn register_user_handler(
    State(app_state): State<Arc<AppState>>,
    payload: Result<Json<RegisterUserRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, HandlerError> {
    let Json(req) = payload?;
    info!(
        spotify_id = %req.spotify_id,
        display_name = %req.spotify_display_name,
        "User registration request"
    );

    let db = &app_state.store;
    match db.find_user(&req.spotify_id).await {
        Ok(Some(_)) => return Ok(Json(MessageResponse::new("User already registered"))),
        Ok(None) => {}
        Err(e) => warn!("User lookup failed, inserting anyway: {}", e),
    }

    let user = User {
        id: req.spotify_id,
        name: req.spotify_display_name,
        email: req.spotify_email,
    };
    let outcome = db.insert_user(&user).await;
    // The caller is told the user is registered whatever the insert reported.
    if let Err(e) = outcome {
        warn!("Failed to insert user {}: {}", user.id, e);
    }

    Ok(Json(MessageResponse::new("User registered")))
}
