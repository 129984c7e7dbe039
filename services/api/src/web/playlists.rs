//! services/api/src/web/playlists.rs
//!
//! Playlist endpoints: list, create, replace and delete.
//!
//! Multi-step writes run their store calls one after another with no
//! surrounding transaction. A failed step is reported to the caller and the
//! steps before it stay applied.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};
use chrono::{DateTime, Utc};
use playlist_core::domain::{
    distinct_tracks, link_entries, ClipWindow, InvalidClipWindow, NewPlaylist, Playlist,
    PlaylistEntry, PlaylistTrack, PlaylistWithTracks, StoredTrack, TrackMetadata,
};
use playlist_core::ports::{PlaylistStore, PortError};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::{ErrorResponse, HandlerError};
use crate::web::rest::MessageResponse;
use crate::web::state::AppState;

//=========================================================================================
// Request Payloads
//=========================================================================================

/// A track as submitted by the client.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TrackInput {
    /// Catalog id of the song, unless `trackId` is given.
    pub id: String,
    /// Catalog id, as echoed back from the list endpoint.
    #[serde(default)]
    pub track_id: Option<String>,
    pub name: String,
    pub artist: String,
    pub cover: String,
    pub start_time: i32,
    pub end_time: i32,
}

impl TrackInput {
    fn into_entry(self) -> Result<PlaylistEntry, InvalidClipWindow> {
        let window = ClipWindow::new(self.start_time, self.end_time)?;
        Ok(PlaylistEntry {
            track: TrackMetadata {
                catalog_id: self.track_id.unwrap_or(self.id),
                name: self.name,
                artist: self.artist,
                cover_url: self.cover,
            },
            window,
        })
    }
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePlaylistRequest {
    pub user_id: String,
    pub name: String,
    #[serde(default)]
    pub tracks: Vec<TrackInput>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct PlaylistInput {
    pub name: String,
    #[serde(default)]
    pub tracks: Vec<TrackInput>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePlaylistRequest {
    pub updated_playlist: PlaylistInput,
}

//=========================================================================================
// Response Payloads
//=========================================================================================

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TrackResponse {
    /// Stored track id.
    pub id: Uuid,
    /// Catalog id of the song.
    pub track_id: String,
    pub artist: String,
    pub name: String,
    pub cover: String,
    pub start_time: i32,
    pub end_time: i32,
    pub position: i32,
}

impl From<PlaylistTrack> for TrackResponse {
    fn from(t: PlaylistTrack) -> Self {
        Self {
            id: t.track_id,
            track_id: t.track.catalog_id,
            artist: t.track.artist,
            name: t.track.name,
            cover: t.track.cover_url,
            start_time: t.window.start_time,
            end_time: t.window.end_time,
            position: t.position,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PlaylistResponse {
    pub id: Uuid,
    pub name: String,
    pub tracks: Vec<TrackResponse>,
}

impl From<PlaylistWithTracks> for PlaylistResponse {
    fn from(p: PlaylistWithTracks) -> Self {
        Self {
            id: p.playlist.id,
            name: p.playlist.name,
            tracks: p.tracks.into_iter().map(TrackResponse::from).collect(),
        }
    }
}

/// The stored playlist row returned after creation.
#[derive(Debug, Serialize, ToSchema)]
pub struct PlaylistRowResponse {
    pub id: Uuid,
    pub user_id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl From<Playlist> for PlaylistRowResponse {
    fn from(p: Playlist) -> Self {
        Self {
            id: p.id,
            user_id: p.user_id,
            name: p.name,
            created_at: p.created_at,
        }
    }
}

//=========================================================================================
// Helpers
//=========================================================================================

fn to_entries(tracks: Vec<TrackInput>) -> Result<Vec<PlaylistEntry>, HandlerError> {
    tracks
        .into_iter()
        .map(|t| {
            t.into_entry()
                .map_err(|e| HandlerError::BadRequest(e.to_string()))
        })
        .collect()
}

fn parse_playlist_id(raw: &str) -> Result<Uuid, HandlerError> {
    Uuid::parse_str(raw)
        .map_err(|e| HandlerError::BadRequest(format!("Invalid playlist id '{}': {}", raw, e)))
}

/// Logs a failed step and classifies it for the response.
fn step_failed(step: &'static str) -> impl Fn(PortError) -> HandlerError {
    move |e| {
        error!("{} failed: {}", step, e);
        HandlerError::from(e)
    }
}

async fn store_tracks(
    db: &dyn PlaylistStore,
    entries: &[PlaylistEntry],
) -> Result<Vec<StoredTrack>, HandlerError> {
    db.upsert_tracks(&distinct_tracks(entries))
        .await
        .map_err(step_failed("Saving track metadata"))
}

async fn link_tracks(
    db: &dyn PlaylistStore,
    playlist_id: Uuid,
    entries: &[PlaylistEntry],
    stored: &[StoredTrack],
) -> Result<(), HandlerError> {
    let links = link_entries(playlist_id, entries, stored)
        .map_err(|e| HandlerError::Unexpected(e.to_string()))?;
    db.insert_playlist_tracks(&links)
        .await
        .map_err(step_failed("Adding playlist tracks"))
}

//=========================================================================================
// Handlers
//=========================================================================================

/// GET /api/playlists/{userId} - List a user's playlists, newest first.
#[utoipa::path(
    get,
    path = "/api/playlists/{userId}",
    params(("userId" = String, Path, description = "Owner of the playlists.")),
    responses(
        (status = 200, description = "The user's playlists", body = Vec<PlaylistResponse>),
        (status = 400, description = "Store query failed", body = ErrorResponse)
    )
)]
pub async fn list_playlists_handler(
    State(app_state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<PlaylistResponse>>, HandlerError> {
    let playlists = app_state
        .store
        .list_playlists(&user_id)
        .await
        .map_err(|e| {
            error!("Failed to list playlists for {}: {}", user_id, e);
            HandlerError::from(e)
        })?;

    Ok(Json(playlists.into_iter().map(PlaylistResponse::from).collect()))
}

/// POST /api/playlists - Create a playlist with its tracks.
#[utoipa::path(
    post,
    path = "/api/playlists",
    request_body = CreatePlaylistRequest,
    responses(
        (status = 200, description = "Playlist created", body = PlaylistRowResponse),
        (status = 400, description = "Invalid request or a store step failed", body = ErrorResponse),
        (status = 500, description = "Internal fault", body = ErrorResponse)
    )
)]
pub async fn create_playlist_handler(
    State(app_state): State<Arc<AppState>>,
    payload: Result<Json<CreatePlaylistRequest>, JsonRejection>,
) -> Result<Json<PlaylistRowResponse>, HandlerError> {
    let Json(req) = payload?;
    info!(
        user_id = %req.user_id,
        name = %req.name,
        tracks = req.tracks.len(),
        "Creating playlist"
    );
    let entries = to_entries(req.tracks)?;
    let db = app_state.store.as_ref();

    // 1. Track metadata
    let stored = store_tracks(db, &entries).await?;

    // 2. Playlist row
    let playlist = db
        .insert_playlist(&NewPlaylist {
            id: Uuid::new_v4(),
            user_id: req.user_id,
            name: req.name,
        })
        .await
        .map_err(step_failed("Creating playlist"))?;

    // 3. Join rows
    link_tracks(db, playlist.id, &entries, &stored).await?;

    Ok(Json(playlist.into()))
}

/// DELETE /api/playlists/{playlistId} - Delete a playlist and its tracks.
#[utoipa::path(
    delete,
    path = "/api/playlists/{playlistId}",
    params(("playlistId" = Uuid, Path, description = "Playlist to delete.")),
    responses(
        (status = 200, description = "Playlist deleted", body = MessageResponse),
        (status = 400, description = "Invalid id or a store step failed", body = ErrorResponse)
    )
)]
pub async fn delete_playlist_handler(
    State(app_state): State<Arc<AppState>>,
    Path(playlist_id): Path<String>,
) -> Result<Json<MessageResponse>, HandlerError> {
    let playlist_id = parse_playlist_id(&playlist_id)?;
    info!(%playlist_id, "Deleting playlist");
    let db = &app_state.store;

    db.delete_playlist_tracks(playlist_id).await.map_err(|e| {
        error!("Failed to delete tracks of playlist {}: {}", playlist_id, e);
        HandlerError::from(e)
    })?;

    db.delete_playlist(playlist_id).await.map_err(|e| {
        error!("Failed to delete playlist {}: {}", playlist_id, e);
        HandlerError::from(e)
    })?;

    Ok(Json(MessageResponse::new("Playlist deleted")))
}

/// PUT /api/playlists/{userId}/{playlistId} - Replace a playlist's name and tracks.
///
/// Tracks missing from the new list are dropped; there is no merge.
#[utoipa::path(
    put,
    path = "/api/playlists/{userId}/{playlistId}",
    request_body = UpdatePlaylistRequest,
    params(
        ("userId" = String, Path, description = "Owner of the playlist."),
        ("playlistId" = Uuid, Path, description = "Playlist to replace.")
    ),
    responses(
        (status = 200, description = "Playlist updated", body = MessageResponse),
        (status = 400, description = "Invalid request or a store step failed", body = ErrorResponse),
        (status = 500, description = "Internal fault", body = ErrorResponse)
    )
)]
pub async fn update_playlist_handler(
    State(app_state): State<Arc<AppState>>,
    Path((user_id, playlist_id)): Path<(String, String)>,
    payload: Result<Json<UpdatePlaylistRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, HandlerError> {
    let playlist_id = parse_playlist_id(&playlist_id)?;
    let Json(req) = payload?;
    let updated = req.updated_playlist;
    info!(
        %user_id,
        %playlist_id,
        tracks = updated.tracks.len(),
        "Updating playlist"
    );
    let entries = to_entries(updated.tracks)?;
    let db = app_state.store.as_ref();

    // 1. Playlist row
    db.upsert_playlist(&NewPlaylist {
        id: playlist_id,
        user_id,
        name: updated.name,
    })
    .await
    .map_err(step_failed("Updating playlist"))?;

    // 2. Drop the old track set
    db.delete_playlist_tracks(playlist_id)
        .await
        .map_err(step_failed("Removing old playlist tracks"))?;

    // 3. Insert the new one
    let stored = store_tracks(db, &entries).await?;
    link_tracks(db, playlist_id, &entries, &stored).await?;

    Ok(Json(MessageResponse::new("Playlist updated")))
}
