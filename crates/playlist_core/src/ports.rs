//! crates/playlist_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, keeping the
//! core independent of the hosted database and its client library.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{
    NewPlaylist, Playlist, PlaylistTrackLink, PlaylistWithTracks, StoredTrack, TrackMetadata,
    User,
};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    /// The store received the request and rejected it (constraint, type, syntax...).
    /// The message is the store's own text.
    #[error("{0}")]
    Query(String),
    /// The store could not be reached or answered in an unexpected way.
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

/// Table-level access to users, playlists, tracks and their join rows.
///
/// Every method is a single round trip. Callers chain them without any
/// surrounding transaction.
#[async_trait]
pub trait PlaylistStore: Send + Sync {
    // --- Users ---
    async fn find_user(&self, user_id: &str) -> PortResult<Option<User>>;

    async fn insert_user(&self, user: &User) -> PortResult<()>;

    // --- Playlists ---
    /// All playlists of `user_id`, newest first, tracks ordered by position.
    async fn list_playlists(&self, user_id: &str) -> PortResult<Vec<PlaylistWithTracks>>;

    async fn insert_playlist(&self, playlist: &NewPlaylist) -> PortResult<Playlist>;

    /// Inserts the row, or overwrites name and owner when the id exists.
    async fn upsert_playlist(&self, playlist: &NewPlaylist) -> PortResult<Playlist>;

    async fn delete_playlist(&self, playlist_id: Uuid) -> PortResult<()>;

    // --- Tracks ---
    /// Inserts or overwrites metadata keyed by catalog id, returning the stored ids.
    async fn upsert_tracks(&self, tracks: &[TrackMetadata]) -> PortResult<Vec<StoredTrack>>;

    async fn insert_playlist_tracks(&self, links: &[PlaylistTrackLink]) -> PortResult<()>;

    async fn delete_playlist_tracks(&self, playlist_id: Uuid) -> PortResult<()>;
}
