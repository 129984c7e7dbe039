//! Common test utilities and fixtures
#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use playlist_api::{
    adapters::MemoryStore,
    config::Config,
    web::{router, state::AppState},
};
use playlist_core::domain::{
    NewPlaylist, Playlist, PlaylistTrackLink, PlaylistWithTracks, StoredTrack, TrackMetadata,
    User,
};
use playlist_core::ports::{PlaylistStore, PortError, PortResult};
use serde_json::Value;
use std::sync::Arc;
use tower::util::ServiceExt;
use uuid::Uuid;

/// Store calls a `FailingStore` can be told to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    FindUser,
    InsertUser,
    ListPlaylists,
    InsertPlaylist,
    UpsertPlaylist,
    DeletePlaylist,
    UpsertTracks,
    InsertPlaylistTracks,
    DeletePlaylistTracks,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Failure {
    Reject,
    Disconnect,
    /// The call succeeds but returns no rows.
    Empty,
}

/// Wraps a `MemoryStore`, failing exactly one kind of call.
pub struct FailingStore {
    pub inner: Arc<MemoryStore>,
    step: Step,
    failure: Failure,
}

impl FailingStore {
    /// Fails `step` the way the database rejects a query.
    pub fn rejecting(inner: Arc<MemoryStore>, step: Step) -> Self {
        Self { inner, step, failure: Failure::Reject }
    }

    /// Fails `step` the way a dropped connection does.
    pub fn disconnecting(inner: Arc<MemoryStore>, step: Step) -> Self {
        Self { inner, step, failure: Failure::Disconnect }
    }

    /// Saves track metadata but reports no stored rows back.
    pub fn losing_track_rows(inner: Arc<MemoryStore>) -> Self {
        Self { inner, step: Step::UpsertTracks, failure: Failure::Empty }
    }

    fn check(&self, step: Step) -> PortResult<()> {
        if step != self.step {
            return Ok(());
        }
        match self.failure {
            Failure::Reject => Err(PortError::Query(format!("{:?} rejected by store", step))),
            Failure::Disconnect => {
                Err(PortError::Unexpected("connection reset by peer".to_string()))
            }
            Failure::Empty => Ok(()),
        }
    }
}

#[async_trait]
impl PlaylistStore for FailingStore {
    async fn find_user(&self, user_id: &str) -> PortResult<Option<User>> {
        self.check(Step::FindUser)?;
        self.inner.find_user(user_id).await
    }

    async fn insert_user(&self, user: &User) -> PortResult<()> {
        self.check(Step::InsertUser)?;
        self.inner.insert_user(user).await
    }

    async fn list_playlists(&self, user_id: &str) -> PortResult<Vec<PlaylistWithTracks>> {
        self.check(Step::ListPlaylists)?;
        self.inner.list_playlists(user_id).await
    }

    async fn insert_playlist(&self, playlist: &NewPlaylist) -> PortResult<Playlist> {
        self.check(Step::InsertPlaylist)?;
        self.inner.insert_playlist(playlist).await
    }

    async fn upsert_playlist(&self, playlist: &NewPlaylist) -> PortResult<Playlist> {
        self.check(Step::UpsertPlaylist)?;
        self.inner.upsert_playlist(playlist).await
    }

    async fn delete_playlist(&self, playlist_id: Uuid) -> PortResult<()> {
        self.check(Step::DeletePlaylist)?;
        self.inner.delete_playlist(playlist_id).await
    }

    async fn upsert_tracks(&self, tracks: &[TrackMetadata]) -> PortResult<Vec<StoredTrack>> {
        self.check(Step::UpsertTracks)?;
        let stored = self.inner.upsert_tracks(tracks).await?;
        if self.step == Step::UpsertTracks && self.failure == Failure::Empty {
            return Ok(Vec::new());
        }
        Ok(stored)
    }

    async fn insert_playlist_tracks(&self, links: &[PlaylistTrackLink]) -> PortResult<()> {
        self.check(Step::InsertPlaylistTracks)?;
        self.inner.insert_playlist_tracks(links).await
    }

    async fn delete_playlist_tracks(&self, playlist_id: Uuid) -> PortResult<()> {
        self.check(Step::DeletePlaylistTracks)?;
        self.inner.delete_playlist_tracks(playlist_id).await
    }
}

/// Builds the real router over `store` with a local-mode config.
pub fn create_test_app(store: Arc<dyn PlaylistStore>) -> Router {
    let config = Arc::new(Config::from_lookup(|_| None).unwrap());
    router(Arc::new(AppState::new(store, config)))
}

/// Sends one request and returns the status with the decoded JSON body
/// (`Value::Null` when the body is empty).
pub async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&json).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

/// Test fixtures
pub mod fixtures {
    use serde_json::{json, Value};

    pub const USER_ID: &str = "u1";

    pub fn track(id: &str, start: i64, end: i64) -> Value {
        json!({
            "id": id,
            "name": format!("Song {}", id),
            "artist": "Art",
            "cover": format!("https://covers.example.com/{}.jpg", id),
            "startTime": start,
            "endTime": end
        })
    }

    pub fn create_body(user_id: &str, name: &str, tracks: Vec<Value>) -> Value {
        json!({ "userId": user_id, "name": name, "tracks": tracks })
    }

    pub fn update_body(name: &str, tracks: Vec<Value>) -> Value {
        json!({ "updatedPlaylist": { "name": name, "tracks": tracks } })
    }
}
