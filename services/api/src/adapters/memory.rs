//! services/api/src/adapters/memory.rs
//!
//! An in-process implementation of the `PlaylistStore` port. It enforces the
//! constraints of `sql/schema.sql`: primary keys, the catalog id key on
//! tracks, `UNIQUE (playlist_id, position)` and the foreign keys. A batch that
//! breaks one of them is rejected whole, as a single INSERT would be.

use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use playlist_core::domain::{
    NewPlaylist, Playlist, PlaylistTrack, PlaylistTrackLink, PlaylistWithTracks, StoredTrack,
    TrackMetadata, User,
};
use playlist_core::ports::{PlaylistStore, PortError, PortResult};
use tokio::sync::Mutex;
use uuid::Uuid;

struct TrackRow {
    id: Uuid,
    metadata: TrackMetadata,
}

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    playlists: Vec<Playlist>,
    tracks: Vec<TrackRow>,
    playlist_tracks: Vec<PlaylistTrackLink>,
}

/// A `PlaylistStore` that keeps every table in memory.
pub struct MemoryStore {
    tables: Mutex<Tables>,
    epoch: DateTime<Utc>,
    clock: AtomicI64,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            tables: Mutex::new(Tables::default()),
            epoch: Utc::now(),
            clock: AtomicI64::new(0),
        }
    }

    /// Strictly increasing creation timestamps, so ordering never ties.
    fn next_timestamp(&self) -> DateTime<Utc> {
        let tick = self.clock.fetch_add(1, Ordering::SeqCst);
        self.epoch + Duration::milliseconds(tick)
    }

    /// Number of join rows currently pointing at `playlist_id`.
    pub async fn playlist_track_count(&self, playlist_id: Uuid) -> usize {
        let tables = self.tables.lock().await;
        tables
            .playlist_tracks
            .iter()
            .filter(|l| l.playlist_id == playlist_id)
            .count()
    }

    pub async fn user_count(&self) -> usize {
        self.tables.lock().await.users.len()
    }

    pub async fn track_count(&self) -> usize {
        self.tables.lock().await.tracks.len()
    }
}

#[async_trait]
impl PlaylistStore for MemoryStore {
    async fn find_user(&self, user_id: &str) -> PortResult<Option<User>> {
        let tables = self.tables.lock().await;
        Ok(tables.users.iter().find(|u| u.id == user_id).cloned())
    }

    async fn insert_user(&self, user: &User) -> PortResult<()> {
        let mut tables = self.tables.lock().await;
        if tables.users.iter().any(|u| u.id == user.id) {
            return Err(PortError::Query(format!(
                "duplicate key value violates unique constraint \"users_pkey\" ({})",
                user.id
            )));
        }
        tables.users.push(user.clone());
        Ok(())
    }

    async fn list_playlists(&self, user_id: &str) -> PortResult<Vec<PlaylistWithTracks>> {
        let tables = self.tables.lock().await;
        let mut playlists: Vec<Playlist> = tables
            .playlists
            .iter()
            .filter(|p| p.user_id == user_id)
            .cloned()
            .collect();
        playlists.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let grouped = playlists
            .into_iter()
            .map(|playlist| {
                let mut tracks: Vec<PlaylistTrack> = tables
                    .playlist_tracks
                    .iter()
                    .filter(|l| l.playlist_id == playlist.id)
                    .filter_map(|l| {
                        let row = tables.tracks.iter().find(|t| t.id == l.track_id)?;
                        Some(PlaylistTrack {
                            track_id: row.id,
                            track: row.metadata.clone(),
                            window: l.window,
                            position: l.position,
                        })
                    })
                    .collect();
                tracks.sort_by_key(|t| t.position);
                PlaylistWithTracks { playlist, tracks }
            })
            .collect();
        Ok(grouped)
    }

    async fn insert_playlist(&self, playlist: &NewPlaylist) -> PortResult<Playlist> {
        let mut tables = self.tables.lock().await;
        if tables.playlists.iter().any(|p| p.id == playlist.id) {
            return Err(PortError::Query(format!(
                "duplicate key value violates unique constraint \"playlists_pkey\" ({})",
                playlist.id
            )));
        }
        let row = Playlist {
            id: playlist.id,
            user_id: playlist.user_id.clone(),
            name: playlist.name.clone(),
            created_at: self.next_timestamp(),
        };
        tables.playlists.push(row.clone());
        Ok(row)
    }

    async fn upsert_playlist(&self, playlist: &NewPlaylist) -> PortResult<Playlist> {
        let mut tables = self.tables.lock().await;
        if let Some(existing) = tables.playlists.iter_mut().find(|p| p.id == playlist.id) {
            existing.user_id = playlist.user_id.clone();
            existing.name = playlist.name.clone();
            return Ok(existing.clone());
        }
        let row = Playlist {
            id: playlist.id,
            user_id: playlist.user_id.clone(),
            name: playlist.name.clone(),
            created_at: self.next_timestamp(),
        };
        tables.playlists.push(row.clone());
        Ok(row)
    }

    async fn delete_playlist(&self, playlist_id: Uuid) -> PortResult<()> {
        let mut tables = self.tables.lock().await;
        if tables
            .playlist_tracks
            .iter()
            .any(|l| l.playlist_id == playlist_id)
        {
            return Err(PortError::Query(
                "update or delete on table \"playlists\" violates foreign key constraint"
                    .to_string(),
            ));
        }
        tables.playlists.retain(|p| p.id != playlist_id);
        Ok(())
    }

    async fn upsert_tracks(&self, tracks: &[TrackMetadata]) -> PortResult<Vec<StoredTrack>> {
        let mut tables = self.tables.lock().await;
        let mut stored = Vec::with_capacity(tracks.len());
        for track in tracks {
            let id = match tables
                .tracks
                .iter_mut()
                .find(|t| t.metadata.catalog_id == track.catalog_id)
            {
                Some(existing) => {
                    existing.metadata = track.clone();
                    existing.id
                }
                None => {
                    let id = Uuid::new_v4();
                    tables.tracks.push(TrackRow {
                        id,
                        metadata: track.clone(),
                    });
                    id
                }
            };
            stored.push(StoredTrack {
                id,
                catalog_id: track.catalog_id.clone(),
            });
        }
        Ok(stored)
    }

    async fn insert_playlist_tracks(&self, links: &[PlaylistTrackLink]) -> PortResult<()> {
        let mut tables = self.tables.lock().await;
        for link in links {
            if !tables.playlists.iter().any(|p| p.id == link.playlist_id)
                || !tables.tracks.iter().any(|t| t.id == link.track_id)
            {
                return Err(PortError::Query(
                    "insert or update on table \"playlist_tracks\" violates foreign key constraint"
                        .to_string(),
                ));
            }
        }
        for (index, link) in links.iter().enumerate() {
            let taken = tables
                .playlist_tracks
                .iter()
                .chain(&links[..index])
                .any(|l| l.playlist_id == link.playlist_id && l.position == link.position);
            if taken {
                return Err(PortError::Query(format!(
                    "duplicate key value violates unique constraint \"playlist_tracks_playlist_id_position_key\" ({}, {})",
                    link.playlist_id, link.position
                )));
            }
        }
        tables.playlist_tracks.extend(links.iter().cloned());
        Ok(())
    }

    async fn delete_playlist_tracks(&self, playlist_id: Uuid) -> PortResult<()> {
        let mut tables = self.tables.lock().await;
        tables
            .playlist_tracks
            .retain(|l| l.playlist_id != playlist_id);
        Ok(())
    }
}
