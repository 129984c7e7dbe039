//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, which is the concrete implementation
//! of the `PlaylistStore` port from the `core` crate. It handles all interactions
//! with the hosted PostgreSQL database using `sqlx`.

use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use playlist_core::domain::{
    ClipWindow, NewPlaylist, Playlist, PlaylistTrack, PlaylistTrackLink, PlaylistWithTracks,
    StoredTrack, TrackMetadata, User,
};
use playlist_core::ports::{PlaylistStore, PortError, PortResult};
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::config::DataStoreConfig;

/// Opens the connection pool described by `config`.
pub async fn connect(config: &DataStoreConfig) -> Result<PgPool, sqlx::Error> {
    let options = PgConnectOptions::from_str(&config.url)?.password(&config.key);
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect_with(options)
        .await
}

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the `PlaylistStore` port.
#[derive(Clone)]
pub struct DbAdapter {
    pool: PgPool,
}

impl DbAdapter {
    /// Creates a new `DbAdapter`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Store-side rejections keep the database's message; everything else is unexpected.
/// Lookups use `fetch_optional`, so a missing row is never an error here.
fn map_sqlx(e: sqlx::Error) -> PortError {
    match e {
        sqlx::Error::Database(db) => PortError::Query(db.message().to_string()),
        other => PortError::Unexpected(other.to_string()),
    }
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct UserRecord {
    id: String,
    name: String,
    email: String,
}
impl UserRecord {
    fn to_domain(self) -> User {
        User {
            id: self.id,
            name: self.name,
            email: self.email,
        }
    }
}

#[derive(FromRow)]
struct PlaylistRecord {
    id: Uuid,
    user_id: String,
    name: String,
    created_at: DateTime<Utc>,
}
impl PlaylistRecord {
    fn to_domain(self) -> Playlist {
        Playlist {
            id: self.id,
            user_id: self.user_id,
            name: self.name,
            created_at: self.created_at,
        }
    }
}

#[derive(FromRow)]
struct StoredTrackRecord {
    id: Uuid,
    spotify_track_id: String,
}
impl StoredTrackRecord {
    fn to_domain(self) -> StoredTrack {
        StoredTrack {
            id: self.id,
            catalog_id: self.spotify_track_id,
        }
    }
}

#[derive(FromRow)]
struct PlaylistTrackRecord {
    playlist_id: Uuid,
    track_id: Uuid,
    start_time: i32,
    end_time: i32,
    position: i32,
    spotify_track_id: String,
    name: String,
    artist: String,
    cover_url: String,
}
impl PlaylistTrackRecord {
    fn to_domain(self) -> PlaylistTrack {
        PlaylistTrack {
            track_id: self.track_id,
            track: TrackMetadata {
                catalog_id: self.spotify_track_id,
                name: self.name,
                artist: self.artist,
                cover_url: self.cover_url,
            },
            // Rows written before validation existed are returned as stored.
            window: ClipWindow {
                start_time: self.start_time,
                end_time: self.end_time,
            },
            position: self.position,
        }
    }
}

/// Attaches each track row to its playlist, keeping the playlists' order.
/// Track rows must already be sorted by position.
fn group_playlists(
    playlists: Vec<PlaylistRecord>,
    tracks: Vec<PlaylistTrackRecord>,
) -> Vec<PlaylistWithTracks> {
    let mut grouped: Vec<PlaylistWithTracks> = playlists
        .into_iter()
        .map(|p| PlaylistWithTracks {
            playlist: p.to_domain(),
            tracks: Vec::new(),
        })
        .collect();

    for track in tracks {
        if let Some(entry) = grouped
            .iter_mut()
            .find(|g| g.playlist.id == track.playlist_id)
        {
            entry.tracks.push(track.to_domain());
        }
    }
    grouped
}

//=========================================================================================
// `PlaylistStore` Trait Implementation
//=========================================================================================

#[async_trait]
impl PlaylistStore for DbAdapter {
    async fn find_user(&self, user_id: &str) -> PortResult<Option<User>> {
        let record = sqlx::query_as::<_, UserRecord>(
            "SELECT id, name, email FROM users WHERE id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx)?;
        Ok(record.map(UserRecord::to_domain))
    }

    async fn insert_user(&self, user: &User) -> PortResult<()> {
        sqlx::query("INSERT INTO users (id, name, email) VALUES ($1, $2, $3)")
            .bind(&user.id)
            .bind(&user.name)
            .bind(&user.email)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx)?;
        Ok(())
    }

    async fn list_playlists(&self, user_id: &str) -> PortResult<Vec<PlaylistWithTracks>> {
        let playlists = sqlx::query_as::<_, PlaylistRecord>(
            "SELECT id, user_id, name, created_at FROM playlists WHERE user_id = $1 ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx)?;

        if playlists.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<Uuid> = playlists.iter().map(|p| p.id).collect();
        let tracks = sqlx::query_as::<_, PlaylistTrackRecord>(
            "SELECT pt.playlist_id, pt.track_id, pt.start_time, pt.end_time, pt.position, \
                    t.spotify_track_id, t.name, t.artist, t.cover_url \
             FROM playlist_tracks pt \
             INNER JOIN tracks t ON t.id = pt.track_id \
             WHERE pt.playlist_id = ANY($1) \
             ORDER BY pt.playlist_id, pt.position ASC",
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx)?;

        Ok(group_playlists(playlists, tracks))
    }

    async fn insert_playlist(&self, playlist: &NewPlaylist) -> PortResult<Playlist> {
        let record = sqlx::query_as::<_, PlaylistRecord>(
            "INSERT INTO playlists (id, user_id, name) VALUES ($1, $2, $3) \
             RETURNING id, user_id, name, created_at",
        )
        .bind(playlist.id)
        .bind(&playlist.user_id)
        .bind(&playlist.name)
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx)?;
        Ok(record.to_domain())
    }

    async fn upsert_playlist(&self, playlist: &NewPlaylist) -> PortResult<Playlist> {
        let record = sqlx::query_as::<_, PlaylistRecord>(
            "INSERT INTO playlists (id, user_id, name) VALUES ($1, $2, $3) \
             ON CONFLICT (id) DO UPDATE SET user_id = EXCLUDED.user_id, name = EXCLUDED.name \
             RETURNING id, user_id, name, created_at",
        )
        .bind(playlist.id)
        .bind(&playlist.user_id)
        .bind(&playlist.name)
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx)?;
        Ok(record.to_domain())
    }

    async fn delete_playlist(&self, playlist_id: Uuid) -> PortResult<()> {
        sqlx::query("DELETE FROM playlists WHERE id = $1")
            .bind(playlist_id)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx)?;
        Ok(())
    }

    async fn upsert_tracks(&self, tracks: &[TrackMetadata]) -> PortResult<Vec<StoredTrack>> {
        if tracks.is_empty() {
            return Ok(Vec::new());
        }

        let catalog_ids: Vec<&str> = tracks.iter().map(|t| t.catalog_id.as_str()).collect();
        let names: Vec<&str> = tracks.iter().map(|t| t.name.as_str()).collect();
        let artists: Vec<&str> = tracks.iter().map(|t| t.artist.as_str()).collect();
        let covers: Vec<&str> = tracks.iter().map(|t| t.cover_url.as_str()).collect();

        // Catalog ids must be distinct within one statement for ON CONFLICT to accept it.
        let records = sqlx::query_as::<_, StoredTrackRecord>(
            "INSERT INTO tracks (spotify_track_id, name, artist, cover_url) \
             SELECT * FROM UNNEST($1::text[], $2::text[], $3::text[], $4::text[]) \
             ON CONFLICT (spotify_track_id) DO UPDATE \
                SET name = EXCLUDED.name, artist = EXCLUDED.artist, cover_url = EXCLUDED.cover_url \
             RETURNING id, spotify_track_id",
        )
        .bind(&catalog_ids)
        .bind(&names)
        .bind(&artists)
        .bind(&covers)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx)?;

        Ok(records.into_iter().map(StoredTrackRecord::to_domain).collect())
    }

    async fn insert_playlist_tracks(&self, links: &[PlaylistTrackLink]) -> PortResult<()> {
        if links.is_empty() {
            return Ok(());
        }

        let playlist_ids: Vec<Uuid> = links.iter().map(|l| l.playlist_id).collect();
        let track_ids: Vec<Uuid> = links.iter().map(|l| l.track_id).collect();
        let starts: Vec<i32> = links.iter().map(|l| l.window.start_time).collect();
        let ends: Vec<i32> = links.iter().map(|l| l.window.end_time).collect();
        let positions: Vec<i32> = links.iter().map(|l| l.position).collect();

        sqlx::query(
            "INSERT INTO playlist_tracks (playlist_id, track_id, start_time, end_time, position) \
             SELECT * FROM UNNEST($1::uuid[], $2::uuid[], $3::int4[], $4::int4[], $5::int4[])",
        )
        .bind(&playlist_ids)
        .bind(&track_ids)
        .bind(&starts)
        .bind(&ends)
        .bind(&positions)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx)?;
        Ok(())
    }

    async fn delete_playlist_tracks(&self, playlist_id: Uuid) -> PortResult<()> {
        sqlx::query("DELETE FROM playlist_tracks WHERE playlist_id = $1")
            .bind(playlist_id)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx)?;
        Ok(())
    }
}
