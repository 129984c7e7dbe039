//! crates/playlist_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any database or wire format.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// A registered listener, keyed by their identity-provider subject id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
}

/// Display metadata for a song in the external catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackMetadata {
    pub catalog_id: String,
    pub name: String,
    pub artist: String,
    pub cover_url: String,
}

/// A stored `tracks` row, as returned after an upsert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredTrack {
    pub id: Uuid,
    pub catalog_id: String,
}

/// The excerpt of a source track that a playlist plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClipWindow {
    pub start_time: i32,
    pub end_time: i32,
}

impl ClipWindow {
    /// Builds a window, rejecting negative starts and empty or inverted ranges.
    pub fn new(start_time: i32, end_time: i32) -> Result<Self, InvalidClipWindow> {
        if start_time < 0 || start_time >= end_time {
            return Err(InvalidClipWindow {
                start_time,
                end_time,
            });
        }
        Ok(Self {
            start_time,
            end_time,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid clip window: startTime {start_time} must be >= 0 and less than endTime {end_time}")]
pub struct InvalidClipWindow {
    pub start_time: i32,
    pub end_time: i32,
}

/// One entry of a playlist as submitted by a client, before it is stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaylistEntry {
    pub track: TrackMetadata,
    pub window: ClipWindow,
}

/// A join row linking a playlist to a stored track.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaylistTrackLink {
    pub playlist_id: Uuid,
    pub track_id: Uuid,
    pub window: ClipWindow,
    pub position: i32,
}

/// A playlist row, without its tracks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Playlist {
    pub id: Uuid,
    pub user_id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// The fields a caller supplies when creating or replacing a playlist row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPlaylist {
    pub id: Uuid,
    pub user_id: String,
    pub name: String,
}

/// A track as it appears inside a listed playlist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaylistTrack {
    pub track_id: Uuid,
    pub track: TrackMetadata,
    pub window: ClipWindow,
    pub position: i32,
}

/// A playlist together with its tracks in ascending `position` order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaylistWithTracks {
    pub playlist: Playlist,
    pub tracks: Vec<PlaylistTrack>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("track {catalog_id} has no stored row")]
pub struct UnlinkedTrack {
    pub catalog_id: String,
}

/// Pairs each entry with the stored track for its catalog id and numbers
/// the links by array order.
///
/// Fails on the first entry that has no stored track.
pub fn link_entries(
    playlist_id: Uuid,
    entries: &[PlaylistEntry],
    stored: &[StoredTrack],
) -> Result<Vec<PlaylistTrackLink>, UnlinkedTrack> {
    entries
        .iter()
        .enumerate()
        .map(|(index, entry)| {
            let track = stored
                .iter()
                .find(|s| s.catalog_id == entry.track.catalog_id)
                .ok_or_else(|| UnlinkedTrack {
                    catalog_id: entry.track.catalog_id.clone(),
                })?;
            Ok(PlaylistTrackLink {
                playlist_id,
                track_id: track.id,
                window: entry.window,
                position: index as i32,
            })
        })
        .collect()
}

/// Collapses entries sharing a catalog id into one metadata record each,
/// keeping first-seen order and the last-seen metadata.
pub fn distinct_tracks(entries: &[PlaylistEntry]) -> Vec<TrackMetadata> {
    let mut tracks: Vec<TrackMetadata> = Vec::with_capacity(entries.len());
    for entry in entries {
        match tracks
            .iter_mut()
            .find(|t| t.catalog_id == entry.track.catalog_id)
        {
            Some(existing) => *existing = entry.track.clone(),
            None => tracks.push(entry.track.clone()),
        }
    }
    tracks
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(catalog_id: &str, name: &str) -> PlaylistEntry {
        PlaylistEntry {
            track: TrackMetadata {
                catalog_id: catalog_id.to_string(),
                name: name.to_string(),
                artist: "Artist".to_string(),
                cover_url: "https://img/cover.jpg".to_string(),
            },
            window: ClipWindow::new(0, 30).unwrap(),
        }
    }

    #[test]
    fn clip_window_accepts_forward_range() {
        let window = ClipWindow::new(10, 45).unwrap();
        assert_eq!(window.start_time, 10);
        assert_eq!(window.end_time, 45);
    }

    #[test]
    fn clip_window_rejects_empty_inverted_and_negative() {
        assert!(ClipWindow::new(30, 30).is_err());
        assert!(ClipWindow::new(40, 10).is_err());
        assert!(ClipWindow::new(-1, 10).is_err());
    }

    #[test]
    fn distinct_tracks_keeps_order_and_last_metadata() {
        let entries = vec![entry("a", "first"), entry("b", "b"), entry("a", "second")];
        let tracks = distinct_tracks(&entries);
        assert_eq!(tracks.len(), 2);
        assert_eq!(tracks[0].catalog_id, "a");
        assert_eq!(tracks[0].name, "second");
        assert_eq!(tracks[1].catalog_id, "b");
    }

    #[test]
    fn link_entries_numbers_positions_by_array_order() {
        let playlist_id = Uuid::new_v4();
        let entries = vec![entry("a", "A"), entry("b", "B"), entry("a", "A again")];
        let stored = vec![
            StoredTrack { id: Uuid::new_v4(), catalog_id: "b".to_string() },
            StoredTrack { id: Uuid::new_v4(), catalog_id: "a".to_string() },
        ];

        let links = link_entries(playlist_id, &entries, &stored).unwrap();

        assert_eq!(links.iter().map(|l| l.position).collect::<Vec<_>>(), vec![0, 1, 2]);
        assert_eq!(links[0].track_id, stored[1].id);
        assert_eq!(links[1].track_id, stored[0].id);
        assert_eq!(links[2].track_id, stored[1].id);
        assert!(links.iter().all(|l| l.playlist_id == playlist_id));
    }

    #[test]
    fn link_entries_reports_missing_track() {
        let err = link_entries(Uuid::new_v4(), &[entry("zzz", "Z")], &[]).unwrap_err();
        assert_eq!(err.catalog_id, "zzz");
        assert_eq!(err.to_string(), "track zzz has no stored row");
    }
}
