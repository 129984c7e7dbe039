pub mod domain;
pub mod ports;

pub use domain::{
    ClipWindow, InvalidClipWindow, NewPlaylist, Playlist, PlaylistEntry, PlaylistTrack,
    PlaylistTrackLink, PlaylistWithTracks, StoredTrack, TrackMetadata, UnlinkedTrack, User,
};
pub use ports::{PlaylistStore, PortError, PortResult};
