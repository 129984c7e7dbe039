pub mod playlists;
pub mod rest;
pub mod routes;
pub mod state;
pub mod users;

// Re-export the router builder so the binary can assemble the server.
pub use routes::router;
