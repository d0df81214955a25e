//! Party slideshow server library
//!
//! This library exposes the internal modules for the binaries and the
//! end-to-end tests.

pub mod admin_auth;
pub mod config;
pub mod party_store;
pub mod server;
pub mod slideshow;
pub mod sqlite_persistence;
pub mod video_rotation;

// Re-export commonly used types for convenience
pub use party_store::{PartyStore, SqlitePartyStore};
pub use server::{make_app, run_server, RequestsLoggingLevel, ServerConfig};
pub use slideshow::SlideDeck;
pub use video_rotation::{PlayCountFile, VideoRotation};
