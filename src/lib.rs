pub mod album;
pub mod api;
pub mod commands;
pub mod config;
pub mod console;
pub mod error;
pub mod parsing;
pub mod session_persistence;
pub mod track;

pub use album::{Album, AlbumRef, AlbumSummary};
#[cfg(any(test, feature = "mock"))]
pub use api::MockScrobbleApi;
pub use api::{LastFmApiClientImpl, ScrobbleApi};
pub use commands::{Commands, Context};
pub use config::{ApiCredentials, Config};
pub use console::Console;
pub use error::ScrobbleError;
pub use session_persistence::TokenStore;
pub use track::{ScrobbleReport, Track};

pub type Result<T> = std::result::Result<T, ScrobbleError>;
