use crate::{Result, ScrobbleError};

/// Duration assumed for tracks whose length the service does not report.
pub const DEFAULT_TRACK_SECONDS: u32 = 180;

/// A single track to be scrobbled.
///
/// Built directly from flags, prompts or a batch file line, or taken from an
/// album's track list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Track {
    /// The track name/title
    pub name: String,
    /// The artist name
    pub artist: String,
    /// The album name (may be empty)
    pub album: String,
    /// Track length in seconds, when known
    pub duration: Option<u32>,
}

impl Track {
    pub fn new(name: &str, artist: &str, album: &str) -> Self {
        Self {
            name: name.to_string(),
            artist: artist.to_string(),
            album: album.to_string(),
            duration: None,
        }
    }

    /// Check that the track carries enough information to be scrobbled.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(ScrobbleError::InvalidTrack(
                "track title is empty".to_string(),
            ));
        }
        if self.artist.trim().is_empty() {
            return Err(ScrobbleError::InvalidTrack(format!(
                "no artist for \"{}\"",
                self.name
            )));
        }
        Ok(())
    }

    pub fn duration_or_default(&self) -> u32 {
        match self.duration {
            Some(seconds) if seconds > 0 => seconds,
            _ => DEFAULT_TRACK_SECONDS,
        }
    }
}

impl std::fmt::Display for Track {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.album.is_empty() {
            write!(f, "{} - {}", self.artist, self.name)
        } else {
            write!(f, "{} - {} [{}]", self.artist, self.name, self.album)
        }
    }
}

/// Outcome of a scrobble submission as counted by the service.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScrobbleReport {
    pub accepted: u32,
    pub ignored: u32,
}

impl ScrobbleReport {
    pub fn merge(self, other: ScrobbleReport) -> Self {
        Self {
            accepted: self.accepted + other.accepted,
            ignored: self.ignored + other.ignored,
        }
    }
}
