use crate::Track;

/// An album candidate returned by a search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlbumSummary {
    pub name: String,
    pub artist: String,
    pub mbid: Option<String>,
}

impl std::fmt::Display for AlbumSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "\"{}\" - {}", self.name, self.artist)
    }
}

/// What an album lookup resolves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AlbumRef {
    /// A MusicBrainz ID supplied by the user
    Mbid(String),
    /// A candidate picked from search results
    Summary(AlbumSummary),
}

impl AlbumRef {
    pub fn mbid(&self) -> Option<&str> {
        match self {
            AlbumRef::Mbid(mbid) => Some(mbid),
            AlbumRef::Summary(summary) => summary.mbid.as_deref(),
        }
    }
}

/// A fully resolved album with its ordered track list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Album {
    pub name: String,
    pub artist: String,
    pub mbid: Option<String>,
    pub tracks: Vec<Track>,
}

impl std::fmt::Display for Album {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} - \"{}\"", self.artist, self.name)
    }
}
