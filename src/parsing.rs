//! JSON response parsing for the Last.fm web service.
//!
//! Every parser first checks for an error document (`{"error": 6, "message": ...}`)
//! so service-side failures surface as [`ScrobbleError::Api`] rather than as
//! parse errors.

use crate::{Album, AlbumSummary, Result, ScrobbleError, ScrobbleReport, Track};
use serde::Deserialize;

/// Last.fm encodes some numbers as strings and sometimes omits them.
#[derive(Deserialize, Debug)]
#[serde(untagged)]
enum NumberOrString {
    Number(u64),
    Text(String),
}

impl NumberOrString {
    fn as_u64(&self) -> Option<u64> {
        match self {
            NumberOrString::Number(n) => Some(*n),
            NumberOrString::Text(s) => s.trim().parse().ok(),
        }
    }
}

/// Lists with a single element are serialized as a bare object.
#[derive(Deserialize, Debug)]
#[serde(untagged)]
enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

impl<T> OneOrMany<T> {
    fn into_vec(self) -> Vec<T> {
        match self {
            OneOrMany::Many(items) => items,
            OneOrMany::One(item) => vec![item],
        }
    }
}

#[derive(Deserialize)]
struct ApiErrorDocument {
    error: u32,
    #[serde(default)]
    message: String,
}

#[derive(Deserialize)]
struct ApiSessionResponse {
    session: ApiSession,
}

#[derive(Deserialize)]
struct ApiSession {
    key: String,
}

#[derive(Deserialize)]
struct ApiAlbumSearchResponse {
    results: ApiSearchResults,
}

#[derive(Deserialize)]
struct ApiSearchResults {
    albummatches: ApiAlbumMatches,
}

#[derive(Deserialize)]
struct ApiAlbumMatches {
    #[serde(default)]
    album: Option<OneOrMany<ApiAlbumMatch>>,
}

#[derive(Deserialize)]
struct ApiAlbumMatch {
    name: String,
    artist: String,
    #[serde(default)]
    mbid: Option<String>,
}

#[derive(Deserialize)]
struct ApiAlbumInfoResponse {
    album: ApiAlbumInfo,
}

#[derive(Deserialize)]
struct ApiAlbumInfo {
    name: String,
    artist: String,
    #[serde(default)]
    mbid: Option<String>,
    #[serde(default)]
    tracks: Option<ApiAlbumTracks>,
}

#[derive(Deserialize)]
struct ApiAlbumTracks {
    #[serde(default)]
    track: Option<OneOrMany<ApiAlbumTrack>>,
}

#[derive(Deserialize)]
struct ApiAlbumTrack {
    name: String,
    #[serde(default)]
    duration: Option<NumberOrString>,
    #[serde(default)]
    artist: Option<ApiArtistRef>,
}

#[derive(Deserialize)]
struct ApiArtistRef {
    name: String,
}

#[derive(Deserialize)]
struct ApiScrobbleResponse {
    scrobbles: ApiScrobbles,
}

#[derive(Deserialize)]
struct ApiScrobbles {
    #[serde(rename = "@attr")]
    attr: ApiScrobbleAttr,
}

#[derive(Deserialize)]
struct ApiScrobbleAttr {
    accepted: NumberOrString,
    ignored: NumberOrString,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Return the service error carried by `body`, if any.
pub fn check_api_error(body: &str) -> Result<()> {
    match serde_json::from_str::<ApiErrorDocument>(body) {
        Ok(doc) => Err(ScrobbleError::from_api(doc.error, doc.message)),
        Err(_) => Ok(()),
    }
}

fn parse<'a, T: Deserialize<'a>>(body: &'a str) -> Result<T> {
    check_api_error(body)?;
    serde_json::from_str(body).map_err(|e| ScrobbleError::Parse(e.to_string()))
}

/// Extract the session key from an `auth.getMobileSession` response.
pub fn parse_session_response(body: &str) -> Result<String> {
    let response: ApiSessionResponse = parse(body)?;
    Ok(response.session.key)
}

/// Parse `album.search` results, dropping entries without an MBID when required.
pub fn parse_album_search_response(body: &str, require_mbid: bool) -> Result<Vec<AlbumSummary>> {
    let response: ApiAlbumSearchResponse = parse(body)?;

    let albums = response
        .results
        .albummatches
        .album
        .map(OneOrMany::into_vec)
        .unwrap_or_default()
        .into_iter()
        .map(|a| AlbumSummary {
            name: a.name,
            artist: a.artist,
            mbid: non_empty(a.mbid),
        })
        .filter(|a| !require_mbid || a.mbid.is_some())
        .collect();

    Ok(albums)
}

/// Parse an `album.getInfo` response into an [`Album`] with its ordered tracks.
pub fn parse_album_info_response(body: &str) -> Result<Album> {
    let response: ApiAlbumInfoResponse = parse(body)?;
    let info = response.album;

    let tracks = info
        .tracks
        .and_then(|t| t.track)
        .map(OneOrMany::into_vec)
        .unwrap_or_default()
        .into_iter()
        .map(|t| Track {
            name: t.name,
            artist: t
                .artist
                .map(|a| a.name)
                .filter(|name| !name.is_empty())
                .unwrap_or_else(|| info.artist.clone()),
            album: info.name.clone(),
            duration: t
                .duration
                .and_then(|d| d.as_u64())
                .and_then(|d| u32::try_from(d).ok())
                .filter(|d| *d > 0),
        })
        .collect();

    Ok(Album {
        name: info.name,
        artist: info.artist,
        mbid: non_empty(info.mbid),
        tracks,
    })
}

/// Parse the accepted/ignored counts of a `track.scrobble` response.
pub fn parse_scrobble_response(body: &str) -> Result<ScrobbleReport> {
    let response: ApiScrobbleResponse = parse(body)?;
    let attr = response.scrobbles.attr;

    let count = |value: &NumberOrString, field: &str| {
        value
            .as_u64()
            .and_then(|n| u32::try_from(n).ok())
            .ok_or_else(|| ScrobbleError::Parse(format!("invalid {field} count")))
    };

    Ok(ScrobbleReport {
        accepted: count(&attr.accepted, "accepted")?,
        ignored: count(&attr.ignored, "ignored")?,
    })
}
