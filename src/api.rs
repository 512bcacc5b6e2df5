use crate::config::ApiCredentials;
use crate::parsing::{
    parse_album_info_response, parse_album_search_response, parse_scrobble_response,
    parse_session_response,
};
use crate::{Album, AlbumRef, AlbumSummary, Result, ScrobbleError, ScrobbleReport, Track};
use async_trait::async_trait;
use http_client::{HttpClient, Request};
use http_types::{Method, Url};
use std::collections::BTreeMap;
use std::sync::Arc;

pub const DEFAULT_API_URL: &str = "https://ws.audioscrobbler.com/2.0/";

/// Upper bound on scrobbles per `track.scrobble` request imposed by Last.fm.
pub const MAX_SCROBBLES_PER_REQUEST: usize = 50;

/// Operations the workflows need from the remote tracking service.
///
/// # Mocking Support
///
/// When the `mock` feature is enabled, this crate provides `MockScrobbleApi`
/// generated by `mockall`.
#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
#[async_trait(?Send)]
pub trait ScrobbleApi {
    /// Exchange a username and password for a session token.
    async fn authenticate(&self, username: &str, password: &str) -> Result<String>;

    /// Search albums by title, in the order the service ranks them.
    async fn search_albums(&self, title: &str, require_mbid: bool) -> Result<Vec<AlbumSummary>>;

    /// Fetch an album with its ordered track list.
    async fn get_album_info(&self, album: &AlbumRef) -> Result<Album>;

    /// Scrobble one track, timestamped now.
    async fn scrobble_track(&self, track: &Track) -> Result<ScrobbleReport>;

    /// Scrobble every track of an album as one bulk submission.
    async fn scrobble_album(&self, album: &Album) -> Result<ScrobbleReport>;
}

/// [`ScrobbleApi`] backed by the Last.fm web service.
#[derive(Clone)]
pub struct LastFmApiClientImpl {
    client: Arc<dyn HttpClient + Send + Sync>,
    credentials: ApiCredentials,
    base_url: String,
    session_key: Option<String>,
}

impl LastFmApiClientImpl {
    pub fn new(client: Box<dyn HttpClient + Send + Sync>, credentials: ApiCredentials) -> Self {
        Self::with_base_url(client, credentials, DEFAULT_API_URL.to_string())
    }

    pub fn with_base_url(
        client: Box<dyn HttpClient + Send + Sync>,
        credentials: ApiCredentials,
        base_url: String,
    ) -> Self {
        Self {
            client: Arc::from(client),
            credentials,
            base_url,
            session_key: None,
        }
    }

    /// Attach the session token used to sign scrobble requests.
    pub fn set_session_key(&mut self, session_key: String) {
        self.session_key = Some(session_key);
    }

    fn params(&self, method: &str) -> BTreeMap<String, String> {
        let mut params = BTreeMap::new();
        params.insert("method".to_string(), method.to_string());
        params.insert("api_key".to_string(), self.credentials.api_key.clone());
        params.insert("format".to_string(), "json".to_string());
        params
    }

    fn sign(&self, mut params: BTreeMap<String, String>) -> BTreeMap<String, String> {
        let signature = api_signature(&params, &self.credentials.api_secret);
        params.insert("api_sig".to_string(), signature);
        params
    }

    fn session_key(&self) -> Result<&str> {
        self.session_key
            .as_deref()
            .ok_or_else(|| ScrobbleError::Auth("no session token available".to_string()))
    }

    async fn get(&self, params: &BTreeMap<String, String>) -> Result<String> {
        let url = format!("{}?{}", self.base_url, encode_params(params));
        let url = url
            .parse::<Url>()
            .map_err(|e| ScrobbleError::Http(e.to_string()))?;

        self.send(Request::new(Method::Get, url)).await
    }

    async fn post(&self, params: &BTreeMap<String, String>) -> Result<String> {
        let url = self
            .base_url
            .parse::<Url>()
            .map_err(|e| ScrobbleError::Http(e.to_string()))?;

        let mut request = Request::new(Method::Post, url);
        let _ = request.insert_header("Content-Type", "application/x-www-form-urlencoded");
        request.set_body(encode_params(params));

        self.send(request).await
    }

    async fn send(&self, request: Request) -> Result<String> {
        let mut response = self
            .client
            .send(request)
            .await
            .map_err(|e| ScrobbleError::Http(e.to_string()))?;

        log::debug!("Response status: {}", response.status());

        response
            .body_string()
            .await
            .map_err(|e| ScrobbleError::Http(e.to_string()))
    }

    async fn submit_scrobbles(&self, batch: &[(&Track, i64)]) -> Result<ScrobbleReport> {
        let mut params = self.params("track.scrobble");
        params.insert("sk".to_string(), self.session_key()?.to_string());
        params.extend(scrobble_params(batch));

        let body = self.post(&self.sign(params)).await?;
        parse_scrobble_response(&body)
    }
}

#[async_trait(?Send)]
impl ScrobbleApi for LastFmApiClientImpl {
    async fn authenticate(&self, username: &str, password: &str) -> Result<String> {
        log::debug!("Requesting mobile session for '{username}'");

        let mut params = self.params("auth.getMobileSession");
        params.insert("username".to_string(), username.to_string());
        params.insert("password".to_string(), password.to_string());

        let body = self.post(&self.sign(params)).await?;
        parse_session_response(&body)
    }

    async fn search_albums(&self, title: &str, require_mbid: bool) -> Result<Vec<AlbumSummary>> {
        log::debug!("Searching albums for '{title}' (require MBID: {require_mbid})");

        let mut params = self.params("album.search");
        params.insert("album".to_string(), title.to_string());

        let body = self.get(&params).await?;
        parse_album_search_response(&body, require_mbid)
    }

    async fn get_album_info(&self, album: &AlbumRef) -> Result<Album> {
        let mut params = self.params("album.getInfo");
        match album {
            AlbumRef::Mbid(mbid)
            | AlbumRef::Summary(AlbumSummary {
                mbid: Some(mbid), ..
            }) => {
                log::debug!("Fetching album info for MBID {mbid}");
                params.insert("mbid".to_string(), mbid.clone());
            }
            AlbumRef::Summary(summary) => {
                log::debug!("Fetching album info for {summary}");
                params.insert("artist".to_string(), summary.artist.clone());
                params.insert("album".to_string(), summary.name.clone());
            }
        }

        let body = self.get(&params).await?;
        parse_album_info_response(&body)
    }

    async fn scrobble_track(&self, track: &Track) -> Result<ScrobbleReport> {
        track.validate()?;
        log::debug!("Scrobbling track {track}");

        let now = chrono::Utc::now().timestamp();
        let report = self.submit_scrobbles(&[(track, now)]).await?;
        if report.accepted == 0 {
            return Err(ScrobbleError::Ignored(track.to_string()));
        }
        Ok(report)
    }

    async fn scrobble_album(&self, album: &Album) -> Result<ScrobbleReport> {
        if album.tracks.is_empty() {
            return Err(ScrobbleError::InvalidTrack(format!("{album} has no tracks")));
        }
        for track in &album.tracks {
            track.validate()?;
        }

        let timestamps = album_timestamps(&album.tracks, chrono::Utc::now().timestamp());
        let timed: Vec<(&Track, i64)> = album.tracks.iter().zip(timestamps).collect();

        let mut report = ScrobbleReport::default();
        for (i, batch) in timed.chunks(MAX_SCROBBLES_PER_REQUEST).enumerate() {
            log::debug!(
                "Submitting scrobble batch {} ({} tracks) for {album}",
                i + 1,
                batch.len()
            );
            report = report.merge(self.submit_scrobbles(batch).await?);
        }
        Ok(report)
    }
}

/// Compute the `api_sig` for a request.
///
/// Parameters are concatenated as `namevalue` in name order, the shared
/// secret is appended and the MD5 digest is returned as lowercase hex.
/// `format` and `callback` do not take part in the signature.
pub fn api_signature(params: &BTreeMap<String, String>, secret: &str) -> String {
    let mut payload = String::new();
    for (name, value) in params {
        if name == "format" || name == "callback" {
            continue;
        }
        payload.push_str(name);
        payload.push_str(value);
    }
    payload.push_str(secret);

    format!("{:x}", md5::compute(payload.as_bytes()))
}

/// URL-encode parameters as `name=value` pairs joined by `&`.
pub fn encode_params(params: &BTreeMap<String, String>) -> String {
    params
        .iter()
        .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}

/// Indexed `track.scrobble` parameters for one batch.
pub fn scrobble_params(batch: &[(&Track, i64)]) -> BTreeMap<String, String> {
    let mut params = BTreeMap::new();
    for (i, (track, timestamp)) in batch.iter().enumerate() {
        params.insert(format!("artist[{i}]"), track.artist.clone());
        params.insert(format!("track[{i}]"), track.name.clone());
        params.insert(format!("timestamp[{i}]"), timestamp.to_string());
        if !track.album.is_empty() {
            params.insert(format!("album[{i}]"), track.album.clone());
        }
        if let Some(duration) = track.duration {
            params.insert(format!("duration[{i}]"), duration.to_string());
        }
    }
    params
}

/// Start times for playing `tracks` back to back so that the last one ends at `now`.
pub fn album_timestamps(tracks: &[Track], now: i64) -> Vec<i64> {
    let total: i64 = tracks.iter().map(|t| t.duration_or_default() as i64).sum();
    let mut start = now - total;

    tracks
        .iter()
        .map(|t| {
            let timestamp = start;
            start += t.duration_or_default() as i64;
            timestamp
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::track::DEFAULT_TRACK_SECONDS;
    use http_client::Response;
    use http_types::StatusCode;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    #[derive(Debug)]
    struct RecordedRequest {
        method: Method,
        url: String,
        content_type: Option<String>,
        body: String,
    }

    /// Serves canned bodies in order and keeps every request it was sent.
    #[derive(Debug, Default)]
    struct Recorder {
        replies: Mutex<VecDeque<String>>,
        requests: Mutex<Vec<RecordedRequest>>,
    }

    #[derive(Debug, Clone)]
    struct RecordingClient(Arc<Recorder>);

    #[async_trait::async_trait]
    impl HttpClient for RecordingClient {
        async fn send(&self, mut req: Request) -> http_types::Result<Response> {
            let body = req.body_string().await?;
            self.0.requests.lock().unwrap().push(RecordedRequest {
                method: req.method(),
                url: req.url().to_string(),
                content_type: req
                    .header("Content-Type")
                    .map(|v| v.last().as_str().to_string()),
                body,
            });

            let reply = self.0.replies.lock().unwrap().pop_front().unwrap_or_default();
            let mut response = Response::new(StatusCode::Ok);
            response.set_body(reply);
            Ok(response)
        }
    }

    fn recording_client(replies: &[&str]) -> (LastFmApiClientImpl, Arc<Recorder>) {
        let recorder = Arc::new(Recorder::default());
        recorder
            .replies
            .lock()
            .unwrap()
            .extend(replies.iter().map(|r| r.to_string()));

        let credentials = ApiCredentials::new("test-key", "test-secret").unwrap();
        let mut client =
            LastFmApiClientImpl::new(Box::new(RecordingClient(recorder.clone())), credentials);
        client.set_session_key("session-key".to_string());
        (client, recorder)
    }

    fn scrobbled(accepted: u32, ignored: u32) -> String {
        format!(r#"{{"scrobbles": {{"@attr": {{"accepted": {accepted}, "ignored": {ignored}}}}}}}"#)
    }

    const ALBUM_INFO: &str = r#"{"album": {"name": "Abbey Road", "artist": "The Beatles",
        "tracks": {"track": {"name": "Come Together", "duration": 259}}}}"#;

    #[tokio::test]
    async fn test_authenticate_posts_signed_form() {
        let (client, recorder) = recording_client(&[r#"{"session": {"key": "new-key"}}"#]);

        let token = client.authenticate("alice", "hunter2").await.unwrap();
        assert_eq!(token, "new-key");

        let requests = recorder.requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        let request = &requests[0];
        assert_eq!(request.method, Method::Post);
        assert_eq!(request.url, DEFAULT_API_URL);
        assert_eq!(
            request.content_type.as_deref(),
            Some("application/x-www-form-urlencoded")
        );
        assert!(request.body.contains("method=auth.getMobileSession"));
        assert!(request.body.contains("username=alice"));
        assert!(request.body.contains("api_sig="));
        assert!(request.body.contains("format=json"));
    }

    #[tokio::test]
    async fn test_album_scrobbles_are_split_into_batches() {
        let first = scrobbled(50, 0);
        let second = scrobbled(1, 0);
        let (client, recorder) = recording_client(&[&first, &second]);

        let album = Album {
            name: "Long Album".to_string(),
            artist: "Artist".to_string(),
            mbid: None,
            tracks: (0..51)
                .map(|i| Track::new(&format!("t{i}"), "Artist", "Long Album"))
                .collect(),
        };
        let report = client.scrobble_album(&album).await.unwrap();
        assert_eq!(
            report,
            ScrobbleReport {
                accepted: 51,
                ignored: 0
            }
        );

        let requests = recorder.requests.lock().unwrap();
        assert_eq!(requests.len(), 2);
        assert!(requests.iter().all(|r| r.method == Method::Post));
        assert!(requests[0].body.contains("track%5B49%5D=t49"));
        assert!(!requests[0].body.contains("track%5B50%5D"));
        assert!(requests[1].body.contains("track%5B0%5D=t50"));
        assert!(!requests[1].body.contains("track%5B1%5D"));
        assert!(requests[1].body.contains("sk=session-key"));
        assert!(requests[1].body.contains("method=track.scrobble"));
    }

    #[tokio::test]
    async fn test_ignored_track_scrobble_is_an_error() {
        let reply = scrobbled(0, 1);
        let (client, _) = recording_client(&[&reply]);

        let track = Track::new("Song", "Artist", "Album");
        match client.scrobble_track(&track).await {
            Err(ScrobbleError::Ignored(what)) => assert_eq!(what, "Artist - Song [Album]"),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_scrobble_requires_session_key() {
        let recorder = Arc::new(Recorder::default());
        let credentials = ApiCredentials::new("test-key", "test-secret").unwrap();
        let client =
            LastFmApiClientImpl::new(Box::new(RecordingClient(recorder.clone())), credentials);

        let result = client
            .scrobble_track(&Track::new("Song", "Artist", ""))
            .await;
        assert!(matches!(result, Err(ScrobbleError::Auth(_))));
        assert!(recorder.requests.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_album_info_lookup_by_mbid_or_name() {
        let (client, recorder) = recording_client(&[ALBUM_INFO, ALBUM_INFO, ALBUM_INFO]);

        let by_id = AlbumRef::Mbid("abc-123".to_string());
        let album = client.get_album_info(&by_id).await.unwrap();
        assert_eq!(album.tracks.len(), 1);
        assert_eq!(album.tracks[0].duration, Some(259));

        let summary = AlbumSummary {
            name: "Abbey Road".to_string(),
            artist: "The Beatles".to_string(),
            mbid: None,
        };
        client
            .get_album_info(&AlbumRef::Summary(summary.clone()))
            .await
            .unwrap();

        let with_mbid = AlbumSummary {
            mbid: Some("def-456".to_string()),
            ..summary
        };
        client
            .get_album_info(&AlbumRef::Summary(with_mbid))
            .await
            .unwrap();

        let requests = recorder.requests.lock().unwrap();
        assert!(requests.iter().all(|r| r.method == Method::Get));
        assert!(requests[0].url.contains("mbid=abc-123"));
        assert!(!requests[0].url.contains("artist="));
        assert!(requests[1].url.contains("artist=The%20Beatles"));
        assert!(requests[1].url.contains("album=Abbey%20Road"));
        assert!(!requests[1].url.contains("mbid="));
        assert!(requests[2].url.contains("mbid=def-456"));
        assert!(!requests[2].url.contains("artist="));
    }

    #[tokio::test]
    async fn test_service_error_surfaces_from_client() {
        let (client, _) = recording_client(&[r#"{"error": 9, "message": "Invalid session key"}"#]);

        let result = client
            .scrobble_track(&Track::new("Song", "Artist", ""))
            .await;
        assert!(matches!(result, Err(ScrobbleError::InvalidSession)));
    }

    #[tokio::test]
    async fn test_base_url_override() {
        let recorder = Arc::new(Recorder::default());
        recorder
            .replies
            .lock()
            .unwrap()
            .push_back(r#"{"results": {"albummatches": {"album": []}}}"#.to_string());
        let client = LastFmApiClientImpl::with_base_url(
            Box::new(RecordingClient(recorder.clone())),
            ApiCredentials::new("test-key", "test-secret").unwrap(),
            "http://localhost:8080/2.0/".to_string(),
        );

        let albums = client.search_albums("Abbey Road", true).await.unwrap();
        assert!(albums.is_empty());

        let requests = recorder.requests.lock().unwrap();
        assert!(requests[0]
            .url
            .starts_with("http://localhost:8080/2.0/?"));
        assert!(requests[0].url.contains("method=album.search"));
    }

    fn params(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_api_signature_ignores_format_and_sorts() {
        let signed = params(&[
            ("method", "auth.getMobileSession"),
            ("api_key", "key"),
            ("username", "alice"),
            ("password", "pw"),
        ]);
        let expected = format!(
            "{:x}",
            md5::compute("api_keykeymethodauth.getMobileSessionpasswordpwusernamealicesecret")
        );
        assert_eq!(api_signature(&signed, "secret"), expected);

        let mut with_format = signed.clone();
        with_format.insert("format".to_string(), "json".to_string());
        assert_eq!(api_signature(&with_format, "secret"), expected);
        assert_eq!(expected.len(), 32);
    }

    #[test]
    fn test_encode_params() {
        let encoded = encode_params(&params(&[("album", "Rock & Roll"), ("artist", "AC/DC")]));
        assert_eq!(encoded, "album=Rock%20%26%20Roll&artist=AC%2FDC");
    }

    #[test]
    fn test_scrobble_params() {
        let first = Track::new("Song A", "Artist 1", "Album X");
        let mut second = Track::new("Song B", "Artist 2", "");
        second.duration = Some(200);

        let batch = scrobble_params(&[(&first, 100), (&second, 300)]);
        assert_eq!(batch["artist[0]"], "Artist 1");
        assert_eq!(batch["track[0]"], "Song A");
        assert_eq!(batch["album[0]"], "Album X");
        assert_eq!(batch["timestamp[0]"], "100");
        assert!(!batch.contains_key("duration[0]"));
        assert!(!batch.contains_key("album[1]"));
        assert_eq!(batch["duration[1]"], "200");
        assert_eq!(batch["timestamp[1]"], "300");
    }

    #[test]
    fn test_album_timestamps_end_now() {
        let mut a = Track::new("A", "Artist", "Album");
        a.duration = Some(100);
        let b = Track::new("B", "Artist", "Album");
        let mut c = Track::new("C", "Artist", "Album");
        c.duration = Some(50);

        let now = 10_000;
        let stamps = album_timestamps(&[a, b, c], now);
        let b_len = DEFAULT_TRACK_SECONDS as i64;
        assert_eq!(stamps, vec![now - 150 - b_len, now - 50 - b_len, now - 50]);
    }

    #[test]
    fn test_album_timestamps_empty() {
        assert!(album_timestamps(&[], 42).is_empty());
    }
}
