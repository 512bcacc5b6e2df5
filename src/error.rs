use thiserror::Error;

/// Error types for scrobbling operations.
///
/// Covers transport failures, error responses from the Last.fm web service,
/// session bootstrap failures and bad user input (menu selections, batch file
/// lines).
///
/// # Error Handling Examples
///
/// ```rust,no_run
/// use scrobble::{ScrobbleApi, ScrobbleError, Track};
///
/// async fn submit(api: &dyn ScrobbleApi, track: &Track) {
///     match api.scrobble_track(track).await {
///         Ok(report) => println!("accepted {}", report.accepted),
///         Err(ScrobbleError::InvalidSession) => eprintln!("run `scrobble logout` and try again"),
///         Err(ScrobbleError::RateLimit) => eprintln!("slow down"),
///         Err(e) => eprintln!("scrobble failed: {e}"),
///     }
/// }
/// ```
#[derive(Error, Debug)]
pub enum ScrobbleError {
    /// HTTP/network related errors.
    ///
    /// Connection failures, timeouts, DNS errors and unreadable response bodies.
    #[error("HTTP error: {0}")]
    Http(String),

    /// The web service answered with an error document.
    #[error("Last.fm error {code}: {message}")]
    Api {
        /// Last.fm error code
        code: u32,
        /// Message returned by the service
        message: String,
    },

    /// The cached session token was rejected by the service.
    ///
    /// The token is never refreshed automatically; removing it with
    /// `scrobble logout` forces a new login on the next run.
    #[error("session token rejected by Last.fm; run `scrobble logout` and try again")]
    InvalidSession,

    /// Rate limiting from Last.fm. Reported, never retried.
    #[error("rate limited by Last.fm, try again later")]
    RateLimit,

    /// Last.fm accepted the request but ignored the scrobble.
    #[error("scrobble ignored by Last.fm: {0}")]
    Ignored(String),

    /// Authentication failures while creating a session token.
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Failed to parse a response from the service.
    #[error("Failed to parse response: {0}")]
    Parse(String),

    /// The API key or shared secret is missing.
    #[error("fatal error: API key/secret not found. was there a compile-time error?")]
    MissingCredentials,

    /// Invalid entry in an interactive menu.
    #[error("invalid entry: {0}")]
    InvalidSelection(String),

    /// A batch file line that cannot be turned into a track.
    #[error("line {line}: {reason}")]
    MalformedLine {
        /// 1-based line number in the batch file
        line: usize,
        /// What is wrong with the line
        reason: String,
    },

    /// A track or album that cannot be scrobbled as given.
    #[error("cannot scrobble: {0}")]
    InvalidTrack(String),

    /// File system and terminal I/O errors.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ScrobbleError {
    /// Map a Last.fm error document to the matching variant.
    pub fn from_api(code: u32, message: String) -> Self {
        match code {
            9 => ScrobbleError::InvalidSession,
            29 => ScrobbleError::RateLimit,
            _ => ScrobbleError::Api { code, message },
        }
    }
}
