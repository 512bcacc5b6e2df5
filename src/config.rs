use crate::api::DEFAULT_API_URL;
use crate::{Result, ScrobbleError};
use std::env;
use std::path::PathBuf;

/// Environment variable holding the Last.fm API key.
///
/// Read at build time (`option_env!`) so release binaries carry the key, and
/// again at runtime so a locally set value wins.
pub const API_KEY_VAR: &str = "LASTFM_API_KEY";
/// Environment variable holding the Last.fm API shared secret.
pub const API_SECRET_VAR: &str = "LASTFM_API_SECRET";
/// Overrides the location of the cached session token.
pub const TOKEN_FILE_VAR: &str = "SCROBBLE_TOKEN_FILE";
/// Overrides the web service endpoint.
pub const API_URL_VAR: &str = "LASTFM_API_URL";

const BUILD_API_KEY: Option<&str> = option_env!("LASTFM_API_KEY");
const BUILD_API_SECRET: Option<&str> = option_env!("LASTFM_API_SECRET");

/// Key and shared secret of the Last.fm application.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiCredentials {
    pub api_key: String,
    pub api_secret: String,
}

impl ApiCredentials {
    pub fn new(api_key: &str, api_secret: &str) -> Result<Self> {
        if api_key.trim().is_empty() || api_secret.trim().is_empty() {
            return Err(ScrobbleError::MissingCredentials);
        }
        Ok(Self {
            api_key: api_key.trim().to_string(),
            api_secret: api_secret.trim().to_string(),
        })
    }

    /// Load credentials, preferring runtime environment over compiled-in values.
    pub fn load() -> Result<Self> {
        let api_key = lookup(API_KEY_VAR, BUILD_API_KEY);
        let api_secret = lookup(API_SECRET_VAR, BUILD_API_SECRET);
        Self::new(&api_key, &api_secret)
    }
}

impl std::fmt::Debug for ApiCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiCredentials")
            .field("api_key", &self.api_key)
            .field("api_secret", &"<redacted>")
            .finish()
    }
}

fn lookup(var: &str, compiled: Option<&str>) -> String {
    env::var(var)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .or_else(|| compiled.map(str::to_string))
        .unwrap_or_default()
}

/// Runtime configuration, built once by the entry point and passed down.
#[derive(Debug, Clone)]
pub struct Config {
    pub credentials: ApiCredentials,
    pub token_path: PathBuf,
    pub api_url: String,
    pub verbose: bool,
}

impl Config {
    /// Build the configuration from compiled-in values and the environment.
    ///
    /// The token location is resolved by the caller (see
    /// [`token_path_from_env`]). Fails with
    /// [`ScrobbleError::MissingCredentials`] before anything else is looked at.
    pub fn load(token_path: PathBuf, verbose: bool) -> Result<Self> {
        let credentials = ApiCredentials::load()?;
        let api_url = env::var(API_URL_VAR)
            .ok()
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        Ok(Self {
            credentials,
            token_path,
            api_url,
            verbose,
        })
    }
}

/// Token location from `SCROBBLE_TOKEN_FILE`, else [`default_token_path`].
///
/// Needs no API credentials, so `logout` can use it on its own.
pub fn token_path_from_env() -> PathBuf {
    env::var_os(TOKEN_FILE_VAR)
        .filter(|path| !path.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(default_token_path)
}

/// `~/.lastfm`, or `.lastfm` in the working directory when there is no home.
pub fn default_token_path() -> PathBuf {
    let mut path = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push(".lastfm");
    path
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credentials_must_be_present() {
        assert!(matches!(
            ApiCredentials::new("", "secret"),
            Err(ScrobbleError::MissingCredentials)
        ));
        assert!(matches!(
            ApiCredentials::new("key", "  "),
            Err(ScrobbleError::MissingCredentials)
        ));

        let creds = ApiCredentials::new(" key ", "secret").unwrap();
        assert_eq!(creds.api_key, "key");
    }

    #[test]
    fn test_debug_redacts_secret() {
        let creds = ApiCredentials::new("key", "very-secret").unwrap();
        let printed = format!("{creds:?}");
        assert!(printed.contains("key"));
        assert!(!printed.contains("very-secret"));
    }

    #[test]
    fn test_lookup_falls_back_to_compiled_value() {
        let var = format!("SCROBBLE_TEST_UNSET_{}", std::process::id());
        assert_eq!(lookup(&var, Some("built-in")), "built-in");
        assert_eq!(lookup(&var, None), "");
    }

    #[test]
    fn test_default_token_path() {
        assert!(default_token_path().ends_with(".lastfm"));
    }
}
