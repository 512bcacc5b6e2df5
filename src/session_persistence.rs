use crate::{Console, Result, ScrobbleApi, ScrobbleError};
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, ErrorKind, Write};
use std::path::{Path, PathBuf};

/// Cached session token, stored raw in a single file.
///
/// The file holds the token exactly as issued by Last.fm, with no delimiter or
/// structure. It is created readable and writable by the owner only.
pub struct TokenStore {
    path: PathBuf,
}

impl TokenStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the cached token.
    ///
    /// Returns `None` when the file is missing, unreadable or blank. The token
    /// is not checked against the service.
    pub fn load(&self) -> Option<String> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => {
                let token = contents.trim();
                if token.is_empty() {
                    log::debug!("Token file {} is empty", self.path.display());
                    None
                } else {
                    Some(token.to_string())
                }
            }
            Err(e) => {
                log::debug!("No usable token at {}: {e}", self.path.display());
                None
            }
        }
    }

    /// Replace the cached token.
    pub fn save(&self, token: &str) -> Result<()> {
        let mut file = self.create_restricted()?;
        file.write_all(token.as_bytes())?;
        file.sync_all()?;
        log::debug!("Session token saved to: {}", self.path.display());
        Ok(())
    }

    /// Remove the cached token. Returns whether a file was deleted.
    pub fn remove(&self) -> Result<bool> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                log::debug!("Session token removed from: {}", self.path.display());
                Ok(true)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Return the cached token, or log in interactively and cache a new one.
    ///
    /// When no usable token is cached:
    /// 1. Any stale file is deleted and a fresh owner-only file is created
    /// 2. The user is prompted for username and password
    /// 3. The credentials are exchanged for a token, which is written and synced
    ///
    /// If authentication fails or yields an empty token, the new file is
    /// deleted again and [`ScrobbleError::Auth`] is returned.
    pub async fn get_token<A, R, W>(&self, api: &A, console: &mut Console<R, W>) -> Result<String>
    where
        A: ScrobbleApi + ?Sized,
        R: BufRead,
        W: Write,
    {
        if let Some(token) = self.load() {
            log::debug!("Using cached session token from {}", self.path.display());
            return Ok(token);
        }

        if let Err(e) = self.remove() {
            log::warn!("Could not remove stale token file: {e}");
        }
        drop(self.create_restricted()?);

        let result = match Self::login(api, console).await {
            Ok(token) => self.save(&token).map(|()| token),
            Err(e) => Err(e),
        };
        if result.is_err() {
            if let Err(e) = self.remove() {
                log::warn!("Could not remove partial token file: {e}");
            }
        }
        result
    }

    async fn login<A, R, W>(api: &A, console: &mut Console<R, W>) -> Result<String>
    where
        A: ScrobbleApi + ?Sized,
        R: BufRead,
        W: Write,
    {
        console.println("Generating session token (your password will NOT be stored)...")?;
        console.blank()?;
        let username = console.prompt("last.fm username: ")?;
        let password = console.prompt("last.fm password: ")?;

        let token = match api.authenticate(&username, &password).await {
            Ok(token) => token.trim().to_string(),
            Err(ScrobbleError::Auth(msg)) => return Err(ScrobbleError::Auth(msg)),
            Err(e) => return Err(ScrobbleError::Auth(e.to_string())),
        };
        if token.is_empty() {
            return Err(ScrobbleError::Auth(
                "Last.fm returned an empty session token".to_string(),
            ));
        }
        Ok(token)
    }

    fn create_restricted(&self) -> Result<File> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let mut options = OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }

        let file = options.open(&self.path)?;
        // mode only applies to new files; tighten one that already existed
        restrict_permissions(&file, &self.path);
        Ok(file)
    }
}

#[cfg(unix)]
fn restrict_permissions(file: &File, path: &Path) {
    use std::os::unix::fs::PermissionsExt;

    if let Err(e) = file.set_permissions(fs::Permissions::from_mode(0o600)) {
        log::warn!(
            "Could not restrict permissions on {}: {e}",
            path.display()
        );
    }
}

#[cfg(not(unix))]
fn restrict_permissions(_file: &File, _path: &Path) {}
