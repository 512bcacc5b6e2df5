pub mod album;
pub mod file;
pub mod logout;
pub mod track;
pub mod utils;

use crate::{Config, Console, Result, ScrobbleApi, TokenStore};
use clap::{ArgAction, Subcommand};
use std::io::{BufRead, Write};
use std::path::PathBuf;

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Scrobble all tracks on an album
    ///
    /// Search for an album, either by title or MusicBrainz ID, then retrieve
    /// its tracks from Last.fm and scrobble them all in a bulk submission.
    ///
    /// Usage examples:
    /// # Search interactively
    /// scrobble album
    ///
    /// # Skip the search
    /// scrobble album --mbid 03503a3f-1e5b-4e3a-9b6b-3c1c8f0d2e0a
    Album {
        /// A MusicBrainz ID to use instead of searching (not all MBIDs are known to Last.fm)
        #[arg(short, long)]
        mbid: Option<String>,

        /// Require search results to have a MusicBrainz ID
        #[arg(
            short = 'r',
            long = "requireMBID",
            default_value_t = true,
            action = ArgAction::Set
        )]
        require_mbid: bool,
    },

    /// Scrobble a single track
    ///
    /// Any of title, artist or album left out is prompted for.
    Track {
        /// The title of the track
        #[arg(short, long)]
        title: Option<String>,

        /// The artist of the track
        #[arg(short, long)]
        artist: Option<String>,

        /// The album of the track
        #[arg(short = 'l', long)]
        album: Option<String>,
    },

    /// Scrobble tracks from a file
    ///
    /// Each line is one track with tab-delimited fields, in order:
    /// track name, track album, track artist.
    File {
        /// The path to the file to be scrobbled
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Forget the cached session token
    Logout,
}

/// Everything a workflow needs, built once by [`run`].
pub struct Context<A, R, W> {
    pub api: A,
    pub console: Console<R, W>,
    pub store: TokenStore,
    pub verbose: bool,
}

impl<A: ScrobbleApi, R: BufRead, W: Write> Context<A, R, W> {
    pub fn new(api: A, console: Console<R, W>, store: TokenStore, verbose: bool) -> Self {
        Self {
            api,
            console,
            store,
            verbose,
        }
    }
}

/// Bootstrap the session and run `command`.
///
/// `logout` only needs the token location and runs without API credentials
/// or a login. Every other command loads the full [`Config`] first, so
/// missing credentials fail before anything is printed, then obtains a
/// session token (prompting for credentials when none is cached).
pub async fn run<R: BufRead, W: Write>(
    command: Commands,
    token_path: PathBuf,
    verbose: bool,
    mut console: Console<R, W>,
) -> Result<()> {
    let store = TokenStore::new(token_path.clone());

    if command == Commands::Logout {
        return logout::handle_logout_command(&store, &mut console);
    }

    let config = Config::load(token_path, verbose)?;
    let client = utils::load_or_create_client(&config, &store, &mut console).await?;
    let mut ctx = Context::new(client, console, store, config.verbose);
    execute_command(command, &mut ctx).await
}

/// Execute the appropriate command handler based on the parsed command
pub async fn execute_command<A, R, W>(command: Commands, ctx: &mut Context<A, R, W>) -> Result<()>
where
    A: ScrobbleApi,
    R: BufRead,
    W: Write,
{
    match command {
        Commands::Album { mbid, require_mbid } => {
            let options = album::AlbumOptions { mbid, require_mbid };
            album::handle_album_command(ctx, &options).await
        }
        Commands::Track {
            title,
            artist,
            album,
        } => {
            let options = track::TrackOptions {
                title,
                artist,
                album,
            };
            track::handle_track_command(ctx, &options).await
        }
        Commands::File { file } => file::handle_file_command(ctx, &file).await,
        Commands::Logout => logout::handle_logout_command(&ctx.store, &mut ctx.console),
    }
}
