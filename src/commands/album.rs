use super::Context;
use crate::{AlbumRef, AlbumSummary, Result, ScrobbleApi, ScrobbleError};
use std::io::{BufRead, Write};

/// Number of search results offered for selection.
pub const MAX_CANDIDATES: usize = 5;

#[derive(Debug, Clone)]
pub struct AlbumOptions {
    pub mbid: Option<String>,
    pub require_mbid: bool,
}

/// Resolve an album by MBID or interactive search and scrobble all of its tracks.
///
/// Returns `Ok(())` without scrobbling when the search finds nothing or the
/// user enters `0`.
pub async fn handle_album_command<A, R, W>(
    ctx: &mut Context<A, R, W>,
    options: &AlbumOptions,
) -> Result<()>
where
    A: ScrobbleApi,
    R: BufRead,
    W: Write,
{
    let album_ref = match options.mbid.as_deref().map(str::trim) {
        Some(mbid) if !mbid.is_empty() => AlbumRef::Mbid(mbid.to_string()),
        _ => match choose_album(ctx, options.require_mbid).await? {
            Some(summary) => AlbumRef::Summary(summary),
            None => return Ok(()),
        },
    };

    if ctx.verbose {
        ctx.console
            .println(format!("MBID: {}", album_ref.mbid().unwrap_or_default()))?;
    }

    let album = ctx.api.get_album_info(&album_ref).await?;

    ctx.console.println(format!(
        "Scrobbling {} tracks from {} - \"{}\"",
        album.tracks.len(),
        album.artist,
        album.name
    ))?;
    if album.tracks.is_empty() {
        return Err(ScrobbleError::InvalidTrack(format!("{album} has no tracks")));
    }

    let report = ctx.api.scrobble_album(&album).await?;
    if report.ignored > 0 {
        log::warn!("Last.fm ignored {} of the scrobbles", report.ignored);
        ctx.console.println(format!(
            "{} tracks scrobbled, {} ignored by Last.fm",
            report.accepted, report.ignored
        ))?;
    }

    Ok(())
}

/// Prompt for a title, list the top candidates and read the user's choice.
///
/// `Ok(None)` means there is nothing to scrobble: no results, or `0` entered.
async fn choose_album<A, R, W>(
    ctx: &mut Context<A, R, W>,
    require_mbid: bool,
) -> Result<Option<AlbumSummary>>
where
    A: ScrobbleApi,
    R: BufRead,
    W: Write,
{
    let title = ctx.console.prompt("album title: ")?;

    let mut albums = match ctx.api.search_albums(&title, require_mbid).await {
        Ok(albums) => albums,
        Err(e) => {
            log::debug!("Album search failed: {e:?}");
            ctx.console.println(&e)?;
            Vec::new()
        }
    };

    if albums.is_empty() {
        ctx.console.blank()?;
        ctx.console
            .println(format!("No results found for \"{title}\""))?;
        return Ok(None);
    }

    albums.truncate(MAX_CANDIDATES);

    ctx.console.blank()?;
    for (i, album) in albums.iter().enumerate() {
        ctx.console.println(format!("[{}] {album}", i + 1))?;
    }
    ctx.console.blank()?;

    let answer = ctx.console.prompt("Choose a result (0 to exit): ")?;
    match parse_selection(&answer, albums.len())? {
        0 => Ok(None),
        choice => Ok(Some(albums.swap_remove(choice - 1))),
    }
}

/// Parse a menu answer; valid values are `0..=count`.
pub fn parse_selection(answer: &str, count: usize) -> Result<usize> {
    let choice: usize = answer
        .trim()
        .parse()
        .map_err(|_| ScrobbleError::InvalidSelection(format!("'{answer}' is not a number")))?;

    if choice > count {
        return Err(ScrobbleError::InvalidSelection(format!(
            "{choice} is not between 0 and {count}"
        )));
    }
    Ok(choice)
}
