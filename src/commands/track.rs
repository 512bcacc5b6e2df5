use super::Context;
use crate::{Console, Result, ScrobbleApi, Track};
use std::io::{BufRead, Write};

#[derive(Debug, Clone, Default)]
pub struct TrackOptions {
    pub title: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
}

/// Scrobble one track, prompting for whichever fields were not given as flags.
pub async fn handle_track_command<A, R, W>(
    ctx: &mut Context<A, R, W>,
    options: &TrackOptions,
) -> Result<()>
where
    A: ScrobbleApi,
    R: BufRead,
    W: Write,
{
    let title = flag_or_prompt(&mut ctx.console, options.title.as_deref(), "track title: ")?;
    let artist = flag_or_prompt(&mut ctx.console, options.artist.as_deref(), "track artist: ")?;
    let album = flag_or_prompt(&mut ctx.console, options.album.as_deref(), "track album: ")?;

    let track = Track::new(&title, &artist, &album);
    track.validate()?;

    log::debug!("Scrobbling single track: {track}");
    ctx.api.scrobble_track(&track).await?;
    ctx.console.println(format!("Scrobbled {track}"))?;

    Ok(())
}

fn flag_or_prompt<R: BufRead, W: Write>(
    console: &mut Console<R, W>,
    flag: Option<&str>,
    label: &str,
) -> Result<String> {
    match flag.map(str::trim) {
        Some(value) if !value.is_empty() => Ok(value.to_string()),
        _ => console.prompt(label),
    }
}
