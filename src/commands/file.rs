use super::Context;
use crate::{Result, ScrobbleApi, ScrobbleError, Track};
use std::io::{BufRead, Write};
use std::path::Path;
use std::time::Duration;

/// Pause between consecutive submissions in a batch.
pub const SCROBBLE_PACING: Duration = Duration::from_secs(1);

const FIELD_COUNT: usize = 3;

/// Parse one batch line: track name, album and artist separated by tabs.
///
/// `line_no` is 1-based and only used for error reporting. Fields past the
/// third are ignored.
pub fn parse_line(line_no: usize, line: &str) -> Result<Track> {
    let fields: Vec<&str> = line.split('\t').map(str::trim).collect();
    if fields.len() < FIELD_COUNT {
        return Err(ScrobbleError::MalformedLine {
            line: line_no,
            reason: format!(
                "expected {FIELD_COUNT} tab-separated fields (track, album, artist), found {}",
                fields.len()
            ),
        });
    }
    if fields.len() > FIELD_COUNT {
        log::warn!(
            "Line {line_no}: ignoring {} extra field(s)",
            fields.len() - FIELD_COUNT
        );
    }

    let (name, album, artist) = (fields[0], fields[1], fields[2]);
    if name.is_empty() {
        return Err(ScrobbleError::MalformedLine {
            line: line_no,
            reason: "track name is empty".to_string(),
        });
    }
    if artist.is_empty() {
        return Err(ScrobbleError::MalformedLine {
            line: line_no,
            reason: "artist is empty".to_string(),
        });
    }

    Ok(Track::new(name, artist, album))
}

/// Scrobble every line of a tab-delimited file, one submission per line.
///
/// The file is read completely before anything is submitted. Bad lines and
/// failed submissions are reported and skipped; only failing to read the
/// file is an error.
pub async fn handle_file_command<A, R, W>(ctx: &mut Context<A, R, W>, path: &Path) -> Result<()>
where
    A: ScrobbleApi,
    R: BufRead,
    W: Write,
{
    let contents = std::fs::read_to_string(path)?;
    log::debug!("Read {} bytes from {}", contents.len(), path.display());

    let mut submitted = 0usize;
    for (index, line) in contents.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }

        let track = match parse_line(index + 1, line) {
            Ok(track) => track,
            Err(e) => {
                ctx.console.println(format!("*** ERROR on {e}"))?;
                continue;
            }
        };

        if submitted > 0 {
            tokio::time::sleep(SCROBBLE_PACING).await;
        }
        submitted += 1;

        ctx.console.println(format!(
            "Scrobbling {}: \"{}\" ({})",
            track.artist, track.name, track.album
        ))?;
        if let Err(e) = ctx.api.scrobble_track(&track).await {
            log::debug!("Scrobble failed for line {}: {e:?}", index + 1);
            ctx.console
                .println(format!("*** ERROR with {}: {e}", track.name))?;
        }
    }

    log::debug!("Batch finished, {submitted} submission(s)");
    Ok(())
}
