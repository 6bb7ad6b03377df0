use std::str;

use log::warn;
use tokio::io::{self, AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

use crate::{
    conditions::Conditions,
    context::{ForecastContext, Snapshot},
};

/// Input line that clears the displayed prediction, matched case-insensitively.
pub const RESET: &str = "reset";

/// Serves line-delimited requests from `reader` until it's exhausted.
///
/// Every accepted line, either a JSON `Conditions` record or `reset`, writes one JSON snapshot
/// line to `writer`. Blank lines are ignored, and lines that aren't valid UTF-8, can't be parsed
/// or can't be forecast are logged and skipped.
///
/// # Returns
/// The amount of snapshots written, or an error if reading or writing failed.
pub async fn run<R, W>(
    context: &mut ForecastContext,
    mut reader: R,
    mut writer: W,
) -> io::Result<usize>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut buf = Vec::new();
    let mut written = 0;

    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf).await? == 0 {
            break;
        }

        let line = match str::from_utf8(&buf) {
            Ok(line) => line.trim(),
            Err(e) => {
                warn!("skipping line that is not valid UTF-8: {e}");
                continue;
            }
        };

        let Some(snapshot) = apply(context, line) else {
            continue;
        };

        let mut out = serde_json::to_vec(&snapshot).map_err(io::Error::other)?;
        out.push(b'\n');
        writer.write_all(&out).await?;
        writer.flush().await?;
        written += 1;
    }

    Ok(written)
}

/// Applies a single trimmed input line to the context.
///
/// # Returns
/// The snapshot to display, or `None` if the line was skipped.
pub fn apply(context: &mut ForecastContext, line: &str) -> Option<Snapshot> {
    if line.is_empty() {
        return None;
    }

    if line.eq_ignore_ascii_case(RESET) {
        context.reset();
        return Some(context.snapshot());
    }

    let conditions: Conditions = match serde_json::from_str(line) {
        Ok(conditions) => conditions,
        Err(e) => {
            warn!("skipping malformed line: {e}");
            return None;
        }
    };

    if let Err(e) = context.handle(&conditions) {
        warn!("skipping line: {e}");
        return None;
    }

    Some(context.snapshot())
}
