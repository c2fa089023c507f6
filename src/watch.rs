//! Watch mode: re-render a query on a fixed interval until interrupted.

use std::future::Future;
use std::io::Write;
use std::time::Duration;
use tokio::signal::unix::{SignalKind, signal};
use tracing::debug;

/// Clear the screen and move the cursor home.
pub const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";

/// Repeatedly render a frame, clear the screen and print it, then sleep.
///
/// Returns `Ok(())` on SIGINT (during either the render or the sleep) and
/// the render's error if one occurs.
pub async fn watch<F, Fut, E>(
    interval: Duration,
    out: &mut impl Write,
    mut render: F,
) -> Result<(), Box<dyn std::error::Error>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<String, E>>,
    E: std::error::Error + 'static,
{
    // Register before the first frame so an early ^C is not lost.
    let mut interrupt = signal(SignalKind::interrupt())?;

    loop {
        let frame = tokio::select! {
            _ = interrupt.recv() => break,
            frame = render() => frame?,
        };

        writeln!(out, "{CLEAR_SCREEN}{frame}")?;
        out.flush()?;

        tokio::select! {
            _ = interrupt.recv() => break,
            () = tokio::time::sleep(interval) => {}
        }
    }

    debug!("watch interrupted");
    Ok(())
}
