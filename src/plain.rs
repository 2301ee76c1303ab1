//! Non-interactive mode: print each chunk to stdout at the autoplay pace.
//!
//! Ctrl-C cancels a load in progress or stops playback; the position
//! reached so far is saved like in the terminal UI.

use anyhow::{Context, Result};
use pacer_core::CancellationToken;
use pacer_core::session::{ReaderSession, ReaderSnapshot, SessionCommand};
use std::io::{self, Write};
use std::path::Path;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Upper bound on one sleep, so Ctrl-C is noticed promptly.
const MAX_SLEEP: Duration = Duration::from_millis(100);

pub fn run(mut session: ReaderSession, path: &Path, resume: bool) -> Result<()> {
    let cancel = CancellationToken::new();
    let handler_token = cancel.clone();
    if let Err(err) = ctrlc::set_handler(move || handler_token.cancel()) {
        warn!("Failed to install Ctrl-C handler: {err}");
    }

    session
        .load_path(path, resume, &cancel)
        .with_context(|| format!("Failed to open {}", path.display()))?;

    let mut out = io::stdout().lock();
    let event = session.apply_command(SessionCommand::Play, Instant::now());
    let mut last_container = None;
    print_chunk(&mut out, &event.snapshot, &mut last_container)?;

    loop {
        if cancel.is_cancelled() {
            info!("Interrupted; stopping playback");
            session.apply_command(SessionCommand::Pause, Instant::now());
            break;
        }
        let now = Instant::now();
        let Some(wait) = session.time_until_next_tick(now) else {
            break;
        };
        if !wait.is_zero() {
            thread::sleep(wait.min(MAX_SLEEP));
            continue;
        }
        if let Some(event) = session.tick(now) {
            if event.snapshot.finished {
                writeln!(out)?;
                writeln!(out, "[end of book]")?;
                break;
            }
            print_chunk(&mut out, &event.snapshot, &mut last_container)?;
        }
    }
    out.flush()?;
    Ok(())
}

fn print_chunk(
    out: &mut impl Write,
    snapshot: &ReaderSnapshot,
    last_container: &mut Option<usize>,
) -> io::Result<()> {
    if *last_container != Some(snapshot.container_index) {
        if last_container.is_some() {
            writeln!(out)?;
        }
        writeln!(out, "== {} ({:.1}%) ==", snapshot.status, snapshot.progress_pct)?;
        *last_container = Some(snapshot.container_index);
    }
    if let Some(text) = &snapshot.chunk_text {
        writeln!(out, "{text}")?;
    }
    out.flush()
}
