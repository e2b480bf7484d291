use std::{path::PathBuf, time::Duration};

use blockfall_engine::{GameSnapshot, PieceSeed};
use serde::Deserialize;

use crate::{host::Host, util};

/// Extra time simulated after the last scripted event when no duration is given.
const DEFAULT_TAIL: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, clap::Args)]
pub struct ReplayArg {
    /// Path to the key event script (JSON array of `{at_ms, key, event}`)
    script: PathBuf,
    /// Piece seed as 32 hex characters
    #[arg(long, default_value = "00000000000000000000000000000000")]
    seed: PieceSeed,
    /// Frame length in milliseconds
    #[arg(long, default_value_t = 16)]
    tick_ms: u64,
    /// Total simulated time; defaults to one second past the last event
    #[arg(long)]
    duration_ms: Option<u64>,
    /// Output file path
    #[arg(long)]
    output: Option<PathBuf>,
    /// Print one snapshot per frame instead of only the last one
    #[arg(long)]
    every_frame: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
enum KeyEventKind {
    Press,
    Release,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
struct KeyEvent {
    at_ms: u64,
    key: String,
    event: KeyEventKind,
}

pub fn run(arg: &ReplayArg) -> anyhow::Result<()> {
    let ReplayArg {
        script,
        seed,
        tick_ms,
        duration_ms,
        output,
        every_frame,
    } = arg;
    anyhow::ensure!(*tick_ms > 0, "--tick-ms must be positive");

    let events: Vec<KeyEvent> = util::read_json_file("script", script)?;
    tracing::info!(events = events.len(), %seed, "loaded script");

    let duration = duration_ms.map_or_else(
        || {
            let last = events.iter().map(|event| event.at_ms).max().unwrap_or(0);
            Duration::from_millis(last) + DEFAULT_TAIL
        },
        Duration::from_millis,
    );
    let frames = replay(*seed, events, Duration::from_millis(*tick_ms), duration);

    if *every_frame {
        util::Output::save_json(&frames, output.as_deref())?;
    } else if let Some(last) = frames.last() {
        util::Output::save_json(last, output.as_deref())?;
    }
    Ok(())
}

/// Runs the host at a fixed frame rate, delivering each event before the
/// first frame at or after its time.
fn replay(
    seed: PieceSeed,
    mut events: Vec<KeyEvent>,
    tick: Duration,
    duration: Duration,
) -> Vec<GameSnapshot> {
    events.sort_by_key(|event| event.at_ms);
    let mut events = events.into_iter().peekable();
    let mut host = Host::new(seed);
    let mut frames = vec![host.game().snapshot()];

    let mut now = Duration::ZERO;
    while now < duration {
        now = (now + tick).min(duration);
        while let Some(event) = events.next_if(|event| Duration::from_millis(event.at_ms) <= now) {
            let at = Duration::from_millis(event.at_ms);
            match event.event {
                KeyEventKind::Press => host.key_down(&event.key, at),
                KeyEventKind::Release => host.key_up(&event.key),
            }
        }
        host.tick(now);
        frames.push(host.game().snapshot());
    }
    tracing::info!(
        frames = frames.len(),
        score = host.game().stats().score(),
        active = host.game().is_active(),
        "replay finished"
    );
    frames
}
