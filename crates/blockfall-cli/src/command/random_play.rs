use std::{path::PathBuf, time::Duration};

use blockfall_engine::{GameStats, PieceBag, PieceSeed};
use rand::{Rng as _, SeedableRng as _};
use rand_pcg::Pcg32;
use serde::Serialize;

use crate::{
    host::{Host, keymap::BOUND_KEYS},
    util::Output,
};

#[derive(Debug, Clone, clap::Args)]
pub struct RandomPlayArg {
    /// Piece seed as 32 hex characters; random when omitted
    #[arg(long)]
    seed: Option<PieceSeed>,
    /// Maximum number of frames to simulate
    #[arg(long, default_value_t = 100_000)]
    ticks: u64,
    /// Frame length in milliseconds
    #[arg(long, default_value_t = 16)]
    tick_ms: u64,
    /// Output file path
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize)]
struct RandomPlaySummary {
    seed: PieceSeed,
    ticks: u64,
    time_ms: f64,
    game_over: bool,
    stats: GameStats,
}

/// Chance per frame of tapping a random bound key.
const PRESS_PROBABILITY: f64 = 0.25;

pub fn run(arg: &RandomPlayArg) -> anyhow::Result<()> {
    let RandomPlayArg {
        seed,
        ticks,
        tick_ms,
        output,
    } = arg;
    anyhow::ensure!(*tick_ms > 0, "--tick-ms must be positive");

    let seed = seed.unwrap_or_else(|| rand::rng().random());
    tracing::info!(%seed, "starting random play");
    let summary = random_play(seed, *ticks, Duration::from_millis(*tick_ms));
    Output::save_json(&summary, output.as_deref())
}

/// Generator for the random key presses, derived from the piece seed.
///
/// The seed is drawn from a bag seeded with `seed`, so the input stream never
/// coincides with the piece stream.
fn input_rng(seed: PieceSeed) -> Pcg32 {
    let input_seed = PieceBag::with_seed(seed).next_seed();
    Pcg32::from_seed(input_seed.to_bytes())
}

fn random_play(seed: PieceSeed, max_ticks: u64, tick: Duration) -> RandomPlaySummary {
    let mut rng = input_rng(seed);
    let mut host = Host::new(seed);
    let mut now = Duration::ZERO;
    let mut ticks = 0;
    while ticks < max_ticks && host.game().is_active() {
        ticks += 1;
        now += tick;
        host.tick(now);
        if rng.random_bool(PRESS_PROBABILITY) {
            let key = BOUND_KEYS[rng.random_range(0..BOUND_KEYS.len())];
            host.key_down(key, now);
            host.key_up(key);
        }
        if ticks % 1000 == 0 {
            tracing::debug!(ticks, score = host.game().stats().score(), "random play progress");
        }
    }

    let game = host.game();
    tracing::info!(
        ticks,
        score = game.stats().score(),
        lines = game.stats().total_cleared_lines(),
        game_over = !game.is_active(),
        "random play finished"
    );
    RandomPlaySummary {
        seed,
        ticks,
        time_ms: game.time().as_secs_f64() * 1000.0,
        game_over: !game.is_active(),
        stats: game.stats().clone(),
    }
}
