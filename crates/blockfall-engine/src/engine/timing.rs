use std::time::Duration;

/// Time a grounded piece may rest before it locks.
pub const LOCK_DELAY: Duration = Duration::from_millis(500);

/// Length of the line-clear animation window.
pub const LINE_CLEAR_DELAY: Duration = Duration::from_millis(300);

/// Gravity interval per level (level 1 first), in microseconds.
///
/// Levels beyond the table reuse the last entry.
const FALL_INTERVALS_MICROS: [u64; 20] = [
    1_000_000, 793_000, 617_800, 472_730, 355_200, 262_000, 189_680, 134_730, 93_880, 64_150,
    42_980, 28_220, 18_150, 11_440, 7_060, 4_260, 2_520, 1_460, 820, 460,
];

/// Time it takes the piece to fall one row at `level`.
#[must_use]
pub fn fall_interval(level: usize) -> Duration {
    let index = level.clamp(1, FALL_INTERVALS_MICROS.len()) - 1;
    Duration::from_micros(FALL_INTERVALS_MICROS[index])
}

/// Number of whole rows gravity has accumulated over `elapsed`.
#[must_use]
pub fn fall_distance(elapsed: Duration, interval: Duration) -> u32 {
    let rows = elapsed.as_nanos() / interval.as_nanos();
    u32::try_from(rows).unwrap_or(u32::MAX)
}

/// Fraction of the line-clear window that has passed, in `[0, 1]`.
#[must_use]
pub fn clear_progress(now: Duration, deadline: Duration) -> f64 {
    let remaining = deadline.saturating_sub(now);
    let elapsed = LINE_CLEAR_DELAY.saturating_sub(remaining);
    (elapsed.as_secs_f64() / LINE_CLEAR_DELAY.as_secs_f64()).clamp(0.0, 1.0)
}
