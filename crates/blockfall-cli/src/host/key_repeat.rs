use std::{collections::BTreeMap, time::Duration};

use blockfall_engine::Command;

use super::keymap;

/// Delay between a key press and its first repeat.
pub const INITIAL_DELAY: Duration = Duration::from_millis(150);

/// Interval between two repeats of a held key.
pub const REPEAT_INTERVAL: Duration = Duration::from_micros(29_980);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct HeldKey {
    command: Command,
    /// `None` for keys that never repeat.
    last_repeated_at: Option<Duration>,
}

/// Tracks held keys and how many repeats each one owes.
///
/// Repeats are computed from elapsed time, so a slow frame yields several
/// repeats at once instead of dropping them.
#[derive(Debug, Default, Clone)]
pub struct KeyRepeat {
    held: BTreeMap<String, HeldKey>,
}

impl KeyRepeat {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_held(&self, key: &str) -> bool {
        self.held.contains_key(key)
    }

    /// Starts tracking a pressed key.
    ///
    /// The first repeat is due [`INITIAL_DELAY`] after `now`.
    pub fn press(&mut self, key: &str, command: Command, now: Duration) {
        let last_repeated_at =
            keymap::repeats(command).then(|| now + INITIAL_DELAY.saturating_sub(REPEAT_INTERVAL));
        self.held.insert(
            key.to_owned(),
            HeldKey {
                command,
                last_repeated_at,
            },
        );
    }

    pub fn release(&mut self, key: &str) {
        self.held.remove(key);
    }

    pub fn clear(&mut self) {
        self.held.clear();
    }

    /// Returns each held command with the number of repeats due at `now`.
    pub fn take_due(&mut self, now: Duration) -> Vec<(Command, u32)> {
        let mut due = vec![];
        for held in self.held.values_mut() {
            let Some(last) = &mut held.last_repeated_at else {
                continue;
            };
            let elapsed = now.saturating_sub(*last);
            let times =
                u32::try_from(elapsed.as_nanos() / REPEAT_INTERVAL.as_nanos()).unwrap_or(u32::MAX);
            if times > 0 {
                *last += REPEAT_INTERVAL * times;
                due.push((held.command, times));
            }
        }
        due
    }
}
