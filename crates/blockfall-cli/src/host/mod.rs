//! Headless host driving a [`Game`] from keyboard-style events.
//!
//! The host owns the key auto-repeat state and the key map; the engine only
//! ever sees commands and the elapsed session time.

use std::time::Duration;

use blockfall_engine::{Command, Game, PieceSeed};

use self::key_repeat::KeyRepeat;

pub mod key_repeat;
pub mod keymap;

#[derive(Debug, Clone)]
pub struct Host {
    game: Game,
    repeat: KeyRepeat,
}

impl Host {
    pub fn new(seed: PieceSeed) -> Self {
        Self {
            game: Game::with_seed(seed),
            repeat: KeyRepeat::new(),
        }
    }

    pub fn game(&self) -> &Game {
        &self.game
    }

    /// Handles a key press at `now`.
    ///
    /// Any key restarts a finished game. Otherwise a bound key issues its
    /// command immediately and starts repeating; a key that is already held
    /// is ignored.
    pub fn key_down(&mut self, key: &str, now: Duration) {
        if !self.game.is_active() {
            self.repeat.clear();
            self.game.handle_command(Command::RestartIfGameOver);
            self.game.update(now);
            return;
        }
        if self.repeat.is_held(key) {
            return;
        }
        let Some(command) = keymap::command_for_key(key) else {
            tracing::trace!(key, "unbound key");
            return;
        };
        self.game.handle_command(command);
        self.game.update(now);
        self.repeat.press(key, command, now);
    }

    pub fn key_up(&mut self, key: &str) {
        self.repeat.release(key);
    }

    /// Runs one animation frame: due key repeats first, then the engine clock.
    pub fn tick(&mut self, now: Duration) {
        if !self.game.is_active() {
            return;
        }
        for (command, times) in self.repeat.take_due(now) {
            tracing::trace!(%command, times, "key repeat");
            for _ in 0..times {
                self.game.handle_command(command);
            }
        }
        self.game.update(now);
    }
}
