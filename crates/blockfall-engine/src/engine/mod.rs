//! Game engine logic and state management.
//!
//! This module drives the core data structures through time:
//!
//! - [`Game`] - Session state (board, active piece, next queue, hold, timers)
//! - [`GameStats`] - Score, cleared lines and derived level
//! - [`PieceBag`] - 7-bag piece generation system
//! - [`PieceSeed`] - Seed for deterministic piece generation
//! - [`Command`] - Player intents forwarded by the host
//! - [`GameSnapshot`] - Serializable view of one frame
//!
//! # Game Flow
//!
//! 1. Create a [`Game`] (optionally with a fixed seed)
//! 2. Every frame, call [`Game::update`] with the elapsed session time
//! 3. Between frames, apply player [`Command`]s
//! 4. Render from the accessors or from [`Game::snapshot`]
//! 5. Once the spawn is blocked the game is over until
//!    [`Command::RestartIfGameOver`] starts a new one
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//!
//! use blockfall_engine::{Command, Game, PieceSeed};
//!
//! let mut game = Game::with_seed(PieceSeed::from_bytes([1; 16]));
//!
//! for frame in 1..=120 {
//!     if frame % 10 == 0 {
//!         game.handle_command(Command::HardDrop);
//!     }
//!     game.update(Duration::from_millis(frame * 16));
//! }
//!
//! if !game.is_active() {
//!     println!("Game over!");
//! }
//! println!("score: {}", game.stats().score());
//! ```

pub use self::{command::*, game::*, game_stats::*, piece_bag::*, snapshot::*, timing::*};

mod command;
mod game;
mod game_stats;
mod piece_bag;
mod snapshot;
mod timing;
