pub use self::{core::*, engine::*};

pub mod core;
pub mod engine;

/// Reason a command issued by the host left the game untouched.
///
/// Rejections are part of normal play (pushing against a wall, holding twice);
/// the host uses them only to skip a redundant re-render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum CommandError {
    #[display("piece would collide")]
    Collision,
    #[display("piece is already resting on the stack")]
    AlreadyGrounded,
    #[display("hold already used for this piece")]
    HoldAlreadyUsed,
    #[display("no active piece while lines are clearing")]
    NoActivePiece,
    #[display("game is over")]
    GameOver,
    #[display("game is still running")]
    GameStillActive,
}
