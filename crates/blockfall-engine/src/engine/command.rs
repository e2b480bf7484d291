use std::{fmt, str::FromStr};

/// Discrete command a host forwards in response to an input edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    RotateClockwise,
    RotateCounterClockwise,
    MoveLeft,
    MoveRight,
    SoftDrop,
    HardDrop,
    Hold,
    RestartIfGameOver,
}

/// Error returned for a token that names no [`Command`].
///
/// Hosts treat it as "not handled" and skip the re-render.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("unknown command: {token}")]
pub struct ParseCommandError {
    #[error(not(source))]
    token: String,
}

impl Command {
    pub const ALL: [Command; 8] = [
        Command::RotateClockwise,
        Command::RotateCounterClockwise,
        Command::MoveLeft,
        Command::MoveRight,
        Command::SoftDrop,
        Command::HardDrop,
        Command::Hold,
        Command::RestartIfGameOver,
    ];

    /// Kebab-case token of the command.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Command::RotateClockwise => "rotate-clockwise",
            Command::RotateCounterClockwise => "rotate-counter-clockwise",
            Command::MoveLeft => "move-left",
            Command::MoveRight => "move-right",
            Command::SoftDrop => "soft-drop",
            Command::HardDrop => "hard-drop",
            Command::Hold => "hold",
            Command::RestartIfGameOver => "restart-if-game-over",
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Command {
    type Err = ParseCommandError;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        Command::ALL
            .into_iter()
            .find(|command| command.as_str() == token)
            .ok_or_else(|| ParseCommandError {
                token: token.to_owned(),
            })
    }
}
