use blockfall_engine::Command;

/// Keys bound by the default key map, as reported by the keyboard event source.
pub const BOUND_KEYS: [&str; 7] = [
    "ArrowUp",
    "z",
    "ArrowLeft",
    "ArrowRight",
    "ArrowDown",
    " ",
    "c",
];

/// Maps a key name to the command it issues, or `None` for unbound keys.
pub fn command_for_key(key: &str) -> Option<Command> {
    let command = match key {
        "ArrowUp" => Command::RotateClockwise,
        "z" => Command::RotateCounterClockwise,
        "ArrowLeft" => Command::MoveLeft,
        "ArrowRight" => Command::MoveRight,
        "ArrowDown" => Command::SoftDrop,
        " " => Command::HardDrop,
        "c" => Command::Hold,
        _ => return None,
    };
    Some(command)
}

/// Whether holding the command down repeats it.
pub fn repeats(command: Command) -> bool {
    !matches!(command, Command::HardDrop | Command::Hold)
}
