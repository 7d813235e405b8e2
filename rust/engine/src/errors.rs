use thiserror::Error;

/// Why an action was refused. The display text is the message shown to the
/// player who sent it; the store is untouched whenever one of these is
/// returned.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ActionError {
    #[error("Game already in progress")]
    GameInProgress,
    #[error("You have already joined")]
    AlreadyJoined,
    #[error("Name cannot be empty")]
    EmptyName,
    #[error("Name must be at most {max} characters")]
    NameTooLong { max: usize },
    #[error("Name already taken")]
    NameTaken,
    #[error("Game already running")]
    GameAlreadyRunning,
    #[error("Need at least {min} players")]
    NotEnoughPlayers { min: usize },
    #[error("Too many players")]
    TooManyPlayers,
    #[error("Not in game")]
    NotInGame,
    #[error("Player not found")]
    PlayerNotFound,
    #[error("You do not hold that chip for the current round")]
    ChipNotHeld,
    #[error("You already hold a chip for this round")]
    AlreadyHoldingChip,
    #[error("Chip not in middle")]
    ChipNotInMiddle,
    #[error("Target player not found")]
    TargetNotFound,
    #[error("Cannot steal from yourself")]
    StealFromSelf,
    #[error("Target does not hold that chip for this round")]
    TargetMissingChip,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DealError {
    #[error("Not enough cards to deal: need {needed}, have {available}")]
    NotEnoughCards { needed: usize, available: usize },
}
