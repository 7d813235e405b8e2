use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::chips::{Chip, Round};

/// Server-issued player identity, stable for the duration of a game.
#[derive(Debug, Clone, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(String);

impl PlayerId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for PlayerId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for PlayerId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identity of one transport connection. A connection exists before its
/// owner joins and may outlive the player it was bound to.
#[derive(Debug, Clone, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConnectionId(String);

impl ConnectionId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for ConnectionId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for ConnectionId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A seated participant: their chips across every round and whether they
/// are ready for the current round to close.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    id: PlayerId,
    name: String,
    chips: Vec<Chip>,
    ready_for_next_round: bool,
}

impl Player {
    pub fn new(id: PlayerId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            chips: Vec::new(),
            ready_for_next_round: false,
        }
    }

    pub fn id(&self) -> &PlayerId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Every chip held, in the order it was acquired.
    pub fn chips(&self) -> &[Chip] {
        &self.chips
    }

    pub fn is_ready(&self) -> bool {
        self.ready_for_next_round
    }

    pub fn set_ready(&mut self, ready: bool) {
        self.ready_for_next_round = ready;
    }

    pub fn chips_for_round(&self, round: Round) -> impl Iterator<Item = &Chip> + '_ {
        self.chips.iter().filter(move |c| c.round == round)
    }

    pub fn holds_chip_for_round(&self, round: Round) -> bool {
        self.chips.iter().any(|c| c.round == round)
    }

    pub fn name_matches(&self, other: &str) -> bool {
        self.name.to_lowercase() == other.to_lowercase()
    }

    pub(crate) fn position_of(&self, round: Round, number: u32) -> Option<usize> {
        self.chips.iter().position(|c| c.is_for(round, number))
    }

    pub(crate) fn remove_chip_at(&mut self, index: usize) -> Chip {
        self.chips.remove(index)
    }

    pub(crate) fn receive_chip(&mut self, chip: Chip) {
        self.chips.push(chip);
    }

    /// Drops all chips and the ready flag, as at the start of a game.
    pub(crate) fn reset_for_game(&mut self) {
        self.chips.clear();
        self.ready_for_next_round = false;
    }
}
