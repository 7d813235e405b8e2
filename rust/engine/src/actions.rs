use serde::{Deserialize, Serialize};

use crate::chips::{chips_for_round, Round};
use crate::deck::deal;
use crate::errors::ActionError;
use crate::player::{ConnectionId, Player, PlayerId};
use crate::state::{GameStore, Phase, MAX_NAME_LEN, MAX_PLAYERS, MIN_PLAYERS};

/// Everything a client can ask the table to do.
///
/// Decoded from JSON objects tagged by `"type"`, e.g.
/// `{"type":"STEAL_CHIP","fromPlayerId":"...","chipNumber":2}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Action {
    JoinLobby {
        name: String,
    },
    StartGame,
    DiscardChip {
        #[serde(rename = "chipNumber")]
        chip_number: u32,
    },
    TakeFromMiddle {
        #[serde(rename = "chipNumber")]
        chip_number: u32,
    },
    StealChip {
        #[serde(rename = "fromPlayerId")]
        from_player_id: PlayerId,
        #[serde(rename = "chipNumber")]
        chip_number: u32,
    },
    SetReady {
        ready: bool,
    },
    FinishGame,
}

impl Action {
    pub fn kind(&self) -> &'static str {
        match self {
            Action::JoinLobby { .. } => "join_lobby",
            Action::StartGame => "start_game",
            Action::DiscardChip { .. } => "discard_chip",
            Action::TakeFromMiddle { .. } => "take_from_middle",
            Action::StealChip { .. } => "steal_chip",
            Action::SetReady { .. } => "set_ready",
            Action::FinishGame => "finish_game",
        }
    }
}

/// What a successfully applied action changed, beyond the action itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Applied {
    Joined { player_id: PlayerId },
    GameStarted { players: usize },
    Updated,
    RoundAdvanced { round: Round },
    GameFinished,
    Reset,
}

impl GameStore {
    /// Validates and applies one action on behalf of `connection`.
    ///
    /// Every check runs before the first write, so an `Err` leaves the store
    /// exactly as it was.
    pub fn apply(
        &mut self,
        connection: &ConnectionId,
        action: Action,
    ) -> Result<Applied, ActionError> {
        match action {
            Action::JoinLobby { name } => self.join_lobby(connection, &name),
            Action::StartGame => self.start_game(),
            Action::DiscardChip { chip_number } => self.discard_chip(connection, chip_number),
            Action::TakeFromMiddle { chip_number } => {
                self.take_from_middle(connection, chip_number)
            }
            Action::StealChip {
                from_player_id,
                chip_number,
            } => self.steal_chip(connection, &from_player_id, chip_number),
            Action::SetReady { ready } => self.set_ready(connection, ready),
            Action::FinishGame => {
                self.reset_to_lobby();
                Ok(Applied::Reset)
            }
        }
    }

    fn join_lobby(&mut self, connection: &ConnectionId, name: &str) -> Result<Applied, ActionError> {
        if self.phase != Phase::Lobby {
            return Err(ActionError::GameInProgress);
        }
        if self.player_for(connection).is_some() {
            return Err(ActionError::AlreadyJoined);
        }
        let name = name.trim();
        if name.is_empty() {
            return Err(ActionError::EmptyName);
        }
        if name.chars().count() > MAX_NAME_LEN {
            return Err(ActionError::NameTooLong { max: MAX_NAME_LEN });
        }
        if self.players.iter().any(|p| p.name_matches(name)) {
            return Err(ActionError::NameTaken);
        }

        let player_id = PlayerId::generate();
        self.players.push(Player::new(player_id.clone(), name));
        self.connections
            .insert(connection.clone(), Some(player_id.clone()));
        Ok(Applied::Joined { player_id })
    }

    fn start_game(&mut self) -> Result<Applied, ActionError> {
        if self.phase != Phase::Lobby {
            return Err(ActionError::GameAlreadyRunning);
        }
        if self.players.len() < MIN_PLAYERS {
            return Err(ActionError::NotEnoughPlayers { min: MIN_PLAYERS });
        }
        if self.players.len() > MAX_PLAYERS {
            return Err(ActionError::TooManyPlayers);
        }

        let ids: Vec<PlayerId> = self.players.iter().map(|p| p.id().clone()).collect();
        let deck = self.shuffler.shuffle();
        let (hole_cards, remainder) =
            deal(&deck, &ids).map_err(|_| ActionError::TooManyPlayers)?;

        self.hole_cards = hole_cards;
        self.deck = remainder;
        self.community_cards.clear();
        self.current_round = Round::FIRST;
        self.chip_count = self.players.len();
        self.middle_chips = chips_for_round(Round::FIRST, self.chip_count);
        for player in &mut self.players {
            player.reset_for_game();
        }
        self.phase = Phase::Game;
        Ok(Applied::GameStarted {
            players: self.chip_count,
        })
    }

    fn discard_chip(
        &mut self,
        connection: &ConnectionId,
        chip_number: u32,
    ) -> Result<Applied, ActionError> {
        self.require_game()?;
        let actor = self.actor_index(connection)?;
        let round = self.current_round;
        let index = self.players[actor]
            .position_of(round, chip_number)
            .ok_or(ActionError::ChipNotHeld)?;

        let chip = self.players[actor].remove_chip_at(index);
        self.middle_chips.push(chip);
        // Giving a chip up can never complete a round.
        Ok(Applied::Updated)
    }

    fn take_from_middle(
        &mut self,
        connection: &ConnectionId,
        chip_number: u32,
    ) -> Result<Applied, ActionError> {
        self.require_game()?;
        let actor = self.actor_index(connection)?;
        let round = self.current_round;
        if self.players[actor].holds_chip_for_round(round) {
            return Err(ActionError::AlreadyHoldingChip);
        }
        let index = self
            .middle_chips
            .iter()
            .position(|c| c.is_for(round, chip_number))
            .ok_or(ActionError::ChipNotInMiddle)?;

        let chip = self.middle_chips.remove(index);
        self.players[actor].receive_chip(chip);
        Ok(self.check_and_advance())
    }

    fn steal_chip(
        &mut self,
        connection: &ConnectionId,
        target: &PlayerId,
        chip_number: u32,
    ) -> Result<Applied, ActionError> {
        self.require_game()?;
        let actor = self.actor_index(connection)?;
        let round = self.current_round;
        if self.players[actor].holds_chip_for_round(round) {
            return Err(ActionError::AlreadyHoldingChip);
        }
        let victim = self
            .players
            .iter()
            .position(|p| p.id() == target)
            .ok_or(ActionError::TargetNotFound)?;
        if victim == actor {
            return Err(ActionError::StealFromSelf);
        }
        let index = self.players[victim]
            .position_of(round, chip_number)
            .ok_or(ActionError::TargetMissingChip)?;

        let chip = self.players[victim].remove_chip_at(index);
        self.players[actor].receive_chip(chip);
        // The victim keeps their ready flag, and with their chip gone the
        // round cannot be complete, so there is nothing to check.
        Ok(Applied::Updated)
    }

    fn set_ready(&mut self, connection: &ConnectionId, ready: bool) -> Result<Applied, ActionError> {
        self.require_game()?;
        let actor = self.actor_index(connection)?;
        self.players[actor].set_ready(ready);
        Ok(self.check_and_advance())
    }
}
