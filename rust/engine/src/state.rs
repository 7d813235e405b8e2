use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::cards::Card;
use crate::chips::{Chip, Round};
use crate::deck::{HoleCardAssignments, HoleCards, Shuffler};
use crate::errors::ActionError;
use crate::player::{ConnectionId, Player, PlayerId};

/// Fewest players a game can start with.
pub const MIN_PLAYERS: usize = 2;
/// Most players a single deck can serve: two hole cards each plus five
/// community cards.
pub const MAX_PLAYERS: usize = 23;
/// Longest accepted player name, in characters.
pub const MAX_NAME_LEN: usize = 20;

/// Top-level lifecycle stage of the table.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    #[default]
    Lobby,
    Game,
    Finished,
}

/// The single authoritative record of a game.
///
/// Everything a client can observe is derived from this struct. It is only
/// mutated through [`GameStore::apply`] and the connection hooks, each of
/// which either completes or leaves the store untouched.
#[derive(Debug)]
pub struct GameStore {
    pub(crate) phase: Phase,
    pub(crate) players: Vec<Player>,
    pub(crate) hole_cards: HoleCardAssignments,
    pub(crate) community_cards: Vec<Card>,
    pub(crate) current_round: Round,
    pub(crate) middle_chips: Vec<Chip>,
    pub(crate) deck: Vec<Card>,
    /// Number of chips per round, fixed to the player count at start.
    pub(crate) chip_count: usize,
    pub(crate) connections: HashMap<ConnectionId, Option<PlayerId>>,
    pub(crate) shuffler: Shuffler,
}

impl Default for GameStore {
    fn default() -> Self {
        Self::new()
    }
}

impl GameStore {
    pub fn new() -> Self {
        Self::with_shuffler(Shuffler::from_entropy())
    }

    /// A store whose games are dealt from a reproducible sequence of decks.
    pub fn with_seed(seed: u64) -> Self {
        Self::with_shuffler(Shuffler::new_with_seed(seed))
    }

    fn with_shuffler(shuffler: Shuffler) -> Self {
        Self {
            phase: Phase::Lobby,
            players: Vec::new(),
            hole_cards: HoleCardAssignments::new(),
            community_cards: Vec::new(),
            current_round: Round::FIRST,
            middle_chips: Vec::new(),
            deck: Vec::new(),
            chip_count: 0,
            connections: HashMap::new(),
            shuffler,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Players in join order.
    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn player(&self, id: &PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| p.id() == id)
    }

    pub fn hole_cards(&self, id: &PlayerId) -> Option<&HoleCards> {
        self.hole_cards.get(id)
    }

    pub fn community_cards(&self) -> &[Card] {
        &self.community_cards
    }

    pub fn current_round(&self) -> Round {
        self.current_round
    }

    pub fn middle_chips(&self) -> &[Chip] {
        &self.middle_chips
    }

    pub fn deck_remaining(&self) -> usize {
        self.deck.len()
    }

    /// Chips generated per round in the running game; zero in the lobby.
    pub fn chip_count(&self) -> usize {
        self.chip_count
    }

    /// Registered connections, bound or not.
    pub fn connections(&self) -> impl Iterator<Item = &ConnectionId> + '_ {
        self.connections.keys()
    }

    /// Whether `connection` is registered, bound or not. A reset keeps
    /// connections registered; a disconnect forgets them.
    pub fn is_connected(&self, connection: &ConnectionId) -> bool {
        self.connections.contains_key(connection)
    }

    /// The player a connection is bound to, if it has joined.
    pub fn player_for(&self, connection: &ConnectionId) -> Option<&PlayerId> {
        self.connections.get(connection).and_then(Option::as_ref)
    }

    /// Registers a new, unbound connection. Registering an already known
    /// connection keeps its binding.
    pub fn connect(&mut self, connection: ConnectionId) {
        self.connections.entry(connection).or_insert(None);
    }

    /// Forgets a connection.
    ///
    /// In the lobby the player it was bound to leaves with it and their name
    /// becomes available again; once a game has started the seat and its
    /// chips stay, only the binding is dropped. Returns the player removed
    /// from the lobby, if any.
    pub fn disconnect(&mut self, connection: &ConnectionId) -> Option<PlayerId> {
        let player_id = self.connections.remove(connection).flatten()?;
        if self.phase != Phase::Lobby {
            return None;
        }
        self.players.retain(|p| p.id() != &player_id);
        self.hole_cards.remove(&player_id);
        Some(player_id)
    }

    /// Index of the player bound to `connection`.
    pub(crate) fn actor_index(&self, connection: &ConnectionId) -> Result<usize, ActionError> {
        let player_id = self
            .player_for(connection)
            .ok_or(ActionError::PlayerNotFound)?;
        self.players
            .iter()
            .position(|p| p.id() == player_id)
            .ok_or(ActionError::PlayerNotFound)
    }

    pub(crate) fn require_game(&self) -> Result<(), ActionError> {
        if self.phase == Phase::Game {
            Ok(())
        } else {
            Err(ActionError::NotInGame)
        }
    }

    /// Back to an empty lobby. Connections stay registered but are unbound.
    pub(crate) fn reset_to_lobby(&mut self) {
        self.phase = Phase::Lobby;
        self.players.clear();
        self.hole_cards.clear();
        self.community_cards.clear();
        self.current_round = Round::FIRST;
        self.middle_chips.clear();
        self.deck.clear();
        self.chip_count = 0;
        for bound in self.connections.values_mut() {
            *bound = None;
        }
    }
}
