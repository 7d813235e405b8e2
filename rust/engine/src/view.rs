use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::cards::Card;
use crate::chips::{Chip, Round};
use crate::deck::HoleCards;
use crate::player::{ConnectionId, Player, PlayerId};
use crate::state::{GameStore, Phase};

/// What every client may know about a seated player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerPublicState {
    pub id: PlayerId,
    pub name: String,
    pub chips: Vec<Chip>,
    pub ready_for_next_round: bool,
}

impl From<&Player> for PlayerPublicState {
    fn from(player: &Player) -> Self {
        Self {
            id: player.id().clone(),
            name: player.name().to_string(),
            chips: player.chips().to_vec(),
            ready_for_next_round: player.is_ready(),
        }
    }
}

/// A snapshot of the table as seen from one connection.
///
/// Other players' hole cards appear only once the game has finished.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientGameState {
    pub phase: Phase,
    pub players: Vec<PlayerPublicState>,
    /// Empty when the connection has not joined.
    pub my_id: String,
    pub my_hole_cards: Option<HoleCards>,
    pub revealed_hole_cards: BTreeMap<PlayerId, HoleCards>,
    pub community_cards: Vec<Card>,
    /// `None` while in the lobby.
    pub current_round: Option<Round>,
    pub middle_chips: Vec<Chip>,
}

/// Projects the store for `connection`. Unknown connections get the view of
/// a spectator who has not joined.
pub fn project(store: &GameStore, connection: &ConnectionId) -> ClientGameState {
    let me = store.player_for(connection);

    let revealed_hole_cards = if store.phase() == Phase::Finished {
        store.hole_cards.clone()
    } else {
        BTreeMap::new()
    };

    ClientGameState {
        phase: store.phase(),
        players: store.players().iter().map(PlayerPublicState::from).collect(),
        my_id: me.map(|id| id.as_str().to_string()).unwrap_or_default(),
        my_hole_cards: me.and_then(|id| store.hole_cards(id)).copied(),
        revealed_hole_cards,
        community_cards: store.community_cards().to_vec(),
        current_round: (store.phase() != Phase::Lobby).then(|| store.current_round()),
        middle_chips: store.middle_chips().to_vec(),
    }
}
