use std::collections::BTreeMap;

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

use crate::cards::{full_deck, Card};
use crate::errors::DealError;
use crate::player::PlayerId;

/// The two private cards dealt to each player.
pub type HoleCards = [Card; 2];

/// Hole cards keyed by the player they were dealt to.
pub type HoleCardAssignments = BTreeMap<PlayerId, HoleCards>;

/// Source of freshly shuffled decks.
///
/// The shuffler owns its RNG so a store built with a seed deals the same
/// sequence of games every time it is replayed.
#[derive(Debug, Clone)]
pub struct Shuffler {
    rng: ChaCha20Rng,
}

impl Shuffler {
    pub fn new_with_seed(seed: u64) -> Self {
        Self {
            rng: ChaCha20Rng::seed_from_u64(seed),
        }
    }

    pub fn from_entropy() -> Self {
        Self::new_with_seed(rand::random())
    }

    /// A complete 52-card deck in a new random order.
    pub fn shuffle(&mut self) -> Vec<Card> {
        shuffled_deck(&mut self.rng)
    }
}

/// Returns a uniformly random permutation of the 52-card deck.
pub fn shuffled_deck<R: Rng + ?Sized>(rng: &mut R) -> Vec<Card> {
    let mut cards = full_deck();
    cards.shuffle(rng);
    cards
}

/// Deals two cards to each player, in `player_ids` order, from the top of
/// `deck`. The first player gets cards 0 and 1, the second 2 and 3, and so on.
///
/// Returns the assignments together with the undealt remainder; `deck`
/// itself is left untouched.
pub fn deal(
    deck: &[Card],
    player_ids: &[PlayerId],
) -> Result<(HoleCardAssignments, Vec<Card>), DealError> {
    let needed = player_ids.len() * 2;
    if needed > deck.len() {
        return Err(DealError::NotEnoughCards {
            needed,
            available: deck.len(),
        });
    }

    let assignments = player_ids
        .iter()
        .zip(deck.chunks_exact(2))
        .map(|(id, pair)| (id.clone(), [pair[0], pair[1]]))
        .collect();

    Ok((assignments, deck[needed..].to_vec()))
}

/// Splits off the first `count` cards. Asking for more than the deck holds
/// yields everything that is left.
pub fn draw(deck: &[Card], count: usize) -> (Vec<Card>, Vec<Card>) {
    let split = count.min(deck.len());
    (deck[..split].to_vec(), deck[split..].to_vec())
}
