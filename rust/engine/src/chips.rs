use std::fmt;

use serde::{Deserialize, Serialize};

/// One of the four chip rounds, always in `1..=4`.
///
/// Serialized as its bare number.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Round(u8);

impl Round {
    pub const FIRST: Round = Round(1);
    pub const LAST: Round = Round(4);

    pub fn new(number: u8) -> Option<Round> {
        (1..=4).contains(&number).then_some(Round(number))
    }

    pub fn number(self) -> u8 {
        self.0
    }

    /// The round that opens after this one, or `None` after the last round.
    pub fn next(self) -> Option<Round> {
        Round::new(self.0 + 1)
    }

    /// How many community cards are revealed when this round closes:
    /// three after the first, one after the second and third, none after
    /// the last.
    pub fn community_cards_on_close(self) -> usize {
        match self.0 {
            1 => 3,
            2 | 3 => 1,
            _ => 0,
        }
    }
}

impl Default for Round {
    fn default() -> Self {
        Round::FIRST
    }
}

impl TryFrom<u8> for Round {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Round::new(value).ok_or_else(|| format!("round must be between 1 and 4, got {value}"))
    }
}

impl From<Round> for u8 {
    fn from(round: Round) -> Self {
        round.0
    }
}

impl fmt::Display for Round {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A round-scoped token. Exactly one chip exists per `(round, number)` pair
/// for the lifetime of a game; chips only ever move between the middle and
/// the players.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct Chip {
    pub round: Round,
    pub number: u32,
}

impl Chip {
    pub const fn new(round: Round, number: u32) -> Self {
        Self { round, number }
    }

    pub fn is_for(&self, round: Round, number: u32) -> bool {
        self.round == round && self.number == number
    }
}

/// The full chip set for `round` in a game of `player_count` players:
/// `{round} x {1..=player_count}`, ordered by number.
pub fn chips_for_round(round: Round, player_count: usize) -> Vec<Chip> {
    (1..=player_count as u32)
        .map(|number| Chip::new(round, number))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_walks_one_through_four() {
        let rounds: Vec<u8> = std::iter::successors(Some(Round::FIRST), |r| r.next())
            .map(Round::number)
            .collect();
        assert_eq!(rounds, vec![1, 2, 3, 4]);
        assert_eq!(Round::LAST.next(), None);
    }

    #[test]
    fn community_reveal_schedule_totals_five() {
        let total: usize = (1..=4)
            .filter_map(Round::new)
            .map(Round::community_cards_on_close)
            .sum();
        assert_eq!(total, 5);
    }

    #[test]
    fn round_rejects_out_of_range_on_the_wire() {
        assert!(serde_json::from_str::<Round>("0").is_err());
        assert!(serde_json::from_str::<Round>("5").is_err());
        assert_eq!(serde_json::from_str::<Round>("3").ok(), Round::new(3));
    }

    #[test]
    fn chip_set_is_numbered_from_one() {
        let round = Round::new(2).expect("round 2");
        let chips = chips_for_round(round, 3);
        assert_eq!(
            chips,
            vec![Chip::new(round, 1), Chip::new(round, 2), Chip::new(round, 3)]
        );
        assert_eq!(
            serde_json::to_string(&chips[0]).expect("serialize"),
            r#"{"round":2,"number":1}"#
        );
    }
}
