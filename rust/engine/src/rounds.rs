use crate::actions::Applied;
use crate::chips::{chips_for_round, Round};
use crate::deck::draw;
use crate::player::Player;
use crate::state::{GameStore, Phase};

/// True when every player holds exactly one chip for `round` and has marked
/// themselves ready. Pure.
pub fn is_round_complete(players: &[Player], round: Round) -> bool {
    players
        .iter()
        .all(|p| p.chips_for_round(round).count() == 1 && p.is_ready())
}

impl GameStore {
    /// Advances past the current round if it is complete.
    ///
    /// Returns [`Applied::Updated`] when nothing changed, so calling it again
    /// on an incomplete round is harmless.
    pub fn check_and_advance(&mut self) -> Applied {
        if self.phase != Phase::Game || !is_round_complete(&self.players, self.current_round) {
            return Applied::Updated;
        }
        self.advance()
    }

    fn advance(&mut self) -> Applied {
        let closing = self.current_round;
        let (revealed, remainder) = draw(&self.deck, closing.community_cards_on_close());
        self.community_cards.extend(revealed);
        self.deck = remainder;

        match closing.next() {
            Some(round) => {
                self.current_round = round;
                self.middle_chips = chips_for_round(round, self.chip_count);
                for player in &mut self.players {
                    player.set_ready(false);
                }
                Applied::RoundAdvanced { round }
            }
            None => {
                self.phase = Phase::Finished;
                Applied::GameFinished
            }
        }
    }
}
