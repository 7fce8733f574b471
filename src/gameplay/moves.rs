//! the dense move encoding shared by the generator, the applier, and
//! every agent. a move is `(phase_index, card_code, target_location)`.
//! non-negative card codes index into the actor's hand; negative codes
//! are sentinels:
//!
//! - `-1` draw from the phase source
//! - `-2` decline a draw (marks the player as standing)
//! - `-3` pass on a play phase
//! - `-4` challenge an outstanding claim
//! - `-5` plain pass
//! - `-10 - a` betting action `a` (see [`super::betting::BetAction`])
//! - `-100 - v` bid of `v` tricks; the nil bid is distinguished by a
//!   `Hand` target where ordinary bids carry `Discard`
//! - `-1000 - (rank * 8 + size)` a multi-card play of `size` cards of
//!   `rank`

use crate::cards::location::Location;

pub const DRAW: i32 = -1;
pub const DRAW_PASS: i32 = -2;
pub const PLAY_PASS: i32 = -3;
pub const CHALLENGE: i32 = -4;
pub const PASS: i32 = -5;
pub const BET_BASE: i32 = -10;
pub const BID_BASE: i32 = -100;
pub const GROUP_BASE: i32 = -1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Move {
    pub phase: usize,
    pub card: i32,
    pub target: Location,
}

impl Move {
    pub fn draw(phase: usize, source: Location) -> Self {
        Self {
            phase,
            card: DRAW,
            target: source,
        }
    }
    pub fn draw_pass(phase: usize) -> Self {
        Self {
            phase,
            card: DRAW_PASS,
            target: Location::Hand,
        }
    }
    pub fn play(phase: usize, index: usize, target: Location) -> Self {
        Self {
            phase,
            card: index as i32,
            target,
        }
    }
    pub fn group(phase: usize, rank: u8, size: usize, target: Location) -> Self {
        Self {
            phase,
            card: GROUP_BASE - (rank as i32 * 8 + size as i32),
            target,
        }
    }
    pub fn play_pass(phase: usize) -> Self {
        Self {
            phase,
            card: PLAY_PASS,
            target: Location::Hand,
        }
    }
    pub fn challenge(phase: usize) -> Self {
        Self {
            phase,
            card: CHALLENGE,
            target: Location::Discard,
        }
    }
    pub fn pass(phase: usize) -> Self {
        Self {
            phase,
            card: PASS,
            target: Location::Hand,
        }
    }
    pub fn bet(phase: usize, action: super::betting::BetAction) -> Self {
        Self {
            phase,
            card: BET_BASE - action as i32,
            target: Location::Hand,
        }
    }
    pub fn bid(phase: usize, value: i32, nil: bool) -> Self {
        Self {
            phase,
            card: BID_BASE - value,
            target: if nil { Location::Hand } else { Location::Discard },
        }
    }

    pub fn is_draw(&self) -> bool {
        self.card == DRAW
    }
    pub fn is_card_play(&self) -> bool {
        self.card >= 0
    }
    pub fn hand_index(&self) -> Option<usize> {
        (self.card >= 0).then_some(self.card as usize)
    }
    pub fn bet_action(&self) -> Option<super::betting::BetAction> {
        let code = BET_BASE - self.card;
        (self.card <= BET_BASE && self.card > BID_BASE)
            .then(|| super::betting::BetAction::from(code as u8))
    }
    pub fn bid_value(&self) -> Option<(i32, bool)> {
        (self.card <= BID_BASE && self.card > GROUP_BASE)
            .then(|| (BID_BASE - self.card, self.target == Location::Hand))
    }
    pub fn rank_group(&self) -> Option<(u8, usize)> {
        (self.card <= GROUP_BASE).then(|| {
            let code = GROUP_BASE - self.card;
            ((code / 8) as u8, (code % 8) as usize)
        })
    }
}

impl std::fmt::Display for Move {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self.card {
            DRAW => write!(f, "p{} draw<-{}", self.phase, self.target),
            DRAW_PASS => write!(f, "p{} stand", self.phase),
            PLAY_PASS => write!(f, "p{} pass-play", self.phase),
            CHALLENGE => write!(f, "p{} challenge", self.phase),
            PASS => write!(f, "p{} pass", self.phase),
            c if c >= 0 => write!(f, "p{} card#{}->{}", self.phase, c, self.target),
            _ => {
                if let Some(action) = self.bet_action() {
                    write!(f, "p{} {}", self.phase, action)
                } else if let Some((v, nil)) = self.bid_value() {
                    match nil {
                        true => write!(f, "p{} bid-nil", self.phase),
                        false => write!(f, "p{} bid {}", self.phase, v),
                    }
                } else if let Some((rank, size)) = self.rank_group() {
                    write!(f, "p{} {}x rank{}->{}", self.phase, size, rank, self.target)
                } else {
                    write!(f, "p{} ?{}", self.phase, self.card)
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gameplay::betting::BetAction;

    #[test]
    fn bet_codes_round_trip() {
        for action in [
            BetAction::Check,
            BetAction::Call,
            BetAction::Bet,
            BetAction::Raise,
            BetAction::Fold,
            BetAction::AllIn,
        ] {
            let mv = Move::bet(0, action);
            assert!(mv.bet_action() == Some(action));
            assert!(mv.bid_value().is_none());
            assert!(mv.rank_group().is_none());
            assert!(mv.hand_index().is_none());
        }
    }

    #[test]
    fn bid_codes_round_trip() {
        for v in 0..=13 {
            let mv = Move::bid(1, v, false);
            assert!(mv.bid_value() == Some((v, false)));
        }
        let nil = Move::bid(1, 0, true);
        assert!(nil.bid_value() == Some((0, true)));
        assert!(nil.bet_action().is_none());
    }

    #[test]
    fn group_codes_round_trip() {
        for rank in 0..13u8 {
            for size in 2..=4usize {
                let mv = Move::group(0, rank, size, Location::Discard);
                assert!(mv.rank_group() == Some((rank, size)));
                assert!(mv.bid_value().is_none());
            }
        }
    }

    #[test]
    fn card_indices_pass_through() {
        let mv = Move::play(2, 7, Location::Tableau);
        assert!(mv.hand_index() == Some(7));
        assert!(mv.is_card_play());
        assert!(!mv.is_draw());
    }
}
