//! the betting round driver. a betting phase is resolved in one shot:
//! once any player opens the round, action continues around the table
//! until bets are matched, then the pot settles by fold-win or showdown.

use super::handrank;
use super::moves::Move;
use crate::cards::card::Card;
use crate::genome::BettingPhase;
use crate::genome::Genome;
use crate::genome::HandEval;
use crate::genome::WinCondition;
use crate::players::policy::Agents;
use crate::simulation::metrics::GameMetrics;
use crate::state::GameState;
use rand::rngs::SmallRng;

/// a hand below this strength that bets, raises, or shoves is a bluff
pub const BLUFF_THRESHOLD: f64 = 0.3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BetAction {
    Check = 0,
    Call = 1,
    Bet = 2,
    Raise = 3,
    Fold = 4,
    AllIn = 5,
}

impl From<u8> for BetAction {
    fn from(n: u8) -> Self {
        match n {
            0 => BetAction::Check,
            1 => BetAction::Call,
            2 => BetAction::Bet,
            3 => BetAction::Raise,
            4 => BetAction::Fold,
            5 => BetAction::AllIn,
            _ => panic!("invalid betting action"),
        }
    }
}

impl std::fmt::Display for BetAction {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                BetAction::Check => "check",
                BetAction::Call => "call",
                BetAction::Bet => "bet",
                BetAction::Raise => "raise",
                BetAction::Fold => "fold",
                BetAction::AllIn => "all-in",
            }
        )
    }
}

/// enumerate the actor's legal betting actions for phase `pi`
pub fn betting_moves(state: &GameState, pi: usize, bp: &BettingPhase, out: &mut Vec<Move>) {
    let seat = state.actor();
    if !seat.can_act() {
        return;
    }
    let to_call = state.current_bet - seat.current_bet;
    if to_call <= 0 {
        out.push(Move::bet(pi, BetAction::Check));
        if state.current_bet == 0 && seat.chips >= bp.min_bet {
            out.push(Move::bet(pi, BetAction::Bet));
        }
        if state.current_bet > 0 && state.raises < bp.max_raises && seat.chips >= bp.min_bet {
            out.push(Move::bet(pi, BetAction::Raise));
        }
    } else {
        if seat.chips >= to_call {
            out.push(Move::bet(pi, BetAction::Call));
        }
        if state.raises < bp.max_raises && seat.chips > to_call + bp.min_bet {
            out.push(Move::bet(pi, BetAction::Raise));
        }
        out.push(Move::bet(pi, BetAction::Fold));
    }
    if seat.chips > 0 {
        out.push(Move::bet(pi, BetAction::AllIn));
    }
}

/// crude preflop-style estimate in [0,1] from the top of the hand:
/// average of the two best ranks, sweetened by pairs
pub fn hand_strength(hand: &[Card]) -> f64 {
    if hand.is_empty() {
        return 0.0;
    }
    let mut ranks: Vec<u8> = hand.iter().map(|c| c.rank() as u8).collect();
    ranks.sort_unstable_by(|a, b| b.cmp(a));
    let top = ranks[0] as f64;
    let second = ranks.get(1).copied().unwrap_or(ranks[0]) as f64;
    let mut strength = (top + second) / 2.0 / 12.0;
    let paired = ranks.windows(2).any(|w| w[0] == w[1]);
    if paired {
        strength += 0.25;
    }
    strength.min(1.0)
}

/// run the full betting round for phase `pi`, starting from the move the
/// current actor already chose. every other seat is then driven by the
/// same policy until action closes.
pub fn run_round(
    state: &mut GameState,
    genome: &Genome,
    pi: usize,
    bp: &BettingPhase,
    agents: &mut Agents,
    rng: &mut SmallRng,
    metrics: &mut GameMetrics,
    first: Move,
) {
    for seat in state.seats.iter_mut() {
        seat.needs_to_act = seat.can_act();
    }
    apply_action(state, bp, first, metrics);
    let n = state.num_players();
    // bounded by raises * players in practice; the cap is a stall guard
    let mut guard = n * (bp.max_raises + 2) * 4;
    while live(state) > 1 && state.seats.iter().any(|s| s.needs_to_act && s.can_act()) {
        if guard == 0 {
            break;
        }
        guard -= 1;
        let next = match next_actor(state) {
            Some(p) => p,
            None => break,
        };
        state.current_player = next;
        let mut moves = Vec::new();
        betting_moves(state, pi, bp, &mut moves);
        if moves.is_empty() {
            state.seats[next].needs_to_act = false;
            continue;
        }
        let mv = agents.for_player(next).choose(state, genome, &moves, rng);
        apply_action(state, bp, mv, metrics);
    }
    state.betting_done[pi] = true;
    state.betting_complete = true;
    resolve(state, genome, pi, metrics);
}

fn live(state: &GameState) -> usize {
    state.seats.iter().filter(|s| s.is_live()).count()
}

fn next_actor(state: &GameState) -> Option<usize> {
    let n = state.num_players();
    (1..=n)
        .map(|step| (state.current_player + step) % n)
        .find(|&p| state.seats[p].can_act() && state.seats[p].needs_to_act)
}

fn apply_action(state: &mut GameState, bp: &BettingPhase, mv: Move, metrics: &mut GameMetrics) {
    let Some(action) = mv.bet_action() else {
        return;
    };
    let actor = state.current_player;
    let strength = hand_strength(&state.seats[actor].hand);
    let to_call = (state.current_bet - state.seats[actor].current_bet).max(0);
    state.seats[actor].needs_to_act = false;
    let before = state.current_bet;
    match action {
        BetAction::Check => (),
        BetAction::Fold => state.seats[actor].has_folded = true,
        BetAction::Call => {
            commit(state, actor, to_call);
        }
        BetAction::Bet => {
            commit(state, actor, bp.min_bet);
            metrics.bets += 1;
        }
        BetAction::Raise => {
            commit(state, actor, to_call + bp.min_bet);
            state.raises += 1;
            metrics.bets += 1;
        }
        BetAction::AllIn => {
            let chips = state.seats[actor].chips;
            commit(state, actor, chips);
            metrics.bets += 1;
            metrics.all_ins += 1;
        }
    }
    if matches!(action, BetAction::Bet | BetAction::Raise | BetAction::AllIn)
        && strength < BLUFF_THRESHOLD
    {
        metrics.bluffs += 1;
    }
    let committed = state.seats[actor].current_bet;
    if committed > state.current_bet {
        state.current_bet = committed;
    }
    if state.current_bet > before {
        // a live raise reopens the action
        for (i, seat) in state.seats.iter_mut().enumerate() {
            if i != actor && seat.can_act() {
                seat.needs_to_act = true;
            }
        }
    }
}

fn commit(state: &mut GameState, player: usize, amount: crate::Chips) {
    let seat = &mut state.seats[player];
    let amount = amount.min(seat.chips).max(0);
    seat.chips -= amount;
    seat.current_bet += amount;
    state.pot += amount;
    if seat.chips == 0 {
        seat.is_all_in = true;
    }
}

/// settle the pot. a lone survivor takes it uncontested; otherwise the
/// last betting phase of the structure triggers a showdown under the
/// genome's hand evaluation.
fn resolve(state: &mut GameState, genome: &Genome, pi: usize, metrics: &mut GameMetrics) {
    let survivors: Vec<usize> = (0..state.num_players())
        .filter(|&p| state.seats[p].is_live())
        .collect();
    let best_hand_wins = genome
        .win_conditions
        .iter()
        .any(|w| matches!(w, WinCondition::BestHand));
    if survivors.len() == 1 {
        award(state, survivors[0]);
        metrics.fold_wins += 1;
        if best_hand_wins {
            super::wincheck::declare(state, genome, survivors[0]);
        }
    } else if last_betting_phase(genome, pi) {
        let eval = genome.hand_eval.clone().unwrap_or(HandEval::HighCard);
        let winner = handrank::showdown(state, &survivors, &eval);
        award(state, winner);
        metrics.showdowns += 1;
        if best_hand_wins {
            super::wincheck::declare(state, genome, winner);
        }
    }
    for seat in state.seats.iter_mut() {
        seat.current_bet = 0;
    }
    state.current_bet = 0;
    state.raises = 0;
}

fn last_betting_phase(genome: &Genome, pi: usize) -> bool {
    genome
        .phases()
        .iter()
        .enumerate()
        .filter(|(_, p)| matches!(p, crate::genome::Phase::Betting(_)))
        .map(|(i, _)| i)
        .max()
        == Some(pi)
}

/// the pot pays out in chips, and the same amount lands on the winner's
/// score so score-based win conditions can see betting success
fn award(state: &mut GameState, winner: usize) {
    let pot = state.pot;
    state.seats[winner].chips += pot;
    state.seats[winner].score += pot;
    state.pot = 0;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genome::seeds;
    use rand::SeedableRng;

    fn poker_table(seed: u64) -> (GameState, Genome) {
        let genome = seeds::simple_poker();
        let mut state = GameState::default();
        state.deal(&genome, &mut SmallRng::seed_from_u64(seed));
        (state, genome)
    }

    #[test]
    fn opening_options() {
        let (state, genome) = poker_table(8);
        let bp = match genome.phases()[1] {
            crate::genome::Phase::Betting(ref b) => b.clone(),
            _ => unreachable!(),
        };
        let mut moves = Vec::new();
        betting_moves(&state, 1, &bp, &mut moves);
        let actions: Vec<_> = moves.iter().filter_map(|m| m.bet_action()).collect();
        assert!(actions.contains(&BetAction::Check));
        assert!(actions.contains(&BetAction::Bet));
        assert!(actions.contains(&BetAction::AllIn));
        assert!(!actions.contains(&BetAction::Call));
    }

    #[test]
    fn facing_a_bet() {
        let (mut state, genome) = poker_table(8);
        let bp = match genome.phases()[1] {
            crate::genome::Phase::Betting(ref b) => b.clone(),
            _ => unreachable!(),
        };
        state.current_bet = 10;
        let mut moves = Vec::new();
        betting_moves(&state, 1, &bp, &mut moves);
        let actions: Vec<_> = moves.iter().filter_map(|m| m.bet_action()).collect();
        assert!(actions.contains(&BetAction::Call));
        assert!(actions.contains(&BetAction::Fold));
        assert!(!actions.contains(&BetAction::Check));
    }

    #[test]
    fn commits_are_capped_by_stack() {
        let (mut state, _) = poker_table(8);
        state.seats[0].chips = 3;
        state.current_player = 0;
        commit(&mut state, 0, 100);
        assert!(state.seats[0].chips == 0);
        assert!(state.seats[0].is_all_in);
        assert!(state.pot == 3);
    }

    #[test]
    fn fold_win_takes_pot_and_hand() {
        let (mut state, genome) = poker_table(8);
        state.pot = 30;
        state.seats[1].has_folded = true;
        let mut metrics = GameMetrics::default();
        resolve(&mut state, &genome, 1, &mut metrics);
        assert!(metrics.fold_wins == 1);
        assert!(state.seats[0].chips == 130);
        assert!(state.seats[0].score == 30);
        assert!(state.winner_id == 0);
    }

    #[test]
    fn a_full_round_settles_the_pot() {
        use crate::players::AgentKind;
        use crate::players::Agents;
        let (mut state, genome) = poker_table(14);
        let bp = match genome.phases()[1] {
            crate::genome::Phase::Betting(ref b) => b.clone(),
            _ => unreachable!(),
        };
        let chips_before: crate::Chips = state.seats.iter().map(|s| s.chips).sum();
        let mut agents = Agents::shared(AgentKind::Random.build());
        let mut rng = SmallRng::seed_from_u64(14);
        let mut metrics = GameMetrics::default();
        let opening = Move::bet(1, BetAction::Bet);
        run_round(&mut state, &genome, 1, &bp, &mut agents, &mut rng, &mut metrics, opening);
        assert!(state.betting_done[1]);
        assert!(state.betting_complete);
        // the pot is gone: folded away or pushed to the showdown winner
        assert!(state.pot == 0);
        assert!(state.current_bet == 0);
        let chips_after: crate::Chips = state.seats.iter().map(|s| s.chips).sum();
        assert!(chips_after == chips_before);
        assert!(metrics.fold_wins + metrics.showdowns == 1);
        // a simple-poker round always crowns the hand
        assert!(state.winner_id >= 0);
    }

    #[test]
    fn strength_estimates() {
        use crate::cards::card::Card;
        use crate::cards::rank::Rank;
        use crate::cards::suit::Suit;
        let aces = vec![
            Card::new(Rank::Ace, Suit::Hearts),
            Card::new(Rank::Ace, Suit::Spades),
        ];
        let junk = vec![
            Card::new(Rank::Two, Suit::Hearts),
            Card::new(Rank::Seven, Suit::Clubs),
        ];
        assert!(hand_strength(&aces) == 1.0);
        assert!(hand_strength(&junk) < BLUFF_THRESHOLD + 0.2);
        assert!(hand_strength(&[]) == 0.0);
    }
}
