//! legal move generation. walks the genome's phases in declared order,
//! starting from the actor's phase cursor, and emits every candidate
//! move the current player could take right now. the agent picks one;
//! the applier advances the cursor so a turn flows through the phase
//! list front to back.

use super::betting;
use super::moves::Move;
use crate::cards::card::Card;
use crate::cards::location::Location;
use crate::genome::Condition;
use crate::genome::DiscardPhase;
use crate::genome::DrawPhase;
use crate::genome::Genome;
use crate::genome::Phase;
use crate::genome::PlayPhase;
use crate::genome::Predicate;
use crate::genome::SequenceDirection;
use crate::genome::TableauMode;
use crate::genome::TrickPhase;
use crate::state::GameState;

pub fn legal_moves(state: &GameState, genome: &Genome) -> Vec<Move> {
    let mut moves = Vec::new();
    if state.is_over() {
        return moves;
    }
    let bidding_open = genome.has_bidding() && !state.bidding_complete;
    for (pi, phase) in genome
        .phases()
        .iter()
        .enumerate()
        .skip(state.phase_cursor)
    {
        match phase {
            Phase::Bidding(b) => {
                if bidding_open && state.actor().current_bid < 0 {
                    for v in b.min_bid..=b.max_bid {
                        moves.push(Move::bid(pi, v, false));
                    }
                    if b.allow_nil {
                        moves.push(Move::bid(pi, 0, true));
                    }
                }
            }
            // card play waits until every seat has a contract
            _ if bidding_open => continue,
            Phase::Draw(d) => draw_moves(state, pi, d, &mut moves),
            Phase::Play(p) => play_moves(state, genome, pi, p, &mut moves),
            Phase::Discard(d) => discard_moves(state, pi, d, &mut moves),
            Phase::Trick(t) => trick_moves(state, pi, t, &mut moves),
            Phase::Betting(b) => {
                if !state.betting_done.get(pi).copied().unwrap_or(false) {
                    betting::betting_moves(state, pi, b, &mut moves);
                }
            }
            Phase::Claim(_) => claim_moves(state, pi, &mut moves),
        }
    }
    moves
}

fn draw_moves(state: &GameState, pi: usize, d: &DrawPhase, out: &mut Vec<Move>) {
    let seat = state.actor();
    if seat.has_stood {
        return;
    }
    if let Some(ref cond) = d.condition {
        if !gate(cond, state, state.current_player) {
            return;
        }
    }
    if source_available(state, d.source) {
        out.push(Move::draw(pi, d.source));
    }
    if !d.mandatory && !out.is_empty() && out.last().map(|m| m.is_draw()).unwrap_or(false) {
        out.push(Move::draw_pass(pi));
    }
}

fn source_available(state: &GameState, source: Location) -> bool {
    match source {
        Location::Deck => !state.deck.is_empty() || state.discard.len() >= 2,
        Location::Discard => !state.discard.is_empty(),
        Location::Tableau => state.tableau.iter().any(|p| !p.is_empty()),
        Location::OpponentHand => steal_target(state, state.current_player).is_some(),
        Location::Captured => !state.actor().captured.is_empty(),
        Location::Hand => false,
    }
}

/// the next seat along the play direction still holding cards;
/// the victim of opponent-hand draws and steals
pub fn steal_target(state: &GameState, player: usize) -> Option<usize> {
    let n = state.num_players();
    (1..n)
        .map(|step| {
            (player as i64 + state.direction as i64 * step as i64).rem_euclid(n as i64) as usize
        })
        .find(|&p| !state.seats[p].hand.is_empty())
}

fn play_moves(state: &GameState, genome: &Genome, pi: usize, p: &PlayPhase, out: &mut Vec<Move>) {
    let seat = state.actor();
    let before = out.len();
    let gated = match p.valid_play_condition {
        Some(ref cond) if is_gate(cond.op) => !gate(cond, state, state.current_player),
        _ => false,
    };
    if !gated && !seat.hand.is_empty() {
        let sequencing =
            state.tableau_mode == TableauMode::Sequence && p.target == Location::Tableau;
        // war is flipped, not chosen: the only legal play is the top of
        // the (shuffled) hand, so no policy can outplay another here
        if state.tableau_mode == TableauMode::War && p.target == Location::Tableau {
            out.push(Move::play(pi, seat.hand.len() - 1, p.target));
            return;
        }
        if p.min_cards <= 1 {
            for (i, card) in seat.hand.iter().enumerate() {
                if sequencing && !sequence_placement(state, card) {
                    continue;
                }
                if let Some(ref cond) = p.valid_play_condition {
                    if !is_gate(cond.op) && !card_ok(cond, state, state.current_player, card) {
                        continue;
                    }
                }
                out.push(Move::play(pi, i, p.target));
            }
        }
        if p.max_cards >= 2 && !sequencing {
            group_moves(state, pi, p, out);
        }
    }
    let none_legal = out.len() == before;
    if (none_legal && p.pass_if_unable) || !p.mandatory {
        out.push(Move::play_pass(pi));
    }
}

/// multi-card plays are same-rank groups with size inside the phase bounds
fn group_moves(state: &GameState, pi: usize, p: &PlayPhase, out: &mut Vec<Move>) {
    let seat = state.actor();
    let lo = p.min_cards.max(2);
    let hi = p.max_cards.min(4);
    for rank in 0..13u8 {
        let held = seat.rank_count(rank);
        if held < lo {
            continue;
        }
        if let Some(ref cond) = p.valid_play_condition {
            if !is_gate(cond.op) {
                let sample = seat
                    .hand
                    .iter()
                    .find(|c| c.rank() as u8 == rank)
                    .expect("rank counted in hand");
                if !card_ok(cond, state, state.current_player, sample) {
                    continue;
                }
            }
        }
        for size in lo..=held.min(hi) {
            out.push(Move::group(pi, rank, size, p.target));
        }
    }
}

fn discard_moves(state: &GameState, pi: usize, d: &DiscardPhase, out: &mut Vec<Move>) {
    let seat = state.actor();
    if seat.hand.is_empty() {
        if !d.mandatory {
            out.push(Move::play_pass(pi));
        }
        return;
    }
    for i in 0..seat.hand.len() {
        out.push(Move::play(pi, i, d.target));
    }
    if !d.mandatory {
        out.push(Move::play_pass(pi));
    }
}

fn trick_moves(state: &GameState, pi: usize, t: &TrickPhase, out: &mut Vec<Move>) {
    let seat = state.actor();
    if seat.hand.is_empty() {
        return;
    }
    if state.current_trick.is_empty() {
        // leading: the breaking suit stays in the barn until broken,
        // unless it is all the leader holds
        let breaking = t.breaking_suit;
        let mono = seat
            .hand
            .iter()
            .all(|c| breaking != crate::cards::ANY && c.suit() as u8 == breaking);
        for (i, card) in seat.hand.iter().enumerate() {
            let barred = breaking != crate::cards::ANY
                && card.suit() as u8 == breaking
                && !state.suit_broken
                && !mono;
            if !barred {
                out.push(Move::play(pi, i, Location::Tableau));
            }
        }
    } else {
        let lead = state.current_trick[0].1.suit();
        let holds_lead = seat.hand.iter().any(|c| c.suit() == lead);
        for (i, card) in seat.hand.iter().enumerate() {
            if !t.lead_suit_required || !holds_lead || card.suit() == lead {
                out.push(Move::play(pi, i, Location::Tableau));
            }
        }
    }
}

fn claim_moves(state: &GameState, pi: usize, out: &mut Vec<Move>) {
    match state.claim {
        None => {
            for i in 0..state.actor().hand.len() {
                out.push(Move::play(pi, i, Location::Discard));
            }
        }
        Some(claim) => {
            if claim.claimer != state.current_player {
                out.push(Move::challenge(pi));
                out.push(Move::pass(pi));
            }
        }
    }
}

/// can this card legally land on the sequence tableau right now
pub fn sequence_placement(state: &GameState, card: &Card) -> bool {
    let empty_slot = state.tableau.iter().any(|p| p.is_empty());
    let all_empty = state.tableau.iter().all(|p| p.is_empty());
    if all_empty {
        return !state.tableau.is_empty();
    }
    let extends = state
        .tableau
        .iter()
        .any(|pile| extends_pile(card, pile, state.sequence_direction));
    extends || empty_slot
}

pub fn extends_pile(card: &Card, pile: &[Card], dir: SequenceDirection) -> bool {
    let Some(top) = pile.last() else {
        return false;
    };
    if card.suit() != top.suit() {
        return false;
    }
    let up = card.rank() as i32 == top.rank() as i32 + 1;
    let down = card.rank() as i32 == top.rank() as i32 - 1;
    match dir {
        SequenceDirection::Ascending => up,
        SequenceDirection::Descending => down,
        SequenceDirection::Both => up || down,
    }
}

/// state-level predicates gate a whole phase; card-level ones filter
/// individual candidates
pub fn is_gate(op: Predicate) -> bool {
    matches!(op, Predicate::HandSize | Predicate::LocSize)
}

pub fn gate(cond: &Condition, state: &GameState, player: usize) -> bool {
    let lhs = match cond.op {
        Predicate::HandSize => state.seats[player].hand.len() as i64,
        Predicate::LocSize => {
            loc_size(state, player, cond.reference.unwrap_or(Location::Discard)) as i64
        }
        // card predicates in gate position look at the reference top
        _ => {
            let loc = cond.reference.unwrap_or(Location::Discard);
            return match top_of(state, player, loc) {
                Some(card) => card_ok(cond, state, player, &card),
                None => false,
            };
        }
    };
    cond.cmp.compare(lhs, cond.value as i64)
}

pub fn card_ok(cond: &Condition, state: &GameState, player: usize, card: &Card) -> bool {
    let loc = cond.reference.unwrap_or(Location::Discard);
    let lhs: i64 = match cond.op {
        Predicate::CardRank => card.rank() as i64,
        Predicate::CardSuit => card.suit() as i64,
        Predicate::MatchRank => match top_of(state, player, loc) {
            Some(top) => (top.rank() == card.rank()) as i64,
            None => 1, // nothing to match against, anything goes
        },
        Predicate::MatchSuit => match top_of(state, player, loc) {
            Some(top) => (top.suit() == card.suit()) as i64,
            None => 1,
        },
        Predicate::BeatsTop => match top_of(state, player, loc) {
            Some(top) => (card.rank() > top.rank()) as i64,
            None => 1,
        },
        Predicate::Sequence => state
            .tableau
            .iter()
            .any(|pile| extends_pile(card, pile, state.sequence_direction))
            as i64,
        Predicate::HandSize => state.seats[player].hand.len() as i64,
        Predicate::LocSize => loc_size(state, player, loc) as i64,
    };
    cond.cmp.compare(lhs, cond.value as i64)
}

pub fn loc_size(state: &GameState, player: usize, loc: Location) -> usize {
    match loc {
        Location::Deck => state.deck.len(),
        Location::Hand => state.seats[player].hand.len(),
        Location::Discard => state.discard.len(),
        Location::Tableau => state.tableau.iter().map(|p| p.len()).sum(),
        Location::OpponentHand => steal_target(state, player)
            .map(|p| state.seats[p].hand.len())
            .unwrap_or(0),
        Location::Captured => state.seats[player].captured.len(),
    }
}

fn top_of(state: &GameState, player: usize, loc: Location) -> Option<Card> {
    match loc {
        Location::Discard => state.discard.last().copied(),
        Location::Deck => state.deck.cards().last().copied(),
        Location::Tableau => state
            .tableau
            .iter()
            .rev()
            .find_map(|pile| pile.last())
            .copied(),
        Location::Hand => state.seats[player].hand.last().copied(),
        Location::OpponentHand => steal_target(state, player)
            .and_then(|p| state.seats[p].hand.last())
            .copied(),
        Location::Captured => state.seats[player].captured.last().copied(),
    }
}
