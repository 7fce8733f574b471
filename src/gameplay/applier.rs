//! the single mutation entry point for non-betting moves. everything
//! the rules can do to a state funnels through `apply`, which dispatches
//! on the phase the move names, then settles turn flow: cursor advance,
//! rotation, trick and war resolution, melds, effects, and hand ends.

use super::contracts;
use super::generator;
use super::moves;
use super::moves::Move;
use crate::cards::card::Card;
use crate::cards::location::Location;
use crate::genome::DiscardPhase;
use crate::genome::DrawPhase;
use crate::genome::EffectKind;
use crate::genome::EffectRule;
use crate::genome::Genome;
use crate::genome::Phase;
use crate::genome::ScoreTrigger;
use crate::genome::TableauMode;
use crate::genome::TargetSelect;
use crate::genome::TrickPhase;
use crate::simulation::metrics::GameMetrics;
use crate::state::Claim;
use crate::state::GameState;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::Rng;

/// how a move leaves the turn
enum Flow {
    /// stay on this player, cursor moved forward
    Continue,
    /// rotate to the next player
    EndTurn,
    /// turn over, but the current player was already repositioned
    /// (trick and war winners lead the next round)
    EndTurnInPlace,
}

pub fn apply(
    state: &mut GameState,
    genome: &Genome,
    mv: Move,
    rng: &mut SmallRng,
    metrics: &mut GameMetrics,
) {
    let flow = match genome.phases().get(mv.phase) {
        Some(Phase::Draw(d)) => apply_draw(state, genome, mv, d, rng, metrics),
        Some(Phase::Play(_)) => apply_play(state, genome, mv, rng, metrics),
        Some(Phase::Discard(d)) => apply_discard(state, mv, d),
        Some(Phase::Trick(t)) => apply_trick(state, genome, mv, t),
        Some(Phase::Claim(_)) => apply_claim(state, genome, mv, metrics),
        Some(Phase::Bidding(_)) => apply_bid(state, genome, mv),
        Some(Phase::Betting(_)) => Flow::EndTurn, // rounds run through the driver
        None => Flow::EndTurn,
    };
    war_recycle(state, rng);
    let flow = match flow {
        // a turn with nothing left to do ends itself
        Flow::Continue if generator::legal_moves(state, genome).is_empty() => Flow::EndTurn,
        other => other,
    };
    match flow {
        Flow::Continue => (),
        Flow::EndTurn => {
            state.phase_cursor = 0;
            state.phase_progress = 0;
            state.turn_number += 1;
            state.advance_player();
        }
        Flow::EndTurnInPlace => {
            state.phase_cursor = 0;
            state.phase_progress = 0;
            state.turn_number += 1;
        }
    }
    hand_end(state, genome, rng);
}

fn apply_draw(
    state: &mut GameState,
    genome: &Genome,
    mv: Move,
    d: &DrawPhase,
    rng: &mut SmallRng,
    metrics: &mut GameMetrics,
) -> Flow {
    state.phase_cursor = mv.phase + 1;
    if mv.card == moves::DRAW_PASS {
        state.seats[state.current_player].has_stood = true;
        return Flow::EndTurn;
    }
    let player = state.current_player;
    for _ in 0..d.count {
        let Some(card) = take_from(state, d.source, rng, metrics) else {
            break;
        };
        state.seats[player].hand.push(card);
    }
    meld_sets(state, genome, player);
    Flow::Continue
}

/// pop one card from a draw source for the current player
fn take_from(
    state: &mut GameState,
    source: Location,
    rng: &mut SmallRng,
    metrics: &mut GameMetrics,
) -> Option<Card> {
    match source {
        Location::Deck => {
            state.deck.refill(&mut state.discard, rng);
            state.deck.draw()
        }
        Location::Discard => state.discard.pop(),
        Location::Tableau => state
            .tableau
            .iter_mut()
            .rev()
            .find(|p| !p.is_empty())
            .and_then(|p| p.pop()),
        Location::OpponentHand => {
            let victim = generator::steal_target(state, state.current_player)?;
            metrics.disruptions += 1;
            state.seats[victim].hand.pop()
        }
        Location::Captured => state.seats[state.current_player].captured.pop(),
        Location::Hand => None,
    }
}

fn apply_play(
    state: &mut GameState,
    genome: &Genome,
    mv: Move,
    rng: &mut SmallRng,
    metrics: &mut GameMetrics,
) -> Flow {
    state.phase_cursor = mv.phase + 1;
    if mv.card == moves::PLAY_PASS {
        return Flow::Continue;
    }
    let player = state.current_player;
    let cards = lift_cards(state, mv);
    if cards.is_empty() {
        return Flow::Continue;
    }
    score_trigger(state, genome, ScoreTrigger::Play, player, &cards);
    let mut flow = Flow::Continue;
    match (state.tableau_mode, mv.target) {
        (TableauMode::War, Location::Tableau) => {
            for card in cards {
                state.current_trick.push((player, card));
            }
            if let Some(winner) = war_round(state) {
                capture_trick(state, genome, winner);
                state.current_player = winner;
                metrics.disruptions += 1;
                return Flow::EndTurnInPlace;
            }
            flow = Flow::EndTurn;
        }
        (TableauMode::MatchRank, Location::Tableau) => {
            for card in cards {
                match_rank_place(state, genome, player, card, metrics);
            }
        }
        (TableauMode::Sequence, Location::Tableau) => {
            for card in cards {
                sequence_place(state, card);
            }
        }
        (_, Location::Discard) => {
            let effect_rank = cards[0].rank() as u8;
            for card in cards {
                state.discard.push(card);
            }
            apply_effects(state, genome, effect_rank, rng, metrics);
        }
        (_, Location::Captured) => {
            state.seats[player].captured.extend(cards);
        }
        _ => {
            // anything else lands on the shared discard
            for card in cards {
                state.discard.push(card);
            }
        }
    }
    flow
}

/// remove the played card(s) from the actor's hand
fn lift_cards(state: &mut GameState, mv: Move) -> Vec<Card> {
    let seat = &mut state.seats[state.current_player];
    if let Some(index) = mv.hand_index() {
        if index < seat.hand.len() {
            return vec![seat.hand.remove(index)];
        }
        return Vec::new();
    }
    if let Some((rank, size)) = mv.rank_group() {
        let mut out = Vec::with_capacity(size);
        let mut i = 0;
        while i < seat.hand.len() && out.len() < size {
            if seat.hand[i].rank() as u8 == rank {
                out.push(seat.hand.remove(i));
            } else {
                i += 1;
            }
        }
        return out;
    }
    Vec::new()
}

/// one war battle round is complete when every contender has matched the
/// round's contribution count. the highest last-round card takes the
/// pile; a tie keeps the battle going, and a tie that nobody can feed
/// falls to the earliest tied seat.
fn war_round(state: &GameState) -> Option<usize> {
    let contenders: Vec<usize> = (0..state.num_players())
        .filter(|&p| {
            !state.seats[p].hand.is_empty()
                || !state.seats[p].captured.is_empty()
                || state.current_trick.iter().any(|(q, _)| *q == p)
        })
        .collect();
    let n = contenders.len().max(1);
    if state.current_trick.len() < n || state.current_trick.len() % n != 0 {
        return None;
    }
    let round = &state.current_trick[state.current_trick.len() - n..];
    let top = round.iter().map(|(_, c)| c.rank()).max()?;
    let tied: Vec<usize> = round
        .iter()
        .filter(|(_, c)| c.rank() == top)
        .map(|(p, _)| *p)
        .collect();
    if tied.len() == 1 {
        return Some(tied[0]);
    }
    let can_feed = tied
        .iter()
        .any(|&p| !state.seats[p].hand.is_empty() || !state.seats[p].captured.is_empty());
    match can_feed {
        true => None, // battle continues
        false => tied.into_iter().min(),
    }
}

/// winner scoops the battle pile (or trick) into their captured cards
fn capture_trick(state: &mut GameState, genome: &Genome, winner: usize) {
    let cards: Vec<Card> = state.current_trick.drain(..).map(|(_, c)| c).collect();
    score_trigger(state, genome, ScoreTrigger::Capture, winner, &cards);
    state.seats[winner].captured.extend(cards);
}

fn match_rank_place(
    state: &mut GameState,
    genome: &Genome,
    player: usize,
    card: Card,
    metrics: &mut GameMetrics,
) {
    let captured_pile = state
        .tableau
        .iter()
        .position(|pile| pile.last().map(|c| c.rank() == card.rank()).unwrap_or(false));
    match captured_pile {
        Some(i) => {
            let mut cards: Vec<Card> = state.tableau[i].drain(..).collect();
            cards.push(card);
            score_trigger(state, genome, ScoreTrigger::Capture, player, &cards);
            state.seats[player].captured.extend(cards);
            metrics.disruptions += 1;
        }
        None => place_on_tableau(state, card),
    }
}

fn sequence_place(state: &mut GameState, card: Card) {
    let extends = state
        .tableau
        .iter()
        .position(|pile| generator::extends_pile(&card, pile, state.sequence_direction));
    match extends {
        Some(i) => state.tableau[i].push(card),
        None => place_on_tableau(state, card),
    }
}

fn place_on_tableau(state: &mut GameState, card: Card) {
    match state.tableau.iter().position(|p| p.is_empty()) {
        Some(i) => state.tableau[i].push(card),
        None => match state.tableau.iter_mut().min_by_key(|p| p.len()) {
            Some(pile) => pile.push(card),
            None => state.discard.push(card), // no tableau at all
        },
    }
}

fn apply_discard(state: &mut GameState, mv: Move, d: &DiscardPhase) -> Flow {
    if mv.card == moves::PLAY_PASS {
        state.phase_cursor = mv.phase + 1;
        state.phase_progress = 0;
        return Flow::Continue;
    }
    let cards = lift_cards(state, mv);
    for card in cards {
        match d.target {
            Location::Tableau => place_on_tableau(state, card),
            _ => state.discard.push(card),
        }
    }
    state.phase_progress += 1;
    if state.phase_progress >= d.count {
        state.phase_cursor = mv.phase + 1;
        state.phase_progress = 0;
    } else {
        // more cards owed to this phase
        state.phase_cursor = mv.phase;
    }
    Flow::Continue
}

fn apply_trick(state: &mut GameState, genome: &Genome, mv: Move, t: &TrickPhase) -> Flow {
    let player = state.current_player;
    let cards = lift_cards(state, mv);
    let Some(card) = cards.into_iter().next() else {
        return Flow::EndTurn;
    };
    if t.breaking_suit != crate::cards::ANY && card.suit() as u8 == t.breaking_suit {
        state.suit_broken = true;
    }
    state.current_trick.push((player, card));
    let waiting = (0..state.num_players())
        .filter(|&p| !state.seats[p].hand.is_empty())
        .filter(|&p| state.current_trick.iter().all(|(q, _)| *q != p))
        .count();
    if waiting > 0 {
        return Flow::EndTurn;
    }
    let winner = trick_winner(&state.current_trick, t);
    state.seats[winner].tricks_won += 1;
    let cards: Vec<Card> = state.current_trick.iter().map(|(_, c)| *c).collect();
    score_trigger(state, genome, ScoreTrigger::TrickWin, winner, &cards);
    capture_trick(state, genome, winner);
    state.current_player = winner;
    Flow::EndTurnInPlace
}

/// trump beats lead; within the deciding suit the phase says whether
/// high or low takes it
pub fn trick_winner(trick: &[(usize, Card)], t: &TrickPhase) -> usize {
    let lead = trick[0].1.suit();
    let trumped = t.trump_suit != crate::cards::ANY
        && trick.iter().any(|(_, c)| c.suit() as u8 == t.trump_suit);
    let deciding = |c: &Card| {
        if trumped {
            c.suit() as u8 == t.trump_suit
        } else {
            c.suit() == lead
        }
    };
    let candidates = trick.iter().filter(|(_, c)| deciding(c));
    let best = match t.high_card_wins {
        true => candidates.max_by_key(|(_, c)| c.rank()),
        false => candidates.min_by_key(|(_, c)| c.rank()),
    };
    best.map(|(p, _)| *p).expect("lead card always decides")
}

fn apply_claim(
    state: &mut GameState,
    genome: &Genome,
    mv: Move,
    metrics: &mut GameMetrics,
) -> Flow {
    let player = state.current_player;
    match mv.card {
        moves::CHALLENGE => {
            metrics.disruptions += 1;
            let Some(claim) = state.claim.take() else {
                return Flow::EndTurn;
            };
            let truthful = state
                .discard
                .last()
                .map(|c| c.rank() as u8 == claim.rank)
                .unwrap_or(false);
            let loser = if truthful { player } else { claim.claimer };
            let pile: Vec<Card> = state.discard.drain(..).collect();
            state.seats[loser].hand.extend(pile);
            meld_sets(state, genome, loser);
            Flow::EndTurn
        }
        moves::PASS => {
            state.claim = None;
            Flow::EndTurn
        }
        _ => {
            let cards = lift_cards(state, mv);
            let Some(card) = cards.into_iter().next() else {
                return Flow::EndTurn;
            };
            // the announced rank is whatever the claimer holds most of;
            // placing a card of any other rank is the lie
            let announced = (0..13u8)
                .max_by_key(|&r| state.seats[player].rank_count(r))
                .unwrap_or(card.rank() as u8);
            let announced = match state.seats[player].rank_count(announced) {
                0 => card.rank() as u8,
                _ => announced,
            };
            state.discard.push(card);
            state.claim = Some(Claim {
                claimer: player,
                rank: announced,
            });
            Flow::EndTurn
        }
    }
}

fn apply_bid(state: &mut GameState, genome: &Genome, mv: Move) -> Flow {
    let Some((value, nil)) = mv.bid_value() else {
        return Flow::EndTurn;
    };
    let seat = &mut state.seats[state.current_player];
    seat.current_bid = value;
    seat.is_nil_bid = nil;
    if state.seats.iter().all(|s| s.current_bid >= 0) {
        state.bidding_complete = true;
        contracts::record(state, genome);
    }
    Flow::EndTurn
}

/// apply special effects attached to the rank just played to the discard
fn apply_effects(
    state: &mut GameState,
    genome: &Genome,
    rank: u8,
    rng: &mut SmallRng,
    metrics: &mut GameMetrics,
) {
    let rules: Vec<EffectRule> = genome
        .effects
        .iter()
        .filter(|e| e.trigger_rank == rank)
        .cloned()
        .collect();
    for rule in rules {
        metrics.disruptions += 1;
        let targets = resolve_targets(state, rule.target, rng);
        match rule.effect {
            EffectKind::SkipNext | EffectKind::BlockNext => {
                for t in targets {
                    state.seats[t].blocked = true;
                }
            }
            EffectKind::Reverse => state.direction = -state.direction,
            EffectKind::DrawTwo | EffectKind::DrawFour => {
                let count = match rule.effect {
                    EffectKind::DrawFour => 4,
                    _ => rule.value.max(2) as usize,
                };
                for t in targets {
                    for _ in 0..count {
                        state.deck.refill(&mut state.discard, rng);
                        match state.deck.draw() {
                            Some(card) => state.seats[t].hand.push(card),
                            None => break,
                        }
                    }
                }
            }
            EffectKind::SwapHands => {
                if let Some(&t) = targets.first() {
                    let actor = state.current_player;
                    if t != actor {
                        let mine = std::mem::take(&mut state.seats[actor].hand);
                        let theirs = std::mem::replace(&mut state.seats[t].hand, mine);
                        state.seats[actor].hand = theirs;
                    }
                }
            }
            EffectKind::StealCard => {
                let actor = state.current_player;
                for t in targets {
                    if let Some(card) = state.seats[t].hand.pop() {
                        state.seats[actor].hand.push(card);
                    }
                }
            }
            EffectKind::DiscardPile => {
                if let Some(&t) = targets.first() {
                    let pile: Vec<Card> = state.discard.drain(..).collect();
                    state.seats[t].hand.extend(pile);
                }
            }
            // suit choice needs player input the simulation does not
            // model, so wild cards carry no mechanical payload
            EffectKind::Wild => (),
            EffectKind::PeekHand => (),
        }
    }
}

fn resolve_targets(state: &GameState, select: TargetSelect, rng: &mut SmallRng) -> Vec<usize> {
    let n = state.num_players();
    let me = state.current_player;
    let step = state.direction as i64;
    match select {
        TargetSelect::Actor => vec![me],
        TargetSelect::NextPlayer => vec![(me as i64 + step).rem_euclid(n as i64) as usize],
        TargetSelect::PreviousPlayer => vec![(me as i64 - step).rem_euclid(n as i64) as usize],
        TargetSelect::AllOpponents => (0..n).filter(|&p| p != me).collect(),
        TargetSelect::RandomOpponent => {
            let others: Vec<usize> = (0..n).filter(|&p| p != me).collect();
            match others.is_empty() {
                true => Vec::new(),
                false => vec![others[rng.random_range(0..others.len())]],
            }
        }
    }
}

/// award points to `player` for every rule matching the trigger and cards
fn score_trigger(
    state: &mut GameState,
    genome: &Genome,
    trigger: ScoreTrigger,
    player: usize,
    cards: &[Card],
) {
    for rule in genome.card_scoring.iter().filter(|r| r.trigger == trigger) {
        let hits = cards.iter().filter(|c| rule.matches(c)).count();
        state.seats[player].score += rule.points * hits as crate::Points;
    }
}

/// hand-end scoring for cards still held, applied by the runner when a
/// game terminates with cards in hand
pub fn hand_end_scoring(state: &mut GameState, genome: &Genome) {
    for player in 0..state.num_players() {
        let cards = state.seats[player].hand.clone();
        score_trigger(state, genome, ScoreTrigger::HandEnd, player, &cards);
    }
}

/// melds: three or more of a rank auto-complete into the captured pile,
/// scoring any set-completion rules
fn meld_sets(state: &mut GameState, genome: &Genome, player: usize) {
    if !genome
        .card_scoring
        .iter()
        .any(|r| r.trigger == ScoreTrigger::SetComplete)
    {
        return;
    }
    for rank in 0..13u8 {
        if state.seats[player].rank_count(rank) >= 3 {
            let mut melded = Vec::new();
            let seat = &mut state.seats[player];
            let mut i = 0;
            while i < seat.hand.len() {
                if seat.hand[i].rank() as u8 == rank {
                    melded.push(seat.hand.remove(i));
                } else {
                    i += 1;
                }
            }
            score_trigger(state, genome, ScoreTrigger::SetComplete, player, &melded);
            state.seats[player].captured.extend(melded);
        }
    }
}

/// in war games an emptied hand flips its winnings back in
fn war_recycle(state: &mut GameState, rng: &mut SmallRng) {
    if state.tableau_mode != TableauMode::War {
        return;
    }
    for seat in state.seats.iter_mut() {
        if seat.hand.is_empty() && !seat.captured.is_empty() {
            seat.hand.append(&mut seat.captured);
            seat.hand.shuffle(rng);
        }
    }
}

/// when every hand is empty, bidding games settle contracts and re-deal
fn hand_end(state: &mut GameState, genome: &Genome, rng: &mut SmallRng) {
    if !genome.has_bidding() || state.is_over() {
        return;
    }
    if state.seats.iter().any(|s| !s.hand.is_empty()) {
        return;
    }
    if let Some(bp) = genome.bidding() {
        contracts::evaluate(state, genome, bp);
    }
    // the win check runs before the next move; if nobody crossed the
    // threshold the table re-deals and bids again
    if super::wincheck::check_win(state, genome).is_none() {
        state.reset_hand(genome, rng);
        state.bidding_complete = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::rank::Rank;
    use crate::cards::suit::Suit;
    use crate::genome::seeds;
    use rand::SeedableRng;

    fn fixture(genome: &Genome, seed: u64) -> (GameState, SmallRng, GameMetrics) {
        let mut rng = SmallRng::seed_from_u64(seed);
        let mut state = GameState::default();
        state.deal(genome, &mut rng);
        (state, rng, GameMetrics::default())
    }

    #[test]
    fn cards_are_conserved_through_play() {
        let genome = seeds::crazy_eights();
        let (mut state, mut rng, mut metrics) = fixture(&genome, 21);
        let census = state.census();
        for _ in 0..200 {
            if state.is_over() {
                break;
            }
            let moves = generator::legal_moves(&state, &genome);
            let Some(&mv) = moves.first() else { break };
            apply(&mut state, &genome, mv, &mut rng, &mut metrics);
            assert!(state.census() == census);
        }
    }

    #[test]
    fn hearts_conserves_cards_to_the_end() {
        let genome = seeds::hearts();
        let (mut state, mut rng, mut metrics) = fixture(&genome, 54321);
        let census = state.census();
        for _ in 0..400 {
            if state.is_over() {
                break;
            }
            if let Some(winner) = super::super::wincheck::check_win(&state, &genome) {
                super::super::wincheck::declare(&mut state, &genome, winner);
                break;
            }
            let moves = generator::legal_moves(&state, &genome);
            let Some(&mv) = moves.first() else { break };
            apply(&mut state, &genome, mv, &mut rng, &mut metrics);
            assert!(state.census() == census);
        }
        assert!(state.census() == census);
    }

    #[test]
    fn trick_winner_follows_trump_and_lead() {
        let t = TrickPhase {
            lead_suit_required: true,
            trump_suit: Suit::Spades as u8,
            high_card_wins: true,
            breaking_suit: crate::cards::ANY,
        };
        let trick = vec![
            (0, Card::new(Rank::Ace, Suit::Hearts)),
            (1, Card::new(Rank::Two, Suit::Spades)),
            (2, Card::new(Rank::King, Suit::Hearts)),
        ];
        assert!(trick_winner(&trick, &t) == 1);
        let no_trump = TrickPhase {
            trump_suit: crate::cards::ANY,
            ..t
        };
        assert!(trick_winner(&trick, &no_trump) == 0);
        let low_wins = TrickPhase {
            high_card_wins: false,
            trump_suit: crate::cards::ANY,
            ..t
        };
        assert!(trick_winner(&trick, &low_wins) == 2);
    }

    #[test]
    fn war_round_ties_continue_the_battle() {
        let genome = seeds::war();
        let (mut state, _, _) = fixture(&genome, 4);
        state.current_trick.push((0, Card::new(Rank::Nine, Suit::Hearts)));
        state.current_trick.push((1, Card::new(Rank::Nine, Suit::Clubs)));
        // both players still hold cards, so the tie stands unresolved
        assert!(war_round(&state).is_none());
        state.current_trick.push((0, Card::new(Rank::Four, Suit::Hearts)));
        state.current_trick.push((1, Card::new(Rank::Jack, Suit::Clubs)));
        assert!(war_round(&state) == Some(1));
    }

    #[test]
    fn reverse_flips_direction() {
        let genome = seeds::uno_style();
        let (mut state, mut rng, mut metrics) = fixture(&genome, 6);
        assert!(state.direction == 1);
        apply_effects(&mut state, &genome, Rank::Queen as u8, &mut rng, &mut metrics);
        assert!(state.direction == -1);
        assert!(metrics.disruptions == 1);
    }

    #[test]
    fn draw_two_feeds_the_victim() {
        let genome = seeds::uno_style();
        let (mut state, mut rng, mut metrics) = fixture(&genome, 6);
        let victim = 1;
        let before = state.seats[victim].hand.len();
        state.current_player = 0;
        apply_effects(&mut state, &genome, Rank::Two as u8, &mut rng, &mut metrics);
        assert!(state.seats[victim].hand.len() == before + 2);
    }

    #[test]
    fn challenge_punishes_the_liar() {
        let genome = seeds::cheat();
        let (mut state, mut rng, mut metrics) = fixture(&genome, 12);
        let claimer = state.current_player;
        // force a lie: claim rank is the most-held rank but the placed
        // card is chosen to differ from it
        let most = (0..13u8)
            .max_by_key(|&r| state.seats[claimer].rank_count(r))
            .expect("dealt hand");
        let lie = state.seats[claimer]
            .hand
            .iter()
            .position(|c| c.rank() as u8 != most)
            .expect("hand has more than one rank");
        let mv = Move::play(0, lie, crate::cards::location::Location::Discard);
        apply(&mut state, &genome, mv, &mut rng, &mut metrics);
        assert!(state.claim.is_some());
        let challenger = state.current_player;
        assert!(challenger != claimer);
        let claimer_hand = state.seats[claimer].hand.len();
        apply(
            &mut state,
            &genome,
            Move::challenge(0),
            &mut rng,
            &mut metrics,
        );
        assert!(state.claim.is_none());
        assert!(state.discard.is_empty());
        assert!(state.seats[claimer].hand.len() == claimer_hand + 1);
    }

    #[test]
    fn group_plays_lift_the_whole_set() {
        let genome = seeds::president();
        let (mut state, mut rng, mut metrics) = fixture(&genome, 40);
        let seat = &mut state.seats[state.current_player];
        seat.hand.clear();
        seat.hand.push(Card::new(Rank::Six, Suit::Hearts));
        seat.hand.push(Card::new(Rank::Nine, Suit::Clubs));
        seat.hand.push(Card::new(Rank::Six, Suit::Spades));
        let mv = Move::group(0, Rank::Six as u8, 2, Location::Discard);
        let player = state.current_player;
        apply(&mut state, &genome, mv, &mut rng, &mut metrics);
        assert!(state.seats[player].hand.len() == 1);
        assert!(state.seats[player].hand[0].rank() == Rank::Nine);
        assert!(state.discard.len() == 2);
    }

    #[test]
    fn discard_counts_hold_the_phase_open() {
        let genome = seeds::gin_rummy();
        let mut two_discards = genome.clone();
        if let crate::genome::Phase::Discard(ref mut d) = two_discards.turn_structure.phases[1] {
            d.count = 2;
        }
        let (mut state, mut rng, mut metrics) = fixture(&two_discards, 41);
        let player = state.current_player;
        let held = state.seats[player].hand.len();
        let mv = Move::play(1, 0, Location::Discard);
        apply(&mut state, &two_discards, mv, &mut rng, &mut metrics);
        // one discard down, the phase still owes one more
        assert!(state.current_player == player);
        assert!(state.phase_cursor == 1);
        let mv = Move::play(1, 0, Location::Discard);
        apply(&mut state, &two_discards, mv, &mut rng, &mut metrics);
        assert!(state.seats[player].hand.len() == held - 2);
        assert!(state.current_player != player);
    }

    #[test]
    fn swap_steal_and_pickup_effects() {
        let mut genome = seeds::crazy_eights();
        genome.effects = vec![
            crate::genome::EffectRule {
                trigger_rank: Rank::Three as u8,
                effect: EffectKind::SwapHands,
                target: TargetSelect::NextPlayer,
                value: 0,
            },
            crate::genome::EffectRule {
                trigger_rank: Rank::Four as u8,
                effect: EffectKind::StealCard,
                target: TargetSelect::NextPlayer,
                value: 1,
            },
            crate::genome::EffectRule {
                trigger_rank: Rank::Five as u8,
                effect: EffectKind::DiscardPile,
                target: TargetSelect::NextPlayer,
                value: 0,
            },
        ];
        let (mut state, mut rng, mut metrics) = fixture(&genome, 43);
        state.current_player = 0;
        let mine = state.seats[0].hand.clone();
        let theirs = state.seats[1].hand.clone();
        apply_effects(&mut state, &genome, Rank::Three as u8, &mut rng, &mut metrics);
        assert!(state.seats[0].hand == theirs);
        assert!(state.seats[1].hand == mine);
        let before = state.seats[0].hand.len();
        apply_effects(&mut state, &genome, Rank::Four as u8, &mut rng, &mut metrics);
        assert!(state.seats[0].hand.len() == before + 1);
        state.discard.push(Card::new(Rank::Ten, Suit::Hearts));
        state.discard.push(Card::new(Rank::Jack, Suit::Hearts));
        let victim = state.seats[1].hand.len();
        apply_effects(&mut state, &genome, Rank::Five as u8, &mut rng, &mut metrics);
        assert!(state.discard.is_empty());
        assert!(state.seats[1].hand.len() == victim + 2);
    }

    #[test]
    fn sequence_plays_extend_or_open_piles() {
        let genome = seeds::fan_tan();
        let (mut state, mut rng, mut metrics) = fixture(&genome, 44);
        let player = state.current_player;
        state.seats[player].hand.clear();
        state.seats[player].hand.push(Card::new(Rank::Seven, Suit::Hearts));
        state.seats[player].hand.push(Card::new(Rank::Eight, Suit::Hearts));
        let mv = Move::play(0, 0, Location::Tableau);
        apply(&mut state, &genome, mv, &mut rng, &mut metrics);
        assert!(state.tableau[0].len() == 1);
        state.current_player = player;
        let mv = Move::play(0, 0, Location::Tableau);
        apply(&mut state, &genome, mv, &mut rng, &mut metrics);
        // the eight lands on the seven, not a fresh pile
        assert!(state.tableau[0].len() == 2);
        assert!(state.tableau[1].is_empty());
    }

    #[test]
    fn melds_fire_on_the_third_card() {
        let genome = seeds::gin_rummy();
        let (mut state, _, _) = fixture(&genome, 45);
        let player = 0;
        state.seats[player].hand.clear();
        state.seats[player].hand.push(Card::new(Rank::Queen, Suit::Hearts));
        state.seats[player].hand.push(Card::new(Rank::Queen, Suit::Clubs));
        state.seats[player].hand.push(Card::new(Rank::Queen, Suit::Spades));
        state.seats[player].hand.push(Card::new(Rank::Two, Suit::Hearts));
        meld_sets(&mut state, &genome, player);
        assert!(state.seats[player].hand.len() == 1);
        assert!(state.seats[player].captured.len() == 3);
        // 5 points per melded card
        assert!(state.seats[player].score == 15);
    }

    #[test]
    fn bids_complete_and_record_contracts() {
        let genome = seeds::spades();
        let (mut state, mut rng, mut metrics) = fixture(&genome, 30);
        for _ in 0..4 {
            let mv = Move::bid(0, 3, false);
            apply(&mut state, &genome, mv, &mut rng, &mut metrics);
        }
        assert!(state.bidding_complete);
        assert!(state.team_contracts.iter().sum::<i32>() == 12);
    }

    #[test]
    fn match_rank_captures_the_pile() {
        let genome = seeds::scopa();
        let (mut state, _, mut metrics) = fixture(&genome, 2);
        for pile in state.tableau.iter_mut() {
            pile.clear();
        }
        state.tableau[2].push(Card::new(Rank::Seven, Suit::Clubs));
        let card = Card::new(Rank::Seven, Suit::Hearts);
        match_rank_place(&mut state, &genome, 0, card, &mut metrics);
        assert!(state.tableau[2].is_empty());
        assert!(state.seats[0].captured.len() == 2);
        assert!(state.seats[0].score == 2);
    }
}
