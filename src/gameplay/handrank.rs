//! showdown hand ranking. produces an ordered strength key so callers
//! can compare hands without knowing which evaluation style is active.

use crate::cards::card::Card;
use crate::genome::CardValue;
use crate::genome::HandEval;
use crate::genome::HandPattern;
use crate::state::GameState;

/// comparable hand value: class first, then lexicographic tie-break keys.
/// busted point-total hands sit below every non-busted hand.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Strength {
    class: i32,
    keys: Vec<i32>,
}

pub fn strength(hand: &[Card], eval: &HandEval) -> Strength {
    match eval {
        HandEval::HighCard => Strength {
            class: 0,
            keys: ranks_desc(hand),
        },
        HandEval::PointTotal {
            card_values,
            target_value,
            bust_threshold,
        } => point_total(hand, card_values, *target_value, *bust_threshold),
        HandEval::PatternMatch { patterns } => pattern_match(hand, patterns),
    }
}

/// best hand among the given seats; ties keep the earliest seat
pub fn showdown(state: &GameState, seats: &[usize], eval: &HandEval) -> usize {
    let mut best = seats[0];
    let mut best_strength = strength(&state.seats[best].hand, eval);
    for &seat in seats.iter().skip(1) {
        let s = strength(&state.seats[seat].hand, eval);
        if s > best_strength {
            best = seat;
            best_strength = s;
        }
    }
    best
}

fn ranks_desc(hand: &[Card]) -> Vec<i32> {
    let mut ranks: Vec<i32> = hand.iter().map(|c| c.rank() as i32).collect();
    ranks.sort_unstable_by(|a, b| b.cmp(a));
    ranks
}

/// sum card values, falling back to alternates one at a time while the
/// primary total busts. ranking is proximity to target without busting.
fn point_total(hand: &[Card], values: &[CardValue], target: i32, bust: i32) -> Strength {
    let mut total: i32 = hand
        .iter()
        .map(|c| values.get(c.rank() as usize).map(|v| v.value).unwrap_or(0))
        .sum();
    let mut downgrades: Vec<i32> = hand
        .iter()
        .filter_map(|c| values.get(c.rank() as usize))
        .filter(|v| v.value > v.alt_value)
        .map(|v| v.value - v.alt_value)
        .collect();
    downgrades.sort_unstable_by(|a, b| b.cmp(a));
    for d in downgrades {
        if total < bust {
            break;
        }
        total -= d;
    }
    if total >= bust {
        Strength {
            class: -1,
            keys: vec![-total],
        }
    } else {
        Strength {
            class: 0,
            keys: vec![-(target - total).abs()],
        }
    }
}

/// first matching pattern wins; within a pattern, compare the sorted
/// ranks of the cards that satisfied it
fn pattern_match(hand: &[Card], patterns: &[HandPattern]) -> Strength {
    for (i, pattern) in patterns.iter().enumerate() {
        if let Some(mut keys) = matches_pattern(hand, pattern) {
            keys.sort_unstable_by(|a, b| b.cmp(a));
            keys.truncate(pattern.required_count.max(1));
            return Strength {
                class: (patterns.len() - i) as i32,
                keys,
            };
        }
    }
    Strength {
        class: 0,
        keys: ranks_desc(hand),
    }
}

fn matches_pattern(hand: &[Card], pattern: &HandPattern) -> Option<Vec<i32>> {
    if hand.len() < pattern.required_count {
        return None;
    }
    let mut counts = [0usize; 13];
    for card in hand.iter() {
        counts[card.rank() as usize] += 1;
    }
    for &rank in pattern.required_ranks.iter() {
        if counts.get(rank as usize).copied().unwrap_or(0) == 0 {
            return None;
        }
    }
    let mut contributors: Vec<i32> = Vec::new();
    if pattern.same_suit_count > 0 {
        let mut best: Option<Vec<i32>> = None;
        for suit in 0..4u8 {
            let mut ranks: Vec<i32> = hand
                .iter()
                .filter(|c| c.suit() as u8 == suit)
                .map(|c| c.rank() as i32)
                .collect();
            if ranks.len() < pattern.same_suit_count {
                continue;
            }
            ranks.sort_unstable_by(|a, b| b.cmp(a));
            ranks.truncate(pattern.same_suit_count);
            if best.as_ref().map(|b| &ranks > b).unwrap_or(true) {
                best = Some(ranks);
            }
        }
        contributors.extend(best?);
    }
    if pattern.sequence_length > 0 {
        contributors.extend(best_run(&counts, pattern.sequence_length, pattern.allow_wrap)?);
    }
    if !pattern.same_rank_groups.is_empty() {
        contributors.extend(rank_groups(&counts, &pattern.same_rank_groups)?);
    }
    if contributors.is_empty() {
        let mut ranks: Vec<i32> = hand.iter().map(|c| c.rank() as i32).collect();
        ranks.sort_unstable_by(|a, b| b.cmp(a));
        ranks.truncate(pattern.required_count);
        contributors = ranks;
    }
    Some(contributors)
}

/// highest run of `len` distinct consecutive ranks, optionally wrapping
/// past the ace
fn best_run(counts: &[usize; 13], len: usize, wrap: bool) -> Option<Vec<i32>> {
    if len == 0 || len > 13 {
        return None;
    }
    let starts: Vec<usize> = if wrap {
        (0..13).collect()
    } else {
        (0..=13usize.saturating_sub(len)).collect()
    };
    let mut best: Option<Vec<i32>> = None;
    for start in starts {
        let run: Vec<i32> = (0..len).map(|off| ((start + off) % 13) as i32).collect();
        if run.iter().all(|&r| counts[r as usize] > 0) {
            let mut key = run.clone();
            key.sort_unstable_by(|a, b| b.cmp(a));
            if best.as_ref().map(|b| &key > b).unwrap_or(true) {
                best = Some(key);
            }
        }
    }
    best
}

/// assign rank groups greedily from the top of the hand.
/// groups are matched largest first so a full house finds its trips
/// before its pair.
fn rank_groups(counts: &[usize; 13], groups: &[usize]) -> Option<Vec<i32>> {
    let mut remaining = *counts;
    let mut sizes: Vec<usize> = groups.to_vec();
    sizes.sort_unstable_by(|a, b| b.cmp(a));
    let mut out = Vec::new();
    for size in sizes {
        let rank = (0..13).rev().find(|&r| remaining[r] >= size)?;
        remaining[rank] = 0;
        out.extend(std::iter::repeat(rank as i32).take(size));
    }
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::rank::Rank;
    use crate::cards::suit::Suit;
    use crate::genome::seeds;

    fn card(rank: Rank, suit: Suit) -> Card {
        Card::new(rank, suit)
    }

    fn poker_eval() -> HandEval {
        match seeds::simple_poker().hand_eval {
            Some(eval) => eval,
            None => unreachable!(),
        }
    }

    #[test]
    fn high_card_compares_down_the_hand() {
        let eval = HandEval::HighCard;
        let a = [card(Rank::Ace, Suit::Hearts), card(Rank::Two, Suit::Clubs)];
        let b = [card(Rank::Ace, Suit::Spades), card(Rank::King, Suit::Clubs)];
        assert!(strength(&b, &eval) > strength(&a, &eval));
    }

    #[test]
    fn pairs_beat_high_cards() {
        let eval = poker_eval();
        let pair = [
            card(Rank::Three, Suit::Hearts),
            card(Rank::Three, Suit::Clubs),
            card(Rank::Nine, Suit::Spades),
        ];
        let high = [
            card(Rank::Ace, Suit::Hearts),
            card(Rank::King, Suit::Clubs),
            card(Rank::Nine, Suit::Diamonds),
        ];
        assert!(strength(&pair, &eval) > strength(&high, &eval));
    }

    #[test]
    fn flush_beats_straight() {
        let eval = poker_eval();
        let flush = [
            card(Rank::Two, Suit::Hearts),
            card(Rank::Five, Suit::Hearts),
            card(Rank::Seven, Suit::Hearts),
            card(Rank::Nine, Suit::Hearts),
            card(Rank::Jack, Suit::Hearts),
        ];
        let straight = [
            card(Rank::Five, Suit::Hearts),
            card(Rank::Six, Suit::Clubs),
            card(Rank::Seven, Suit::Spades),
            card(Rank::Eight, Suit::Diamonds),
            card(Rank::Nine, Suit::Hearts),
        ];
        assert!(strength(&flush, &eval) > strength(&straight, &eval));
    }

    #[test]
    fn two_pair_needs_two_distinct_ranks() {
        let eval = poker_eval();
        let two_pair = [
            card(Rank::Four, Suit::Hearts),
            card(Rank::Four, Suit::Clubs),
            card(Rank::Nine, Suit::Spades),
            card(Rank::Nine, Suit::Diamonds),
        ];
        let one_pair = [
            card(Rank::Ace, Suit::Hearts),
            card(Rank::Ace, Suit::Clubs),
            card(Rank::Nine, Suit::Spades),
            card(Rank::Two, Suit::Diamonds),
        ];
        assert!(strength(&two_pair, &eval) > strength(&one_pair, &eval));
    }

    #[test]
    fn point_total_busts_lose() {
        let eval = HandEval::PointTotal {
            card_values: HandEval::standard_point_values(),
            target_value: 21,
            bust_threshold: 22,
        };
        let twenty = [card(Rank::King, Suit::Hearts), card(Rank::Queen, Suit::Clubs)];
        let bust = [
            card(Rank::King, Suit::Hearts),
            card(Rank::Queen, Suit::Clubs),
            card(Rank::Five, Suit::Spades),
        ];
        let sixteen = [card(Rank::Nine, Suit::Hearts), card(Rank::Seven, Suit::Clubs)];
        assert!(strength(&twenty, &eval) > strength(&sixteen, &eval));
        assert!(strength(&sixteen, &eval) > strength(&bust, &eval));
    }

    #[test]
    fn aces_soften_to_avoid_busting() {
        let eval = HandEval::PointTotal {
            card_values: HandEval::standard_point_values(),
            target_value: 21,
            bust_threshold: 22,
        };
        // A + 9 + K = 30 hard, 20 soft
        let soft = [
            card(Rank::Ace, Suit::Hearts),
            card(Rank::Nine, Suit::Clubs),
            card(Rank::King, Suit::Spades),
        ];
        let eighteen = [card(Rank::Nine, Suit::Hearts), card(Rank::Nine, Suit::Spades)];
        assert!(strength(&soft, &eval) > strength(&eighteen, &eval));
    }

    #[test]
    fn wrapping_runs_only_when_allowed() {
        let mut counts = [0usize; 13];
        // K, A, 2
        counts[Rank::King as usize] = 1;
        counts[Rank::Ace as usize] = 1;
        counts[Rank::Two as usize] = 1;
        assert!(best_run(&counts, 3, false).is_none());
        assert!(best_run(&counts, 3, true).is_some());
    }

    #[test]
    fn showdown_prefers_earliest_on_ties() {
        use rand::rngs::SmallRng;
        use rand::SeedableRng;
        let genome = seeds::simple_poker();
        let mut state = GameState::default();
        state.deal(&genome, &mut SmallRng::seed_from_u64(1));
        let mirror = state.seats[0].hand.clone();
        state.seats[1].hand = mirror;
        let winner = showdown(&state, &[0, 1], &HandEval::HighCard);
        assert!(winner == 0);
    }
}
