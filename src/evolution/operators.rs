//! clone-based mutation operators. every operator takes a genome and an
//! rng and hands back a fresh genome; the input is never touched. the
//! registry fires each operator independently at its own probability,
//! and structural floors (one phase, one win condition) hold under any
//! sequence of applications.

use crate::cards::location::Location;
use crate::genome::Comparator;
use crate::genome::Condition;
use crate::genome::EffectKind;
use crate::genome::EffectRule;
use crate::genome::Genome;
use crate::genome::Phase;
use crate::genome::Predicate;
use crate::genome::ScoreTrigger;
use crate::genome::ScoringRule;
use crate::genome::SequenceDirection;
use crate::genome::TableauMode;
use crate::genome::TargetSelect;
use crate::genome::WinCondition;
use rand::rngs::SmallRng;
use rand::Rng;

pub type OperatorFn = fn(&Genome, &mut SmallRng) -> Genome;

pub struct Operator {
    pub name: &'static str,
    pub probability: f64,
    op: OperatorFn,
}

pub struct Registry {
    operators: Vec<Operator>,
}

impl Registry {
    /// conservative probabilities for normal evolution
    pub fn default_pipeline() -> Self {
        Self {
            operators: Self::catalog(1.0),
        }
    }

    /// elevated probabilities, switched in when diversity collapses
    pub fn aggressive_pipeline() -> Self {
        Self {
            operators: Self::catalog(2.5),
        }
    }

    fn catalog(boost: f64) -> Vec<Operator> {
        let p = |base: f64| (base * boost).min(0.95);
        vec![
            Operator { name: "cards_per_player", probability: p(0.10), op: mutate_cards_per_player },
            Operator { name: "max_turns", probability: p(0.10), op: mutate_max_turns },
            Operator { name: "starting_chips", probability: p(0.08), op: mutate_starting_chips },
            Operator { name: "tableau_size", probability: p(0.06), op: mutate_tableau_size },
            Operator { name: "deal_to_tableau", probability: p(0.05), op: mutate_deal_to_tableau },
            Operator { name: "tableau_mode", probability: p(0.05), op: swap_tableau_mode },
            Operator { name: "sequence_direction", probability: p(0.04), op: swap_sequence_direction },
            Operator { name: "add_phase", probability: p(0.06), op: add_phase },
            Operator { name: "remove_phase", probability: p(0.05), op: remove_phase },
            Operator { name: "swap_phases", probability: p(0.04), op: swap_phases },
            Operator { name: "phase_params", probability: p(0.12), op: mutate_phase_params },
            Operator { name: "add_condition", probability: p(0.06), op: add_condition },
            Operator { name: "remove_condition", probability: p(0.04), op: remove_condition },
            Operator { name: "mutate_condition", probability: p(0.06), op: mutate_condition },
            Operator { name: "add_win_condition", probability: p(0.04), op: add_win_condition },
            Operator { name: "remove_win_condition", probability: p(0.04), op: remove_win_condition },
            Operator { name: "mutate_win_condition", probability: p(0.05), op: mutate_win_condition },
            Operator { name: "add_scoring", probability: p(0.06), op: add_scoring },
            Operator { name: "remove_scoring", probability: p(0.04), op: remove_scoring },
            Operator { name: "mutate_scoring", probability: p(0.06), op: mutate_scoring },
            Operator { name: "add_effect", probability: p(0.05), op: add_effect },
            Operator { name: "remove_effect", probability: p(0.04), op: remove_effect },
        ]
    }

    pub fn len(&self) -> usize {
        self.operators.len()
    }
    pub fn is_empty(&self) -> bool {
        self.operators.is_empty()
    }

    /// roll every operator at its own probability, in catalog order
    pub fn apply_all(&self, genome: &Genome, rng: &mut SmallRng) -> Genome {
        let mut current = genome.clone();
        for operator in self.operators.iter() {
            if rng.random::<f64>() < operator.probability {
                current = (operator.op)(&current, rng);
            }
        }
        current
    }
}

fn delta(rng: &mut SmallRng, spread: i64) -> i64 {
    let magnitude = rng.random_range(1..=spread);
    match rng.random::<bool>() {
        true => magnitude,
        false => -magnitude,
    }
}

fn mutate_cards_per_player(genome: &Genome, rng: &mut SmallRng) -> Genome {
    let mut child = genome.clone();
    let next = child.setup.cards_per_player as i64 + delta(rng, 3);
    child.setup.cards_per_player = next.clamp(1, 26) as usize;
    child
}

fn mutate_max_turns(genome: &Genome, rng: &mut SmallRng) -> Genome {
    let mut child = genome.clone();
    let factor = rng.random_range(0.8..1.2);
    let next = (child.turn_structure.max_turns as f64 * factor) as i64;
    child.turn_structure.max_turns = next.clamp(10, 2000) as usize;
    child
}

fn mutate_starting_chips(genome: &Genome, rng: &mut SmallRng) -> Genome {
    let mut child = genome.clone();
    let factor = rng.random_range(0.7..1.3);
    let next = (child.setup.starting_chips as f64 * factor) as i64;
    child.setup.starting_chips = next.clamp(0, 5000) as crate::Chips;
    child
}

fn mutate_tableau_size(genome: &Genome, rng: &mut SmallRng) -> Genome {
    let mut child = genome.clone();
    let next = child.setup.tableau_size as i64 + delta(rng, 1);
    child.setup.tableau_size = next.clamp(0, 6) as usize;
    child
}

fn mutate_deal_to_tableau(genome: &Genome, rng: &mut SmallRng) -> Genome {
    let mut child = genome.clone();
    let next = child.setup.deal_to_tableau as i64 + delta(rng, 1);
    child.setup.deal_to_tableau = next.clamp(0, 4) as usize;
    child
}

/// pick a strictly different value whenever more than one exists
fn swap_tableau_mode(genome: &Genome, rng: &mut SmallRng) -> Genome {
    let mut child = genome.clone();
    let options = [
        TableauMode::None,
        TableauMode::War,
        TableauMode::MatchRank,
        TableauMode::Sequence,
    ];
    let others: Vec<_> = options
        .into_iter()
        .filter(|&m| m != child.turn_structure.tableau_mode)
        .collect();
    child.turn_structure.tableau_mode = others[rng.random_range(0..others.len())];
    child
}

fn swap_sequence_direction(genome: &Genome, rng: &mut SmallRng) -> Genome {
    let mut child = genome.clone();
    let options = [
        SequenceDirection::Ascending,
        SequenceDirection::Descending,
        SequenceDirection::Both,
    ];
    let others: Vec<_> = options
        .into_iter()
        .filter(|&d| d != child.turn_structure.sequence_direction)
        .collect();
    child.turn_structure.sequence_direction = others[rng.random_range(0..others.len())];
    child
}

fn random_location(rng: &mut SmallRng) -> Location {
    let options = [
        Location::Deck,
        Location::Hand,
        Location::Discard,
        Location::Tableau,
        Location::OpponentHand,
        Location::Captured,
    ];
    options[rng.random_range(0..options.len())]
}

fn random_condition(rng: &mut SmallRng) -> Condition {
    let ops = [
        Predicate::HandSize,
        Predicate::LocSize,
        Predicate::CardRank,
        Predicate::CardSuit,
        Predicate::MatchRank,
        Predicate::MatchSuit,
        Predicate::BeatsTop,
        Predicate::Sequence,
    ];
    let cmps = [
        Comparator::EQ,
        Comparator::NE,
        Comparator::LT,
        Comparator::LE,
        Comparator::GT,
        Comparator::GE,
    ];
    Condition {
        op: ops[rng.random_range(0..ops.len())],
        cmp: cmps[rng.random_range(0..cmps.len())],
        value: rng.random_range(0..8),
        reference: match rng.random::<bool>() {
            true => Some(random_location(rng)),
            false => None,
        },
    }
}

fn random_phase(rng: &mut SmallRng) -> Phase {
    match rng.random_range(0..5) {
        0 => Phase::Draw(crate::genome::DrawPhase {
            source: Location::Deck,
            count: rng.random_range(1..=2),
            mandatory: rng.random::<bool>(),
            condition: None,
        }),
        1 => Phase::Play(crate::genome::PlayPhase {
            target: match rng.random::<bool>() {
                true => Location::Discard,
                false => Location::Tableau,
            },
            min_cards: 1,
            max_cards: rng.random_range(1..=3),
            mandatory: rng.random::<bool>(),
            pass_if_unable: true,
            valid_play_condition: None,
        }),
        2 => Phase::Discard(crate::genome::DiscardPhase {
            target: Location::Discard,
            count: 1,
            mandatory: rng.random::<bool>(),
        }),
        3 => Phase::Trick(crate::genome::TrickPhase {
            lead_suit_required: rng.random::<bool>(),
            trump_suit: match rng.random::<bool>() {
                true => rng.random_range(0..4),
                false => crate::cards::ANY,
            },
            high_card_wins: true,
            breaking_suit: crate::cards::ANY,
        }),
        _ => Phase::Betting(crate::genome::BettingPhase {
            min_bet: rng.random_range(1..=20),
            max_raises: rng.random_range(1..=4),
        }),
    }
}

fn add_phase(genome: &Genome, rng: &mut SmallRng) -> Genome {
    let mut child = genome.clone();
    let phase = random_phase(rng);
    if matches!(phase, Phase::Betting(_)) && child.setup.starting_chips <= 0 {
        // betting cannot exist over an empty stack
        child.setup.starting_chips = 100;
    }
    let at = rng.random_range(0..=child.turn_structure.phases.len());
    child.turn_structure.phases.insert(at, phase);
    child
}

fn remove_phase(genome: &Genome, rng: &mut SmallRng) -> Genome {
    let mut child = genome.clone();
    if child.turn_structure.phases.len() <= 1 {
        return child;
    }
    let at = rng.random_range(0..child.turn_structure.phases.len());
    child.turn_structure.phases.remove(at);
    child
}

fn swap_phases(genome: &Genome, rng: &mut SmallRng) -> Genome {
    let mut child = genome.clone();
    let n = child.turn_structure.phases.len();
    if n >= 2 {
        let a = rng.random_range(0..n);
        let b = rng.random_range(0..n);
        child.turn_structure.phases.swap(a, b);
    }
    child
}

/// clone one phase and nudge its parameters
fn mutate_phase_params(genome: &Genome, rng: &mut SmallRng) -> Genome {
    let mut child = genome.clone();
    let n = child.turn_structure.phases.len();
    if n == 0 {
        return child;
    }
    let at = rng.random_range(0..n);
    let mut phase = child.turn_structure.phases[at].clone();
    match phase {
        Phase::Draw(ref mut d) => {
            d.count = (d.count as i64 + delta(rng, 1)).clamp(1, 4) as usize;
            d.mandatory = rng.random::<bool>();
        }
        Phase::Play(ref mut p) => {
            p.max_cards = (p.max_cards as i64 + delta(rng, 1)).clamp(1, 4) as usize;
            p.min_cards = p.min_cards.min(p.max_cards);
            p.pass_if_unable = rng.random::<bool>();
        }
        Phase::Discard(ref mut d) => {
            d.count = (d.count as i64 + delta(rng, 1)).clamp(1, 3) as usize;
        }
        Phase::Trick(ref mut t) => {
            t.trump_suit = match rng.random::<bool>() {
                true => rng.random_range(0..4),
                false => crate::cards::ANY,
            };
            t.lead_suit_required = rng.random::<bool>();
        }
        Phase::Betting(ref mut b) => {
            b.min_bet = (b.min_bet as i64 + delta(rng, 5)).clamp(1, 100) as crate::Chips;
            b.max_raises = (b.max_raises as i64 + delta(rng, 1)).clamp(0, 6) as usize;
        }
        Phase::Claim(_) => (),
        Phase::Bidding(ref mut b) => {
            b.max_bid = (b.max_bid + delta(rng, 2) as i32).clamp(1, 13);
            b.min_bid = b.min_bid.clamp(0, b.max_bid);
            b.overtrick_points = (b.overtrick_points + delta(rng, 1) as i32).clamp(0, 10);
        }
    }
    child.turn_structure.phases[at] = phase;
    child
}

fn conditioned_phases(genome: &Genome) -> Vec<usize> {
    genome
        .phases()
        .iter()
        .enumerate()
        .filter(|(_, p)| matches!(p, Phase::Draw(_) | Phase::Play(_)))
        .map(|(i, _)| i)
        .collect()
}

fn add_condition(genome: &Genome, rng: &mut SmallRng) -> Genome {
    let mut child = genome.clone();
    let slots = conditioned_phases(&child);
    if slots.is_empty() {
        return child;
    }
    let at = slots[rng.random_range(0..slots.len())];
    let condition = random_condition(rng);
    match child.turn_structure.phases[at] {
        Phase::Draw(ref mut d) => d.condition = Some(condition),
        Phase::Play(ref mut p) => p.valid_play_condition = Some(condition),
        _ => (),
    }
    child
}

fn remove_condition(genome: &Genome, rng: &mut SmallRng) -> Genome {
    let mut child = genome.clone();
    let slots = conditioned_phases(&child);
    if slots.is_empty() {
        return child;
    }
    let at = slots[rng.random_range(0..slots.len())];
    match child.turn_structure.phases[at] {
        Phase::Draw(ref mut d) => d.condition = None,
        Phase::Play(ref mut p) => p.valid_play_condition = None,
        _ => (),
    }
    child
}

fn mutate_condition(genome: &Genome, rng: &mut SmallRng) -> Genome {
    let mut child = genome.clone();
    let slots = conditioned_phases(&child);
    if slots.is_empty() {
        return child;
    }
    let at = slots[rng.random_range(0..slots.len())];
    let existing = match child.turn_structure.phases[at] {
        Phase::Draw(ref mut d) => d.condition.as_mut(),
        Phase::Play(ref mut p) => p.valid_play_condition.as_mut(),
        _ => None,
    };
    if let Some(condition) = existing {
        match rng.random_range(0..4) {
            0 => condition.op = random_condition(rng).op,
            1 => condition.cmp = random_condition(rng).cmp,
            2 => condition.value = (condition.value + delta(rng, 2) as i32).max(0),
            _ => condition.reference = Some(random_location(rng)),
        }
    }
    child
}

fn random_win_condition(rng: &mut SmallRng) -> WinCondition {
    match rng.random_range(0..8) {
        0 => WinCondition::EmptyHand,
        1 => WinCondition::HighScore {
            threshold: rng.random_range(10..200),
        },
        2 => WinCondition::FirstToScore {
            threshold: rng.random_range(5..100),
        },
        3 => WinCondition::CaptureAll,
        4 => WinCondition::LowScore {
            threshold: rng.random_range(10..150),
        },
        5 => WinCondition::AllHandsEmpty,
        6 => WinCondition::BestHand,
        _ => WinCondition::MostCaptured,
    }
}

fn add_win_condition(genome: &Genome, rng: &mut SmallRng) -> Genome {
    let mut child = genome.clone();
    child.win_conditions.push(random_win_condition(rng));
    child
}

fn remove_win_condition(genome: &Genome, rng: &mut SmallRng) -> Genome {
    let mut child = genome.clone();
    if child.win_conditions.len() > 1 {
        let at = rng.random_range(0..child.win_conditions.len());
        child.win_conditions.remove(at);
    }
    child
}

fn mutate_win_condition(genome: &Genome, rng: &mut SmallRng) -> Genome {
    let mut child = genome.clone();
    let n = child.win_conditions.len();
    if n == 0 {
        return child;
    }
    let at = rng.random_range(0..n);
    child.win_conditions[at] = match child.win_conditions[at] {
        WinCondition::HighScore { threshold } => WinCondition::HighScore {
            threshold: (threshold + delta(rng, 10) as i32).max(1),
        },
        WinCondition::FirstToScore { threshold } => WinCondition::FirstToScore {
            threshold: (threshold + delta(rng, 10) as i32).max(1),
        },
        WinCondition::LowScore { threshold } => WinCondition::LowScore {
            threshold: (threshold + delta(rng, 10) as i32).max(1),
        },
        _ => random_win_condition(rng),
    };
    child
}

fn random_trigger(rng: &mut SmallRng) -> ScoreTrigger {
    let options = [
        ScoreTrigger::TrickWin,
        ScoreTrigger::Capture,
        ScoreTrigger::Play,
        ScoreTrigger::HandEnd,
        ScoreTrigger::SetComplete,
    ];
    options[rng.random_range(0..options.len())]
}

fn random_scoring(rng: &mut SmallRng) -> ScoringRule {
    ScoringRule {
        suit: match rng.random::<bool>() {
            true => rng.random_range(0..4),
            false => crate::cards::ANY,
        },
        rank: match rng.random::<bool>() {
            true => rng.random_range(0..13),
            false => crate::cards::ANY,
        },
        points: rng.random_range(-5..10),
        trigger: random_trigger(rng),
    }
}

fn add_scoring(genome: &Genome, rng: &mut SmallRng) -> Genome {
    let mut child = genome.clone();
    child.card_scoring.push(random_scoring(rng));
    child
}

fn remove_scoring(genome: &Genome, rng: &mut SmallRng) -> Genome {
    let mut child = genome.clone();
    if !child.card_scoring.is_empty() {
        let at = rng.random_range(0..child.card_scoring.len());
        child.card_scoring.remove(at);
    }
    child
}

fn mutate_scoring(genome: &Genome, rng: &mut SmallRng) -> Genome {
    let mut child = genome.clone();
    let n = child.card_scoring.len();
    if n == 0 {
        return child;
    }
    let at = rng.random_range(0..n);
    let rule = &mut child.card_scoring[at];
    match rng.random_range(0..3) {
        0 => rule.points += delta(rng, 2) as i32,
        1 => rule.trigger = random_trigger(rng),
        _ => {
            rule.suit = match rng.random::<bool>() {
                true => rng.random_range(0..4),
                false => crate::cards::ANY,
            };
            rule.rank = match rng.random::<bool>() {
                true => rng.random_range(0..13),
                false => crate::cards::ANY,
            };
        }
    }
    child
}

fn add_effect(genome: &Genome, rng: &mut SmallRng) -> Genome {
    let mut child = genome.clone();
    let kinds = [
        EffectKind::SkipNext,
        EffectKind::Reverse,
        EffectKind::DrawTwo,
        EffectKind::DrawFour,
        EffectKind::Wild,
        EffectKind::SwapHands,
        EffectKind::BlockNext,
        EffectKind::StealCard,
        EffectKind::PeekHand,
        EffectKind::DiscardPile,
    ];
    let targets = [
        TargetSelect::Actor,
        TargetSelect::NextPlayer,
        TargetSelect::PreviousPlayer,
        TargetSelect::AllOpponents,
        TargetSelect::RandomOpponent,
    ];
    child.effects.push(EffectRule {
        trigger_rank: rng.random_range(0..13),
        effect: kinds[rng.random_range(0..kinds.len())],
        target: targets[rng.random_range(0..targets.len())],
        value: rng.random_range(0..4),
    });
    child
}

fn remove_effect(genome: &Genome, rng: &mut SmallRng) -> Genome {
    let mut child = genome.clone();
    if !child.effects.is_empty() {
        let at = rng.random_range(0..child.effects.len());
        child.effects.remove(at);
    }
    child
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genome::seeds;
    use rand::SeedableRng;

    #[test]
    fn operators_never_alias_their_input() {
        let original = seeds::hearts();
        let frozen = original.clone();
        let mut rng = SmallRng::seed_from_u64(50);
        let registry = Registry::aggressive_pipeline();
        for _ in 0..20 {
            let _ = registry.apply_all(&original, &mut rng);
            assert!(original == frozen);
        }
    }

    #[test]
    fn structural_floors_hold_over_long_walks() {
        let mut rng = SmallRng::seed_from_u64(51);
        for pipeline in [Registry::default_pipeline(), Registry::aggressive_pipeline()] {
            for genome in seeds::all() {
                let mut current = genome.clone();
                for _ in 0..10 {
                    current = pipeline.apply_all(&current, &mut rng);
                    assert!(!current.turn_structure.phases.is_empty());
                    assert!(!current.win_conditions.is_empty());
                    assert!((1..=26).contains(&current.setup.cards_per_player));
                    assert!((10..=2000).contains(&current.turn_structure.max_turns));
                    assert!((0..=5000).contains(&current.setup.starting_chips));
                }
            }
        }
    }

    #[test]
    fn mode_swaps_always_move() {
        let genome = seeds::war();
        let mut rng = SmallRng::seed_from_u64(52);
        for _ in 0..20 {
            let child = swap_tableau_mode(&genome, &mut rng);
            assert!(child.turn_structure.tableau_mode != genome.turn_structure.tableau_mode);
        }
    }

    #[test]
    fn betting_insert_funds_the_stack() {
        let genome = seeds::hearts();
        assert!(genome.setup.starting_chips == 0);
        let mut rng = SmallRng::seed_from_u64(53);
        for _ in 0..50 {
            let child = add_phase(&genome, &mut rng);
            if child.has_betting() {
                assert!(child.setup.starting_chips > 0);
            }
        }
    }

    #[test]
    fn aggressive_pipeline_mutates_more() {
        let registry = Registry::default_pipeline();
        let hot = Registry::aggressive_pipeline();
        assert!(registry.len() == hot.len());
        let mut rng = SmallRng::seed_from_u64(54);
        let genome = seeds::go_fish();
        let mut default_changed = 0;
        let mut aggressive_changed = 0;
        for _ in 0..50 {
            if registry.apply_all(&genome, &mut rng) != genome {
                default_changed += 1;
            }
            if hot.apply_all(&genome, &mut rng) != genome {
                aggressive_changed += 1;
            }
        }
        assert!(aggressive_changed >= default_changed);
    }
}
