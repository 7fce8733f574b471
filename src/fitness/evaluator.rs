//! converts a batch of simulated outcomes into one scalar plus a
//! breakdown. nine subscores in [0,1], style-weighted, then multiplied
//! through quality gates and docked a coherence penalty for rule
//! combinations that fight each other.

use super::style::FitnessStyle;
use super::style::SUBSCORES;
use crate::genome::Genome;
use crate::genome::Phase;
use crate::genome::TableauMode;
use crate::genome::WinCondition;
use crate::simulation::metrics::BatchMetrics;
use crate::Fitness;
use serde::Deserialize;
use serde::Serialize;

/// seconds of human table time one simulated turn stands for
const SECONDS_PER_TURN: f64 = 2.0;
const SESSION_SWEET_SPOT_MIN: f64 = 15.0;
const SESSION_HARD_CAP_MIN: f64 = 60.0;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FitnessBreakdown {
    pub decision_density: f64,
    pub comeback_potential: f64,
    pub tension_curve: f64,
    pub interaction: f64,
    pub simplicity: f64,
    pub session_length: f64,
    pub skill_vs_luck: f64,
    pub bluffing_depth: f64,
    pub betting_engagement: f64,
    pub coherence_penalty: f64,
    pub gate_multiplier: f64,
    pub valid: bool,
    pub total: Fitness,
}

impl FitnessBreakdown {
    fn subscores(&self) -> [f64; SUBSCORES] {
        [
            self.decision_density,
            self.comeback_potential,
            self.tension_curve,
            self.interaction,
            self.simplicity,
            self.session_length,
            self.skill_vs_luck,
            self.bluffing_depth,
            self.betting_engagement,
        ]
    }
}

pub fn evaluate(genome: &Genome, metrics: &BatchMetrics, style: FitnessStyle) -> FitnessBreakdown {
    let minutes = metrics.avg_turns() * SECONDS_PER_TURN / 60.0;
    let mut breakdown = FitnessBreakdown {
        decision_density: decision_density(genome, metrics),
        comeback_potential: comeback_potential(genome, metrics),
        tension_curve: tension_curve(genome, metrics),
        interaction: interaction(genome, metrics),
        simplicity: simplicity(genome),
        session_length: session_length(minutes),
        skill_vs_luck: skill_vs_luck(genome, metrics, style),
        bluffing_depth: bluffing_depth(genome, metrics),
        betting_engagement: betting_engagement(genome, metrics),
        coherence_penalty: coherence_penalty(genome),
        gate_multiplier: 1.0,
        valid: true,
        total: 0.0,
    };
    if metrics.is_invalid() || minutes > SESSION_HARD_CAP_MIN {
        breakdown.valid = false;
        return breakdown;
    }
    let weights = style.weights();
    let scores = breakdown.subscores();
    let mut total = 0.0;
    for (i, (&w, &s)) in weights.iter().zip(scores.iter()).enumerate() {
        // tension only lands when players have decisions to sweat over
        let s = match i {
            2 => s * (0.5 + 0.5 * breakdown.decision_density),
            _ => s,
        };
        total += w * s;
    }
    let mut gate = 1.0;
    if breakdown.comeback_potential < crate::GATE_COMEBACK_FLOOR {
        gate *= 0.5;
    }
    if breakdown.skill_vs_luck < crate::GATE_SKILL_FLOOR {
        gate *= 0.7;
    }
    let max_rate = (0..genome.num_players())
        .map(|p| metrics.win_rate(p))
        .fold(0.0, f64::max);
    if max_rate > crate::GATE_DOMINANCE_CEILING {
        gate *= 0.6;
    }
    breakdown.gate_multiplier = gate;
    breakdown.total = ((total * gate) - breakdown.coherence_penalty).max(0.0);
    breakdown
}

fn clamp(x: f64) -> f64 {
    x.clamp(0.0, 1.0)
}

/// reward curve peaked at `target`, falling to zero at 0 and 2*target
fn peak(x: f64, target: f64) -> f64 {
    match target {
        t if t <= 0.0 => 0.0,
        t => clamp(1.0 - (x - t).abs() / t),
    }
}

fn decision_density(genome: &Genome, metrics: &BatchMetrics) -> f64 {
    if metrics.decisions == 0 {
        // no instrumentation: guess from structure
        let optional = genome
            .phases()
            .iter()
            .filter(|p| match p {
                Phase::Draw(d) => !d.mandatory,
                Phase::Play(pl) => !pl.mandatory,
                Phase::Discard(d) => !d.mandatory,
                _ => false,
            })
            .count();
        let conditions = condition_count(genome);
        return clamp(0.2 + 0.1 * optional as f64 + 0.05 * conditions as f64);
    }
    let avg_moves = metrics.moves_offered as f64 / metrics.decisions as f64;
    let filtering = clamp(
        metrics.moves_offered as f64 / metrics.hand_cards_at_decision.max(1) as f64,
    );
    let variety = clamp((avg_moves - 1.0) / 5.0);
    let unforced = 1.0 - metrics.forced as f64 / metrics.decisions as f64;
    clamp(0.3 * clamp(avg_moves / 8.0) + 0.2 * filtering + 0.25 * variety + 0.25 * unforced)
}

/// how evenly wins spread, and how often the winner came from behind
fn comeback_potential(genome: &Genome, metrics: &BatchMetrics) -> f64 {
    if metrics.games == 0 {
        return 0.0;
    }
    let balance = win_balance(genome, metrics);
    let comeback = metrics.comeback_wins as f64 / metrics.games as f64;
    clamp(0.6 * balance + 0.4 * comeback)
}

/// 1.0 at perfectly uniform win rates, 0.0 at total domination
fn win_balance(genome: &Genome, metrics: &BatchMetrics) -> f64 {
    let n = genome.num_players();
    if metrics.games == 0 || n < 2 {
        return 0.0;
    }
    let uniform = 1.0 / n as f64;
    let deviation: f64 = (0..n)
        .map(|p| (metrics.win_rate(p) - uniform).abs())
        .sum();
    clamp(1.0 - deviation / (2.0 * (1.0 - uniform)))
}

fn tension_curve(genome: &Genome, metrics: &BatchMetrics) -> f64 {
    if metrics.games == 0 {
        return 0.0;
    }
    let games = metrics.games as f64;
    if genome.has_betting() {
        let bets = clamp(metrics.bets as f64 / games / 6.0);
        let all_in = clamp(metrics.all_ins as f64 / games);
        let showdown = clamp(metrics.showdowns as f64 / games);
        return clamp(0.4 * bets + 0.3 * all_in + 0.3 * showdown);
    }
    let expected_changes = (metrics.avg_turns() / 20.0).max(0.5);
    let lead = clamp(metrics.lead_changes as f64 / games / expected_changes);
    let decisive = clamp(metrics.decisive_turns as f64 / metrics.total_turns.max(1) as f64);
    let margin = clamp(1.0 - metrics.closest_margin_sum / games);
    clamp(0.4 * lead + 0.3 * decisive + 0.3 * margin)
}

fn interaction(genome: &Genome, metrics: &BatchMetrics) -> f64 {
    if metrics.decisions > 0 {
        return clamp(4.0 * metrics.disruptions as f64 / metrics.decisions as f64);
    }
    let effects = genome.effects.len() as f64;
    let trick = genome.turn_structure.is_trick_based as u8 as f64;
    let phases = genome.phases().len() as f64;
    clamp(0.2 + 0.15 * effects + 0.3 * trick + 0.05 * phases)
}

fn condition_count(genome: &Genome) -> usize {
    genome
        .phases()
        .iter()
        .filter(|p| match p {
            Phase::Draw(d) => d.condition.is_some(),
            Phase::Play(pl) => pl.valid_play_condition.is_some(),
            _ => false,
        })
        .count()
}

/// inverted rules complexity: higher means easier to teach
fn simplicity(genome: &Genome) -> f64 {
    let mut cost = 0.0;
    for phase in genome.phases() {
        cost += match phase {
            Phase::Draw(_) => 1.0,
            Phase::Play(_) => 1.5,
            Phase::Discard(_) => 1.0,
            Phase::Trick(_) => 2.5,
            Phase::Betting(_) => 3.0,
            Phase::Claim(_) => 2.0,
            Phase::Bidding(_) => 3.5,
        };
    }
    cost += 0.8 * condition_count(genome) as f64;
    let mut kinds: Vec<_> = genome.effects.iter().map(|e| e.effect).collect();
    kinds.sort_by_key(|k| *k as u8);
    kinds.dedup();
    cost += 0.7 * kinds.len() as f64;
    // memory load from the game type itself
    if genome.has_trick() {
        cost += 1.5;
    }
    if genome.has_claim() {
        cost += 2.0;
    }
    if genome.has_betting() {
        cost += 1.5;
    }
    cost += 0.3 * genome.card_scoring.len() as f64;
    let score_heavy = genome
        .win_conditions
        .iter()
        .filter(|w| w.is_score_based())
        .count();
    cost += 0.5 * score_heavy as f64;
    // familiarity discount for shapes players already know
    let mut discount: f64 = 0.0;
    if genome.turn_structure.is_trick_based && genome.has_trick() {
        discount += 0.15;
    }
    let has_draw = genome.phases().iter().any(|p| matches!(p, Phase::Draw(_)));
    let has_play = genome.phases().iter().any(|p| matches!(p, Phase::Play(_)));
    if has_draw && has_play {
        discount += 0.10;
    }
    if genome.has_betting() {
        discount += 0.10;
    }
    if genome.phases().len() == 1 && genome.turn_structure.tableau_mode == TableauMode::War {
        discount += 0.15;
    }
    cost *= 1.0 - discount.min(0.40);
    clamp(1.0 - (cost / 20.0).powf(1.2))
}

fn session_length(minutes: f64) -> f64 {
    if minutes > SESSION_HARD_CAP_MIN {
        return 0.0;
    }
    if minutes <= SESSION_SWEET_SPOT_MIN {
        return 1.0;
    }
    clamp((SESSION_HARD_CAP_MIN - minutes) / (SESSION_HARD_CAP_MIN - SESSION_SWEET_SPOT_MIN))
}

fn skill_vs_luck(genome: &Genome, metrics: &BatchMetrics, style: FitnessStyle) -> f64 {
    let length = clamp(metrics.avg_turns() / 100.0);
    let balance = win_balance(genome, metrics);
    let structure = clamp(
        genome.phases().len() as f64 / 5.0 + 0.1 * condition_count(genome) as f64,
    );
    let score = clamp((length + balance + structure) / 3.0);
    match style {
        FitnessStyle::Party => 1.0 - score,
        _ => score,
    }
}

fn bluffing_depth(genome: &Genome, metrics: &BatchMetrics) -> f64 {
    if !genome.has_betting() && !genome.has_claim() {
        return 0.0;
    }
    let games = metrics.games.max(1) as f64;
    let bluff_rate = metrics.bluffs as f64 / metrics.bets.max(1) as f64;
    let all_in_rate = metrics.all_ins as f64 / games;
    let showdown_rate = metrics.showdowns as f64 / games;
    clamp(0.5 * peak(bluff_rate, 0.25) + 0.25 * peak(all_in_rate, 0.10) + 0.25 * peak(showdown_rate, 0.50))
}

fn betting_engagement(genome: &Genome, metrics: &BatchMetrics) -> f64 {
    if !genome.has_betting() {
        return 0.0;
    }
    let games = metrics.games.max(1) as f64;
    let resolutions = metrics.showdowns + metrics.fold_wins;
    let resolution = clamp(resolutions as f64 / games);
    let drama = peak(metrics.all_ins as f64 / games, 0.15);
    let activity = clamp(metrics.bets as f64 / games / 5.0);
    let n = genome.num_players();
    let spread = (0..n).map(|p| metrics.win_rate(p)).fold(0.0, f64::max)
        - (0..n).map(|p| metrics.win_rate(p)).fold(1.0, f64::min);
    let variance = peak(spread, 0.20);
    let showdown_share = match resolutions {
        0 => 0.0,
        r => peak(metrics.showdowns as f64 / r as f64, 0.60),
    };
    clamp(0.25 * resolution + 0.2 * drama + 0.2 * activity + 0.15 * variance + 0.2 * showdown_share)
}

/// semantic conflicts between tableau mode and win conditions: the rules
/// can run, but the game they make is degenerate
fn coherence_penalty(genome: &Genome) -> f64 {
    let mode = genome.turn_structure.tableau_mode;
    let mut penalty: f64 = 0.0;
    for win in genome.win_conditions.iter() {
        penalty += match (mode, win) {
            (TableauMode::War, WinCondition::EmptyHand) => 0.20,
            (TableauMode::MatchRank, WinCondition::CaptureAll) => 0.20,
            (TableauMode::Sequence, WinCondition::CaptureAll) => 0.20,
            (TableauMode::None, WinCondition::CaptureAll) => 0.15,
            (TableauMode::None, WinCondition::MostCaptured) => 0.15,
            _ => 0.0,
        };
    }
    if genome.has_bidding() && !genome.has_trick() {
        penalty += 0.20;
    }
    if genome
        .win_conditions
        .iter()
        .any(|w| matches!(w, WinCondition::BestHand))
        && !genome.has_betting()
    {
        penalty += 0.15;
    }
    penalty.min(0.50)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genome::seeds;
    use crate::MAX_PLAYERS;

    fn metrics_with_rates(games: usize, rates: &[f64], turns: usize) -> BatchMetrics {
        let mut m = BatchMetrics::default();
        m.games = games;
        let mut wins = [0usize; MAX_PLAYERS];
        for (p, rate) in rates.iter().enumerate() {
            wins[p] = (rate * games as f64).round() as usize;
        }
        m.wins = wins;
        m.draws = games - wins.iter().sum::<usize>();
        m.total_turns = games * turns;
        m.decisions = games * turns;
        m.moves_offered = games * turns * 4;
        m.hand_cards_at_decision = games * turns * 6;
        m.lead_changes = games * 2;
        m.decisive_turns = games * turns / 4;
        m.closest_margin_sum = games as f64 * 0.3;
        m.comeback_wins = games / 4;
        m
    }

    #[test]
    fn lopsided_outcomes_gate_hard() {
        let genome = seeds::crazy_eights();
        let even = metrics_with_rates(100, &[0.5, 0.5], 40);
        let skewed = metrics_with_rates(100, &[0.95, 0.05], 40);
        let fair = evaluate(&genome, &even, FitnessStyle::Balanced);
        let cruel = evaluate(&genome, &skewed, FitnessStyle::Balanced);
        assert!(fair.valid && cruel.valid);
        assert!(cruel.total <= 0.6 * fair.total + 1e-9);
    }

    #[test]
    fn session_cap_invalidates() {
        let genome = seeds::war();
        // 2400 avg turns = 80 minutes at 2s/turn
        let mut m = metrics_with_rates(10, &[0.5, 0.5], 2400);
        m.comeback_wins = 5;
        let breakdown = evaluate(&genome, &m, FitnessStyle::Balanced);
        assert!(!breakdown.valid);
        assert!(breakdown.total == 0.0);
    }

    #[test]
    fn error_heavy_batches_invalidate() {
        let genome = seeds::war();
        let mut m = metrics_with_rates(10, &[0.5, 0.5], 50);
        m.errors = 6;
        let breakdown = evaluate(&genome, &m, FitnessStyle::Balanced);
        assert!(!breakdown.valid);
    }

    #[test]
    fn coherent_rules_score_above_conflicted_ones() {
        let coherent = seeds::war();
        let mut conflicted = seeds::war();
        conflicted
            .win_conditions
            .insert(0, WinCondition::EmptyHand);
        assert!(coherence_penalty(&coherent) == 0.0);
        assert!(coherence_penalty(&conflicted) > 0.0);
    }

    #[test]
    fn session_length_shape() {
        assert!(session_length(10.0) == 1.0);
        assert!(session_length(15.0) == 1.0);
        assert!(session_length(61.0) == 0.0);
        let mid = session_length(37.5);
        assert!(mid > 0.49 && mid < 0.51);
    }

    #[test]
    fn subscores_stay_in_unit_interval() {
        for genome in seeds::all() {
            let m = metrics_with_rates(50, &[0.4, 0.35], 60);
            let b = evaluate(&genome, &m, FitnessStyle::Strategic);
            for s in b.subscores() {
                assert!((0.0..=1.0).contains(&s), "{} out of range", s);
            }
            assert!(b.total >= 0.0);
        }
    }

    #[test]
    fn structural_fallbacks_cover_uninstrumented_batches() {
        let genome = seeds::uno_style();
        let empty = BatchMetrics::default();
        let density = decision_density(&genome, &empty);
        let interplay = interaction(&genome, &empty);
        assert!(density > 0.0);
        assert!(interplay > 0.0);
        // four effects and a couple of phases read as an interactive game
        assert!(interplay > interaction(&seeds::gin_rummy(), &empty));
    }

    #[test]
    fn betting_games_read_tension_from_the_pot() {
        let genome = seeds::simple_poker();
        let mut m = metrics_with_rates(50, &[0.45, 0.45], 30);
        m.bets = 150;
        m.all_ins = 10;
        m.showdowns = 25;
        let hot = tension_curve(&genome, &m);
        m.bets = 0;
        m.all_ins = 0;
        m.showdowns = 0;
        let cold = tension_curve(&genome, &m);
        assert!(hot > cold);
        // a trick game ignores pot counters entirely
        let hearts = seeds::hearts();
        let mut n = metrics_with_rates(50, &[0.25, 0.25, 0.25, 0.25], 60);
        n.bets = 500;
        let with_bets = tension_curve(&hearts, &n);
        n.bets = 0;
        assert!(tension_curve(&hearts, &n) == with_bets);
    }

    #[test]
    fn simplicity_prefers_fewer_moving_parts() {
        assert!(simplicity(&seeds::war()) > simplicity(&seeds::spades()));
        assert!(simplicity(&seeds::crazy_eights()) > simplicity(&seeds::draw_poker()));
    }

    #[test]
    fn familiar_shapes_earn_their_discount() {
        let hearts = seeds::hearts();
        let mut unfamiliar = hearts.clone();
        unfamiliar.turn_structure.is_trick_based = false;
        assert!(simplicity(&hearts) >= simplicity(&unfamiliar));
    }

    #[test]
    fn party_style_flips_skill() {
        let genome = seeds::hearts();
        let m = metrics_with_rates(50, &[0.3, 0.3, 0.2, 0.2], 60);
        let strategic = evaluate(&genome, &m, FitnessStyle::Strategic);
        let party = evaluate(&genome, &m, FitnessStyle::Party);
        assert!((strategic.skill_vs_luck + party.skill_vs_luck - 1.0).abs() < 1e-9);
    }
}
