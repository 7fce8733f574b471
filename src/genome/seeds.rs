//! the built-in roster of playable genomes. these are the exclusive
//! source of initial population diversity, so together they are meant to
//! cover the mechanics space: pure luck, trick-taking, shedding,
//! matching, set collection, betting, claiming, and capture.

use super::condition::Comparator;
use super::condition::Condition;
use super::condition::Predicate;
use super::effect::EffectKind;
use super::effect::EffectRule;
use super::effect::TargetSelect;
use super::handeval::HandEval;
use super::handeval::HandPattern;
use super::phase::BettingPhase;
use super::phase::BiddingPhase;
use super::phase::ClaimPhase;
use super::phase::DiscardPhase;
use super::phase::DrawPhase;
use super::phase::Phase;
use super::phase::PlayPhase;
use super::phase::TrickPhase;
use super::rules::Genome;
use super::rules::SequenceDirection;
use super::rules::TableauMode;
use super::rules::TurnStructure;
use super::scoring::ScoreTrigger;
use super::scoring::ScoringRule;
use super::setup::Setup;
use super::teams::Teams;
use super::wincon::WinCondition;
use crate::cards::ANY;

pub fn all() -> Vec<Genome> {
    vec![
        war(),
        hearts(),
        spades(),
        partnership_spades(),
        whist(),
        knockout_whist(),
        crazy_eights(),
        old_maid(),
        president(),
        fan_tan(),
        uno_style(),
        gin_rummy(),
        go_fish(),
        simple_poker(),
        draw_poker(),
        blackjack(),
        cheat(),
        scopa(),
        betting_war(),
    ]
}

pub fn names() -> Vec<String> {
    all().into_iter().map(|g| g.name).collect()
}

pub fn by_name(name: &str) -> Option<Genome> {
    all().into_iter().find(|g| g.name == name)
}

fn base(name: &str, setup: Setup, turns: TurnStructure, wins: Vec<WinCondition>) -> Genome {
    Genome {
        name: name.to_string(),
        generation: 0,
        setup,
        turn_structure: turns,
        win_conditions: wins,
        effects: Vec::new(),
        card_scoring: Vec::new(),
        hand_eval: None,
        teams: None,
    }
}

fn turns(phases: Vec<Phase>, max_turns: usize) -> TurnStructure {
    TurnStructure {
        phases,
        max_turns,
        tableau_mode: TableauMode::None,
        sequence_direction: SequenceDirection::Ascending,
        is_trick_based: false,
    }
}

fn single_play(target: crate::cards::location::Location) -> Phase {
    Phase::Play(PlayPhase {
        target,
        min_cards: 1,
        max_cards: 1,
        mandatory: true,
        pass_if_unable: false,
        valid_play_condition: None,
    })
}

/// pure luck: both halves of the deck slam into a shared battle pile
pub fn war() -> Genome {
    let mut turns = turns(vec![single_play(Location::Tableau)], 1000);
    turns.tableau_mode = TableauMode::War;
    let setup = Setup {
        num_players: 2,
        cards_per_player: 26,
        tableau_size: 1,
        starting_chips: 0,
        deal_to_tableau: 0,
    };
    base("War", setup, turns, vec![WinCondition::CaptureAll])
}

/// penalty-avoidance trick-taking. scoring is negative so that the
/// score-settled finish still favors the cleanest hand.
pub fn hearts() -> Genome {
    let trick = Phase::Trick(TrickPhase {
        lead_suit_required: true,
        trump_suit: ANY,
        high_card_wins: true,
        breaking_suit: Suit::Hearts as u8,
    });
    let mut turns = turns(vec![trick], 200);
    turns.is_trick_based = true;
    let setup = Setup {
        num_players: 4,
        cards_per_player: 13,
        tableau_size: 0,
        starting_chips: 0,
        deal_to_tableau: 0,
    };
    let mut g = base("Hearts", setup, turns, vec![WinCondition::AllHandsEmpty]);
    g.card_scoring = vec![
        ScoringRule {
            suit: Suit::Hearts as u8,
            rank: ANY,
            points: -1,
            trigger: ScoreTrigger::TrickWin,
        },
        ScoringRule {
            suit: Suit::Spades as u8,
            rank: Rank::Queen as u8,
            points: -13,
            trigger: ScoreTrigger::TrickWin,
        },
    ];
    g
}

fn spades_bidding() -> Phase {
    Phase::Bidding(BiddingPhase {
        min_bid: 1,
        max_bid: 13,
        allow_nil: true,
        points_per_trick_bid: 10,
        overtrick_points: 1,
        failed_contract_penalty: 10,
        nil_bonus: 100,
        nil_penalty: 100,
        bag_limit: 10,
        bag_penalty: 100,
    })
}

pub fn spades() -> Genome {
    let trick = Phase::Trick(TrickPhase {
        lead_suit_required: true,
        trump_suit: Suit::Spades as u8,
        high_card_wins: true,
        breaking_suit: Suit::Spades as u8,
    });
    let mut turns = turns(vec![spades_bidding(), trick], 500);
    turns.is_trick_based = true;
    let setup = Setup {
        num_players: 4,
        cards_per_player: 13,
        tableau_size: 0,
        starting_chips: 0,
        deal_to_tableau: 0,
    };
    base(
        "Spades",
        setup,
        turns,
        vec![WinCondition::FirstToScore { threshold: 250 }],
    )
}

pub fn partnership_spades() -> Genome {
    let mut g = spades();
    g.name = "Partnership Spades".to_string();
    g.teams = Some(Teams {
        teams: vec![vec![0, 2], vec![1, 3]],
    });
    g
}

pub fn whist() -> Genome {
    let trick = Phase::Trick(TrickPhase {
        lead_suit_required: true,
        trump_suit: Suit::Hearts as u8,
        high_card_wins: true,
        breaking_suit: ANY,
    });
    let mut turns = turns(vec![trick], 200);
    turns.is_trick_based = true;
    let setup = Setup {
        num_players: 4,
        cards_per_player: 13,
        tableau_size: 0,
        starting_chips: 0,
        deal_to_tableau: 0,
    };
    // the all-hands-empty fallback settles a hand nobody ran away with
    let mut g = base(
        "Whist",
        setup,
        turns,
        vec![
            WinCondition::FirstToScore { threshold: 7 },
            WinCondition::AllHandsEmpty,
        ],
    );
    g.card_scoring = vec![ScoringRule {
        suit: ANY,
        rank: ANY,
        points: 1,
        trigger: ScoreTrigger::TrickWin,
    }];
    g
}

pub fn knockout_whist() -> Genome {
    let mut g = whist();
    g.name = "Knockout Whist".to_string();
    g.setup.cards_per_player = 7;
    g.win_conditions = vec![
        WinCondition::HighScore { threshold: 5 },
        WinCondition::AllHandsEmpty,
    ];
    if let Some(Phase::Trick(t)) = g.turn_structure.phases.first_mut() {
        t.trump_suit = Suit::Diamonds as u8;
    }
    g
}

fn match_suit_condition() -> Condition {
    Condition {
        op: Predicate::MatchSuit,
        cmp: Comparator::EQ,
        value: 1,
        reference: Some(Location::Discard),
    }
}

pub fn crazy_eights() -> Genome {
    let draw = Phase::Draw(DrawPhase {
        source: Location::Deck,
        count: 1,
        mandatory: false,
        condition: None,
    });
    let play = Phase::Play(PlayPhase {
        target: Location::Discard,
        min_cards: 1,
        max_cards: 1,
        mandatory: true,
        pass_if_unable: true,
        valid_play_condition: Some(match_suit_condition()),
    });
    let turns = turns(vec![draw, play], 500);
    let setup = Setup {
        num_players: 2,
        cards_per_player: 7,
        tableau_size: 0,
        starting_chips: 0,
        deal_to_tableau: 0,
    };
    let mut g = base("Crazy Eights", setup, turns, vec![WinCondition::EmptyHand]);
    g.effects = vec![EffectRule {
        trigger_rank: Rank::Eight as u8,
        effect: EffectKind::Wild,
        target: TargetSelect::Actor,
        value: 0,
    }];
    g
}

/// shed pairs, pull blind from the next hand
pub fn old_maid() -> Genome {
    let steal = Phase::Draw(DrawPhase {
        source: Location::OpponentHand,
        count: 1,
        mandatory: true,
        condition: Some(Condition {
            op: Predicate::LocSize,
            cmp: Comparator::GT,
            value: 0,
            reference: Some(Location::OpponentHand),
        }),
    });
    let shed = Phase::Play(PlayPhase {
        target: Location::Discard,
        min_cards: 2,
        max_cards: 2,
        mandatory: false,
        pass_if_unable: true,
        valid_play_condition: None,
    });
    let turns = turns(vec![steal, shed], 400);
    let setup = Setup {
        num_players: 4,
        cards_per_player: 12,
        tableau_size: 0,
        starting_chips: 0,
        deal_to_tableau: 0,
    };
    base("Old Maid", setup, turns, vec![WinCondition::EmptyHand])
}

/// climbing: beat the top of the pile or pass
pub fn president() -> Genome {
    let play = Phase::Play(PlayPhase {
        target: Location::Discard,
        min_cards: 1,
        max_cards: 4,
        mandatory: false,
        pass_if_unable: true,
        valid_play_condition: Some(Condition {
            op: Predicate::BeatsTop,
            cmp: Comparator::EQ,
            value: 1,
            reference: Some(Location::Discard),
        }),
    });
    let turns = turns(vec![play], 500);
    let setup = Setup {
        num_players: 4,
        cards_per_player: 13,
        tableau_size: 0,
        starting_chips: 0,
        deal_to_tableau: 0,
    };
    base("President", setup, turns, vec![WinCondition::EmptyHand])
}

pub fn fan_tan() -> Genome {
    let play = Phase::Play(PlayPhase {
        target: Location::Tableau,
        min_cards: 1,
        max_cards: 1,
        mandatory: true,
        pass_if_unable: true,
        valid_play_condition: None,
    });
    let mut turns = turns(vec![play], 400);
    turns.tableau_mode = TableauMode::Sequence;
    turns.sequence_direction = SequenceDirection::Both;
    let setup = Setup {
        num_players: 4,
        cards_per_player: 13,
        tableau_size: 4,
        starting_chips: 0,
        deal_to_tableau: 0,
    };
    base("Fan Tan", setup, turns, vec![WinCondition::EmptyHand])
}

pub fn uno_style() -> Genome {
    let mut g = crazy_eights();
    g.name = "Uno Style".to_string();
    g.setup.num_players = 4;
    g.effects = vec![
        EffectRule {
            trigger_rank: Rank::Jack as u8,
            effect: EffectKind::SkipNext,
            target: TargetSelect::NextPlayer,
            value: 1,
        },
        EffectRule {
            trigger_rank: Rank::Queen as u8,
            effect: EffectKind::Reverse,
            target: TargetSelect::Actor,
            value: 0,
        },
        EffectRule {
            trigger_rank: Rank::Two as u8,
            effect: EffectKind::DrawTwo,
            target: TargetSelect::NextPlayer,
            value: 2,
        },
        EffectRule {
            trigger_rank: Rank::Ace as u8,
            effect: EffectKind::Wild,
            target: TargetSelect::Actor,
            value: 0,
        },
    ];
    g
}

pub fn gin_rummy() -> Genome {
    let draw = Phase::Draw(DrawPhase {
        source: Location::Deck,
        count: 1,
        mandatory: true,
        condition: None,
    });
    let discard = Phase::Discard(DiscardPhase {
        target: Location::Discard,
        count: 1,
        mandatory: true,
    });
    let turns = turns(vec![draw, discard], 400);
    let setup = Setup {
        num_players: 2,
        cards_per_player: 10,
        tableau_size: 0,
        starting_chips: 0,
        deal_to_tableau: 0,
    };
    let mut g = base(
        "Gin Rummy",
        setup,
        turns,
        vec![WinCondition::FirstToScore { threshold: 25 }],
    );
    g.card_scoring = vec![ScoringRule {
        suit: ANY,
        rank: ANY,
        points: 5,
        trigger: ScoreTrigger::SetComplete,
    }];
    g
}

pub fn go_fish() -> Genome {
    // both draws are mandatory but conditioned, so a player is never
    // asked to stand in a game whose whole mechanic is drawing
    let fish = Phase::Draw(DrawPhase {
        source: Location::OpponentHand,
        count: 1,
        mandatory: true,
        condition: Some(Condition {
            op: Predicate::LocSize,
            cmp: Comparator::GT,
            value: 0,
            reference: Some(Location::OpponentHand),
        }),
    });
    let draw = Phase::Draw(DrawPhase {
        source: Location::Deck,
        count: 1,
        mandatory: true,
        condition: Some(Condition {
            op: Predicate::LocSize,
            cmp: Comparator::GT,
            value: 0,
            reference: Some(Location::Deck),
        }),
    });
    let turns = turns(vec![fish, draw], 400);
    let setup = Setup {
        num_players: 2,
        cards_per_player: 7,
        tableau_size: 0,
        starting_chips: 0,
        deal_to_tableau: 0,
    };
    let mut g = base(
        "Go Fish",
        setup,
        turns,
        vec![WinCondition::FirstToScore { threshold: 9 }],
    );
    g.card_scoring = vec![ScoringRule {
        suit: ANY,
        rank: ANY,
        points: 1,
        trigger: ScoreTrigger::SetComplete,
    }];
    g
}

fn poker_patterns() -> Vec<HandPattern> {
    vec![
        HandPattern {
            name: "flush".to_string(),
            required_count: 5,
            same_suit_count: 5,
            sequence_length: 0,
            allow_wrap: false,
            same_rank_groups: Vec::new(),
            required_ranks: Vec::new(),
        },
        HandPattern {
            name: "straight".to_string(),
            required_count: 5,
            same_suit_count: 0,
            sequence_length: 5,
            allow_wrap: false,
            same_rank_groups: Vec::new(),
            required_ranks: Vec::new(),
        },
        HandPattern {
            name: "three of a kind".to_string(),
            required_count: 3,
            same_suit_count: 0,
            sequence_length: 0,
            allow_wrap: false,
            same_rank_groups: vec![3],
            required_ranks: Vec::new(),
        },
        HandPattern {
            name: "two pair".to_string(),
            required_count: 4,
            same_suit_count: 0,
            sequence_length: 0,
            allow_wrap: false,
            same_rank_groups: vec![2, 2],
            required_ranks: Vec::new(),
        },
        HandPattern {
            name: "pair".to_string(),
            required_count: 2,
            same_suit_count: 0,
            sequence_length: 0,
            allow_wrap: false,
            same_rank_groups: vec![2],
            required_ranks: Vec::new(),
        },
        HandPattern {
            name: "high card".to_string(),
            required_count: 1,
            same_suit_count: 0,
            sequence_length: 0,
            allow_wrap: false,
            same_rank_groups: Vec::new(),
            required_ranks: Vec::new(),
        },
    ]
}

pub fn simple_poker() -> Genome {
    let draw = Phase::Draw(DrawPhase {
        source: Location::Deck,
        count: 1,
        mandatory: false,
        condition: None,
    });
    let betting = Phase::Betting(BettingPhase {
        min_bet: 10,
        max_raises: 3,
    });
    let turns = turns(vec![draw, betting], 100);
    let setup = Setup {
        num_players: 2,
        cards_per_player: 5,
        tableau_size: 0,
        starting_chips: 100,
        deal_to_tableau: 0,
    };
    let mut g = base("Simple Poker", setup, turns, vec![WinCondition::BestHand]);
    g.hand_eval = Some(HandEval::PatternMatch {
        patterns: poker_patterns(),
    });
    g
}

pub fn draw_poker() -> Genome {
    let betting = Phase::Betting(BettingPhase {
        min_bet: 10,
        max_raises: 3,
    });
    let discard = Phase::Discard(DiscardPhase {
        target: Location::Discard,
        count: 1,
        mandatory: false,
    });
    let draw = Phase::Draw(DrawPhase {
        source: Location::Deck,
        count: 1,
        mandatory: false,
        condition: None,
    });
    let turns = turns(vec![betting.clone(), discard, draw, betting], 150);
    let setup = Setup {
        num_players: 2,
        cards_per_player: 5,
        tableau_size: 0,
        starting_chips: 200,
        deal_to_tableau: 0,
    };
    let mut g = base("Draw Poker", setup, turns, vec![WinCondition::BestHand]);
    g.hand_eval = Some(HandEval::PatternMatch {
        patterns: poker_patterns(),
    });
    g
}

pub fn blackjack() -> Genome {
    let betting = Phase::Betting(BettingPhase {
        min_bet: 5,
        max_raises: 1,
    });
    let hit = Phase::Draw(DrawPhase {
        source: Location::Deck,
        count: 1,
        mandatory: false,
        condition: None,
    });
    let turns = turns(vec![betting, hit], 200);
    let setup = Setup {
        num_players: 2,
        cards_per_player: 2,
        tableau_size: 0,
        starting_chips: 100,
        deal_to_tableau: 0,
    };
    let mut g = base(
        "Blackjack",
        setup,
        turns,
        vec![WinCondition::HighScore { threshold: 100 }],
    );
    g.hand_eval = Some(HandEval::PointTotal {
        card_values: HandEval::standard_point_values(),
        target_value: 21,
        bust_threshold: 22,
    });
    g
}

pub fn cheat() -> Genome {
    let claim = Phase::Claim(ClaimPhase {});
    let draw = Phase::Draw(DrawPhase {
        source: Location::Deck,
        count: 1,
        mandatory: false,
        condition: Some(Condition {
            op: Predicate::LocSize,
            cmp: Comparator::GT,
            value: 0,
            reference: Some(Location::Deck),
        }),
    });
    let turns = turns(vec![claim, draw], 400);
    let setup = Setup {
        num_players: 4,
        cards_per_player: 13,
        tableau_size: 0,
        starting_chips: 0,
        deal_to_tableau: 0,
    };
    base("Cheat", setup, turns, vec![WinCondition::EmptyHand])
}

pub fn scopa() -> Genome {
    // an emptied hand tops itself up from the stock, one card per turn,
    // until the stock runs dry and most-captured settles it
    let replenish = Phase::Draw(DrawPhase {
        source: Location::Deck,
        count: 1,
        mandatory: true,
        condition: Some(Condition {
            op: Predicate::HandSize,
            cmp: Comparator::EQ,
            value: 0,
            reference: None,
        }),
    });
    let play = Phase::Play(PlayPhase {
        target: Location::Tableau,
        min_cards: 1,
        max_cards: 1,
        mandatory: true,
        pass_if_unable: false,
        valid_play_condition: None,
    });
    let mut turns = turns(vec![replenish, play], 300);
    turns.tableau_mode = TableauMode::MatchRank;
    let setup = Setup {
        num_players: 2,
        cards_per_player: 3,
        tableau_size: 4,
        starting_chips: 0,
        deal_to_tableau: 1,
    };
    let mut g = base("Scopa", setup, turns, vec![WinCondition::MostCaptured]);
    g.card_scoring = vec![ScoringRule {
        suit: ANY,
        rank: ANY,
        points: 1,
        trigger: ScoreTrigger::Capture,
    }];
    g
}

pub fn betting_war() -> Genome {
    let betting = Phase::Betting(BettingPhase {
        min_bet: 5,
        max_raises: 2,
    });
    let mut g = war();
    g.name = "Betting War".to_string();
    g.setup.starting_chips = 100;
    g.turn_structure.phases.insert(0, betting);
    g.turn_structure.max_turns = 600;
    g
}

use crate::cards::location::Location;
use crate::cards::rank::Rank;
use crate::cards::suit::Suit;
