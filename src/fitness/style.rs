use serde::Deserialize;
use serde::Serialize;

/// named weight vectors over the nine subscores. whatever the raw
/// weights, they are normalized to sum to one before use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FitnessStyle {
    Balanced,
    Strategic,
    Bluffing,
    Party,
    TrickTaking,
}

/// subscore order: decision density, comeback, tension, interaction,
/// simplicity, session length, skill-vs-luck, bluffing, betting
pub const SUBSCORES: usize = 9;

impl FitnessStyle {
    pub fn weights(&self) -> [f64; SUBSCORES] {
        let raw: [f64; SUBSCORES] = match self {
            FitnessStyle::Balanced => [1.0; SUBSCORES],
            FitnessStyle::Strategic => [0.20, 0.08, 0.10, 0.10, 0.05, 0.10, 0.27, 0.05, 0.05],
            FitnessStyle::Bluffing => [0.08, 0.05, 0.15, 0.07, 0.05, 0.05, 0.05, 0.30, 0.20],
            FitnessStyle::Party => [0.05, 0.12, 0.16, 0.20, 0.25, 0.12, 0.05, 0.03, 0.02],
            FitnessStyle::TrickTaking => [0.20, 0.10, 0.15, 0.15, 0.08, 0.07, 0.20, 0.03, 0.02],
        };
        let sum: f64 = raw.iter().sum();
        let mut weights = raw;
        for w in weights.iter_mut() {
            *w /= sum;
        }
        weights
    }

    pub fn parse(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "balanced" => Some(FitnessStyle::Balanced),
            "strategic" => Some(FitnessStyle::Strategic),
            "bluffing" => Some(FitnessStyle::Bluffing),
            "party" => Some(FitnessStyle::Party),
            "trick_taking" | "tricktaking" => Some(FitnessStyle::TrickTaking),
            _ => None,
        }
    }
}

impl std::fmt::Display for FitnessStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            FitnessStyle::Balanced => write!(f, "balanced"),
            FitnessStyle::Strategic => write!(f, "strategic"),
            FitnessStyle::Bluffing => write!(f, "bluffing"),
            FitnessStyle::Party => write!(f, "party"),
            FitnessStyle::TrickTaking => write!(f, "trick_taking"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_style_normalizes() {
        for style in [
            FitnessStyle::Balanced,
            FitnessStyle::Strategic,
            FitnessStyle::Bluffing,
            FitnessStyle::Party,
            FitnessStyle::TrickTaking,
        ] {
            let sum: f64 = style.weights().iter().sum();
            assert!((sum - 1.0).abs() < 1e-9, "{} sums to {}", style, sum);
        }
    }

    #[test]
    fn parse_round_trips_display() {
        for style in [FitnessStyle::Balanced, FitnessStyle::TrickTaking] {
            assert!(FitnessStyle::parse(&style.to_string()) == Some(style));
        }
        assert!(FitnessStyle::parse("speedrun").is_none());
    }
}
