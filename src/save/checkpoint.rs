//! the engine snapshot: everything needed to stop a run and pick it
//! back up, as one JSON object behind an atomic writer.

use super::writer;
use crate::evolution::EvolutionConfig;
use crate::evolution::GenStats;
use crate::evolution::Individual;
use anyhow::bail;
use anyhow::Context;
use anyhow::Result;
use serde::Deserialize;
use serde::Serialize;
use std::path::Path;

pub const CHECKPOINT_VERSION: &str = "1.0";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Checkpoint {
    pub config: EvolutionConfig,
    pub generation: usize,
    pub population: Vec<Individual>,
    pub best_ever: Option<Individual>,
    pub stats_history: Vec<GenStats>,
    pub timestamp: u64,
    pub rng_seed: u64,
    pub version: String,
}

impl Checkpoint {
    pub fn save(&self, path: &Path) -> Result<()> {
        let body = serde_json::to_vec(self).context("serialize checkpoint")?;
        writer::write_atomic(path, &body)
            .with_context(|| format!("checkpoint {}", path.display()))
    }

    pub fn load(path: &Path) -> Result<Checkpoint> {
        let body = std::fs::read_to_string(path)
            .with_context(|| format!("read checkpoint {}", path.display()))?;
        let checkpoint: Checkpoint = serde_json::from_str(&body)
            .with_context(|| format!("parse checkpoint {}", path.display()))?;
        if checkpoint.version != CHECKPOINT_VERSION {
            bail!(
                "checkpoint {} is version {:?}, this build reads {:?}",
                path.display(),
                checkpoint.version,
                CHECKPOINT_VERSION
            );
        }
        Ok(checkpoint)
    }
}
