use serde::{Deserialize, Serialize};

use fantasy5_db::models::PICK_COUNT;

use crate::combination::Combination;
use crate::error::EngineError;
use crate::frequency::{MAX_RANK, RankTable};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreWeights {
    pub rank: f64,
    pub sum: f64,
    pub even_odd: f64,
    pub decade: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            rank: 0.35,
            sum: 0.25,
            even_odd: 0.15,
            decade: 0.25,
        }
    }
}

impl ScoreWeights {
    pub fn total(&self) -> f64 {
        self.rank + self.sum + self.even_odd + self.decade
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreConfig {
    /// Somme de référence ; constante réglable, non dérivée de l'historique.
    pub target_sum: f64,
    /// Écart maximal pris en compte dans la pénalité de somme.
    pub sum_tolerance: f64,
    pub sum_penalty: f64,
    pub weights: ScoreWeights,
}

impl Default for ScoreConfig {
    fn default() -> Self {
        Self {
            target_sum: 100.0,
            sum_tolerance: 30.0,
            sum_penalty: 3.33,
            weights: ScoreWeights::default(),
        }
    }
}

impl ScoreConfig {
    pub fn validate(&self) -> Result<(), EngineError> {
        let total = self.weights.total();
        if (total - 1.0).abs() > 1e-9 {
            return Err(EngineError::InvalidConfig(format!(
                "la somme des poids vaut {total:.4} au lieu de 1"
            )));
        }
        Ok(())
    }
}

/// Détail des sous-scores, chacun nominalement sur 100.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreBreakdown {
    pub rank: f64,
    pub sum: f64,
    pub even_odd: f64,
    pub decade: f64,
    pub composite: f64,
}

/// Plus la somme des rangs est basse (numéros fréquents), plus le score est haut.
pub fn rank_score(combo: &Combination, ranks: &RankTable) -> f64 {
    let max_sum = (MAX_RANK as usize * PICK_COUNT) as f64;
    100.0 - ranks.rank_sum(combo) as f64 / max_sum * 100.0
}

pub fn sum_score(combo: &Combination, config: &ScoreConfig) -> f64 {
    let distance = (combo.sum() as f64 - config.target_sum).abs();
    100.0 - distance.min(config.sum_tolerance) * config.sum_penalty
}

pub fn even_odd_score(combo: &Combination) -> f64 {
    100.0 - (combo.even_count() as f64 - PICK_COUNT as f64 / 2.0).abs() * 20.0
}

pub fn decade_score(combo: &Combination) -> f64 {
    let bands = combo.decade_distribution();
    let mut score = 80.0;
    if bands.iter().any(|&c| c > 3) {
        score -= 20.0;
    }
    if bands.iter().any(|&c| c == 0) {
        score -= 20.0;
    }
    score
}

pub fn breakdown(combo: &Combination, ranks: &RankTable, config: &ScoreConfig) -> ScoreBreakdown {
    let w = &config.weights;
    let rank = rank_score(combo, ranks);
    let sum = sum_score(combo, config);
    let even_odd = even_odd_score(combo);
    let decade = decade_score(combo);
    ScoreBreakdown {
        rank,
        sum,
        even_odd,
        decade,
        composite: rank * w.rank + sum * w.sum + even_odd * w.even_odd + decade * w.decade,
    }
}

/// Score composite pondéré, nominalement entre 0 et 100.
pub fn score(combo: &Combination, ranks: &RankTable, config: &ScoreConfig) -> f64 {
    breakdown(combo, ranks, config).composite
}
