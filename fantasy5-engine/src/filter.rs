use serde::{Deserialize, Serialize};

use fantasy5_db::models::Draw;

use crate::combination::Combination;
use crate::error::EngineError;

/// Seuils des règles d'équilibre. Valeur immuable passée à chaque appel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    pub max_seq2: usize,
    pub max_seq3: usize,
    pub max_mod_total: usize,
    /// Nombre maximal de restes modulo 10 partagés par plus de 2 numéros.
    pub max_mod_x: usize,
    pub max_per_decade: usize,
    pub max_overlap1: usize,
    pub max_overlap2: usize,
    pub max_overlap3: usize,
    pub sum_min: u32,
    pub sum_max: u32,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            max_seq2: 1,
            max_seq3: 0,
            max_mod_total: 2,
            max_mod_x: 0,
            max_per_decade: 2,
            max_overlap1: 1,
            max_overlap2: 2,
            max_overlap3: 3,
            sum_min: 80,
            sum_max: 120,
        }
    }
}

impl FilterConfig {
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.sum_min > self.sum_max {
            return Err(EngineError::InvalidConfig(format!(
                "somme minimale {} supérieure à la somme maximale {}",
                self.sum_min, self.sum_max
            )));
        }
        Ok(())
    }
}

/// Première règle violée par une combinaison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    Parity { even: usize },
    Sequence { seq2: usize, seq3: usize },
    Modular { total: usize, crowded: usize },
    Decade { band: usize, count: usize },
    Overlap { depth: usize, count: usize, max: usize },
    Sum { sum: u32 },
}

impl std::fmt::Display for Rejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Rejection::Parity { even } => {
                write!(f, "parité déséquilibrée ({} pairs / {} impairs)", even, 5 - even)
            }
            Rejection::Sequence { seq2, seq3 } => {
                write!(f, "suites consécutives ({seq2} paires, {seq3} triplets)")
            }
            Rejection::Modular { total, crowded } => {
                write!(f, "collisions modulo 10 (total {total}, restes saturés {crowded})")
            }
            Rejection::Decade { band, count } => {
                write!(f, "{count} numéros dans la tranche {}", DECADE_LABELS[*band])
            }
            Rejection::Overlap { depth, count, max } => {
                write!(f, "{count} numéros communs avec les {depth} derniers tirages (max {max})")
            }
            Rejection::Sum { sum } => write!(f, "somme {sum} hors plage"),
        }
    }
}

pub const DECADE_LABELS: [&str; 5] = ["1-9", "10-19", "20-29", "30-39", "40-42"];

type Rule = fn(&Combination, &[Draw], &FilterConfig) -> Option<Rejection>;

const RULES: [Rule; 8] = [
    parity_rule,
    sequence_rule,
    modular_rule,
    decade_rule,
    last_draw_rule,
    last_two_draws_rule,
    last_three_draws_rule,
    sum_rule,
];

fn parity_rule(combo: &Combination, _: &[Draw], _: &FilterConfig) -> Option<Rejection> {
    let even = combo.even_count();
    (!(2..=3).contains(&even)).then_some(Rejection::Parity { even })
}

fn sequence_rule(combo: &Combination, _: &[Draw], config: &FilterConfig) -> Option<Rejection> {
    let (seq2, seq3) = combo.sequential_runs();
    (seq2 > config.max_seq2 || seq3 > config.max_seq3).then_some(Rejection::Sequence { seq2, seq3 })
}

fn modular_rule(combo: &Combination, _: &[Draw], config: &FilterConfig) -> Option<Rejection> {
    let (total, crowded) = combo.modular_collisions();
    (total > config.max_mod_total || crowded > config.max_mod_x)
        .then_some(Rejection::Modular { total, crowded })
}

fn decade_rule(combo: &Combination, _: &[Draw], config: &FilterConfig) -> Option<Rejection> {
    combo
        .decade_distribution()
        .iter()
        .enumerate()
        .find(|&(_, &count)| count > config.max_per_decade)
        .map(|(band, &count)| Rejection::Decade { band, count })
}

/// Sans historique, aucun numéro commun : la règle ne rejette jamais.
fn overlap_rule(combo: &Combination, history: &[Draw], depth: usize, max: usize) -> Option<Rejection> {
    let count = combo.cumulative_overlap(history, depth);
    (count > max).then_some(Rejection::Overlap { depth, count, max })
}

fn last_draw_rule(combo: &Combination, history: &[Draw], config: &FilterConfig) -> Option<Rejection> {
    overlap_rule(combo, history, 1, config.max_overlap1)
}

fn last_two_draws_rule(combo: &Combination, history: &[Draw], config: &FilterConfig) -> Option<Rejection> {
    overlap_rule(combo, history, 2, config.max_overlap2)
}

fn last_three_draws_rule(combo: &Combination, history: &[Draw], config: &FilterConfig) -> Option<Rejection> {
    overlap_rule(combo, history, 3, config.max_overlap3)
}

fn sum_rule(combo: &Combination, _: &[Draw], config: &FilterConfig) -> Option<Rejection> {
    let sum = combo.sum();
    (!(config.sum_min..=config.sum_max).contains(&sum)).then_some(Rejection::Sum { sum })
}

/// Applique les règles dans l'ordre et s'arrête à la première violée.
/// `history` : draws[0] = le plus récent.
pub fn check(combo: &Combination, history: &[Draw], config: &FilterConfig) -> Result<(), Rejection> {
    match RULES.iter().find_map(|rule| rule(combo, history, config)) {
        Some(rejection) => Err(rejection),
        None => Ok(()),
    }
}

pub fn passes(combo: &Combination, history: &[Draw], config: &FilterConfig) -> bool {
    check(combo, history, config).is_ok()
}

/// Toutes les règles violées, sans court-circuit.
pub fn rejections(combo: &Combination, history: &[Draw], config: &FilterConfig) -> Vec<Rejection> {
    RULES
        .iter()
        .filter_map(|rule| rule(combo, history, config))
        .collect()
}
