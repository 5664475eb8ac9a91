use serde::Serialize;

use crate::combination::Combination;
use crate::error::EngineError;

/// Statistiques descriptives d'une combinaison.
///
/// Les « quartiles » sont les milieux des paires adjacentes de l'échantillon trié,
/// pas des quartiles statistiques. Variance et écart-type sont ceux de la population.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CombinationStats {
    pub mean: f64,
    pub median: f64,
    pub harmean: f64,
    pub geomean: f64,
    pub quart1: f64,
    pub quart2: f64,
    pub quart3: f64,
    pub stdev: f64,
    pub variance: f64,
    pub avedev: f64,
    /// Réservé, toujours 0.
    pub skew: f64,
    /// Réservé, toujours 0.
    pub kurt: f64,
}

impl CombinationStats {
    pub fn of(combo: &Combination) -> Result<Self, EngineError> {
        let values: Vec<f64> = combo.numbers().iter().map(|&n| n as f64).collect();
        describe(&values)
    }
}

fn undefined(statistic: &'static str, reason: impl Into<String>) -> EngineError {
    EngineError::StatisticsUndefined {
        statistic,
        reason: reason.into(),
    }
}

/// Calcule toutes les statistiques d'un échantillon d'au moins 4 valeurs strictement positives.
pub fn describe(values: &[f64]) -> Result<CombinationStats, EngineError> {
    if values.is_empty() {
        return Err(undefined("mean", "échantillon vide"));
    }
    if values.len() < 4 {
        return Err(undefined("quartiles", format!("{} valeurs, 4 requises", values.len())));
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n;
    let avedev = values.iter().map(|x| (x - mean).abs()).sum::<f64>() / n;

    Ok(CombinationStats {
        mean,
        median: median(&sorted),
        harmean: harmonic_mean(values)?,
        geomean: geometric_mean(values)?,
        quart1: (sorted[0] + sorted[1]) / 2.0,
        quart2: (sorted[1] + sorted[2]) / 2.0,
        quart3: (sorted[2] + sorted[3]) / 2.0,
        stdev: variance.sqrt(),
        variance,
        avedev,
        skew: 0.0,
        kurt: 0.0,
    })
}

/// `sorted` non vide et trié.
fn median(sorted: &[f64]) -> f64 {
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

pub fn harmonic_mean(values: &[f64]) -> Result<f64, EngineError> {
    if values.is_empty() {
        return Err(undefined("harmean", "échantillon vide"));
    }
    if let Some(x) = values.iter().find(|&&x| x <= 0.0) {
        return Err(undefined("harmean", format!("valeur non positive {x}")));
    }
    Ok(values.len() as f64 / values.iter().map(|x| 1.0 / x).sum::<f64>())
}

pub fn geometric_mean(values: &[f64]) -> Result<f64, EngineError> {
    if values.is_empty() {
        return Err(undefined("geomean", "échantillon vide"));
    }
    if let Some(x) = values.iter().find(|&&x| x <= 0.0) {
        return Err(undefined("geomean", format!("valeur non positive {x}")));
    }
    let mean_log = values.iter().map(|x| x.ln()).sum::<f64>() / values.len() as f64;
    Ok(mean_log.exp())
}
