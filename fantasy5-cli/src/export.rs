use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;
use std::path::{Path, PathBuf};

use fantasy5_engine::ScoredCombination;

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct PredictionRow {
    prediction: usize,
    ball1: u8,
    ball2: u8,
    ball3: u8,
    ball4: u8,
    ball5: u8,
    sum: u32,
    score: f64,
    mean: f64,
    median: f64,
    std_dev: f64,
    generated: String,
}

pub fn default_export_path(today: NaiveDate) -> PathBuf {
    PathBuf::from(format!("ga_f5_predictions_{}.csv", today.format("%Y%m%d")))
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

pub fn save_predictions(predictions: &[ScoredCombination], path: &Path, generated: NaiveDateTime) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Impossible de créer {:?}", path))?;
    let generated = generated.format("%Y-%m-%d %H:%M:%S").to_string();

    for (i, pred) in predictions.iter().enumerate() {
        let b = pred.combination.numbers();
        writer.serialize(PredictionRow {
            prediction: i + 1,
            ball1: b[0],
            ball2: b[1],
            ball3: b[2],
            ball4: b[3],
            ball5: b[4],
            sum: pred.sum,
            score: round2(pred.score),
            mean: round2(pred.stats.mean),
            median: round2(pred.stats.median),
            std_dev: round2(pred.stats.stdev),
            generated: generated.clone(),
        })?;
    }

    writer.flush().context("Échec de l'écriture du CSV")?;
    Ok(())
}
