use anyhow::{Context, Result, bail};
use std::path::Path;

use fantasy5_db::models::universe_size;
use fantasy5_engine::FrequencyTable;

/// Lit un fichier de comptages (ligne d'en-tête puis une ligne de 42 entiers).
/// Fichier absent ou mal formé : table par défaut, sans échec.
pub fn load_rank_counts(path: &Path) -> FrequencyTable {
    match read_rank_counts(path) {
        Ok(table) => {
            log::info!("{} comptages chargés depuis {:?}", table.len(), path);
            table
        }
        Err(e) => {
            log::warn!("{e:#} ; table de comptages par défaut utilisée");
            FrequencyTable::default_seed()
        }
    }
}

fn read_rank_counts(path: &Path) -> Result<FrequencyTable> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("Impossible d'ouvrir {:?}", path))?;

    let record = reader
        .records()
        .next()
        .with_context(|| format!("Aucune ligne de données dans {:?}", path))??;

    let counts = record
        .iter()
        .map(|s| {
            s.trim()
                .parse::<u32>()
                .with_context(|| format!("Comptage invalide '{}' dans {:?}", s, path))
        })
        .collect::<Result<Vec<_>>>()?;

    let table = FrequencyTable::from_counts(counts);
    if !table.covers_universe() {
        bail!("{} comptages dans {:?} au lieu de {}", table.len(), path, universe_size());
    }
    Ok(table)
}
