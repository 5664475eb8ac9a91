use anyhow::{Context, Result};
use fantasy5_db::rusqlite::Connection;
use serde::Deserialize;
use std::path::Path;

use fantasy5_db::db::insert_draw;
use fantasy5_db::models::{Draw, parse_date};

/// Ligne du fichier d'historique : `date,b1,b2,b3,b4,b5` (colonnes en trop ignorées).
#[derive(Debug, Deserialize)]
struct DrawRecord {
    date: String,
    b1: u8,
    b2: u8,
    b3: u8,
    b4: u8,
    b5: u8,
}

impl DrawRecord {
    fn into_draw(self) -> Result<Draw> {
        let date = parse_date(&self.date)?;
        Draw::new(date, [self.b1, self.b2, self.b3, self.b4, self.b5])
    }
}

pub struct ImportResult {
    pub total_records: u32,
    pub inserted: u32,
    pub skipped: u32,
    pub errors: u32,
}

pub fn import_csv(conn: &Connection, path: &Path) -> Result<ImportResult> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("Impossible d'ouvrir {:?}", path))?;

    let tx = conn.unchecked_transaction()
        .context("Impossible de démarrer la transaction")?;

    let mut result = ImportResult {
        total_records: 0,
        inserted: 0,
        skipped: 0,
        errors: 0,
    };

    for record in reader.deserialize::<DrawRecord>() {
        result.total_records += 1;
        let draw = match record.map_err(anyhow::Error::from).and_then(DrawRecord::into_draw) {
            Ok(draw) => draw,
            Err(e) => {
                log::warn!("Ligne {} ignorée : {:#}", result.total_records, e);
                result.errors += 1;
                continue;
            }
        };
        match insert_draw(&tx, &draw) {
            Ok(true) => result.inserted += 1,
            Ok(false) => result.skipped += 1,
            Err(e) => {
                log::warn!("Erreur insertion tirage {}: {:#}", result.total_records, e);
                result.errors += 1;
            }
        }
    }

    tx.commit().context("Échec du commit")?;
    Ok(result)
}
