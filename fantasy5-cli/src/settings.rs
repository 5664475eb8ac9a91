use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use fantasy5_engine::{FilterConfig, GeneratorConfig, ScoreConfig};

pub const SETTINGS_FILE: &str = "fantasy5_settings.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub filters: FilterConfig,
    pub scoring: ScoreConfig,
    pub generator: GeneratorConfig,
    pub num_predictions: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            filters: FilterConfig::default(),
            scoring: ScoreConfig::default(),
            generator: GeneratorConfig::default(),
            num_predictions: 10,
        }
    }
}

pub fn save_settings(settings: &Settings, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(settings)?;
    std::fs::write(path, json)
        .with_context(|| format!("Impossible d'écrire {:?}", path))?;
    Ok(())
}

pub fn load_settings(path: &Path) -> Result<Settings> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Impossible de lire {:?}", path))?;
    let settings: Settings = serde_json::from_str(&json)
        .with_context(|| format!("JSON invalide dans {:?}", path))?;
    Ok(settings)
}

/// Réglages du fichier s'il existe, sinon valeurs par défaut.
pub fn load_or_default(path: &Path) -> Settings {
    if !path.exists() {
        log::debug!("Pas de fichier {:?}, réglages par défaut", path);
        return Settings::default();
    }
    match load_settings(path) {
        Ok(settings) => {
            log::info!("Réglages chargés depuis {:?}", path);
            settings
        }
        Err(e) => {
            log::warn!("{e:#} ; réglages par défaut utilisés");
            Settings::default()
        }
    }
}
