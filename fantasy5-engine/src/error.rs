//! Erreurs du moteur de génération.

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum EngineError {
    /// Combinaison mal formée : mauvais nombre de boules, hors univers ou doublon.
    #[error("combinaison invalide {numbers:?} : {reason}")]
    InvalidCombination { numbers: Vec<u8>, reason: String },

    /// Statistique non définie pour l'échantillon fourni.
    #[error("statistique « {statistic} » non définie : {reason}")]
    StatisticsUndefined {
        statistic: &'static str,
        reason: String,
    },

    /// Paramétrage incohérent (bornes inversées, poids ne sommant pas à 1...).
    #[error("configuration invalide : {0}")]
    InvalidConfig(String),

    /// Échec de l'échantillonnage pondéré.
    #[error("échantillonnage impossible : {0}")]
    Sampling(String),
}
