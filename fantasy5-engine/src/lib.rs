//! Génération, filtrage et classement de combinaisons Fantasy 5 (5 numéros parmi 1-42).

pub mod combination;
pub mod cycler;
pub mod error;
pub mod filter;
pub mod frequency;
pub mod generator;
pub mod sampler;
pub mod score;
pub mod stats;

pub use combination::Combination;
pub use error::EngineError;
pub use filter::FilterConfig;
pub use frequency::{FrequencyTable, RankTable, Window};
pub use generator::{GenerationOutcome, GeneratorConfig, PredictionGenerator, ScoredCombination};
pub use score::ScoreConfig;
pub use stats::CombinationStats;
