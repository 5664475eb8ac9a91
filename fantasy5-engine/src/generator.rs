use std::collections::HashSet;

use chrono::NaiveDate;
use rand::Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use fantasy5_db::models::{Draw, PICK_COUNT, universe_size};

use crate::combination::{Combination, DECADE_BANDS, IndexCombinations, decade_band};
use crate::cycler::Cycler;
use crate::error::EngineError;
use crate::filter::{self, FilterConfig};
use crate::frequency::{FrequencyTable, RankTable, Window, frequency, rank};
use crate::sampler::{inverse_frequency_weights, sample_without_replacement};
use crate::score::{ScoreConfig, score};
use crate::stats::CombinationStats;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub window: Window,
    /// Taille du sous-univers énuméré en phase A (les mieux classés).
    pub pool_size: usize,
    /// Nombre de survivants visés = `oversample × count`.
    pub oversample: usize,
    /// Plafond de tentatives de la phase B.
    pub max_attempts: usize,
    /// Phase B : impose la plus petite boule par rotation sur l'historique.
    pub col1_rotation: bool,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            window: Window::default(),
            pool_size: 15,
            oversample: 2,
            max_attempts: 10_000,
            col1_rotation: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredCombination {
    pub combination: Combination,
    pub sum: u32,
    pub score: f64,
    pub stats: CombinationStats,
}

#[derive(Debug, Clone)]
pub struct GenerationOutcome {
    /// Triées par score décroissant, au plus `count`.
    pub predictions: Vec<ScoredCombination>,
    pub phase_a_survivors: usize,
    pub phase_b_survivors: usize,
    pub phase_b_attempts: usize,
}

pub struct PredictionGenerator {
    filters: FilterConfig,
    scoring: ScoreConfig,
    config: GeneratorConfig,
    frequency_override: Option<FrequencyTable>,
}

impl PredictionGenerator {
    pub fn new(filters: FilterConfig, scoring: ScoreConfig, config: GeneratorConfig) -> Result<Self, EngineError> {
        filters.validate()?;
        scoring.validate()?;
        if config.pool_size < PICK_COUNT {
            return Err(EngineError::InvalidConfig(format!(
                "sous-univers de {} numéros, {} au minimum",
                config.pool_size, PICK_COUNT
            )));
        }
        Ok(Self {
            filters,
            scoring,
            config,
            frequency_override: None,
        })
    }

    /// Table précalculée prioritaire sur le calcul à partir de l'historique.
    /// Une table qui ne couvre pas l'univers est remplacée par la table par défaut.
    pub fn with_frequency_override(mut self, table: FrequencyTable) -> Self {
        let table = if table.covers_universe() {
            table
        } else {
            log::warn!(
                "Table de {} comptages pour {} numéros ; table par défaut utilisée",
                table.len(),
                universe_size()
            );
            FrequencyTable::default_seed()
        };
        self.frequency_override = Some(table);
        self
    }

    pub fn filters(&self) -> &FilterConfig {
        &self.filters
    }

    pub fn frequency_table(&self, history: &[Draw], today: NaiveDate) -> FrequencyTable {
        match &self.frequency_override {
            Some(table) => table.clone(),
            None => frequency(history, self.config.window, today),
        }
    }

    /// `history` : draws[0] = le plus récent. Une liste plus courte que `count`
    /// signifie que les filtres sont trop stricts, pas une erreur.
    pub fn generate<R: Rng + ?Sized>(
        &self,
        history: &[Draw],
        today: NaiveDate,
        count: usize,
        rng: &mut R,
    ) -> Result<GenerationOutcome, EngineError> {
        if count == 0 {
            return Ok(GenerationOutcome {
                predictions: Vec::new(),
                phase_a_survivors: 0,
                phase_b_survivors: 0,
                phase_b_attempts: 0,
            });
        }

        let table = self.frequency_table(history, today);
        let ranks = rank(&table);
        let target = count.saturating_mul(self.config.oversample.max(1));

        let mut survivors = self.phase_a(history, &ranks, target)?;
        let phase_a_survivors = survivors.len();
        log::info!("Phase A : {phase_a_survivors} combinaisons retenues (objectif {target})");

        let mut phase_b_attempts = 0;
        if survivors.len() < count {
            phase_b_attempts = self.phase_b(history, &table, target, &mut survivors, rng)?;
            log::info!(
                "Phase B : {} combinaisons retenues en {} tentatives",
                survivors.len() - phase_a_survivors,
                phase_b_attempts
            );
        }
        let phase_b_survivors = survivors.len() - phase_a_survivors;

        let mut predictions = survivors
            .into_iter()
            .map(|combination| -> Result<ScoredCombination, EngineError> {
                Ok(ScoredCombination {
                    sum: combination.sum(),
                    score: score(&combination, &ranks, &self.scoring),
                    stats: CombinationStats::of(&combination)?,
                    combination,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        predictions.sort_by(|a, b| b.score.total_cmp(&a.score));
        predictions.truncate(count);

        if predictions.len() < count {
            log::warn!("Seulement {} combinaisons sur {} demandées", predictions.len(), count);
        }

        Ok(GenerationOutcome {
            predictions,
            phase_a_survivors,
            phase_b_survivors,
            phase_b_attempts,
        })
    }

    /// Énumération exhaustive des combinaisons des mieux classés, en ordre lexicographique.
    fn phase_a(&self, history: &[Draw], ranks: &RankTable, target: usize) -> Result<Vec<Combination>, EngineError> {
        let pool = ranks.best(self.config.pool_size);
        let candidates = IndexCombinations::new(pool.len(), PICK_COUNT)
            .map(|indices| {
                let mut numbers = [0u8; PICK_COUNT];
                for (slot, &i) in numbers.iter_mut().zip(&indices) {
                    *slot = pool[i];
                }
                Combination::new(numbers)
            })
            .collect::<Result<Vec<_>, _>>()?;

        // collect conserve l'ordre d'énumération
        let mut survivors: Vec<Combination> = candidates
            .par_iter()
            .filter(|c| filter::passes(c, history, &self.filters))
            .copied()
            .collect();
        survivors.truncate(target);
        Ok(survivors)
    }

    /// Échantillonnage pondéré sur l'univers complet. Retourne le nombre de tentatives.
    fn phase_b<R: Rng + ?Sized>(
        &self,
        history: &[Draw],
        table: &FrequencyTable,
        target: usize,
        survivors: &mut Vec<Combination>,
        rng: &mut R,
    ) -> Result<usize, EngineError> {
        let weights = inverse_frequency_weights(table);
        let mut rotation = if self.config.col1_rotation {
            Col1Rotation::from_history(history)
        } else {
            None
        };
        let mut seen: HashSet<Combination> = survivors.iter().copied().collect();
        let mut attempts = 0;

        while survivors.len() < target && attempts < self.config.max_attempts {
            attempts += 1;

            let numbers = match rotation.as_mut() {
                Some(rot) => sample_with_first(rot.next_first(), &weights, rng)?,
                None => sample_without_replacement(&weights, PICK_COUNT, rng)?,
            };
            let combo = Combination::from_slice(&numbers)?;

            if !seen.insert(combo) {
                continue;
            }
            if filter::passes(&combo, history, &self.filters) {
                survivors.push(combo);
            }
        }

        Ok(attempts)
    }
}

/// Tire les 4 autres numéros parmi ceux strictement supérieurs à `first`.
fn sample_with_first<R: Rng + ?Sized>(first: u8, weights: &[(u8, f64)], rng: &mut R) -> Result<Vec<u8>, EngineError> {
    let above: Vec<(u8, f64)> = weights.iter().copied().filter(|&(n, _)| n > first).collect();
    if above.len() < PICK_COUNT - 1 {
        return sample_without_replacement(weights, PICK_COUNT, rng);
    }
    let mut numbers = vec![first];
    numbers.extend(sample_without_replacement(&above, PICK_COUNT - 1, rng)?);
    Ok(numbers)
}

/// Rotation sur les plus petites boules historiques, regroupées par tranche de dizaines.
struct Col1Rotation {
    bands: Cycler<usize>,
    values: Vec<Option<Cycler<u8>>>,
}

impl Col1Rotation {
    /// `None` sans historique.
    fn from_history(history: &[Draw]) -> Option<Self> {
        let mut lists: Vec<Vec<u8>> = vec![Vec::new(); DECADE_BANDS];
        for draw in history {
            let Some(&first) = draw.balls.iter().min() else { continue };
            let list = &mut lists[decade_band(first)];
            if !list.contains(&first) {
                list.push(first);
            }
        }

        let keys: Vec<usize> = (0..DECADE_BANDS).filter(|&b| !lists[b].is_empty()).collect();
        Some(Self {
            bands: Cycler::new(keys)?,
            values: lists.into_iter().map(Cycler::new).collect(),
        })
    }

    fn next_first(&mut self) -> u8 {
        loop {
            let band = self.bands.next_item();
            if let Some(values) = self.values[band].as_mut() {
                return values.next_item();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn draw(d: &str, balls: [u8; 5]) -> Draw {
        Draw { date: date(d), balls }
    }

    fn history() -> Vec<Draw> {
        vec![
            draw("2024-01-10", [3, 14, 22, 30, 41]),
            draw("2024-01-09", [7, 12, 25, 33, 38]),
            draw("2024-01-08", [1, 9, 18, 27, 36]),
            draw("2024-01-07", [4, 15, 21, 29, 40]),
            draw("2024-01-06", [2, 11, 19, 26, 35]),
            draw("2024-01-05", [6, 13, 24, 31, 42]),
            draw("2023-06-01", [5, 10, 20, 32, 39]),
        ]
    }

    fn generator(config: GeneratorConfig) -> PredictionGenerator {
        PredictionGenerator::new(FilterConfig::default(), ScoreConfig::default(), config).unwrap()
    }

    #[test]
    fn test_generate_sorted_unique_and_filtered() {
        let history = history();
        let generator = generator(GeneratorConfig::default());
        let mut rng = StdRng::seed_from_u64(42);
        let outcome = generator.generate(&history, date("2024-01-11"), 10, &mut rng).unwrap();

        let preds = &outcome.predictions;
        assert!(preds.len() <= 10);
        assert!(!preds.is_empty());
        assert!(preds.windows(2).all(|w| w[0].score >= w[1].score));

        let unique: HashSet<Combination> = preds.iter().map(|p| p.combination).collect();
        assert_eq!(unique.len(), preds.len());

        for p in preds {
            assert!(filter::passes(&p.combination, &history, generator.filters()));
            assert_eq!(p.sum, p.combination.sum());
            assert!((p.stats.mean - p.sum as f64 / 5.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_generate_is_reproducible_with_seed() {
        let history = history();
        let generator = generator(GeneratorConfig::default());
        let today = date("2024-01-11");
        let a = generator.generate(&history, today, 8, &mut StdRng::seed_from_u64(99)).unwrap();
        let b = generator.generate(&history, today, 8, &mut StdRng::seed_from_u64(99)).unwrap();
        assert_eq!(a.predictions, b.predictions);
        assert_eq!(a.phase_b_attempts, b.phase_b_attempts);
    }

    #[test]
    fn test_phase_a_only_when_it_suffices() {
        // Sans historique les rangs suivent l'ordre numérique : 1..=15 énumérés
        let filters = FilterConfig {
            sum_min: 0,
            max_per_decade: 3,
            ..FilterConfig::default()
        };
        let config = GeneratorConfig {
            window: Window::Draws(0),
            ..GeneratorConfig::default()
        };
        let generator = PredictionGenerator::new(filters, ScoreConfig::default(), config).unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        let outcome = generator.generate(&[], date("2024-01-11"), 1, &mut rng).unwrap();
        assert_eq!(outcome.phase_a_survivors, 2);
        assert_eq!(outcome.phase_b_attempts, 0);
        assert_eq!(outcome.predictions.len(), 1);
        assert!(outcome.predictions[0].combination.numbers().iter().all(|&n| n <= 15));
    }

    #[test]
    fn test_phase_b_dedups_across_phases() {
        // Seuls 3-14-22-30-41 sont comptés : Phase A n'a qu'un candidat, qui passe
        let favoured = Combination::new([3, 14, 22, 30, 41]).unwrap();
        let mut counts = vec![0; 42];
        for &n in favoured.numbers() {
            counts[n as usize - 1] = 10;
        }
        let config = GeneratorConfig {
            pool_size: 5,
            oversample: 1,
            ..GeneratorConfig::default()
        };
        let generator = generator(config).with_frequency_override(FrequencyTable::from_counts(counts));
        let mut rng = StdRng::seed_from_u64(5);
        let outcome = generator.generate(&[], date("2024-01-11"), 10, &mut rng).unwrap();

        assert_eq!(outcome.phase_a_survivors, 1);
        assert!(outcome.phase_b_survivors > 0);
        assert_eq!(outcome.predictions.len(), 10);

        let unique: HashSet<Combination> = outcome.predictions.iter().map(|p| p.combination).collect();
        assert_eq!(unique.len(), outcome.predictions.len());
        assert!(unique.contains(&favoured));
    }

    #[test]
    fn test_wrong_length_override_falls_back_to_default() {
        let mut counts = vec![1; 43];
        counts[42] = 50;
        let generator = generator(GeneratorConfig::default()).with_frequency_override(FrequencyTable::from_counts(counts));
        let today = date("2024-01-11");
        assert_eq!(generator.frequency_table(&[], today), FrequencyTable::default_seed());

        let mut rng = StdRng::seed_from_u64(7);
        let outcome = generator.generate(&history(), today, 5, &mut rng).unwrap();
        assert!(outcome.predictions.iter().all(|p| p.combination.numbers().iter().all(|&n| n <= 42)));

        let oversized = self::generator(GeneratorConfig::default()).with_frequency_override(FrequencyTable::from_counts(vec![1; 300]));
        assert_eq!(oversized.frequency_table(&[], today), FrequencyTable::default_seed());
    }

    #[test]
    fn test_extreme_count_does_not_overflow_target() {
        let filters = FilterConfig { sum_min: 500, sum_max: 600, ..FilterConfig::default() };
        let config = GeneratorConfig { max_attempts: 10, ..GeneratorConfig::default() };
        let generator = PredictionGenerator::new(filters, ScoreConfig::default(), config).unwrap();
        let mut rng = StdRng::seed_from_u64(3);
        let outcome = generator.generate(&history(), date("2024-01-11"), usize::MAX, &mut rng).unwrap();
        assert!(outcome.predictions.is_empty());
        assert_eq!(outcome.phase_b_attempts, 10);
    }

    #[test]
    fn test_impossible_filters_terminate_with_short_result() {
        let filters = FilterConfig {
            sum_min: 500,
            sum_max: 600,
            ..FilterConfig::default()
        };
        let config = GeneratorConfig {
            max_attempts: 500,
            ..GeneratorConfig::default()
        };
        let generator = PredictionGenerator::new(filters, ScoreConfig::default(), config).unwrap();
        let mut rng = StdRng::seed_from_u64(3);
        let outcome = generator.generate(&history(), date("2024-01-11"), 5, &mut rng).unwrap();
        assert!(outcome.predictions.is_empty());
        assert_eq!(outcome.phase_a_survivors, 0);
        assert_eq!(outcome.phase_b_attempts, 500);
    }

    #[test]
    fn test_zero_count() {
        let generator = generator(GeneratorConfig::default());
        let mut rng = StdRng::seed_from_u64(3);
        let outcome = generator.generate(&history(), date("2024-01-11"), 0, &mut rng).unwrap();
        assert!(outcome.predictions.is_empty());
        assert_eq!(outcome.phase_b_attempts, 0);
    }

    #[test]
    fn test_frequency_override_takes_priority() {
        let generator = generator(GeneratorConfig::default()).with_frequency_override(FrequencyTable::default_seed());
        let table = generator.frequency_table(&history(), date("2024-01-11"));
        assert_eq!(table, FrequencyTable::default_seed());

        let plain = self::generator(GeneratorConfig::default());
        assert_ne!(plain.frequency_table(&history(), date("2024-01-11")), table);
    }

    #[test]
    fn test_col1_rotation_pins_historical_first_balls() {
        let history = history();
        let generator = generator(GeneratorConfig {
            col1_rotation: true,
            pool_size: 5,
            ..GeneratorConfig::default()
        });
        let mut rng = StdRng::seed_from_u64(11);
        let outcome = generator.generate(&history, date("2024-01-11"), 6, &mut rng).unwrap();
        assert!(outcome.phase_b_attempts > 0);

        let firsts: Vec<u8> = history.iter().map(|d| d.balls[0]).collect();
        for p in outcome.predictions {
            assert!(firsts.contains(&p.combination.numbers()[0]), "{}", p.combination);
        }
    }

    #[test]
    fn test_col1_rotation_cycles_bands() {
        let history = vec![
            draw("2024-01-03", [3, 14, 22, 30, 41]),
            draw("2024-01-02", [12, 19, 25, 33, 38]),
            draw("2024-01-01", [7, 18, 27, 36, 40]),
        ];
        let mut rotation = Col1Rotation::from_history(&history).unwrap();
        let firsts: Vec<u8> = (0..4).map(|_| rotation.next_first()).collect();
        assert_eq!(firsts, vec![3, 12, 7, 12]);
        assert!(Col1Rotation::from_history(&[]).is_none());
    }

    #[test]
    fn test_invalid_configs_rejected() {
        let bad_pool = GeneratorConfig { pool_size: 4, ..GeneratorConfig::default() };
        assert!(PredictionGenerator::new(FilterConfig::default(), ScoreConfig::default(), bad_pool).is_err());

        let bad_sum = FilterConfig { sum_min: 200, sum_max: 100, ..FilterConfig::default() };
        assert!(PredictionGenerator::new(bad_sum, ScoreConfig::default(), GeneratorConfig::default()).is_err());
    }
}
