use chrono::{Datelike, NaiveDate};
use rand::Rng;
use rand::distr::weighted::WeightedIndex;
use rand::prelude::Distribution;

use fantasy5_db::models::universe;

use crate::error::EngineError;
use crate::frequency::FrequencyTable;

/// Seed déterministe basé sur une date (AAAAMMJJ).
pub fn seed_for(date: NaiveDate) -> u64 {
    let y = date.year() as u64;
    let m = date.month() as u64;
    let d = date.day() as u64;
    y * 10_000 + m * 100 + d
}

/// Seed du jour.
pub fn date_seed() -> u64 {
    seed_for(chrono::Local::now().date_naive())
}

/// Poids `1 / (fréquence + 1)` : les numéros rares sont favorisés.
pub fn inverse_frequency_weights(table: &FrequencyTable) -> Vec<(u8, f64)> {
    universe()
        .map(|n| (n, 1.0 / (table.get(n) as f64 + 1.0)))
        .collect()
}

/// Tirage pondéré sans remise de `count` numéros distincts.
pub fn sample_without_replacement<R: Rng + ?Sized>(
    pool: &[(u8, f64)],
    count: usize,
    rng: &mut R,
) -> Result<Vec<u8>, EngineError> {
    if pool.len() < count {
        return Err(EngineError::Sampling(format!(
            "{} numéros disponibles pour {} tirages",
            pool.len(),
            count
        )));
    }

    let mut available = pool.to_vec();
    let mut selected = Vec::with_capacity(count);

    for _ in 0..count {
        let weights: Vec<f64> = available.iter().map(|(_, w)| *w).collect();
        let dist = WeightedIndex::new(&weights).map_err(|e| EngineError::Sampling(e.to_string()))?;
        let idx = dist.sample(rng);

        let (number, _) = available.remove(idx);
        selected.push(number);
    }

    Ok(selected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_seed_for_format() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 10).unwrap();
        assert_eq!(seed_for(date), 20_240_110);
        assert_eq!(date_seed().to_string().len(), 8);
    }

    #[test]
    fn test_inverse_weights() {
        let mut counts = vec![0u32; 42];
        counts[0] = 3;
        let weights = inverse_frequency_weights(&FrequencyTable::from_counts(counts));
        assert_eq!(weights.len(), 42);
        assert_eq!(weights[0], (1, 0.25));
        assert_eq!(weights[41], (42, 1.0));
    }

    #[test]
    fn test_sample_distinct() {
        let pool = inverse_frequency_weights(&FrequencyTable::zeroed());
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..200 {
            let mut s = sample_without_replacement(&pool, 5, &mut rng).unwrap();
            s.sort();
            s.dedup();
            assert_eq!(s.len(), 5);
            assert!(s.iter().all(|&n| (1..=42).contains(&n)));
        }
    }

    #[test]
    fn test_sample_seed_determinism() {
        let pool = inverse_frequency_weights(&FrequencyTable::default_seed());
        let a = sample_without_replacement(&pool, 5, &mut StdRng::seed_from_u64(7)).unwrap();
        let b = sample_without_replacement(&pool, 5, &mut StdRng::seed_from_u64(7)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_sample_favors_heavy_weights() {
        let mut pool: Vec<(u8, f64)> = (1..=10).map(|n| (n, 0.001)).collect();
        pool[3].1 = 1000.0;
        let mut rng = StdRng::seed_from_u64(1);
        let hits = (0..100)
            .filter(|_| sample_without_replacement(&pool, 1, &mut rng).unwrap() == vec![4])
            .count();
        assert!(hits > 95, "hits = {hits}");
    }

    #[test]
    fn test_sample_pool_too_small() {
        let pool = vec![(1u8, 1.0), (2, 1.0)];
        let mut rng = StdRng::seed_from_u64(0);
        assert!(matches!(
            sample_without_replacement(&pool, 5, &mut rng),
            Err(EngineError::Sampling(_))
        ));
    }
}
