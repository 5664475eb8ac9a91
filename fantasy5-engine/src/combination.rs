use serde::Serialize;

use fantasy5_db::models::{Draw, NUMBER_MAX, NUMBER_MIN, PICK_COUNT};

use crate::error::EngineError;

/// Nombre de tranches de dizaines : 1-9, 10-19, 20-29, 30-39, 40-42.
pub const DECADE_BANDS: usize = 5;

/// Cinq numéros distincts de l'univers, toujours triés.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Combination([u8; PICK_COUNT]);

impl Combination {
    pub fn new(mut numbers: [u8; PICK_COUNT]) -> Result<Self, EngineError> {
        numbers.sort();
        if let Some(&n) = numbers.iter().find(|&&n| !(NUMBER_MIN..=NUMBER_MAX).contains(&n)) {
            return Err(EngineError::InvalidCombination {
                numbers: numbers.to_vec(),
                reason: format!("{n} hors de l'univers {NUMBER_MIN}-{NUMBER_MAX}"),
            });
        }
        if let Some(w) = numbers.windows(2).find(|w| w[0] == w[1]) {
            return Err(EngineError::InvalidCombination {
                numbers: numbers.to_vec(),
                reason: format!("{} en double", w[0]),
            });
        }
        Ok(Self(numbers))
    }

    pub fn from_slice(numbers: &[u8]) -> Result<Self, EngineError> {
        let arr: [u8; PICK_COUNT] = numbers.try_into().map_err(|_| EngineError::InvalidCombination {
            numbers: numbers.to_vec(),
            reason: format!("{} numéros au lieu de {PICK_COUNT}", numbers.len()),
        })?;
        Self::new(arr)
    }

    pub fn numbers(&self) -> &[u8; PICK_COUNT] {
        &self.0
    }

    pub fn sum(&self) -> u32 {
        self.0.iter().map(|&n| n as u32).sum()
    }

    pub fn even_count(&self) -> usize {
        self.0.iter().filter(|&&n| n % 2 == 0).count()
    }

    /// (paires consécutives, triplets consécutifs) dans l'ordre trié.
    pub fn sequential_runs(&self) -> (usize, usize) {
        let seq2 = self.0.windows(2).filter(|w| w[1] - w[0] == 1).count();
        let seq3 = self
            .0
            .windows(3)
            .filter(|w| w[1] - w[0] == 1 && w[2] - w[1] == 1)
            .count();
        (seq2, seq3)
    }

    /// (collisions modulo 10 cumulées, nombre de restes partagés par plus de 2 numéros).
    pub fn modular_collisions(&self) -> (usize, usize) {
        let mut buckets = [0usize; 10];
        for &n in &self.0 {
            buckets[(n % 10) as usize] += 1;
        }
        let total = buckets.iter().map(|&c| c.saturating_sub(1)).sum();
        let crowded = buckets.iter().filter(|&&c| c > 2).count();
        (total, crowded)
    }

    pub fn decade_distribution(&self) -> [usize; DECADE_BANDS] {
        let mut bands = [0usize; DECADE_BANDS];
        for &n in &self.0 {
            bands[decade_band(n)] += 1;
        }
        bands
    }

    /// Nombre de numéros communs avec `other`.
    pub fn overlap(&self, other: &[u8]) -> usize {
        self.0.iter().filter(|n| other.contains(n)).count()
    }

    /// Numéros communs avec l'union des `depth` tirages les plus récents.
    pub fn cumulative_overlap(&self, history: &[Draw], depth: usize) -> usize {
        self.0
            .iter()
            .filter(|n| history.iter().take(depth).any(|d| d.balls.contains(n)))
            .count()
    }
}

impl std::fmt::Display for Combination {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parts: Vec<String> = self.0.iter().map(|n| format!("{:2}", n)).collect();
        write!(f, "{}", parts.join(" - "))
    }
}

/// Tranche de dizaines d'un numéro (0 pour 1-9, ..., 4 pour 40-42).
pub fn decade_band(n: u8) -> usize {
    ((n / 10) as usize).min(DECADE_BANDS - 1)
}

/// Combinaisons d'indices `k` parmi `n`, en ordre lexicographique.
pub struct IndexCombinations {
    n: usize,
    indices: Vec<usize>,
    done: bool,
}

impl IndexCombinations {
    pub fn new(n: usize, k: usize) -> Self {
        Self {
            n,
            indices: (0..k).collect(),
            done: k > n,
        }
    }
}

impl Iterator for IndexCombinations {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let current = self.indices.clone();

        let k = self.indices.len();
        // Incrémente l'indice le plus à droite qui peut encore avancer
        match (0..k).rev().find(|&i| self.indices[i] < self.n - k + i) {
            Some(i) => {
                self.indices[i] += 1;
                for j in (i + 1)..k {
                    self.indices[j] = self.indices[j - 1] + 1;
                }
            }
            None => self.done = true,
        }

        Some(current)
    }
}
