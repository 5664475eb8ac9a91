use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use fantasy5_db::models::{Draw, NUMBER_MIN, universe, universe_size};

use crate::combination::Combination;

/// Nombre de groupes de rang (0 = plus fréquent, 6 = moins fréquent).
pub const RANK_GROUPS: usize = 7;
pub const MAX_RANK: u8 = (RANK_GROUPS - 1) as u8;

/// Comptages historiques de repli quand le fichier de rangs est absent ou illisible.
pub const DEFAULT_RANK_COUNTS: [u32; 42] = [
    5, 5, 2, 1, 3, 5, 3, 5, 5, 5, 5, 4, 2, 5, 5, 3, 5, 4, 0, 4, 5, 2, 4, 5, 3, 5, 5, 0, 4, 3, 2,
    1, 4, 5, 3, 5, 1, 4, 3, 3, 2, 5,
];

/// Fenêtre d'historique prise en compte pour les fréquences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Window {
    /// Tirages datés des `n` derniers jours (bornes incluses).
    Days(u32),
    /// Les `n` tirages les plus récents.
    Draws(usize),
}

impl Default for Window {
    fn default() -> Self {
        Window::Days(30)
    }
}

impl Window {
    /// Première date incluse pour une fenêtre en jours, bornée à `NaiveDate::MIN`.
    pub fn cutoff(&self, today: NaiveDate) -> Option<NaiveDate> {
        match *self {
            Window::Days(days) => Some(
                today
                    .checked_sub_days(Days::new(days as u64))
                    .unwrap_or(NaiveDate::MIN),
            ),
            Window::Draws(_) => None,
        }
    }

    /// draws[0] = le plus récent.
    pub fn select<'a>(&self, history: &'a [Draw], today: NaiveDate) -> Vec<&'a Draw> {
        match *self {
            Window::Draws(n) => history.iter().take(n).collect(),
            Window::Days(_) => {
                let cutoff = self.cutoff(today).unwrap_or(NaiveDate::MIN);
                history.iter().filter(|d| d.date >= cutoff).collect()
            }
        }
    }
}

impl std::fmt::Display for Window {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Window::Days(d) => write!(f, "{d} derniers jours"),
            Window::Draws(n) => write!(f, "{n} derniers tirages"),
        }
    }
}

/// Nombre d'apparitions de chaque numéro ; `counts[n - 1]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrequencyTable {
    counts: Vec<u32>,
}

impl FrequencyTable {
    pub fn zeroed() -> Self {
        Self { counts: vec![0; universe_size()] }
    }

    /// Table précalculée (numéros 1..=counts.len()). Les comptages au-delà de 42 sont ignorés.
    pub fn from_counts(counts: Vec<u32>) -> Self {
        Self { counts }
    }

    pub fn default_seed() -> Self {
        Self::from_counts(DEFAULT_RANK_COUNTS.to_vec())
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Vrai si la table couvre exactement l'univers 1-42.
    pub fn covers_universe(&self) -> bool {
        self.counts.len() == universe_size()
    }

    pub fn get(&self, number: u8) -> u32 {
        number
            .checked_sub(NUMBER_MIN)
            .and_then(|i| self.counts.get(i as usize))
            .copied()
            .unwrap_or(0)
    }

    pub fn total(&self) -> u32 {
        self.counts.iter().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u8, u32)> + '_ {
        universe().zip(self.counts.iter().copied())
    }

    fn increment(&mut self, number: u8) {
        if let Some(c) = number
            .checked_sub(NUMBER_MIN)
            .and_then(|i| self.counts.get_mut(i as usize))
        {
            *c += 1;
        }
    }
}

pub fn frequency(history: &[Draw], window: Window, today: NaiveDate) -> FrequencyTable {
    let mut table = FrequencyTable::zeroed();
    for draw in window.select(history, today) {
        for &n in &draw.balls {
            table.increment(n);
        }
    }
    table
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankTable {
    ranks: Vec<u8>,
    /// Numéros triés par fréquence décroissante, à égalité par valeur croissante.
    order: Vec<u8>,
}

impl RankTable {
    pub fn get(&self, number: u8) -> u8 {
        number
            .checked_sub(NUMBER_MIN)
            .and_then(|i| self.ranks.get(i as usize))
            .copied()
            .unwrap_or(MAX_RANK)
    }

    /// Les `k` numéros les mieux classés, dans l'ordre du classement.
    pub fn best(&self, k: usize) -> &[u8] {
        &self.order[..k.min(self.order.len())]
    }

    pub fn order(&self) -> &[u8] {
        &self.order
    }

    /// Numéros du groupe `rank`, dans l'ordre du classement.
    pub fn group(&self, rank: u8) -> Vec<u8> {
        self.order
            .iter()
            .copied()
            .filter(|&n| self.get(n) == rank)
            .collect()
    }

    /// Somme des rangs des cinq numéros (0-30).
    pub fn rank_sum(&self, combo: &Combination) -> u32 {
        combo.numbers().iter().map(|&n| self.get(n) as u32).sum()
    }
}

pub fn rank(table: &FrequencyTable) -> RankTable {
    let mut sorted: Vec<(u8, u32)> = table.iter().collect();
    sorted.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));

    let group_size = sorted.len() / RANK_GROUPS;
    if group_size == 0 {
        log::warn!(
            "Seulement {} numéros : impossible de former {} groupes, rang {} pour tous",
            sorted.len(),
            RANK_GROUPS,
            MAX_RANK
        );
    }

    let mut ranks = vec![MAX_RANK; table.len()];
    for (i, &(number, _)) in sorted.iter().enumerate() {
        ranks[(number - NUMBER_MIN) as usize] = if group_size == 0 {
            MAX_RANK
        } else {
            ((i / group_size) as u8).min(MAX_RANK)
        };
    }

    RankTable {
        ranks,
        order: sorted.into_iter().map(|(n, _)| n).collect(),
    }
}

/// Rangs de l'univers complet, utile quand aucune fréquence n'est disponible.
pub fn uniform_ranks() -> RankTable {
    rank(&FrequencyTable::from_counts(universe().map(|_| 0).collect()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn draw(d: &str, balls: [u8; 5]) -> Draw {
        Draw { date: date(d), balls }
    }

    fn history() -> Vec<Draw> {
        vec![
            draw("2024-03-01", [1, 2, 3, 4, 5]),
            draw("2024-02-20", [1, 2, 3, 10, 11]),
            draw("2024-02-01", [1, 20, 21, 22, 23]),
            draw("2023-12-01", [40, 41, 42, 39, 38]),
        ]
    }

    #[test]
    fn test_frequency_days_window() {
        let table = frequency(&history(), Window::Days(30), date("2024-03-02"));
        assert_eq!(table.get(1), 3);
        assert_eq!(table.get(2), 2);
        assert_eq!(table.get(20), 1);
        assert_eq!(table.get(40), 0);
        assert_eq!(table.total(), 15);
    }

    #[test]
    fn test_frequency_days_cutoff_inclusive() {
        let table = frequency(&history(), Window::Days(10), date("2024-03-01"));
        // 2024-02-20 est exactement à 10 jours
        assert_eq!(table.get(10), 1);
        assert_eq!(table.get(20), 0);
    }

    #[test]
    fn test_frequency_draws_window() {
        let table = frequency(&history(), Window::Draws(2), date("2030-01-01"));
        assert_eq!(table.get(1), 2);
        assert_eq!(table.total(), 10);
    }

    #[test]
    fn test_frequency_insufficient_history() {
        let table = frequency(&[], Window::Draws(100), date("2024-03-01"));
        assert_eq!(table.len(), 42);
        assert_eq!(table.total(), 0);

        let table = frequency(&history(), Window::Draws(100), date("2024-03-01"));
        assert_eq!(table.total(), 20);
    }

    #[test]
    fn test_rank_partitions_into_seven_groups() {
        let table = frequency(&history(), Window::Draws(4), date("2024-03-01"));
        let ranks = rank(&table);

        let sizes: Vec<usize> = (0..RANK_GROUPS as u8).map(|r| ranks.group(r).len()).collect();
        assert_eq!(sizes.iter().sum::<usize>(), 42);
        let min = *sizes.iter().min().unwrap();
        let max = *sizes.iter().max().unwrap();
        assert!(max - min <= 1, "tailles de groupes : {:?}", sizes);
        assert_eq!(sizes, vec![6; 7]);
    }

    #[test]
    fn test_rank_most_frequent_first_ties_ascending() {
        let table = frequency(&history(), Window::Draws(4), date("2024-03-01"));
        let ranks = rank(&table);
        assert_eq!(ranks.order()[0], 1);
        assert_eq!(&ranks.order()[1..3], &[2, 3]);
        assert_eq!(ranks.get(1), 0);
        // Les numéros absents ferment la marche, par valeur croissante
        assert_eq!(*ranks.order().last().unwrap(), 37);
        assert_eq!(ranks.get(37), MAX_RANK);
    }

    #[test]
    fn test_rank_is_stable() {
        let table = frequency(&history(), Window::Days(365), date("2024-03-01"));
        assert_eq!(rank(&table), rank(&table));
    }

    #[test]
    fn test_rank_degenerate_small_table() {
        let ranks = rank(&FrequencyTable::from_counts(vec![3, 1, 2]));
        for n in 1..=3 {
            assert_eq!(ranks.get(n), MAX_RANK);
        }
        assert_eq!(ranks.order(), &[1, 3, 2]);
    }

    #[test]
    fn test_huge_days_window_keeps_everything() {
        let today = date("2024-03-01");
        assert_eq!(Window::Days(u32::MAX).cutoff(today), Some(NaiveDate::MIN));
        assert_eq!(Window::Days(10).cutoff(today), Some(date("2024-02-20")));
        assert_eq!(Window::Draws(3).cutoff(today), None);
        assert_eq!(Window::Days(u32::MAX).select(&history(), today).len(), history().len());
    }

    #[test]
    fn test_oversized_table_stops_at_universe() {
        let table = FrequencyTable::from_counts(vec![1; 300]);
        assert!(!table.covers_universe());
        assert_eq!(table.iter().count(), 42);
        assert_eq!(table.iter().last(), Some((42, 1)));

        let ranks = rank(&table);
        assert_eq!(ranks.order().len(), 42);
        assert_eq!(ranks.get(1), 0);
    }

    #[test]
    fn test_best_and_rank_sum() {
        let ranks = rank(&FrequencyTable::default_seed());
        let best = ranks.best(15);
        assert_eq!(best.len(), 15);
        assert!(best.iter().all(|&n| ranks.get(n) <= 2));
        assert_eq!(ranks.best(100).len(), 42);

        let combo = Combination::new([1, 2, 19, 28, 4]).unwrap();
        // 1 et 2 : 5 apparitions, 19 et 28 : aucune
        assert_eq!(ranks.get(1), 0);
        assert_eq!(ranks.get(19), MAX_RANK);
        assert!(ranks.rank_sum(&combo) >= 12);
    }

    #[test]
    fn test_uniform_ranks_follow_numeric_order() {
        let ranks = uniform_ranks();
        assert_eq!(ranks.best(6), &[1, 2, 3, 4, 5, 6]);
        assert_eq!(ranks.get(7), 1);
        assert_eq!(ranks.get(42), MAX_RANK);
    }

    #[test]
    fn test_window_serde() {
        let json = serde_json::to_string(&Window::Days(30)).unwrap();
        assert_eq!(json, r#"{"days":30}"#);
        let w: Window = serde_json::from_str(r#"{"draws":50}"#).unwrap();
        assert_eq!(w, Window::Draws(50));
    }
}
