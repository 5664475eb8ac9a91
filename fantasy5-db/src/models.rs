use anyhow::{bail, Result};
use chrono::NaiveDate;

/// Plus petit numéro tirable.
pub const NUMBER_MIN: u8 = 1;
/// Plus grand numéro tirable (1-42).
pub const NUMBER_MAX: u8 = 42;
/// Nombre de boules par tirage.
pub const PICK_COUNT: usize = 5;

/// Taille de l'univers des numéros.
pub const fn universe_size() -> usize {
    (NUMBER_MAX - NUMBER_MIN + 1) as usize
}

/// Itère sur tous les numéros de l'univers, dans l'ordre croissant.
pub fn universe() -> impl Iterator<Item = u8> {
    NUMBER_MIN..=NUMBER_MAX
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Draw {
    pub date: NaiveDate,
    pub balls: [u8; 5],
}

impl Draw {
    pub fn new(date: NaiveDate, balls: [u8; 5]) -> Result<Self> {
        validate_draw(&balls)?;
        Ok(Self { date, balls })
    }

    pub fn sum(&self) -> u32 {
        self.balls.iter().map(|&b| b as u32).sum()
    }

    pub fn sorted_balls(&self) -> [u8; 5] {
        let mut balls = self.balls;
        balls.sort();
        balls
    }
}

pub fn validate_draw(balls: &[u8; 5]) -> Result<()> {
    for &b in balls {
        if !(NUMBER_MIN..=NUMBER_MAX).contains(&b) {
            bail!("Boule {} hors limites ({}-{})", b, NUMBER_MIN, NUMBER_MAX);
        }
    }
    for i in 0..balls.len() {
        for j in (i + 1)..balls.len() {
            if balls[i] == balls[j] {
                bail!("Boule en double : {}", balls[i]);
            }
        }
    }
    Ok(())
}

/// Accepte `AAAA-MM-JJ` ou `MM/JJ/AAAA`.
pub fn parse_date(raw: &str) -> Result<NaiveDate> {
    let raw = raw.trim();
    for format in ["%Y-%m-%d", "%m/%d/%Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(raw, format) {
            return Ok(date);
        }
    }
    bail!("Format de date invalide: '{}'", raw)
}
