use comfy_table::{Table, ContentArrangement, presets::UTF8_FULL, Cell, Color};

use crate::import::ImportResult;
use fantasy5_db::models::Draw;
use fantasy5_engine::filter::{DECADE_LABELS, Rejection};
use fantasy5_engine::frequency::MAX_RANK;
use fantasy5_engine::score::ScoreBreakdown;
use fantasy5_engine::{Combination, CombinationStats, FrequencyTable, GenerationOutcome, RankTable, Window};

fn format_balls(balls: &[u8]) -> String {
    balls
        .iter()
        .map(|b| format!("{:2}", b))
        .collect::<Vec<_>>()
        .join(" - ")
}

fn new_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    table
}

pub fn display_draws(draws: &[Draw]) {
    if draws.is_empty() {
        println!("Aucun tirage à afficher.");
        return;
    }

    let mut table = new_table(vec!["Date", "Jour", "Boules", "Somme"]);
    for draw in draws {
        table.add_row(vec![
            draw.date.format("%Y-%m-%d").to_string(),
            draw.date.format("%A").to_string(),
            format_balls(&draw.sorted_balls()),
            draw.sum().to_string(),
        ]);
    }

    println!("{table}");
}

pub fn display_import_summary(result: &ImportResult) {
    println!("Import terminé :");
    println!("  Total lignes lues : {}", result.total_records);
    println!("  Insérés           : {}", result.inserted);
    println!("  Doublons ignorés  : {}", result.skipped);
    if result.errors > 0 {
        println!("  Erreurs           : {}", result.errors);
    }
}

fn rank_color(rank: u8) -> Color {
    match rank {
        0 | 1 => Color::Green,
        r if r >= MAX_RANK - 1 => Color::Red,
        _ => Color::White,
    }
}

pub fn display_ranks(table: &FrequencyTable, ranks: &RankTable, source: &str) {
    println!("\n📊 Fréquences et rangs ({source}, {} occurrences)\n", table.total());

    let mut out = new_table(vec!["Numéro", "Fréquence", "Rang"]);
    for &number in ranks.order() {
        let rank = ranks.get(number);
        out.add_row(vec![
            Cell::new(format!("{:2}", number)),
            Cell::new(table.get(number).to_string()),
            Cell::new(rank.to_string()).fg(rank_color(rank)),
        ]);
    }
    println!("{out}");

    println!("\n── Groupes de rang ──");
    for rank in 0..=MAX_RANK {
        let group = ranks.group(rank);
        if !group.is_empty() {
            println!("  {rank} : {}", format_balls(&group));
        }
    }
}

pub fn display_predictions(outcome: &GenerationOutcome, window: Window) {
    println!("\n🎲 Combinaisons proposées (fenêtre : {window})\n");

    if outcome.predictions.is_empty() {
        println!("Aucune combinaison ne satisfait les filtres.");
        return;
    }

    let mut table = new_table(vec!["#", "Boules", "Somme", "Score", "Moyenne", "Médiane", "Écart-type"]);
    for (i, pred) in outcome.predictions.iter().enumerate() {
        table.add_row(vec![
            (i + 1).to_string(),
            format_balls(pred.combination.numbers()),
            pred.sum.to_string(),
            format!("{:.2}", pred.score),
            format!("{:.2}", pred.stats.mean),
            format!("{:.1}", pred.stats.median),
            format!("{:.2}", pred.stats.stdev),
        ]);
    }
    println!("{table}");

    println!(
        "Phase A : {} retenues | Phase B : {} retenues en {} tentatives",
        outcome.phase_a_survivors, outcome.phase_b_survivors, outcome.phase_b_attempts
    );
}

pub fn display_check(
    combo: &Combination,
    rejections: &[Rejection],
    stats: &CombinationStats,
    breakdown: &ScoreBreakdown,
) {
    println!("\n🔎 Combinaison {combo} (somme {})\n", combo.sum());

    if rejections.is_empty() {
        println!("✅ Passe tous les filtres.");
    } else {
        println!("❌ Rejetée :");
        for rejection in rejections {
            println!("  - {rejection}");
        }
    }

    let distribution = combo.decade_distribution();
    let bands = DECADE_LABELS
        .iter()
        .zip(distribution.iter())
        .map(|(label, count)| format!("{label}: {count}"))
        .collect::<Vec<_>>()
        .join(", ");
    println!("\nTranches : {bands}");

    let mut table = new_table(vec!["Statistique", "Valeur"]);
    let rows = [
        ("Moyenne", stats.mean),
        ("Médiane", stats.median),
        ("Moyenne harmonique", stats.harmean),
        ("Moyenne géométrique", stats.geomean),
        ("Q1", stats.quart1),
        ("Q2", stats.quart2),
        ("Q3", stats.quart3),
        ("Écart-type", stats.stdev),
        ("Variance", stats.variance),
        ("Écart moyen", stats.avedev),
        ("Asymétrie", stats.skew),
        ("Aplatissement", stats.kurt),
    ];
    for (name, value) in rows {
        table.add_row(vec![name.to_string(), format!("{:.3}", value)]);
    }
    println!("{table}");

    let mut table = new_table(vec!["Critère", "Score"]);
    table.add_row(vec!["Rangs".to_string(), format!("{:.2}", breakdown.rank)]);
    table.add_row(vec!["Somme".to_string(), format!("{:.2}", breakdown.sum)]);
    table.add_row(vec!["Pair/impair".to_string(), format!("{:.2}", breakdown.even_odd)]);
    table.add_row(vec!["Tranches".to_string(), format!("{:.2}", breakdown.decade)]);
    table.add_row(vec![
        Cell::new("Composite"),
        Cell::new(format!("{:.2}", breakdown.composite)).fg(Color::Cyan),
    ]);
    println!("{table}");
}
