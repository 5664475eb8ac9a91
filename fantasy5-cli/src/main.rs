mod display;
mod export;
mod import;
mod rank_file;
mod settings;

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use chrono::{Local, NaiveDate};
use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::display::{
    display_check, display_draws, display_import_summary, display_predictions, display_ranks,
};
use crate::settings::{SETTINGS_FILE, Settings, load_or_default, save_settings};
use fantasy5_db::db::{count_draws, db_path, fetch_draws_since, fetch_last_draws, insert_draw, migrate, open_db};
use fantasy5_db::models::{Draw, PICK_COUNT, parse_date, validate_draw};
use fantasy5_db::rusqlite::Connection;
use fantasy5_engine::frequency::{frequency, rank};
use fantasy5_engine::sampler::date_seed;
use fantasy5_engine::{
    Combination, CombinationStats, FilterConfig, FrequencyTable, PredictionGenerator, Window, filter, score,
};

#[derive(Parser)]
#[command(name = "fantasy5", about = "Générateur de combinaisons Fantasy 5 (5 numéros parmi 1-42)")]
struct Cli {
    /// Fichier de réglages JSON
    #[arg(long, global = true, default_value = SETTINGS_FILE)]
    settings: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Default)]
struct WindowArgs {
    /// Fenêtre d'analyse en jours
    #[arg(long, conflicts_with = "draws")]
    days: Option<u32>,

    /// Fenêtre d'analyse en nombre de tirages
    #[arg(long)]
    draws: Option<usize>,
}

impl WindowArgs {
    fn resolve(&self, default: Window) -> Window {
        match (self.days, self.draws) {
            (Some(d), _) => Window::Days(d),
            (None, Some(n)) => Window::Draws(n),
            (None, None) => default,
        }
    }
}

#[derive(Args, Default)]
struct FilterArgs {
    /// Somme minimale
    #[arg(long)]
    sum_min: Option<u32>,

    /// Somme maximale
    #[arg(long)]
    sum_max: Option<u32>,

    /// Nombre maximal de numéros par tranche de dizaine
    #[arg(long)]
    max_per_decade: Option<usize>,

    /// Nombre maximal de paires consécutives
    #[arg(long)]
    max_seq2: Option<usize>,

    /// Nombre maximal de triplets consécutifs
    #[arg(long)]
    max_seq3: Option<usize>,

    /// Recouvrement maximal avec le dernier tirage
    #[arg(long)]
    max_overlap1: Option<usize>,
}

impl FilterArgs {
    fn apply(&self, filters: &mut FilterConfig) {
        if let Some(v) = self.sum_min {
            filters.sum_min = v;
        }
        if let Some(v) = self.sum_max {
            filters.sum_max = v;
        }
        if let Some(v) = self.max_per_decade {
            filters.max_per_decade = v;
        }
        if let Some(v) = self.max_seq2 {
            filters.max_seq2 = v;
        }
        if let Some(v) = self.max_seq3 {
            filters.max_seq3 = v;
        }
        if let Some(v) = self.max_overlap1 {
            filters.max_overlap1 = v;
        }
    }
}

#[derive(Subcommand)]
enum Command {
    /// Importer les tirages depuis un fichier CSV
    Import {
        /// Chemin vers le fichier CSV (date,b1,b2,b3,b4,b5)
        #[arg(short, long, default_value = "data/fantasy5_history.csv")]
        file: PathBuf,
    },

    /// Afficher le chemin de la base de données
    DbPath,

    /// Lister les derniers tirages
    List {
        /// Nombre de tirages à afficher
        #[arg(short, long, default_value = "10")]
        last: u32,
    },

    /// Afficher les fréquences et les rangs
    Stats {
        #[command(flatten)]
        window: WindowArgs,

        /// Fichier de comptages précalculés (prioritaire sur l'historique)
        #[arg(long)]
        rank_file: Option<PathBuf>,
    },

    /// Générer des combinaisons
    Predict {
        /// Nombre de combinaisons (défaut : réglages)
        #[arg(short, long)]
        count: Option<usize>,

        /// Seed pour la reproductibilité (défaut : date du jour)
        #[arg(long)]
        seed: Option<u64>,

        #[command(flatten)]
        window: WindowArgs,

        #[command(flatten)]
        filters: FilterArgs,

        /// Fichier de comptages précalculés (prioritaire sur l'historique)
        #[arg(long)]
        rank_file: Option<PathBuf>,

        /// Rotation du premier numéro selon l'historique des plus petites boules
        #[arg(long)]
        col1: bool,

        /// Exporter en CSV (nom par défaut : ga_f5_predictions_AAAAMMJJ.csv)
        #[arg(long, num_args = 0..=1)]
        save: Option<Option<PathBuf>>,
    },

    /// Vérifier une combinaison contre les filtres et le score
    Check {
        /// Les 5 numéros
        #[arg(num_args = 5, required = true)]
        numbers: Vec<u8>,

        #[command(flatten)]
        window: WindowArgs,

        #[command(flatten)]
        filters: FilterArgs,

        /// Fichier de comptages précalculés (prioritaire sur l'historique)
        #[arg(long)]
        rank_file: Option<PathBuf>,
    },

    /// Ajouter un tirage manuellement
    Add,

    /// Afficher les réglages effectifs
    Settings {
        /// Écrire les réglages dans le fichier
        #[arg(long)]
        write: bool,
    },
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let settings = load_or_default(&cli.settings);
    let path = db_path();
    let conn = open_db(&path)?;
    migrate(&conn)?;

    match cli.command {
        Command::Import { file } => cmd_import(&conn, &file),
        Command::DbPath => {
            println!("{}", path.display());
            Ok(())
        }
        Command::List { last } => cmd_list(&conn, last),
        Command::Stats { window, rank_file } => cmd_stats(&conn, &settings, &window, rank_file.as_deref()),
        Command::Predict {
            count,
            seed,
            window,
            filters,
            rank_file,
            col1,
            save,
        } => {
            let mut settings = settings;
            settings.generator.window = window.resolve(settings.generator.window);
            settings.generator.col1_rotation |= col1;
            filters.apply(&mut settings.filters);
            let count = count.unwrap_or(settings.num_predictions);
            cmd_predict(&conn, &settings, count, seed, rank_file.as_deref(), save)
        }
        Command::Check { numbers, window, filters, rank_file } => {
            let mut settings = settings;
            settings.generator.window = window.resolve(settings.generator.window);
            filters.apply(&mut settings.filters);
            cmd_check(&conn, &settings, &numbers, rank_file.as_deref())
        }
        Command::Add => cmd_add(&conn),
        Command::Settings { write } => cmd_settings(&settings, &cli.settings, write),
    }
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Historique complet, le plus récent en premier.
fn load_history(conn: &Connection) -> Result<Vec<Draw>> {
    let n = count_draws(conn)?;
    if n == 0 {
        println!("Base vide : aucun filtre de recouvrement ni fréquence historique. Lancez : fantasy5 import");
        return Ok(Vec::new());
    }
    fetch_last_draws(conn, n)
}

fn cmd_import(conn: &Connection, file: &Path) -> Result<()> {
    let result = import::import_csv(conn, file)?;
    display_import_summary(&result);
    Ok(())
}

fn cmd_list(conn: &Connection, last: u32) -> Result<()> {
    let n = count_draws(conn)?;
    if n == 0 {
        println!("Base vide. Lancez d'abord : fantasy5 import");
        return Ok(());
    }
    let draws = fetch_last_draws(conn, last)?;
    display_draws(&draws);
    Ok(())
}

fn cmd_stats(conn: &Connection, settings: &Settings, window: &WindowArgs, rank_file: Option<&Path>) -> Result<()> {
    let (table, source) = match rank_file {
        Some(path) => (rank_file::load_rank_counts(path), format!("fichier {}", path.display())),
        None => {
            let today = today();
            let window = window.resolve(settings.generator.window);
            let history = match window {
                Window::Days(_) => {
                    let since = window.cutoff(today).unwrap_or(NaiveDate::MIN);
                    fetch_draws_since(conn, since)?
                }
                Window::Draws(n) => fetch_last_draws(conn, n.min(u32::MAX as usize) as u32)?,
            };
            if history.is_empty() {
                println!("Aucun tirage dans la fenêtre ({window}).");
                return Ok(());
            }
            (frequency(&history, window, today), window.to_string())
        }
    };

    let ranks = rank(&table);
    display_ranks(&table, &ranks, &source);
    Ok(())
}

fn cmd_predict(
    conn: &Connection,
    settings: &Settings,
    count: usize,
    seed: Option<u64>,
    rank_file: Option<&Path>,
    save: Option<Option<PathBuf>>,
) -> Result<()> {
    let history = load_history(conn)?;
    let today = today();

    let mut generator = PredictionGenerator::new(
        settings.filters.clone(),
        settings.scoring.clone(),
        settings.generator.clone(),
    )?;
    if let Some(path) = rank_file {
        generator = generator.with_frequency_override(rank_file::load_rank_counts(path));
    }

    let seed = seed.unwrap_or_else(|| {
        let s = date_seed();
        println!("(Seed du jour : {s})");
        s
    });
    let mut rng = StdRng::seed_from_u64(seed);

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::with_template("{spinner:.green} {msg} [{elapsed}]")?);
    pb.set_message(format!("Génération de {count} combinaisons..."));
    pb.enable_steady_tick(Duration::from_millis(100));
    let outcome = generator.generate(&history, today, count, &mut rng);
    pb.finish_and_clear();
    let outcome = outcome?;

    if outcome.predictions.len() < count {
        log::warn!(
            "{} combinaisons sur {} demandées : filtres trop stricts",
            outcome.predictions.len(),
            count
        );
    }
    display_predictions(&outcome, settings.generator.window);

    if let Some(target) = save {
        let path = target.unwrap_or_else(|| export::default_export_path(today));
        export::save_predictions(&outcome.predictions, &path, Local::now().naive_local())?;
        println!("Combinaisons enregistrées dans {}", path.display());
    }

    Ok(())
}

/// Fichier de comptages s'il est donné, comme pour `predict`, sinon l'historique.
fn frequency_source(history: &[Draw], window: Window, today: NaiveDate, rank_file: Option<&Path>) -> FrequencyTable {
    match rank_file {
        Some(path) => rank_file::load_rank_counts(path),
        None => frequency(history, window, today),
    }
}

fn cmd_check(conn: &Connection, settings: &Settings, numbers: &[u8], rank_file: Option<&Path>) -> Result<()> {
    let combo = Combination::from_slice(numbers)?;
    let history = load_history(conn)?;

    settings.filters.validate()?;
    settings.scoring.validate()?;

    let table = frequency_source(&history, settings.generator.window, today(), rank_file);
    let ranks = rank(&table);

    let rejections = filter::rejections(&combo, &history, &settings.filters);
    let stats = CombinationStats::of(&combo)?;
    let breakdown = score::breakdown(&combo, &ranks, &settings.scoring);

    display_check(&combo, &rejections, &stats, &breakdown);
    Ok(())
}

fn cmd_settings(settings: &Settings, path: &Path, write: bool) -> Result<()> {
    let json = serde_json::to_string_pretty(settings)?;
    println!("{json}");
    if write {
        save_settings(settings, path)?;
        println!("Réglages écrits dans {}", path.display());
    }
    Ok(())
}

fn cmd_add(conn: &Connection) -> Result<()> {
    println!("Ajout d'un tirage manuellement\n");

    let date = loop {
        let raw = prompt("Date (AAAA-MM-JJ ou MM/JJ/AAAA) : ")?;
        match parse_date(&raw) {
            Ok(date) => break date,
            Err(e) => println!("{e:#}. Réessayez."),
        }
    };
    let balls = prompt_balls()?;
    let draw = Draw::new(date, balls)?;

    println!("\nTirage à insérer :");
    display_draws(std::slice::from_ref(&draw));

    let confirm = prompt("\nConfirmer l'insertion ? (o/n) : ")?;
    if confirm.trim().to_lowercase() == "o" {
        if insert_draw(conn, &draw)? {
            println!("Tirage inséré avec succès.");
        } else {
            println!("Un tirage existe déjà à cette date (doublon ignoré).");
        }
    } else {
        println!("Insertion annulée.");
    }

    Ok(())
}

fn prompt(msg: &str) -> Result<String> {
    print!("{}", msg);
    io::stdout().flush()?;
    read_answer(&mut io::stdin().lock())
}

/// Fin d'entrée : erreur plutôt qu'une réponse vide redemandée sans fin.
fn read_answer(reader: &mut impl BufRead) -> Result<String> {
    let mut input = String::new();
    let read = reader
        .read_line(&mut input)
        .context("Erreur de lecture")?;
    if read == 0 {
        bail!("Entrée terminée, saisie abandonnée");
    }
    Ok(input.trim().to_string())
}

fn prompt_balls() -> Result<[u8; PICK_COUNT]> {
    loop {
        let input = prompt("5 boules (séparées par des espaces, 1-42) : ")?;
        let nums: Result<Vec<u8>, _> = input.split_whitespace().map(|s| s.parse::<u8>()).collect();
        match nums {
            Ok(v) if v.len() == PICK_COUNT => {
                let arr = [v[0], v[1], v[2], v[3], v[4]];
                match validate_draw(&arr) {
                    Ok(()) => return Ok(arr),
                    Err(e) => println!("{e}. Réessayez."),
                }
            }
            _ => println!("Entrez exactement 5 numéros. Réessayez."),
        }
    }
}
