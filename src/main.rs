use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use wortklar::catalog::{CardFilter, Catalog};
use wortklar::config::Config;
use wortklar::db::Database;
use wortklar::models::{Card, CardType, Difficulty, Grade};
use wortklar::scheduler::RngSource;
use wortklar::session::TrainingSession;
use wortklar::store::ProgressStore;

const STORAGE_NOTICE: &str =
    "Local storage unavailable; progress will not persist between sessions. Training still works.";

#[derive(Parser)]
#[command(name = "wortklar")]
#[command(about = "Drill German nouns and verb + preposition frames")]
struct Cli {
    /// Progress database file
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Card catalog (JSON)
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run an interactive training session
    Train {
        /// Card types to include (noun, verb_prep)
        #[arg(long, value_delimiter = ',', value_parser = parse_card_type)]
        types: Vec<CardType>,

        /// Levels to include (easy, medium, hard)
        #[arg(long, value_delimiter = ',', value_parser = parse_difficulty)]
        levels: Vec<Difficulty>,

        /// Number of cards per session
        #[arg(short, long, default_value = "10")]
        size: usize,
    },
    /// Reset all progress on this device
    Reset {
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Show storage and catalog status
    Status,
}

fn parse_card_type(s: &str) -> Result<CardType, String> {
    CardType::from_str(s).ok_or_else(|| format!("unknown card type: {s}"))
}

fn parse_difficulty(s: &str) -> Result<Difficulty, String> {
    Difficulty::from_str(s).ok_or_else(|| format!("unknown level: {s}"))
}

/// Logs go to stderr so stdout stays clean for the drill.
fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "wortklar=info".into()),
    );

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let config = Config::resolve(cli.db, cli.catalog)?;

    match cli.command {
        Some(Commands::Train {
            types,
            levels,
            size,
        }) => {
            let filter = build_filter(types, levels);
            train(&config, &filter, size).await?;
        }
        Some(Commands::Reset { yes }) => {
            if !yes && !confirm("Reset all progress on this device? This cannot be undone.")? {
                println!("Nothing changed.");
                return Ok(());
            }
            let store = ProgressStore::sqlite(config.db_path.clone());
            store.reset_all().await;
            if store.is_unavailable() {
                println!("{STORAGE_NOTICE}");
            }
            println!("Progress reset.");
        }
        Some(Commands::Status) => status(&config)?,
        None => train(&config, &CardFilter::default(), 10).await?,
    }

    Ok(())
}

fn build_filter(types: Vec<CardType>, levels: Vec<Difficulty>) -> CardFilter {
    let mut filter = CardFilter::default();
    if !types.is_empty() {
        filter.types = types;
    }
    if !levels.is_empty() {
        filter.levels = levels;
    }
    filter
}

async fn train(config: &Config, filter: &CardFilter, size: usize) -> anyhow::Result<()> {
    let catalog = Catalog::from_path(&config.catalog_path)
        .with_context(|| format!("Failed to load catalog {}", config.catalog_path.display()))?;
    let store = ProgressStore::sqlite(config.db_path.clone());

    let mut session = TrainingSession::start(&store, catalog.select(filter), size).await;
    let mut rng = RngSource::thread();
    let stdin = io::stdin();
    let mut input = stdin.lock();

    if session.storage_warning() {
        println!("{STORAGE_NOTICE}");
    }

    while !session.is_complete() {
        let Some(card) = session.next_card(wortklar::now_ms(), &mut rng).cloned() else {
            println!("No eligible cards for these filters.");
            return Ok(());
        };

        println!();
        println!("[{}/{}] {}", session.served() + 1, session.size(), card.prompt());
        if prompt_line(&mut input, "Press Enter to reveal (q to quit) ")?.as_deref() == Some("q") {
            return Ok(());
        }
        print_answer(&card);

        let Some(grade) = ask_grade(&mut input)? else {
            return Ok(());
        };
        let warned = session.storage_warning();
        session.grade(&card.id, grade, wortklar::now_ms()).await;
        if session.storage_warning() && !warned {
            println!("{STORAGE_NOTICE}");
        }
    }

    println!();
    println!("Session complete. Start another session anytime.");
    Ok(())
}

fn print_answer(card: &Card) {
    for line in card.answer() {
        println!("  {line}");
    }
}

fn ask_grade(input: &mut impl BufRead) -> anyhow::Result<Option<Grade>> {
    loop {
        match prompt_line(input, "Did you remember it? [y/n/q] ")?.as_deref() {
            Some("y") | Some("yes") => return Ok(Some(Grade::Remembered)),
            Some("n") | Some("no") => return Ok(Some(Grade::Forgot)),
            Some("q") | None => return Ok(None),
            Some(_) => continue,
        }
    }
}

/// Print `message` and read one trimmed, lowercased line. `None` on EOF.
fn prompt_line(input: &mut impl BufRead, message: &str) -> anyhow::Result<Option<String>> {
    print!("{message}");
    io::stdout().flush()?;
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_lowercase()))
}

fn confirm(message: &str) -> anyhow::Result<bool> {
    let stdin = io::stdin();
    let answer = prompt_line(&mut stdin.lock(), &format!("{message} [y/N] "))?;
    Ok(matches!(answer.as_deref(), Some("y") | Some("yes")))
}

fn status(config: &Config) -> anyhow::Result<()> {
    println!("Database: {}", config.db_path.display());
    match Database::open(config.db_path.clone()).and_then(|db| {
        db.migrate()?;
        db.count_progress()
    }) {
        Ok(count) => println!("Storage: available ({count} cards with progress)"),
        Err(err) => println!("Storage: unavailable ({err:#})"),
    }

    println!("Catalog: {}", config.catalog_path.display());
    match Catalog::from_path(&config.catalog_path) {
        Ok(catalog) => {
            let active = catalog.cards().iter().filter(|card| card.active).count();
            println!("Cards: {} ({} active)", catalog.len(), active);
        }
        Err(err) => println!("Cards: unavailable ({err})"),
    }

    Ok(())
}
