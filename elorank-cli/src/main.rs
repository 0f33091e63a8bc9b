mod config;
mod output;
mod parse;
mod prompt;
mod storage;

use clap::Parser;
use elorank_core::constants::{
    DEFAULT_BATCH_SIZE, DEFAULT_K_FACTOR, DEFAULT_MIN_COMPARISONS, STANDARD_RATING,
};
use elorank_core::{Item, Matchmaker, MatchmakerConfig, RatingStore, Session};
use std::io;
use std::path::{Path, PathBuf};

use crate::config::ElorankConfig;
use crate::prompt::TerminalJudge;
use crate::storage::Snapshot;

const DEFAULT_STATE_DIR: &str = "elorank-state";

pub fn bail(msg: impl std::fmt::Display) -> ! {
    eprintln!("Error: {msg}");
    std::process::exit(1);
}

#[derive(Parser)]
#[command(name = "elorank", version, about = "Rank items by judging them in pairs")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Judge pairs at the terminal and update the ratings
    Rank(RankArgs),
    /// Print the latest saved standings without judging anything
    Standings(StandingsArgs),
    /// Create a default config file at ~/.config/elorank/config.toml
    Init,
}

#[derive(Parser)]
struct RankArgs {
    /// Items file: one name per line, a JSON array of names, or a JSON array of
    /// objects with a "name" and an optional prior "rating". Only read when the
    /// state directory has no saved snapshot.
    #[arg(long)]
    items: Option<PathBuf>,

    /// Inline item (repeatable)
    #[arg(long = "item")]
    inline_items: Vec<String>,

    /// Directory for snapshots and the expected-score matrix (default: ./elorank-state)
    #[arg(long)]
    state_dir: Option<PathBuf>,

    /// K-factor. Default: 32.
    #[arg(long)]
    k_factor: Option<f64>,

    /// Comparisons every item needs before closest matchups start. Default: 2.
    #[arg(long)]
    min_comparisons: Option<usize>,

    /// Pairs per closest-matchup batch. Default: 10.
    #[arg(long)]
    batch_size: Option<usize>,

    /// Starting rating for items without a prior. Default: 1000.
    #[arg(long)]
    standard_rating: Option<f64>,

    /// Question shown above each pair (e.g. "Which is more rewatchable?")
    #[arg(long)]
    question: Option<String>,

    /// Output JSON instead of table
    #[arg(long)]
    json: bool,

    /// Show progress during execution
    #[arg(short, long)]
    verbose: bool,

    /// Path to config file (default: ~/.config/elorank/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Parser)]
struct StandingsArgs {
    /// Directory for snapshots and the expected-score matrix (default: ./elorank-state)
    #[arg(long)]
    state_dir: Option<PathBuf>,

    /// Output JSON instead of table
    #[arg(long)]
    json: bool,

    /// Path to config file (default: ~/.config/elorank/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,
}

/// Settings after merging CLI args, config file and built-in defaults (in that order).
#[derive(Debug, PartialEq)]
struct Settings {
    state_dir: PathBuf,
    matchmaker: MatchmakerConfig,
    standard_rating: f64,
    question: String,
}

fn resolve_state_dir(arg: Option<&Path>, cfg: &ElorankConfig) -> PathBuf {
    arg.map(Path::to_path_buf)
        .or_else(|| cfg.state_dir.as_ref().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_STATE_DIR))
}

fn resolve_settings(args: &RankArgs, cfg: &ElorankConfig) -> Settings {
    Settings {
        state_dir: resolve_state_dir(args.state_dir.as_deref(), cfg),
        matchmaker: MatchmakerConfig {
            k_factor: args.k_factor.or(cfg.k_factor).unwrap_or(DEFAULT_K_FACTOR),
            min_comparisons: args
                .min_comparisons
                .or(cfg.min_comparisons)
                .unwrap_or(DEFAULT_MIN_COMPARISONS),
            batch_size: args.batch_size.or(cfg.batch_size).unwrap_or(DEFAULT_BATCH_SIZE),
        },
        standard_rating: args.standard_rating.or(cfg.standard_rating).unwrap_or(STANDARD_RATING),
        question: args
            .question
            .clone()
            .or_else(|| cfg.question.clone())
            .unwrap_or_else(|| prompt::DEFAULT_QUESTION.to_string()),
    }
}

/// Load items from --items file and --item inline args.
fn load_items(args: &RankArgs, standard_rating: f64) -> Vec<Item> {
    let mut seeds = Vec::new();

    // From file (auto-detects JSON vs one-per-line)
    if let Some(ref path) = args.items {
        let content = std::fs::read_to_string(path)
            .unwrap_or_else(|e| bail(format!("Failed to read items file {}: {e}", path.display())));
        seeds = parse::parse_items_from_str(&content)
            .unwrap_or_else(|e| bail(format!("{}: {e}", path.display())));
    }

    // From inline --item flags
    seeds.extend(
        args.inline_items
            .iter()
            .map(|name| name.trim())
            .filter(|name| !name.is_empty())
            .map(|name| parse::SeedItem {
                name: name.to_string(),
                prior: None,
                extra: Default::default(),
            }),
    );

    if seeds.is_empty() {
        bail("No items provided and no saved snapshot found. Use --items <file> or --item <name>.");
    }
    if seeds.len() < 2 {
        bail(format!("Need at least 2 items to rank, got {}", seeds.len()));
    }
    parse::seed_items(seeds, standard_rating)
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Rank(args) => run_rank(args),
        Commands::Standings(args) => run_standings(args),
        Commands::Init => {
            let path = config::create_default_config(&config::config_path());
            println!("Created config at {}", path.display());
            println!("Edit it to set your default state directory, K-factor, etc.");
        }
    }
}

fn run_rank(args: RankArgs) {
    // Load config file, merge with CLI args (CLI wins)
    let config_path = args.config.clone().unwrap_or_else(config::config_path);
    let cfg = config::load_config(&config_path);
    let settings = resolve_settings(&args, &cfg);

    let latest = storage::find_latest_snapshot(&settings.state_dir).unwrap_or_else(|e| bail(format!("{e:#}")));

    let (items, mut session, previous) = match latest {
        Some(path) => {
            let snapshot = storage::load_snapshot(&path).unwrap_or_else(|e| bail(format!("{e:#}")));
            if args.items.is_some() || !args.inline_items.is_empty() {
                eprintln!(
                    "Warning: resuming from {}; --items and --item are ignored.",
                    path.display()
                );
            }
            if args.verbose {
                eprintln!(
                    "Resuming {} items after {} comparisons from {}",
                    snapshot.items.len(),
                    snapshot.comparisons,
                    path.display(),
                );
            }
            (snapshot.to_items(), Session::resume(snapshot.comparisons), true)
        }
        None => (load_items(&args, settings.standard_rating), Session::new(), false),
    };

    let names: Vec<String> = items.iter().map(|i| i.name.clone()).collect();
    let matrix = storage::load_matrix(&settings.state_dir, &names, session.comparisons()).unwrap_or_else(|e| bail(format!("{e:#}")));
    if args.verbose && matrix.is_none() {
        eprintln!("No saved expected-score matrix, building one from the ratings");
    }

    let mut store = RatingStore::new(items, matrix).unwrap_or_else(|e| bail(e));
    // Positions before this session's judgments, for the movement columns.
    let previous = previous.then(|| store.snapshot());

    let mut matchmaker = Matchmaker::new(settings.matchmaker).unwrap_or_else(|e| bail(e));

    if args.verbose {
        let mm = matchmaker.config();
        eprintln!(
            "Ranking {} items (K = {}, {} comparisons per item before closest matchups, batches of {})",
            store.len(),
            mm.k_factor,
            mm.min_comparisons,
            mm.batch_size,
        );
        eprintln!("State directory: {}", settings.state_dir.display());
    }

    let started_at = session.comparisons();
    let stdin = io::stdin();
    let mut judge = TerminalJudge::new(stdin.lock(), io::stdout(), &settings.question, started_at, args.verbose);
    let outcome = matchmaker.run(&mut store, &mut session, &mut judge);

    // Save whatever was judged, even if the session ended in an error.
    let deltas = store.rank_and_delta(previous.as_ref());
    let snapshot = Snapshot::from_store(&store, &deltas, session.comparisons());
    let saved_to = storage::save_session(&settings.state_dir, &store, &snapshot)
        .unwrap_or_else(|e| bail(format!("{e:#}")));

    if args.verbose {
        eprintln!(
            "{} comparisons this session; saved to {}",
            session.comparisons() - started_at,
            saved_to.display(),
        );
    }

    if let Err(e) = outcome {
        bail(e);
    }

    print_snapshot(&snapshot, args.json);
}

fn run_standings(args: StandingsArgs) {
    let config_path = args.config.clone().unwrap_or_else(config::config_path);
    let cfg = config::load_config(&config_path);
    let state_dir = resolve_state_dir(args.state_dir.as_deref(), &cfg);

    let path = storage::find_latest_snapshot(&state_dir)
        .unwrap_or_else(|e| bail(format!("{e:#}")))
        .unwrap_or_else(|| bail(format!("No saved standings in {}", state_dir.display())));
    let snapshot = storage::load_snapshot(&path).unwrap_or_else(|e| bail(format!("{e:#}")));

    print_snapshot(&snapshot, args.json);
}

fn print_snapshot(snapshot: &Snapshot, json: bool) {
    let ranked = snapshot.ranked();
    if json {
        output::print_json(&ranked, snapshot.comparisons).unwrap_or_else(|e| bail(e));
    } else {
        output::print_table(&ranked, snapshot.comparisons);
    }
}
