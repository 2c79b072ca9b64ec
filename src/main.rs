mod crawl;
mod db;
mod discovery;
mod fetch;
mod matcher;
mod parser;
mod resolve;
mod settings;
mod similarity;
mod text;

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use anyhow::Result;
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};

use db::PersonRecord;
use matcher::{MatchOptions, MatchResult};
use settings::Settings;

#[derive(Parser)]
#[command(name = "mcml", version, about = "Query MCML people from a local database")]
struct Cli {
    /// Path to the SQLite database (default: $XDG_DATA_HOME/mcml/mcml.sqlite)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scrape the team pages and rebuild the local database
    Export,
    /// Fuzzy lookup by name (names may be partial or misspelled)
    Lookup {
        /// Free-text name, e.g. "Anna Schmidt"
        name: Vec<String>,
        /// First name
        #[arg(long)]
        first: Option<String>,
        /// Last name
        #[arg(long)]
        last: Option<String>,
        /// Max results
        #[arg(short = 'n', long, default_value = "10", value_parser = clap::value_parser!(u16).range(1..=50))]
        limit: u16,
        /// Minimum score in [0, 1] (default from settings)
        #[arg(long, value_parser = parse_threshold)]
        threshold: Option<f64>,
        /// Print results as JSON
        #[arg(long)]
        json: bool,
    },
    /// Yes/no: is this person likely listed?
    Check {
        #[arg(long)]
        first: Option<String>,
        #[arg(long)]
        last: Option<String>,
    },
    /// Show database location, size and last update
    Info,
}

const EXIT_NO_MATCH: u8 = 1;
const EXIT_UNUSABLE: u8 = 2;
const CHECK_LIMIT: usize = 5;

fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();
    let settings = Settings::load()?;
    let db_path = cli.db.clone().unwrap_or_else(|| settings.db_path());

    let code = match cli.command {
        Commands::Export => {
            let site = settings.site()?;
            let fetcher = fetch::HttpFetcher::new(&settings)?;
            let pb = ProgressBar::new(0);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("[{elapsed_precise}] {bar:40} {pos}/{len} pages")?
                    .progress_chars("=> "),
            );
            let report = crawl::collect_people(&fetcher, &site, &settings.seed_pages, &pb)?;

            let conn = db::connect(&db_path)?;
            db::init_schema(&conn)?;
            let stored = db::replace_all_people(&conn, &report.people)?;
            println!(
                "Stored {} people ({} mentions on {} pages) in {}",
                stored,
                report.candidates,
                report.pages,
                db_path.display()
            );
            ExitCode::SUCCESS
        }
        Commands::Lookup { name, first, last, limit, threshold, json } => {
            let query = query_text(&name, first.as_deref(), last.as_deref());
            if query.is_empty() {
                println!("Please give a name or --first/--last.");
                return Ok(ExitCode::from(EXIT_UNUSABLE));
            }
            let Some(records) = load_records(&db_path)? else {
                return Ok(ExitCode::from(EXIT_UNUSABLE));
            };
            let opts = MatchOptions {
                first: first.as_deref(),
                last: last.as_deref(),
                limit: limit as usize,
                threshold: threshold.unwrap_or(settings.threshold),
            };
            let matches = matcher::find_best_matches(&query, &records, &opts);
            if json {
                println!("{}", serde_json::to_string_pretty(&matches)?);
            }
            if matches.is_empty() {
                if !json {
                    println!("No close matches found.");
                }
                ExitCode::from(EXIT_NO_MATCH)
            } else {
                if !json {
                    print_matches(&matches, &format!("Candidates for: {}", query));
                }
                ExitCode::SUCCESS
            }
        }
        Commands::Check { first, last } => {
            let query = query_text(&[], first.as_deref(), last.as_deref());
            if query.is_empty() {
                println!("Please provide --first and/or --last.");
                return Ok(ExitCode::from(EXIT_UNUSABLE));
            }
            let Some(records) = load_records(&db_path)? else {
                return Ok(ExitCode::from(EXIT_UNUSABLE));
            };
            let opts = MatchOptions {
                first: first.as_deref(),
                last: last.as_deref(),
                limit: CHECK_LIMIT,
                threshold: settings.threshold,
            };
            let matches = matcher::find_best_matches(&query, &records, &opts);
            if is_strong(&matches, settings.strong_match) {
                println!("Yes, likely an MCML member.");
            } else {
                println!("No strong match found in the local DB.");
            }
            if !matches.is_empty() {
                print_matches(&matches, &format!("Top matches for: {}", query));
            }
            ExitCode::SUCCESS
        }
        Commands::Info => {
            let conn = db::connect(&db_path)?;
            db::init_schema(&conn)?;
            let count = db::count_people(&conn)?;
            let ts = db::last_updated(&conn)?;
            println!("DB:                 {}", db_path.display());
            println!("People:             {}", count);
            println!("Last updated (UTC): {}", ts.as_deref().unwrap_or("never"));
            ExitCode::SUCCESS
        }
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        eprintln!("\nDone in {}", format_duration(elapsed));
    }

    Ok(code)
}

/// Records to match against, or `None` (after telling the user) when the
/// store is empty.
fn load_records(db_path: &std::path::Path) -> Result<Option<Vec<PersonRecord>>> {
    let conn = db::connect(db_path)?;
    db::init_schema(&conn)?;
    let records: Vec<PersonRecord> = db::fetch_all(&conn)?.into_iter().map(|p| p.record).collect();
    if records.is_empty() {
        println!(
            "Database is empty. Run 'mcml export' first. DB: {}",
            db_path.display()
        );
        return Ok(None);
    }
    Ok(Some(records))
}

/// Free text wins; otherwise "first last" from the explicit parts.
fn query_text(name: &[String], first: Option<&str>, last: Option<&str>) -> String {
    let free = text::clean_ws(&name.join(" "));
    if !free.is_empty() {
        return free;
    }
    let parts: Vec<&str> = [first, last]
        .into_iter()
        .flatten()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect();
    parts.join(" ")
}

fn is_strong(matches: &[MatchResult], strong: f64) -> bool {
    matches.first().is_some_and(|m| m.score >= strong)
}

fn print_matches(matches: &[MatchResult], title: &str) {
    println!("{}\n", title);
    println!(
        "{:>5} | {:<28} | {:<24} | {:<20} | {}",
        "Score", "Name", "Role", "Note", "Profile"
    );
    println!("{}", "-".repeat(100));
    for m in matches {
        println!(
            "{:>5.2} | {:<28} | {:<24} | {:<20} | {}",
            m.score,
            truncate(&m.full_name, 28),
            truncate(&m.role, 24),
            truncate(&m.note, 20),
            m.profile_url
        );
    }
}

fn parse_threshold(s: &str) -> Result<f64, String> {
    let value: f64 = s.parse().map_err(|_| format!("`{}` is not a number", s))?;
    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(format!("{} is not in 0..=1", value))
    }
}

/// Cut to at most `max` chars including the trailing "...", so table columns stay aligned.
fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", truncated)
    }
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}
