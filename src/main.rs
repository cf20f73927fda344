use anyhow::{bail, Context, Result};
use chrono::Datelike;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::debug;

use clubstats::config::{self, ClubConfig};
use clubstats::ingest;
use clubstats::model::Dataset;
use clubstats::output::{csv as csv_out, json as json_out, table};
use clubstats::stats::category::{self, CategoryKind};
use clubstats::stats::{consensus, intervals, ranking};

#[derive(Parser)]
#[command(name = "clubstats", version, about = "Film club statistics: member metrics, rankings, consensus and timeline")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Film catalog: file, directory or glob (default: ~/.clubstats/films.json)
    #[arg(long, global = true, env = config::FILMS_ENV)]
    films: Option<String>,

    /// Member list, JSON or YAML (default: ~/.clubstats/members.json)
    #[arg(long, global = true, env = config::MEMBERS_ENV)]
    members: Option<PathBuf>,

    /// Force input format instead of detecting it from the extension: json, yaml
    #[arg(long, global = true)]
    format: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Rank every active member on every metric
    Members,

    /// Show one member's profile
    Member {
        /// Member name (case-insensitive)
        name: String,

        /// Controversial films to list (default from config, else 4)
        #[arg(long)]
        limit: Option<usize>,
    },

    /// List films the whole club scored identically
    Unanimous,

    /// Films where a member strayed furthest from the club
    Controversial {
        /// Member name (case-insensitive)
        name: String,

        /// Maximum results (default from config, else 4)
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Count films per country, language or decade
    Categories {
        /// country, language or decade
        kind: String,

        /// Only count films the club has watched
        #[arg(long)]
        watched: bool,
    },

    /// List films, optionally drilled down to one category bucket
    Films {
        /// Filter by primary country
        #[arg(long, conflicts_with_all = ["language", "decade"])]
        country: Option<String>,

        /// Filter by primary language
        #[arg(long, conflicts_with = "decade")]
        language: Option<String>,

        /// Filter by release decade (e.g. 1990s)
        #[arg(long)]
        decade: Option<String>,

        /// Only films the club has watched
        #[arg(long)]
        watched: bool,
    },

    /// Founding date, days active and gaps between meetings
    Timeline {
        /// List every interval
        #[arg(long)]
        intervals: bool,
    },

    /// Report catalog values the statistics skip
    Check,

    /// Export club data to CSV
    Export {
        /// Output file
        out: PathBuf,
    },

    /// Manage ~/.clubstats/config.toml
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Write the default config template
    Init,
    /// Print the effective config
    Show,
    /// Print the config file path
    Path,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let json_output = cli.json;
    let cfg = ClubConfig::load()?;

    if let Commands::Config { action } = &cli.command {
        return run_config(action, &cfg);
    }

    let films_path = config::resolve_location(
        cli.films.as_deref(),
        config::FILMS_ENV,
        cfg.films.as_deref(),
        config::default_films_path,
    )?;
    let members_path = config::resolve_location(
        cli.members.as_deref().and_then(Path::to_str),
        config::MEMBERS_ENV,
        cfg.members.as_deref().and_then(Path::to_str),
        config::default_members_path,
    )?;

    let format = cli
        .format
        .as_deref()
        .map(|f| {
            ingest::Format::from_str(f).with_context(|| format!("Unknown format: {f}. Use: json, yaml"))
        })
        .transpose()?;

    let dataset = ingest::load_dataset(&films_path, Path::new(&members_path), format)
        .with_context(|| format!("Failed to load catalog: {films_path}"))?;
    debug!(
        "Dataset: {} films, {} members ({} active)",
        dataset.films.len(),
        dataset.members.len(),
        dataset.active_members().len()
    );

    let today = chrono::Utc::now().date_naive();

    match cli.command {
        Commands::Members => {
            let standings = ranking::cohort_standings(&dataset.films, &dataset.members);
            if json_output {
                json_out::print_json("members", &standings)?;
            } else {
                table::print_standings(&standings);
            }
        }

        Commands::Member { name, limit } => {
            let standing = ranking::member_standing(&dataset.films, &dataset.members, &name)
                .with_context(|| format!("Member not found: {name}"))?;
            let mut controversial = consensus::controversial_films(&dataset.films, &standing.member);
            controversial.truncate(limit.unwrap_or_else(|| cfg.controversial_limit()));

            if json_output {
                json_out::print_json(
                    "member",
                    &serde_json::json!({
                        "standing": standing,
                        "controversial": controversial,
                    }),
                )?;
            } else {
                table::print_member_profile(&standing, &controversial);
            }
        }

        Commands::Unanimous => {
            let groups = consensus::unanimous_groups(&dataset.films, today.year());
            if json_output {
                json_out::print_json("unanimous", &groups)?;
            } else {
                table::print_unanimous(&groups);
            }
        }

        Commands::Controversial { name, limit } => {
            let member = require_member(&dataset, &name)?;
            let mut entries = consensus::controversial_films(&dataset.films, &member);
            entries.truncate(limit.unwrap_or_else(|| cfg.controversial_limit()));
            if json_output {
                json_out::print_json("controversial", &entries)?;
            } else {
                table::print_controversial(&member, &entries);
            }
        }

        Commands::Categories { kind, watched } => {
            let kind = CategoryKind::from_str(&kind)
                .with_context(|| format!("Unknown category: {kind}. Use: country, language, decade"))?;
            let films = scope(&dataset, watched, today.year());
            let buckets = category::category_counts(&films, kind);
            if json_output {
                json_out::print_json("categories", &buckets)?;
            } else {
                table::print_categories(kind, &buckets);
            }
        }

        Commands::Films {
            country,
            language,
            decade,
            watched,
        } => {
            let films = scope(&dataset, watched, today.year());
            let filter = country
                .map(|c| (CategoryKind::Country, c))
                .or(language.map(|l| (CategoryKind::Language, l)))
                .or(decade.map(|d| (CategoryKind::Decade, d)));
            let selected: Vec<_> = match &filter {
                Some((kind, label)) => category::films_in_category(&films, *kind, label),
                None => films.iter().collect(),
            };
            if json_output {
                json_out::print_json("films", &selected)?;
            } else {
                table::print_films(&selected);
            }
        }

        Commands::Timeline { intervals: show } => {
            let line = intervals::timeline(&dataset.films, today);
            if json_output {
                json_out::print_json("timeline", &line)?;
            } else {
                table::print_timeline(&line, show);
            }
        }

        Commands::Check => {
            let report = ingest::audit(&dataset.films);
            if json_output {
                json_out::print_json("check", &report)?;
            } else {
                table::print_data_quality(&report);
            }
        }

        Commands::Export { out } => {
            let count = csv_out::export_csv(&out, &dataset.films, &dataset.members)?;
            println!("Exported {count} film{} to {}", if count == 1 { "" } else { "s" }, out.display());
        }

        Commands::Config { action } => run_config(&action, &cfg)?,
    }

    Ok(())
}

fn run_config(action: &ConfigAction, cfg: &ClubConfig) -> Result<()> {
    match action {
        ConfigAction::Init => {
            let path = config::config_path()?;
            if config::init_config()? {
                println!("Wrote {}", path.display());
            } else {
                println!("Config already exists: {}", path.display());
            }
        }
        ConfigAction::Show => println!("{}", cfg.display()),
        ConfigAction::Path => println!("{}", config::config_path()?.display()),
    }
    Ok(())
}

/// Canonical spelling of a member name, from the member list or the catalog.
fn require_member(dataset: &Dataset, name: &str) -> Result<String> {
    if let Some(profile) = dataset.find_member(name) {
        return Ok(profile.name.clone());
    }
    bail!("Member not found: {name}");
}

/// The whole catalog, or only films with a usable watch date.
fn scope(dataset: &Dataset, watched_only: bool, current_year: i32) -> Vec<clubstats::model::FilmRecord> {
    if watched_only {
        intervals::watched_films(&dataset.films, current_year)
            .into_iter()
            .map(|w| w.film.clone())
            .collect()
    } else {
        dataset.films.clone()
    }
}
