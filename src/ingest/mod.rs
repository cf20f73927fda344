pub mod json;
pub mod members;

use serde::Serialize;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::error::{LoadError, Result};
use crate::model::{Dataset, FilmRecord, MemberProfile};
use crate::stats::dates::parse_watch_date_today;
use crate::stats::members::parse_runtime_minutes;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Format {
    Json,
    Yaml,
}

impl Format {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "json" => Some(Format::Json),
            "yaml" | "yml" => Some(Format::Yaml),
            _ => None,
        }
    }

    pub fn detect_from_extension(path: &Path) -> Option<Self> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Some(Format::Json),
            Some("yaml" | "yml") => Some(Format::Yaml),
            _ => None,
        }
    }
}

/// Load the catalog from a file, a directory of catalog files, or a glob.
/// Films from several files are concatenated in path order.
pub fn load_films(path_str: &str, format_override: Option<Format>) -> Result<Vec<FilmRecord>> {
    let path = Path::new(path_str);
    if path.is_dir() {
        return load_directory(path, format_override);
    }
    if path.is_file() {
        return load_film_file(path, format_override);
    }

    let matches: Vec<PathBuf> = glob::glob(path_str)
        .map_err(|_| LoadError::Pattern(path_str.to_string()))?
        .filter_map(|r| r.ok())
        .filter(|p| p.is_file())
        .collect();

    if matches.is_empty() {
        return Err(LoadError::NoMatches(path_str.to_string()));
    }

    let mut films = Vec::new();
    for entry in matches {
        films.extend(load_film_file(&entry, format_override)?);
    }
    Ok(films)
}

fn load_directory(dir: &Path, format_override: Option<Format>) -> Result<Vec<FilmRecord>> {
    let mut entries: Vec<_> = std::fs::read_dir(dir)
        .map_err(|source| LoadError::Read {
            path: dir.to_path_buf(),
            source,
        })?
        .filter_map(|e| e.ok())
        .collect();
    entries.sort_by_key(|e| e.path());

    let mut films = Vec::new();
    for entry in entries {
        let path = entry.path();
        if path.is_dir() {
            films.extend(load_directory(&path, format_override)?);
        } else if path.is_file()
            && (format_override.is_some() || Format::detect_from_extension(&path).is_some())
        {
            films.extend(load_film_file(&path, format_override)?);
        }
    }
    Ok(films)
}

fn load_film_file(path: &Path, format_override: Option<Format>) -> Result<Vec<FilmRecord>> {
    let (value, origin) = read_document(path, format_override)?;
    let films = json::films_from_value(value, &origin);
    info!("Loaded {} films from {origin}", films.len());
    Ok(films)
}

/// Load member profiles from a JSON or YAML file.
pub fn load_members(path: &Path, format_override: Option<Format>) -> Result<Vec<MemberProfile>> {
    let (value, origin) = read_document(path, format_override)?;
    let members = members::members_from_value(value, &origin);
    info!("Loaded {} members from {origin}", members.len());
    Ok(members)
}

/// Load films and members into one snapshot.
///
/// A missing members file is not fatal: members are derived from the catalog
/// and nobody is ranked. `format_override` applies to both files.
pub fn load_dataset(
    films_path: &str,
    members_path: &Path,
    format_override: Option<Format>,
) -> Result<Dataset> {
    let films = load_films(films_path, format_override)?;
    let members = if members_path.exists() {
        load_members(members_path, format_override)?
    } else {
        warn!(
            "Members file not found: {}; rankings are unavailable",
            members_path.display()
        );
        members::members_from_films(&films)
    };
    Ok(Dataset { films, members })
}

fn read_document(path: &Path, format_override: Option<Format>) -> Result<(Value, String)> {
    let format = format_override
        .or_else(|| Format::detect_from_extension(path))
        .ok_or_else(|| LoadError::UnknownFormat(path.to_path_buf()))?;

    let content = std::fs::read_to_string(path).map_err(|source| LoadError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let origin = path.display().to_string();

    let value = parse_document(&content, format, &origin)?;
    Ok((value, origin))
}

/// Parse file content into a generic document tree.
pub fn parse_document(content: &str, format: Format, origin: &str) -> Result<Value> {
    match format {
        Format::Json => serde_json::from_str(content).map_err(|source| LoadError::Json {
            origin: origin.to_string(),
            source,
        }),
        Format::Yaml => serde_yaml::from_str(content).map_err(|source| LoadError::Yaml {
            origin: origin.to_string(),
            source,
        }),
    }
}

/// Catalog health report for `clubstats check`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DataQuality {
    pub films: usize,
    pub with_club_info: usize,
    pub watched: usize,
    pub unscheduled: usize,
    pub unrated: usize,
    /// Titles whose watch date is present but unusable.
    pub bad_watch_dates: Vec<String>,
    /// Titles of club selections whose runtime cannot be read.
    pub bad_runtimes: Vec<String>,
}

/// Scan the catalog for values the statistics will silently skip, logging each one.
pub fn audit(films: &[FilmRecord]) -> DataQuality {
    let mut report = DataQuality {
        films: films.len(),
        ..Default::default()
    };

    for film in films {
        let Some(club) = &film.club else {
            continue;
        };
        report.with_club_info += 1;

        match film.watch_date() {
            None => report.unscheduled += 1,
            Some(date) if parse_watch_date_today(date).is_some() => report.watched += 1,
            Some(date) => {
                warn!("\"{}\": unusable watch date {date:?}", film.title);
                report.bad_watch_dates.push(film.title.clone());
            }
        }

        if club.selector.is_some() && parse_runtime_minutes(&film.runtime).is_none() {
            warn!("\"{}\": unreadable runtime {:?}", film.title, film.runtime);
            report.bad_runtimes.push(film.title.clone());
        }

        if film.numeric_scores().is_empty() {
            report.unrated += 1;
        }
    }

    report
}
