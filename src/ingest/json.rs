use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{LoadError, Result};
use crate::model::{ClubInfo, ClubRating, FilmRecord};

/// One catalog entry as stored in `films.json`.
///
/// Field names follow the catalog (`imdbID`, `movieClubInfo`); capitalised
/// OMDb-style names are accepted too.
#[derive(Debug, Deserialize)]
pub struct JsonFilm {
    #[serde(rename = "imdbID", alias = "imdb_id")]
    pub imdb_id: Option<String>,
    #[serde(alias = "Title")]
    pub title: Option<String>,
    #[serde(alias = "Year")]
    pub year: Option<Value>,
    #[serde(alias = "Runtime")]
    pub runtime: Option<Value>,
    #[serde(alias = "Genre")]
    pub genre: Option<Value>,
    #[serde(alias = "Country")]
    pub country: Option<Value>,
    #[serde(alias = "Language")]
    pub language: Option<Value>,
    #[serde(rename = "movieClubInfo", alias = "clubInfo")]
    pub club_info: Option<JsonClubInfo>,
}

#[derive(Debug, Deserialize)]
pub struct JsonClubInfo {
    pub selector: Option<String>,
    #[serde(rename = "watchDate", alias = "watch_date")]
    pub watch_date: Option<Value>,
    /// Either a list of `{user, score, blurb}` or an older `{user: score}` map.
    #[serde(rename = "clubRatings", alias = "club_ratings")]
    pub club_ratings: Option<Value>,
    #[serde(rename = "trophyNotes", alias = "trophy_notes")]
    pub trophy_notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct JsonRating {
    pub user: Option<String>,
    pub score: Option<Value>,
    pub blurb: Option<String>,
}

/// Parse a JSON catalog into films.
pub fn parse_films(content: &str, origin: &str) -> Result<Vec<FilmRecord>> {
    let value: Value = serde_json::from_str(content).map_err(|source| LoadError::Json {
        origin: origin.to_string(),
        source,
    })?;
    Ok(films_from_value(value, origin))
}

/// Convert an already-parsed catalog document (JSON or YAML) into films.
///
/// The document is a list of films, or an object holding one. Entries that
/// are not film objects are skipped with a warning.
pub fn films_from_value(value: Value, origin: &str) -> Vec<FilmRecord> {
    let entries = match value {
        Value::Array(items) => items,
        Value::Object(map) => match map.into_iter().find_map(|(_, v)| match v {
            Value::Array(items) => Some(items),
            _ => None,
        }) {
            Some(items) => items,
            None => {
                warn!("{origin}: no film list found");
                Vec::new()
            }
        },
        _ => {
            warn!("{origin}: expected a list of films");
            Vec::new()
        }
    };

    let mut films = Vec::with_capacity(entries.len());
    for (index, entry) in entries.into_iter().enumerate() {
        match serde_json::from_value::<JsonFilm>(entry) {
            Ok(raw) => films.push(film_from_json(raw)),
            Err(e) => warn!("{origin}: skipping entry {index}: {e}"),
        }
    }
    debug!("{origin}: {} films", films.len());
    films
}

fn film_from_json(raw: JsonFilm) -> FilmRecord {
    let title = raw
        .title
        .filter(|t| !t.trim().is_empty())
        .unwrap_or_else(|| "Untitled".to_string());

    let club = raw.club_info.map(|info| {
        let ratings = info
            .club_ratings
            .map(|r| ratings_from_value(r, &title))
            .unwrap_or_default();
        ClubInfo {
            selector: info.selector.filter(|s| !s.trim().is_empty()),
            watch_date: Some(text(info.watch_date)).filter(|d| !d.trim().is_empty()),
            ratings,
            trophy_notes: info.trophy_notes.filter(|t| !t.trim().is_empty()),
        }
    });

    FilmRecord {
        imdb_id: raw.imdb_id.unwrap_or_default(),
        title,
        year: text(raw.year),
        runtime: text(raw.runtime),
        genre: text(raw.genre),
        country: text(raw.country),
        language: text(raw.language),
        club,
    }
}

fn ratings_from_value(value: Value, title: &str) -> Vec<ClubRating> {
    match value {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| match serde_json::from_value::<JsonRating>(item) {
                Ok(r) => {
                    let user = r.user.filter(|u| !u.trim().is_empty())?;
                    let score = r.score.as_ref().and_then(|s| score(s, &user, title));
                    Some(ClubRating {
                        user,
                        score,
                        blurb: r.blurb.filter(|b| !b.is_empty()),
                    })
                }
                Err(e) => {
                    warn!("\"{title}\": skipping malformed rating: {e}");
                    None
                }
            })
            .collect(),
        Value::Object(map) => map
            .into_iter()
            .map(|(user, entry)| {
                let (raw_score, blurb) = match entry {
                    Value::Object(mut fields) => (
                        fields.remove("score").unwrap_or(Value::Null),
                        fields
                            .remove("blurb")
                            .and_then(|b| b.as_str().map(str::to_string))
                            .filter(|b| !b.is_empty()),
                    ),
                    other => (other, None),
                };
                let score = score(&raw_score, &user, title);
                ClubRating { user, score, blurb }
            })
            .collect(),
        Value::Null => Vec::new(),
        _ => {
            warn!("\"{title}\": clubRatings is neither a list nor a map");
            Vec::new()
        }
    }
}

/// A finite numeric score, or `None` for unrated. Unusable values are logged.
fn score(value: &Value, user: &str, title: &str) -> Option<f64> {
    match value {
        Value::Null => None,
        Value::Number(n) => {
            let score = n.as_f64().filter(|s| s.is_finite());
            if score.is_none() {
                warn!("\"{title}\": dropping non-finite score from {user}");
            }
            score
        }
        Value::String(s) if s.trim().is_empty() => None,
        Value::String(s) => match s.trim().parse::<f64>() {
            Ok(score) if score.is_finite() => Some(score),
            _ => {
                warn!("\"{title}\": dropping unparsable score {s:?} from {user}");
                None
            }
        },
        other => {
            warn!("\"{title}\": dropping unexpected score {other} from {user}");
            None
        }
    }
}

/// Flatten a loosely typed text field. Lists are joined with ", ".
fn text(value: Option<Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s,
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Array(items)) => items
            .into_iter()
            .filter_map(|v| match v {
                Value::String(s) => Some(s),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join(", "),
        Some(other) => other.to_string(),
    }
}
