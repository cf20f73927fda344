use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use crate::model::{same_member, FilmRecord, MemberProfile};

#[derive(Debug, Deserialize)]
pub struct RawMember {
    pub name: Option<String>,
    #[serde(alias = "displayTitle", alias = "display_title")]
    pub title: Option<String>,
    pub queue: Option<Value>,
}

/// Convert a parsed members document: a list, or an object with a `members` list.
pub fn members_from_value(value: Value, origin: &str) -> Vec<MemberProfile> {
    let entries = match value {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("members") {
            Some(Value::Array(items)) => items,
            _ => {
                warn!("{origin}: no members list found");
                Vec::new()
            }
        },
        _ => {
            warn!("{origin}: expected a list of members");
            Vec::new()
        }
    };

    entries
        .into_iter()
        .enumerate()
        .filter_map(|(index, entry)| {
            let raw: RawMember = match serde_json::from_value(entry) {
                Ok(raw) => raw,
                Err(e) => {
                    warn!("{origin}: skipping member {index}: {e}");
                    return None;
                }
            };
            let Some(name) = raw.name.filter(|n| !n.trim().is_empty()) else {
                warn!("{origin}: skipping member {index} without a name");
                return None;
            };
            let queue = raw.queue.and_then(|q| queue_number(&q, &name));
            Some(MemberProfile {
                title: raw.title.unwrap_or_default(),
                name,
                queue,
            })
        })
        .collect()
}

fn queue_number(value: &Value, name: &str) -> Option<f64> {
    match value {
        Value::Null => None,
        Value::Number(n) => n.as_f64(),
        Value::String(s) if s.trim().is_empty() => None,
        Value::String(s) => {
            let parsed = s.trim().parse::<f64>().ok();
            if parsed.is_none() {
                warn!("{name}: ignoring unparsable queue {s:?}");
            }
            parsed
        }
        other => {
            warn!("{name}: ignoring unexpected queue {other}");
            None
        }
    }
}

/// Profiles for everyone who selected or rated a film, used when no members
/// file exists. None of them is active, so nothing gets ranked.
pub fn members_from_films(films: &[FilmRecord]) -> Vec<MemberProfile> {
    let mut members: Vec<MemberProfile> = Vec::new();
    let names = films.iter().flat_map(|f| {
        f.selector()
            .into_iter()
            .chain(f.ratings().iter().map(|r| r.user.as_str()))
    });
    for name in names {
        if !members.iter().any(|m| same_member(&m.name, name)) {
            members.push(MemberProfile {
                name: name.trim().to_string(),
                title: String::new(),
                queue: None,
            });
        }
    }
    members
}
