use serde::{Serialize, Serializer};
use std::fmt;

/// A derived value that may have no data behind it.
///
/// `Unknown` means "nothing qualified", which is different from a value of
/// zero. Serializes as `null` and displays as `N/A`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Stat<T> {
    Unknown,
    Value(T),
}

impl<T> Stat<T> {
    pub fn value(self) -> Option<T> {
        match self {
            Stat::Unknown => None,
            Stat::Value(v) => Some(v),
        }
    }

    pub fn is_known(&self) -> bool {
        matches!(self, Stat::Value(_))
    }

    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Stat<U> {
        match self {
            Stat::Unknown => Stat::Unknown,
            Stat::Value(v) => Stat::Value(f(v)),
        }
    }
}

impl<T> From<Option<T>> for Stat<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => Stat::Value(v),
            None => Stat::Unknown,
        }
    }
}

impl<T: Serialize> Serialize for Stat<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Stat::Unknown => serializer.serialize_none(),
            Stat::Value(v) => serializer.serialize_some(v),
        }
    }
}

impl<T: fmt::Display> fmt::Display for Stat<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stat::Unknown => f.write_str("N/A"),
            Stat::Value(v) => v.fmt(f),
        }
    }
}

/// Compare two member identifiers. Names are case-insensitive everywhere.
pub fn same_member(a: &str, b: &str) -> bool {
    a.trim().to_lowercase() == b.trim().to_lowercase()
}

/// Placeholder tokens the catalog uses for "no data" in free-text fields.
pub fn is_unknown_token(token: &str) -> bool {
    let t = token.trim();
    t.is_empty() || t.eq_ignore_ascii_case("n/a") || t.eq_ignore_ascii_case("unknown")
}

#[derive(Debug, Clone, Serialize)]
pub struct ClubRating {
    pub user: String,
    pub score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blurb: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ClubInfo {
    pub selector: Option<String>,
    pub watch_date: Option<String>,
    pub ratings: Vec<ClubRating>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trophy_notes: Option<String>,
}

/// One film from the catalog, watched or still queued.
#[derive(Debug, Clone, Default, Serialize)]
pub struct FilmRecord {
    pub imdb_id: String,
    pub title: String,
    pub year: String,
    pub runtime: String,
    pub genre: String,
    pub country: String,
    pub language: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub club: Option<ClubInfo>,
}

impl FilmRecord {
    pub fn selector(&self) -> Option<&str> {
        self.club.as_ref()?.selector.as_deref()
    }

    pub fn watch_date(&self) -> Option<&str> {
        self.club
            .as_ref()?
            .watch_date
            .as_deref()
            .filter(|d| !d.trim().is_empty())
    }

    pub fn is_selected_by(&self, member: &str) -> bool {
        self.selector().is_some_and(|s| same_member(s, member))
    }

    pub fn ratings(&self) -> &[ClubRating] {
        self.club.as_ref().map(|c| c.ratings.as_slice()).unwrap_or(&[])
    }

    /// Numeric scores in rating order, with the user who gave them.
    pub fn numeric_scores(&self) -> Vec<(&str, f64)> {
        self.ratings()
            .iter()
            .filter_map(|r| r.score.map(|s| (r.user.as_str(), s)))
            .collect()
    }

    /// The member's own numeric score, if they gave one.
    pub fn score_of(&self, member: &str) -> Option<f64> {
        self.ratings()
            .iter()
            .find(|r| r.score.is_some() && same_member(&r.user, member))
            .and_then(|r| r.score)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MemberProfile {
    pub name: String,
    pub title: String,
    pub queue: Option<f64>,
}

impl MemberProfile {
    /// Only members with a positive queue number take part in cohort rankings.
    pub fn is_active(&self) -> bool {
        self.queue.is_some_and(|q| q > 0.0)
    }
}

/// The full in-memory snapshot every computation runs against.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub films: Vec<FilmRecord>,
    pub members: Vec<MemberProfile>,
}

impl Dataset {
    pub fn active_members(&self) -> Vec<&MemberProfile> {
        self.members.iter().filter(|m| m.is_active()).collect()
    }

    pub fn find_member(&self, name: &str) -> Option<&MemberProfile> {
        self.members.iter().find(|m| same_member(&m.name, name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stat_serializes_unknown_as_null() {
        let known: Stat<f64> = Stat::Value(2.5);
        let unknown: Stat<f64> = Stat::Unknown;
        assert_eq!(serde_json::to_string(&known).unwrap(), "2.5");
        assert_eq!(serde_json::to_string(&unknown).unwrap(), "null");
        assert_eq!(unknown.to_string(), "N/A");
    }

    #[test]
    fn member_names_are_case_insensitive() {
        assert!(same_member("Andy", "andy"));
        assert!(same_member(" GABE ", "gabe"));
        assert!(!same_member("joey", "jacob"));
    }

    #[test]
    fn active_requires_positive_queue() {
        let member = |queue| MemberProfile {
            name: "andy".into(),
            title: String::new(),
            queue,
        };
        assert!(member(Some(1.0)).is_active());
        assert!(!member(Some(0.0)).is_active());
        assert!(!member(Some(-2.0)).is_active());
        assert!(!member(None).is_active());
    }

    #[test]
    fn score_lookup_skips_unrated_entries() {
        let film = FilmRecord {
            club: Some(ClubInfo {
                ratings: vec![
                    ClubRating { user: "Andy".into(), score: None, blurb: None },
                    ClubRating { user: "gabe".into(), score: Some(7.0), blurb: None },
                ],
                ..Default::default()
            }),
            ..Default::default()
        };
        assert_eq!(film.score_of("andy"), None);
        assert_eq!(film.score_of("GABE"), Some(7.0));
        assert_eq!(film.numeric_scores(), vec![("gabe", 7.0)]);
    }
}
