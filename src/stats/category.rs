//! Country, language and decade buckets for charts and drill-down.

use regex::Regex;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::LazyLock;

use crate::model::{is_unknown_token, FilmRecord};

static LEADING_YEAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(\d{4})").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryKind {
    Country,
    Language,
    Decade,
}

impl CategoryKind {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "country" | "countries" => Some(CategoryKind::Country),
            "language" | "languages" => Some(CategoryKind::Language),
            "decade" | "decades" => Some(CategoryKind::Decade),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            CategoryKind::Country => "country",
            CategoryKind::Language => "language",
            CategoryKind::Decade => "decade",
        }
    }
}

/// One chart bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryCount {
    pub label: String,
    pub count: usize,
}

/// First comma-separated token of a free-text field, unless it is a placeholder.
pub fn primary_token(field: &str) -> Option<&str> {
    let token = field.split(',').next()?.trim();
    if is_unknown_token(token) {
        None
    } else {
        Some(token)
    }
}

/// Release decade from a year field such as `"1994"` or `"2005–2007"`.
pub fn decade_of(year: &str) -> Option<i32> {
    let caps = LEADING_YEAR.captures(year)?;
    let year: i32 = caps[1].parse().ok()?;
    Some(year.div_euclid(10) * 10)
}

pub fn decade_label(decade: i32) -> String {
    format!("{decade}s")
}

/// Bucket label of one film for the given category, if it has one.
pub fn category_label(film: &FilmRecord, kind: CategoryKind) -> Option<String> {
    match kind {
        CategoryKind::Country => primary_token(&film.country).map(str::to_string),
        CategoryKind::Language => primary_token(&film.language).map(str::to_string),
        CategoryKind::Decade => decade_of(&film.year).map(decade_label),
    }
}

/// Count films per bucket.
///
/// Countries and languages group case-insensitively under the first spelling
/// seen and come out by count descending (label ascending on ties); decades
/// come out in timeline order.
pub fn category_counts(films: &[FilmRecord], kind: CategoryKind) -> Vec<CategoryCount> {
    if kind == CategoryKind::Decade {
        let mut decades: HashMap<i32, usize> = HashMap::new();
        for decade in films.iter().filter_map(|f| decade_of(&f.year)) {
            *decades.entry(decade).or_insert(0) += 1;
        }
        let mut sorted: Vec<(i32, usize)> = decades.into_iter().collect();
        sorted.sort_by_key(|(decade, _)| *decade);
        return sorted
            .into_iter()
            .map(|(decade, count)| CategoryCount {
                label: decade_label(decade),
                count,
            })
            .collect();
    }

    let mut counts: HashMap<String, CategoryCount> = HashMap::new();
    for label in films.iter().filter_map(|f| category_label(f, kind)) {
        counts
            .entry(label.to_lowercase())
            .or_insert_with(|| CategoryCount { label, count: 0 })
            .count += 1;
    }

    let mut buckets: Vec<CategoryCount> = counts.into_values().collect();
    buckets.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.label.cmp(&b.label)));
    buckets
}

/// Drill-down: the films that fall into one bucket.
///
/// Labels compare case-insensitively; decades accept `"1990s"` or `"1990"`.
pub fn films_in_category<'a>(
    films: &'a [FilmRecord],
    kind: CategoryKind,
    label: &str,
) -> Vec<&'a FilmRecord> {
    let wanted = label.trim();
    let folded = wanted.to_lowercase();
    match kind {
        CategoryKind::Decade => {
            let Some(decade) = wanted
                .trim_end_matches(['s', 'S'])
                .parse::<i32>()
                .ok()
                .map(|y| y.div_euclid(10) * 10)
            else {
                return Vec::new();
            };
            films
                .iter()
                .filter(|f| decade_of(&f.year) == Some(decade))
                .collect()
        }
        _ => films
            .iter()
            .filter(|f| {
                category_label(f, kind).is_some_and(|l| l.to_lowercase() == folded)
            })
            .collect(),
    }
}
