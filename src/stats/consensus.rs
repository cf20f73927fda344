//! Unanimous scores and controversial picks.

use chrono::NaiveDate;
use serde::Serialize;
use std::cmp::Ordering;

use crate::model::{same_member, FilmRecord, Stat};
use crate::stats::dates::parse_watch_date;
use crate::stats::members::divergence_on;

/// How many controversial films a member profile lists.
pub const DEFAULT_CONTROVERSIAL_LIMIT: usize = 4;

#[derive(Debug, Clone, Copy, Serialize)]
pub struct DatedFilm<'a> {
    pub film: &'a FilmRecord,
    pub watch_date: Stat<NaiveDate>,
}

/// Films every rater scored the same, keyed by that score.
#[derive(Debug, Clone, Serialize)]
pub struct UnanimousGroup<'a> {
    pub score: f64,
    /// Earliest-watched film with this unanimous score.
    pub namesake: DatedFilm<'a>,
    pub others: Vec<DatedFilm<'a>>,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct DivergentEntry<'a> {
    pub film: &'a FilmRecord,
    pub member_score: f64,
    pub others_mean: f64,
    pub divergence: f64,
}

/// The shared score when at least two members rated `film` and all agree.
pub fn unanimous_score(film: &FilmRecord) -> Option<f64> {
    let scores = film.numeric_scores();
    if scores.len() < 2 {
        return None;
    }
    let first = scores[0].1;
    scores.iter().all(|(_, s)| *s == first).then_some(first)
}

fn by_watch_date(a: &DatedFilm<'_>, b: &DatedFilm<'_>) -> Ordering {
    // Unscheduled films sort after dated ones.
    let dates = match (a.watch_date.value(), b.watch_date.value()) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    };
    dates.then_with(|| a.film.title.cmp(&b.film.title))
}

/// Group unanimously scored films by score, highest score first.
///
/// Watch dates more than five years past `current_year` count as undated.
pub fn unanimous_groups(films: &[FilmRecord], current_year: i32) -> Vec<UnanimousGroup<'_>> {
    let mut buckets: Vec<(f64, Vec<DatedFilm<'_>>)> = Vec::new();

    for film in films {
        let Some(score) = unanimous_score(film) else {
            continue;
        };
        let dated = DatedFilm {
            film,
            watch_date: film
                .watch_date()
                .and_then(|d| parse_watch_date(d, current_year))
                .into(),
        };
        match buckets.iter_mut().find(|(s, _)| *s == score) {
            Some((_, members)) => members.push(dated),
            None => buckets.push((score, vec![dated])),
        }
    }

    buckets.sort_by(|a, b| b.0.total_cmp(&a.0));
    buckets
        .into_iter()
        .filter_map(|(score, mut dated)| {
            dated.sort_by(by_watch_date);
            let mut iter = dated.into_iter();
            let namesake = iter.next()?;
            Some(UnanimousGroup {
                score,
                namesake,
                others: iter.collect(),
            })
        })
        .collect()
}

/// The rater who strays furthest from the rest of the club on `film`.
///
/// Requires two numeric ratings. Ties go to whoever appears first in the
/// rating list.
pub fn most_divergent_rater(film: &FilmRecord) -> Option<(&str, f64)> {
    let scores = film.numeric_scores();
    if scores.len() < 2 {
        return None;
    }

    let mut best: Option<(&str, f64)> = None;
    for (user, _) in scores {
        let Some(d) = divergence_on(film, user) else {
            continue;
        };
        let beats = match best {
            Some((_, top)) => d.divergence > top,
            None => true,
        };
        if beats {
            best = Some((user, d.divergence));
        }
    }
    best
}

/// Films where `member` was the single most divergent rater, largest first.
///
/// Callers usually keep the first [`DEFAULT_CONTROVERSIAL_LIMIT`].
pub fn controversial_films<'a>(films: &'a [FilmRecord], member: &str) -> Vec<DivergentEntry<'a>> {
    let mut entries: Vec<DivergentEntry<'a>> = films
        .iter()
        .filter_map(|film| {
            let (rater, divergence) = most_divergent_rater(film)?;
            if !same_member(rater, member) || divergence <= 0.0 {
                return None;
            }
            let d = divergence_on(film, member)?;
            Some(DivergentEntry {
                film,
                member_score: d.member_score,
                others_mean: d.others_mean,
                divergence: d.divergence,
            })
        })
        .collect();

    entries.sort_by(|a, b| b.divergence.total_cmp(&a.divergence));
    entries
}
