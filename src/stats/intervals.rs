//! Meeting cadence: when the club started and how far apart meetings fall.

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::model::{FilmRecord, Stat};
use crate::stats::dates::{days_between, parse_watch_date};

#[derive(Debug, Clone, Copy, Serialize)]
pub struct WatchedFilm<'a> {
    pub date: NaiveDate,
    pub film: &'a FilmRecord,
}

/// Gap between two consecutive meetings.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct MeetingInterval<'a> {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub days: i64,
    /// Film watched on `end`.
    pub film: &'a FilmRecord,
}

#[derive(Debug, Clone, Serialize)]
pub struct Timeline<'a> {
    pub founding_date: Stat<NaiveDate>,
    pub days_active: Stat<i64>,
    pub meetings: usize,
    pub intervals: Vec<MeetingInterval<'a>>,
    pub longest_gap: Stat<MeetingInterval<'a>>,
    pub shortest_gap: Stat<MeetingInterval<'a>>,
    pub average_gap: Stat<f64>,
}

/// Films with a usable watch date, oldest first. Same-day films keep catalog order.
///
/// `current_year` bounds how far ahead a watch date may lie.
pub fn watched_films(films: &[FilmRecord], current_year: i32) -> Vec<WatchedFilm<'_>> {
    let mut watched: Vec<WatchedFilm<'_>> = films
        .iter()
        .filter_map(|film| {
            let date = parse_watch_date(film.watch_date()?, current_year)?;
            Some(WatchedFilm { date, film })
        })
        .collect();
    watched.sort_by_key(|w| w.date);
    watched
}

pub fn meeting_intervals<'a>(watched: &[WatchedFilm<'a>]) -> Vec<MeetingInterval<'a>> {
    watched
        .windows(2)
        .map(|pair| MeetingInterval {
            start: pair[0].date,
            end: pair[1].date,
            days: days_between(pair[0].date, pair[1].date),
            film: pair[1].film,
        })
        .collect()
}

/// Founding date, days active as of `today`, and every meeting gap.
pub fn timeline(films: &[FilmRecord], today: NaiveDate) -> Timeline<'_> {
    let watched = watched_films(films, today.year());
    let intervals = meeting_intervals(&watched);
    let founding_date: Stat<NaiveDate> = watched.first().map(|w| w.date).into();

    // First occurrence wins on equal gaps.
    let mut longest: Option<MeetingInterval<'_>> = None;
    let mut shortest: Option<MeetingInterval<'_>> = None;
    for interval in &intervals {
        if longest.map_or(true, |l| interval.days > l.days) {
            longest = Some(*interval);
        }
        if shortest.map_or(true, |s| interval.days < s.days) {
            shortest = Some(*interval);
        }
    }

    let average_gap = if intervals.is_empty() {
        Stat::Unknown
    } else {
        let total: i64 = intervals.iter().map(|i| i.days).sum();
        Stat::Value(total as f64 / intervals.len() as f64)
    };

    Timeline {
        founding_date,
        days_active: founding_date.map(|start| days_between(start, today)),
        meetings: watched.len(),
        intervals,
        longest_gap: longest.into(),
        shortest_gap: shortest.into(),
        average_gap,
    }
}
