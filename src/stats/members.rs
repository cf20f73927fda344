//! Per-member selection and rating statistics.

use regex::Regex;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

use crate::model::{is_unknown_token, same_member, FilmRecord, Stat};
use crate::stats::category::primary_token;

static LEADING_MINUTES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(\d+)").unwrap());

/// How many genres a member profile shows.
pub const TOP_GENRE_COUNT: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenreCount {
    pub genre: String,
    pub count: usize,
}

/// Everything the profile page shows about one member.
#[derive(Debug, Clone, Serialize)]
pub struct MemberStats {
    pub member: String,
    pub total_selections: usize,
    /// Minutes across selections with a readable runtime.
    pub total_runtime: Stat<u64>,
    pub avg_runtime: Stat<f64>,
    /// Mean of club averages for selections with at least two ratings.
    pub avg_selected_score: Stat<f64>,
    pub avg_given_score: Stat<f64>,
    pub avg_divergence: Stat<f64>,
    pub language_count: usize,
    pub country_count: usize,
    pub top_genres: Vec<GenreCount>,
    pub ratings_given: usize,
}

/// A member's score on one film measured against everyone else's.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Divergence {
    pub member_score: f64,
    pub others_mean: f64,
    pub divergence: f64,
}

/// Whole minutes from a runtime field such as `"142 min"`.
pub fn parse_runtime_minutes(runtime: &str) -> Option<u32> {
    let caps = LEADING_MINUTES.captures(runtime)?;
    caps[1].parse().ok()
}

/// Arithmetic mean, `Unknown` for an empty slice.
pub fn mean(values: &[f64]) -> Stat<f64> {
    if values.is_empty() {
        Stat::Unknown
    } else {
        Stat::Value(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// `member`'s divergence on `film`: |own score − mean of the other numeric scores|.
///
/// `None` unless the member gave a numeric score and somebody else did too.
pub fn divergence_on(film: &FilmRecord, member: &str) -> Option<Divergence> {
    let member_score = film.score_of(member)?;
    let others: Vec<f64> = film
        .numeric_scores()
        .into_iter()
        .filter(|(user, _)| !same_member(user, member))
        .map(|(_, score)| score)
        .collect();
    let others_mean = mean(&others).value()?;
    Some(Divergence {
        member_score,
        others_mean,
        divergence: (member_score - others_mean).abs(),
    })
}

/// The films `member` picked for the club.
pub fn selections<'a>(films: &'a [FilmRecord], member: &str) -> Vec<&'a FilmRecord> {
    films.iter().filter(|f| f.is_selected_by(member)).collect()
}

/// Most frequent genres across `films`, highest count first.
///
/// Ties are ordered alphabetically so the result does not depend on catalog order.
/// Genre names compare case-insensitively; the first spelling seen is kept.
pub fn top_genres(films: &[&FilmRecord], limit: usize) -> Vec<GenreCount> {
    let mut tally: HashMap<String, GenreCount> = HashMap::new();
    for film in films {
        for genre in film.genre.split(',').map(str::trim) {
            if is_unknown_token(genre) {
                continue;
            }
            tally
                .entry(genre.to_lowercase())
                .or_insert_with(|| GenreCount {
                    genre: genre.to_string(),
                    count: 0,
                })
                .count += 1;
        }
    }

    let mut genres: Vec<GenreCount> = tally.into_values().collect();
    genres.sort_by(|a, b| {
        b.count
            .cmp(&a.count)
            .then_with(|| a.genre.to_lowercase().cmp(&b.genre.to_lowercase()))
    });
    genres.truncate(limit);
    genres
}

pub fn member_stats(films: &[FilmRecord], member: &str) -> MemberStats {
    let picked = selections(films, member);

    let minutes: Vec<u64> = picked
        .iter()
        .filter_map(|f| parse_runtime_minutes(&f.runtime))
        .map(u64::from)
        .collect();
    // Each entry fits in u32, so the u64 total cannot overflow.
    let total_runtime = if minutes.is_empty() {
        Stat::Unknown
    } else {
        Stat::Value(minutes.iter().sum::<u64>())
    };
    let avg_runtime = total_runtime.map(|total| total as f64 / minutes.len() as f64);

    let club_means: Vec<f64> = picked
        .iter()
        .map(|f| f.numeric_scores())
        .filter(|scores| scores.len() >= 2)
        .filter_map(|scores| {
            let values: Vec<f64> = scores.iter().map(|(_, s)| *s).collect();
            mean(&values).value()
        })
        .collect();

    let given: Vec<f64> = films.iter().filter_map(|f| f.score_of(member)).collect();

    let divergences: Vec<f64> = films
        .iter()
        .filter_map(|f| divergence_on(f, member))
        .map(|d| d.divergence)
        .collect();

    let languages: HashSet<String> = picked
        .iter()
        .filter_map(|f| primary_token(&f.language))
        .map(str::to_lowercase)
        .collect();
    let countries: HashSet<String> = picked
        .iter()
        .filter_map(|f| primary_token(&f.country))
        .map(str::to_lowercase)
        .collect();

    MemberStats {
        member: member.to_string(),
        total_selections: picked.len(),
        total_runtime,
        avg_runtime,
        avg_selected_score: mean(&club_means),
        avg_given_score: mean(&given),
        avg_divergence: mean(&divergences),
        language_count: languages.len(),
        country_count: countries.len(),
        top_genres: top_genres(&picked, TOP_GENRE_COUNT),
        ratings_given: given.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ClubInfo, ClubRating};

    fn film(title: &str, selector: &str, runtime: &str, ratings: &[(&str, Option<f64>)]) -> FilmRecord {
        FilmRecord {
            title: title.into(),
            runtime: runtime.into(),
            club: Some(ClubInfo {
                selector: Some(selector.into()),
                ratings: ratings
                    .iter()
                    .map(|(user, score)| ClubRating {
                        user: (*user).into(),
                        score: *score,
                        blurb: None,
                    })
                    .collect(),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    fn approx(stat: Stat<f64>, expected: f64) {
        let value = stat.value().expect("expected a value");
        assert!((value - expected).abs() < 1e-9, "{value} != {expected}");
    }

    #[test]
    fn runtime_average_uses_parsed_count() {
        let films = vec![
            film("A", "andy", "90 min", &[]),
            film("B", "Andy", "100 min", &[]),
            film("C", "andy", "", &[]),
            film("D", "gabe", "300 min", &[]),
        ];
        let stats = member_stats(&films, "andy");
        assert_eq!(stats.total_selections, 3);
        assert_eq!(stats.total_runtime, Stat::Value(190));
        approx(stats.avg_runtime, 95.0);
    }

    #[test]
    fn runtime_is_unknown_without_parsable_entries() {
        let films = vec![film("A", "andy", "N/A", &[])];
        let stats = member_stats(&films, "andy");
        assert_eq!(stats.total_runtime, Stat::Unknown);
        assert_eq!(stats.avg_runtime, Stat::Unknown);
    }

    #[test]
    fn selected_score_ignores_single_rater_films() {
        let films = vec![
            film("A", "andy", "", &[("gabe", Some(8.0)), ("joey", Some(6.0))]),
            film("B", "andy", "", &[("gabe", Some(2.0))]),
            film("C", "andy", "", &[("gabe", Some(4.0)), ("joey", Some(4.0)), ("greg", None)]),
        ];
        let stats = member_stats(&films, "andy");
        approx(stats.avg_selected_score, 5.5);
    }

    #[test]
    fn given_score_spans_the_whole_catalog() {
        let films = vec![
            film("A", "gabe", "", &[("Andy", Some(9.0))]),
            film("B", "joey", "", &[("andy", Some(5.0)), ("gabe", Some(1.0))]),
            film("C", "joey", "", &[("andy", None)]),
        ];
        let stats = member_stats(&films, "andy");
        approx(stats.avg_given_score, 7.0);
        assert_eq!(stats.ratings_given, 2);
        assert_eq!(stats.total_selections, 0);
        assert_eq!(stats.avg_selected_score, Stat::Unknown);
    }

    #[test]
    fn divergence_against_mean_of_others() {
        let y = film("Y", "joey", "", &[("B", Some(9.0)), ("C", Some(3.0)), ("D", Some(3.0))]);
        let d = divergence_on(&y, "b").unwrap();
        assert_eq!(d.member_score, 9.0);
        assert_eq!(d.others_mean, 3.0);
        assert_eq!(d.divergence, 6.0);
    }

    #[test]
    fn lone_rater_has_no_divergence() {
        let films = vec![film("A", "andy", "", &[("andy", Some(7.0)), ("gabe", None)])];
        assert!(divergence_on(&films[0], "andy").is_none());
        assert_eq!(member_stats(&films, "andy").avg_divergence, Stat::Unknown);
    }

    #[test]
    fn average_divergence_is_non_negative() {
        let films = vec![
            film("A", "gabe", "", &[("andy", Some(2.0)), ("gabe", Some(8.0))]),
            film("B", "gabe", "", &[("andy", Some(9.0)), ("gabe", Some(7.0)), ("joey", Some(5.0))]),
        ];
        approx(member_stats(&films, "andy").avg_divergence, 4.5);
    }

    #[test]
    fn distinct_primary_countries_and_languages() {
        let mut a = film("A", "andy", "", &[]);
        a.country = "France, Belgium".into();
        a.language = "French".into();
        let mut b = film("B", "andy", "", &[]);
        b.country = "France".into();
        b.language = "N/A".into();
        let mut c = film("C", "andy", "", &[]);
        c.country = "Japan".into();
        c.language = "Japanese, English".into();

        let stats = member_stats(&[a, b, c], "andy");
        assert_eq!(stats.country_count, 2);
        assert_eq!(stats.language_count, 2);
    }

    #[test]
    fn top_genres_break_ties_alphabetically() {
        let mut a = film("A", "andy", "", &[]);
        a.genre = "Drama, Thriller".into();
        let mut b = film("B", "andy", "", &[]);
        b.genre = "Thriller, Crime, N/A".into();
        let mut c = film("C", "andy", "", &[]);
        c.genre = "Comedy, Drama, ".into();
        let mut d = film("D", "andy", "", &[]);
        d.genre = "Western".into();

        let stats = member_stats(&[a, b, c, d], "andy");
        assert_eq!(
            stats.top_genres,
            vec![
                GenreCount { genre: "Drama".into(), count: 2 },
                GenreCount { genre: "Thriller".into(), count: 2 },
                GenreCount { genre: "Comedy".into(), count: 1 },
            ]
        );
    }

    #[test]
    fn huge_runtimes_do_not_overflow_the_total() {
        let films = vec![
            film("A", "andy", "3000000000 min", &[]),
            film("B", "andy", "3000000000 min", &[]),
        ];
        let stats = member_stats(&films, "andy");
        assert_eq!(stats.total_runtime, Stat::Value(6_000_000_000));
        approx(stats.avg_runtime, 3_000_000_000.0);
    }

    #[test]
    fn runtime_beyond_u32_is_unreadable() {
        assert_eq!(parse_runtime_minutes("99999999999 min"), None);
        let films = vec![film("A", "andy", "99999999999 min", &[]), film("B", "andy", "90 min", &[])];
        assert_eq!(member_stats(&films, "andy").total_runtime, Stat::Value(90));
    }

    #[test]
    fn genre_and_country_spellings_fold_case() {
        let mut a = film("A", "andy", "", &[]);
        a.genre = "Drama".into();
        a.country = "France".into();
        let mut b = film("B", "andy", "", &[]);
        b.genre = "drama, Horror".into();
        b.country = "FRANCE".into();

        let stats = member_stats(&[a, b], "andy");
        assert_eq!(stats.top_genres[0], GenreCount { genre: "Drama".into(), count: 2 });
        assert_eq!(stats.top_genres.len(), 2);
        assert_eq!(stats.country_count, 1);
    }
}
