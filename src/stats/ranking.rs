//! Cohort rankings and high/low highlights.
//!
//! Only active members (positive queue number) form the cohort. A metric is
//! ranked only when at least two members have a value for it.

use serde::Serialize;
use std::fmt;

use crate::model::{same_member, FilmRecord, MemberProfile, Stat};
use crate::stats::members::{member_stats, MemberStats};

/// A rankable member statistic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    TotalSelections,
    TotalRuntime,
    AvgRuntime,
    AvgSelectedScore,
    AvgGivenScore,
    AvgDivergence,
    LanguageCount,
    CountryCount,
}

impl Metric {
    pub const ALL: [Metric; 8] = [
        Metric::TotalSelections,
        Metric::TotalRuntime,
        Metric::AvgRuntime,
        Metric::AvgSelectedScore,
        Metric::AvgGivenScore,
        Metric::AvgDivergence,
        Metric::LanguageCount,
        Metric::CountryCount,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Metric::TotalSelections => "Films selected",
            Metric::TotalRuntime => "Total runtime",
            Metric::AvgRuntime => "Average runtime",
            Metric::AvgSelectedScore => "Club score of picks",
            Metric::AvgGivenScore => "Average score given",
            Metric::AvgDivergence => "Average divergence",
            Metric::LanguageCount => "Unique languages selected",
            Metric::CountryCount => "Unique countries selected",
        }
    }

    /// Rank order. Divergence ranks the member closest to the club consensus first.
    pub fn higher_is_better(self) -> bool {
        !matches!(self, Metric::AvgDivergence)
    }

    /// Picking from few countries is not called out.
    pub fn allows_low_highlight(self) -> bool {
        !matches!(self, Metric::CountryCount)
    }

    pub fn extract(self, stats: &MemberStats) -> Stat<f64> {
        match self {
            Metric::TotalSelections => Stat::Value(stats.total_selections as f64),
            Metric::TotalRuntime => stats.total_runtime.map(|minutes| minutes as f64),
            Metric::AvgRuntime => stats.avg_runtime,
            Metric::AvgSelectedScore => stats.avg_selected_score,
            Metric::AvgGivenScore => stats.avg_given_score,
            Metric::AvgDivergence => stats.avg_divergence,
            Metric::LanguageCount => Stat::Value(stats.language_count as f64),
            Metric::CountryCount => Stat::Value(stats.country_count as f64),
        }
    }
}

/// 1-based position among the members with a value. Displays as `"rank/size"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RankResult {
    pub rank: usize,
    pub cohort_size: usize,
}

impl fmt::Display for RankResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.rank, self.cohort_size)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Highlight {
    High,
    Low,
    None,
}

fn valid_values(cohort: &[Stat<f64>]) -> Vec<f64> {
    cohort.iter().filter_map(|v| v.value()).collect()
}

/// Rank `value` within `cohort`.
///
/// Tied members all take the position of the first occurrence in sort order,
/// so `[8, 8, 6, 4]` ranks both eights `1/4` and the six `3/4`.
pub fn rank(value: Stat<f64>, cohort: &[Stat<f64>], higher_is_better: bool) -> Option<RankResult> {
    let value = value.value()?;
    let mut sorted = valid_values(cohort);
    if sorted.len() < 2 {
        return None;
    }

    if higher_is_better {
        sorted.sort_by(|a, b| b.total_cmp(a));
    } else {
        sorted.sort_by(|a, b| a.total_cmp(b));
    }

    let index = sorted.iter().position(|v| *v == value)?;
    Some(RankResult {
        rank: index + 1,
        cohort_size: sorted.len(),
    })
}

/// Flag `value` as the cohort maximum or minimum.
///
/// Nothing is flagged when fewer than two values exist or they are all equal.
pub fn highlight(value: Stat<f64>, cohort: &[Stat<f64>], allow_low: bool) -> Highlight {
    let Some(value) = value.value() else {
        return Highlight::None;
    };
    let valid = valid_values(cohort);
    if valid.len() < 2 {
        return Highlight::None;
    }

    let high = valid.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let low = valid.iter().copied().fold(f64::INFINITY, f64::min);
    if high == low {
        Highlight::None
    } else if value == high {
        Highlight::High
    } else if allow_low && value == low {
        Highlight::Low
    } else {
        Highlight::None
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MetricStanding {
    pub metric: Metric,
    pub value: Stat<f64>,
    pub rank: Option<RankResult>,
    pub highlight: Highlight,
}

#[derive(Debug, Clone, Serialize)]
pub struct MemberStanding {
    pub member: String,
    pub title: String,
    pub active: bool,
    pub stats: MemberStats,
    pub metrics: Vec<MetricStanding>,
}

struct Cohort {
    stats: Vec<MemberStats>,
}

impl Cohort {
    fn build(films: &[FilmRecord], members: &[MemberProfile]) -> Self {
        let stats = members
            .iter()
            .filter(|m| m.is_active())
            .map(|m| member_stats(films, &m.name))
            .collect();
        Cohort { stats }
    }

    fn values(&self, metric: Metric) -> Vec<Stat<f64>> {
        self.stats.iter().map(|s| metric.extract(s)).collect()
    }

    fn standing(&self, profile: &MemberProfile, stats: MemberStats) -> MemberStanding {
        let active = profile.is_active();
        let metrics = Metric::ALL
            .iter()
            .map(|&metric| {
                let value = metric.extract(&stats);
                let (rank, highlight) = if active {
                    let cohort = self.values(metric);
                    (
                        rank(value, &cohort, metric.higher_is_better()),
                        highlight(value, &cohort, metric.allows_low_highlight()),
                    )
                } else {
                    (None, Highlight::None)
                };
                MetricStanding {
                    metric,
                    value,
                    rank,
                    highlight,
                }
            })
            .collect();

        MemberStanding {
            member: profile.name.clone(),
            title: profile.title.clone(),
            active,
            stats,
            metrics,
        }
    }
}

/// Stats, ranks and highlights for every active member, in member-list order.
pub fn cohort_standings(films: &[FilmRecord], members: &[MemberProfile]) -> Vec<MemberStanding> {
    let cohort = Cohort::build(films, members);
    members
        .iter()
        .filter(|m| m.is_active())
        .zip(cohort.stats.iter().cloned())
        .map(|(profile, stats)| cohort.standing(profile, stats))
        .collect()
}

/// Standing for one member. Inactive members get their stats but no ranks.
pub fn member_standing(
    films: &[FilmRecord],
    members: &[MemberProfile],
    name: &str,
) -> Option<MemberStanding> {
    let profile = members.iter().find(|m| same_member(&m.name, name))?;
    let cohort = Cohort::build(films, members);
    Some(cohort.standing(profile, member_stats(films, &profile.name)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ClubInfo, ClubRating};

    fn values(raw: &[Option<f64>]) -> Vec<Stat<f64>> {
        raw.iter().copied().map(Stat::from).collect()
    }

    #[test]
    fn tied_values_share_first_occurrence_rank() {
        let cohort = values(&[Some(8.0), Some(6.0), Some(8.0), Some(4.0)]);
        let r = rank(Stat::Value(8.0), &cohort, true).unwrap();
        assert_eq!(r.to_string(), "1/4");
        assert_eq!(rank(Stat::Value(6.0), &cohort, true).unwrap().to_string(), "3/4");
        assert_eq!(rank(Stat::Value(4.0), &cohort, false).unwrap().to_string(), "1/4");
    }

    #[test]
    fn unknown_values_are_excluded_from_cohort_size() {
        let cohort = values(&[Some(3.0), None, Some(5.0)]);
        assert_eq!(rank(Stat::Value(3.0), &cohort, true).unwrap().to_string(), "2/2");
        assert_eq!(rank(Stat::Unknown, &cohort, true), None);
    }

    #[test]
    fn single_valid_value_produces_no_rank() {
        let cohort = values(&[Some(3.0), None, None]);
        assert_eq!(rank(Stat::Value(3.0), &cohort, true), None);
        assert_eq!(highlight(Stat::Value(3.0), &cohort, true), Highlight::None);
    }

    #[test]
    fn highlights_mark_extremes() {
        let cohort = values(&[Some(2.0), Some(5.0), Some(9.0)]);
        assert_eq!(highlight(Stat::Value(9.0), &cohort, true), Highlight::High);
        assert_eq!(highlight(Stat::Value(2.0), &cohort, true), Highlight::Low);
        assert_eq!(highlight(Stat::Value(5.0), &cohort, true), Highlight::None);
        assert_eq!(highlight(Stat::Value(2.0), &cohort, false), Highlight::None);
    }

    #[test]
    fn equal_values_are_never_highlighted() {
        let cohort = values(&[Some(4.0), Some(4.0), None]);
        assert_eq!(highlight(Stat::Value(4.0), &cohort, true), Highlight::None);
        assert_eq!(rank(Stat::Value(4.0), &cohort, true).unwrap().to_string(), "1/2");
    }

    fn profile(name: &str, queue: Option<f64>) -> MemberProfile {
        MemberProfile {
            name: name.into(),
            title: format!("The {name}"),
            queue,
        }
    }

    fn pick(selector: &str, country: &str, ratings: &[(&str, f64)]) -> FilmRecord {
        FilmRecord {
            title: format!("{selector} pick"),
            country: country.into(),
            club: Some(ClubInfo {
                selector: Some(selector.into()),
                ratings: ratings
                    .iter()
                    .map(|(user, score)| ClubRating {
                        user: (*user).into(),
                        score: Some(*score),
                        blurb: None,
                    })
                    .collect(),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    fn club() -> (Vec<FilmRecord>, Vec<MemberProfile>) {
        let films = vec![
            pick("andy", "France", &[("andy", 8.0), ("gabe", 6.0)]),
            pick("andy", "Japan", &[("andy", 7.0), ("gabe", 7.0)]),
            pick("gabe", "France", &[("andy", 3.0), ("gabe", 9.0)]),
            pick("joey", "Italy", &[("andy", 5.0), ("joey", 5.0)]),
        ];
        let members = vec![
            profile("andy", Some(1.0)),
            profile("gabe", Some(2.0)),
            profile("joey", Some(3.0)),
            profile("greg", None),
        ];
        (films, members)
    }

    fn standing_for<'a>(standing: &'a MemberStanding, metric: Metric) -> &'a MetricStanding {
        standing.metrics.iter().find(|m| m.metric == metric).unwrap()
    }

    #[test]
    fn standings_cover_active_members_only() {
        let (films, members) = club();
        let standings = cohort_standings(&films, &members);
        let names: Vec<&str> = standings.iter().map(|s| s.member.as_str()).collect();
        assert_eq!(names, vec!["andy", "gabe", "joey"]);

        let andy = standing_for(&standings[0], Metric::TotalSelections);
        assert_eq!(andy.value, Stat::Value(2.0));
        assert_eq!(andy.rank.unwrap().to_string(), "1/3");
        assert_eq!(andy.highlight, Highlight::High);
    }

    #[test]
    fn country_count_is_never_flagged_low() {
        let (films, members) = club();
        let standings = cohort_standings(&films, &members);
        for standing in &standings {
            let countries = standing_for(standing, Metric::CountryCount);
            assert_ne!(countries.highlight, Highlight::Low);
        }
        let gabe = standing_for(&standings[1], Metric::CountryCount);
        assert_eq!(gabe.value, Stat::Value(1.0));
        assert_eq!(gabe.rank.unwrap().to_string(), "2/3");
    }

    #[test]
    fn divergence_ranks_closest_to_consensus_first() {
        let (films, members) = club();
        let standings = cohort_standings(&films, &members);
        // andy: |8-6|, |7-7|, |3-9|, |5-5| -> 2.0; gabe: 2, 0, 6 -> 8/3; joey: 0
        let joey = standing_for(&standings[2], Metric::AvgDivergence);
        assert_eq!(joey.rank.unwrap().to_string(), "1/3");
        assert_eq!(joey.highlight, Highlight::Low);
        let gabe = standing_for(&standings[1], Metric::AvgDivergence);
        assert_eq!(gabe.highlight, Highlight::High);
    }

    #[test]
    fn inactive_member_gets_stats_without_ranks() {
        let (films, members) = club();
        let greg = member_standing(&films, &members, "GREG").unwrap();
        assert!(!greg.active);
        assert!(greg.metrics.iter().all(|m| m.rank.is_none()));
        assert!(greg.metrics.iter().all(|m| m.highlight == Highlight::None));
        assert!(member_standing(&films, &members, "nobody").is_none());
    }
}
