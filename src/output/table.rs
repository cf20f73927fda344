use unicode_width::UnicodeWidthStr;

use crate::ingest::DataQuality;
use crate::model::{FilmRecord, Stat};
use crate::stats::category::{CategoryCount, CategoryKind};
use crate::stats::consensus::{DatedFilm, DivergentEntry, UnanimousGroup};
use crate::stats::intervals::Timeline;
use crate::stats::ranking::{Highlight, MemberStanding, Metric, MetricStanding};

/// Format minutes as `2h05m` / `45m`.
pub fn format_minutes(minutes: f64) -> String {
    let total = minutes.round() as u64;
    let h = total / 60;
    let m = total % 60;
    if h > 0 {
        format!("{h}h{m:02}m")
    } else {
        format!("{m}m")
    }
}

/// Render one metric value the way its column reads best.
pub fn format_metric(metric: Metric, value: Stat<f64>) -> String {
    let Some(v) = value.value() else {
        return "N/A".to_string();
    };
    match metric {
        Metric::TotalSelections | Metric::LanguageCount | Metric::CountryCount => {
            format!("{}", v as u64)
        }
        Metric::TotalRuntime | Metric::AvgRuntime => format_minutes(v),
        Metric::AvgSelectedScore | Metric::AvgGivenScore | Metric::AvgDivergence => {
            format!("{v:.2}")
        }
    }
}

fn marker(highlight: Highlight) -> &'static str {
    match highlight {
        Highlight::High => " ▲",
        Highlight::Low => " ▼",
        Highlight::None => "",
    }
}

fn standing_cell(standing: &MetricStanding) -> String {
    let value = format_metric(standing.metric, standing.value);
    match standing.rank {
        Some(rank) => format!("{value} ({rank}){}", marker(standing.highlight)),
        None => value,
    }
}

fn score(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        format!("{value:.1}")
    }
}

/// Truncate a string to fit within max_width (respecting unicode width).
fn truncate(s: &str, max_width: usize) -> String {
    if UnicodeWidthStr::width(s) <= max_width {
        return s.to_string();
    }
    let mut result = String::new();
    let mut width = 0;
    for ch in s.chars() {
        let cw = unicode_width::UnicodeWidthChar::width(ch).unwrap_or(0);
        if width + cw + 3 > max_width {
            result.push_str("...");
            break;
        }
        result.push(ch);
        width += cw;
    }
    result
}

/// Pad to a display width (not a char count).
fn pad(s: &str, width: usize) -> String {
    let s = truncate(s, width);
    let fill = width.saturating_sub(UnicodeWidthStr::width(s.as_str()));
    format!("{s}{}", " ".repeat(fill))
}

fn plural(n: usize) -> &'static str {
    if n == 1 {
        ""
    } else {
        "s"
    }
}

/// Metrics down the side, active members across the top.
pub fn print_standings(standings: &[MemberStanding]) {
    if standings.is_empty() {
        println!("No active members.");
        return;
    }

    let mut header = format!("  {}", pad("METRIC", 28));
    for s in standings {
        header.push_str(&pad(&s.member.to_uppercase(), 20));
    }
    println!("{}", header.trim_end());
    println!("  {}", "-".repeat(28 + 20 * standings.len()));

    for (i, metric) in Metric::ALL.iter().enumerate() {
        let mut line = format!("  {}", pad(metric.label(), 28));
        for s in standings {
            line.push_str(&pad(&standing_cell(&s.metrics[i]), 20));
        }
        println!("{}", line.trim_end());
    }

    println!("\n  ▲ cohort high   ▼ cohort low");
}

/// Full profile for `clubstats member`.
pub fn print_member_profile(standing: &MemberStanding, controversial: &[DivergentEntry<'_>]) {
    if standing.title.is_empty() {
        println!("Member: {}", standing.member);
    } else {
        println!("Member: {} · {}", standing.member, standing.title);
    }
    if !standing.active {
        println!("  (inactive: not ranked against the club)");
    }
    println!();

    for metric in &standing.metrics {
        println!("  {} {}", pad(metric.metric.label(), 28), standing_cell(metric));
    }
    println!("  {} {}", pad("Ratings given", 28), standing.stats.ratings_given);

    if !standing.stats.top_genres.is_empty() {
        let genres: Vec<String> = standing
            .stats
            .top_genres
            .iter()
            .map(|g| format!("{} ({})", g.genre, g.count))
            .collect();
        println!("  {} {}", pad("Top genres", 28), genres.join(", "));
    }

    if !controversial.is_empty() {
        println!("\nMost controversial takes:");
        print_divergent_rows(controversial);
    }
}

fn print_divergent_rows(entries: &[DivergentEntry<'_>]) {
    for e in entries {
        println!(
            "  {} gave {:>4}  club {:>4}  off by {:.2}",
            pad(&e.film.title, 40),
            score(e.member_score),
            score(e.others_mean),
            e.divergence
        );
    }
}

pub fn print_controversial(member: &str, entries: &[DivergentEntry<'_>]) {
    if entries.is_empty() {
        println!("No controversial films for {member}.");
        return;
    }
    println!("{} controversial film{} for {member}:\n", entries.len(), plural(entries.len()));
    print_divergent_rows(entries);
}

fn dated_title(d: &DatedFilm<'_>) -> String {
    format!("{} ({})", d.film.title, d.watch_date)
}

pub fn print_unanimous(groups: &[UnanimousGroup<'_>]) {
    if groups.is_empty() {
        println!("No unanimous scores yet.");
        return;
    }

    for group in groups {
        let size = group.others.len() + 1;
        println!(
            "The {} Club: {} film{} scored {} by everyone",
            group.namesake.film.title,
            size,
            plural(size),
            score(group.score)
        );
        println!("  * {}", dated_title(&group.namesake));
        for other in &group.others {
            println!("  - {}", dated_title(other));
        }
        println!();
    }
}

/// Count buckets with a proportional bar.
pub fn print_categories(kind: CategoryKind, buckets: &[CategoryCount]) {
    if buckets.is_empty() {
        println!("No {} data.", kind.as_str());
        return;
    }

    let max = buckets.iter().map(|b| b.count).max().unwrap_or(1).max(1);
    println!("Films by {}:\n", kind.as_str());
    for b in buckets {
        let bar_len = (b.count * 30).div_ceil(max);
        println!("  {} {:>4}  {}", pad(&b.label, 24), b.count, "█".repeat(bar_len));
    }
}

pub fn print_films(films: &[&FilmRecord]) {
    if films.is_empty() {
        println!("No films found.");
        return;
    }

    println!("{} film{}:\n", films.len(), plural(films.len()));
    println!(
        "  {} {} {} {}",
        pad("TITLE", 40),
        pad("YEAR", 10),
        pad("SELECTOR", 12),
        "WATCHED"
    );
    println!("  {}", "-".repeat(76));
    for f in films {
        println!(
            "  {} {} {} {}",
            pad(&f.title, 40),
            pad(&f.year, 10),
            pad(f.selector().unwrap_or("-"), 12),
            f.watch_date().unwrap_or("-")
        );
    }
}

pub fn print_timeline(timeline: &Timeline<'_>, show_intervals: bool) {
    println!("Club timeline:");
    println!("  Founded:      {}", timeline.founding_date);
    println!("  Days active:  {}", timeline.days_active);
    println!("  Meetings:     {}", timeline.meetings);
    println!(
        "  Average gap:  {}",
        timeline.average_gap.map(|d| format!("{d:.1} days"))
    );
    if let Some(g) = timeline.longest_gap.value() {
        println!("  Longest gap:  {} days ({} → {}, {})", g.days, g.start, g.end, g.film.title);
    }
    if let Some(g) = timeline.shortest_gap.value() {
        println!("  Shortest gap: {} days ({} → {}, {})", g.days, g.start, g.end, g.film.title);
    }

    if show_intervals && !timeline.intervals.is_empty() {
        println!("\n  {} {} {} FILM", pad("FROM", 12), pad("TO", 12), pad("DAYS", 6));
        println!("  {}", "-".repeat(70));
        for i in &timeline.intervals {
            println!(
                "  {} {} {} {}",
                pad(&i.start.to_string(), 12),
                pad(&i.end.to_string(), 12),
                pad(&i.days.to_string(), 6),
                truncate(&i.film.title, 38)
            );
        }
    }
}

pub fn print_data_quality(report: &DataQuality) {
    println!("Catalog check:");
    println!("  Films:            {}", report.films);
    println!("  With club info:   {}", report.with_club_info);
    println!("  Watched:          {}", report.watched);
    println!("  Unscheduled:      {}", report.unscheduled);
    println!("  Unrated:          {}", report.unrated);

    if !report.bad_watch_dates.is_empty() {
        println!("\n  Unusable watch dates ({}):", report.bad_watch_dates.len());
        for t in &report.bad_watch_dates {
            println!("    - {}", truncate(t, 72));
        }
    }
    if !report.bad_runtimes.is_empty() {
        println!("\n  Unreadable runtimes ({}):", report.bad_runtimes.len());
        for t in &report.bad_runtimes {
            println!("    - {}", truncate(t, 72));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minutes_render_as_hours() {
        assert_eq!(format_minutes(45.0), "45m");
        assert_eq!(format_minutes(125.0), "2h05m");
        assert_eq!(format_minutes(94.6), "1h35m");
    }

    #[test]
    fn metrics_render_by_kind() {
        assert_eq!(format_metric(Metric::CountryCount, Stat::Value(3.0)), "3");
        assert_eq!(format_metric(Metric::AvgGivenScore, Stat::Value(6.456)), "6.46");
        assert_eq!(format_metric(Metric::AvgRuntime, Stat::Unknown), "N/A");
    }

    #[test]
    fn truncate_respects_width() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a much longer title", 10), "a much ...");
        assert_eq!(UnicodeWidthStr::width(pad("七人の侍", 12).as_str()), 12);
    }
}
