use anyhow::{Context, Result};
use std::io::Write;
use std::path::Path;

use crate::model::{same_member, FilmRecord, MemberProfile};

/// Header row: film columns, one rating/blurb pair per member, trophy notes.
pub fn header(members: &[MemberProfile]) -> Vec<String> {
    let mut columns: Vec<String> = ["imdb_id", "name", "watch_date", "selected_by"]
        .iter()
        .map(|c| c.to_string())
        .collect();
    for m in members {
        let key = m.name.trim().to_lowercase();
        columns.push(format!("{key}_rating"));
        columns.push(format!("{key}_blurb"));
    }
    columns.push("trophy_notes".to_string());
    columns
}

fn format_score(score: f64) -> String {
    if score.fract() == 0.0 {
        format!("{score:.0}")
    } else {
        score.to_string()
    }
}

fn row(film: &FilmRecord, members: &[MemberProfile]) -> Vec<String> {
    let mut fields = vec![
        film.imdb_id.clone(),
        film.title.clone(),
        film.watch_date().unwrap_or_default().to_string(),
        film.selector().unwrap_or_default().to_string(),
    ];
    for m in members {
        let rating = film.ratings().iter().find(|r| same_member(&r.user, &m.name));
        fields.push(
            rating
                .and_then(|r| r.score)
                .map(format_score)
                .unwrap_or_default(),
        );
        fields.push(rating.and_then(|r| r.blurb.clone()).unwrap_or_default());
    }
    fields.push(
        film.club
            .as_ref()
            .and_then(|c| c.trophy_notes.clone())
            .unwrap_or_default(),
    );
    fields
}

/// Write the club spreadsheet layout, every field quoted.
pub fn write_club_csv<W: Write>(writer: W, films: &[FilmRecord], members: &[MemberProfile]) -> Result<usize> {
    let mut out = ::csv::WriterBuilder::new()
        .quote_style(::csv::QuoteStyle::Always)
        .from_writer(writer);

    out.write_record(header(members))?;
    for film in films {
        out.write_record(row(film, members))?;
    }
    out.flush()?;
    Ok(films.len())
}

pub fn export_csv(path: &Path, films: &[FilmRecord], members: &[MemberProfile]) -> Result<usize> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create: {}", path.display()))?;
    write_club_csv(file, films, members)
}
