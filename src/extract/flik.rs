//! Flik ticket-types-per-title extractor.
//!
//! Movie headings embed an ISO date and a format tag such as "(3D EN)";
//! show lines carry an HH:MM token with the screen name between the time
//! and the trailing three numbers. Bare three-number lines continue the
//! previous show. Amounts print a decimal comma and gross equals net.

use std::sync::LazyLock;

use anyhow::Result;
use regex::Regex;

use super::lines::{clean_num_decimal_comma, tokens};
use crate::document::Document;
use crate::rows::RawTicketRow;

static ISO_DATE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").unwrap());
static TIME_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d{2}:\d{2}$").unwrap());
static FORMAT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)(4DX|2D|3D|4D)").unwrap());
static FORMAT_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\(?\b(2D|3D|4D|4DX)\b(\s+(EN|AR|JA|HI))?\)?").unwrap());

const SKIP_PHRASES: &[&str] = &["Ticket Types Per Title", "Created 20", "Screen Total"];

pub fn extract(doc: &Document, exhibitor: &str, extracted_at: &str) -> Result<Vec<RawTicketRow>> {
    let pages = doc.pages();
    let first: &[String] = pages.first().map(|p| p.as_slice()).unwrap_or(&[]);

    let cinema = first
        .get(3)
        .map(|l| l.replace("Selection", "").trim().to_string())
        .unwrap_or_default();
    let week_type = if is_weekly_range(first.get(2).map(String::as_str).unwrap_or("")) {
        "weekly"
    } else {
        ""
    };

    let mut rows = Vec::new();
    let mut movie = String::new();
    let mut date = String::new();
    let mut time = String::new();
    let mut screen: Option<String> = None;
    let mut format = "2D".to_string();

    for page in pages {
        for line in page.iter().skip(6) {
            let stripped = line.trim();
            if stripped.is_empty() || SKIP_PHRASES.iter().any(|p| stripped.contains(p)) {
                continue;
            }
            let parts = tokens(stripped);
            if is_total_line(&parts) {
                continue;
            }

            if let Some(date_idx) = parts.iter().position(|p| ISO_DATE_RE.is_match(p)) {
                date = parts[date_idx].clone();
                let heading = parts[..date_idx].join(" ");
                if let Some(m) = FORMAT_RE.captures(&heading) {
                    format = m[1].to_uppercase();
                }
                movie = collapse(&FORMAT_TAG_RE.replace_all(&heading, ""));
                continue;
            }

            if let Some(time_idx) = parts.iter().position(|p| TIME_RE.is_match(p)) {
                time = parts[time_idx].clone();
                screen = Some(parts[time_idx + 1..parts.len().saturating_sub(3)].join(" "))
                    .filter(|s| !s.is_empty());
                rows.push(build_row(
                    doc, exhibitor, &cinema, week_type, extracted_at, &movie, &date, &time,
                    screen.as_deref(), &format, &parts,
                ));
                continue;
            }

            // A lone admits/price/amount triple continues the current show.
            if parts.len() == 3 && parts.iter().all(|p| is_number(p)) {
                rows.push(build_row(
                    doc, exhibitor, &cinema, week_type, extracted_at, &movie, &date, &time,
                    screen.as_deref(), &format, &parts,
                ));
            }
        }
    }

    Ok(rows)
}

#[allow(clippy::too_many_arguments)]
fn build_row(
    doc: &Document,
    exhibitor: &str,
    cinema: &str,
    week_type: &str,
    extracted_at: &str,
    movie: &str,
    date: &str,
    time: &str,
    screen: Option<&str>,
    format: &str,
    parts: &[String],
) -> RawTicketRow {
    let gross = clean_num_decimal_comma(&parts[parts.len() - 1]);
    let mut row = RawTicketRow::new(&doc.file_name(), exhibitor, cinema, week_type, extracted_at);
    row.movie_title = movie.to_string();
    row.show_date = date.to_string();
    row.show_time = Some(time.to_string()).filter(|t| !t.is_empty());
    row.screen = screen.map(|s| s.to_string());
    row.format_code = format.to_string();
    row.admits = clean_num_decimal_comma(&parts[parts.len() - 3]);
    row.gross = gross;
    row.net = gross;
    row
}

/// Two ISO dates on the selection line more than two days apart mark a
/// weekly file.
fn is_weekly_range(line: &str) -> bool {
    static RANGE_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"\d{4}-\d{2}-\d{2}").unwrap());
    let found: Vec<chrono::NaiveDate> = RANGE_RE
        .find_iter(line)
        .filter_map(|m| chrono::NaiveDate::parse_from_str(m.as_str(), "%Y-%m-%d").ok())
        .collect();
    matches!(found.as_slice(), [start, end] if (*end - *start).num_days() > 2)
}

fn is_total_line(parts: &[String]) -> bool {
    (parts.first().map(|p| p.eq_ignore_ascii_case("total")).unwrap_or(false)
        && parts.last().map(|p| is_number(p)).unwrap_or(false))
        || (parts.len() == 2 && parts.iter().all(|p| is_number(p)))
}

fn is_number(s: &str) -> bool {
    let t = s.replace([',', '.'], "");
    !t.is_empty() && t.chars().all(|c| c.is_ascii_digit())
}

fn collapse(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
