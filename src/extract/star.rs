//! Star Cinemas distributor report extractor.
//!
//! Date-led session rows: an ISO date in column one opens a session and
//! carries the screen between the date and the HH:MM token, with seven
//! numeric columns on every ticket line. New titles follow a rate-card
//! or movie-total line.

use std::sync::LazyLock;

use anyhow::Result;
use chrono::NaiveDate;
use regex::Regex;

use super::lines::{clean_num, tokens};
use crate::document::Document;
use crate::rows::RawTicketRow;

static HHMM_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d{1,2}:\d{2}$").unwrap());

const NOISE_PHRASES: &[&str] = &[
    "DISTRIBUTOR REPORT",
    "SCREENING PERIOD",
    "TKT PRICE",
    "ADMITS",
    "TOTAL",
    "DISTRIBUTOR NAME",
    "GENERATED ON",
];

pub fn extract(doc: &Document, exhibitor: &str, extracted_at: &str) -> Result<Vec<RawTicketRow>> {
    let pages = doc.pages();
    let (cinema, week_type) = header_info(pages);

    let mut rows = Vec::new();
    let mut movie = String::new();
    let mut date = String::new();
    let mut time: Option<String> = None;
    let mut screen: Option<String> = None;
    // Title lines follow the rate card or a movie total.
    let mut prev_was_break = false;

    for page in pages {
        for line in page {
            let ln = line.trim();
            if ln.is_empty() {
                continue;
            }
            let upper = ln.to_uppercase();
            if NOISE_PHRASES.iter().any(|p| upper.contains(p)) || ln == "-" || ln == cinema {
                prev_was_break = upper.contains("TKT PRICE") || upper.contains("MOVIE TOTAL");
                continue;
            }
            let parts = tokens(ln);

            let opens_session = parts
                .first()
                .map(|p| NaiveDate::parse_from_str(p, "%Y-%m-%d").is_ok())
                .unwrap_or(false);
            if opens_session {
                date = parts[0].clone();
                if let Some(idx) = parts.iter().skip(1).position(|p| HHMM_RE.is_match(p)) {
                    let hour_idx = idx + 1;
                    time = Some(parts[hour_idx].clone());
                    screen = Some(parts[1..hour_idx].join(" ").trim().to_string())
                        .filter(|s| !s.is_empty());
                }
            } else if prev_was_break && !tail_is_seven_numbers(&parts) {
                movie = ln.to_string();
                prev_was_break = false;
                continue;
            }
            prev_was_break = false;

            if !tail_is_seven_numbers(&parts) {
                continue;
            }
            let tail = &parts[parts.len() - 7..];
            let ticket = ticket_class(&parts, opens_session, time.as_deref());
            let mut row = RawTicketRow::new(&doc.file_name(), exhibitor, &cinema, week_type, extracted_at);
            row.movie_title = movie.clone();
            row.show_date = date.clone();
            row.show_time = time.clone();
            row.screen = screen.clone();
            row.format_code = if ticket.to_uppercase().contains("DOLBY") {
                "DOLBY".to_string()
            } else {
                "2D".to_string()
            };
            row.ticket_class = Some(ticket).filter(|t| !t.is_empty());
            row.admits = clean_num(&tail[1]);
            row.comp = Some(clean_num(&tail[2]));
            row.gross = clean_num(&tail[3]);
            row.net = clean_num(&tail[6]);
            rows.push(row);
        }
    }

    Ok(rows)
}

/// Ticket class is whatever precedes the seven numeric columns, minus the
/// session date/screen/time prefix when the row opened a session.
fn ticket_class(parts: &[String], opens_session: bool, time: Option<&str>) -> String {
    let body = if opens_session && parts.len() > 3 { &parts[3..] } else { parts };
    let head = &body[..body.len().saturating_sub(7)];
    let joined = head.join(" ");
    match time {
        Some(t) => joined.replace(t, "").trim().to_string(),
        None => joined,
    }
}

fn tail_is_seven_numbers(parts: &[String]) -> bool {
    if parts.len() < 7 {
        return false;
    }
    parts[parts.len() - 7..].iter().all(|p| {
        let s = p.replace(',', "");
        let s = s.replacen('.', "", 1);
        !s.is_empty() && s.chars().all(|c| c.is_ascii_digit())
    })
}

fn header_info(pages: &[Vec<String>]) -> (String, &'static str) {
    let first: &[String] = pages.first().map(|p| p.as_slice()).unwrap_or(&[]);
    let cinema = first
        .iter()
        .find(|l| !l.trim().is_empty())
        .map(|l| l.trim().to_string())
        .unwrap_or_default();
    for ln in first {
        let upper = ln.to_uppercase();
        if upper.contains("SCREENING PERIOD") && upper.contains("TO") {
            let parts = tokens(ln);
            let parse = |idx: usize| {
                parts
                    .get(parts.len().wrapping_sub(idx))
                    .and_then(|t| NaiveDate::parse_from_str(t, "%Y-%m-%d").ok())
            };
            if let (Some(d1), Some(d2)) = (parse(3), parse(1)) {
                if (d2 - d1).num_days() > 0 {
                    return (cinema, "weekly");
                }
            }
            break;
        }
    }
    (cinema, "")
}
