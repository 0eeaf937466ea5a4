//! Ozone weekly distributor-summary extractor.
//!
//! A per-film recap rather than a sessions listing: every qualifying line
//! carries the movie title followed by six numeric columns, so there is no
//! rolling state at all. The report date is spelled out on line 3.

use std::sync::LazyLock;

use anyhow::Result;
use chrono::NaiveDate;
use regex::Regex;

use super::lines::{clean_num, is_numeric_token, tokens};
use crate::document::Document;
use crate::rows::RawTicketRow;

static LONG_DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d{1,2}\s+[A-Za-z]+\s+\d{4}").unwrap());

const SKIP_PHRASES: &[&str] = &[
    "Distributors by Film and Ticket Type",
    "Vista Entertainment Solutions Ltd",
    "REPORT DATE RANGE",
    "Empire Film Distribution",
    "GROSS TOTAL",
];

pub fn extract(doc: &Document, exhibitor: &str, extracted_at: &str) -> Result<Vec<RawTicketRow>> {
    let pages = doc.pages();
    let first: &[String] = pages.first().map(|p| p.as_slice()).unwrap_or(&[]);

    let cinema = first
        .first()
        .map(|l| l.replace("Distributors by Film and Ticket Type", "").trim().to_string())
        .unwrap_or_default();
    let date = first
        .get(2)
        .and_then(|l| LONG_DATE_RE.find(l))
        .and_then(|m| NaiveDate::parse_from_str(m.as_str(), "%d %B %Y").ok())
        .map(|d| d.format("%d/%m/%Y").to_string())
        .unwrap_or_default();

    let mut rows = Vec::new();
    for page in pages {
        for line in page.iter().skip(5) {
            let stripped = line.trim();
            if stripped.is_empty() || SKIP_PHRASES.iter().any(|p| stripped.contains(p)) {
                continue;
            }
            let parts = tokens(stripped);
            if parts.len() < 6 || !parts[parts.len() - 6..].iter().all(|t| is_numeric_token(t)) {
                continue;
            }
            let mut row = RawTicketRow::new(&doc.file_name(), exhibitor, &cinema, "weekly", extracted_at);
            row.movie_title = parts[..parts.len() - 6].join(" ");
            row.show_date = date.clone();
            row.format_code = "2D".to_string();
            row.admits = clean_num(&parts[parts.len() - 4]);
            row.gross = clean_num(&parts[parts.len() - 1]);
            row.net = clean_num(&parts[parts.len() - 3]);
            row.comp = Some(0.0);
            rows.push(row);
        }
    }

    Ok(rows)
}
