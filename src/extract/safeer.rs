//! Safeer filmwise-collection extractor.
//!
//! Standalone marker lines set the rolling movie, screen, ticket type and
//! show time; any line ending in six numeric columns is a data row under
//! whatever markers are current. The show date is the screening-period
//! start from the header, one date for the whole file.

use std::sync::LazyLock;

use anyhow::{anyhow, Result};
use chrono::NaiveDate;
use regex::Regex;

use super::lines::{clean_num, has_iso_date_and_time, tail_is_numeric, tokens};
use super::VendorRules;
use crate::document::Document;
use crate::rows::RawTicketRow;

static SHOW_TIME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{1,2}:\d{2}\s?(?:AM|PM)$").unwrap());
static PAGE_FOOTER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Page\s+\d+\s+of\s+\d+\s*$").unwrap());

const NOISE_PHRASES: &[&str] = &["FILMWISE", "SAFEER", "M.TAX", "TOTAL OF", "GRAND TOTAL", "FROM DATE"];

pub fn extract(
    doc: &Document,
    exhibitor: &str,
    rules: &VendorRules,
    extracted_at: &str,
) -> Result<Vec<RawTicketRow>> {
    let pages = doc.pages();
    let (cinema, week_type, show_date) = header_info(pages)?;

    let mut rows = Vec::new();
    let mut movie: Option<String> = None;
    let mut screen: Option<String> = None;
    let mut ticket_type: Option<String> = None;
    let mut show_time: Option<String> = None;

    for page in pages {
        for line in page {
            let ln = line.trim();
            if ln.is_empty() {
                continue;
            }
            let upper = ln.to_uppercase();
            if NOISE_PHRASES.iter().any(|p| upper.contains(p))
                || has_iso_date_and_time(ln)
                || PAGE_FOOTER_RE.is_match(ln)
            {
                continue;
            }

            if SHOW_TIME_RE.is_match(ln) {
                show_time = Some(ln.to_string());
                continue;
            }

            let parts = tokens(ln);
            if !tail_is_numeric(&parts, 6) {
                if rules.safeer_screens.iter().any(|s| upper.contains(&s.to_uppercase())) {
                    screen = Some(ln.to_string());
                } else if rules
                    .safeer_ticket_types
                    .iter()
                    .any(|t| upper.contains(&t.to_uppercase()))
                {
                    ticket_type = Some(ln.to_string());
                } else {
                    movie = Some(ln.to_string());
                }
                continue;
            }

            // Rows printed before the first show time have no session to
            // belong to.
            let Some(time) = show_time.clone() else {
                continue;
            };
            let tail = &parts[parts.len() - 6..];
            let mut row = RawTicketRow::new(&doc.file_name(), exhibitor, &cinema, week_type, extracted_at);
            row.movie_title = movie.clone().unwrap_or_default();
            row.show_date = show_date.clone();
            row.show_time = Some(time);
            row.screen = screen.clone();
            row.format_code = "2D".to_string();
            row.ticket_class = ticket_type.clone();
            row.admits = clean_num(&tail[0]);
            row.gross = clean_num(&tail[2]);
            row.net = clean_num(&tail[5]);
            rows.push(row);
        }
    }

    Ok(rows)
}

/// Cinema is the second non-blank header line; the screening period on the
/// "From Date" line gives both the show date and the weekly flag.
fn header_info(pages: &[Vec<String>]) -> Result<(String, &'static str, String)> {
    let first: &[String] = pages.first().map(|p| p.as_slice()).unwrap_or(&[]);
    let mut cinema = String::new();
    let mut index = 0;
    for ln in first {
        let ln = ln.trim();
        if ln.is_empty() {
            continue;
        }
        index += 1;
        if index == 2 {
            cinema = ln.to_string();
            continue;
        }
        if ln.to_uppercase().contains("FROM DATE") {
            let parts = tokens(ln);
            let start = parse_at(&parts, 3)?;
            let end = parse_at(&parts, 9)?;
            let week_type = if (end - start).num_days() > 1 { "weekly" } else { "" };
            return Ok((cinema, week_type, start.format("%d-%m-%Y").to_string()));
        }
    }
    Err(anyhow!("screening period line not found"))
}

fn parse_at(parts: &[String], idx: usize) -> Result<NaiveDate> {
    let token = parts
        .get(idx)
        .ok_or_else(|| anyhow!("screening period line too short"))?;
    NaiveDate::parse_from_str(token, "%d-%m-%Y")
        .map_err(|e| anyhow!("bad screening date {token:?}: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::DocumentBody;

    fn doc(lines: Vec<&str>) -> Document {
        let mut page = vec![
            "FILMWISE COLLECTION REPORT",
            "Safeer Cinema Sharjah",
            "From Date : 10-09-2025 12:00 AM To Date : 16-09-2025 11:59 PM",
        ];
        page.extend(lines);
        Document {
            path: "safeer.txt".into(),
            body: DocumentBody::Pages(vec![page.into_iter().map(|l| l.to_string()).collect()]),
        }
    }

    #[test]
    fn markers_then_six_column_rows() {
        let d = doc(vec![
            "THE LONG GAME",
            "SCREEN-3",
            "PREMIUM",
            "6:30 PM",
            "40 35.00 1,400.00 70.00 66.50 1,263.50",
        ]);
        let rows = extract(&d, "Safeer", &VendorRules::default(), "2025-09-16 20:00:00").unwrap();
        assert_eq!(rows.len(), 1);
        let r = &rows[0];
        assert_eq!(r.cinema, "Safeer Cinema Sharjah");
        assert_eq!(r.week_type, "weekly");
        assert_eq!(r.show_date, "10-09-2025");
        assert_eq!(r.movie_title, "THE LONG GAME");
        assert_eq!(r.screen.as_deref(), Some("SCREEN-3"));
        assert_eq!(r.ticket_class.as_deref(), Some("PREMIUM"));
        assert_eq!(r.show_time.as_deref(), Some("6:30 PM"));
        assert_eq!(r.admits, 40.0);
        assert_eq!(r.gross, 1400.0);
        assert_eq!(r.net, 1263.5);
    }

    #[test]
    fn data_row_before_any_time_is_dropped() {
        let d = doc(vec![
            "THE LONG GAME",
            "40 35.00 1,400.00 70.00 66.50 1,263.50",
        ]);
        assert!(extract(&d, "Safeer", &VendorRules::default(), "t").unwrap().is_empty());
    }

    #[test]
    fn missing_period_line_is_an_error() {
        let d = Document {
            path: "safeer.txt".into(),
            body: DocumentBody::Pages(vec![vec!["A".to_string(), "B".to_string()]]),
        };
        assert!(extract(&d, "Safeer", &VendorRules::default(), "t").is_err());
    }
}
