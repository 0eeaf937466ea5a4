//! Al Shaab distributor show report extractor.
//!
//! The venue has one name, so the cinema is fixed. "FILM :", "SCREEN :"
//! and "DATE :" marker lines set the rolling context; ticket lines carry
//! the show time inline followed by six numeric columns.

use std::sync::LazyLock;

use anyhow::Result;
use chrono::NaiveDate;
use regex::Regex;

use super::lines::{clean_num, tail_is_numeric, tokens};
use crate::document::Document;
use crate::rows::RawTicketRow;

static TIME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b\d{1,2}:\d{2}\s*(?:AM|PM)\b").unwrap());

const CINEMA: &str = "AL SHAAB";

const NOISE_PHRASES: &[&str] = &[
    "AL SHAAB",
    "TRN:",
    "DISTRIBUTOR SHOW REPORT",
    "REPORT FROM",
    "MUNICIPAL",
    "AMT",
    "TAX 10%",
    "TOTAL OF :",
    "GRAND TOTAL",
    "PRINTED ON :",
];

pub fn extract(doc: &Document, exhibitor: &str, extracted_at: &str) -> Result<Vec<RawTicketRow>> {
    let pages = doc.pages();
    let week_type = weekly_tag(pages);

    let mut rows = Vec::new();
    let mut movie = String::new();
    let mut screen: Option<String> = None;
    let mut date = String::new();
    let mut time: Option<String> = None;
    let mut ticket: Option<String> = None;

    for page in pages {
        for line in page {
            let ln = line.trim();
            if ln.is_empty() {
                continue;
            }
            let upper = ln.to_uppercase();
            if NOISE_PHRASES.iter().any(|p| upper.contains(p)) {
                continue;
            }
            let parts = tokens(ln);

            if ln.contains("DATE :") {
                date = parts.get(2).cloned().unwrap_or_default();
                continue;
            }
            if let Some(m) = TIME_RE.find(ln) {
                time = Some(m.as_str().replace(' ', "").to_uppercase());
                ticket = Some(parts[1..parts.len().saturating_sub(6)].join(" "))
                    .filter(|t| !t.is_empty());
            }
            if ln.contains("FILM :") {
                movie = ln
                    .replace("FILM : ", "")
                    .replace("DISTRIBUTOR :", "")
                    .replace("Empire Films", "")
                    .trim()
                    .to_string();
                continue;
            }
            if ln.contains("SCREEN :") {
                screen = Some(ln.replace("SCREEN : ", "").trim().to_string());
                continue;
            }

            if !tail_is_numeric(&parts, 6) {
                continue;
            }
            let tail = &parts[parts.len() - 6..];
            let mut row = RawTicketRow::new(&doc.file_name(), exhibitor, CINEMA, week_type, extracted_at);
            row.movie_title = movie.clone();
            row.show_date = date.clone();
            row.show_time = time.clone();
            row.screen = screen.clone();
            row.format_code = "2D".to_string();
            row.ticket_class = ticket.clone();
            row.admits = clean_num(&tail[0]);
            row.gross = clean_num(&tail[4]);
            row.net = clean_num(&tail[5]);
            rows.push(row);
        }
    }

    Ok(rows)
}

/// "Report From <d> ... To ... <d>" on page 1; more than one day apart
/// makes the file weekly.
fn weekly_tag(pages: &[Vec<String>]) -> &'static str {
    let first: &[String] = pages.first().map(|p| p.as_slice()).unwrap_or(&[]);
    for ln in first {
        if !ln.to_uppercase().contains("REPORT FROM") {
            continue;
        }
        let parts = tokens(ln);
        let parse = |idx: usize| {
            parts
                .get(idx)
                .and_then(|t| NaiveDate::parse_from_str(t, "%d-%m-%Y").ok())
        };
        if let (Some(d1), Some(d2)) = (parse(3), parse(9)) {
            if (d2 - d1).num_days() > 1 {
                return "weekly";
            }
        }
        break;
    }
    ""
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::DocumentBody;

    fn doc(lines: Vec<&str>) -> Document {
        let mut page = vec![
            "AL SHAAB CINEMA",
            "Report From : 16-09-2025 12:00 AM To : 16-09-2025 11:59 PM",
        ];
        page.extend(lines);
        Document {
            path: "shaab.txt".into(),
            body: DocumentBody::Pages(vec![page.into_iter().map(|l| l.to_string()).collect()]),
        }
    }

    #[test]
    fn marker_lines_then_ticket_rows() {
        let d = doc(vec![
            "FILM : THE LONG GAME DISTRIBUTOR : Empire Films",
            "SCREEN : 1",
            "DATE : 16-09-2025",
            "4:00 PM ADULT 35.00 40 70.00 66.50 1,400.00 1,263.50",
        ]);
        let rows = extract(&d, "Shaab", "2025-09-16 20:00:00").unwrap();
        assert_eq!(rows.len(), 1);
        let r = &rows[0];
        assert_eq!(r.cinema, "AL SHAAB");
        assert_eq!(r.movie_title, "THE LONG GAME");
        assert_eq!(r.screen.as_deref(), Some("1"));
        assert_eq!(r.show_date, "16-09-2025");
        assert_eq!(r.show_time.as_deref(), Some("4:00PM"));
        assert_eq!(r.ticket_class.as_deref(), Some("PM ADULT"));
        assert_eq!(r.admits, 35.0);
        assert_eq!(r.gross, 1400.0);
        assert_eq!(r.net, 1263.5);
    }

    #[test]
    fn daily_range_has_no_week_tag() {
        let d = doc(vec![]);
        assert!(extract(&d, "Shaab", "t").unwrap().is_empty());
        assert_eq!(weekly_tag(d.pages()), "");
    }
}
