//! Cine Royale film-income extractor.
//!
//! Single-film report: the movie rides on the "Distributor : Empire" header
//! line and the From/To range decides daily versus weekly. Times print
//! with a dot ("6.30 PM"); a time line names the screen in whatever text
//! surrounds the time.

use std::sync::LazyLock;

use anyhow::Result;
use chrono::NaiveDate;
use regex::Regex;

use super::lines::{clean_num, tail_is_numeric, tokens};
use crate::document::Document;
use crate::rows::RawTicketRow;

static DOT_TIME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b\d{1,2}\.\d{2}\s?(?:AM|PM)\b").unwrap());

const NOISE_PHRASES: &[&str] = &[
    "P.O.BOX 0",
    "TEL : FAX:",
    "FILM INCOME REPORT",
    "ADMITS",
    "FROM :",
    "TO :",
    "AMT(INC",
    "IPLAITI",
    "TOTAL OF",
    "COLLECTION CHECK LIST",
    "GRAND TOTAL",
    "DISTRIBUTOR : EMPIRE",
];

pub fn extract(doc: &Document, exhibitor: &str, extracted_at: &str) -> Result<Vec<RawTicketRow>> {
    let pages = doc.pages();
    let (cinema, movie, week_type) = header_info(pages);

    let mut rows = Vec::new();
    let mut date = String::new();
    let mut time: Option<String> = None;
    let mut screen: Option<String> = None;

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
            if let Some(first) = parts.first() {
                if NaiveDate::parse_from_str(first, "%d/%m/%Y").is_ok() {
                    date = first.clone();
                    continue;
                }
            }
            if let Some(m) = DOT_TIME_RE.find(ln) {
                time = Some(m.as_str().to_string());
                screen = Some(ln.replace(m.as_str(), "").trim().to_string())
                    .filter(|s| !s.is_empty());
            }
            if !tail_is_numeric(&parts, 6) {
                continue;
            }
            let tail = &parts[parts.len() - 6..];
            let mut row = RawTicketRow::new(&doc.file_name(), exhibitor, &cinema, week_type, extracted_at);
            row.movie_title = movie.clone();
            row.show_date = date.clone();
            row.show_time = time.clone();
            row.screen = screen.clone();
            row.format_code = "2D".to_string();
            row.ticket_class = Some(parts[..parts.len() - 6].join(" ")).filter(|t| !t.is_empty());
            row.admits = clean_num(&tail[0]);
            row.gross = clean_num(&tail[1]);
            row.net = clean_num(&tail[5]);
            rows.push(row);
        }
    }

    Ok(rows)
}

fn header_info(pages: &[Vec<String>]) -> (String, String, &'static str) {
    let first: &[String] = pages.first().map(|p| p.as_slice()).unwrap_or(&[]);
    let cinema = first
        .iter()
        .find(|l| !l.trim().is_empty())
        .map(|l| l.trim().to_string())
        .unwrap_or_default();

    let mut from: Option<NaiveDate> = None;
    let mut week_type = "";
    let mut movie = String::new();
    for ln in first {
        let upper = ln.to_uppercase();
        if upper.starts_with("FROM :") {
            from = second_last_date(ln);
        } else if upper.starts_with("TO :") {
            if let (Some(d1), Some(d2)) = (from, second_last_date(ln)) {
                if (d2 - d1).num_days() > 1 {
                    week_type = "weekly";
                }
            }
        } else if upper.contains("DISTRIBUTOR : EMPIRE") {
            if let Some((_, rest)) = ln.split_once(':') {
                movie = rest
                    .replace("DISTRIBUTOR : EMPIRE", "")
                    .replace("Distributor : Empire", "")
                    .trim()
                    .to_string();
            }
            break;
        }
    }
    (cinema, movie, week_type)
}

/// The date sits second-to-last on the From/To lines ("From : 11/09/2025 Friday").
fn second_last_date(ln: &str) -> Option<NaiveDate> {
    let parts = tokens(ln);
    let token = parts.get(parts.len().checked_sub(2)?)?;
    NaiveDate::parse_from_str(token, "%d/%m/%Y").ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::DocumentBody;

    fn doc(lines: Vec<&str>) -> Document {
        let mut page = vec![
            "CINE ROYALE DEIRA",
            "FILM INCOME REPORT",
            "From : 11/09/2025 Thursday",
            "To : 17/09/2025 Wednesday",
            "Film : THE LONG GAME Distributor : Empire",
        ];
        page.extend(lines);
        Document {
            path: "cine_royale.txt".into(),
            body: DocumentBody::Pages(vec![page.into_iter().map(|l| l.to_string()).collect()]),
        }
    }

    #[test]
    fn date_time_then_ticket_rows() {
        let d = doc(vec![
            "11/09/2025",
            "6.30 PM SCREEN 1",
            "ADULT 40 1,400.00 70.00 66.50 8.00 1,263.50",
        ]);
        let rows = extract(&d, "Cine Royale", "2025-09-16 20:00:00").unwrap();
        assert_eq!(rows.len(), 1);
        let r = &rows[0];
        assert_eq!(r.cinema, "CINE ROYALE DEIRA");
        assert_eq!(r.movie_title, "THE LONG GAME");
        assert_eq!(r.week_type, "weekly");
        assert_eq!(r.show_date, "11/09/2025");
        assert_eq!(r.show_time.as_deref(), Some("6.30 PM"));
        assert_eq!(r.screen.as_deref(), Some("SCREEN 1"));
        assert_eq!(r.ticket_class.as_deref(), Some("ADULT"));
        assert_eq!(r.admits, 40.0);
        assert_eq!(r.gross, 1400.0);
        assert_eq!(r.net, 1263.5);
    }

    #[test]
    fn time_line_without_numbers_emits_nothing() {
        let d = doc(vec!["6.30 PM SCREEN 1"]);
        assert!(extract(&d, "Cine Royale", "t").unwrap().is_empty());
    }
}
