//! Truth weekly statement extractor.
//!
//! Single-film weekly statement: the movie is on line 6 of page 1, rows
//! only start after the opening rate-card "Total" line, and "Show Time"
//! lines reset the date, time and screen (screen follows an "@"). An
//! "Up To Date Statement" section ends the document.

use std::sync::LazyLock;

use anyhow::Result;
use regex::Regex;

use super::lines::{clean_num, tail_is_numeric, tokens};
use crate::document::Document;
use crate::rows::RawTicketRow;

static DATE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d{2}-\d{2}-\d{4}").unwrap());
static TIME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b\d{1,2}:\d{2}\s*(?:AM|PM)\b").unwrap());
static SCREEN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"@\s*(.*)$").unwrap());

const NOISE_PHRASES: &[&str] = &[
    "AL MARIAH MALL",
    "DAILY COLLECTION REPORT",
    "DETAILED DISTRIBUTORS REPORT",
    "EMPIRE CINEMAS",
    "NO. OF SESSIONS",
    "ADMIN RATE",
    "DIST SHARE",
    "DAY TOTAL",
    "GRAND TOTAL",
    "MOVIECLICKS",
];

pub fn extract(doc: &Document, exhibitor: &str, extracted_at: &str) -> Result<Vec<RawTicketRow>> {
    let pages = doc.pages();
    let first: &[String] = pages.first().map(|p| p.as_slice()).unwrap_or(&[]);
    let cinema = first
        .iter()
        .find(|l| !l.trim().is_empty())
        .map(|l| l.trim().to_string())
        .unwrap_or_default();
    let movie = first.get(5).map(|l| l.trim().to_string()).unwrap_or_default();

    let mut rows = Vec::new();
    let mut started = false;
    let mut date = String::new();
    let mut time: Option<String> = None;
    let mut screen: Option<String> = None;

    for (pidx, page) in pages.iter().enumerate() {
        for (idx, line) in page.iter().enumerate() {
            let ln = line.trim();
            if ln.is_empty() || (pidx == 0 && idx < 6) {
                continue;
            }
            let upper = ln.to_uppercase();
            if upper.contains("UP TO DATE STATEMENT") {
                return Ok(rows);
            }
            if NOISE_PHRASES.iter().any(|p| upper.contains(p)) {
                continue;
            }
            let parts = tokens(ln);

            // The rate-card recap "Total" line opens the sessions section.
            if !started {
                started = parts.first().map(|p| p == "Total").unwrap_or(false);
                continue;
            }
            if parts.len() > 2
                && parts[0].eq_ignore_ascii_case("total")
                && is_numeric(&parts[1])
            {
                continue;
            }

            if ln.contains("Show Time") {
                date = DATE_RE.find(ln).map(|m| m.as_str().to_string()).unwrap_or_default();
                time = TIME_RE
                    .find(ln)
                    .map(|m| m.as_str().replace(' ', "").to_uppercase());
                screen = SCREEN_RE
                    .captures(ln)
                    .map(|c| c[1].trim().to_string());
                continue;
            }

            if !tail_is_numeric(&parts, 6) {
                continue;
            }
            let tail = &parts[parts.len() - 6..];
            let mut row = RawTicketRow::new(&doc.file_name(), exhibitor, &cinema, "weekly", extracted_at);
            row.movie_title = movie.clone();
            row.show_date = date.clone();
            row.show_time = time.clone();
            row.screen = screen.clone();
            row.format_code = "2D".to_string();
            row.ticket_class = Some(parts[..parts.len().saturating_sub(8)].join(" "))
                .filter(|t| !t.is_empty());
            row.admits = clean_num(&tail[1]);
            row.gross = clean_num(&tail[2]);
            row.net = clean_num(&tail[3]);
            rows.push(row);
        }
    }

    Ok(rows)
}

fn is_numeric(s: &str) -> bool {
    let t = s.replace(',', "");
    let t = t.replacen('.', "", 1);
    !t.is_empty() && t.chars().all(|c| c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::DocumentBody;

    fn doc(lines: Vec<&str>) -> Document {
        let mut page = vec![
            "TRUTH CINEMA",
            "AL MARIAH MALL",
            "DETAILED DISTRIBUTORS REPORT",
            "header 4",
            "header 5",
            "THE LONG GAME WEEK 2",
        ];
        page.extend(lines);
        Document {
            path: "truth.txt".into(),
            body: DocumentBody::Pages(vec![page.into_iter().map(|l| l.to_string()).collect()]),
        }
    }

    #[test]
    fn rows_only_after_rate_card_total() {
        let d = doc(vec![
            "ADULT 10.00 35.00 5 175.00 175.00 8.75 166.25",
            "Total 175.00",
            "Show Time 16-09-2025 4:00 PM @ SCREEN 2",
            "ADULT 10.00 35.00 5 175.00 175.00 8.75 166.25",
        ]);
        let rows = extract(&d, "Truth", "2025-09-16 20:00:00").unwrap();
        assert_eq!(rows.len(), 1);
        let r = &rows[0];
        assert_eq!(r.week_type, "weekly");
        assert_eq!(r.movie_title, "THE LONG GAME WEEK 2");
        assert_eq!(r.show_date, "16-09-2025");
        assert_eq!(r.show_time.as_deref(), Some("4:00PM"));
        assert_eq!(r.screen.as_deref(), Some("SCREEN 2"));
        assert_eq!(r.admits, 5.0);
        assert_eq!(r.gross, 175.0);
        assert_eq!(r.net, 175.0);
    }

    #[test]
    fn up_to_date_statement_stops_the_file() {
        let d = doc(vec![
            "Total 175.00",
            "Show Time 16-09-2025 4:00 PM @ SCREEN 2",
            "Up To Date Statement",
            "ADULT 10.00 35.00 5 175.00 175.00 8.75 166.25",
        ]);
        assert!(extract(&d, "Truth", "t").unwrap().is_empty());
    }
}
