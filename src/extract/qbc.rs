//! Qatar Bahrain Cinema extractor.
//!
//! Same block shape as the Bahrain daily-collection report (movie, screen,
//! per-show time lines) but comps are derived instead of recapped: the
//! fourth column carries total admissions and the second-to-last the paid
//! ones, so comps is their difference.

use std::sync::LazyLock;

use anyhow::Result;
use regex::Regex;

use super::lines::{clean_num, tokens};
use crate::document::Document;
use crate::rows::RawTicketRow;

static TIME_AMPM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b\d{1,2}:\d{2}\s?(?:am|pm)\b").unwrap());
static DATE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b\d{2}/\d{2}/\d{4}\b").unwrap());
static MONEY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\d,]+(\.\d+)?$").unwrap());

const SKIP_PHRASES: &[&str] = &["QATAR BAHRAIN CINEMA", "EMPIRE INTERNATIONAL", "Screen Total"];

pub fn extract(doc: &Document, exhibitor: &str, extracted_at: &str) -> Result<Vec<RawTicketRow>> {
    let pages = doc.pages();
    let cinema = pages
        .first()
        .and_then(|p| p.first())
        .map(|l| l.trim().to_string())
        .unwrap_or_default();

    let mut rows = Vec::new();
    let mut movie = String::new();
    let mut screen = String::new();
    let mut expect_movie = true;

    for page in pages {
        for line in page.iter().skip(5) {
            let stripped = line.trim();
            if stripped.is_empty() {
                continue;
            }
            if stripped.contains("Distributor Total") {
                break;
            }
            if SKIP_PHRASES.iter().any(|p| stripped.contains(p)) {
                continue;
            }

            if expect_movie {
                movie = stripped.to_string();
                expect_movie = false;
                continue;
            }
            if stripped.contains("Movie Total") {
                expect_movie = true;
                continue;
            }

            let Some(time) = TIME_AMPM_RE.find(stripped).map(|m| m.as_str().to_string()) else {
                screen = stripped.to_string();
                continue;
            };

            let parts = tokens(stripped);
            let mut admits = 0.0;
            let mut gross = 0.0;
            let mut comps = 0.0;
            if let Some(last) = parts.last().filter(|p| MONEY_RE.is_match(p)) {
                gross = clean_num(last);
            }
            if parts.len() >= 2 && is_digits(&parts[parts.len() - 2]) {
                admits = clean_num(&parts[parts.len() - 2]);
            }
            // Column four holds total admissions including comps.
            if parts.len() >= 4 && is_digits(&parts[3]) {
                comps = clean_num(&parts[3]) - admits;
            }

            let mut row = RawTicketRow::new(&doc.file_name(), exhibitor, &cinema, "", extracted_at);
            row.movie_title = movie.clone();
            row.show_date = DATE_RE
                .find(stripped)
                .map(|m| m.as_str().to_string())
                .unwrap_or_default();
            row.show_time = Some(time);
            row.screen = Some(screen.clone());
            row.format_code = "2D".to_string();
            row.admits = admits;
            row.gross = gross;
            row.net = gross;
            row.comp = Some(comps);
            rows.push(row);
        }
    }

    Ok(rows)
}

fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::DocumentBody;

    fn doc(lines: Vec<&str>) -> Document {
        let mut page = vec![
            "QBC Royal Plaza",
            "QATAR BAHRAIN CINEMA COMPANY",
            "header 3",
            "header 4",
            "header 5",
        ];
        page.extend(lines);
        Document {
            path: "qbc.txt".into(),
            body: DocumentBody::Pages(vec![page.into_iter().map(|l| l.to_string()).collect()]),
        }
    }

    #[test]
    fn comps_are_total_minus_paid() {
        let d = doc(vec![
            "THE LONG GAME",
            "Screen 2",
            "16/09/2025 7:00pm 35.00 50 1,575.00 45 1,575.00",
        ]);
        let rows = extract(&d, "QBC", "2025-09-16 20:00:00").unwrap();
        assert_eq!(rows.len(), 1);
        let r = &rows[0];
        assert_eq!(r.movie_title, "THE LONG GAME");
        assert_eq!(r.screen.as_deref(), Some("Screen 2"));
        assert_eq!(r.show_date, "16/09/2025");
        assert_eq!(r.show_time.as_deref(), Some("7:00pm"));
        assert_eq!(r.admits, 45.0);
        assert_eq!(r.comp, Some(5.0));
        assert_eq!(r.gross, 1575.0);
        assert_eq!(r.net, 1575.0);
    }

    #[test]
    fn distributor_total_ends_extraction() {
        let d = doc(vec![
            "THE LONG GAME",
            "Distributor Total 9,999.00",
            "16/09/2025 7:00pm 35.00 50 1,575.00 45 1,575.00",
        ]);
        assert!(extract(&d, "QBC", "t").unwrap().is_empty());
    }
}
