//! Bahrain City Centre daily-collection extractor.
//!
//! Blocks run movie, then screen, then per-show time lines. Complimentary
//! admissions only appear on the screen-total recap line, so they are
//! collected up front and attached to the first show of each screen block,
//! with admits reduced by the same amount. Amounts print a decimal comma.

use std::sync::LazyLock;

use anyhow::Result;
use regex::Regex;

use super::lines::{clean_num_decimal_comma, tokens};
use crate::document::Document;
use crate::rows::RawTicketRow;

static TIME_AMPM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b\d{1,2}:\d{2}\s?(?:am|pm)\b").unwrap());
static DATE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b\d{2}/\d{2}/\d{4}\b").unwrap());
static LONG_DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\d{1,2}\s+[A-Za-z]+\s+\d{4}\s*,\s*[A-Za-z]+\b").unwrap());

const SKIP_PHRASES: &[&str] = &[
    "Daily Collection",
    "EMPIRE INTERNATIONAL",
    "Screen Total",
    "Amt.(inc.VAT)",
    "Net Amount",
];

pub fn extract(doc: &Document, exhibitor: &str, extracted_at: &str) -> Result<Vec<RawTicketRow>> {
    let pages = doc.pages();
    let cinema = pages
        .first()
        .and_then(|p| p.first())
        .map(|l| l.trim().to_string())
        .unwrap_or_default();

    let comps_arr = collect_screen_comps(pages);
    let mut comps_idx = 0usize;
    let mut new_screen = true;

    let mut rows = Vec::new();
    let mut movie = String::new();
    let mut screen = String::new();
    let mut expect_movie = true;

    for page in pages {
        for line in page.iter().skip(1) {
            let stripped = line.trim();
            if stripped.is_empty() {
                continue;
            }
            if stripped.contains("Distributor Total") {
                break;
            }
            if SKIP_PHRASES.iter().any(|p| stripped.contains(p))
                || LONG_DATE_RE.is_match(stripped)
            {
                continue;
            }

            // First valid line of a block is the film title.
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
                // Anything else between shows names the screen.
                screen = stripped.to_string();
                new_screen = true;
                continue;
            };

            let date = DATE_RE
                .find(stripped)
                .map(|m| m.as_str().to_string())
                .unwrap_or_default();
            let parts = tokens(stripped);

            let comps = if new_screen {
                let c = comps_arr.get(comps_idx).copied().unwrap_or(0.0);
                comps_idx += 1;
                new_screen = false;
                c
            } else {
                0.0
            };

            let (mut admits, gross, net) = show_figures(&parts);
            admits -= comps;

            let mut row = RawTicketRow::new(&doc.file_name(), exhibitor, &cinema, "", extracted_at);
            row.movie_title = movie.clone();
            row.show_date = date;
            row.show_time = Some(time);
            row.screen = Some(screen.clone());
            row.format_code = "2D".to_string();
            row.admits = admits;
            row.gross = gross;
            row.net = net;
            row.comp = Some(comps);
            rows.push(row);
        }
    }

    Ok(rows)
}

/// Admits, gross and net for one show line.
fn show_figures(parts: &[String]) -> (f64, f64, f64) {
    // Show listed with no admissions at all.
    if parts.len() == 3 {
        return (0.0, 0.0, 0.0);
    }
    // Pure-comps show: exactly five columns with the last two equal digits.
    // The amount is zero and the comps were already counted on the recap.
    if parts.len() == 5
        && is_digits(&parts[4])
        && is_digits(&parts[3])
        && parts[4] == parts[3]
    {
        return (clean_num_decimal_comma(&parts[4]), 0.0, 0.0);
    }
    if parts.len() >= 5 && is_digits(&parts[3]) {
        return (
            clean_num_decimal_comma(&parts[3]),
            clean_num_decimal_comma(&parts[parts.len() - 4]),
            clean_num_decimal_comma(&parts[parts.len() - 1]),
        );
    }
    (0.0, 0.0, 0.0)
}

fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_digit())
}

/// Comps live on each screen-total recap line, one entry per screen block
/// in document order. Tokenized, the recap reads "Screen Total <shows>
/// <admits> <comps> ..."; the comps figure is the fifth token.
fn collect_screen_comps(pages: &[Vec<String>]) -> Vec<f64> {
    let mut comps = Vec::new();
    for page in pages {
        for line in page {
            if !line.contains("Screen Total") {
                continue;
            }
            let parts = tokens(line.trim());
            let value = parts
                .get(4)
                .filter(|p| is_digits(p))
                .map(|p| clean_num_decimal_comma(p))
                .unwrap_or(0.0);
            comps.push(value);
        }
    }
    comps
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::DocumentBody;

    fn doc(lines: Vec<&str>) -> Document {
        let mut page = vec!["Cineco Bahrain City Centre"];
        page.extend(lines);
        Document {
            path: "bcc.txt".into(),
            body: DocumentBody::Pages(vec![page.into_iter().map(|l| l.to_string()).collect()]),
        }
    }

    #[test]
    fn comps_attach_to_first_show_of_screen() {
        let d = doc(vec![
            "THE LONG GAME",
            "Screen 4",
            "16/09/2025 2:30pm 3,500 45 157,500 7,875 149,625",
            "16/09/2025 6:30pm 3,500 30 105,000 5,250 99,750",
            "Screen Total 2 75 5 262,500 249,375",
            "Movie Total 262,500",
        ]);
        let rows = extract(&d, "BCC", "2025-09-16 20:00:00").unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].comp, Some(5.0));
        assert_eq!(rows[0].admits, 40.0);
        assert_eq!(rows[0].gross, 157.5);
        assert_eq!(rows[0].net, 149.625);
        assert_eq!(rows[1].comp, Some(0.0));
        assert_eq!(rows[1].admits, 30.0);
        assert_eq!(rows[0].screen.as_deref(), Some("Screen 4"));
        assert_eq!(rows[0].show_time.as_deref(), Some("2:30pm"));
        assert_eq!(rows[0].show_date, "16/09/2025");
    }

    #[test]
    fn pure_comps_show_carries_no_amount() {
        let d = doc(vec![
            "THE LONG GAME",
            "Screen 1",
            "16/09/2025 2:30 pm 8 8",
        ]);
        let rows = extract(&d, "BCC", "t").unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].admits, 8.0);
        assert_eq!(rows[0].gross, 0.0);
        assert_eq!(rows[0].net, 0.0);
    }

    #[test]
    fn distributor_total_ends_page() {
        let d = doc(vec![
            "THE LONG GAME",
            "Screen 1",
            "Distributor Total 500,000",
            "16/09/2025 2:30pm 3,500 45 157,500 7,875 149,625",
        ]);
        assert!(extract(&d, "BCC", "t").unwrap().is_empty());
    }

    #[test]
    fn movie_total_starts_next_film_block() {
        let d = doc(vec![
            "FIRST FILM",
            "Screen 1",
            "16/09/2025 2:30pm 3,500 45 157,500 7,875 149,625",
            "Movie Total 157,500",
            "SECOND FILM",
            "Screen 2",
            "16/09/2025 4:30pm 3,500 20 70,000 3,500 66,500",
        ]);
        let rows = extract(&d, "BCC", "t").unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].movie_title, "SECOND FILM");
        assert_eq!(rows[1].screen.as_deref(), Some("Screen 2"));
    }
}
