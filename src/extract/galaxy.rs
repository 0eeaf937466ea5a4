//! Galaxy distributor report extractor.
//!
//! Layout: cinema on line 1, "Weekly Distributor Report" on line 2 for
//! weekly files, then per-screen blocks with a standalone date line, a
//! standalone time line, a "Screen N <movie>" heading and ticket-class data
//! rows ending in seven AED-prefixed numeric columns.

use anyhow::Result;
use chrono::NaiveDate;

use super::lines::{clean_num, contains_time, has_iso_date_and_time, is_numeric_token, tokens, LineKind, RowContext};
use super::VendorRules;
use crate::document::Document;
use crate::rows::RawTicketRow;

const NOISE_PHRASES: &[&str] = &[
    "TICKETTYPE",
    "WEEKLY DISTRIBUTOR REPORT",
    "GRAND TOTAL",
    "DAY TOTAL",
    "TOTAL FOR FILM THIS SCREEN",
];

pub fn extract(
    doc: &Document,
    exhibitor: &str,
    rules: &VendorRules,
    extracted_at: &str,
) -> Result<Vec<RawTicketRow>> {
    let pages = doc.pages();
    let first: &[String] = pages.first().map(|p| p.as_slice()).unwrap_or(&[]);
    let cinema = first.first().map(|l| l.trim().to_string()).unwrap_or_default();
    let week_type = if first
        .get(1)
        .map(|l| l.to_lowercase().contains("weekly distributor report"))
        .unwrap_or(false)
    {
        "weekly"
    } else {
        ""
    };

    let mut rows = Vec::new();
    let mut ctx = RowContext::with_format("2D");

    for (pidx, page) in pages.iter().enumerate() {
        // Fixed report header: six banner lines on page 1, four on reprints.
        let skip_n = if pidx == 0 { 6 } else { 4 };
        for line in page.iter().skip(skip_n) {
            let stripped = line.trim();
            if stripped.is_empty() {
                continue;
            }
            match classify(stripped, &cinema, rules) {
                LineKind::Noise | LineKind::Continuation => continue,
                LineKind::DateMarker(d) => ctx.date = d,
                LineKind::TimeMarker(t) => ctx.time = Some(t),
                LineKind::MovieHeader { title, screen } => {
                    ctx.start_movie(title, "2D");
                    if screen.is_some() {
                        ctx.screen = screen;
                    }
                }
                LineKind::ScreenMarker(s) => ctx.screen = Some(s),
                LineKind::DataRow(toks) => {
                    let tail = &toks[toks.len() - 7..];
                    // A bare 7-token line has no ticket-class head at all.
                    let ticket_class = toks
                        .get(1..toks.len() - 7)
                        .unwrap_or(&[])
                        .join(" ");
                    let mut row = RawTicketRow::new(
                        &doc.file_name(),
                        exhibitor,
                        &cinema,
                        week_type,
                        extracted_at,
                    );
                    row.movie_title = ctx.movie.clone();
                    row.show_date = ctx.date.clone();
                    row.show_time = ctx.time.clone();
                    row.screen = ctx.screen.clone();
                    row.format_code = "2D".to_string();
                    row.ticket_class = Some(ticket_class);
                    row.comp = Some(clean_num(&strip_aed(&tail[1])));
                    row.admits = clean_num(&strip_aed(&tail[2]));
                    row.gross = clean_num(&strip_aed(&tail[3]));
                    row.net = clean_num(&strip_aed(&tail[6]));
                    rows.push(row);
                }
            }
        }
    }

    Ok(rows)
}

fn classify(line: &str, cinema: &str, rules: &VendorRules) -> LineKind {
    let upper = line.to_uppercase();
    if NOISE_PHRASES.iter().any(|p| upper.contains(p))
        || line == cinema
        || has_iso_date_and_time(line)
        || is_only_aed_and_numbers(line)
    {
        return LineKind::Noise;
    }

    let toks = tokens(line);
    if let Some(first) = toks.first() {
        if NaiveDate::parse_from_str(first, "%d-%m-%Y").is_ok() {
            return LineKind::DateMarker(first.clone());
        }
        if contains_time(first) {
            return LineKind::TimeMarker(first.clone());
        }
    }

    // "Screen N <movie title>" headings carry both values. Longest label
    // first so "Screen 15" never matches as "Screen 1".
    let mut screens: Vec<&String> = rules.galaxy_screens.iter().collect();
    screens.sort_by_key(|s| std::cmp::Reverse(s.len()));
    for screen in screens {
        let screen_upper = screen.to_uppercase();
        if upper.contains(&screen_upper) {
            let movie = upper.replace(&screen_upper, "").trim().to_string();
            return if movie.is_empty() {
                LineKind::ScreenMarker(screen_upper)
            } else {
                LineKind::MovieHeader {
                    title: movie,
                    screen: Some(screen_upper),
                }
            };
        }
    }

    if toks.len() >= 7 && toks[toks.len() - 7..].iter().all(|t| is_numeric_token(&strip_aed(t))) {
        return LineKind::DataRow(toks);
    }
    LineKind::Continuation
}

fn strip_aed(token: &str) -> String {
    token.replace("AED", "").replace("aed", "")
}

/// Currency subtotal lines print only "AED", digits and separators.
fn is_only_aed_and_numbers(line: &str) -> bool {
    let t = line.trim();
    if !t.to_uppercase().contains("AED") {
        return false;
    }
    t.chars().all(|c| {
        matches!(c, 'A' | 'E' | 'D' | 'a' | 'e' | 'd') || c.is_ascii_digit() || matches!(c, '.' | ',' | ' ')
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::DocumentBody;

    fn doc(lines: Vec<&str>) -> Document {
        let mut page = vec![
            "GALAXY CINEMA MALL",
            "Weekly Distributor Report",
            "header 3",
            "header 4",
            "header 5",
            "header 6",
        ];
        page.extend(lines);
        Document {
            path: "galaxy.txt".into(),
            body: DocumentBody::Pages(vec![page.into_iter().map(|l| l.to_string()).collect()]),
        }
    }

    #[test]
    fn data_rows_follow_markers() {
        let d = doc(vec![
            "16-09-2025",
            "18:30",
            "Screen 3 THE LONG GAME",
            "1 ADULT AED40.00 2 38 AED1,520.00 AED76.00 AED15.00 AED1,429.00",
        ]);
        let rows = extract(&d, "Galaxy", &VendorRules::default(), "2025-09-16 20:00:00").unwrap();
        assert_eq!(rows.len(), 1);
        let r = &rows[0];
        assert_eq!(r.week_type, "weekly");
        assert_eq!(r.show_date, "16-09-2025");
        assert_eq!(r.show_time.as_deref(), Some("18:30"));
        assert_eq!(r.screen.as_deref(), Some("SCREEN 3"));
        assert_eq!(r.movie_title, "THE LONG GAME");
        assert_eq!(r.comp, Some(2.0));
        assert_eq!(r.admits, 38.0);
        assert_eq!(r.gross, 1520.0);
        assert_eq!(r.net, 1429.0);
    }

    #[test]
    fn bare_seven_token_row_has_empty_ticket_class() {
        let d = doc(vec![
            "16-09-2025",
            "Screen 3 THE LONG GAME",
            "123 45 678.00 12 13 14 15",
        ]);
        let rows = extract(&d, "Galaxy", &VendorRules::default(), "t").unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].ticket_class.as_deref(), Some(""));
        assert_eq!(rows[0].comp, Some(45.0));
        assert_eq!(rows[0].net, 15.0);
    }

    #[test]
    fn subtotal_and_furniture_lines_are_noise() {
        let d = doc(vec![
            "AED 1,234.00 567.00",
            "printed 2025-09-16 18:42",
            "GRAND TOTAL AED9,999.00",
            "free text line",
        ]);
        let rows = extract(&d, "Galaxy", &VendorRules::default(), "2025-09-16 20:00:00").unwrap();
        assert!(rows.is_empty());
    }
}
