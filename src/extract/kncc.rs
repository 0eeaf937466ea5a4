//! Cinescape (KNCC) head-office daily report extractor.
//!
//! One document covers every Cinescape site: cinema marker lines switch the
//! current site, movie titles stand alone, and data rows are per-format
//! lines whose last token is a KD-prefixed gross amount. The business date
//! is printed once, on line 4 of page 1.

use std::sync::LazyLock;

use anyhow::{anyhow, Result};
use regex::Regex;

use super::lines::{clean_num, tokens, LineKind, RowContext};
use super::VendorRules;
use crate::document::Document;
use crate::rows::RawTicketRow;

static DATE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b\d{2}/\d{2}/\d{4}\b").unwrap());
static KD_AMOUNT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^KD\d{1,3}(?:,\d{3})*(?:\.\d+)?$").unwrap());

const NOISE_EXACT: &[&str] = &[
    "Head Office",
    "Distributor Daily Box Office",
    "Empire",
    "Cinescape",
    "Cinescape Total",
    "Total",
];

const NOISE_CONTAINS: &[&str] = &[
    "Head Office",
    "Business Date",
    "Gross Box Office",
    "Number Admits",
    "Distributor Daily Box Office",
    "HOReportFiles",
    "Vista Entertainment Solutions Ltd",
    "Cinescape Total",
];

pub fn extract(
    doc: &Document,
    exhibitor: &str,
    rules: &VendorRules,
    extracted_at: &str,
) -> Result<Vec<RawTicketRow>> {
    let pages = doc.pages();
    let first: &[String] = pages.first().map(|p| p.as_slice()).unwrap_or(&[]);
    let date = first
        .get(3)
        .and_then(|l| DATE_RE.find(l))
        .map(|m| m.as_str().to_string())
        .ok_or_else(|| anyhow!("business date not found on line 4"))?;

    let site_totals: Vec<String> = rules
        .kncc_cinemas
        .iter()
        .map(|(name, _)| format!("{} TOTAL", name.to_uppercase()))
        .collect();

    let mut rows = Vec::new();
    let mut ctx = RowContext::with_format("2D");

    for page in pages {
        for line in page.iter().skip(1) {
            let stripped = line.trim();
            if stripped.is_empty() {
                continue;
            }
            // Rest of the page is the film summary recap, already covered.
            if stripped == "Film Summary" {
                break;
            }
            match classify(stripped, rules, &site_totals) {
                LineKind::Noise => continue,
                LineKind::ScreenMarker(site) => {
                    // Site marker: all following rows belong to this cinema.
                    ctx.screen = Some(site);
                }
                LineKind::MovieHeader { title, .. } => {
                    ctx.start_movie(title, "2D");
                }
                LineKind::DataRow(parts) => {
                    let gross = clean_num(&parts[parts.len() - 1].replace("KD", ""));
                    let comp = clean_num(&parts[parts.len() - 3]);
                    let admits = clean_num(&parts[parts.len() - 4]);
                    let format = if parts.len() > 5 {
                        parts[..parts.len() - 5].join(" ").trim().to_string()
                    } else {
                        String::new()
                    };
                    let mut row = RawTicketRow::new(
                        &doc.file_name(),
                        exhibitor,
                        ctx.screen.as_deref().unwrap_or_default(),
                        "",
                        extracted_at,
                    );
                    row.movie_title = ctx.movie.clone();
                    row.show_date = date.clone();
                    row.format_code = format;
                    row.admits = admits;
                    row.gross = gross;
                    row.net = 0.0;
                    row.comp = Some(comp);
                    rows.push(row);
                }
                _ => continue,
            }
        }
    }

    Ok(rows)
}

fn classify(line: &str, rules: &VendorRules, site_totals: &[String]) -> LineKind {
    let upper = line.to_uppercase();
    if NOISE_EXACT.contains(&line)
        || NOISE_CONTAINS.iter().any(|p| line.contains(p))
        || site_totals.iter().any(|t| upper.contains(t))
    {
        return LineKind::Noise;
    }

    if let Some((name, _room)) = rules
        .kncc_cinemas
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(line))
    {
        return LineKind::ScreenMarker(name.clone());
    }

    let parts = tokens(line);
    let Some(last) = parts.last() else {
        return LineKind::Noise;
    };
    // A trailing bare integer means the format column printed with no
    // admissions behind it.
    if last.chars().all(|c| c.is_ascii_digit()) && !last.is_empty() {
        return LineKind::Noise;
    }
    if parts.len() >= 4 && KD_AMOUNT_RE.is_match(last) {
        if parts[0] == "Total" {
            return LineKind::Noise;
        }
        return LineKind::DataRow(parts);
    }

    // No KD amount: the whole line is the next movie title.
    LineKind::MovieHeader {
        title: line.to_string(),
        screen: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::DocumentBody;

    fn doc(lines: Vec<&str>) -> Document {
        let mut page = vec![
            "Cinescape",
            "Head Office",
            "Distributor Daily Box Office",
            "Business Date 16/09/2025",
        ];
        page.extend(lines);
        Document {
            path: "kncc.txt".into(),
            body: DocumentBody::Pages(vec![page.into_iter().map(|l| l.to_string()).collect()]),
        }
    }

    #[test]
    fn site_then_movie_then_format_rows() {
        let d = doc(vec![
            "Cinescape Avenues",
            "THE LONG GAME",
            "IMAX 3D 4 120 5 77 KD1,234.500",
            "2D 2 60 0 31 KD640.000",
        ]);
        let rows = extract(&d, "KNCC", &VendorRules::default(), "2025-09-16 20:00:00").unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].cinema, "Cinescape Avenues");
        assert_eq!(rows[0].movie_title, "THE LONG GAME");
        assert_eq!(rows[0].format_code, "IMAX 3D");
        assert_eq!(rows[0].show_date, "16/09/2025");
        assert_eq!(rows[0].admits, 120.0);
        assert_eq!(rows[0].comp, Some(5.0));
        assert_eq!(rows[0].gross, 1234.5);
        assert_eq!(rows[1].format_code, "2D");
    }

    #[test]
    fn site_total_and_bare_integer_lines_skipped() {
        let d = doc(vec![
            "Cinescape Avenues",
            "THE LONG GAME",
            "CINESCAPE AVENUES TOTAL KD9,999.000",
            "IMAX 3D 4",
        ]);
        let rows = extract(&d, "KNCC", &VendorRules::default(), "2025-09-16 20:00:00").unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn missing_business_date_fails_document() {
        let d = Document {
            path: "kncc.txt".into(),
            body: DocumentBody::Pages(vec![vec!["Cinescape".to_string(), "x".to_string()]]),
        };
        assert!(extract(&d, "KNCC", &VendorRules::default(), "t").is_err());
    }

    #[test]
    fn film_summary_ends_page() {
        let d = doc(vec![
            "Cinescape Avenues",
            "THE LONG GAME",
            "Film Summary",
            "2D 2 60 0 31 KD640.000",
        ]);
        let rows = extract(&d, "KNCC", &VendorRules::default(), "2025-09-16 20:00:00").unwrap();
        assert!(rows.is_empty());
    }
}
