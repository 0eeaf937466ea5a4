//! Vista "Detailed Distributors Report" extractor (Cinepolis / Vox / Reel /
//! NOVO / Cinemacity / Roxy chains).
//!
//! Two phases: page 1 carries a per-movie summary table (one pre-aggregated
//! row per title, with session counts) and page 2 onward carries the
//! showtime detail, keyed back to the page-1 movie list.

use std::sync::LazyLock;

use anyhow::Result;
use chrono::NaiveDate;
use regex::Regex;

use super::lines::{clean_num, is_numeric_token, tokens, LineKind, RowContext};
use super::VendorRules;
use crate::document::Document;
use crate::rows::RawTicketRow;

static HEADER_DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\d{1,2}[-/]\d{1,2}[-/]\d{2,4}\b").unwrap());
static DETAIL_DATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(\d{1,2}/\d{1,2}/\d{2,4}|\d{1,2}-(Jan|Feb|Mar|Apr|May|Jun|Jul|Aug|Sep|Oct|Nov|Dec)-\d{2,4})\b",
    )
    .unwrap()
});
static TIME_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d{1,2}:\d{2}").unwrap());
static MAX_SCREEN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)^MAX\s*\d*$").unwrap());

const SKIP_PHRASES: &[&str] = &[
    "Total for Film this Screen",
    "Day Total",
    "Movie Format",
    "Split Movie Format",
    "Ticket Detail Level",
    "Detailed Distributors Report",
    "Vista Entertainment Solutions",
    "Empire(",
    "Avg Ticket Price",
    "Empire International",
    "EMPIRE ENTERTAINMENT",
    "Empire International Gulf",
    "Ticket Prices Admits",
];

pub fn extract(
    doc: &Document,
    exhibitor: &str,
    rules: &VendorRules,
    extracted_at: &str,
) -> Result<Vec<RawTicketRow>> {
    let pages = doc.pages();
    let first: &[String] = pages.first().map(|p| p.as_slice()).unwrap_or(&[]);
    let header = parse_header(first);
    let summary = parse_summary_table(first, rules, &header.date);

    let base = |week_type: &str| {
        RawTicketRow::new(
            &doc.file_name(),
            exhibitor,
            &header.cinema,
            week_type,
            extracted_at,
        )
    };

    let mut rows: Vec<RawTicketRow> = Vec::new();
    for s in &summary.rows {
        let mut row = base(&header.week_type);
        row.movie_title = s.movie.clone();
        row.show_date = header.date.clone();
        row.format_code = s.format.clone();
        row.admits = s.admits;
        row.gross = s.gross;
        row.net = s.net;
        row.comp = Some(s.comp);
        row.is_summary = true;
        row.summary_sessions = Some(s.sessions);
        rows.push(row);
    }

    for page in pages.iter().skip(1) {
        extract_detail_page(page, &summary.movies, rules, &header, &base, &mut rows);
    }

    Ok(rows)
}

struct Header {
    cinema: String,
    date: String,
    week_type: String,
}

fn parse_header(lines: &[String]) -> Header {
    let cinema = lines.first().map(|l| l.trim().to_string()).unwrap_or_default();

    let head_text = lines
        .iter()
        .take(10)
        .map(|l| l.trim())
        .collect::<Vec<_>>()
        .join("\n");
    let dates: Vec<String> = HEADER_DATE_RE
        .find_iter(&head_text)
        .map(|m| m.as_str().replace('-', "/"))
        .collect();

    let date = dates.first().cloned().unwrap_or_default();
    let mut week_type = String::new();
    if dates.len() >= 2 {
        let d1 = NaiveDate::parse_from_str(&dates[0], "%d/%m/%Y");
        let d2 = NaiveDate::parse_from_str(&dates[1], "%d/%m/%Y");
        if let (Ok(d1), Ok(d2)) = (d1, d2) {
            if (d2 - d1).num_days() > 1 {
                week_type = "weekly".to_string();
            }
        }
    }

    Header { cinema, date, week_type }
}

struct SummaryRow {
    movie: String,
    format: String,
    sessions: f64,
    comp: f64,
    admits: f64,
    gross: f64,
    net: f64,
}

struct Summary {
    rows: Vec<SummaryRow>,
    /// Movie titles in table order, used to key page-2 detail lines.
    movies: Vec<String>,
}

/// Data rows in the summary table always carry multiple numeric tail tokens;
/// anything else is a wrapped movie title.
fn is_summary_data_row(toks: &[String]) -> bool {
    let tail = &toks[toks.len().saturating_sub(6)..];
    tail.iter().filter(|t| is_numeric_token(t)).count() >= 2
}

fn parse_summary_table(lines: &[String], rules: &VendorRules, _date: &str) -> Summary {
    let trimmed: Vec<String> = lines.iter().map(|l| l.trim().to_string()).collect();
    let start = trimmed.iter().position(|l| l.contains("Total Box Office"));
    let end = trimmed.iter().position(|l| l.contains("Distributor Total"));
    let (start, end) = match (start, end) {
        (Some(s), Some(e)) if s + 2 <= e => (s, e),
        _ => {
            return Summary {
                rows: Vec::new(),
                movies: Vec::new(),
            }
        }
    };

    let has_format_column = trimmed
        .get(start + 1)
        .map(|l| l.contains("Movie Format"))
        .unwrap_or(false);
    let table = &trimmed[start + 2..end];

    let mut rows = Vec::new();
    let mut movies = Vec::new();
    let mut i = 0;
    while i < table.len() {
        let mut toks = tokens(&table[i]);
        let min_len = if has_format_column { 8 } else { 7 };
        while toks.len() < min_len {
            toks.push(String::new());
        }

        let tail_start = toks.len() - 6;
        let sessions = clean_num(&toks[tail_start]);
        let comp = clean_num(&toks[tail_start + 1]);
        let admits = clean_num(&toks[tail_start + 2]);
        let gross = clean_num(&toks[tail_start + 3]);
        let net = clean_num(&toks[tail_start + 5]);

        let head = &toks[..tail_start];
        let (mut movie, format) = if has_format_column {
            split_trailing_format(head, rules)
        } else {
            (head.join(" ").trim().to_string(), "2D".to_string())
        };

        // Merge wrapped title lines until the next data row.
        let mut j = i + 1;
        while j < table.len() {
            let next_toks = tokens(&table[j]);
            if is_summary_data_row(&next_toks) {
                break;
            }
            movie.push(' ');
            movie.push_str(&next_toks.join(" "));
            j += 1;
        }

        movies.push(movie.clone());
        rows.push(SummaryRow {
            movie,
            format,
            sessions,
            comp,
            admits,
            gross,
            net,
        });
        i = j;
    }

    Summary { rows, movies }
}

/// Try to match the last 1..=4 head tokens against the known format list;
/// the rest is the movie title.
fn split_trailing_format(head: &[String], rules: &VendorRules) -> (String, String) {
    for n in (1..=4.min(head.len())).rev() {
        let candidate = head[head.len() - n..].join(" ");
        if rules
            .formats
            .iter()
            .any(|f| f.eq_ignore_ascii_case(&candidate))
        {
            let movie = head[..head.len() - n].join(" ").trim().to_string();
            return (movie, candidate);
        }
    }
    (head.join(" ").trim().to_string(), String::new())
}

fn classify_detail(line: &str, movies: &[String]) -> LineKind {
    let stripped = line.trim();
    if stripped == "Empire" || SKIP_PHRASES.iter().any(|p| stripped.contains(p)) {
        return LineKind::Noise;
    }
    // Purely numeric lines are page furniture.
    let compact: String = stripped.chars().filter(|c| *c != ' ').collect();
    if !compact.is_empty() && compact.chars().all(|c| c.is_ascii_digit()) {
        return LineKind::Noise;
    }
    if let Some(m) = DETAIL_DATE_RE.find(stripped) {
        return LineKind::DateMarker(m.as_str().to_string());
    }
    if let Some(movie) = movies.iter().find(|mv| !mv.is_empty() && stripped.contains(mv.as_str())) {
        let screen = stripped.replace(movie.as_str(), "").trim().to_string();
        return LineKind::MovieHeader {
            title: movie.clone(),
            screen: Some(screen),
        };
    }
    LineKind::DataRow(tokens(stripped))
}

fn extract_detail_page(
    page: &[String],
    movies: &[String],
    rules: &VendorRules,
    header: &Header,
    base: &dyn Fn(&str) -> RawTicketRow,
    rows: &mut Vec<RawTicketRow>,
) {
    let mut ctx = RowContext::with_format("2D");

    for line in page {
        let stripped = line.trim();
        match classify_detail(stripped, movies) {
            LineKind::Noise => continue,
            LineKind::DateMarker(date) => {
                ctx.date = date;
                continue;
            }
            LineKind::MovieHeader { title, screen } => {
                ctx.screen = screen;
                ctx.start_movie(title, "2D");
                update_format(&mut ctx, stripped, rules);
                continue;
            }
            LineKind::DataRow(mut parts) => {
                if let Some(first) = parts.first() {
                    if TIME_RE.is_match(first) {
                        ctx.time = Some(first.clone());
                    }
                }
                update_format(&mut ctx, stripped, rules);

                // A time standing alone is a session with no sales yet.
                if parts.len() == 1 && TIME_RE.is_match(&parts[0]) {
                    let mut row = base(&header.week_type);
                    row.movie_title = ctx.movie.clone();
                    row.show_date = ctx.date.clone();
                    row.show_time = ctx.time.clone();
                    row.screen = ctx.screen.clone();
                    row.format_code = ctx.format.clone();
                    rows.push(row);
                    continue;
                }

                strip_time_and_format(&mut parts, &ctx);
                if parts.is_empty() {
                    continue;
                }
                // The serial number printed before the ticket class.
                parts.remove(0);
                if parts.len() < 5 {
                    continue;
                }

                let tail = &parts[parts.len() - 5..];
                if tail.iter().all(|t| matches!(t.as_str(), "0" | "0.0" | "0.00")) {
                    continue;
                }
                if !tail.iter().all(|t| is_numeric_token(t)) {
                    continue;
                }

                let ticket_class = parts[..parts.len() - 5].join(" ").trim().to_string();
                if ticket_class.to_uppercase().contains("SCREEN X") {
                    ctx.format = "SCREEN X".to_string();
                }

                let admits = clean_num(&tail[1]);
                let gross = clean_num(&tail[2]);
                let net = clean_num(&tail[4]);

                let mut row = base(&header.week_type);
                row.movie_title = ctx.movie.clone();
                row.show_date = ctx.date.clone();
                row.show_time = ctx.time.clone();
                row.screen = ctx.screen.clone();
                row.format_code = ctx.format.clone();
                row.ticket_class = Some(ticket_class);
                // Zero-gross showings are comps: the printed admits count is
                // complimentary attendance, not a sale.
                if gross == 0.0 {
                    row.admits = 0.0;
                    row.comp = Some(admits);
                } else {
                    row.admits = admits;
                    row.comp = Some(0.0);
                }
                row.gross = gross;
                row.net = net;
                rows.push(row);
            }
            _ => continue,
        }
    }
}

/// Longest known format label contained in the line wins; a MAX screen
/// promotes plain 2D/3D to "MAX 2D"/"MAX 3D", and a screen named after a
/// format overrides the detected one.
fn update_format(ctx: &mut RowContext, line: &str, rules: &VendorRules) {
    let mut best: Option<&str> = None;
    for f in &rules.formats {
        if line.contains(f.as_str()) && f.len() > best.map(|b| b.len()).unwrap_or(0) {
            best = Some(f);
        }
    }
    let Some(best) = best else { return };
    let mut format = best.to_string();

    if let Some(screen) = &ctx.screen {
        if MAX_SCREEN_RE.is_match(screen) && matches!(format.as_str(), "2D" | "3D") {
            format = format!("MAX {}", format);
        }
        let screen_upper = screen.to_uppercase();
        if rules.formats.iter().any(|f| f.to_uppercase() == screen_upper) {
            format = screen.clone();
        }
    }
    ctx.format = format;
}

/// Drop the leading time token and the format tokens the layout repeats at
/// the start of each data row.
fn strip_time_and_format(parts: &mut Vec<String>, ctx: &RowContext) {
    if let Some(time) = &ctx.time {
        if parts.first() == Some(time) {
            parts.remove(0);
        }
    }
    let fmt_tokens: Vec<&str> = ctx.format.split_whitespace().collect();
    if !fmt_tokens.is_empty()
        && parts.len() >= fmt_tokens.len()
        && parts[..fmt_tokens.len()]
            .iter()
            .zip(&fmt_tokens)
            .all(|(p, f)| p == f)
    {
        parts.drain(..fmt_tokens.len());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::DocumentBody;

    fn doc(pages: Vec<Vec<&str>>) -> Document {
        Document {
            path: "vox_daily.txt".into(),
            body: DocumentBody::Pages(
                pages
                    .into_iter()
                    .map(|p| p.into_iter().map(|l| l.to_string()).collect())
                    .collect(),
            ),
        }
    }

    fn summary_page() -> Vec<&'static str> {
        vec![
            "VOX CITY MALL",
            "Report for 01/02/2026",
            "Total Box Office",
            "Movie Name Movie Format Sessions Comps Admits Gross Tax Net",
            "DUNE PART THREE IMAX 3D 4 2 100 1,000.00 50.00 950.00",
            "THE LONG GAME 2D 2 0 40 400.00 20.00 380.00",
            "Distributor Total",
        ]
    }

    #[test]
    fn summary_rows_are_flagged() {
        let d = doc(vec![summary_page()]);
        let rows = extract(&d, "Vox", &VendorRules::default(), "2026-02-01 10:00:00").unwrap();
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| r.is_summary));
        assert_eq!(rows[0].movie_title, "DUNE PART THREE");
        assert_eq!(rows[0].format_code, "IMAX 3D");
        assert_eq!(rows[0].summary_sessions, Some(4.0));
        assert_eq!(rows[0].admits, 100.0);
        assert_eq!(rows[0].gross, 1000.0);
        assert_eq!(rows[0].net, 950.0);
        assert_eq!(rows[1].movie_title, "THE LONG GAME");
        assert_eq!(rows[1].format_code, "2D");
    }

    #[test]
    fn wrapped_summary_title_is_merged() {
        let mut page = summary_page();
        page.insert(5, "EXTENDED EDITION");
        let d = doc(vec![page]);
        let rows = extract(&d, "Vox", &VendorRules::default(), "2026-02-01 10:00:00").unwrap();
        assert_eq!(rows[0].movie_title, "DUNE PART THREE EXTENDED EDITION");
    }

    #[test]
    fn detail_rows_carry_rolling_state() {
        let d = doc(vec![
            summary_page(),
            vec![
                "Detailed Distributors Report",
                "THE LONG GAME Screen 4",
                "01/02/2026",
                "12:00 1 ADULT 12.00 10 120.00 6.00 114.00",
                "12:00 2 CHILD 8.00 5 40.00 2.00 38.00",
            ],
        ]);
        let rows = extract(&d, "Vox", &VendorRules::default(), "2026-02-01 10:00:00").unwrap();
        let detail: Vec<_> = rows.iter().filter(|r| !r.is_summary).collect();
        assert_eq!(detail.len(), 2);
        assert_eq!(detail[0].movie_title, "THE LONG GAME");
        assert_eq!(detail[0].screen.as_deref(), Some("Screen 4"));
        assert_eq!(detail[0].show_date, "01/02/2026");
        assert_eq!(detail[0].show_time.as_deref(), Some("12:00"));
        assert_eq!(detail[0].ticket_class.as_deref(), Some("ADULT"));
        assert_eq!(detail[0].admits, 10.0);
        assert_eq!(detail[0].gross, 120.0);
        assert_eq!(detail[0].net, 114.0);
        assert_eq!(detail[1].ticket_class.as_deref(), Some("CHILD"));
    }

    #[test]
    fn zero_gross_reinterprets_admits_as_comps() {
        let d = doc(vec![
            summary_page(),
            vec![
                "THE LONG GAME Screen 4",
                "01/02/2026",
                "18:30 1 STAFF 0.00 7 0 1.00 2.00",
            ],
        ]);
        let rows = extract(&d, "Vox", &VendorRules::default(), "2026-02-01 10:00:00").unwrap();
        let row = rows.iter().find(|r| !r.is_summary).unwrap();
        assert_eq!(row.admits, 0.0);
        assert_eq!(row.comp, Some(7.0));
    }

    #[test]
    fn lone_time_emits_zero_row() {
        let d = doc(vec![
            summary_page(),
            vec!["THE LONG GAME Screen 4", "01/02/2026", "21:45"],
        ]);
        let rows = extract(&d, "Vox", &VendorRules::default(), "2026-02-01 10:00:00").unwrap();
        let row = rows.iter().find(|r| !r.is_summary).unwrap();
        assert_eq!(row.show_time.as_deref(), Some("21:45"));
        assert_eq!(row.admits, 0.0);
        assert_eq!(row.gross, 0.0);
    }

    #[test]
    fn weekly_flag_from_header_span() {
        let mut page = summary_page();
        page[1] = "Report for 01/02/2026 to 07/02/2026";
        let d = doc(vec![page]);
        let rows = extract(&d, "Vox", &VendorRules::default(), "2026-02-01 10:00:00").unwrap();
        assert!(rows.iter().all(|r| r.week_type == "weekly"));
    }
}
