//! Ozone daily spreadsheet extractor.
//!
//! The only spreadsheet-native vendor: one sheet per show with the cinema,
//! movie and date in fixed header cells, and a ticket table located by its
//! "Ticket Type" header cell. Eight columns follow from that anchor.

use anyhow::{anyhow, Result};
use chrono::NaiveDate;

use super::lines::clean_num;
use crate::document::Document;
use crate::rows::RawTicketRow;

const TABLE_WIDTH: usize = 8;

pub fn extract(doc: &Document, exhibitor: &str, extracted_at: &str) -> Result<Vec<RawTicketRow>> {
    let grid: &[Vec<String>] = doc
        .grid()
        .ok_or_else(|| anyhow!("expected a spreadsheet document"))?;
    let cinema = cell(grid, 6, 1).trim().to_string();
    let movie = cell(grid, 7, 1).trim().to_string();
    let show_date = normalize_date(cell(grid, 6, 4).trim());

    let (header_row, start_col) = find_header(grid)
        .ok_or_else(|| anyhow!("'Ticket Type' header not found in sheet"))?;

    let mut rows = Vec::new();
    for r in grid.iter().skip(header_row + 1) {
        let ticket = r.get(start_col).map(|s| s.trim()).unwrap_or_default();
        if ticket.is_empty() || ticket.to_uppercase().contains("TOTAL") {
            continue;
        }
        let col = |offset: usize| -> String {
            r.get(start_col + offset)
                .map(|s| s.trim().to_string())
                .unwrap_or_default()
        };
        let mut row = RawTicketRow::new(&doc.file_name(), exhibitor, &cinema, "", extracted_at);
        row.movie_title = movie.clone();
        row.show_date = show_date.clone();
        row.show_time = Some(col(4)).filter(|s| !s.is_empty());
        row.screen = Some(col(3)).filter(|s| !s.is_empty());
        row.format_code = "2D".to_string();
        row.ticket_class = Some(ticket.to_string());
        row.admits = clean_num(&col(5));
        row.gross = clean_num(&col(TABLE_WIDTH - 1));
        row.net = 0.0;
        rows.push(row);
    }

    Ok(rows)
}

fn cell(grid: &[Vec<String>], row: usize, col: usize) -> &str {
    grid.get(row).and_then(|r| r.get(col)).map(String::as_str).unwrap_or("")
}

fn find_header(grid: &[Vec<String>]) -> Option<(usize, usize)> {
    for (r, row) in grid.iter().enumerate() {
        for (c, v) in row.iter().enumerate() {
            if v.trim().eq_ignore_ascii_case("ticket type") {
                return Some((r, c));
            }
        }
    }
    None
}

/// Header date cells arrive either already formatted or as an ISO string.
fn normalize_date(value: &str) -> String {
    if NaiveDate::parse_from_str(value, "%d/%m/%Y").is_ok() {
        return value.to_string();
    }
    for fmt in ["%Y-%m-%d", "%Y-%m-%d %H:%M:%S", "%d-%m-%Y"] {
        if let Ok(d) = NaiveDate::parse_from_str(value, fmt) {
            return d.format("%d/%m/%Y").to_string();
        }
    }
    value.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::DocumentBody;

    fn doc() -> Document {
        let mut grid = vec![vec![String::new(); 6]; 6];
        grid.push(strs(&["", "Ozone Cinema", "", "", "16/09/2025", ""]));
        grid.push(strs(&["", "THE LONG GAME", "", "", "", ""]));
        grid.push(strs(&["Ticket Type", "Unit Price", "Seats", "Screen", "Show Time", "Admission", "VIP", "Gross"]));
        grid.push(strs(&["ADULT", "3.5", "120", "1", "19:00", "40", "0", "140"]));
        grid.push(strs(&["Grand Total", "", "", "", "", "40", "0", "140"]));
        Document {
            path: "ozone.xlsx".into(),
            body: DocumentBody::Grid(grid),
        }
    }

    fn strs(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn ticket_table_rows_extracted() {
        let rows = extract(&doc(), "Ozone", "2025-09-16 20:00:00").unwrap();
        assert_eq!(rows.len(), 1);
        let r = &rows[0];
        assert_eq!(r.cinema, "Ozone Cinema");
        assert_eq!(r.movie_title, "THE LONG GAME");
        assert_eq!(r.show_date, "16/09/2025");
        assert_eq!(r.show_time.as_deref(), Some("19:00"));
        assert_eq!(r.screen.as_deref(), Some("1"));
        assert_eq!(r.ticket_class.as_deref(), Some("ADULT"));
        assert_eq!(r.admits, 40.0);
        assert_eq!(r.gross, 140.0);
    }

    #[test]
    fn missing_header_is_an_error() {
        let d = Document {
            path: "ozone.xlsx".into(),
            body: DocumentBody::Grid(vec![vec!["x".to_string()]]),
        };
        assert!(extract(&d, "Ozone", "t").is_err());
    }

    #[test]
    fn iso_date_cell_reformatted() {
        assert_eq!(normalize_date("2025-09-16"), "16/09/2025");
        assert_eq!(normalize_date("16/09/2025"), "16/09/2025");
    }
}
