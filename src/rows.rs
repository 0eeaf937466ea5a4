use serde::Serialize;

/// One row per (movie, show date, show time, screen, ticket class) observed
/// in a source document. Numeric fields are already cleaned: never negative,
/// unparseable tokens collapsed to 0.
#[derive(Debug, Clone, Serialize)]
pub struct RawTicketRow {
    pub source_file: String,
    pub exhibitor: String,
    pub cinema: String,
    /// "" for daily reports, "weekly" for reports spanning more than one day.
    pub week_type: String,
    /// `%Y-%m-%d %H:%M:%S`, stamped once per document.
    pub extracted_at: String,
    pub movie_title: String,
    /// Raw venue-specific date string; normalized later.
    pub show_date: String,
    pub show_time: Option<String>,
    pub screen: Option<String>,
    pub format_code: String,
    pub ticket_class: Option<String>,
    pub admits: f64,
    pub gross: f64,
    pub net: f64,
    pub comp: Option<f64>,
    /// True when the row is a pre-aggregated summary line, not one showtime.
    pub is_summary: bool,
    pub summary_sessions: Option<f64>,
}

impl RawTicketRow {
    pub fn new(source_file: &str, exhibitor: &str, cinema: &str, week_type: &str, extracted_at: &str) -> Self {
        RawTicketRow {
            source_file: source_file.to_string(),
            exhibitor: exhibitor.to_string(),
            cinema: cinema.to_string(),
            week_type: week_type.to_string(),
            extracted_at: extracted_at.to_string(),
            movie_title: String::new(),
            show_date: String::new(),
            show_time: None,
            screen: None,
            format_code: "2D".to_string(),
            ticket_class: None,
            admits: 0.0,
            gross: 0.0,
            net: 0.0,
            comp: None,
            is_summary: false,
            summary_sessions: None,
        }
    }
}

/// RawTicketRow after field normalization plus derived columns.
#[derive(Debug, Clone, Serialize)]
pub struct NormalizedTicketRow {
    #[serde(flatten)]
    pub raw: RawTicketRow,
    /// Canonical movie name, or the original title when no confident match.
    pub movie_title_mapped: String,
    pub country: String,
    /// Effective screen count for the row's engagement group, >= 1.
    pub screen_calc: u32,
    /// Pipe-joined (country code, cinema, mapped movie, format, date).
    pub composite_key: String,
}

/// Grouped sums for one (country, file, exhibitor, cinema, extracted-at,
/// movie, mapped movie, date, format) cell of one aggregate bucket.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateRow {
    pub country: String,
    pub source_file: String,
    pub exhibitor: String,
    pub cinema: String,
    pub extracted_at: String,
    pub movie_title: String,
    pub movie_title_mapped: String,
    pub show_date: String,
    pub format_code: String,
    pub admits: f64,
    pub gross: f64,
    pub net: f64,
    pub comp: f64,
    pub summary_sessions: f64,
    pub screen_calc: u32,
    pub session_count: usize,
    pub composite_key: String,
}

/// Fixed column order of the Raw Data sheet.
pub const RAW_SHEET_COLUMNS: &[&str] = &[
    "File", "Exhibitor", "Cinema", "Week Type", "Extraction Date", "Movie",
    "Mapped Movie", "Date", "Time", "Screen", "Format", "Ticket Type",
    "Admits", "Gross", "Net", "Comp", "Is Summary", "Summary Sessions",
    "Country",
];

/// Fixed column order of the four aggregate sheets.
pub const AGG_SHEET_COLUMNS: &[&str] = &[
    "Country", "File", "Exhibitor", "Cinema", "Extraction Date", "Movie",
    "Mapped Movie", "Date", "Format", "Admits", "Gross", "Net", "Comp",
    "Summary Sessions", "Screens", "Sessions", "Key",
];

impl NormalizedTicketRow {
    /// Cells for the Raw Data sheet, in `RAW_SHEET_COLUMNS` order.
    pub fn raw_sheet_cells(&self) -> Vec<String> {
        let r = &self.raw;
        vec![
            r.source_file.clone(),
            r.exhibitor.clone(),
            r.cinema.clone(),
            r.week_type.clone(),
            r.extracted_at.clone(),
            r.movie_title.clone(),
            self.movie_title_mapped.clone(),
            r.show_date.clone(),
            r.show_time.clone().unwrap_or_default(),
            r.screen.clone().unwrap_or_default(),
            r.format_code.clone(),
            r.ticket_class.clone().unwrap_or_default(),
            fmt_num(r.admits),
            fmt_num(r.gross),
            fmt_num(r.net),
            r.comp.map(fmt_num).unwrap_or_default(),
            if r.is_summary { "1".to_string() } else { "0".to_string() },
            r.summary_sessions.map(fmt_num).unwrap_or_default(),
            self.country.clone(),
        ]
    }
}

impl AggregateRow {
    /// Cells for an aggregate sheet, in `AGG_SHEET_COLUMNS` order.
    pub fn sheet_cells(&self) -> Vec<String> {
        vec![
            self.country.clone(),
            self.source_file.clone(),
            self.exhibitor.clone(),
            self.cinema.clone(),
            self.extracted_at.clone(),
            self.movie_title.clone(),
            self.movie_title_mapped.clone(),
            self.show_date.clone(),
            self.format_code.clone(),
            fmt_num(self.admits),
            fmt_num(self.gross),
            fmt_num(self.net),
            fmt_num(self.comp),
            fmt_num(self.summary_sessions),
            self.screen_calc.to_string(),
            self.session_count.to_string(),
            self.composite_key.clone(),
        ]
    }
}

/// Render a metric without a trailing ".0" when it is integral.
pub fn fmt_num(v: f64) -> String {
    if v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{}", v as i64)
    } else {
        format!("{}", v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fmt_num_integral() {
        assert_eq!(fmt_num(10.0), "10");
        assert_eq!(fmt_num(0.0), "0");
    }

    #[test]
    fn fmt_num_fractional() {
        assert_eq!(fmt_num(90.5), "90.5");
    }

    #[test]
    fn raw_cells_match_column_count() {
        let raw = RawTicketRow::new("a.txt", "Galaxy", "GALAXY MALL", "", "2026-01-01 00:00:00");
        let row = NormalizedTicketRow {
            raw,
            movie_title_mapped: String::new(),
            country: "UAE".to_string(),
            screen_calc: 1,
            composite_key: String::new(),
        };
        assert_eq!(row.raw_sheet_cells().len(), RAW_SHEET_COLUMNS.len());
    }
}
