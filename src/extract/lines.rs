use std::sync::LazyLock;

use regex::Regex;

static TIME_HHMM_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d{1,2}:\d{2}").unwrap());
static TIME_ANY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\d{1,2}:\d{2}(?:\s?[APMapm]{2})?\b").unwrap());
static TIME_AMPM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b\d{1,2}:\d{2}\s?(?:am|pm)\b").unwrap());
static ISO_DATE_TIME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\d{4}[-/]\d{2}[-/]\d{2}\b").unwrap());

/// Classification of one report line. Vendors apply their own ordered rules
/// to produce these; the row builders consume them uniformly.
#[derive(Debug, Clone, PartialEq)]
pub enum LineKind {
    /// Header, footer, page furniture, totals: discarded.
    Noise,
    /// Starts a new movie block; dependent rolling state is reset. Some
    /// layouts print the screen on the same heading line.
    MovieHeader { title: String, screen: Option<String> },
    ScreenMarker(String),
    DateMarker(String),
    TimeMarker(String),
    /// Trailing tokens are numeric; carries the whitespace-split tokens.
    DataRow(Vec<String>),
    /// Neither structural nor numeric: a continuation of the current title.
    Continuation,
}

/// Rolling state carried across lines within one document. One transition
/// per classified line; data rows copy the current values as context.
#[derive(Debug, Clone, Default)]
pub struct RowContext {
    pub movie: String,
    pub screen: Option<String>,
    pub date: String,
    pub time: Option<String>,
    pub format: String,
    pub ticket_class: Option<String>,
}

impl RowContext {
    pub fn with_format(format: &str) -> Self {
        RowContext {
            format: format.to_string(),
            ..Default::default()
        }
    }

    /// Entering a new movie block invalidates per-block state.
    pub fn start_movie(&mut self, title: String, default_format: &str) {
        self.movie = title;
        self.ticket_class = None;
        self.format = default_format.to_string();
    }
}

/// Strip thousands separators and coerce to f64, defaulting to 0 on any
/// non-numeric input. Never returns a negative value.
pub fn clean_num(token: &str) -> f64 {
    let cleaned = token.replace(',', "");
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        return 0.0;
    }
    cleaned.parse::<f64>().unwrap_or(0.0).max(0.0)
}

/// Variant for venues that print a decimal comma ("12,500" meaning 12.5).
pub fn clean_num_decimal_comma(token: &str) -> f64 {
    let cleaned = token.trim().replace(',', ".");
    if cleaned.is_empty() {
        return 0.0;
    }
    cleaned.parse::<f64>().unwrap_or(0.0).max(0.0)
}

/// A token counts as numeric when, commas removed, it is digits with at most
/// one decimal point.
pub fn is_numeric_token(token: &str) -> bool {
    let s = token.replace(',', "");
    let s = s.trim();
    if s.is_empty() {
        return false;
    }
    s.replacen('.', "", 1).chars().all(|c| c.is_ascii_digit())
}

/// True when the last `n` tokens are all numeric.
pub fn tail_is_numeric(tokens: &[String], n: usize) -> bool {
    if tokens.len() < n {
        return false;
    }
    tokens[tokens.len() - n..].iter().all(|t| is_numeric_token(t))
}

/// Line starts with an HH:MM token.
pub fn starts_with_time(line: &str) -> bool {
    TIME_HHMM_RE.is_match(line.trim())
}

/// Line contains any HH:MM time, with or without an am/pm suffix.
pub fn contains_time(line: &str) -> bool {
    TIME_ANY_RE.is_match(line)
}

/// First `h:mm am/pm` match, uppercased with internal spaces removed.
pub fn find_time_ampm(line: &str) -> Option<String> {
    TIME_AMPM_RE
        .find(line)
        .map(|m| m.as_str().replace(' ', "").to_uppercase())
}

/// Header/footer lines carrying both an ISO-style date and a time are report
/// furniture (print timestamps), not data.
pub fn has_iso_date_and_time(line: &str) -> bool {
    ISO_DATE_TIME_RE.is_match(line) && TIME_ANY_RE.is_match(line)
}

pub fn tokens(line: &str) -> Vec<String> {
    line.replace('\t', " ")
        .split(' ')
        .filter(|p| !p.is_empty())
        .map(|p| p.to_string())
        .collect()
}
