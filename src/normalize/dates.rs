//! Per-venue date reformatting.
//!
//! Each mapping entry carries a convention tag; the tag selects an ordered
//! list of candidate formats and the first successful parse is reformatted
//! to day/month/year. Anything unparseable passes through untouched.

use chrono::NaiveDate;

/// Output format of every normalized date.
pub const OUTPUT_FORMAT: &str = "%d/%m/%Y";

/// Candidate formats for a convention tag, tried in order. Day-first wins
/// over month-first when both parse, so the DMY list leads with the slash
/// and dash day-first patterns.
pub fn candidate_formats(tag: &str) -> &'static [&'static str] {
    match tag.trim().to_uppercase().as_str() {
        "MDY" => &["%m/%d/%Y", "%m-%d-%Y", "%m/%d/%y"],
        "YMD" => &["%Y-%m-%d", "%Y/%m/%d"],
        "DMY_DASH" => &["%d-%m-%Y", "%d/%m/%Y", "%d-%b-%y", "%d-%m-%y"],
        // Default venue convention: day first, slash separated.
        _ => &[
            "%d/%m/%Y",
            "%d-%m-%Y",
            "%Y-%m-%d",
            "%d/%m/%y",
            "%d-%b-%y",
            "%d %B %Y",
        ],
    }
}

/// Reformat one raw date string using the venue's convention tag.
pub fn normalize_date(raw: &str, tag: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return raw.to_string();
    }
    for fmt in candidate_formats(tag) {
        if let Ok(d) = NaiveDate::parse_from_str(trimmed, fmt) {
            return d.format(OUTPUT_FORMAT).to_string();
        }
    }
    raw.to_string()
}
