//! Field normalization: canonical movie names, date reformatting, format
//! codes and BOR cinema/exhibitor identities.

pub mod dates;
pub mod title;

use crate::reference::{country_code, CinemaMappingEntry, ReferenceTables};
use crate::rows::{NormalizedTicketRow, RawTicketRow};

/// Join delimiter of the composite key.
pub const KEY_DELIMITER: &str = "|";

/// Normalize one document's raw rows against the mapping entry that
/// identified its cinema. `screen_calc` starts at 1 and is refined by the
/// screen-count estimator afterwards.
pub fn normalize_rows(
    rows: Vec<RawTicketRow>,
    entry: &CinemaMappingEntry,
    tables: &ReferenceTables,
) -> Vec<NormalizedTicketRow> {
    rows.into_iter()
        .map(|mut raw| {
            raw.week_type = raw.week_type.trim().to_lowercase();

            let (mapped, _score) = title::resolve_title(&raw.movie_title, &tables.movies);

            // Summary rows keep their source date representation.
            if !raw.is_summary {
                raw.show_date = dates::normalize_date(&raw.show_date, &entry.date_format);
            }

            let format_upper = raw.format_code.trim().to_uppercase();
            raw.format_code = tables
                .formats
                .get(&format_upper)
                .cloned()
                .unwrap_or(format_upper);

            // Head-office reports carry several sites in one document; each
            // row's cinema picks its own mapping entry when one exists.
            let site = site_entry(&raw.cinema, tables).unwrap_or(entry);
            raw.cinema = canonical_or(&raw.cinema, &site.bor_cinema);
            raw.exhibitor = canonical_or(&raw.exhibitor, &site.bor_exhibitor);

            let composite_key = composite_key(
                &entry.country,
                &raw.cinema,
                &mapped,
                &raw.format_code,
                &raw.show_date,
            );
            NormalizedTicketRow {
                raw,
                movie_title_mapped: mapped,
                country: entry.country.clone(),
                screen_calc: 1,
                composite_key,
            }
        })
        .collect()
}

/// Mapping entry whose name matches the row's observed cinema, uppercased
/// and trimmed on both sides.
fn site_entry<'a>(observed: &str, tables: &'a ReferenceTables) -> Option<&'a CinemaMappingEntry> {
    let canon = observed.trim().to_uppercase();
    tables
        .cinema_mapping
        .iter()
        .find(|e| e.name_from_file.trim().to_uppercase() == canon)
}

/// BOR replacement when the mapping provides one, else the uppercased and
/// trimmed original.
fn canonical_or(observed: &str, bor: &str) -> String {
    if bor.trim().is_empty() {
        observed.trim().to_uppercase()
    } else {
        bor.trim().to_string()
    }
}

pub fn composite_key(country: &str, cinema: &str, movie: &str, format: &str, date: &str) -> String {
    [country_code(country), cinema, movie, format, date].join(KEY_DELIMITER)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn entry() -> CinemaMappingEntry {
        CinemaMappingEntry {
            name_from_file: "GALAXY CINEMA MALL".to_string(),
            exhibitor: "Galaxy".to_string(),
            country: "Kuwait".to_string(),
            bor_cinema: "Galaxy Mall".to_string(),
            bor_exhibitor: "Galaxy".to_string(),
            date_format: "DMY_DASH".to_string(),
        }
    }

    fn tables() -> ReferenceTables {
        let mut formats = HashMap::new();
        formats.insert("IMAX 3D".to_string(), "IMAX".to_string());
        ReferenceTables {
            cinema_mapping: vec![entry()],
            movies: vec!["The Great Escape".to_string()],
            formats,
        }
    }

    fn raw() -> RawTicketRow {
        let mut r = RawTicketRow::new("f.txt", "galaxy", "GALAXY CINEMA MALL", " Weekly ", "ts");
        r.movie_title = "GREAT ESCAPE [ARABIC]".to_string();
        r.show_date = "16-09-2025".to_string();
        r.format_code = "imax 3d".to_string();
        r
    }

    #[test]
    fn full_normalization_pass() {
        let rows = normalize_rows(vec![raw()], &entry(), &tables());
        let r = &rows[0];
        assert_eq!(r.raw.week_type, "weekly");
        assert_eq!(r.movie_title_mapped, "The Great Escape");
        assert_eq!(r.raw.show_date, "16/09/2025");
        assert_eq!(r.raw.format_code, "IMAX");
        assert_eq!(r.raw.cinema, "Galaxy Mall");
        assert_eq!(r.country, "Kuwait");
        assert_eq!(
            r.composite_key,
            "KW|Galaxy Mall|The Great Escape|IMAX|16/09/2025"
        );
    }

    #[test]
    fn multi_site_rows_keep_their_own_bor_cinema() {
        let head_office = CinemaMappingEntry {
            name_from_file: "Cinescape".to_string(),
            exhibitor: "KNCC".to_string(),
            country: "Kuwait".to_string(),
            bor_cinema: "Cinescape HQ".to_string(),
            bor_exhibitor: "KNCC".to_string(),
            date_format: String::new(),
        };
        let site = CinemaMappingEntry {
            name_from_file: "Cinescape Avenues".to_string(),
            exhibitor: "KNCC".to_string(),
            country: "Kuwait".to_string(),
            bor_cinema: "Avenues".to_string(),
            bor_exhibitor: "KNCC".to_string(),
            date_format: String::new(),
        };
        let tables = ReferenceTables {
            cinema_mapping: vec![head_office.clone(), site],
            movies: Vec::new(),
            formats: HashMap::new(),
        };

        let mut listed = RawTicketRow::new("f.txt", "KNCC", "Cinescape Avenues", "", "ts");
        listed.show_date = "16/09/2025".to_string();
        let mut unlisted = RawTicketRow::new("f.txt", "KNCC", "Cinescape Khiran", "", "ts");
        unlisted.show_date = "16/09/2025".to_string();

        let rows = normalize_rows(vec![listed, unlisted], &head_office, &tables);
        assert_eq!(rows[0].raw.cinema, "Avenues");
        // No mapping entry of its own: the document's entry applies.
        assert_eq!(rows[1].raw.cinema, "Cinescape HQ");
    }

    #[test]
    fn summary_rows_keep_their_date() {
        let mut r = raw();
        r.is_summary = true;
        r.show_date = "2025-09-16".to_string();
        let rows = normalize_rows(vec![r], &entry(), &tables());
        assert_eq!(rows[0].raw.show_date, "2025-09-16");
    }

    #[test]
    fn unknown_format_falls_back_to_uppercase() {
        let mut r = raw();
        r.format_code = " sphera ".to_string();
        let rows = normalize_rows(vec![r], &entry(), &tables());
        assert_eq!(rows[0].raw.format_code, "SPHERA");
    }
}
