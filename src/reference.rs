use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use calamine::{open_workbook_auto, Data, Reader};

/// One row of the `Cinemas Mapping` sheet. Read-only for the run.
#[derive(Debug, Clone)]
pub struct CinemaMappingEntry {
    /// Venue name as it appears in report headers, matched by substring.
    pub name_from_file: String,
    /// Exhibitor label, routes to an extractor variant.
    pub exhibitor: String,
    pub country: String,
    /// Canonical BOR cinema name.
    pub bor_cinema: String,
    /// Canonical BOR exhibitor name.
    pub bor_exhibitor: String,
    /// Date convention tag for this venue, see `normalize::dates`.
    pub date_format: String,
}

/// Reference tables loaded once per run from the destination workbook.
#[derive(Debug, Clone, Default)]
pub struct ReferenceTables {
    pub cinema_mapping: Vec<CinemaMappingEntry>,
    /// Canonical movie list in sheet order; order breaks fuzzy-match ties.
    pub movies: Vec<String>,
    /// PDF format string (uppercased) -> canonical BOR format.
    pub formats: HashMap<String, String>,
}

impl ReferenceTables {
    pub fn load(workbook_path: &Path) -> Result<ReferenceTables> {
        let mut wb = open_workbook_auto(workbook_path)
            .with_context(|| format!("open workbook {}", workbook_path.display()))?;

        let mapping_range = wb
            .worksheet_range("Cinemas Mapping")
            .context("sheet 'Cinemas Mapping' not found")?;
        let mut cinema_mapping = Vec::new();
        for row in mapping_range.rows().skip(1) {
            let name_from_file = cell_str(row, 0);
            if name_from_file.is_empty() {
                continue;
            }
            cinema_mapping.push(CinemaMappingEntry {
                name_from_file,
                exhibitor: cell_str(row, 1),
                country: cell_str(row, 2),
                bor_cinema: cell_str(row, 3),
                bor_exhibitor: cell_str(row, 4),
                date_format: cell_str(row, 5),
            });
        }

        let movies_range = wb
            .worksheet_range("Movies List")
            .context("sheet 'Movies List' not found")?;
        let movies: Vec<String> = movies_range
            .rows()
            .skip(1)
            .map(|r| cell_str(r, 0))
            .filter(|m| !m.is_empty())
            .collect();

        let formats_range = wb
            .worksheet_range("Formats Mapping")
            .context("sheet 'Formats Mapping' not found")?;
        let mut formats = HashMap::new();
        for row in formats_range.rows().skip(1) {
            let from = cell_str(row, 0).to_uppercase();
            let to = cell_str(row, 1);
            if !from.is_empty() && !to.is_empty() {
                formats.insert(from, to);
            }
        }

        Ok(ReferenceTables {
            cinema_mapping,
            movies,
            formats,
        })
    }
}

fn cell_str(row: &[Data], idx: usize) -> String {
    row.get(idx)
        .map(|c| match c {
            Data::Empty => String::new(),
            Data::String(s) => s.trim().to_string(),
            other => other.to_string().trim().to_string(),
        })
        .unwrap_or_default()
}

/// Static country-name -> short-code table used by the composite key.
/// Untranslated countries fall back to the original string.
pub fn country_code(country: &str) -> &str {
    match country.trim().to_uppercase().as_str() {
        "UAE" | "UNITED ARAB EMIRATES" => "AE",
        "KUWAIT" => "KW",
        "QATAR" => "QA",
        "BAHRAIN" => "BH",
        "OMAN" => "OM",
        "KSA" | "SAUDI ARABIA" => "SA",
        "LEBANON" => "LB",
        "EGYPT" => "EG",
        "JORDAN" => "JO",
        "IRAQ" => "IQ",
        _ => country,
    }
}
