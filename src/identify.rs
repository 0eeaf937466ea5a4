use crate::document::Document;
use crate::reference::CinemaMappingEntry;

/// Resolution of a document against the cinema mapping table.
#[derive(Debug, Clone)]
pub struct CinemaMatch<'a> {
    pub entry: &'a CinemaMappingEntry,
    /// The mapping name that matched, uppercased.
    pub matched_name: String,
}

/// One venue name collides with another site of the same chain; its reports
/// are told apart by the mall line printed directly underneath.
const AMBIGUOUS_HEADER: &str = "AL MARIAH MALL ABU DHABHI";

/// Find the first mapping entry whose name (uppercased) is a substring of the
/// document's opening text. Pure lookup, no side effects; `None` means the
/// caller must skip the document.
pub fn identify_cinema<'a>(
    doc: &Document,
    mapping: &'a [CinemaMappingEntry],
) -> Option<CinemaMatch<'a>> {
    let lines = doc.first_page_lines();
    let header = if doc.grid().is_some() {
        // Spreadsheet layouts bury the venue name several rows down, so the
        // whole sheet text is searched.
        lines
            .iter()
            .map(|l| l.trim().to_uppercase())
            .collect::<Vec<_>>()
            .join(" ")
    } else {
        let first_line = lines.first().map(|l| l.trim()).unwrap_or_default();
        let mut header = first_line.to_uppercase();
        if header == AMBIGUOUS_HEADER {
            if let Some(second) = lines.get(1) {
                header = format!("{} {}", header, second.trim().to_uppercase());
            }
        }
        header
    };

    mapping.iter().find_map(|entry| {
        let name = entry.name_from_file.to_uppercase();
        if !name.is_empty() && header.contains(&name) {
            Some(CinemaMatch {
                entry,
                matched_name: name,
            })
        } else {
            None
        }
    })
}
