use std::fs;
use std::path::{Path, PathBuf};

use calamine::{open_workbook_auto, Reader};

use crate::pipeline::SkipReason;

/// A source report, already reduced to text by the upstream extractor.
///
/// PDF reports arrive as page-oriented text (pages separated by form-feed,
/// one line per printed line); spreadsheet-native vendor reports arrive as a
/// cell grid read from the first worksheet.
#[derive(Debug, Clone)]
pub struct Document {
    pub path: PathBuf,
    pub body: DocumentBody,
}

#[derive(Debug, Clone)]
pub enum DocumentBody {
    /// One Vec<String> of lines per page, in page order.
    Pages(Vec<Vec<String>>),
    /// Row-major cell grid for fixed-position spreadsheet layouts.
    Grid(Vec<Vec<String>>),
}

impl Document {
    pub fn load(path: &Path) -> Result<Document, SkipReason> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();
        let body = match ext.as_str() {
            "xlsx" | "xls" | "xlsm" => DocumentBody::Grid(load_grid(path)?),
            _ => DocumentBody::Pages(load_pages(path)?),
        };
        let doc = Document {
            path: path.to_path_buf(),
            body,
        };
        if doc.first_page_lines().iter().all(|l| l.trim().is_empty()) {
            return Err(SkipReason::Unreadable("first page yields no text".into()));
        }
        Ok(doc)
    }

    /// File name only, the way rows record their source.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }

    /// Lines of the first page (or the cells of the first grid column-joined
    /// rows), used by the cinema identifier.
    pub fn first_page_lines(&self) -> Vec<String> {
        match &self.body {
            DocumentBody::Pages(pages) => pages.first().cloned().unwrap_or_default(),
            DocumentBody::Grid(rows) => rows
                .iter()
                .map(|r| r.join(" ").trim().to_string())
                .collect(),
        }
    }

    pub fn pages(&self) -> &[Vec<String>] {
        match &self.body {
            DocumentBody::Pages(pages) => pages,
            DocumentBody::Grid(_) => &[],
        }
    }

    pub fn grid(&self) -> Option<&Vec<Vec<String>>> {
        match &self.body {
            DocumentBody::Grid(rows) => Some(rows),
            DocumentBody::Pages(_) => None,
        }
    }
}

fn load_pages(path: &Path) -> Result<Vec<Vec<String>>, SkipReason> {
    let text = fs::read_to_string(path)
        .map_err(|e| SkipReason::Unreadable(format!("{}: {}", path.display(), e)))?;
    let pages: Vec<Vec<String>> = text
        .split('\u{c}')
        .map(|page| page.lines().map(|l| l.to_string()).collect())
        .collect();
    if pages.is_empty() {
        return Err(SkipReason::Unreadable("no pages".into()));
    }
    Ok(pages)
}

fn load_grid(path: &Path) -> Result<Vec<Vec<String>>, SkipReason> {
    let mut workbook = open_workbook_auto(path)
        .map_err(|e| SkipReason::Unreadable(format!("{}: {}", path.display(), e)))?;
    let sheet = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| SkipReason::Unreadable("workbook has no sheets".into()))?;
    let range = workbook
        .worksheet_range(&sheet)
        .map_err(|e| SkipReason::Unreadable(format!("{}: {}", path.display(), e)))?;
    // The used range starts at the first populated cell; pad it back out so
    // fixed-position layouts keep their absolute coordinates.
    let (row_off, col_off) = range
        .start()
        .map(|(r, c)| (r as usize, c as usize))
        .unwrap_or((0, 0));
    let mut rows: Vec<Vec<String>> = vec![Vec::new(); row_off];
    for r in range.rows() {
        let mut cells = vec![String::new(); col_off];
        cells.extend(r.iter().map(cell_to_string));
        rows.push(cells);
    }
    Ok(rows)
}

fn cell_to_string(cell: &calamine::Data) -> String {
    use calamine::Data;
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.trim().to_string(),
        Data::Float(f) => crate::rows::fmt_num(*f),
        Data::Int(i) => i.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => dt
            .as_datetime()
            .map(|d| d.format("%d/%m/%Y").to_string())
            .unwrap_or_else(|| dt.to_string()),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn form_feed_splits_pages() {
        let dir = std::env::temp_dir();
        let path = dir.join("bor_doc_pages_test.txt");
        fs::write(&path, "CinemaX\nline two\u{c}page two line").unwrap();
        let doc = Document::load(&path).unwrap();
        assert_eq!(doc.pages().len(), 2);
        assert_eq!(doc.first_page_lines()[0], "CinemaX");
        fs::remove_file(&path).ok();
    }

    #[test]
    fn blank_first_page_is_unreadable() {
        let dir = std::env::temp_dir();
        let path = dir.join("bor_doc_blank_test.txt");
        fs::write(&path, "\n  \n\u{c}content later").unwrap();
        assert!(Document::load(&path).is_err());
        fs::remove_file(&path).ok();
    }
}
