//! Destination workbook access: find the end of a sheet and append rows
//! after it without touching existing cells.

use std::path::Path;

use anyhow::{Context, Result};
use calamine::{open_workbook_auto, Data, Reader};
use edit_xlsx::Write as XlsxWrite;
use tracing::debug;

/// Column index to cell-reference letters (0 -> A, 26 -> AA).
fn col_letter(index: usize) -> String {
    let mut n = index;
    let mut s = String::new();
    loop {
        s.insert(0, (b'A' + (n % 26) as u8) as char);
        if n < 26 {
            break;
        }
        n = n / 26 - 1;
    }
    s
}

/// Last 1-based row of the sheet with any non-empty cell, scanning from the
/// top so embedded blank rows do not truncate the result. 0 for an empty or
/// missing sheet.
pub fn find_last_data_row(path: &Path, sheet_name: &str) -> Result<usize> {
    let mut wb = open_workbook_auto(path)
        .with_context(|| format!("open workbook {}", path.display()))?;
    let range = match wb.worksheet_range(sheet_name) {
        Ok(r) => r,
        Err(_) => return Ok(0),
    };
    let offset = range.start().map(|(r, _)| r as usize).unwrap_or(0);
    let mut last = 0usize;
    for (idx, row) in range.rows().enumerate() {
        if row.iter().any(|c| !matches!(c, Data::Empty)) {
            last = offset + idx + 1;
        }
    }
    Ok(last)
}

/// Append `rows` to `sheet_name` starting right after the last populated
/// row. A zero-row table is a no-op; existing cells are never rewritten.
pub fn append_rows(path: &Path, sheet_name: &str, rows: &[Vec<String>]) -> Result<()> {
    if rows.is_empty() {
        return Ok(());
    }

    let start_row = find_last_data_row(path, sheet_name)? + 1;

    let mut wb = edit_xlsx::Workbook::from_path(path)
        .map_err(|e| anyhow::anyhow!("open workbook {}: {e}", path.display()))?;
    let ws = wb
        .get_worksheet_mut_by_name(sheet_name)
        .map_err(|e| anyhow::anyhow!("sheet {sheet_name:?}: {e}"))?;

    for (r, row) in rows.iter().enumerate() {
        for (c, value) in row.iter().enumerate() {
            if value.is_empty() {
                continue;
            }
            let cell_ref = format!("{}{}", col_letter(c), start_row + r);
            ws.write_string(&cell_ref, value.clone())
                .map_err(|e| anyhow::anyhow!("write {cell_ref}: {e}"))?;
        }
    }

    wb.save_as(path)
        .map_err(|e| anyhow::anyhow!("save workbook {}: {e}", path.display()))?;
    debug!(sheet = sheet_name, rows = rows.len(), start_row, "appended");
    Ok(())
}
