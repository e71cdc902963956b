//! Header row detection by cell density.

use vitalgrid_sheet::{CellValue, Sheet};

/// The row chosen as a sheet's header, with one label per column.
#[derive(Debug, Clone, PartialEq)]
pub struct HeaderRow {
    /// 0-based row index within the sheet
    pub index: usize,
    /// Trimmed header labels; blank cells become `Column N`
    pub labels: Vec<String>,
}

/// Text cells count double: header rows are mostly labels.
fn row_score(row: &[CellValue]) -> usize {
    row.iter()
        .map(|cell| {
            if cell.is_text() {
                2
            } else if cell.is_empty() {
                0
            } else {
                1
            }
        })
        .sum()
}

fn header_label(cell: &CellValue, col: usize) -> String {
    let text = cell.to_string();
    let text = text.trim();
    if text.is_empty() {
        format!("Column {}", col + 1)
    } else {
        text.to_string()
    }
}

/// Pick the highest-scoring row among the first `scan_rows` rows; the first
/// such row wins ties. Returns `None` when every scanned row is empty.
pub fn detect_header(sheet: &Sheet, scan_rows: usize) -> Option<HeaderRow> {
    let mut best: Option<(usize, usize)> = None;
    for (index, row) in sheet.rows().take(scan_rows).enumerate() {
        let score = row_score(row);
        if score > best.map_or(0, |(_, s)| s) {
            best = Some((index, score));
        }
    }

    let (index, _) = best?;
    let row = sheet.row(index)?;
    let labels = row
        .iter()
        .enumerate()
        .map(|(col, cell)| header_label(cell, col))
        .collect();

    Some(HeaderRow { index, labels })
}
