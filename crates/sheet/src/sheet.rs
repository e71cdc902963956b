use crate::cell::CellValue;

static EMPTY: CellValue = CellValue::Empty;

/// One named grid of cells, stored row-major.
///
/// Rows may have different lengths: delimited uploads are often ragged, so
/// reads past the end of a row see an empty cell.
#[derive(Debug, Clone, Default)]
pub struct Sheet {
    name: String,
    rows: Vec<Vec<CellValue>>,
}

impl Sheet {
    /// Create an empty, unnamed sheet
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a named sheet from decoded rows
    #[must_use]
    pub fn from_rows(name: &str, rows: Vec<Vec<CellValue>>) -> Self {
        Sheet {
            name: name.to_string(),
            rows,
        }
    }

    /// Build an unnamed sheet from anything convertible into cells
    #[must_use]
    pub fn from_data<T: Into<CellValue>>(data: Vec<Vec<T>>) -> Self {
        let rows = data
            .into_iter()
            .map(|row| row.into_iter().map(Into::into).collect())
            .collect();
        Self::from_rows("", rows)
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn set_name(&mut self, name: &str) {
        self.name = name.to_string();
    }

    #[must_use]
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Width of the widest row
    #[must_use]
    pub fn col_count(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Cell at a 0-based position; missing cells read as empty
    #[must_use]
    pub fn cell(&self, row: usize, col: usize) -> &CellValue {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .unwrap_or(&EMPTY)
    }

    /// Row at a 0-based index
    #[must_use]
    pub fn row(&self, index: usize) -> Option<&[CellValue]> {
        self.rows.get(index).map(Vec::as_slice)
    }

    pub fn rows(&self) -> impl Iterator<Item = &[CellValue]> {
        self.rows.iter().map(Vec::as_slice)
    }

    /// Shift the grid down and right by inserting empty rows and columns, so
    /// cell coordinates match a range that did not start at A1.
    pub fn pad_origin(&mut self, rows: usize, cols: usize) {
        if cols > 0 {
            for row in &mut self.rows {
                row.splice(0..0, std::iter::repeat(CellValue::Empty).take(cols));
            }
        }
        if rows > 0 {
            self.rows.splice(0..0, std::iter::repeat(Vec::new()).take(rows));
        }
    }
}
