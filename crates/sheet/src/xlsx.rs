//! Spreadsheet containers (xlsx, xlsm, xlsb, xls, ods) via calamine.

use crate::book::Book;
use crate::cell::CellValue;
use crate::error::{Result, SheetError};
use crate::sheet::Sheet;
use calamine::{open_workbook_auto_from_rs, Data, Reader};
use std::io::Cursor;
use vitalgrid_utils::{excel_serial_to_datetime, parse_date_str};

/// Convert calamine Data to CellValue
fn data_to_cell_value(data: &Data) -> CellValue {
    match data {
        Data::Empty | Data::Error(_) => CellValue::Empty,
        Data::Bool(b) => CellValue::String(if *b { "TRUE" } else { "FALSE" }.to_string()),
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Float(f) => CellValue::Number(*f),
        Data::String(s) => CellValue::String(s.clone()),
        Data::DateTime(dt) => {
            // Durations stay as day fractions; the engine reads them as times
            if dt.is_duration() {
                CellValue::Number(dt.as_f64())
            } else {
                excel_serial_to_datetime(dt.as_f64())
                    .map_or(CellValue::Number(dt.as_f64()), CellValue::Date)
            }
        }
        Data::DateTimeIso(s) => parse_date_str(s)
            .map_or_else(|| CellValue::String(s.clone()), |p| CellValue::Date(p.to_datetime())),
        Data::DurationIso(s) => CellValue::String(s.clone()),
    }
}

impl Book {
    /// Load every sheet of a spreadsheet container held in memory.
    ///
    /// A container that cannot be opened is an error; a single sheet that
    /// fails to decode is logged and loaded empty so the remaining sheets
    /// still contribute.
    pub fn from_spreadsheet_bytes(bytes: &[u8]) -> Result<Self> {
        let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))
            .map_err(|e| SheetError::Workbook(e.to_string()))?;

        let sheet_names = workbook.sheet_names().to_vec();
        let mut book = Book::new();

        for sheet_name in sheet_names {
            let sheet = match workbook.worksheet_range(&sheet_name) {
                Ok(range) => {
                    let rows = range
                        .rows()
                        .map(|row| row.iter().map(data_to_cell_value).collect())
                        .collect();
                    let mut sheet = Sheet::from_rows(&sheet_name, rows);

                    // calamine ranges start at the first used cell
                    if let Some((row, col)) = range.start() {
                        sheet.pad_origin(row as usize, col as usize);
                    }
                    sheet
                }
                Err(e) => {
                    tracing::warn!("failed to read sheet '{}': {}", sheet_name, e);
                    Sheet::from_rows(&sheet_name, Vec::new())
                }
            };

            book.add_sheet(&sheet_name, sheet)?;
        }

        Ok(book)
    }
}
