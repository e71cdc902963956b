//! Workbook loading for vitalgrid
//!
//! Decodes uploaded spreadsheet bytes into an in-memory grid of sheets. The
//! grid keeps only four cell kinds (empty, number, text, date); all
//! interpretation of the cells happens in the extraction engine.
//!
//! # Examples
//!
//! ## Building a sheet from data
//!
//! ```
//! use vitalgrid_sheet::{CellValue, Sheet};
//!
//! let sheet = Sheet::from_data(vec![
//!     vec![CellValue::from("Puls"), CellValue::from("Datum")],
//!     vec![CellValue::from(61), CellValue::from("2024-01-01")],
//! ]);
//!
//! assert_eq!(sheet.row_count(), 2);
//! assert_eq!(sheet.col_count(), 2);
//! ```
//!
//! ## Loading an upload
//!
//! ```
//! use vitalgrid_sheet::Book;
//!
//! let book = Book::from_bytes(b"Datum;Vikt\n2024-01-01;82,5", "vikt.csv").unwrap();
//! assert_eq!(book.sheet_names(), vec!["vikt"]);
//! ```

mod book;
mod cell;
mod csv;
mod error;
mod load;
mod sheet;
mod xlsx;

/// Re-export book type.
pub use book::Book;
/// Re-export cell value type.
pub use cell::CellValue;
/// Re-export CSV options.
pub use csv::{sniff_delimiter, CsvOptions};
/// Re-export sheet error types.
pub use error::{Result, SheetError};
/// Re-export upload format detection.
pub use load::{detect_format, UploadFormat};
/// Re-export sheet type.
pub use sheet::Sheet;
