//! Upload decoding: picks a reader from the container signature and the
//! uploaded file name.

use crate::book::Book;
use crate::csv::CsvOptions;
use crate::error::{Result, SheetError};
use crate::sheet::Sheet;

const ZIP_MAGIC: &[u8] = b"PK\x03\x04";
const OLE_MAGIC: &[u8] = &[0xD0, 0xCF, 0x11, 0xE0];
const DELIMITED_EXTENSIONS: [&str; 3] = ["csv", "tsv", "txt"];

/// How an upload will be decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadFormat {
    /// Zip (xlsx, xlsm, xlsb, ods) or OLE (xls) container
    Spreadsheet,
    /// Delimited text
    Delimited,
}

/// Detect the upload format from its leading bytes, falling back to the
/// file extension for plain text.
pub fn detect_format(bytes: &[u8], filename: &str) -> Result<UploadFormat> {
    if bytes.is_empty() {
        return Err(SheetError::EmptyInput {
            name: filename.to_string(),
        });
    }
    if bytes.starts_with(ZIP_MAGIC) || bytes.starts_with(OLE_MAGIC) {
        return Ok(UploadFormat::Spreadsheet);
    }

    let extension = filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    if DELIMITED_EXTENSIONS.contains(&extension.as_str()) {
        return Ok(UploadFormat::Delimited);
    }

    Err(SheetError::UnsupportedFormat {
        name: filename.to_string(),
    })
}

impl Book {
    /// Decode an uploaded file held in memory into a book of sheets.
    pub fn from_bytes(bytes: &[u8], filename: &str) -> Result<Self> {
        match detect_format(bytes, filename)? {
            UploadFormat::Spreadsheet => Self::from_spreadsheet_bytes(bytes),
            UploadFormat::Delimited => {
                let options = if filename.to_ascii_lowercase().ends_with(".tsv") {
                    CsvOptions::tsv()
                } else {
                    CsvOptions::default()
                };
                let sheet = Sheet::from_csv_bytes(bytes, options)?;

                let stem = filename
                    .rsplit(['/', '\\'])
                    .next()
                    .and_then(|base| base.rsplit_once('.').map(|(stem, _)| stem))
                    .filter(|stem| !stem.is_empty())
                    .unwrap_or("Sheet1");

                let mut book = Book::new();
                book.add_sheet(stem, sheet)?;
                Ok(book)
            }
        }
    }
}
