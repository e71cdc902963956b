//! # vitalgrid-utils
//!
//! Parsing helpers shared by the workbook loader and the extraction engine:
//! label normalization, locale-tolerant numbers, and spreadsheet date/time
//! handling.
//!
//! Every parser returns `Option` so a malformed cell never aborts a sheet.

pub mod datetime;
pub mod number;
pub mod text;

pub use datetime::{
    excel_serial_to_datetime, excel_serial_to_time, format_local, parse_date_str, parse_time_str,
    ParsedDate,
};
pub use number::{parse_locale_number, parse_pressure_pair};
pub use text::normalize_label;

/// Convert column index to letter (0 -> A, 1 -> B, 25 -> Z, 26 -> AA, etc.)
pub fn column_index_to_letter(index: u32) -> String {
    let mut result = String::new();
    let mut n = index;

    loop {
        let remainder = n % 26;
        result.push((b'A' + remainder as u8) as char);
        n /= 26;

        if n == 0 {
            break;
        }
        n -= 1; // Adjust for 1-based indexing
    }

    result.chars().rev().collect()
}
