use crate::cell::CellValue;
use crate::error::Result;
use crate::sheet::Sheet;

const CANDIDATE_DELIMITERS: [u8; 3] = [b';', b'\t', b','];

/// CSV reader options
#[derive(Debug, Clone)]
pub struct CsvOptions {
    /// Field delimiter; `None` sniffs it from the first non-empty line
    pub delimiter: Option<u8>,
    /// Quote character (default: '"')
    pub quote: u8,
}

impl Default for CsvOptions {
    fn default() -> Self {
        CsvOptions {
            delimiter: None,
            quote: b'"',
        }
    }
}

impl CsvOptions {
    /// Create options for TSV (tab-separated values)
    #[must_use]
    pub fn tsv() -> Self {
        CsvOptions {
            delimiter: Some(b'\t'),
            ..Default::default()
        }
    }
}

/// Pick the delimiter that occurs most often on the first non-empty line.
///
/// Swedish exports use `;` because `,` is the decimal separator, so `;` wins
/// ties. Falls back to `,`.
#[must_use]
pub fn sniff_delimiter(text: &str) -> u8 {
    let Some(line) = text.lines().find(|l| !l.trim().is_empty()) else {
        return b',';
    };

    let mut best = (b',', 0usize);
    for candidate in CANDIDATE_DELIMITERS {
        let count = line.bytes().filter(|b| *b == candidate).count();
        if count > best.1 {
            best = (candidate, count);
        }
    }
    best.0
}

impl Sheet {
    /// Load a sheet from a CSV string with custom options
    pub fn from_csv_str_with_options(content: &str, options: CsvOptions) -> Result<Self> {
        let content = content.trim_start_matches('\u{feff}');
        let delimiter = options
            .delimiter
            .unwrap_or_else(|| sniff_delimiter(content));

        let mut csv_reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .quote(options.quote)
            .has_headers(false) // header detection happens downstream
            .flexible(true)
            .from_reader(content.as_bytes());

        let mut data: Vec<Vec<CellValue>> = Vec::new();

        for result in csv_reader.records() {
            let record = result?;
            data.push(record.iter().map(CellValue::parse).collect());
        }

        Ok(Sheet::from_rows("", data))
    }

    /// Load a sheet from raw CSV bytes (invalid UTF-8 is replaced)
    pub fn from_csv_bytes(bytes: &[u8], options: CsvOptions) -> Result<Self> {
        Self::from_csv_str_with_options(&String::from_utf8_lossy(bytes), options)
    }
}
