//! Tunables for an extraction run.

use serde::{Deserialize, Serialize};

/// Options for an extraction run.
///
/// Deserializes with per-field defaults, so a config file only needs the
/// values it overrides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractOptions {
    /// Rows scanned from the top of each sheet when looking for the header
    pub header_scan_rows: usize,
    /// Non-empty cells sampled when a header says nothing about its column
    pub sample_rows: usize,
    /// Maximum number of labels emitted in `rawData`
    pub raw_label_cap: usize,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        ExtractOptions {
            header_scan_rows: 20,
            sample_rows: 9,
            raw_label_cap: 50,
        }
    }
}

impl ExtractOptions {
    /// Set how many rows are scanned for the header
    #[must_use]
    pub fn with_header_scan_rows(mut self, rows: usize) -> Self {
        self.header_scan_rows = rows;
        self
    }

    /// Set how many cells are sampled for content-based classification
    #[must_use]
    pub fn with_sample_rows(mut self, rows: usize) -> Self {
        self.sample_rows = rows;
        self
    }

    /// Set the `rawData` label cap
    #[must_use]
    pub fn with_raw_label_cap(mut self, cap: usize) -> Self {
        self.raw_label_cap = cap;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = ExtractOptions::default();
        assert_eq!(options.header_scan_rows, 20);
        assert_eq!(options.sample_rows, 9);
        assert_eq!(options.raw_label_cap, 50);
    }

    #[test]
    fn test_partial_config_keeps_defaults() {
        let options: ExtractOptions = serde_yaml::from_str("raw_label_cap: 10\n").unwrap();
        assert_eq!(options, ExtractOptions::default().with_raw_label_cap(10));
    }

    #[test]
    fn test_builders() {
        let options = ExtractOptions::default()
            .with_header_scan_rows(5)
            .with_sample_rows(3);
        assert_eq!(options.header_scan_rows, 5);
        assert_eq!(options.sample_rows, 3);
    }
}
