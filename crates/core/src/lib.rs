//! # vitalgrid-core
//!
//! Extraction of physiological measurements from schema-free spreadsheets.
//!
//! The pipeline runs per sheet:
//! - [`header::detect_header`] picks the densest row near the top
//! - [`classify::classify_columns`] assigns roles and parameters
//! - [`rows::RowExtractor`] reads a timestamp and typed values per row
//! - [`aggregate::MetricAggregator`] folds rows into latest values and trends
//!
//! and finishes with one [`ExtractionResult`] per upload.
//!
//! ```no_run
//! use chrono::Utc;
//! use vitalgrid_core::{extract, ExtractOptions, UploadMeta};
//!
//! let bytes = std::fs::read("halsodata.xlsx").unwrap();
//! let meta = UploadMeta::new("halsodata.xlsx", Utc::now());
//! let result = extract(&bytes, &meta, &ExtractOptions::default());
//! println!("{}", serde_json::to_string_pretty(&result).unwrap());
//! ```

pub mod aggregate;
pub mod classify;
pub mod error;
pub mod extract;
pub mod header;
pub mod labels;
pub mod options;
pub mod registry;
pub mod result;
pub mod rows;
mod worker;

pub use aggregate::{Metrics, Sample, SampleValue};
pub use error::{ExtractError, Result};
pub use extract::{extract, extract_at, extract_book, UploadMeta};
pub use options::ExtractOptions;
pub use result::{ExtractionResult, HeartData, HeartRatePoint, SheetSummary};
pub use worker::extract_in_worker;
