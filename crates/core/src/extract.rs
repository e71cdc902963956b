//! The extraction pipeline: workbook in, result document out.

use crate::aggregate::MetricAggregator;
use crate::classify::classify_columns;
use crate::error::{ExtractError, Result};
use crate::header::detect_header;
use crate::labels::RawLabelCollector;
use crate::options::ExtractOptions;
use crate::result::{ExtractionResult, HeartData, SheetSummary};
use crate::rows::RowExtractor;
use chrono::{DateTime, Utc};
use std::panic::{catch_unwind, AssertUnwindSafe};
use vitalgrid_sheet::{Book, Sheet};

/// Metadata supplied with an upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadMeta {
    pub name: String,
    pub uploaded_at: DateTime<Utc>,
}

impl UploadMeta {
    pub fn new(name: impl Into<String>, uploaded_at: DateTime<Utc>) -> Self {
        Self {
            name: name.into(),
            uploaded_at,
        }
    }
}

/// Extract metrics from an uploaded file.
///
/// Never fails: decode errors and panics produce a fallback result with
/// `error` set.
pub fn extract(bytes: &[u8], meta: &UploadMeta, options: &ExtractOptions) -> ExtractionResult {
    extract_at(bytes, meta, options, Utc::now())
}

/// Like [`extract`], with an explicit processing instant. Rows that carry a
/// time but no date are dated on `parsed_at`'s day.
pub fn extract_at(
    bytes: &[u8],
    meta: &UploadMeta,
    options: &ExtractOptions,
    parsed_at: DateTime<Utc>,
) -> ExtractionResult {
    let outcome = catch_unwind(AssertUnwindSafe(|| {
        try_extract(bytes, meta, options, parsed_at)
    }))
    .unwrap_or_else(|payload| Err(ExtractError::from_panic(payload.as_ref())));

    outcome.unwrap_or_else(|e| fallback(meta, parsed_at, &e))
}

pub(crate) fn fallback(
    meta: &UploadMeta,
    parsed_at: DateTime<Utc>,
    error: &ExtractError,
) -> ExtractionResult {
    tracing::warn!("extraction of '{}' failed: {}", meta.name, error);
    ExtractionResult::fallback(&meta.name, meta.uploaded_at, parsed_at, error.to_string())
}

fn try_extract(
    bytes: &[u8],
    meta: &UploadMeta,
    options: &ExtractOptions,
    parsed_at: DateTime<Utc>,
) -> Result<ExtractionResult> {
    let book = Book::from_bytes(bytes, &meta.name)?;
    Ok(extract_book(&book, meta, options, parsed_at))
}

/// Run the pipeline over an already loaded book.
pub fn extract_book(
    book: &Book,
    meta: &UploadMeta,
    options: &ExtractOptions,
    parsed_at: DateTime<Utc>,
) -> ExtractionResult {
    let today = parsed_at.date_naive();
    let mut aggregator = MetricAggregator::new();
    let mut labels = RawLabelCollector::new();

    let sheet_summaries: Vec<SheetSummary> = book
        .sheets()
        .map(|(name, sheet)| {
            process_sheet(name, sheet, options, today, &mut aggregator, &mut labels)
        })
        .collect();

    tracing::info!(
        "extracted '{}': {} sheets, {} rows",
        meta.name,
        sheet_summaries.len(),
        aggregator.rows_recorded()
    );

    let metrics = aggregator.finish();
    let heart_data = HeartData::from_metrics(&metrics);
    let (raw_data, dynamic_data) = labels.into_parts(options.raw_label_cap);

    ExtractionResult {
        filename: meta.name.clone(),
        uploaded_at: meta.uploaded_at,
        parsed_at,
        sheet_names: book.sheet_names().into_iter().map(String::from).collect(),
        sheet_summaries,
        metrics,
        raw_data,
        dynamic_data,
        heart_data,
        error: None,
    }
}

fn process_sheet(
    name: &str,
    sheet: &Sheet,
    options: &ExtractOptions,
    today: chrono::NaiveDate,
    aggregator: &mut MetricAggregator,
    labels: &mut RawLabelCollector,
) -> SheetSummary {
    let Some(header) = detect_header(sheet, options.header_scan_rows) else {
        tracing::debug!("sheet '{}': no header found", name);
        return SheetSummary {
            sheet_name: name.to_string(),
            header_row_index: None,
            header_row: Vec::new(),
            row_count: 0,
        };
    };

    let columns = classify_columns(sheet, &header, options.sample_rows);
    labels.record_headers(&columns);
    let extractor = RowExtractor::new(&columns, today);

    let mut row_count = 0;
    for row in sheet.rows().skip(header.index + 1) {
        if row.iter().all(|cell| cell.is_empty()) {
            continue;
        }
        row_count += 1;
        aggregator.record_row(&extractor.read(row), name);
        labels.record_row(&columns, row);
    }

    tracing::debug!(
        "sheet '{}': header at row {}, {} matched columns, {} data rows",
        name,
        header.index,
        columns.iter().filter(|c| c.parameter.is_some()).count(),
        row_count
    );

    SheetSummary {
        sheet_name: name.to_string(),
        header_row_index: Some(header.index),
        header_row: header.labels,
        row_count,
    }
}
