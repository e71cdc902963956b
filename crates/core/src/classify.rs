//! Column role and parameter assignment.
//!
//! A column is classified once per sheet from its header label. Columns whose
//! label says nothing are classified from a small sample of their cells.

use crate::header::HeaderRow;
use crate::registry::{self, ParameterDefinition};
use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;
use vitalgrid_sheet::{CellValue, Sheet};
use vitalgrid_utils::{
    column_index_to_letter, normalize_label, parse_date_str, parse_pressure_pair, parse_time_str,
};

const DATETIME_KEYWORDS: &[&str] = &[
    "datum och tid",
    "datum/tid",
    "datum & tid",
    "datetime",
    "date time",
    "date/time",
    "timestamp",
    "tidpunkt",
    "tidsstampel",
];
const DATE_KEYWORDS: &[&str] = &["datum", "date", "dag", "day"];
const TIME_KEYWORDS: &[&str] = &["klockslag", "time", "tid"];

/// Confidence given to parameters inferred from cell content alone.
const SAMPLED_CONFIDENCE: f64 = 0.5;

/// What a column holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ColumnRole {
    Date,
    Time,
    DateTime,
    Value,
}

/// The parameter a column was matched to.
#[derive(Debug, Clone, Copy)]
pub struct ParameterMatch {
    pub parameter: &'static ParameterDefinition,
    /// 1.0 when the whole label is the keyword; lower for partial or sampled matches
    pub confidence: f64,
}

/// One classified column of a sheet.
#[derive(Debug, Clone)]
pub struct ColumnDescriptor {
    pub index: usize,
    pub header: String,
    pub normalized: String,
    pub role: ColumnRole,
    pub parameter: Option<ParameterMatch>,
}

impl ColumnDescriptor {
    /// Key of the matched parameter, if any
    #[must_use]
    pub fn parameter_key(&self) -> Option<&'static str> {
        self.parameter.map(|m| m.parameter.key)
    }
}

/// Spreadsheets store bare times as dates on the serial epoch.
pub(crate) fn is_time_only(dt: NaiveDateTime) -> bool {
    NaiveDate::from_ymd_opt(1899, 12, 30).is_some_and(|epoch| dt.date() == epoch)
}

fn role_from_keywords(normalized: &str) -> ColumnRole {
    let contains_any = |keywords: &[&str]| keywords.iter().any(|k| normalized.contains(k));

    if contains_any(DATETIME_KEYWORDS) {
        ColumnRole::DateTime
    } else if contains_any(DATE_KEYWORDS) {
        ColumnRole::Date
    } else if contains_any(TIME_KEYWORDS) {
        ColumnRole::Time
    } else {
        ColumnRole::Value
    }
}

fn sample_column(sheet: &Sheet, header_index: usize, col: usize, limit: usize) -> Vec<&CellValue> {
    sheet
        .rows()
        .skip(header_index + 1)
        .filter_map(|row| row.get(col))
        .filter(|cell| !cell.is_empty())
        .take(limit)
        .collect()
}

fn infer_from_samples(samples: &[&CellValue]) -> (ColumnRole, Option<ParameterMatch>) {
    let mut saw_date = false;
    let mut saw_datetime = false;
    let mut saw_time = false;
    let mut saw_pressure = false;

    for cell in samples {
        match cell {
            CellValue::Date(dt) if is_time_only(*dt) => saw_time = true,
            CellValue::Date(dt) => {
                saw_date = true;
                saw_datetime |= dt.time() != chrono::NaiveTime::MIN;
            }
            CellValue::String(text) => {
                if let Some(parsed) = parse_date_str(text) {
                    saw_date = true;
                    saw_datetime |= parsed.time.is_some();
                } else if parse_time_str(text).is_some() {
                    saw_time = true;
                } else if parse_pressure_pair(text).is_some() {
                    saw_pressure = true;
                }
            }
            CellValue::Number(_) | CellValue::Empty => {}
        }
    }

    if saw_datetime {
        (ColumnRole::DateTime, None)
    } else if saw_date {
        (ColumnRole::Date, None)
    } else if saw_time {
        (ColumnRole::Time, None)
    } else if saw_pressure {
        let parameter = registry::parameter(registry::BLOOD_PRESSURE_COMBINED).map(|parameter| {
            ParameterMatch {
                parameter,
                confidence: SAMPLED_CONFIDENCE,
            }
        });
        (ColumnRole::Value, parameter)
    } else {
        (ColumnRole::Value, None)
    }
}

fn classify_column(
    sheet: &Sheet,
    header_index: usize,
    index: usize,
    label: &str,
    sample_rows: usize,
) -> ColumnDescriptor {
    let normalized = normalize_label(label);

    // A parameter keyword outranks date/time words ("Steg per dag" is steps)
    let (role, parameter) = if let Some(found) = registry::match_label(&normalized) {
        let confidence =
            (found.keyword.chars().count() as f64 / normalized.chars().count() as f64).min(1.0);
        let parameter = ParameterMatch {
            parameter: found.parameter,
            confidence,
        };
        (ColumnRole::Value, Some(parameter))
    } else {
        match role_from_keywords(&normalized) {
            ColumnRole::Value => {
                let samples = sample_column(sheet, header_index, index, sample_rows);
                infer_from_samples(&samples)
            }
            role => (role, None),
        }
    };

    tracing::debug!(
        "column {} '{}' -> {:?} {:?}",
        column_index_to_letter(index as u32),
        label,
        role,
        parameter.map(|m| m.parameter.key)
    );

    ColumnDescriptor {
        index,
        header: label.to_string(),
        normalized,
        role,
        parameter,
    }
}

/// Classify every column named by the header row.
pub fn classify_columns(sheet: &Sheet, header: &HeaderRow, sample_rows: usize) -> Vec<ColumnDescriptor> {
    header
        .labels
        .iter()
        .enumerate()
        .map(|(index, label)| classify_column(sheet, header.index, index, label, sample_rows))
        .collect()
}
