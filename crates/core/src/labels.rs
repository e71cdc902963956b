//! Generic label/value view of every parameter-matched column.

use crate::classify::ColumnDescriptor;
use crate::rows::cell_number;
use indexmap::{IndexMap, IndexSet};
use serde::Serialize;
use vitalgrid_sheet::CellValue;

/// A last-seen cell value under a matched column.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum DynamicValue {
    Number(f64),
    Text(String),
}

impl DynamicValue {
    fn from_cell(cell: &CellValue) -> Option<Self> {
        if let Some(n) = cell_number(cell) {
            return Some(DynamicValue::Number(n));
        }
        let text = cell.to_string();
        let text = text.trim();
        (!text.is_empty()).then(|| DynamicValue::Text(text.to_string()))
    }
}

/// Collects matched header labels and the last value seen under each.
#[derive(Debug, Default)]
pub struct RawLabelCollector {
    labels: IndexSet<String>,
    dynamic: IndexMap<String, DynamicValue>,
}

impl RawLabelCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remember the labels of every matched column.
    pub fn record_headers(&mut self, columns: &[ColumnDescriptor]) {
        for column in columns.iter().filter(|c| c.parameter.is_some()) {
            self.labels.insert(column.header.clone());
        }
    }

    /// Store each matched column's cell in this row; later rows overwrite.
    pub fn record_row(&mut self, columns: &[ColumnDescriptor], row: &[CellValue]) {
        for column in columns.iter().filter(|c| c.parameter.is_some()) {
            let Some(value) = row.get(column.index).and_then(DynamicValue::from_cell) else {
                continue;
            };
            self.dynamic.insert(column.header.clone(), value);
        }
    }

    /// Labels in first-seen order, truncated to `cap`.
    pub fn labels(&self, cap: usize) -> Vec<String> {
        self.labels.iter().take(cap).cloned().collect()
    }

    pub fn into_parts(self, cap: usize) -> (Vec<String>, IndexMap<String, DynamicValue>) {
        let labels = self.labels(cap);
        (labels, self.dynamic)
    }
}
