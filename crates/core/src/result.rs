//! The result document and its heart-focused projection.

use crate::aggregate::{Metrics, Sample, SampleValue};
use crate::labels::DynamicValue;
use crate::registry::{self, BLOOD_PRESSURE_COMBINED, BLOOD_PRESSURE_DIA, BLOOD_PRESSURE_SYS};
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::Serialize;
use vitalgrid_utils::format_local;

/// Where one sheet's header was found and how many data rows followed it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetSummary {
    pub sheet_name: String,
    pub header_row_index: Option<usize>,
    pub header_row: Vec<String>,
    pub row_count: usize,
}

/// One point of the heart rate series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeartRatePoint {
    /// Local-style `YYYY-MM-DD HH:MM`
    pub time: String,
    pub value: f64,
    pub unit: String,
}

/// Cardiology view over the metrics.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HeartData {
    pub heart_rate: Option<f64>,
    #[serde(rename = "systolicBP")]
    pub systolic_bp: Option<f64>,
    #[serde(rename = "diastolicBP")]
    pub diastolic_bp: Option<f64>,
    #[serde(rename = "cholesterolLDL")]
    pub cholesterol_ldl: Option<f64>,
    pub heart_rate_over_time: Vec<HeartRatePoint>,
    pub blood_pressure_data: Vec<Sample>,
    pub ecg_data: Vec<serde_json::Value>,
    pub hrv_data: Vec<serde_json::Value>,
}

impl HeartData {
    /// Project the heart-related parameters out of finished metrics.
    pub fn from_metrics(metrics: &Metrics) -> Self {
        let latest_number = |key: &str| metrics.latest(key).and_then(|s| s.value.as_number());

        let (combined_sys, combined_dia) = match metrics.latest(BLOOD_PRESSURE_COMBINED) {
            Some(Sample {
                value:
                    SampleValue::BloodPressure {
                        systolic,
                        diastolic,
                    },
                ..
            }) => (systolic.map(f64::from), diastolic.map(f64::from)),
            _ => (None, None),
        };

        let unit = registry::parameter(registry::HEART_RATE).map_or("bpm", |p| p.unit);
        let heart_rate_over_time = metrics
            .trend(registry::HEART_RATE)
            .iter()
            .filter_map(|sample| {
                Some(HeartRatePoint {
                    time: format_local(sample.timestamp?.naive_utc()),
                    value: sample.value.as_number()?,
                    unit: unit.to_string(),
                })
            })
            .collect();

        HeartData {
            heart_rate: latest_number(registry::HEART_RATE),
            systolic_bp: combined_sys.or_else(|| latest_number(BLOOD_PRESSURE_SYS)),
            diastolic_bp: combined_dia.or_else(|| latest_number(BLOOD_PRESSURE_DIA)),
            cholesterol_ldl: latest_number(registry::LDL),
            heart_rate_over_time,
            blood_pressure_data: metrics.trend(BLOOD_PRESSURE_COMBINED).to_vec(),
            ecg_data: Vec::new(),
            hrv_data: Vec::new(),
        }
    }
}

/// Everything extracted from one upload.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionResult {
    pub filename: String,
    pub uploaded_at: DateTime<Utc>,
    pub parsed_at: DateTime<Utc>,
    pub sheet_names: Vec<String>,
    pub sheet_summaries: Vec<SheetSummary>,
    pub metrics: Metrics,
    pub raw_data: Vec<String>,
    pub dynamic_data: IndexMap<String, DynamicValue>,
    pub heart_data: HeartData,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ExtractionResult {
    /// A well-formed result carrying only the error message.
    pub fn fallback(
        filename: &str,
        uploaded_at: DateTime<Utc>,
        parsed_at: DateTime<Utc>,
        error: impl Into<String>,
    ) -> Self {
        ExtractionResult {
            filename: filename.to_string(),
            uploaded_at,
            parsed_at,
            sheet_names: Vec::new(),
            sheet_summaries: Vec::new(),
            metrics: Metrics::empty(),
            raw_data: Vec::new(),
            dynamic_data: IndexMap::new(),
            heart_data: HeartData::default(),
            error: Some(error.into()),
        }
    }

    /// Whether extraction failed and this is a fallback result.
    pub fn is_fallback(&self) -> bool {
        self.error.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::MetricAggregator;
    use crate::rows::{CellReading, RowReading};
    use chrono::TimeZone;

    fn at(day: u32, hour: u32, minute: u32) -> Option<DateTime<Utc>> {
        Some(Utc.with_ymd_and_hms(2024, 3, day, hour, minute, 0).unwrap())
    }

    fn reading(
        timestamp: Option<DateTime<Utc>>,
        values: Vec<(&str, CellReading)>,
    ) -> RowReading {
        RowReading {
            timestamp,
            values: values
                .into_iter()
                .map(|(k, v)| (registry::parameter(k).unwrap(), v))
                .collect(),
        }
    }

    #[test]
    fn test_heart_view() {
        let mut agg = MetricAggregator::new();
        agg.record_row(
            &reading(
                at(1, 7, 5),
                vec![
                    (registry::HEART_RATE, CellReading::Number(64.0)),
                    (
                        BLOOD_PRESSURE_COMBINED,
                        CellReading::Pair {
                            systolic: 128,
                            diastolic: 84,
                        },
                    ),
                    (registry::LDL, CellReading::Number(2.9)),
                ],
            ),
            "Blad1",
        );
        agg.record_row(
            &reading(at(2, 21, 40), vec![(registry::HEART_RATE, CellReading::Number(70.0))]),
            "Blad1",
        );
        let heart = HeartData::from_metrics(&agg.finish());

        assert_eq!(heart.heart_rate, Some(70.0));
        assert_eq!(heart.systolic_bp, Some(128.0));
        assert_eq!(heart.diastolic_bp, Some(84.0));
        assert_eq!(heart.cholesterol_ldl, Some(2.9));
        assert_eq!(heart.blood_pressure_data.len(), 1);
        assert_eq!(
            heart.heart_rate_over_time,
            vec![
                HeartRatePoint {
                    time: "2024-03-01 07:05".to_string(),
                    value: 64.0,
                    unit: "bpm".to_string(),
                },
                HeartRatePoint {
                    time: "2024-03-02 21:40".to_string(),
                    value: 70.0,
                    unit: "bpm".to_string(),
                },
            ]
        );
    }

    #[test]
    fn test_heart_view_falls_back_to_separate_sides() {
        let mut agg = MetricAggregator::new();
        agg.record_row(
            &reading(None, vec![(BLOOD_PRESSURE_SYS, CellReading::Systolic(141.0))]),
            "Blad1",
        );
        let metrics = agg.finish();
        let heart = HeartData::from_metrics(&metrics);

        assert_eq!(heart.systolic_bp, Some(141.0));
        assert_eq!(heart.diastolic_bp, None);
    }

    #[test]
    fn test_fallback_shape() {
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let result = ExtractionResult::fallback("trasig.xlsx", now, now, "bad zip");
        assert!(result.is_fallback());

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["error"], "bad zip");
        assert_eq!(json["filename"], "trasig.xlsx");
        assert_eq!(json["metrics"]["latest"]["heartRate"], serde_json::Value::Null);
        assert_eq!(json["metrics"]["trends"]["afBurden"], serde_json::json!([]));
        assert_eq!(json["heartData"]["systolicBP"], serde_json::Value::Null);
        assert_eq!(json["heartData"]["ecgData"], serde_json::json!([]));
        assert_eq!(json["rawData"], serde_json::json!([]));
        assert_eq!(json["dynamicData"], serde_json::json!({}));
    }

    #[test]
    fn test_error_key_omitted_on_success() {
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let mut result = ExtractionResult::fallback("ok.csv", now, now, "");
        result.error = None;
        let json = serde_json::to_value(&result).unwrap();
        assert!(json.get("error").is_none());
        assert!(json.get("sheetSummaries").is_some());
    }
}
