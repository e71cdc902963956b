//! Folding row readings into per-parameter latest values and trends.
//!
//! Every processed row takes one sequence number. Samples are compared by
//! timestamp first and by sequence when neither side has one, so a later row
//! always wins a tie.

use crate::registry::{self, PARAMETERS};
use crate::rows::{CellReading, RowReading};
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::Serialize;

/// The value carried by a sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SampleValue {
    Number(f64),
    BloodPressure {
        systolic: Option<u16>,
        diastolic: Option<u16>,
    },
}

impl SampleValue {
    /// Numeric value, if this is not a blood pressure reading
    #[must_use]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            SampleValue::Number(n) => Some(*n),
            SampleValue::BloodPressure { .. } => None,
        }
    }
}

/// One accepted measurement.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Sample {
    pub value: SampleValue,
    pub timestamp: Option<DateTime<Utc>>,
    pub sheet: String,
    pub sequence: u64,
}

impl Sample {
    /// Whether this sample should replace `current` as the latest value.
    ///
    /// Timestamped samples outrank untimestamped ones; equal timestamps and
    /// untimestamped pairs fall back to processing order.
    #[must_use]
    pub fn supersedes(&self, current: &Sample) -> bool {
        match (self.timestamp, current.timestamp) {
            (Some(candidate), Some(current)) => candidate >= current,
            (Some(_), None) => true,
            (None, Some(_)) => false,
            (None, None) => self.sequence >= current.sequence,
        }
    }
}

/// Running state for one parameter.
#[derive(Debug, Clone, Default)]
pub struct MetricsState {
    pub latest: Option<Sample>,
    pub trend: Vec<Sample>,
}

impl MetricsState {
    fn offer_latest(&mut self, candidate: Sample) {
        let replace = self
            .latest
            .as_ref()
            .map_or(true, |current| candidate.supersedes(current));
        if replace {
            self.latest = Some(candidate);
        }
    }

    fn record(&mut self, sample: Sample, is_timeline: bool) {
        if is_timeline && sample.timestamp.is_some() {
            self.trend.push(sample.clone());
        }
        self.offer_latest(sample);
    }
}

/// Finalized metrics, keyed in registry order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Metrics {
    pub latest: IndexMap<String, Option<Sample>>,
    pub trends: IndexMap<String, Vec<Sample>>,
}

impl Metrics {
    /// Every parameter present with no latest value and an empty trend.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            latest: PARAMETERS.iter().map(|p| (p.key.to_string(), None)).collect(),
            trends: PARAMETERS
                .iter()
                .map(|p| (p.key.to_string(), Vec::new()))
                .collect(),
        }
    }

    /// Latest sample for a parameter key.
    pub fn latest(&self, key: &str) -> Option<&Sample> {
        self.latest.get(key).and_then(Option::as_ref)
    }

    /// Trend for a parameter key; empty when the key is unknown.
    pub fn trend(&self, key: &str) -> &[Sample] {
        self.trends.get(key).map(Vec::as_slice).unwrap_or_default()
    }
}

/// Sort a trend ascending by timestamp. Stable, so equal timestamps keep
/// their processing order and untimestamped samples trail in insertion order.
pub fn finalize_trend(trend: &mut [Sample]) {
    trend.sort_by(|a, b| match (a.timestamp, b.timestamp) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });
}

/// Blood pressure sides gathered from every pressure column of one row.
#[derive(Debug, Default)]
struct PressureParts {
    systolic: Option<u16>,
    diastolic: Option<u16>,
}

impl PressureParts {
    fn is_empty(&self) -> bool {
        self.systolic.is_none() && self.diastolic.is_none()
    }

    fn is_complete(&self) -> bool {
        self.systolic.is_some() && self.diastolic.is_some()
    }
}

fn accepts_side(key: &str, value: f64) -> bool {
    registry::parameter(key).map_or(true, |p| p.accepts(value))
}

/// Accumulates samples across every sheet of one workbook.
#[derive(Debug)]
pub struct MetricAggregator {
    sequence: u64,
    states: IndexMap<&'static str, MetricsState>,
}

impl Default for MetricAggregator {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricAggregator {
    pub fn new() -> Self {
        Self {
            sequence: 0,
            states: PARAMETERS
                .iter()
                .map(|p| (p.key, MetricsState::default()))
                .collect(),
        }
    }

    /// Number of rows recorded so far.
    pub fn rows_recorded(&self) -> u64 {
        self.sequence
    }

    fn state(&mut self, key: &'static str) -> &mut MetricsState {
        self.states.entry(key).or_default()
    }

    fn sample(&self, value: SampleValue, reading: &RowReading, sheet: &str) -> Sample {
        Sample {
            value,
            timestamp: reading.timestamp,
            sheet: sheet.to_string(),
            sequence: self.sequence,
        }
    }

    /// Fold one row into the running state.
    pub fn record_row(&mut self, reading: &RowReading, sheet: &str) {
        self.sequence += 1;
        let mut pressure = PressureParts::default();

        for (parameter, value) in &reading.values {
            match *value {
                CellReading::Number(n) => {
                    if !parameter.accepts(n) {
                        tracing::debug!("{} value {} out of range, dropped", parameter.key, n);
                        continue;
                    }
                    let sample = self.sample(SampleValue::Number(n), reading, sheet);
                    self.state(parameter.key).record(sample, parameter.is_timeline);
                }
                CellReading::Systolic(n) | CellReading::Diastolic(n) => {
                    if !parameter.accepts(n) {
                        tracing::debug!("{} value {} out of range, dropped", parameter.key, n);
                        continue;
                    }
                    let side = n.round() as u16;
                    if matches!(value, CellReading::Systolic(_)) {
                        pressure.systolic = Some(side);
                    } else {
                        pressure.diastolic = Some(side);
                    }
                    let sample = self.sample(SampleValue::Number(n), reading, sheet);
                    self.state(parameter.key).record(sample, parameter.is_timeline);
                }
                CellReading::Pair {
                    systolic,
                    diastolic,
                } => {
                    if !accepts_side(registry::BLOOD_PRESSURE_SYS, f64::from(systolic))
                        || !accepts_side(registry::BLOOD_PRESSURE_DIA, f64::from(diastolic))
                    {
                        tracing::debug!("blood pressure {}/{} out of range, dropped", systolic, diastolic);
                        continue;
                    }
                    pressure.systolic = Some(systolic);
                    pressure.diastolic = Some(diastolic);
                }
            }
        }

        if !pressure.is_empty() {
            self.record_pressure(&pressure, reading, sheet);
        }
    }

    fn record_pressure(&mut self, parts: &PressureParts, reading: &RowReading, sheet: &str) {
        let Some(combined) = registry::parameter(registry::BLOOD_PRESSURE_COMBINED) else {
            return;
        };

        // A missing side is carried over from the previous reading
        let (previous_sys, previous_dia) = match self
            .states
            .get(combined.key)
            .and_then(|s| s.latest.as_ref())
            .map(|s| s.value)
        {
            Some(SampleValue::BloodPressure {
                systolic,
                diastolic,
            }) => (systolic, diastolic),
            _ => (None, None),
        };

        let value = SampleValue::BloodPressure {
            systolic: parts.systolic.or(previous_sys),
            diastolic: parts.diastolic.or(previous_dia),
        };
        let sample = self.sample(value, reading, sheet);
        let state = self.state(combined.key);
        if parts.is_complete() && combined.is_timeline && sample.timestamp.is_some() {
            state.trend.push(sample.clone());
        }
        state.offer_latest(sample);
    }

    /// Sort every trend and emit the metrics in registry order.
    pub fn finish(self) -> Metrics {
        let mut metrics = Metrics::empty();
        for (key, mut state) in self.states {
            finalize_trend(&mut state.trend);
            metrics.latest.insert(key.to_string(), state.latest);
            metrics.trends.insert(key.to_string(), state.trend);
        }
        metrics
    }
}
