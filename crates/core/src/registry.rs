//! The fixed table of tracked physiological parameters.
//!
//! Keywords are stored pre-normalized (lower-case, no diacritics) so they can
//! be matched directly against [`vitalgrid_utils::normalize_label`] output.

use lazy_static::lazy_static;
use serde::Serialize;
use std::collections::HashMap;

/// How a matched column's cells turn into values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ValueKind {
    /// A single locale-tolerant number
    Numeric,
    /// The systolic side of a blood pressure reading
    Systolic,
    /// The diastolic side of a blood pressure reading
    Diastolic,
    /// A compound `systolic/diastolic` reading in one cell
    BloodPressurePair,
}

/// Inclusive plausibility bounds for accepted values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Range {
    pub min: f64,
    pub max: f64,
}

impl Range {
    #[must_use]
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

/// One tracked parameter.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterDefinition {
    pub key: &'static str,
    pub label: &'static str,
    pub unit: &'static str,
    pub keywords: &'static [&'static str],
    pub range: Option<Range>,
    pub is_timeline: bool,
    pub kind: ValueKind,
}

impl ParameterDefinition {
    /// Check a value against the plausibility range (no range accepts all)
    #[must_use]
    pub fn accepts(&self, value: f64) -> bool {
        self.range.map_or(true, |range| range.contains(value))
    }
}

pub const WEIGHT: &str = "weight";
pub const HEART_RATE: &str = "heartRate";
pub const LDL: &str = "ldl";
pub const BLOOD_PRESSURE_SYS: &str = "bloodPressureSys";
pub const BLOOD_PRESSURE_DIA: &str = "bloodPressureDia";
pub const BLOOD_PRESSURE_COMBINED: &str = "bloodPressureCombined";

const fn range(min: f64, max: f64) -> Option<Range> {
    Some(Range { min, max })
}

/// Registry in output order.
pub static PARAMETERS: &[ParameterDefinition] = &[
    ParameterDefinition {
        key: WEIGHT,
        label: "Vikt",
        unit: "kg",
        keywords: &["vikt", "weight", "kroppsvikt", "body weight", "kroppsvikt (kg)"],
        range: range(20.0, 400.0),
        is_timeline: true,
        kind: ValueKind::Numeric,
    },
    ParameterDefinition {
        key: HEART_RATE,
        label: "Hjärtfrekvens",
        unit: "bpm",
        keywords: &[
            "hjartfrekvens",
            "puls",
            "pulse",
            "heart rate",
            "heartrate",
            "hjartfrekv",
            "bpm",
            "vilopuls",
            "resting heart rate",
        ],
        range: range(20.0, 250.0),
        is_timeline: true,
        kind: ValueKind::Numeric,
    },
    ParameterDefinition {
        key: "oxygenSaturation",
        label: "Syremättnad",
        unit: "%",
        keywords: &["syremattnad", "saturation", "spo2", "oxygen", "syrgasmattnad"],
        range: range(50.0, 100.0),
        is_timeline: true,
        kind: ValueKind::Numeric,
    },
    ParameterDefinition {
        key: LDL,
        label: "LDL-kolesterol",
        unit: "mmol/L",
        keywords: &["ldl", "ldl-kolesterol", "ldl kolesterol", "ldl cholesterol", "ldl-cholesterol"],
        range: range(0.1, 15.0),
        is_timeline: false,
        kind: ValueKind::Numeric,
    },
    ParameterDefinition {
        key: "hdl",
        label: "HDL-kolesterol",
        unit: "mmol/L",
        keywords: &["hdl", "hdl-kolesterol", "hdl kolesterol", "hdl cholesterol", "hdl-cholesterol"],
        range: range(0.1, 5.0),
        is_timeline: false,
        kind: ValueKind::Numeric,
    },
    ParameterDefinition {
        key: "totalCholesterol",
        label: "Totalkolesterol",
        unit: "mmol/L",
        keywords: &["totalkolesterol", "total cholesterol", "kolesterol", "cholesterol"],
        range: range(1.0, 20.0),
        is_timeline: false,
        kind: ValueKind::Numeric,
    },
    ParameterDefinition {
        key: "triglycerides",
        label: "Triglycerider",
        unit: "mmol/L",
        keywords: &["triglycerider", "triglycerides", "triglyc"],
        range: range(0.1, 30.0),
        is_timeline: false,
        kind: ValueKind::Numeric,
    },
    ParameterDefinition {
        key: "glucose",
        label: "Glukos",
        unit: "mmol/L",
        keywords: &["glukos", "glucose", "blodsocker", "blood sugar", "p-glukos"],
        range: range(1.0, 40.0),
        is_timeline: true,
        kind: ValueKind::Numeric,
    },
    ParameterDefinition {
        key: "egfr",
        label: "eGFR",
        unit: "mL/min/1.73m²",
        keywords: &["egfr", "gfr", "njurfunktion"],
        range: range(1.0, 200.0),
        is_timeline: false,
        kind: ValueKind::Numeric,
    },
    ParameterDefinition {
        key: "steps",
        label: "Steg",
        unit: "",
        keywords: &["steg", "steps", "step count", "antal steg", "stegantal"],
        range: range(0.0, 100_000.0),
        is_timeline: true,
        kind: ValueKind::Numeric,
    },
    ParameterDefinition {
        key: "sleep",
        label: "Sömn",
        unit: "h",
        keywords: &["somn", "sleep", "sovtid", "somntid", "sleep duration"],
        range: range(0.0, 24.0),
        is_timeline: true,
        kind: ValueKind::Numeric,
    },
    ParameterDefinition {
        key: BLOOD_PRESSURE_SYS,
        label: "Systoliskt blodtryck",
        unit: "mmHg",
        keywords: &[
            "systoliskt",
            "systolisk",
            "systolic",
            "sys",
            "overtryck",
            "blodtryck sys",
            "blood pressure sys",
            "bp sys",
        ],
        range: range(50.0, 260.0),
        is_timeline: false,
        kind: ValueKind::Systolic,
    },
    ParameterDefinition {
        key: BLOOD_PRESSURE_DIA,
        label: "Diastoliskt blodtryck",
        unit: "mmHg",
        keywords: &[
            "diastoliskt",
            "diastolisk",
            "diastolic",
            "dia",
            "undertryck",
            "blodtryck dia",
            "blood pressure dia",
            "bp dia",
        ],
        range: range(30.0, 160.0),
        is_timeline: false,
        kind: ValueKind::Diastolic,
    },
    ParameterDefinition {
        key: BLOOD_PRESSURE_COMBINED,
        label: "Blodtryck",
        unit: "mmHg",
        keywords: &["blodtryck", "blood pressure", "bp", "blodtryck (mmhg)"],
        range: None,
        is_timeline: true,
        kind: ValueKind::BloodPressurePair,
    },
    ParameterDefinition {
        key: "afBurden",
        label: "AF-börda",
        unit: "%",
        keywords: &["af burden", "af-burden", "af-borda", "af borda", "formaksflimmer", "afib"],
        range: range(0.0, 100.0),
        is_timeline: true,
        kind: ValueKind::Numeric,
    },
];

lazy_static! {
    static ref BY_KEY: HashMap<&'static str, &'static ParameterDefinition> =
        PARAMETERS.iter().map(|p| (p.key, p)).collect();
}

/// Look up a parameter by key.
pub fn parameter(key: &str) -> Option<&'static ParameterDefinition> {
    BY_KEY.get(key).copied()
}

/// A header-to-parameter match with the keyword that produced it.
#[derive(Debug, Clone, Copy)]
pub struct KeywordMatch {
    pub parameter: &'static ParameterDefinition,
    pub keyword: &'static str,
}

/// Keywords this short only match a whole word of the header.
const SHORT_KEYWORD_LEN: usize = 3;

fn label_contains(normalized: &str, keyword: &str) -> bool {
    if keyword.len() > SHORT_KEYWORD_LEN {
        return normalized.contains(keyword);
    }
    normalized
        .split(|c: char| !c.is_alphanumeric())
        .any(|word| word == keyword)
}

/// Match a normalized header against every parameter; the longest matching
/// keyword wins, earlier registry entries win ties.
pub fn match_label(normalized: &str) -> Option<KeywordMatch> {
    let mut best: Option<KeywordMatch> = None;
    for parameter in PARAMETERS {
        for keyword in parameter.keywords {
            if !label_contains(normalized, keyword) {
                continue;
            }
            if best.map_or(true, |b| keyword.len() > b.keyword.len()) {
                best = Some(KeywordMatch { parameter, keyword });
            }
        }
    }
    best
}
