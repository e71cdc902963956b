//! Per-row timestamp derivation and value extraction.

use crate::classify::{is_time_only, ColumnDescriptor, ColumnRole};
use crate::registry::{ParameterDefinition, ValueKind};
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use vitalgrid_sheet::CellValue;
use vitalgrid_utils::{
    excel_serial_to_datetime, excel_serial_to_time, parse_date_str, parse_locale_number,
    parse_pressure_pair, parse_time_str,
};

/// A value read from one cell, typed by its column's [`ValueKind`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CellReading {
    Number(f64),
    Systolic(f64),
    Diastolic(f64),
    Pair { systolic: u16, diastolic: u16 },
}

/// Everything extracted from one data row.
#[derive(Debug, Clone)]
pub struct RowReading {
    pub timestamp: Option<DateTime<Utc>>,
    pub values: Vec<(&'static ParameterDefinition, CellReading)>,
}

/// Read a cell as a number: native numbers pass through, text is parsed
/// with either decimal separator.
pub fn cell_number(cell: &CellValue) -> Option<f64> {
    match cell {
        CellValue::Number(n) => Some(*n),
        CellValue::String(s) => parse_locale_number(s),
        CellValue::Empty | CellValue::Date(_) => None,
    }
}

fn cell_datetime(cell: &CellValue) -> Option<NaiveDateTime> {
    match cell {
        CellValue::Date(dt) if !is_time_only(*dt) => Some(*dt),
        CellValue::Number(serial) if *serial >= 1.0 => excel_serial_to_datetime(*serial),
        CellValue::String(s) => parse_date_str(s).map(|p| p.to_datetime()),
        _ => None,
    }
}

fn cell_time(cell: &CellValue) -> Option<NaiveTime> {
    match cell {
        CellValue::Date(dt) => Some(dt.time()),
        CellValue::Number(fraction) => excel_serial_to_time(*fraction),
        CellValue::String(s) => {
            parse_time_str(s).or_else(|| parse_date_str(s).and_then(|p| p.time))
        }
        CellValue::Empty => None,
    }
}

fn cell_reading(kind: ValueKind, cell: &CellValue) -> Option<CellReading> {
    match kind {
        ValueKind::Numeric => cell_number(cell).map(CellReading::Number),
        ValueKind::Systolic => cell_number(cell).map(CellReading::Systolic),
        ValueKind::Diastolic => cell_number(cell).map(CellReading::Diastolic),
        ValueKind::BloodPressurePair => cell
            .as_text()
            .and_then(parse_pressure_pair)
            .map(|(systolic, diastolic)| CellReading::Pair {
                systolic,
                diastolic,
            }),
    }
}

/// Reads data rows of one sheet against its classified columns.
pub struct RowExtractor<'a> {
    columns: &'a [ColumnDescriptor],
    today: NaiveDate,
}

impl<'a> RowExtractor<'a> {
    /// `today` dates rows that carry a time but no date.
    pub fn new(columns: &'a [ColumnDescriptor], today: NaiveDate) -> Self {
        Self { columns, today }
    }

    fn first_in_role<T>(
        &self,
        row: &[CellValue],
        role: ColumnRole,
        parse: impl Fn(&CellValue) -> Option<T>,
    ) -> Option<T> {
        self.columns
            .iter()
            .filter(|c| c.role == role)
            .find_map(|c| row.get(c.index).and_then(&parse))
    }

    /// Derive the row timestamp: a date-time column first, then a date
    /// column combined with a time column. A date cell that carries its own
    /// time keeps it when no time column resolves.
    pub fn timestamp(&self, row: &[CellValue]) -> Option<DateTime<Utc>> {
        if let Some(dt) = self.first_in_role(row, ColumnRole::DateTime, cell_datetime) {
            return Some(dt.and_utc());
        }

        let date = self.first_in_role(row, ColumnRole::Date, cell_datetime);
        let time = self.first_in_role(row, ColumnRole::Time, cell_time);
        let naive = match (date, time) {
            (Some(date), Some(time)) => date.date().and_time(time),
            (Some(date), None) => date,
            (None, Some(time)) => self.today.and_time(time),
            (None, None) => return None,
        };
        Some(naive.and_utc())
    }

    /// Extract the timestamp and every parseable matched value of a row.
    pub fn read(&self, row: &[CellValue]) -> RowReading {
        let values = self
            .columns
            .iter()
            .filter(|c| c.role == ColumnRole::Value)
            .filter_map(|c| {
                let parameter = c.parameter?.parameter;
                let cell = row.get(c.index)?;
                cell_reading(parameter.kind, cell).map(|reading| (parameter, reading))
            })
            .collect();

        RowReading {
            timestamp: self.timestamp(row),
            values,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::classify_columns;
    use crate::header::detect_header;
    use crate::registry;
    use vitalgrid_sheet::Sheet;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()
    }

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
            .and_utc()
    }

    fn read_rows(rows: Vec<Vec<CellValue>>) -> Vec<RowReading> {
        let sheet = Sheet::from_data(rows);
        let header = detect_header(&sheet, 20).unwrap();
        let columns = classify_columns(&sheet, &header, 9);
        let extractor = RowExtractor::new(&columns, today());
        sheet
            .rows()
            .skip(header.index + 1)
            .map(|row| extractor.read(row))
            .collect()
    }

    fn row(values: &[&str]) -> Vec<CellValue> {
        values.iter().map(|v| CellValue::parse(v)).collect()
    }

    #[test]
    fn test_cell_number() {
        assert_eq!(cell_number(&CellValue::Number(72.0)), Some(72.0));
        assert_eq!(cell_number(&CellValue::from("3,5")), Some(3.5));
        assert_eq!(cell_number(&CellValue::from(" 1 200 ")), Some(1200.0));
        assert_eq!(cell_number(&CellValue::from("hög")), None);
        assert_eq!(cell_number(&CellValue::Empty), None);
    }

    #[test]
    fn test_datetime_column_wins() {
        let readings = read_rows(vec![
            row(&["Datum", "Tidpunkt", "Puls"]),
            row(&["2024-01-01", "2024-01-02 09:30", "61"]),
        ]);
        assert_eq!(readings[0].timestamp, Some(utc(2024, 1, 2, 9, 30)));
    }

    #[test]
    fn test_date_and_time_columns_combine() {
        let readings = read_rows(vec![
            row(&["Datum", "Klockslag", "Puls"]),
            row(&["31/01/2024", "7:45", "61"]),
            row(&["01.02.24", "", "62"]),
            row(&["", "22:10", "63"]),
            row(&["", "", "64"]),
        ]);

        assert_eq!(readings[0].timestamp, Some(utc(2024, 1, 31, 7, 45)));
        assert_eq!(readings[1].timestamp, Some(utc(2024, 2, 1, 0, 0)));
        assert_eq!(readings[2].timestamp, Some(utc(2025, 6, 1, 22, 10)));
        assert_eq!(readings[3].timestamp, None);
    }

    #[test]
    fn test_date_column_keeps_its_own_time() {
        let readings = read_rows(vec![
            row(&["Datum", "Puls"]),
            row(&["2024-01-02 08:30", "61"]),
            vec![CellValue::Number(45292.75), CellValue::Number(62.0)],
            vec![
                CellValue::Date(utc(2024, 1, 3, 21, 5).naive_utc()),
                CellValue::Number(63.0),
            ],
        ]);
        assert_eq!(readings[0].timestamp, Some(utc(2024, 1, 2, 8, 30)));
        assert_eq!(readings[1].timestamp, Some(utc(2024, 1, 1, 18, 0)));
        assert_eq!(readings[2].timestamp, Some(utc(2024, 1, 3, 21, 5)));
    }

    #[test]
    fn test_time_column_overrides_date_cell_time() {
        let readings = read_rows(vec![
            row(&["Datum", "Tid", "Puls"]),
            row(&["2024-01-02 08:30", "12:00", "61"]),
        ]);
        assert_eq!(readings[0].timestamp, Some(utc(2024, 1, 2, 12, 0)));
    }

    #[test]
    fn test_serial_dates_and_times() {
        let readings = read_rows(vec![
            row(&["Datum", "Tid", "Vikt"]),
            vec![
                CellValue::Number(45292.0),
                CellValue::Number(0.25),
                CellValue::Number(80.0),
            ],
        ]);
        assert_eq!(readings[0].timestamp, Some(utc(2024, 1, 1, 6, 0)));
    }

    #[test]
    fn test_unparseable_date_falls_through() {
        let readings = read_rows(vec![
            row(&["Datum", "Mätdatum", "Puls"]),
            row(&["okänt", "2024-05-05", "70"]),
        ]);
        assert_eq!(readings[0].timestamp, Some(utc(2024, 5, 5, 0, 0)));
    }

    #[test]
    fn test_values_by_kind() {
        let readings = read_rows(vec![
            row(&["Blodtryck", "Systoliskt", "Diastoliskt", "Vikt"]),
            row(&["120/80", "121", "79", "82,5"]),
            row(&["hög", "", "x", ""]),
        ]);

        let values: Vec<(&str, CellReading)> = readings[0]
            .values
            .iter()
            .map(|(p, r)| (p.key, *r))
            .collect();
        assert_eq!(
            values,
            vec![
                (
                    registry::BLOOD_PRESSURE_COMBINED,
                    CellReading::Pair {
                        systolic: 120,
                        diastolic: 80
                    }
                ),
                (registry::BLOOD_PRESSURE_SYS, CellReading::Systolic(121.0)),
                (registry::BLOOD_PRESSURE_DIA, CellReading::Diastolic(79.0)),
                (registry::WEIGHT, CellReading::Number(82.5)),
            ]
        );
        assert!(readings[1].values.is_empty());
        assert_eq!(readings[1].timestamp, None);
    }
}
