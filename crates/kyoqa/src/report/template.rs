use std::path::Path;

use calamine::{open_workbook_auto, Data, Range, Reader};
use chrono::{NaiveDate, NaiveDateTime, TimeDelta};

use crate::error::ReportError;

/// Cell values carried over from the template. Formatting is not preserved,
/// except that dates and durations keep their kind.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
    /// Excel serial date, days since 1899-12-30.
    DateTime(f64),
    /// Excel serial duration in days.
    Duration(f64),
}

impl CellValue {
    pub fn as_text(&self) -> String {
        match self {
            CellValue::Empty => String::new(),
            CellValue::Text(s) => s.clone(),
            CellValue::Number(n) if n.fract() == 0.0 => format!("{:.0}", n),
            CellValue::Number(n) => n.to_string(),
            CellValue::Bool(b) => if *b { "TRUE" } else { "FALSE" }.to_string(),
            CellValue::DateTime(serial) => match serial_to_datetime(*serial) {
                Some(dt) if serial.fract() == 0.0 => dt.format("%Y-%m-%d").to_string(),
                Some(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
                None => serial.to_string(),
            },
            CellValue::Duration(days) => {
                let total = (days * 86_400.0).round() as i64;
                format!("{}:{:02}:{:02}", total / 3600, (total % 3600) / 60, total % 60)
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.is_empty(),
            _ => false,
        }
    }
}

/// First worksheet of a template, anchored at A1. Row 0 is the header.
#[derive(Debug, Clone, PartialEq)]
pub struct Sheet {
    pub name: String,
    pub rows: Vec<Vec<CellValue>>,
}

impl Sheet {
    pub fn header(&self) -> &[CellValue] {
        self.rows.first().map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn width(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }
}

pub fn read_template(path: &Path) -> Result<Sheet, ReportError> {
    let mut workbook = open_workbook_auto(path).map_err(|e| ReportError::Read {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    let Some(name) = workbook.sheet_names().first().cloned() else {
        return Err(ReportError::NoWorksheet(path.to_path_buf()));
    };
    let range = workbook
        .worksheet_range(&name)
        .map_err(|e| ReportError::Read {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

    tracing::debug!(sheet = %name, "Read template worksheet");
    Ok(Sheet {
        name,
        rows: anchored_rows(&range),
    })
}

/// calamine ranges start at the first used cell; pad them back to A1 so
/// column indices match the written sheet.
fn anchored_rows(range: &Range<Data>) -> Vec<Vec<CellValue>> {
    let Some((start_row, start_col)) = range.start() else {
        return Vec::new();
    };
    let mut rows: Vec<Vec<CellValue>> = (0..start_row).map(|_| Vec::new()).collect();
    for row in range.rows() {
        let mut cells = vec![CellValue::Empty; start_col as usize];
        cells.extend(row.iter().map(convert));
        while cells.last().is_some_and(CellValue::is_empty) {
            cells.pop();
        }
        rows.push(cells);
    }
    rows
}

fn serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;
    let millis = (serial * 86_400_000.0).round() as i64;
    epoch.checked_add_signed(TimeDelta::try_milliseconds(millis)?)
}

fn convert(cell: &Data) -> CellValue {
    match cell {
        Data::Empty => CellValue::Empty,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Float(f) => CellValue::Number(*f),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(dt) if dt.is_duration() => CellValue::Duration(dt.as_f64()),
        Data::DateTime(dt) => CellValue::DateTime(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::Text(s.clone()),
        Data::Error(e) => CellValue::Text(format!("#ERR:{:?}", e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_text() {
        assert_eq!(CellValue::Number(3.0).as_text(), "3");
        assert_eq!(CellValue::Number(2.5).as_text(), "2.5");
        assert_eq!(CellValue::Bool(true).as_text(), "TRUE");
        assert!(CellValue::Text(String::new()).is_empty());
        assert_eq!(CellValue::DateTime(47484.0).as_text(), "2030-01-01");
        assert_eq!(CellValue::DateTime(47484.5).as_text(), "2030-01-01 12:00:00");
        assert_eq!(CellValue::Duration(1.5).as_text(), "36:00:00");
    }

    #[test]
    fn test_read_written_workbook() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("template.xlsx");

        let mut workbook = rust_xlsxwriter::Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.set_name("Import").unwrap();
        sheet.write_string(0, 0, "Short description").unwrap();
        sheet.write_string(0, 1, "Meta").unwrap();
        sheet.write_string(1, 0, "Processed: sample.pdf").unwrap();
        sheet.write_number(1, 1, 42.0).unwrap();
        workbook.save(&path).unwrap();

        let sheet = read_template(&path).unwrap();
        assert_eq!(sheet.name, "Import");
        assert_eq!(sheet.header()[0], CellValue::Text("Short description".to_string()));
        assert_eq!(sheet.rows[1][1], CellValue::Number(42.0));
        assert_eq!(sheet.width(), 2);
    }

    #[test]
    fn test_unreadable_template() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("broken.xlsx");
        std::fs::write(&path, b"not a workbook").unwrap();

        assert!(matches!(read_template(&path), Err(ReportError::Read { .. })));
    }
}
