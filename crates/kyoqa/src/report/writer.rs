use std::path::Path;

use rust_xlsxwriter::{Color, Format, FormatAlign, Workbook, Worksheet, XlsxError};

use crate::error::ReportError;
use crate::sanitize::sanitize_cell;

use super::merge::MergedSheet;
use super::template::CellValue;

/// Writes a merged sheet: bold header, wrapped top-left body cells filled
/// by status, and columns sized to content up to `max_column_width`.
pub fn write_sheet(sheet: &MergedSheet, output: &Path, max_column_width: f64) -> Result<(), ReportError> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    if !sheet.name.is_empty() {
        worksheet.set_name(&sheet.name)?;
    }

    let header_format = Format::new().set_bold();
    let body_format = Format::new()
        .set_text_wrap()
        .set_align(FormatAlign::Top)
        .set_align(FormatAlign::Left);

    let width = sheet.rows.iter().map(Vec::len).max().unwrap_or(0);
    let mut column_chars = vec![0usize; width];

    for (row_index, row) in sheet.rows.iter().enumerate() {
        let row_num = u32::try_from(row_index).map_err(|_| XlsxError::RowColumnLimitError)?;
        let format = if row_index == 0 {
            header_format.clone()
        } else {
            match sheet.fills.get(row_index).copied().flatten() {
                Some(rgb) => body_format.clone().set_background_color(Color::RGB(rgb)),
                None => body_format.clone(),
            }
        };
        let filled = row_index > 0 && sheet.fills.get(row_index).copied().flatten().is_some();
        let cells = if filled { width } else { row.len() };

        for col_index in 0..cells {
            let col_num = u16::try_from(col_index).map_err(|_| XlsxError::RowColumnLimitError)?;
            let cell = row.get(col_index).unwrap_or(&CellValue::Empty);
            let text_len = write_cell(worksheet, row_num, col_num, cell, &format)?;
            column_chars[col_index] = column_chars[col_index].max(text_len);
        }
    }

    for (col_index, chars) in column_chars.iter().enumerate() {
        if *chars == 0 {
            continue;
        }
        let col_num = u16::try_from(col_index).map_err(|_| XlsxError::RowColumnLimitError)?;
        worksheet.set_column_width(col_num, column_width(*chars, max_column_width))?;
    }

    workbook.save(output)?;
    tracing::info!(rows = sheet.rows.len(), "Wrote workbook");
    Ok(())
}

/// Content width plus padding, capped.
pub fn column_width(max_chars: usize, cap: f64) -> f64 {
    ((max_chars + 2) as f64).min(cap)
}

fn write_cell(
    worksheet: &mut Worksheet,
    row: u32,
    col: u16,
    cell: &CellValue,
    format: &Format,
) -> Result<usize, XlsxError> {
    match cell {
        CellValue::Empty => {
            worksheet.write_blank(row, col, format)?;
            Ok(0)
        }
        CellValue::Text(text) => {
            let clean = sanitize_cell(text);
            worksheet.write_string_with_format(row, col, &clean, format)?;
            Ok(clean.chars().count())
        }
        CellValue::Number(n) => {
            worksheet.write_number_with_format(row, col, *n, format)?;
            Ok(cell.as_text().chars().count())
        }
        CellValue::Bool(b) => {
            worksheet.write_boolean_with_format(row, col, *b, format)?;
            Ok(cell.as_text().chars().count())
        }
        CellValue::DateTime(serial) | CellValue::Duration(serial) => {
            let dated = format.clone().set_num_format(date_num_format(cell));
            worksheet.write_number_with_format(row, col, *serial, &dated)?;
            Ok(cell.as_text().chars().count())
        }
    }
}

fn date_num_format(cell: &CellValue) -> &'static str {
    match cell {
        CellValue::Duration(_) => "[h]:mm:ss",
        CellValue::DateTime(serial) if serial.fract() != 0.0 => "yyyy-mm-dd hh:mm:ss",
        _ => "yyyy-mm-dd",
    }
}
