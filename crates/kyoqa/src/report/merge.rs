use std::collections::HashMap;
use std::path::Path;

use crate::config::ColumnNames;
use crate::document::DocumentResult;
use crate::error::ReportError;

use super::palette::StatusPalette;
use super::template::{CellValue, Sheet};

/// Prefix written on rows appended for results without a template row.
pub const PROCESSED_PREFIX: &str = "Processed: ";

/// Template contents with results applied. `fills[i]` is the fill of
/// `rows[i]`; the header row is never filled.
#[derive(Debug, Clone, PartialEq)]
pub struct MergedSheet {
    pub name: String,
    pub rows: Vec<Vec<CellValue>>,
    pub fills: Vec<Option<u32>>,
}

#[derive(Debug, Clone, Copy)]
struct ColumnMap {
    description: usize,
    meta: Option<usize>,
    author: Option<usize>,
    tracking: Option<usize>,
    status: Option<usize>,
    file_name: Option<usize>,
}

impl ColumnMap {
    fn locate(header: &[CellValue], names: &ColumnNames) -> Result<Self, ReportError> {
        let find = |name: &str| {
            let wanted = name.trim().to_lowercase();
            header
                .iter()
                .position(|cell| cell.as_text().trim().to_lowercase() == wanted)
        };
        let description = find(&names.description)
            .ok_or_else(|| ReportError::MissingColumn(names.description.clone()))?;

        Ok(Self {
            description,
            meta: find(&names.meta),
            author: find(&names.author),
            tracking: find(&names.tracking),
            status: find(&names.status),
            file_name: find(&names.file_name),
        })
    }
}

/// Derives the merge key of a template description: the "Processed: "
/// prefix is dropped and the remainder reduced to its file stem.
pub fn description_key(description: &str) -> String {
    let trimmed = description.trim();
    let name = trimmed.strip_prefix(PROCESSED_PREFIX).unwrap_or(trimmed).trim();
    Path::new(name)
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| name.to_string())
}

pub fn merge(
    template: Sheet,
    results: &[DocumentResult],
    names: &ColumnNames,
    palette: &StatusPalette,
) -> Result<MergedSheet, ReportError> {
    let columns = ColumnMap::locate(template.header(), names)?;
    let width = template.header().len();

    let mut by_stem: HashMap<String, usize> = HashMap::new();
    for (index, result) in results.iter().enumerate() {
        by_stem.entry(result.file_stem()).or_insert(index);
    }

    let mut used = vec![false; results.len()];
    let mut rows = template.rows;
    let mut fills = vec![None; rows.len()];

    for (row_index, row) in rows.iter_mut().enumerate().skip(1) {
        let description = row
            .get(columns.description)
            .map(CellValue::as_text)
            .unwrap_or_default();
        if description.trim().is_empty() {
            continue;
        }
        let key = description_key(&description);
        match by_stem.get(&key) {
            Some(&index) => {
                let result = &results[index];
                apply_result(row, &columns, result);
                fills[row_index] = palette.fill_for(result.status);
                used[index] = true;
            }
            None => {
                tracing::debug!(row = row_index + 1, key = %key, "No result for template row, skipped");
            }
        }
    }

    for (result, _) in results.iter().zip(&used).filter(|(_, used)| !**used) {
        let mut row = vec![CellValue::Empty; width];
        set(
            &mut row,
            columns.description,
            format!("{}{}", PROCESSED_PREFIX, result.file_name),
        );
        if let Some(col) = columns.file_name {
            set(&mut row, col, result.file_name.clone());
        }
        apply_result(&mut row, &columns, result);
        rows.push(row);
        fills.push(palette.fill_for(result.status));
    }

    if let Some(header_fill) = fills.first_mut() {
        *header_fill = None;
    }

    tracing::info!(
        rows = rows.len().saturating_sub(1),
        matched = used.iter().filter(|u| **u).count(),
        appended = used.iter().filter(|u| !**u).count(),
        "Merged results into template"
    );

    Ok(MergedSheet {
        name: template.name,
        rows,
        fills,
    })
}

fn apply_result(row: &mut Vec<CellValue>, columns: &ColumnMap, result: &DocumentResult) {
    if let Some(col) = columns.meta {
        set(row, col, result.models.clone());
    }
    if let Some(col) = columns.author {
        set(row, col, result.author.clone());
    }
    if let Some(col) = columns.tracking {
        set(row, col, result.tracking_numbers.clone());
    }
    if let Some(col) = columns.status {
        set(row, col, result.status.label().to_string());
    }
}

fn set(row: &mut Vec<CellValue>, col: usize, value: String) {
    if row.len() <= col {
        row.resize(col + 1, CellValue::Empty);
    }
    row[col] = if value.is_empty() {
        CellValue::Empty
    } else {
        CellValue::Text(value)
    };
}
