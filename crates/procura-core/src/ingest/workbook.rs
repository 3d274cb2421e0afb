use std::io::Cursor;

use calamine::{Data, Reader};
use tracing::warn;

use crate::error::ProcuraError;
use crate::model::{CellValue, RawRow, RawTable};
use crate::table::PLACEHOLDER_PREFIX;

/// Read every sheet of a workbook as a raw, headerless grid.
///
/// Header position is unknown in supplier files, so each sheet gets
/// placeholder column labels and the normalizer decides later which row is
/// the real header. Sheets that fail to read degrade to empty tables; a
/// multi-sheet upload must not die on one bad sheet.
pub fn parse_workbook(bytes: &[u8]) -> Result<Vec<RawTable>, ProcuraError> {
    let cursor = Cursor::new(bytes.to_vec());
    let mut workbook = calamine::open_workbook_auto_from_rs(cursor)
        .map_err(|e| ProcuraError::UnreadableSource(format!("failed to open workbook: {e}")))?;

    let sheet_names: Vec<String> = workbook.sheet_names().to_vec();
    let mut tables = Vec::with_capacity(sheet_names.len());

    for name in sheet_names {
        let range = match workbook.worksheet_range(&name) {
            Ok(range) => range,
            Err(e) => {
                warn!(sheet = %name, "skipping unreadable sheet: {e}");
                tables.push(RawTable::new(name, Vec::new()));
                continue;
            }
        };

        let width = range.width();
        let columns: Vec<String> = (1..=width)
            .map(|i| format!("{PLACEHOLDER_PREFIX}{i}"))
            .collect();
        let mut table = RawTable::new(name, columns);

        // The range starts at the first used cell. Pad leading blank rows
        // so grid positions stay absolute; image anchors refer to absolute
        // document rows.
        let leading_rows = range.start().map(|(r, _)| r).unwrap_or(0);
        for _ in 0..leading_rows {
            table.rows.push(RawRow::new(vec![CellValue::Empty; width]));
        }

        for row in range.rows() {
            let mut cells: Vec<CellValue> = row.iter().map(cell_value).collect();
            cells.resize(width, CellValue::Empty);
            table.rows.push(RawRow::new(cells));
        }

        tables.push(table);
    }

    Ok(tables)
}

fn cell_value(cell: &Data) -> CellValue {
    match cell {
        Data::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                CellValue::Empty
            } else {
                CellValue::Text(trimmed.to_string())
            }
        }
        Data::Float(f) => CellValue::Number(*f),
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Bool(b) => CellValue::Text(b.to_string()),
        Data::DateTime(dt) => CellValue::Text(dt.to_string()),
        Data::Empty => CellValue::Empty,
        other => CellValue::Text(format!("{other}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cell_value_coercion() {
        assert_eq!(
            cell_value(&Data::String("  Chair ".into())),
            CellValue::Text("Chair".into())
        );
        assert_eq!(cell_value(&Data::Float(45.5)), CellValue::Number(45.5));
        assert_eq!(cell_value(&Data::Int(3)), CellValue::Number(3.0));
        assert_eq!(cell_value(&Data::Empty), CellValue::Empty);
        assert_eq!(
            cell_value(&Data::String("   ".into())),
            CellValue::Empty
        );
    }

    #[test]
    fn garbage_bytes_are_an_unreadable_source() {
        let err = parse_workbook(b"definitely not a zip archive").unwrap_err();
        assert!(matches!(err, ProcuraError::UnreadableSource(_)));
    }
}
