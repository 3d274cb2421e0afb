use crate::error::ProcuraError;
use crate::model::{CellValue, RawRow, RawTable};
use crate::table::PLACEHOLDER_PREFIX;

/// Parse delimited text (CSV and friends) into a single raw table.
///
/// The first record is taken as the header row; unlabeled header cells get
/// placeholder labels. Every data row is stamped with its 1-based position
/// immediately; delimited sources carry no placeholder-column ambiguity, so
/// there is nothing for the normalizer to re-detect.
pub fn parse_delimited(bytes: &[u8], section: &str) -> Result<RawTable, ProcuraError> {
    let delimiter = detect_delimiter(bytes);
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .from_reader(bytes);

    let headers = reader
        .headers()
        .map_err(|e| ProcuraError::UnreadableSource(format!("cannot read csv headers: {e}")))?;

    let columns: Vec<String> = headers
        .iter()
        .enumerate()
        .map(|(i, h)| {
            let trimmed = h.trim();
            if trimmed.is_empty() {
                format!("{PLACEHOLDER_PREFIX}{}", i + 1)
            } else {
                trimmed.to_string()
            }
        })
        .collect();

    let mut table = RawTable::new(section, columns);
    let width = table.columns.len();

    for (idx, record) in reader.records().enumerate() {
        let record =
            record.map_err(|e| ProcuraError::UnreadableSource(format!("bad csv record: {e}")))?;
        let mut cells: Vec<CellValue> = record
            .iter()
            .map(|v| {
                let trimmed = v.trim();
                if trimmed.is_empty() {
                    CellValue::Empty
                } else {
                    CellValue::Text(trimmed.to_string())
                }
            })
            .collect();
        cells.resize(width, CellValue::Empty);
        cells.truncate(width);
        table
            .rows
            .push(RawRow::with_source_row(cells, idx as u32 + 1));
    }

    Ok(table)
}

/// Pick the most frequent candidate delimiter on the first line.
fn detect_delimiter(bytes: &[u8]) -> u8 {
    let first_line = bytes.split(|b| *b == b'\n').next().unwrap_or(&[]);
    [b',', b';', b'\t']
        .into_iter()
        .max_by_key(|d| first_line.iter().filter(|b| *b == d).count())
        .unwrap_or(b',')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_comma_separated() {
        let csv = b"Item,Unit,Price\nChair,pcs,45.00\nTable,pcs,220.00\n";
        let table = parse_delimited(csv, "catalog.csv").unwrap();
        assert_eq!(table.columns, vec!["Item", "Unit", "Price"]);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0].source_row, Some(1));
        assert_eq!(table.rows[1].source_row, Some(2));
        assert_eq!(
            table.cell(&table.rows[0], "Item").unwrap().as_text().as_deref(),
            Some("Chair")
        );
    }

    #[test]
    fn detects_semicolon_delimiter() {
        let csv = b"Item;Unit;Price\nChair;pcs;45,00\n";
        let table = parse_delimited(csv, "catalog.csv").unwrap();
        assert_eq!(table.columns.len(), 3);
        assert_eq!(
            table.cell(&table.rows[0], "Price").unwrap().as_text().as_deref(),
            Some("45,00")
        );
    }

    #[test]
    fn ragged_rows_are_padded() {
        let csv = b"Item,Unit,Price\nChair,pcs\nTable,pcs,220.00,extra\n";
        let table = parse_delimited(csv, "catalog.csv").unwrap();
        assert_eq!(table.rows[0].cells.len(), 3);
        assert_eq!(table.rows[0].cells[2], CellValue::Empty);
        assert_eq!(table.rows[1].cells.len(), 3);
    }

    #[test]
    fn blank_header_cells_get_placeholders() {
        let csv = b"Item,,Price\nChair,note,45.00\n";
        let table = parse_delimited(csv, "catalog.csv").unwrap();
        assert_eq!(table.columns[1], format!("{PLACEHOLDER_PREFIX}2"));
    }
}
