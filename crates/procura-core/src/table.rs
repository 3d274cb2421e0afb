use crate::model::{CellValue, RawRow, RawTable};

/// Label prefix the loader uses for columns it could not name.
pub const PLACEHOLDER_PREFIX: &str = "column_";

/// Configuration for header-row detection.
///
/// Keyword tables live here rather than in module statics so tests can
/// exercise the normalizer with a controlled vocabulary.
#[derive(Debug, Clone)]
pub struct NormalizerConfig {
    /// A candidate header row qualifies when the joined, lowercased cell
    /// text contains any of these.
    pub header_keywords: Vec<String>,
    /// Rows with fewer non-empty cells than this are too sparse to be a
    /// header.
    pub min_header_cells: usize,
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        NormalizerConfig {
            header_keywords: [
                "item", "description", "spec", "unit", "qty", "price", "vendor", "article",
                "photo",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            min_header_cells: 3,
        }
    }
}

/// Auto-generated placeholder label, e.g. "column_3".
pub fn is_placeholder_label(label: &str) -> bool {
    label
        .strip_prefix(PLACEHOLDER_PREFIX)
        .map(|rest| !rest.is_empty() && rest.bytes().all(|b| b.is_ascii_digit()))
        .unwrap_or(false)
}

/// Normalize a raw table: find the real header row if the loader could not,
/// promote it, and stamp surviving rows with their 1-based origin position.
///
/// Tables with fewer than 2 columns are passed through unchanged. Tables
/// whose labels all look real only get fully-empty columns dropped. When no
/// header row can be found the table keeps its placeholder labels and no
/// row receives a `source_row`, which disables image linking downstream.
pub fn normalize_table(table: RawTable, config: &NormalizerConfig) -> RawTable {
    if table.columns.len() < 2 {
        return table;
    }

    if !table.columns.iter().any(|c| is_placeholder_label(c)) {
        return drop_empty_columns(table);
    }

    match find_header_row(&table, config) {
        Some(header_idx) => promote_header(table, header_idx),
        None => drop_empty_columns(table),
    }
}

/// Scan rows top-to-bottom for the first one that looks like a header.
fn find_header_row(table: &RawTable, config: &NormalizerConfig) -> Option<usize> {
    for (idx, row) in table.rows.iter().enumerate() {
        let values: Vec<String> = row.cells.iter().filter_map(CellValue::as_text).collect();
        if values.len() < config.min_header_cells {
            continue;
        }
        let joined = values.join(" ").to_lowercase();
        if config.header_keywords.iter().any(|kw| joined.contains(kw)) {
            return Some(idx);
        }
    }
    None
}

/// Promote the cells of `header_idx` to column labels, keep only rows below
/// it, and stamp each kept row with its position in the original table.
fn promote_header(table: RawTable, header_idx: usize) -> RawTable {
    let RawTable {
        section,
        columns,
        rows,
    } = table;

    let header = &rows[header_idx];
    let labels: Vec<String> = columns
        .iter()
        .enumerate()
        .map(|(i, old)| {
            header
                .cells
                .get(i)
                .and_then(CellValue::as_text)
                .unwrap_or_else(|| old.clone())
        })
        .collect();

    // source_row is computed against the original row ordering, before any
    // filtering, so it still lines up with image anchors.
    let kept: Vec<RawRow> = rows
        .into_iter()
        .enumerate()
        .skip(header_idx + 1)
        .filter(|(_, row)| !row.is_blank())
        .map(|(orig_idx, mut row)| {
            if row.source_row.is_none() {
                row.source_row = Some(orig_idx as u32 + 1);
            }
            row
        })
        .collect();

    drop_empty_columns(RawTable {
        section,
        columns: labels,
        rows: kept,
    })
}

/// Remove columns whose cells are blank in every row.
fn drop_empty_columns(table: RawTable) -> RawTable {
    let RawTable {
        section,
        columns,
        rows,
    } = table;

    let keep: Vec<bool> = (0..columns.len())
        .map(|i| {
            rows.iter()
                .any(|row| row.cells.get(i).map(|c| !c.is_blank()).unwrap_or(false))
        })
        .collect();

    if keep.iter().all(|k| *k) {
        return RawTable {
            section,
            columns,
            rows,
        };
    }

    let columns: Vec<String> = columns
        .into_iter()
        .zip(keep.iter())
        .filter_map(|(c, k)| k.then_some(c))
        .collect();

    let rows: Vec<RawRow> = rows
        .into_iter()
        .map(|row| {
            let cells: Vec<CellValue> = row
                .cells
                .into_iter()
                .zip(keep.iter())
                .filter_map(|(c, k)| k.then_some(c))
                .collect();
            RawRow {
                cells,
                source_row: row.source_row,
            }
        })
        .collect();

    RawTable {
        section,
        columns,
        rows,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> CellValue {
        CellValue::Text(s.to_string())
    }

    fn placeholder_table(rows: Vec<Vec<CellValue>>) -> RawTable {
        let width = rows.iter().map(|r| r.len()).max().unwrap_or(0);
        let mut table = RawTable::new(
            "Sheet1",
            (1..=width).map(|i| format!("{PLACEHOLDER_PREFIX}{i}")).collect(),
        );
        for cells in rows {
            let mut cells = cells;
            cells.resize(width, CellValue::Empty);
            table.rows.push(RawRow::new(cells));
        }
        table
    }

    #[test]
    fn placeholder_label_detection() {
        assert!(is_placeholder_label("column_1"));
        assert!(is_placeholder_label("column_12"));
        assert!(!is_placeholder_label("column_"));
        assert!(!is_placeholder_label("column_a"));
        assert!(!is_placeholder_label("Item"));
    }

    #[test]
    fn header_row_is_detected_and_promoted() {
        let table = placeholder_table(vec![
            vec![text("ACME Trading Ltd."), CellValue::Empty, CellValue::Empty],
            vec![text("Item"), text("Description"), text("Price")],
            vec![text("Chair"), text("Oak dining chair"), CellValue::Number(45.0)],
            vec![text("Table"), text("Oak dining table"), CellValue::Number(220.0)],
        ]);

        let normalized = normalize_table(table, &NormalizerConfig::default());
        assert_eq!(normalized.columns, vec!["Item", "Description", "Price"]);
        assert_eq!(normalized.rows.len(), 2);
        // Chair sat at original index 2, so its origin row is 3.
        assert_eq!(normalized.rows[0].source_row, Some(3));
        assert_eq!(normalized.rows[1].source_row, Some(4));
    }

    #[test]
    fn sparse_rows_are_skipped_before_header() {
        // First row has keywords but only 2 non-empty cells.
        let table = placeholder_table(vec![
            vec![text("Price list"), text("2024"), CellValue::Empty],
            vec![text("Item"), text("Unit"), text("Price")],
            vec![text("Lamp"), text("pcs"), CellValue::Number(12.0)],
        ]);

        let normalized = normalize_table(table, &NormalizerConfig::default());
        assert_eq!(normalized.columns, vec!["Item", "Unit", "Price"]);
        assert_eq!(normalized.rows.len(), 1);
        assert_eq!(normalized.rows[0].source_row, Some(3));
    }

    #[test]
    fn no_header_found_keeps_rows_unstamped() {
        let table = placeholder_table(vec![
            vec![text("aaa"), text("bbb"), text("ccc")],
            vec![text("ddd"), text("eee"), text("fff")],
        ]);

        let normalized = normalize_table(table, &NormalizerConfig::default());
        assert!(normalized.columns[0].starts_with(PLACEHOLDER_PREFIX));
        assert_eq!(normalized.rows.len(), 2);
        assert!(normalized.rows.iter().all(|r| r.source_row.is_none()));
    }

    #[test]
    fn real_headers_only_lose_empty_columns() {
        let mut table = RawTable::new(
            "catalog.csv",
            vec!["Item".into(), "Notes".into(), "Price".into()],
        );
        table.rows.push(RawRow::with_source_row(
            vec![text("Chair"), CellValue::Empty, CellValue::Number(45.0)],
            1,
        ));
        table.rows.push(RawRow::with_source_row(
            vec![text("Table"), CellValue::Empty, CellValue::Number(220.0)],
            2,
        ));

        let normalized = normalize_table(table, &NormalizerConfig::default());
        assert_eq!(normalized.columns, vec!["Item", "Price"]);
        assert_eq!(normalized.rows[0].cells.len(), 2);
        assert_eq!(normalized.rows[0].source_row, Some(1));
    }

    #[test]
    fn trivially_small_tables_pass_through() {
        let mut table = RawTable::new("Sheet1", vec![format!("{PLACEHOLDER_PREFIX}1")]);
        table.rows.push(RawRow::new(vec![CellValue::Empty]));
        let normalized = normalize_table(table.clone(), &NormalizerConfig::default());
        assert_eq!(normalized.columns, table.columns);
        assert_eq!(normalized.rows.len(), 1);
    }

    #[test]
    fn blank_rows_below_header_are_dropped() {
        let table = placeholder_table(vec![
            vec![text("Item"), text("Qty"), text("Price")],
            vec![text("Chair"), CellValue::Number(4.0), CellValue::Number(45.0)],
            vec![CellValue::Empty, CellValue::Empty, CellValue::Empty],
            vec![text("Table"), CellValue::Number(1.0), CellValue::Number(220.0)],
        ]);

        let normalized = normalize_table(table, &NormalizerConfig::default());
        assert_eq!(normalized.rows.len(), 2);
        assert_eq!(normalized.rows[1].source_row, Some(4));
    }
}
