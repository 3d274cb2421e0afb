use std::io::Write;
use std::process::Command;

use crate::error::ProcuraError;
use crate::model::{CellValue, RawRow, RawTable};
use crate::table::PLACEHOLDER_PREFIX;

/// PDF table extraction backed by `pdftotext -layout` (poppler-utils).
///
/// Layout mode preserves the whitespace alignment of tabular regions, which
/// lets us reconstruct a grid by splitting lines on 2+ space gaps. Pages
/// with no tabular content yield no tables; that is not an error.
pub struct PdftotextTables;

impl PdftotextTables {
    /// Check if pdftotext is available on the system.
    pub fn is_available() -> bool {
        Command::new("pdftotext")
            .arg("-v")
            .output()
            .map(|o| o.status.success() || !o.stderr.is_empty())
            .unwrap_or(false)
    }

    /// Extract one raw table per detected tabular region, across all pages.
    ///
    /// The first row of each grid with more than one row is promoted to
    /// header unconditionally; PDFs do not carry the placeholder-label
    /// ambiguity spreadsheets do. Rows are stamped with their 1-based line
    /// position on the page.
    pub fn extract_tables(pdf_bytes: &[u8]) -> Result<Vec<RawTable>, ProcuraError> {
        let text = run_pdftotext(pdf_bytes)?;

        let mut tables = Vec::new();
        // pdftotext separates pages with form feed.
        for (page_idx, page_text) in text.split('\x0c').enumerate() {
            let lines: Vec<&str> = page_text.lines().collect();
            for (table_idx, grid) in collect_grids(&lines).into_iter().enumerate() {
                let section = format!("page_{}_table_{}", page_idx + 1, table_idx + 1);
                tables.push(grid_to_table(section, grid));
            }
        }

        Ok(tables)
    }
}

/// A grid row: the line's 1-based position on the page plus its segments.
type GridRow = (u32, Vec<String>);

/// Group consecutive multi-segment lines into grids.
fn collect_grids(lines: &[&str]) -> Vec<Vec<GridRow>> {
    let mut grids = Vec::new();
    let mut current: Vec<GridRow> = Vec::new();

    for (i, line) in lines.iter().enumerate() {
        let segments = split_by_whitespace_gaps(line);
        if segments.len() >= 2 {
            current.push((i as u32 + 1, segments.iter().map(|s| s.to_string()).collect()));
        } else if !current.is_empty() {
            if current.len() >= 2 {
                grids.push(std::mem::take(&mut current));
            } else {
                current.clear();
            }
        }
    }
    if current.len() >= 2 {
        grids.push(current);
    }

    grids
}

fn grid_to_table(section: String, grid: Vec<GridRow>) -> RawTable {
    let width = grid.iter().map(|(_, segs)| segs.len()).max().unwrap_or(0);

    let mut rows = grid.into_iter();
    // More than one row is guaranteed by collect_grids; the first becomes
    // the header.
    let Some((_, header)) = rows.next() else {
        return RawTable::new(section, Vec::new());
    };
    let columns: Vec<String> = (0..width)
        .map(|i| match header.get(i) {
            Some(h) if !h.trim().is_empty() => h.trim().to_string(),
            _ => format!("{PLACEHOLDER_PREFIX}{}", i + 1),
        })
        .collect();

    let mut table = RawTable::new(section, columns);
    for (line_no, segments) in rows {
        let mut cells: Vec<CellValue> = segments
            .into_iter()
            .map(|s| {
                let trimmed = s.trim().to_string();
                if trimmed.is_empty() {
                    CellValue::Empty
                } else {
                    CellValue::Text(trimmed)
                }
            })
            .collect();
        cells.resize(width, CellValue::Empty);
        table.rows.push(RawRow::with_source_row(cells, line_no));
    }

    table
}

fn run_pdftotext(pdf_bytes: &[u8]) -> Result<String, ProcuraError> {
    let mut tmpfile = tempfile::NamedTempFile::new()?;
    tmpfile.write_all(pdf_bytes)?;

    let output = Command::new("pdftotext")
        .arg("-layout")
        .arg(tmpfile.path())
        .arg("-") // output to stdout
        .output()
        .map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ProcuraError::PdftotextNotFound
            } else {
                ProcuraError::UnreadableSource(format!("pdftotext failed: {e}"))
            }
        })?;

    if !output.status.success() {
        let code = output.status.code().unwrap_or(-1);
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();
        return Err(ProcuraError::PdftotextFailed { code, stderr });
    }

    Ok(String::from_utf8_lossy(&output.stdout).to_string())
}

/// Split a line by gaps of 2+ whitespace characters.
fn split_by_whitespace_gaps(line: &str) -> Vec<&str> {
    let mut segments = Vec::new();
    let mut start = None;
    let mut space_count = 0;

    for (i, c) in line.char_indices() {
        if c.is_whitespace() {
            space_count += 1;
            if space_count == 2 {
                if let Some(s) = start {
                    let end = i - 1; // exclude the first space
                    segments.push(&line[s..end]);
                    start = None;
                }
            }
        } else {
            if start.is_none() {
                start = Some(i);
            }
            space_count = 0;
        }
    }

    if let Some(s) = start {
        segments.push(&line[s..]);
    }

    segments
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_by_whitespace_gaps() {
        let segments = split_by_whitespace_gaps("Queen Bed Frame     450.00     pcs");
        assert_eq!(segments, vec!["Queen Bed Frame", "450.00", "pcs"]);
    }

    #[test]
    fn single_spaces_stay_joined() {
        let segments = split_by_whitespace_gaps("Queen Bed Frame 450.00");
        assert_eq!(segments, vec!["Queen Bed Frame 450.00"]);
    }

    #[test]
    fn grids_are_grouped_between_prose() {
        let lines = vec![
            "ACME Trading price list, spring edition",
            "",
            "Item            Unit    Price",
            "Queen Bed       pcs     450.00",
            "Nightstand      pcs     85.00",
            "",
            "Terms: ex works, 30 days net",
        ];
        let grids = collect_grids(&lines);
        assert_eq!(grids.len(), 1);
        assert_eq!(grids[0].len(), 3);
        // Line numbers are 1-based page positions.
        assert_eq!(grids[0][0].0, 3);
        assert_eq!(grids[0][2].0, 5);
    }

    #[test]
    fn lone_aligned_lines_are_not_tables() {
        let lines = vec!["Invoice no.     2024-117", "", "Thank you for your business"];
        assert!(collect_grids(&lines).is_empty());
    }

    #[test]
    fn grid_first_row_becomes_header() {
        let grid: Vec<GridRow> = vec![
            (3, vec!["Item".into(), "Unit".into(), "Price".into()]),
            (4, vec!["Queen Bed".into(), "pcs".into(), "450.00".into()]),
        ];
        let table = grid_to_table("page_1_table_1".into(), grid);
        assert_eq!(table.columns, vec!["Item", "Unit", "Price"]);
        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.rows[0].source_row, Some(4));
    }

    #[test]
    fn short_rows_are_padded_to_grid_width() {
        let grid: Vec<GridRow> = vec![
            (1, vec!["Item".into(), "Unit".into(), "Price".into()]),
            (2, vec!["Queen Bed".into(), "pcs".into()]),
        ];
        let table = grid_to_table("page_1_table_1".into(), grid);
        assert_eq!(table.rows[0].cells.len(), 3);
        assert_eq!(table.rows[0].cells[2], CellValue::Empty);
    }
}
