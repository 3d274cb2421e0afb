use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single raw cell as read from a source document.
///
/// Sources deliver untyped content: text, a number (spreadsheet floats),
/// or nothing. Coercion to typed fields happens in the catalog builder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CellValue {
    Text(String),
    Number(f64),
    Empty,
}

impl CellValue {
    /// Returns the trimmed text content, or None for empty cells.
    ///
    /// "nan" (any casing) counts as empty; it is what sloppy exporters
    /// write into blank spreadsheet cells.
    pub fn as_text(&self) -> Option<String> {
        match self {
            CellValue::Text(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("nan") {
                    None
                } else {
                    Some(trimmed.to_string())
                }
            }
            CellValue::Number(f) => Some(f.to_string()),
            CellValue::Empty => None,
        }
    }

    pub fn is_blank(&self) -> bool {
        self.as_text().is_none()
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Text(s) => write!(f, "{s}"),
            CellValue::Number(n) => write!(f, "{n}"),
            CellValue::Empty => Ok(()),
        }
    }
}

/// One row of a raw table. Cells are parallel to the table's column labels;
/// `source_row` is the 1-based position in the original source document,
/// kept outside the cells so later stages never mistake it for data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawRow {
    pub cells: Vec<CellValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_row: Option<u32>,
}

impl RawRow {
    pub fn new(cells: Vec<CellValue>) -> Self {
        RawRow {
            cells,
            source_row: None,
        }
    }

    pub fn with_source_row(cells: Vec<CellValue>, source_row: u32) -> Self {
        RawRow {
            cells,
            source_row: Some(source_row),
        }
    }

    pub fn is_blank(&self) -> bool {
        self.cells.iter().all(CellValue::is_blank)
    }
}

/// A raw table as produced by the multi-format loader: ordered column
/// labels, ordered rows, and the section (sheet or page) it came from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawTable {
    /// Sheet name for workbooks, page/table identifier for PDFs, file
    /// name for delimited text. Used as the key for image association.
    pub section: String,
    pub columns: Vec<String>,
    pub rows: Vec<RawRow>,
}

impl RawTable {
    pub fn new(section: impl Into<String>, columns: Vec<String>) -> Self {
        RawTable {
            section: section.into(),
            columns,
            rows: Vec::new(),
        }
    }

    pub fn column_index(&self, label: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == label)
    }

    /// Cell of `row` under the column labelled `label`, if both exist.
    pub fn cell<'a>(&self, row: &'a RawRow, label: &str) -> Option<&'a CellValue> {
        let idx = self.column_index(label)?;
        row.cells.get(idx)
    }
}

/// Declared or inferred format of an uploaded catalog source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceFormat {
    Csv,
    Xlsx,
    Pdf,
}

impl SourceFormat {
    /// Loose parse from a file extension or format name.
    pub fn from_extension(s: &str) -> Option<SourceFormat> {
        match s.trim().trim_start_matches('.').to_lowercase().as_str() {
            "csv" | "tsv" | "txt" => Some(SourceFormat::Csv),
            "xlsx" | "xls" | "xlsm" => Some(SourceFormat::Xlsx),
            "pdf" => Some(SourceFormat::Pdf),
            _ => None,
        }
    }
}

impl fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceFormat::Csv => write!(f, "csv"),
            SourceFormat::Xlsx => write!(f, "xlsx"),
            SourceFormat::Pdf => write!(f, "pdf"),
        }
    }
}

/// The canonical unit of catalog data. Created once during catalog build,
/// immutable thereafter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogItem {
    /// The only mandatory field; rows without a name are never built.
    pub item_name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub specification: String,
    #[serde(default)]
    pub unit: String,
    /// None means "price available on request". Zero means free; the two
    /// are never conflated.
    pub price: Option<Decimal>,
    pub currency: String,
    /// Raw photo reference text from the source, if any.
    #[serde(default)]
    pub photo_ref: String,
    /// Resolved local path to an extracted image, empty if none.
    #[serde(default)]
    pub image_path: String,
    /// 1-based origin row in the source document, for traceability and
    /// image linking.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_row: Option<u32>,
}

impl CatalogItem {
    /// Derived, never stored: true iff the price is known.
    pub fn price_available(&self) -> bool {
        self.price.is_some()
    }
}

/// Metadata describing one supplier catalog upload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogMeta {
    pub name: String,
    pub source_type: SourceFormat,
    pub source_name: String,
    #[serde(default)]
    pub source_url: String,
    #[serde(default)]
    pub image_dir: String,
    #[serde(default)]
    pub image_count: usize,
}

/// One supplier's uploaded set of items from a single source file or URL.
/// Catalogs are append-only per supplier; a re-upload creates a new one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Catalog {
    pub meta: CatalogMeta,
    pub items: Vec<CatalogItem>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn cell_text_trims_and_filters_nan() {
        assert_eq!(
            CellValue::Text("  Bed Frame  ".into()).as_text().as_deref(),
            Some("Bed Frame")
        );
        assert_eq!(CellValue::Text("nan".into()).as_text(), None);
        assert_eq!(CellValue::Text("NaN".into()).as_text(), None);
        assert_eq!(CellValue::Text("   ".into()).as_text(), None);
        assert_eq!(CellValue::Empty.as_text(), None);
    }

    #[test]
    fn cell_number_renders_without_trailing_zero() {
        assert_eq!(CellValue::Number(2.0).as_text().as_deref(), Some("2"));
        assert_eq!(CellValue::Number(2.5).as_text().as_deref(), Some("2.5"));
    }

    #[test]
    fn format_from_extension_loose() {
        assert_eq!(SourceFormat::from_extension("CSV"), Some(SourceFormat::Csv));
        assert_eq!(
            SourceFormat::from_extension(".xlsx"),
            Some(SourceFormat::Xlsx)
        );
        assert_eq!(SourceFormat::from_extension("xls"), Some(SourceFormat::Xlsx));
        assert_eq!(SourceFormat::from_extension("pdf"), Some(SourceFormat::Pdf));
        assert_eq!(SourceFormat::from_extension("docx"), None);
    }

    #[test]
    fn price_available_follows_price() {
        let mut item = CatalogItem {
            item_name: "Desk".into(),
            description: String::new(),
            specification: String::new(),
            unit: String::new(),
            price: Some(dec!(120)),
            currency: "USD".into(),
            photo_ref: String::new(),
            image_path: String::new(),
            source_row: None,
        };
        assert!(item.price_available());
        item.price = None;
        assert!(!item.price_available());
    }

    #[test]
    fn table_cell_lookup_by_label() {
        let mut table = RawTable::new("Sheet1", vec!["Item".into(), "Price".into()]);
        table.rows.push(RawRow::new(vec![
            CellValue::Text("Chair".into()),
            CellValue::Number(45.0),
        ]));
        let row = &table.rows[0];
        assert_eq!(
            table.cell(row, "Price"),
            Some(&CellValue::Number(45.0))
        );
        assert_eq!(table.cell(row, "Missing"), None);
    }
}
