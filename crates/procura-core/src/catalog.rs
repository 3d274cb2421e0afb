use rust_decimal::Decimal;
use std::str::FromStr;
use tracing::debug;

use crate::error::ProcuraError;
use crate::images::ImageAssociationMap;
use crate::model::{CatalogItem, CellValue, RawTable};
use crate::roles::{ColumnRole, ColumnRoleMap};

/// Build catalog items from a normalized table and its column-role map.
///
/// The item name is the only mandatory field: rows whose item cell is
/// empty (or "nan") after trimming are dropped, everything else degrades
/// per field. Image linking happens only when both a `source_row` stamp
/// and an association map are present.
///
/// Fails only when the table has data rows but no resolved item column;
/// such a catalog must not be persisted partially.
pub fn build_items(
    table: &RawTable,
    roles: &ColumnRoleMap,
    default_currency: &str,
    images: Option<&ImageAssociationMap>,
) -> Result<Vec<CatalogItem>, ProcuraError> {
    let item_label = roles
        .column(ColumnRole::Item)
        .ok_or_else(|| ProcuraError::ItemColumnUnresolved {
            source_name: table.section.clone(),
        })?;

    let mut items = Vec::new();

    for row in &table.rows {
        let Some(item_name) = table.cell(row, item_label).and_then(CellValue::as_text) else {
            continue;
        };

        let text_of = |role: ColumnRole| {
            roles
                .column(role)
                .and_then(|label| table.cell(row, label))
                .and_then(CellValue::as_text)
        };

        let price = roles
            .column(ColumnRole::Price)
            .and_then(|label| table.cell(row, label))
            .and_then(price_from_cell);

        let currency = text_of(ColumnRole::Currency)
            .map(|c| c.to_uppercase())
            .unwrap_or_else(|| default_currency.to_string());

        let photo_ref = text_of(ColumnRole::Photo).unwrap_or_default();

        let image_path = match (row.source_row, images) {
            (Some(source_row), Some(map)) => map
                .get(&(table.section.clone(), source_row))
                .map(|p| p.display().to_string())
                .unwrap_or_default(),
            _ => String::new(),
        };

        items.push(CatalogItem {
            item_name,
            description: text_of(ColumnRole::Description).unwrap_or_default(),
            specification: text_of(ColumnRole::Specification).unwrap_or_default(),
            unit: text_of(ColumnRole::Unit).unwrap_or_default(),
            price,
            currency,
            photo_ref,
            image_path,
            source_row: row.source_row,
        });
    }

    Ok(items)
}

fn price_from_cell(cell: &CellValue) -> Option<Decimal> {
    match cell {
        CellValue::Number(f) => Some(f64_to_decimal(*f)),
        CellValue::Text(s) => parse_price(s),
        CellValue::Empty => None,
    }
}

/// Parse a price string from arbitrary catalog formatting.
///
/// Strips everything except digits, the decimal point and a leading minus
/// before conversion. A value with no digits yields None: null means
/// "price on request", zero means "free", and the two must not be
/// conflated.
pub fn parse_price(raw: &str) -> Option<Decimal> {
    let mut cleaned = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '0'..='9' | '.' => cleaned.push(c),
            '-' if cleaned.is_empty() => cleaned.push(c),
            _ => {}
        }
    }

    if !cleaned.bytes().any(|b| b.is_ascii_digit()) {
        return None;
    }

    match Decimal::from_str(&cleaned) {
        Ok(d) => Some(d),
        Err(_) => {
            debug!(value = raw, "unparseable price cell, treating as unavailable");
            None
        }
    }
}

/// Convert f64 to Decimal, preserving reasonable precision.
///
/// Uses string round-trip to avoid floating-point artifacts
/// (e.g., 449.95_f64 becoming 449.9499999...).
pub fn f64_to_decimal(f: f64) -> Decimal {
    let s = format!("{f}");
    s.parse::<Decimal>()
        .unwrap_or_else(|_| Decimal::try_from(f).unwrap_or_default())
}
