use procura_core::rfp::{ComparisonRow, SupplierCatalog};
use procura_core::IngestReport;

/// Plain-text listing of an ingested catalog.
pub fn format_ingest(report: &IngestReport) -> String {
    let mut out = String::new();
    let catalog = &report.catalog;

    out.push_str(&format!(
        "Catalog '{}' ({}, {} item(s), {} image(s))\n\n",
        catalog.meta.name,
        catalog.meta.source_type,
        catalog.items.len(),
        catalog.meta.image_count
    ));

    if catalog.items.is_empty() {
        out.push_str("  no items found\n");
        return out;
    }

    let name_width = catalog
        .items
        .iter()
        .map(|i| i.item_name.len())
        .max()
        .unwrap_or(10);

    for item in &catalog.items {
        let price = match &item.price {
            Some(p) => format!("{} {}", p, item.currency),
            None => "price on request".to_string(),
        };
        let mut line = format!("  {:<width$}  {}", item.item_name, price, width = name_width);
        if !item.unit.is_empty() {
            line.push_str(&format!("  per {}", item.unit));
        }
        if !item.image_path.is_empty() {
            line.push_str("  [img]");
        }
        out.push_str(&line);
        out.push('\n');
    }

    out
}

/// Plain-text comparison: one block per procurement item, one line per
/// supplier.
pub fn format_comparison(rows: &[ComparisonRow], catalogs: &[SupplierCatalog]) -> String {
    let mut out = String::new();

    for (i, row) in rows.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        out.push_str(&format!(
            "{} (qty: {} {})\n",
            row.item.name, row.item.quantity, row.item.unit
        ));

        for cell in &row.cells {
            let supplier_name = catalogs
                .iter()
                .find(|c| c.supplier_id == cell.supplier_id)
                .map(|c| c.supplier_name.as_str())
                .unwrap_or(cell.supplier_id.as_str());

            match &cell.outcome {
                procura_core::rfp::MatchOutcome::Matched { item, score } => {
                    out.push_str(&format!(
                        "  {}: {} ({:.0}%) -> {}\n",
                        supplier_name,
                        item.item_name,
                        score * 100.0,
                        cell.outcome.price_label()
                    ));
                }
                procura_core::rfp::MatchOutcome::NoMatch => {
                    out.push_str(&format!("  {}: no match\n", supplier_name));
                }
            }
        }
    }

    out
}
