use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::matching::{best_match, MatchConfig};
use crate::model::CatalogItem;

/// One line of a project's procurement list, as produced by the quantity
/// calculator (an external collaborator).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcurementItem {
    pub name: String,
    pub quantity: Decimal,
    #[serde(default)]
    pub unit: String,
    #[serde(default)]
    pub specification: String,
    #[serde(default)]
    pub target_price: Option<Decimal>,
}

/// One supplier's catalog items, tagged for comparison.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupplierCatalog {
    pub supplier_id: String,
    pub supplier_name: String,
    pub items: Vec<CatalogItem>,
}

/// Match outcome for one (procurement item, supplier) pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum MatchOutcome {
    Matched { item: CatalogItem, score: f64 },
    NoMatch,
}

impl MatchOutcome {
    /// Price text for display: the amount with currency, "price on
    /// request" for known items without one, or "no match".
    pub fn price_label(&self) -> String {
        match self {
            MatchOutcome::Matched { item, .. } => match &item.price {
                Some(price) => format!("{} {}", price, item.currency),
                None => "price on request".to_string(),
            },
            MatchOutcome::NoMatch => "no match".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupplierCell {
    pub supplier_id: String,
    #[serde(flatten)]
    pub outcome: MatchOutcome,
}

/// One comparison row: a procurement item against every selected supplier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonRow {
    pub item: ProcurementItem,
    pub cells: Vec<SupplierCell>,
}

/// Build the multi-supplier comparison for a procurement list.
///
/// Pure and recomputed on every view; match results are never persisted.
pub fn build_comparison(
    items: &[ProcurementItem],
    catalogs: &[SupplierCatalog],
    config: &MatchConfig,
) -> Vec<ComparisonRow> {
    items
        .iter()
        .map(|item| {
            let cells = catalogs
                .iter()
                .map(|catalog| {
                    let outcome = match best_match(&item.name, &catalog.items, config) {
                        Some(m) => MatchOutcome::Matched {
                            item: m.item.clone(),
                            score: m.score,
                        },
                        None => MatchOutcome::NoMatch,
                    };
                    SupplierCell {
                        supplier_id: catalog.supplier_id.clone(),
                        outcome,
                    }
                })
                .collect();
            ComparisonRow {
                item: item.clone(),
                cells,
            }
        })
        .collect()
}

/// A picked winner: this supplier should quote this procurement item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RfpSelection {
    pub supplier_id: String,
    pub supplier_name: String,
    pub item: ProcurementItem,
}

/// A quote-request message, ready for mail dispatch or a pre-filled draft.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RfpMessage {
    pub subject: String,
    pub body: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupplierRfp {
    pub supplier_id: String,
    pub supplier_name: String,
    pub message: RfpMessage,
}

/// Group picked items per supplier (first-seen order) and compose one RFP
/// message for each. Pure transformation; no selection state is kept.
pub fn compose_rfps(selections: &[RfpSelection], project_name: &str) -> Vec<SupplierRfp> {
    let mut grouped: Vec<(String, String, Vec<&ProcurementItem>)> = Vec::new();

    for selection in selections {
        match grouped
            .iter_mut()
            .find(|(id, _, _)| *id == selection.supplier_id)
        {
            Some((_, _, items)) => items.push(&selection.item),
            None => grouped.push((
                selection.supplier_id.clone(),
                selection.supplier_name.clone(),
                vec![&selection.item],
            )),
        }
    }

    grouped
        .into_iter()
        .map(|(supplier_id, supplier_name, items)| SupplierRfp {
            message: compose_rfp(&supplier_name, project_name, &items),
            supplier_id,
            supplier_name,
        })
        .collect()
}

/// Compose a single quote-request message: deterministic greeting, one line
/// per item, deterministic closing.
pub fn compose_rfp(
    supplier_name: &str,
    project_name: &str,
    items: &[&ProcurementItem],
) -> RfpMessage {
    let subject = format!("Request for quotation - {project_name}");

    let mut body = String::new();
    body.push_str(&format!("Dear {supplier_name} team,\n\n"));
    body.push_str(&format!(
        "For the project \"{project_name}\" we would like to request a quotation for the following items:\n\n"
    ));

    for item in items {
        let mut line = format!("- {} (qty: {}", item.name, item.quantity);
        if !item.unit.is_empty() {
            line.push_str(&format!(" {}", item.unit));
        }
        line.push(')');
        if !item.specification.is_empty() {
            line.push_str(&format!("; spec: {}", item.specification));
        }
        if let Some(target) = &item.target_price {
            line.push_str(&format!("; target unit price: {target}"));
        }
        body.push_str(&line);
        body.push('\n');
    }

    body.push_str(
        "\nPlease include unit pricing, lead times and delivery terms in your offer.\n\nBest regards,\n",
    );
    body.push_str(&format!("{project_name} procurement team\n"));

    RfpMessage { subject, body }
}
