use std::path::PathBuf;

use procura_core::error::ProcuraError;
use procura_core::matching::MatchConfig;
use procura_core::model::Catalog;
use procura_core::rfp::{build_comparison, ProcurementItem, SupplierCatalog};

use crate::output;

pub fn run(
    items_file: PathBuf,
    catalog_files: Vec<PathBuf>,
    threshold: Option<f64>,
    output_format: &str,
) -> Result<(), ProcuraError> {
    if catalog_files.is_empty() {
        return Err(ProcuraError::Parse(
            "no catalogs given; pass at least one --catalog file".into(),
        ));
    }

    let items: Vec<ProcurementItem> = load_json(&items_file)?;

    let mut catalogs = Vec::with_capacity(catalog_files.len());
    for path in &catalog_files {
        let catalog: Catalog = load_json(path)?;
        let supplier_id = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());
        catalogs.push(SupplierCatalog {
            supplier_id,
            supplier_name: catalog.meta.name.clone(),
            items: catalog.items,
        });
    }

    let mut config = MatchConfig::default();
    if let Some(threshold) = threshold {
        config.min_score = threshold;
    }

    let rows = build_comparison(&items, &catalogs, &config);

    match output_format {
        "json" => output::json::print(&rows)?,
        _ => print!("{}", output::table::format_comparison(&rows, &catalogs)),
    }

    Ok(())
}

fn load_json<T: serde::de::DeserializeOwned>(path: &PathBuf) -> Result<T, ProcuraError> {
    let content = std::fs::read_to_string(path).map_err(|e| ProcuraError::ItemsLoad {
        path: path.clone(),
        reason: e.to_string(),
    })?;
    serde_json::from_str(&content).map_err(|e| ProcuraError::ItemsLoad {
        path: path.clone(),
        reason: e.to_string(),
    })
}
