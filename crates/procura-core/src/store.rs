use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::ProcuraError;
use crate::model::{Catalog, CatalogItem, CatalogMeta};

/// A persisted catalog with its storage id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredCatalog {
    pub id: String,
    #[serde(flatten)]
    pub catalog: Catalog,
}

/// A catalog item tagged with the supplier it belongs to, for cross-supplier
/// reads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaggedCatalogItem {
    pub supplier_id: String,
    pub item: CatalogItem,
}

/// Storage seam for supplier catalogs.
///
/// Catalogs are append-only per supplier: a re-upload creates a new catalog
/// and never merges into an old one. Serializing concurrent writers is the
/// caller's job; implementations here assume a single writer at a time.
pub trait CatalogStore {
    fn save_supplier_catalog(
        &mut self,
        supplier_id: &str,
        meta: CatalogMeta,
        items: Vec<CatalogItem>,
    ) -> Result<String, ProcuraError>;

    /// All items of all catalogs of the given suppliers, tagged with their
    /// supplier id.
    fn get_all_catalog_items(
        &self,
        supplier_ids: &[String],
    ) -> Result<Vec<TaggedCatalogItem>, ProcuraError>;
}

/// In-memory store, used by tests and previews.
#[derive(Debug, Default)]
pub struct MemoryStore {
    catalogs: BTreeMap<String, Vec<StoredCatalog>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn append_catalog(
    catalogs: &mut BTreeMap<String, Vec<StoredCatalog>>,
    supplier_id: &str,
    meta: CatalogMeta,
    items: Vec<CatalogItem>,
) -> String {
    let entry = catalogs.entry(supplier_id.to_string()).or_default();
    let id = format!("cat_{}_{}", supplier_id, entry.len() + 1);
    entry.push(StoredCatalog {
        id: id.clone(),
        catalog: Catalog { meta, items },
    });
    id
}

fn collect_items(
    catalogs: &BTreeMap<String, Vec<StoredCatalog>>,
    supplier_ids: &[String],
) -> Vec<TaggedCatalogItem> {
    let mut out = Vec::new();
    for supplier_id in supplier_ids {
        if let Some(stored) = catalogs.get(supplier_id) {
            for catalog in stored {
                for item in &catalog.catalog.items {
                    out.push(TaggedCatalogItem {
                        supplier_id: supplier_id.clone(),
                        item: item.clone(),
                    });
                }
            }
        }
    }
    out
}

impl CatalogStore for MemoryStore {
    fn save_supplier_catalog(
        &mut self,
        supplier_id: &str,
        meta: CatalogMeta,
        items: Vec<CatalogItem>,
    ) -> Result<String, ProcuraError> {
        Ok(append_catalog(&mut self.catalogs, supplier_id, meta, items))
    }

    fn get_all_catalog_items(
        &self,
        supplier_ids: &[String],
    ) -> Result<Vec<TaggedCatalogItem>, ProcuraError> {
        Ok(collect_items(&self.catalogs, supplier_ids))
    }
}

/// JSON-file backed store: one `catalogs.json` under the given directory,
/// read fully on every access and rewritten on save.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        JsonFileStore {
            path: dir.as_ref().join("catalogs.json"),
        }
    }

    fn read(&self) -> Result<BTreeMap<String, Vec<StoredCatalog>>, ProcuraError> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let content = std::fs::read_to_string(&self.path).map_err(|e| ProcuraError::Store {
            path: self.path.clone(),
            reason: e.to_string(),
        })?;
        serde_json::from_str(&content).map_err(|e| ProcuraError::Store {
            path: self.path.clone(),
            reason: e.to_string(),
        })
    }

    fn write(&self, catalogs: &BTreeMap<String, Vec<StoredCatalog>>) -> Result<(), ProcuraError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(catalogs)?;
        std::fs::write(&self.path, json).map_err(|e| ProcuraError::Store {
            path: self.path.clone(),
            reason: e.to_string(),
        })
    }
}

impl CatalogStore for JsonFileStore {
    fn save_supplier_catalog(
        &mut self,
        supplier_id: &str,
        meta: CatalogMeta,
        items: Vec<CatalogItem>,
    ) -> Result<String, ProcuraError> {
        let mut catalogs = self.read()?;
        let id = append_catalog(&mut catalogs, supplier_id, meta, items);
        self.write(&catalogs)?;
        Ok(id)
    }

    fn get_all_catalog_items(
        &self,
        supplier_ids: &[String],
    ) -> Result<Vec<TaggedCatalogItem>, ProcuraError> {
        Ok(collect_items(&self.read()?, supplier_ids))
    }
}
