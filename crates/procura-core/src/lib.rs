pub mod catalog;
pub mod error;
pub mod images;
pub mod ingest;
pub mod matching;
pub mod model;
pub mod rfp;
pub mod roles;
pub mod store;
pub mod table;

use std::path::PathBuf;

use tracing::{debug, warn};

use error::ProcuraError;
use images::{extractor_for, ExtractedImages, ImageAssociationMap};
use model::{Catalog, CatalogItem, CatalogMeta, RawTable, SourceFormat};
use roles::{classify_columns, ColumnRoleMap, RoleKeywords};
use table::NormalizerConfig;

/// Options for a catalog ingestion run.
#[derive(Debug, Clone)]
pub struct IngestOptions {
    /// Currency applied to items whose source carries none.
    pub default_currency: String,
    /// Where extracted images are written. None disables image extraction.
    pub image_dir: Option<PathBuf>,
    pub normalizer: NormalizerConfig,
    pub keywords: RoleKeywords,
    /// When set, replaces role guessing entirely for every section. Useful
    /// after a preview showed the classifier picked the wrong columns.
    pub role_overrides: Option<ColumnRoleMap>,
}

impl Default for IngestOptions {
    fn default() -> Self {
        IngestOptions {
            default_currency: "USD".to_string(),
            image_dir: None,
            normalizer: NormalizerConfig::default(),
            keywords: RoleKeywords::default(),
            role_overrides: None,
        }
    }
}

/// A section (sheet, page table) that contributed nothing, and why.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct SkippedSection {
    pub section: String,
    pub reason: String,
}

/// Outcome of one catalog upload: the catalog plus a partial-success report.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct IngestReport {
    pub catalog: Catalog,
    pub skipped: Vec<SkippedSection>,
}

/// Main API entry point: ingest one uploaded source into a catalog.
///
/// Loads and normalizes every table in the source, extracts embedded images
/// when an image directory is configured, guesses column roles per section
/// and builds the item list. Sections that contribute nothing are reported,
/// not fatal; the whole upload fails only when the source is unreadable or
/// no section has a detectable item column.
pub fn ingest_catalog(
    bytes: &[u8],
    format: SourceFormat,
    source_name: &str,
    options: &IngestOptions,
) -> Result<IngestReport, ProcuraError> {
    let tables = ingest::load_tables(bytes, format, source_name, &options.normalizer)?;

    let extracted = match &options.image_dir {
        Some(dir) if format != SourceFormat::Csv => {
            let extractor = extractor_for(format);
            match extractor.extract_images(bytes, dir) {
                Ok(extracted) => {
                    debug!(
                        backend = extractor.backend_name(),
                        count = extracted.count(),
                        "image extraction finished"
                    );
                    extracted
                }
                Err(e) => {
                    // Image problems never block a catalog save.
                    warn!("image extraction failed, continuing without images: {e}");
                    ExtractedImages::default()
                }
            }
        }
        _ => ExtractedImages::default(),
    };

    let (items, skipped) = build_catalog_items(
        &tables,
        source_name,
        Some(&extracted.anchored),
        options,
    )?;

    let meta = CatalogMeta {
        name: source_name.to_string(),
        source_type: format,
        source_name: source_name.to_string(),
        source_url: String::new(),
        image_dir: options
            .image_dir
            .as_ref()
            .map(|d| d.display().to_string())
            .unwrap_or_default(),
        image_count: extracted.count(),
    };

    Ok(IngestReport {
        catalog: Catalog { meta, items },
        skipped,
    })
}

/// Ingest a catalog fetched from a URL; the format is inferred from the URL
/// path unless the caller knows better.
pub fn ingest_catalog_from_url(
    url: &str,
    format: Option<SourceFormat>,
    options: &IngestOptions,
) -> Result<IngestReport, ProcuraError> {
    let format = match format {
        Some(f) => f,
        None => infer_format_from_url(url)
            .ok_or_else(|| ProcuraError::UnsupportedFormat(url.to_string()))?,
    };
    let bytes = ingest::fetch_catalog_bytes(url)?;

    let source_name = url
        .rsplit('/')
        .next()
        .filter(|s| !s.is_empty())
        .unwrap_or(url);
    let mut report = ingest_catalog(&bytes, format, source_name, options)?;
    report.catalog.meta.source_url = url.to_string();
    Ok(report)
}

fn infer_format_from_url(url: &str) -> Option<SourceFormat> {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    let ext = path.rsplit('.').next()?;
    SourceFormat::from_extension(ext)
}

/// Turn normalized tables into catalog items, one pass per section.
///
/// Per-section problems skip only that section; the error surfaces only
/// when every data-bearing section lacks an item column, in which case no
/// partial catalog may be persisted.
pub fn build_catalog_items(
    tables: &[RawTable],
    source_name: &str,
    images: Option<&ImageAssociationMap>,
    options: &IngestOptions,
) -> Result<(Vec<CatalogItem>, Vec<SkippedSection>), ProcuraError> {
    let mut items = Vec::new();
    let mut skipped = Vec::new();
    let mut item_column_missing = false;

    for table in tables {
        if table.rows.is_empty() {
            skipped.push(SkippedSection {
                section: table.section.clone(),
                reason: "no data rows".to_string(),
            });
            continue;
        }

        let roles = match &options.role_overrides {
            Some(overrides) => overrides.clone(),
            None => classify_columns(table, &options.keywords),
        };

        match catalog::build_items(table, &roles, &options.default_currency, images) {
            Ok(section_items) => {
                if section_items.is_empty() {
                    skipped.push(SkippedSection {
                        section: table.section.clone(),
                        reason: "no items found".to_string(),
                    });
                } else {
                    items.extend(section_items);
                }
            }
            Err(ProcuraError::ItemColumnUnresolved { .. }) => {
                item_column_missing = true;
                skipped.push(SkippedSection {
                    section: table.section.clone(),
                    reason: "no item column detected".to_string(),
                });
            }
            Err(other) => return Err(other),
        }
    }

    if items.is_empty() && item_column_missing {
        return Err(ProcuraError::ItemColumnUnresolved {
            source_name: source_name.to_string(),
        });
    }

    Ok((items, skipped))
}
