pub mod delimited;
pub mod pdf;
pub mod workbook;

use std::time::Duration;

use crate::error::ProcuraError;
use crate::model::{RawTable, SourceFormat};
use crate::table::{normalize_table, NormalizerConfig};

/// Timeout for catalog URL fetches.
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Load raw bytes into normalized tables, dispatching on the source format.
///
/// - Delimited text parses into one table with headers and origin rows
///   already in place.
/// - Workbooks produce one table per sheet, header position detected by the
///   normalizer; sheet names are preserved for image association.
/// - PDFs produce one table per detected tabular region, first row promoted
///   to header, then the normalizer runs as a safety net.
pub fn load_tables(
    bytes: &[u8],
    format: SourceFormat,
    source_name: &str,
    config: &NormalizerConfig,
) -> Result<Vec<RawTable>, ProcuraError> {
    let tables = match format {
        SourceFormat::Csv => vec![delimited::parse_delimited(bytes, source_name)?],
        SourceFormat::Xlsx => workbook::parse_workbook(bytes)?,
        SourceFormat::Pdf => pdf::PdftotextTables::extract_tables(bytes)?,
    };

    Ok(tables
        .into_iter()
        .map(|t| normalize_table(t, config))
        .collect())
}

/// Fetch catalog bytes over HTTP. A non-2xx response is a hard failure; the
/// upload attempt is abandoned and the caller must re-trigger ingestion.
pub fn fetch_catalog_bytes(url: &str) -> Result<Vec<u8>, ProcuraError> {
    let client = reqwest::blocking::Client::builder()
        .timeout(FETCH_TIMEOUT)
        .build()
        .map_err(|e| ProcuraError::Fetch {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

    let response = client.get(url).send().map_err(|e| ProcuraError::Fetch {
        url: url.to_string(),
        reason: e.to_string(),
    })?;

    let status = response.status();
    if !status.is_success() {
        return Err(ProcuraError::FetchStatus {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    let body = response.bytes().map_err(|e| ProcuraError::Fetch {
        url: url.to_string(),
        reason: e.to_string(),
    })?;
    Ok(body.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roles::{classify_columns, ColumnRole, RoleKeywords};

    #[test]
    fn csv_load_is_ready_for_classification() {
        let csv = b"Item,Description,Price\nChair,Oak dining chair,45.00\n";
        let tables = load_tables(
            csv,
            SourceFormat::Csv,
            "catalog.csv",
            &NormalizerConfig::default(),
        )
        .unwrap();
        assert_eq!(tables.len(), 1);

        let roles = classify_columns(&tables[0], &RoleKeywords::default());
        assert_eq!(roles.column(ColumnRole::Item), Some("Item"));
        assert_eq!(roles.column(ColumnRole::Price), Some("Price"));
    }
}
