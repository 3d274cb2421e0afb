use std::path::{Path, PathBuf};

use procura_core::error::ProcuraError;
use procura_core::model::SourceFormat;
use procura_core::{ingest_catalog, ingest_catalog_from_url, IngestOptions, IngestReport};

use crate::output;

pub fn run(
    input: &str,
    format: Option<&str>,
    currency: String,
    images_dir: Option<PathBuf>,
    output_format: &str,
    output_file: Option<PathBuf>,
) -> Result<(), ProcuraError> {
    let format = match format {
        Some(f) => Some(
            SourceFormat::from_extension(f)
                .ok_or_else(|| ProcuraError::UnsupportedFormat(f.to_string()))?,
        ),
        None => None,
    };

    let options = IngestOptions {
        default_currency: currency,
        image_dir: images_dir,
        ..IngestOptions::default()
    };

    let report = if input.starts_with("http://") || input.starts_with("https://") {
        ingest_catalog_from_url(input, format, &options)?
    } else {
        let path = Path::new(input);
        let format = match format {
            Some(f) => f,
            None => path
                .extension()
                .and_then(|ext| ext.to_str())
                .and_then(SourceFormat::from_extension)
                .ok_or_else(|| ProcuraError::UnsupportedFormat(input.to_string()))?,
        };
        let bytes = std::fs::read(path)?;
        let source_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| input.to_string());
        ingest_catalog(&bytes, format, &source_name, &options)?
    };

    match output_format {
        "json" => output::json::print(&report)?,
        _ => print!("{}", output::table::format_ingest(&report)),
    }

    if let Some(path) = output_file {
        let json = serde_json::to_string_pretty(&report.catalog)?;
        std::fs::write(&path, json)?;
        eprintln!(
            "Saved {} item(s) to {}",
            report.catalog.items.len(),
            path.display()
        );
    }

    report_skips(&report);
    Ok(())
}

fn report_skips(report: &IngestReport) {
    if !report.skipped.is_empty() {
        eprintln!("{} section(s) skipped:", report.skipped.len());
        for skip in &report.skipped {
            eprintln!("  {}: {}", skip.section, skip.reason);
        }
    }
}
