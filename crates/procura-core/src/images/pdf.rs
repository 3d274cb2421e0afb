use std::io::Write;
use std::path::Path;
use std::process::Command;

use tracing::warn;

use crate::error::ProcuraError;
use crate::images::{ExtractedImages, ImageExtractor};

/// Extracts raster images from a PDF using `pdfimages` (poppler-utils).
///
/// PDF image placement is not reliably tied to table rows, so the result is
/// an unanchored list of files only; PDF-sourced catalog items never get an
/// image path. Tool failures degrade to "no images extracted" since image
/// extraction must never block a catalog upload.
pub struct PdfImagesExtractor;

const FILE_PREFIX: &str = "pdfimg";

impl PdfImagesExtractor {
    /// Check if pdfimages is available on the system.
    pub fn is_available() -> bool {
        Command::new("pdfimages")
            .arg("-v")
            .output()
            .map(|o| o.status.success() || !o.stderr.is_empty())
            .unwrap_or(false)
    }
}

impl ImageExtractor for PdfImagesExtractor {
    fn extract_images(
        &self,
        bytes: &[u8],
        out_dir: &Path,
    ) -> Result<ExtractedImages, ProcuraError> {
        std::fs::create_dir_all(out_dir)?;

        let mut tmpfile = tempfile::NamedTempFile::new()?;
        tmpfile.write_all(bytes)?;

        let prefix = out_dir.join(FILE_PREFIX);
        let output = Command::new("pdfimages")
            .arg("-png")
            .arg(tmpfile.path())
            .arg(&prefix)
            .output();

        match output {
            Ok(o) if o.status.success() => {}
            Ok(o) => {
                let stderr = String::from_utf8_lossy(&o.stderr);
                warn!("pdfimages failed, continuing without images: {stderr}");
                return Ok(ExtractedImages::default());
            }
            Err(e) => {
                warn!("pdfimages could not run, continuing without images: {e}");
                return Ok(ExtractedImages::default());
            }
        }

        let mut result = ExtractedImages::default();
        for entry in std::fs::read_dir(out_dir)? {
            let entry = entry?;
            let name = entry.file_name();
            if name.to_string_lossy().starts_with(FILE_PREFIX) {
                result.unanchored.push(entry.path());
            }
        }
        result.unanchored.sort();

        Ok(result)
    }

    fn backend_name(&self) -> &str {
        "pdfimages"
    }
}
