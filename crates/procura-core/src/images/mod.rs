pub mod pdf;
pub mod workbook;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::error::ProcuraError;
use crate::model::SourceFormat;

/// (section identifier, 1-based row) -> extracted image file.
///
/// Entries with no corresponding catalog row are silently unused; rows with
/// no entry get an empty image path. Absence is never an error.
pub type ImageAssociationMap = BTreeMap<(String, u32), PathBuf>;

/// Result of an image extraction pass over one uploaded source.
#[derive(Debug, Clone, Default)]
pub struct ExtractedImages {
    /// Images with a determinable row anchor (workbooks).
    pub anchored: ImageAssociationMap,
    /// Images without a usable anchor (PDFs, floating pictures).
    pub unanchored: Vec<PathBuf>,
}

impl ExtractedImages {
    pub fn count(&self) -> usize {
        self.anchored.len() + self.unanchored.len()
    }
}

/// Strategy seam for pulling raster images out of a binary container.
///
/// Backends are selected up front by capability; when nothing suitable is
/// available the no-op implementation runs and the upload proceeds without
/// images.
pub trait ImageExtractor: Send + Sync {
    /// Extract embedded images from `bytes`, writing files under `out_dir`.
    fn extract_images(&self, bytes: &[u8], out_dir: &Path)
        -> Result<ExtractedImages, ProcuraError>;

    /// Name of this extraction backend (for diagnostics).
    fn backend_name(&self) -> &str;
}

/// Used when the source format carries no images or no capable backend is
/// installed.
pub struct NoopImageExtractor;

impl ImageExtractor for NoopImageExtractor {
    fn extract_images(
        &self,
        _bytes: &[u8],
        _out_dir: &Path,
    ) -> Result<ExtractedImages, ProcuraError> {
        Ok(ExtractedImages::default())
    }

    fn backend_name(&self) -> &str {
        "noop"
    }
}

/// Pick the extraction backend for a source format, checking capabilities
/// once at selection time rather than at every call.
pub fn extractor_for(format: SourceFormat) -> Box<dyn ImageExtractor> {
    match format {
        SourceFormat::Csv => Box::new(NoopImageExtractor),
        SourceFormat::Xlsx => Box::new(workbook::XlsxImageExtractor),
        SourceFormat::Pdf => {
            if pdf::PdfImagesExtractor::is_available() {
                Box::new(pdf::PdfImagesExtractor)
            } else {
                warn!("pdfimages not found; catalog upload proceeds without images");
                Box::new(NoopImageExtractor)
            }
        }
    }
}

/// Keep only filesystem-friendly characters of a section name.
pub(crate) fn sanitize_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '_' })
        .collect();
    if cleaned.is_empty() {
        "sheet".to_string()
    } else {
        cleaned
    }
}
