use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ProcuraError {
    #[error("unreadable source: {0}")]
    UnreadableSource(String),

    #[error("failed to fetch {url}: {reason}")]
    Fetch { url: String, reason: String },

    #[error("fetch of {url} returned HTTP {status}")]
    FetchStatus { url: String, status: u16 },

    #[error("pdftotext not found. Install poppler: brew install poppler (macOS) or apt install poppler-utils (Linux)")]
    PdftotextNotFound,

    #[error("pdftotext failed with exit code {code}: {stderr}")]
    PdftotextFailed { code: i32, stderr: String },

    #[error("could not detect an item column in '{source_name}'. Assign column roles manually and retry")]
    ItemColumnUnresolved { source_name: String },

    #[error("failed to parse catalog source: {0}")]
    Parse(String),

    #[error("unsupported source format '{0}'. Expected csv, xlsx, xls or pdf")]
    UnsupportedFormat(String),

    #[error("failed to load procurement items from {path}: {reason}")]
    ItemsLoad { path: PathBuf, reason: String },

    #[error("catalog store error at {path}: {reason}")]
    Store { path: PathBuf, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
