//! Credit-report extraction: two source formats, one output schema. The
//! format is picked from the file extension; each segmenter turns its
//! document into the unified report structure.

pub mod dpd;
pub mod html;
pub mod normalize;
pub mod patterns;
pub mod pdf;
pub mod reasoning;
pub mod unified;

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::report::UnifiedReport;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("file not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to extract text from {}: {source}", path.display())]
    Pdf {
        path: PathBuf,
        #[source]
        source: pdf_extract::OutputError,
    },
}

/// Format-specific extraction behind a common seam.
pub trait Segmenter {
    fn extract(&self, path: &Path) -> Result<UnifiedReport, ExtractError>;
}

pub struct HtmlSegmenter;

impl Segmenter for HtmlSegmenter {
    fn extract(&self, path: &Path) -> Result<UnifiedReport, ExtractError> {
        let markup = fs::read_to_string(path).map_err(|source| ExtractError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(html::extract_from_html(&markup))
    }
}

pub struct PdfSegmenter;

impl Segmenter for PdfSegmenter {
    fn extract(&self, path: &Path) -> Result<UnifiedReport, ExtractError> {
        pdf::extract_from_path(path)
    }
}

fn segmenter_for(path: &Path) -> Result<&'static dyn Segmenter, ExtractError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();
    match ext.as_str() {
        "pdf" => Ok(&PdfSegmenter),
        "html" | "htm" => Ok(&HtmlSegmenter),
        other => Err(ExtractError::UnsupportedFormat(format!(".{other}"))),
    }
}

/// Extract one report, dispatching on the file extension. Existence is
/// checked before the format so a missing file never reports as an
/// unsupported one.
pub fn extract(path: &Path) -> Result<UnifiedReport, ExtractError> {
    if !path.exists() {
        return Err(ExtractError::NotFound(path.to_path_buf()));
    }
    segmenter_for(path)?.extract(path)
}
