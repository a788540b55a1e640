//! PDF text extraction. Treated as an opaque collaborator: bytes in, page texts out.

use crate::ingest::IngestError;

/// Extracts an ordered list of per-page texts from PDF bytes.
///
/// Implementations may be CPU heavy; callers run them on the blocking pool.
pub trait PdfTextExtractor: Send + Sync {
    fn extract_pages(&self, bytes: &[u8]) -> Result<Vec<String>, IngestError>;
}

/// Default extractor backed by the `pdf-extract` crate.
#[derive(Debug, Default, Clone, Copy)]
pub struct PdfExtractBackend;

impl PdfTextExtractor for PdfExtractBackend {
    fn extract_pages(&self, bytes: &[u8]) -> Result<Vec<String>, IngestError> {
        pdf_extract::extract_text_from_mem_by_pages(bytes)
            .map_err(|e| IngestError::ExtractionFailed(format!("could not read PDF: {e}")))
    }
}
