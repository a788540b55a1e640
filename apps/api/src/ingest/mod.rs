//! Document ingestion: uploaded files in, sanitized `Document`s out.
//!
//! Every file is processed on its own blocking task. A failing (or panicking)
//! file becomes one entry in `IngestBatch::failures` and nothing else.

pub mod pdf;

use std::sync::Arc;

use bytes::Bytes;
use chrono::Utc;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::models::{Document, SourceKind};

pub use pdf::{PdfExtractBackend, PdfTextExtractor};

const PDF_MIME: &str = "application/pdf";
const TEXT_EXTENSIONS: &[&str] = &["txt", "md", "markdown"];

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Unsupported format: upload a PDF or a plain-text file")]
    UnsupportedFormat,

    #[error("Empty document: no text could be extracted")]
    EmptyDocument,

    #[error("Extraction failed: {0}")]
    ExtractionFailed(String),
}

/// A file as received from the caller.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub name: String,
    pub mime_type: String,
    pub bytes: Bytes,
}

impl UploadedFile {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            bytes: bytes.into(),
        }
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct IngestFailure {
    pub name: String,
    pub reason: String,
}

/// Outcome of one batch. `documents.len() + failures.len()` equals the input count.
#[derive(Debug, Default)]
pub struct IngestBatch {
    pub documents: Vec<Document>,
    pub failures: Vec<IngestFailure>,
}

/// Ingests all files concurrently and waits for every one of them to settle.
/// Both output lists keep input order.
pub async fn ingest_batch(
    files: Vec<UploadedFile>,
    extractor: Arc<dyn PdfTextExtractor>,
) -> IngestBatch {
    let mut batch = IngestBatch::default();
    if files.is_empty() {
        return batch;
    }

    let total = files.len();
    let handles: Vec<_> = files
        .into_iter()
        .map(|file| {
            let name = file.name.clone();
            let extractor = Arc::clone(&extractor);
            let handle = tokio::task::spawn_blocking(move || ingest_file(&file, extractor.as_ref()));
            (name, handle)
        })
        .collect();

    for (name, handle) in handles {
        let outcome = match handle.await {
            Ok(outcome) => outcome,
            Err(e) => Err(IngestError::ExtractionFailed(format!(
                "extraction aborted unexpectedly ({e})"
            ))),
        };
        match outcome {
            Ok(document) => {
                debug!(
                    "Ingested '{}' ({:?}, {} words)",
                    document.name, document.source_kind, document.word_count
                );
                batch.documents.push(document);
            }
            Err(e) => {
                warn!("Skipping '{name}': {e}");
                batch.failures.push(IngestFailure {
                    name,
                    reason: e.to_string(),
                });
            }
        }
    }

    info!(
        "Ingestion batch settled: {} of {} files accepted",
        batch.documents.len(),
        total
    );
    batch
}

/// Builds one `Document` from one file. Synchronous; may block on PDF parsing.
pub fn ingest_file(
    file: &UploadedFile,
    extractor: &dyn PdfTextExtractor,
) -> Result<Document, IngestError> {
    let source_kind = classify(&file.name, &file.mime_type)?;

    let raw = match source_kind {
        SourceKind::Pdf => extractor.extract_pages(&file.bytes)?.join("\n"),
        _ => String::from_utf8_lossy(&file.bytes).into_owned(),
    };

    let text = sanitize_text(&raw);
    if text.is_empty() {
        return Err(IngestError::EmptyDocument);
    }
    let word_count = text.split_whitespace().count();

    Ok(Document {
        id: Uuid::new_v4(),
        name: file.name.clone(),
        size: file.size(),
        text,
        source_kind,
        word_count,
        created_at: Utc::now(),
    })
}

/// PDF wins over text when both signals are present.
pub fn classify(name: &str, mime_type: &str) -> Result<SourceKind, IngestError> {
    let extension = file_extension(name);
    let mime = mime_type.trim().to_ascii_lowercase();

    if mime == PDF_MIME || extension == "pdf" {
        Ok(SourceKind::Pdf)
    } else if TEXT_EXTENSIONS.contains(&extension.as_str()) || mime.starts_with("text/") {
        Ok(SourceKind::Text)
    } else {
        Err(IngestError::UnsupportedFormat)
    }
}

/// Lower-cased text after the last '.', or empty when there is none.
fn file_extension(name: &str) -> String {
    name.rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default()
}

/// Unifies line endings, squeezes horizontal whitespace, caps blank lines at one,
/// and trims. Idempotent.
pub fn sanitize_text(raw: &str) -> String {
    let unified = raw.replace("\r\n", "\n").replace('\r', "\n");

    let mut out = String::with_capacity(unified.len());
    let mut pending_space = false;
    let mut newline_run = 0usize;

    for ch in unified.chars() {
        if ch == '\n' {
            if pending_space {
                out.push(' ');
                pending_space = false;
                newline_run = 0;
            }
            newline_run += 1;
            if newline_run <= 2 {
                out.push('\n');
            }
        } else if ch.is_whitespace() {
            pending_space = true;
        } else {
            if pending_space {
                out.push(' ');
                pending_space = false;
            }
            newline_run = 0;
            out.push(ch);
        }
    }

    out.trim().to_string()
}
