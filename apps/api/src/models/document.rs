use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    Pdf,
    Text,
    #[default]
    Unknown,
}

/// An ingested document. `text` is already sanitized.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub id: Uuid,
    pub name: String,
    pub size: u64,
    pub text: String,
    pub source_kind: SourceKind,
    pub word_count: usize,
    pub created_at: DateTime<Utc>,
}

/// Listing view of a document: everything but the text.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentSummary {
    pub id: Uuid,
    pub name: String,
    pub size: u64,
    pub display_size: String,
    pub source_kind: SourceKind,
    pub word_count: usize,
    pub created_at: DateTime<Utc>,
}

impl From<&Document> for DocumentSummary {
    fn from(doc: &Document) -> Self {
        Self {
            id: doc.id,
            name: doc.name.clone(),
            size: doc.size,
            display_size: format_file_size(doc.size),
            source_kind: doc.source_kind,
            word_count: doc.word_count,
            created_at: doc.created_at,
        }
    }
}

/// Human-readable size: raw bytes below 1 KiB, then KB / MB with one decimal.
pub fn format_file_size(size: u64) -> String {
    const KIB: f64 = 1024.0;
    if size < 1024 {
        format!("{size} B")
    } else if size < 1024 * 1024 {
        format!("{:.1} KB", size as f64 / KIB)
    } else {
        format!("{:.1} MB", size as f64 / (KIB * KIB))
    }
}
