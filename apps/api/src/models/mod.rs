pub mod assessment;
pub mod document;

pub use assessment::{Assessment, Decision};
pub use document::{format_file_size, Document, DocumentSummary, SourceKind};
