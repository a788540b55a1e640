use std::sync::Arc;

use tokio::sync::RwLock;

use crate::config::Config;
use crate::corpus::{Corpus, DedupPolicy};
use crate::ingest::PdfTextExtractor;
use crate::llm_client::ChatBackend;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub corpus: Arc<RwLock<Corpus>>,
    /// Pluggable assessment backend. Default: `LlmClient` against Ollama.
    pub llm: Arc<dyn ChatBackend>,
    pub pdf: Arc<dyn PdfTextExtractor>,
    pub dedup: DedupPolicy,
    pub config: Config,
}

impl AppState {
    pub fn new(config: Config, llm: Arc<dyn ChatBackend>, pdf: Arc<dyn PdfTextExtractor>) -> Self {
        Self {
            corpus: Arc::new(RwLock::new(Corpus::new())),
            llm,
            pdf,
            dedup: DedupPolicy::default(),
            config,
        }
    }
}
