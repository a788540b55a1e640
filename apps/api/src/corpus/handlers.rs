//! Axum route handlers for documents, rankings and assessments.

use std::collections::HashMap;

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::assessment::{run_assessment_batch, AssessmentFailure};
use crate::errors::AppError;
use crate::ingest::{ingest_batch, IngestFailure, UploadedFile};
use crate::matching::{parse_keywords, KeywordDescriptor, KeywordMatch, MatchResult};
use crate::models::{Assessment, DocumentSummary};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub added: Vec<DocumentSummary>,
    pub skipped_duplicates: Vec<String>,
    pub failures: Vec<IngestFailure>,
}

#[derive(Debug, Deserialize)]
pub struct RankRequest {
    #[serde(default)]
    pub keywords: String,
}

/// One ranked document as shown to the caller (no full text).
#[derive(Debug, Serialize)]
pub struct RankedEntry {
    pub rank: usize,
    pub document: DocumentSummary,
    pub score: f64,
    pub normalized_score: f64,
    pub coverage: f64,
    pub matched_keywords: Vec<KeywordMatch>,
    pub highlighted_sentences: Vec<String>,
}

impl RankedEntry {
    fn new(rank: usize, result: MatchResult) -> Self {
        Self {
            rank,
            document: DocumentSummary::from(&result.document),
            score: result.score,
            normalized_score: result.normalized_score,
            coverage: result.coverage,
            matched_keywords: result.matched_keywords,
            highlighted_sentences: result.highlighted_sentences,
        }
    }
}

/// Keyword ranking with the stored assessments alongside, keyed by document id.
#[derive(Debug, Serialize)]
pub struct RankingResponse {
    pub keywords: Vec<KeywordDescriptor>,
    pub results: Vec<RankedEntry>,
    pub assessments: HashMap<Uuid, Assessment>,
}

#[derive(Debug, Deserialize)]
pub struct AssessRequest {
    #[serde(default)]
    pub keywords: String,
    pub max_excerpt_chars: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct AssessResponse {
    pub assessments: HashMap<Uuid, Assessment>,
    pub failures: Vec<AssessmentFailure>,
    /// Results dropped because their document was removed mid-batch.
    pub discarded: Vec<Uuid>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/documents
pub async fn handle_list_documents(State(state): State<AppState>) -> Json<Vec<DocumentSummary>> {
    let corpus = state.corpus.read().await;
    Json(corpus.documents().iter().map(DocumentSummary::from).collect())
}

/// POST /api/v1/documents
///
/// Multipart upload; every field carrying a file name is one document.
/// The corpus is only touched once the whole batch has settled.
pub async fn handle_upload_documents(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    let mut files = Vec::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Malformed multipart body: {e}")))?
    {
        let Some(name) = field.file_name().map(str::to_string) else {
            continue;
        };
        let mime_type = field.content_type().unwrap_or_default().to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("Could not read '{name}': {e}")))?;
        files.push(UploadedFile::new(name, mime_type, bytes));
    }

    let batch = ingest_batch(files, state.pdf.clone()).await;

    let mut corpus = state.corpus.write().await;
    let outcome = corpus.add_documents(batch.documents, state.dedup);
    let added = outcome
        .added
        .iter()
        .filter_map(|id| corpus.get(*id))
        .map(DocumentSummary::from)
        .collect();

    Ok(Json(UploadResponse {
        added,
        skipped_duplicates: outcome.skipped_duplicates,
        failures: batch.failures,
    }))
}

/// DELETE /api/v1/documents/:id
pub async fn handle_remove_document(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let removed = state.corpus.write().await.remove(id);
    match removed {
        Some(doc) => {
            info!("Removed document '{}'", doc.name);
            Ok(StatusCode::NO_CONTENT)
        }
        None => Err(AppError::NotFound(format!("Document {id} not found"))),
    }
}

/// DELETE /api/v1/documents
pub async fn handle_clear_documents(State(state): State<AppState>) -> StatusCode {
    state.corpus.write().await.clear();
    info!("Corpus cleared");
    StatusCode::NO_CONTENT
}

/// POST /api/v1/rankings
///
/// Recomputed from scratch on every call; nothing is cached.
pub async fn handle_rank(
    State(state): State<AppState>,
    Json(request): Json<RankRequest>,
) -> Json<RankingResponse> {
    let keywords = parse_keywords(&request.keywords);
    let corpus = state.corpus.read().await;

    let results = corpus
        .rank(&keywords)
        .into_iter()
        .enumerate()
        .map(|(idx, result)| RankedEntry::new(idx + 1, result))
        .collect();

    Json(RankingResponse {
        keywords,
        results,
        assessments: corpus.assessments().clone(),
    })
}

/// POST /api/v1/assessments
///
/// Snapshots the corpus, releases the lock for the (slow, sequential) remote
/// batch, then merges. Results for documents removed meanwhile are dropped.
pub async fn handle_assess(
    State(state): State<AppState>,
    Json(request): Json<AssessRequest>,
) -> Json<AssessResponse> {
    let keywords = parse_keywords(&request.keywords);
    let max_chars = request
        .max_excerpt_chars
        .unwrap_or(state.config.llm.max_excerpt_chars);
    let documents = state.corpus.read().await.documents().to_vec();

    let mut batch = run_assessment_batch(state.llm.as_ref(), &documents, &keywords, max_chars).await;

    let discarded = state
        .corpus
        .write()
        .await
        .merge_assessments(batch.assessments.clone());
    for id in &discarded {
        batch.assessments.remove(id);
    }

    Json(AssessResponse {
        assessments: batch.assessments,
        failures: batch.failures,
        discarded,
    })
}

/// GET /api/v1/assessments
pub async fn handle_list_assessments(
    State(state): State<AppState>,
) -> Json<HashMap<Uuid, Assessment>> {
    Json(state.corpus.read().await.assessments().clone())
}
