//! LLM Augmentor: optional qualitative assessment of each document.
//!
//! Runs as an explicit batch over a snapshot of the corpus. Calls are strictly
//! sequential so a locally hosted model is never flooded. The result sits next
//! to the keyword ranking; the two scores are never combined.

pub mod parse;

use std::collections::HashMap;

use serde::Serialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::llm_client::prompts::{
    ASSESSMENT_PROMPT_TEMPLATE, ASSESSMENT_SYSTEM, NO_KEYWORDS_PLACEHOLDER,
};
use crate::llm_client::{ChatBackend, LlmError};
use crate::matching::KeywordDescriptor;
use crate::models::{Assessment, Document};

pub use parse::parse_assessment;

#[derive(Debug, Clone, Serialize)]
pub struct AssessmentFailure {
    pub doc_id: Uuid,
    pub name: String,
    pub error: String,
}

#[derive(Debug, Default)]
pub struct AssessmentBatch {
    pub assessments: HashMap<Uuid, Assessment>,
    pub failures: Vec<AssessmentFailure>,
}

/// Assesses every document in order, one remote call at a time.
///
/// A failing document is recorded in `failures` and the worklist moves on.
pub async fn run_assessment_batch(
    backend: &dyn ChatBackend,
    documents: &[Document],
    descriptors: &[KeywordDescriptor],
    max_excerpt_chars: usize,
) -> AssessmentBatch {
    let mut batch = AssessmentBatch::default();

    for document in documents {
        let prompt = build_prompt(document, descriptors, max_excerpt_chars);
        match assess_document(backend, document.id, &prompt).await {
            Ok(assessment) => {
                debug!(
                    "Assessed '{}': {:?} ({})",
                    document.name, assessment.decision, assessment.score
                );
                batch.assessments.insert(document.id, assessment);
            }
            Err(e) => {
                warn!("Assessment failed for '{}': {e}", document.name);
                batch.failures.push(AssessmentFailure {
                    doc_id: document.id,
                    name: document.name.clone(),
                    error: e.to_string(),
                });
            }
        }
    }

    info!(
        "Assessment batch finished: {} succeeded, {} failed",
        batch.assessments.len(),
        batch.failures.len()
    );
    batch
}

async fn assess_document(
    backend: &dyn ChatBackend,
    doc_id: Uuid,
    prompt: &str,
) -> Result<Assessment, LlmError> {
    let reply = backend.chat(ASSESSMENT_SYSTEM, prompt).await?;
    if reply.trim().is_empty() {
        return Err(LlmError::EmptyResponse);
    }
    parse_assessment(doc_id, &reply)
}

/// Keyword labels plus a plain truncation of the document text. Never summarized.
pub fn build_prompt(
    document: &Document,
    descriptors: &[KeywordDescriptor],
    max_excerpt_chars: usize,
) -> String {
    let keywords = if descriptors.is_empty() {
        NO_KEYWORDS_PLACEHOLDER.to_string()
    } else {
        descriptors
            .iter()
            .map(|d| d.label.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    };
    let excerpt = truncate_chars(&document.text, max_excerpt_chars);

    let excerpt_chars = excerpt.chars().count().to_string();
    let total_chars = document.text.chars().count().to_string();

    fill_template(
        ASSESSMENT_PROMPT_TEMPLATE,
        &[
            ("keywords", keywords.as_str()),
            ("excerpt_chars", excerpt_chars.as_str()),
            ("total_chars", total_chars.as_str()),
            ("excerpt", excerpt),
        ],
    )
}

/// Substitutes `{name}` placeholders in a single scan of the template.
/// Inserted values are never rescanned; unknown braces are copied through.
fn fill_template(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let tail = &rest[start + 1..];
        let hit = values.iter().find(|(key, _)| {
            tail.strip_prefix(*key)
                .is_some_and(|after| after.starts_with('}'))
        });
        match hit {
            Some((key, value)) => {
                out.push_str(value);
                rest = &tail[key.len() + 1..];
            }
            None => {
                out.push('{');
                rest = tail;
            }
        }
    }
    out.push_str(rest);
    out
}

/// Prefix of at most `max_chars` characters, cut on a char boundary.
fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}
