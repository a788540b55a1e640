//! Corpus: the in-memory set of ingested documents and their assessments.
//!
//! Mutated only by ingestion completion, explicit removal/clear and
//! assessment completion. Rankings are always recomputed from it, never stored.

pub mod handlers;

use std::collections::{HashMap, HashSet};

use tracing::{debug, info};
use uuid::Uuid;

use crate::matching::{rank_documents, KeywordDescriptor, MatchResult};
use crate::models::{Assessment, Document};

/// How `add_documents` treats a file already present in the corpus.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DedupPolicy {
    /// Skip documents whose (name, size) pair is already present.
    #[default]
    ByNameAndSize,
    KeepAll,
}

/// Result of merging a batch of new documents.
#[derive(Debug, Default)]
pub struct AddOutcome {
    pub added: Vec<Uuid>,
    pub skipped_duplicates: Vec<String>,
}

#[derive(Debug, Default)]
pub struct Corpus {
    documents: Vec<Document>,
    assessments: HashMap<Uuid, Assessment>,
}

impl Corpus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn get(&self, id: Uuid) -> Option<&Document> {
        self.documents.iter().find(|d| d.id == id)
    }

    pub fn contains(&self, id: Uuid) -> bool {
        self.get(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn assessments(&self) -> &HashMap<Uuid, Assessment> {
        &self.assessments
    }

    /// Appends a settled ingestion batch. Under `ByNameAndSize` a second copy
    /// within the same batch is skipped too.
    pub fn add_documents(&mut self, documents: Vec<Document>, policy: DedupPolicy) -> AddOutcome {
        let mut outcome = AddOutcome::default();
        let mut known: HashSet<(String, u64)> = self
            .documents
            .iter()
            .map(|d| (d.name.clone(), d.size))
            .collect();

        for document in documents {
            if policy == DedupPolicy::ByNameAndSize
                && !known.insert((document.name.clone(), document.size))
            {
                debug!("Skipping duplicate '{}' ({} bytes)", document.name, document.size);
                outcome.skipped_duplicates.push(document.name);
                continue;
            }
            outcome.added.push(document.id);
            self.documents.push(document);
        }

        info!(
            "Corpus now holds {} documents ({} added, {} duplicates skipped)",
            self.documents.len(),
            outcome.added.len(),
            outcome.skipped_duplicates.len()
        );
        outcome
    }

    /// Removes a document and its assessment, if any.
    pub fn remove(&mut self, id: Uuid) -> Option<Document> {
        let idx = self.documents.iter().position(|d| d.id == id)?;
        self.assessments.remove(&id);
        Some(self.documents.remove(idx))
    }

    pub fn clear(&mut self) {
        self.documents.clear();
        self.assessments.clear();
    }

    /// Stores assessments whose document is still present, overwriting older ones.
    /// Returns the ids discarded because their document is gone.
    pub fn merge_assessments(&mut self, assessments: HashMap<Uuid, Assessment>) -> Vec<Uuid> {
        let mut discarded = Vec::new();
        for (id, assessment) in assessments {
            if self.contains(id) {
                self.assessments.insert(id, assessment);
            } else {
                debug!("Discarding assessment for removed document {id}");
                discarded.push(id);
            }
        }
        discarded
    }

    pub fn rank(&self, descriptors: &[KeywordDescriptor]) -> Vec<MatchResult> {
        rank_documents(&self.documents, descriptors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Decision, SourceKind};
    use chrono::Utc;

    fn make_doc(name: &str, size: u64) -> Document {
        Document {
            id: Uuid::new_v4(),
            name: name.to_string(),
            size,
            text: format!("{name} text"),
            source_kind: SourceKind::Text,
            word_count: 2,
            created_at: Utc::now(),
        }
    }

    fn make_assessment(doc_id: Uuid, score: f64) -> Assessment {
        Assessment {
            doc_id,
            score,
            decision: Decision::Yes,
            summary: String::new(),
            strengths: vec![],
            missing_skills: vec![],
            risks: vec![],
            raw_response: "{}".to_string(),
        }
    }

    #[test]
    fn test_duplicate_name_and_size_is_skipped() {
        let mut corpus = Corpus::new();
        corpus.add_documents(vec![make_doc("cv.pdf", 100)], DedupPolicy::default());

        let outcome = corpus.add_documents(
            vec![make_doc("cv.pdf", 100), make_doc("cv.pdf", 101)],
            DedupPolicy::default(),
        );
        assert_eq!(corpus.len(), 2);
        assert_eq!(outcome.added.len(), 1);
        assert_eq!(outcome.skipped_duplicates, vec!["cv.pdf"]);
    }

    #[test]
    fn test_duplicates_within_one_batch_are_skipped() {
        let mut corpus = Corpus::new();
        let outcome = corpus.add_documents(
            vec![make_doc("a.txt", 5), make_doc("a.txt", 5)],
            DedupPolicy::ByNameAndSize,
        );
        assert_eq!(corpus.len(), 1);
        assert_eq!(outcome.skipped_duplicates.len(), 1);
    }

    #[test]
    fn test_keep_all_policy_allows_duplicates() {
        let mut corpus = Corpus::new();
        corpus.add_documents(vec![make_doc("a.txt", 5)], DedupPolicy::KeepAll);
        corpus.add_documents(vec![make_doc("a.txt", 5)], DedupPolicy::KeepAll);
        assert_eq!(corpus.len(), 2);
    }

    #[test]
    fn test_remove_cascades_assessment() {
        let mut corpus = Corpus::new();
        let doc = make_doc("a.txt", 5);
        let id = doc.id;
        corpus.add_documents(vec![doc], DedupPolicy::default());
        corpus.merge_assessments(HashMap::from([(id, make_assessment(id, 80.0))]));
        assert!(corpus.assessments().contains_key(&id));

        let removed = corpus.remove(id).unwrap();
        assert_eq!(removed.id, id);
        assert!(corpus.is_empty());
        assert!(!corpus.assessments().contains_key(&id));
        assert!(corpus.remove(id).is_none());
    }

    #[test]
    fn test_merge_discards_results_for_removed_documents() {
        let mut corpus = Corpus::new();
        let kept = make_doc("kept.txt", 1);
        let gone = make_doc("gone.txt", 2);
        let (kept_id, gone_id) = (kept.id, gone.id);
        corpus.add_documents(vec![kept, gone], DedupPolicy::default());

        // removal races with an in-flight batch
        corpus.remove(gone_id);
        let discarded = corpus.merge_assessments(HashMap::from([
            (kept_id, make_assessment(kept_id, 10.0)),
            (gone_id, make_assessment(gone_id, 20.0)),
        ]));

        assert_eq!(discarded, vec![gone_id]);
        assert_eq!(corpus.assessments().len(), 1);
        assert!(!corpus.assessments().contains_key(&gone_id));
    }

    #[test]
    fn test_later_assessment_overwrites_earlier() {
        let mut corpus = Corpus::new();
        let doc = make_doc("a.txt", 5);
        let id = doc.id;
        corpus.add_documents(vec![doc], DedupPolicy::default());
        corpus.merge_assessments(HashMap::from([(id, make_assessment(id, 10.0))]));
        corpus.merge_assessments(HashMap::from([(id, make_assessment(id, 90.0))]));
        assert_eq!(corpus.assessments()[&id].score, 90.0);
    }

    #[test]
    fn test_clear_drops_everything() {
        let mut corpus = Corpus::new();
        let doc = make_doc("a.txt", 5);
        let id = doc.id;
        corpus.add_documents(vec![doc], DedupPolicy::default());
        corpus.merge_assessments(HashMap::from([(id, make_assessment(id, 50.0))]));
        corpus.clear();
        assert!(corpus.is_empty());
        assert!(corpus.assessments().is_empty());
    }

    #[test]
    fn test_rank_uses_current_documents() {
        let mut corpus = Corpus::new();
        corpus.add_documents(
            vec![make_doc("go.txt", 1), make_doc("rust.txt", 2)],
            DedupPolicy::default(),
        );
        let ranked = corpus.rank(&crate::matching::parse_keywords("rust"));
        assert_eq!(ranked[0].document.name, "rust.txt");
        assert_eq!(ranked.len(), 2);
    }
}
