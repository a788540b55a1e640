use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Qualitative verdict returned by the remote assessment service.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    StrongYes,
    Yes,
    #[default]
    Maybe,
    No,
}

impl Decision {
    /// Maps the service's free-text decision onto a variant.
    ///
    /// Rules are checked in order; the first hit wins:
    /// 1. contains "strong" → `StrongYes`
    /// 2. equals "yes" or contains "good" → `Yes`
    /// 3. contains "maybe" or "borderline" → `Maybe`
    /// 4. contains "no" or "reject" → `No`
    /// 5. anything else, including a missing value → `Maybe`
    pub fn from_label(label: Option<&str>) -> Self {
        let label = label.unwrap_or_default().trim().to_lowercase();
        if label.contains("strong") {
            Decision::StrongYes
        } else if label == "yes" || label.contains("good") {
            Decision::Yes
        } else if label.contains("maybe") || label.contains("borderline") {
            Decision::Maybe
        } else if label.contains("no") || label.contains("reject") {
            Decision::No
        } else {
            Decision::default()
        }
    }
}

/// One document's remote assessment. Lives next to the ranking, never inside it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assessment {
    pub doc_id: Uuid,
    pub score: f64, // 0 – 100
    pub decision: Decision,
    pub summary: String,
    pub strengths: Vec<String>,
    pub missing_skills: Vec<String>,
    pub risks: Vec<String>,
    pub raw_response: String,
}
