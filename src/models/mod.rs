// Data models matching the frontend TypeScript types

pub mod enhancement;

pub use enhancement::{
    EnhancementItem, EnhancementResult, PrdEnhancementResult, PrdSection, PrdSections,
    SectionImprovement,
};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Which document collection an entity belongs to
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum DocumentKind {
    #[serde(rename = "code-review")]
    CodeReview,
    #[serde(rename = "prd")]
    Prd,
}

impl DocumentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentKind::CodeReview => "code-review",
            DocumentKind::Prd => "prd",
        }
    }

    /// Backing collection file inside the data directory
    pub fn collection_file(&self) -> &'static str {
        match self {
            DocumentKind::CodeReview => "reviews.json",
            DocumentKind::Prd => "prds.json",
        }
    }
}

impl std::fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A persisted document as stored by the file-backed store.
///
/// The store owns this shape; editing sessions work on a diverging copy of
/// `data` until a save flushes it back.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SavedDocument {
    pub id: String,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
    #[serde(flatten)]
    pub payload: DocumentPayload,
}

/// Tagged form payload: `type` discriminates, `data` carries the form
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "data")]
pub enum DocumentPayload {
    #[serde(rename = "code-review")]
    CodeReview(CodeReviewForm),
    #[serde(rename = "prd")]
    Prd(PrdForm),
}

impl DocumentPayload {
    pub fn kind(&self) -> DocumentKind {
        match self {
            DocumentPayload::CodeReview(_) => DocumentKind::CodeReview,
            DocumentPayload::Prd(_) => DocumentKind::Prd,
        }
    }
}

impl SavedDocument {
    /// Create a fresh document shell. The id is assigned here, once, and
    /// never reassigned afterwards.
    pub fn new(title: impl Into<String>, payload: DocumentPayload) -> Self {
        let now = Utc::now();
        SavedDocument {
            id: Uuid::new_v4().to_string(),
            title: title.into(),
            created_at: now,
            modified_at: now,
            payload,
        }
    }
}

// =============================================================================
// Code review form
// =============================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RequirementStatus {
    Verified,
    #[default]
    Incomplete,
    Missing,
}

impl RequirementStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequirementStatus::Verified => "VERIFIED",
            RequirementStatus::Incomplete => "INCOMPLETE",
            RequirementStatus::Missing => "MISSING",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GapStatus {
    #[default]
    Open,
    Resolved,
    WontDo,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecommendationStatus {
    #[default]
    Open,
    Done,
    WontFix,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RequirementItem {
    pub id: String,
    #[serde(default)]
    pub status: RequirementStatus,
    pub description: String,
}

impl RequirementItem {
    pub fn new(description: impl Into<String>) -> Self {
        RequirementItem {
            id: Uuid::new_v4().to_string(),
            status: RequirementStatus::Incomplete,
            description: description.into(),
        }
    }
}

/// A gap in requirements coverage.
///
/// `note` is meaningful only while `status == Resolved`, `reason` only while
/// `status == WontDo`; the transition helpers keep the other cleared.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GapItem {
    pub id: String,
    pub description: String,
    #[serde(default)]
    pub status: GapStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl GapItem {
    pub fn open(description: impl Into<String>) -> Self {
        GapItem {
            id: Uuid::new_v4().to_string(),
            description: description.into(),
            status: GapStatus::Open,
            note: None,
            reason: None,
        }
    }

    pub fn resolve(&mut self, note: Option<String>) {
        self.status = GapStatus::Resolved;
        self.note = note;
        self.reason = None;
    }

    pub fn wont_do(&mut self, reason: Option<String>) {
        self.status = GapStatus::WontDo;
        self.reason = reason;
        self.note = None;
    }

    pub fn reopen(&mut self) {
        self.status = GapStatus::Open;
        self.note = None;
        self.reason = None;
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationItem {
    pub id: String,
    pub description: String,
    #[serde(default)]
    pub status: RecommendationStatus,
    /// Meaningful only while `status == WontFix`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl RecommendationItem {
    pub fn new(description: impl Into<String>) -> Self {
        RecommendationItem {
            id: Uuid::new_v4().to_string(),
            description: description.into(),
            status: RecommendationStatus::Open,
            reason: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct OutOfScopeItem {
    pub id: String,
    pub title: String,
    pub acceptance_criteria: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct CodeReviewForm {
    pub title: String,
    pub author: String,
    pub author_role: String,
    pub related_prd: String,
    pub related_issue: String,
    pub requirements: Vec<RequirementItem>,
    pub gaps: Vec<GapItem>,
    pub recommendations: Vec<RecommendationItem>,
    pub out_of_scope: Vec<OutOfScopeItem>,
}

// =============================================================================
// PRD form
// =============================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum PrdStatus {
    #[default]
    Draft,
    #[serde(rename = "In Review")]
    InReview,
    Approved,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct PrdMeta {
    pub author: String,
    pub status: PrdStatus,
    pub version: String,
    pub product_area: String,
    pub engineering_lead: String,
    pub design_lead: String,
    pub pmm: String,
    pub stakeholders: String,
    pub target_launch: String,
    pub doc_link: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct SuccessMetric {
    pub id: String,
    pub metric: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Scenario {
    pub id: String,
    pub title: String,
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct PrdRequirementItem {
    pub id: String,
    pub description: String,
    /// Set when the requirement was imported from a code review
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_review_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct PrdOutOfScopeItem {
    pub id: String,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct TimelinePhase {
    pub id: String,
    pub name: String,
    pub dates: String,
    pub deliverables: String,
    pub dependencies: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct OpenQuestion {
    pub id: String,
    pub question: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct PrdForm {
    pub title: String,
    pub meta: PrdMeta,
    pub overview: String,
    pub problem_statement: String,
    pub objective: String,
    pub success_metrics: Vec<SuccessMetric>,
    pub scenarios: Vec<Scenario>,
    pub requirements: Vec<PrdRequirementItem>,
    pub out_of_scope: Vec<PrdOutOfScopeItem>,
    pub timeline: Vec<TimelinePhase>,
    pub open_questions: Vec<OpenQuestion>,
    pub notes: String,
}

impl PrdForm {
    /// Seeded form for a brand-new PRD: the three canonical scenarios and
    /// two timeline phases the author is expected to fill in.
    pub fn starter() -> Self {
        let scenario = |title: &str| Scenario {
            id: Uuid::new_v4().to_string(),
            title: title.to_string(),
            content: String::new(),
        };
        let phase = |name: &str| TimelinePhase {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            ..Default::default()
        };
        PrdForm {
            scenarios: vec![
                scenario("Happy Path"),
                scenario("Alternative Scenario"),
                scenario("Error State"),
            ],
            timeline: vec![phase("Phase 1"), phase("Phase 2")],
            ..Default::default()
        }
    }
}
