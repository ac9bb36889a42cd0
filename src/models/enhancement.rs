//! Transient AI suggestion model
//!
//! These types exist for the lifetime of one enhancement round-trip: built
//! from parsed model output, consumed by at most one apply, then discarded.
//! They are never persisted. Every field decodes with a default so a
//! partially conforming model reply still yields a usable result.

use serde::{Deserialize, Serialize};

/// One suggested improvement for an existing list item, joined back to the
/// source item by `id`. Ids that match nothing in the form are ignored.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct EnhancementItem {
    pub id: String,
    pub improved: String,
    pub flags: Vec<String>,
}

/// Suggested improvement for a scalar PRD section (no id; keyed by name)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct SectionImprovement {
    pub improved: String,
    pub flags: Vec<String>,
}

/// Enhancement result for a code review
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct EnhancementResult {
    pub requirements: Vec<EnhancementItem>,
    pub gaps: Vec<EnhancementItem>,
    pub recommendations: Vec<EnhancementItem>,
    /// Topic areas absent from the whole review; id-less, can become new gaps
    pub missing_coverage: Vec<String>,
}

/// Scalar-section improvements for a PRD; each key is optional per reply
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct PrdSections {
    pub overview: Option<SectionImprovement>,
    pub problem_statement: Option<SectionImprovement>,
    pub objective: Option<SectionImprovement>,
    pub notes: Option<SectionImprovement>,
}

impl PrdSections {
    pub fn get(&self, section: PrdSection) -> Option<&SectionImprovement> {
        match section {
            PrdSection::Overview => self.overview.as_ref(),
            PrdSection::ProblemStatement => self.problem_statement.as_ref(),
            PrdSection::Objective => self.objective.as_ref(),
            PrdSection::Notes => self.notes.as_ref(),
        }
    }
}

/// Enhancement result for a PRD
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct PrdEnhancementResult {
    pub sections: PrdSections,
    pub success_metrics: Vec<EnhancementItem>,
    pub requirements: Vec<EnhancementItem>,
    pub out_of_scope: Vec<EnhancementItem>,
    pub open_questions: Vec<EnhancementItem>,
    pub scenarios: Vec<EnhancementItem>,
    /// Display-only notes about missing/incomplete sections; never
    /// materialized into items
    pub missing_sections: Vec<String>,
}

/// The fixed enumeration of scalar PRD fields the model may improve
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PrdSection {
    Overview,
    ProblemStatement,
    Objective,
    Notes,
}

impl PrdSection {
    pub fn all() -> &'static [PrdSection] {
        &[
            PrdSection::Overview,
            PrdSection::ProblemStatement,
            PrdSection::Objective,
            PrdSection::Notes,
        ]
    }

    /// Wire key as it appears in the model's JSON reply
    pub fn as_str(&self) -> &'static str {
        match self {
            PrdSection::Overview => "overview",
            PrdSection::ProblemStatement => "problemStatement",
            PrdSection::Objective => "objective",
            PrdSection::Notes => "notes",
        }
    }
}

impl std::fmt::Display for PrdSection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
