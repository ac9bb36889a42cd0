//! Cross-document requirement import
//!
//! A code review can pull requirements in from a saved PRD, and a PRD can
//! pull them from a saved code review. Imported items are copies with
//! fresh ids: item ids are the reconciliation join key within a document,
//! so an import must never carry the source document's ids across.

use crate::models::{PrdRequirementItem, RequirementItem, RequirementStatus};
use uuid::Uuid;

/// Convert selected PRD requirements into review checklist items. Every
/// imported requirement starts unverified.
pub fn review_items_from_prd<'a>(
    selected: impl IntoIterator<Item = &'a PrdRequirementItem>,
) -> Vec<RequirementItem> {
    selected
        .into_iter()
        .map(|item| RequirementItem {
            id: Uuid::new_v4().to_string(),
            status: RequirementStatus::Incomplete,
            description: item.description.clone(),
        })
        .collect()
}

/// Convert selected review requirements into PRD requirements, recording
/// which review they came from.
pub fn prd_items_from_review<'a>(
    selected: impl IntoIterator<Item = &'a RequirementItem>,
    source_review_id: &str,
) -> Vec<PrdRequirementItem> {
    selected
        .into_iter()
        .map(|item| PrdRequirementItem {
            id: Uuid::new_v4().to_string(),
            description: item.description.clone(),
            source_review_id: Some(source_review_id.to_string()),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prd_requirement(id: &str, description: &str) -> PrdRequirementItem {
        PrdRequirementItem {
            id: id.to_string(),
            description: description.to_string(),
            source_review_id: None,
        }
    }

    #[test]
    fn test_prd_import_gets_fresh_ids_and_incomplete_status() {
        let source = vec![
            prd_requirement("p1", "Search must be case-insensitive"),
            prd_requirement("p2", "Results paginate at 20"),
        ];

        let imported = review_items_from_prd(&source);

        assert_eq!(imported.len(), 2);
        assert_eq!(imported[0].description, "Search must be case-insensitive");
        assert_eq!(imported[1].description, "Results paginate at 20");
        for item in &imported {
            assert_eq!(item.status, RequirementStatus::Incomplete);
            assert!(item.id != "p1" && item.id != "p2");
        }
        assert_ne!(imported[0].id, imported[1].id);
    }

    #[test]
    fn test_review_import_records_source_review() {
        let source = vec![RequirementItem {
            id: "r1".to_string(),
            status: RequirementStatus::Verified,
            description: "Login works".to_string(),
        }];

        let imported = prd_items_from_review(&source, "rev-42");

        assert_eq!(imported.len(), 1);
        assert_ne!(imported[0].id, "r1");
        assert_eq!(imported[0].description, "Login works");
        assert_eq!(imported[0].source_review_id.as_deref(), Some("rev-42"));
    }

    #[test]
    fn test_importing_twice_never_aliases() {
        let source = vec![prd_requirement("p1", "Audit log every change")];

        let first = review_items_from_prd(&source);
        let second = review_items_from_prd(&source);

        assert_ne!(first[0].id, second[0].id);
    }

    #[test]
    fn test_empty_selection_imports_nothing() {
        assert!(review_items_from_prd([].iter()).is_empty());
        assert!(prd_items_from_review([].iter(), "rev-1").is_empty());
    }
}
