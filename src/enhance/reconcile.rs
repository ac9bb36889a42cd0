//! Suggestion reconciliation
//!
//! Decides the default accept/reject state for every suggestion, composes
//! the user's final choices into an accepted-changes record, and merges that
//! record into the form. The default-checked policy is a domain rule, not a
//! rendering concern, so it lives here as pure functions:
//!
//! - an item suggestion is pre-checked iff its improved text differs from
//!   the current source text (a suggestion for an unknown id compares
//!   against the empty string)
//! - flags always start unchecked — they append `[TODO: …]` annotations and
//!   must be opted into
//! - missing-coverage notes are pre-checked — they capture whole topics the
//!   author likely wants
//!
//! Applying an accepted-changes record is a pure function of (form, record):
//! accepted text fully replaces the target field, so re-applying the same
//! record never stacks TODO suffixes. Unmatched ids are inert.

use std::collections::BTreeMap;

use crate::models::{
    CodeReviewForm, EnhancementItem, EnhancementResult, GapItem, PrdEnhancementResult, PrdForm,
    PrdSection, SectionImprovement,
};

/// Checked-state for one suggestion: the item checkbox plus one checkbox
/// per flag, parallel to the suggestion's `flags` list
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ItemSelection {
    pub accept: bool,
    pub flags: Vec<bool>,
}

impl ItemSelection {
    fn for_item(item: &EnhancementItem, original: Option<&str>) -> Self {
        ItemSelection {
            accept: item.improved != original.unwrap_or(""),
            flags: vec![false; item.flags.len()],
        }
    }
}

/// Checked-state for a whole code review enhancement, parallel by index to
/// the [`EnhancementResult`] it was built from
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ReviewSelection {
    pub requirements: Vec<ItemSelection>,
    pub gaps: Vec<ItemSelection>,
    pub recommendations: Vec<ItemSelection>,
    pub missing_coverage: Vec<bool>,
}

/// Checked-state for a PRD enhancement. `missing_sections` has no
/// counterpart here: those notes are display-only.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PrdSelection {
    /// Keyed by section; only sections present in the result get an entry
    pub sections: BTreeMap<PrdSection, ItemSelection>,
    pub success_metrics: Vec<ItemSelection>,
    pub requirements: Vec<ItemSelection>,
    pub out_of_scope: Vec<ItemSelection>,
    pub open_questions: Vec<ItemSelection>,
    pub scenarios: Vec<ItemSelection>,
}

fn select_items<'a>(
    items: &[EnhancementItem],
    original: impl Fn(&str) -> Option<&'a str>,
) -> Vec<ItemSelection> {
    items
        .iter()
        .map(|item| ItemSelection::for_item(item, original(&item.id)))
        .collect()
}

/// Compute the default checked-state for a code review enhancement
pub fn default_review_selection(
    form: &CodeReviewForm,
    result: &EnhancementResult,
) -> ReviewSelection {
    ReviewSelection {
        requirements: select_items(&result.requirements, |id| {
            form.requirements
                .iter()
                .find(|r| r.id == id)
                .map(|r| r.description.as_str())
        }),
        gaps: select_items(&result.gaps, |id| {
            form.gaps
                .iter()
                .find(|g| g.id == id)
                .map(|g| g.description.as_str())
        }),
        recommendations: select_items(&result.recommendations, |id| {
            form.recommendations
                .iter()
                .find(|r| r.id == id)
                .map(|r| r.description.as_str())
        }),
        missing_coverage: vec![true; result.missing_coverage.len()],
    }
}

/// Compute the default checked-state for a PRD enhancement
pub fn default_prd_selection(form: &PrdForm, result: &PrdEnhancementResult) -> PrdSelection {
    let mut sections = BTreeMap::new();
    for &section in PrdSection::all() {
        if let Some(improvement) = result.sections.get(section) {
            let original = match section {
                PrdSection::Overview => form.overview.as_str(),
                PrdSection::ProblemStatement => form.problem_statement.as_str(),
                PrdSection::Objective => form.objective.as_str(),
                PrdSection::Notes => form.notes.as_str(),
            };
            sections.insert(
                section,
                ItemSelection {
                    accept: improvement.improved != original,
                    flags: vec![false; improvement.flags.len()],
                },
            );
        }
    }

    PrdSelection {
        sections,
        success_metrics: select_items(&result.success_metrics, |id| {
            form.success_metrics
                .iter()
                .find(|m| m.id == id)
                .map(|m| m.metric.as_str())
        }),
        requirements: select_items(&result.requirements, |id| {
            form.requirements
                .iter()
                .find(|r| r.id == id)
                .map(|r| r.description.as_str())
        }),
        out_of_scope: select_items(&result.out_of_scope, |id| {
            form.out_of_scope
                .iter()
                .find(|o| o.id == id)
                .map(|o| o.description.as_str())
        }),
        open_questions: select_items(&result.open_questions, |id| {
            form.open_questions
                .iter()
                .find(|q| q.id == id)
                .map(|q| q.question.as_str())
        }),
        scenarios: select_items(&result.scenarios, |id| {
            form.scenarios
                .iter()
                .find(|s| s.id == id)
                .map(|s| s.content.as_str())
        }),
    }
}

/// Final text for one accepted item: the improved text, plus a TODO suffix
/// when any flags were opted into. Flags keep their original order and are
/// semicolon-joined.
fn compose_text(item: &EnhancementItem, selection: &ItemSelection) -> String {
    let chosen: Vec<&str> = item
        .flags
        .iter()
        .zip(&selection.flags)
        .filter(|(_, &checked)| checked)
        .map(|(flag, _)| flag.as_str())
        .collect();
    if chosen.is_empty() {
        item.improved.clone()
    } else {
        format!("{} [TODO: {}]", item.improved, chosen.join("; "))
    }
}

fn accept_items(
    items: &[EnhancementItem],
    selections: &[ItemSelection],
) -> BTreeMap<String, String> {
    items
        .iter()
        .zip(selections)
        .filter(|(_, sel)| sel.accept)
        .map(|(item, sel)| (item.id.clone(), compose_text(item, sel)))
        .collect()
}

/// The user's final choices for a code review, resolved to concrete text
/// per item id. This record is what the merge consumes; applying it twice
/// yields the same form.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AcceptedChanges {
    pub requirements: BTreeMap<String, String>,
    pub gaps: BTreeMap<String, String>,
    pub recommendations: BTreeMap<String, String>,
    /// Checked missing-coverage notes, to be synthesized into new gaps
    pub new_gaps: Vec<String>,
}

/// Resolve a code review selection into an accepted-changes record
pub fn accept_review_changes(
    result: &EnhancementResult,
    selection: &ReviewSelection,
) -> AcceptedChanges {
    AcceptedChanges {
        requirements: accept_items(&result.requirements, &selection.requirements),
        gaps: accept_items(&result.gaps, &selection.gaps),
        recommendations: accept_items(&result.recommendations, &selection.recommendations),
        new_gaps: result
            .missing_coverage
            .iter()
            .zip(&selection.missing_coverage)
            .filter(|(_, &checked)| checked)
            .map(|(note, _)| note.clone())
            .collect(),
    }
}

/// The user's final choices for a PRD
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PrdAcceptedChanges {
    pub sections: BTreeMap<PrdSection, String>,
    pub success_metrics: BTreeMap<String, String>,
    pub requirements: BTreeMap<String, String>,
    pub out_of_scope: BTreeMap<String, String>,
    pub open_questions: BTreeMap<String, String>,
    pub scenarios: BTreeMap<String, String>,
}

fn compose_section(section: &SectionImprovement, selection: &ItemSelection) -> String {
    let chosen: Vec<&str> = section
        .flags
        .iter()
        .zip(&selection.flags)
        .filter(|(_, &checked)| checked)
        .map(|(flag, _)| flag.as_str())
        .collect();
    if chosen.is_empty() {
        section.improved.clone()
    } else {
        format!("{} [TODO: {}]", section.improved, chosen.join("; "))
    }
}

/// Resolve a PRD selection into an accepted-changes record
pub fn accept_prd_changes(
    result: &PrdEnhancementResult,
    selection: &PrdSelection,
) -> PrdAcceptedChanges {
    let mut sections = BTreeMap::new();
    for (&section, sel) in &selection.sections {
        if !sel.accept {
            continue;
        }
        if let Some(improvement) = result.sections.get(section) {
            sections.insert(section, compose_section(improvement, sel));
        }
    }

    PrdAcceptedChanges {
        sections,
        success_metrics: accept_items(&result.success_metrics, &selection.success_metrics),
        requirements: accept_items(&result.requirements, &selection.requirements),
        out_of_scope: accept_items(&result.out_of_scope, &selection.out_of_scope),
        open_questions: accept_items(&result.open_questions, &selection.open_questions),
        scenarios: accept_items(&result.scenarios, &selection.scenarios),
    }
}

/// Format a missing-coverage note into gap text: trimmed, first letter
/// capitalized, terminated with a period unless it already ends in
/// sentence-ending punctuation. Formatting policy, not contract.
pub fn format_gap_note(note: &str) -> String {
    let trimmed = note.trim();
    let mut chars = trimmed.chars();
    let capitalized = match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => return String::new(),
    };
    if capitalized.ends_with(['.', '!', '?']) {
        capitalized
    } else {
        format!("{}.", capitalized)
    }
}

/// Merge an accepted-changes record into a code review form.
///
/// Untouched items survive verbatim; ids with no matching source item are
/// ignored; checked coverage notes become new OPEN gaps with fresh ids.
pub fn apply_review_changes(form: &CodeReviewForm, accepted: &AcceptedChanges) -> CodeReviewForm {
    let mut next = form.clone();

    for req in &mut next.requirements {
        if let Some(text) = accepted.requirements.get(&req.id) {
            req.description = text.clone();
        }
    }
    for gap in &mut next.gaps {
        if let Some(text) = accepted.gaps.get(&gap.id) {
            gap.description = text.clone();
        }
    }
    for rec in &mut next.recommendations {
        if let Some(text) = accepted.recommendations.get(&rec.id) {
            rec.description = text.clone();
        }
    }
    for note in &accepted.new_gaps {
        next.gaps.push(GapItem::open(format_gap_note(note)));
    }

    next
}

/// Merge an accepted-changes record into a PRD form. Scalar sections are
/// patched by name; missing-sections notes never materialize items.
pub fn apply_prd_changes(form: &PrdForm, accepted: &PrdAcceptedChanges) -> PrdForm {
    let mut next = form.clone();

    for (&section, text) in &accepted.sections {
        match section {
            PrdSection::Overview => next.overview = text.clone(),
            PrdSection::ProblemStatement => next.problem_statement = text.clone(),
            PrdSection::Objective => next.objective = text.clone(),
            PrdSection::Notes => next.notes = text.clone(),
        }
    }

    for metric in &mut next.success_metrics {
        if let Some(text) = accepted.success_metrics.get(&metric.id) {
            metric.metric = text.clone();
        }
    }
    for req in &mut next.requirements {
        if let Some(text) = accepted.requirements.get(&req.id) {
            req.description = text.clone();
        }
    }
    for item in &mut next.out_of_scope {
        if let Some(text) = accepted.out_of_scope.get(&item.id) {
            item.description = text.clone();
        }
    }
    for question in &mut next.open_questions {
        if let Some(text) = accepted.open_questions.get(&question.id) {
            question.question = text.clone();
        }
    }
    for scenario in &mut next.scenarios {
        if let Some(text) = accepted.scenarios.get(&scenario.id) {
            scenario.content = text.clone();
        }
    }

    next
}

/// Whether a review enhancement offers anything to act on (changed text,
/// any flag, or coverage notes). Drives the "looks good as-is" empty state.
pub fn review_has_actionable(form: &CodeReviewForm, result: &EnhancementResult) -> bool {
    let changed = |items: &[EnhancementItem], original: &dyn Fn(&str) -> Option<String>| {
        items.iter().any(|item| {
            item.improved != original(&item.id).unwrap_or_default() || !item.flags.is_empty()
        })
    };
    changed(&result.requirements, &|id| {
        form.requirements
            .iter()
            .find(|r| r.id == id)
            .map(|r| r.description.clone())
    }) || changed(&result.gaps, &|id| {
        form.gaps
            .iter()
            .find(|g| g.id == id)
            .map(|g| g.description.clone())
    }) || changed(&result.recommendations, &|id| {
        form.recommendations
            .iter()
            .find(|r| r.id == id)
            .map(|r| r.description.clone())
    }) || !result.missing_coverage.is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{GapStatus, RequirementItem, RequirementStatus, SuccessMetric};

    fn form_with_requirement(id: &str, description: &str) -> CodeReviewForm {
        let mut form = CodeReviewForm::default();
        form.requirements.push(RequirementItem {
            id: id.to_string(),
            status: RequirementStatus::Incomplete,
            description: description.to_string(),
        });
        form
    }

    fn item(id: &str, improved: &str, flags: &[&str]) -> EnhancementItem {
        EnhancementItem {
            id: id.to_string(),
            improved: improved.to_string(),
            flags: flags.iter().map(|f| f.to_string()).collect(),
        }
    }

    #[test]
    fn test_default_unchanged_item_is_unchecked() {
        let form = form_with_requirement("r1", "same text");
        let result = EnhancementResult {
            requirements: vec![item("r1", "same text", &[])],
            ..Default::default()
        };
        let selection = default_review_selection(&form, &result);
        assert!(!selection.requirements[0].accept);
    }

    #[test]
    fn test_default_changed_item_is_checked_flags_unchecked() {
        let form = form_with_requirement("r1", "old");
        let result = EnhancementResult {
            requirements: vec![item("r1", "new", &["flag a", "flag b"])],
            ..Default::default()
        };
        let selection = default_review_selection(&form, &result);
        assert!(selection.requirements[0].accept);
        assert_eq!(selection.requirements[0].flags, vec![false, false]);
    }

    #[test]
    fn test_default_unknown_id_compares_against_empty() {
        let form = CodeReviewForm::default();
        let result = EnhancementResult {
            gaps: vec![item("ghost", "anything", &[])],
            ..Default::default()
        };
        let selection = default_review_selection(&form, &result);
        // "anything" != "" so it defaults checked; the merge still ignores it
        assert!(selection.gaps[0].accept);
    }

    #[test]
    fn test_missing_coverage_defaults_checked() {
        let result = EnhancementResult {
            missing_coverage: vec!["no error handling".to_string(), "no a11y".to_string()],
            ..Default::default()
        };
        let selection = default_review_selection(&CodeReviewForm::default(), &result);
        assert_eq!(selection.missing_coverage, vec![true, true]);
    }

    #[test]
    fn test_flag_composition() {
        let suggestion = item("r1", "X", &["A", "B"]);
        let mut sel = ItemSelection {
            accept: true,
            flags: vec![true, true],
        };
        assert_eq!(compose_text(&suggestion, &sel), "X [TODO: A; B]");

        sel.flags = vec![false, false];
        assert_eq!(compose_text(&suggestion, &sel), "X");

        sel.flags = vec![false, true];
        assert_eq!(compose_text(&suggestion, &sel), "X [TODO: B]");
    }

    #[test]
    fn test_unchecked_item_survives_verbatim() {
        let form = form_with_requirement("r1", "original");
        let result = EnhancementResult {
            requirements: vec![item("r1", "improved", &[])],
            ..Default::default()
        };
        let mut selection = default_review_selection(&form, &result);
        selection.requirements[0].accept = false;

        let accepted = accept_review_changes(&result, &selection);
        let next = apply_review_changes(&form, &accepted);
        assert_eq!(next.requirements[0].description, "original");
    }

    #[test]
    fn test_unmatched_id_is_inert() {
        let form = form_with_requirement("r1", "text");
        let mut accepted = AcceptedChanges::default();
        accepted
            .requirements
            .insert("nope".to_string(), "replacement".to_string());

        let next = apply_review_changes(&form, &accepted);
        assert_eq!(next, form);
    }

    #[test]
    fn test_merge_is_idempotent() {
        let form = form_with_requirement("r1", "old");
        let mut accepted = AcceptedChanges::default();
        accepted
            .requirements
            .insert("r1".to_string(), "new [TODO: A]".to_string());

        let once = apply_review_changes(&form, &accepted);
        let twice = apply_review_changes(&once, &accepted);
        assert_eq!(once.requirements[0].description, "new [TODO: A]");
        assert_eq!(once, twice);
    }

    #[test]
    fn test_new_gaps_are_synthesized_open_with_fresh_ids() {
        let form = CodeReviewForm::default();
        let accepted = AcceptedChanges {
            new_gaps: vec!["  error handling not covered".to_string()],
            ..Default::default()
        };
        let next = apply_review_changes(&form, &accepted);
        assert_eq!(next.gaps.len(), 1);
        assert_eq!(next.gaps[0].description, "Error handling not covered.");
        assert_eq!(next.gaps[0].status, GapStatus::Open);
        assert!(!next.gaps[0].id.is_empty());
    }

    #[test]
    fn test_format_gap_note() {
        assert_eq!(format_gap_note("already done."), "Already done.");
        assert_eq!(format_gap_note("needs a11y"), "Needs a11y.");
        assert_eq!(format_gap_note("really?"), "Really?");
        assert_eq!(format_gap_note("   "), "");
    }

    #[test]
    fn test_end_to_end_requirement_scenario() {
        // The canonical flow: flag left unchecked first, then checked
        let form = form_with_requirement("r1", "validate api key");
        let improved = "The API key is validated and requests are rejected if missing or invalid.";
        let result = EnhancementResult {
            requirements: vec![item("r1", improved, &["Loading state not specified"])],
            ..Default::default()
        };

        let selection = default_review_selection(&form, &result);
        assert!(selection.requirements[0].accept);
        let accepted = accept_review_changes(&result, &selection);
        let next = apply_review_changes(&form, &accepted);
        assert_eq!(next.requirements[0].description, improved);

        let mut selection = default_review_selection(&form, &result);
        selection.requirements[0].flags[0] = true;
        let accepted = accept_review_changes(&result, &selection);
        let next = apply_review_changes(&form, &accepted);
        assert_eq!(
            next.requirements[0].description,
            format!("{} [TODO: Loading state not specified]", improved)
        );
    }

    #[test]
    fn test_prd_sections_patch_scalars() {
        let mut form = PrdForm::default();
        form.overview = "weak overview".to_string();
        form.notes = "notes".to_string();

        let result = PrdEnhancementResult {
            sections: crate::models::PrdSections {
                overview: Some(SectionImprovement {
                    improved: "A structured editor.".to_string(),
                    flags: vec!["Focuses on value".to_string()],
                }),
                notes: Some(SectionImprovement {
                    improved: "notes".to_string(),
                    flags: vec![],
                }),
                ..Default::default()
            },
            ..Default::default()
        };

        let selection = default_prd_selection(&form, &result);
        // Changed section pre-checked, unchanged one not
        assert!(selection.sections[&PrdSection::Overview].accept);
        assert!(!selection.sections[&PrdSection::Notes].accept);

        let mut selection = selection;
        selection
            .sections
            .get_mut(&PrdSection::Overview)
            .unwrap()
            .flags[0] = true;
        let accepted = accept_prd_changes(&result, &selection);
        let next = apply_prd_changes(&form, &accepted);
        assert_eq!(
            next.overview,
            "A structured editor. [TODO: Focuses on value]"
        );
        assert_eq!(next.notes, "notes");
    }

    #[test]
    fn test_prd_missing_sections_never_materialize() {
        let form = PrdForm::default();
        let result = PrdEnhancementResult {
            missing_sections: vec!["Out of Scope is empty".to_string()],
            ..Default::default()
        };
        let selection = default_prd_selection(&form, &result);
        let accepted = accept_prd_changes(&result, &selection);
        let next = apply_prd_changes(&form, &accepted);
        assert_eq!(next, form);
    }

    #[test]
    fn test_prd_list_merge_by_id() {
        let mut form = PrdForm::default();
        form.success_metrics.push(SuccessMetric {
            id: "m1".to_string(),
            metric: "more PRDs".to_string(),
        });
        let result = PrdEnhancementResult {
            success_metrics: vec![item("m1", "90% of PRDs complete in month one", &[])],
            ..Default::default()
        };
        let selection = default_prd_selection(&form, &result);
        let accepted = accept_prd_changes(&result, &selection);
        let next = apply_prd_changes(&form, &accepted);
        assert_eq!(
            next.success_metrics[0].metric,
            "90% of PRDs complete in month one"
        );
    }

    #[test]
    fn test_review_has_actionable() {
        let form = form_with_requirement("r1", "same");
        let clean = EnhancementResult {
            requirements: vec![item("r1", "same", &[])],
            ..Default::default()
        };
        assert!(!review_has_actionable(&form, &clean));

        let flagged = EnhancementResult {
            requirements: vec![item("r1", "same", &["needs detail"])],
            ..Default::default()
        };
        assert!(review_has_actionable(&form, &flagged));
    }
}
