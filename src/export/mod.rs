//! Markdown export
//!
//! Renders a form into the Markdown handed to stakeholders. The output is
//! paste-ready for docs tools, so empty sections render an italic
//! placeholder instead of disappearing.

use crate::models::{
    CodeReviewForm, GapStatus, PrdForm, PrdStatus, RecommendationStatus,
};
use chrono::{DateTime, Utc};

/// Short date as shown in exports, e.g. "30 Aug 2026"
fn format_date(date: DateTime<Utc>) -> String {
    date.format("%-d %b %Y").to_string()
}

/// Render a code review as Markdown
pub fn review_markdown(form: &CodeReviewForm, created_at: Option<DateTime<Utc>>) -> String {
    let mut lines: Vec<String> = Vec::new();

    let title = if form.title.is_empty() {
        "Untitled"
    } else {
        &form.title
    };
    lines.push(format!("# PM Review [{}]", title));
    lines.push(String::new());

    let meta_rows: Vec<(&str, String)> = [
        ("Author", form.author.clone()),
        ("Role", form.author_role.clone()),
        ("Related PRD", form.related_prd.clone()),
        ("Issue", form.related_issue.clone()),
        ("Date", created_at.map(format_date).unwrap_or_default()),
    ]
    .into_iter()
    .filter(|(_, value)| !value.is_empty())
    .collect();

    if !meta_rows.is_empty() {
        for (label, value) in &meta_rows {
            lines.push(format!("**{}:** {}  ", label, value));
        }
        lines.push(String::new());
    }

    lines.push("## Requirements Coverage".to_string());
    if form.requirements.is_empty() {
        lines.push("_No requirements added._".to_string());
    } else {
        for req in &form.requirements {
            lines.push(format!("- {} — {}", req.status.as_str(), req.description));
        }
    }
    lines.push(String::new());

    lines.push("## Gaps Identified".to_string());
    if form.gaps.is_empty() {
        lines.push("_No gaps identified._".to_string());
    } else {
        for gap in &form.gaps {
            match gap.status {
                GapStatus::Resolved => {
                    let suffix = gap
                        .note
                        .as_deref()
                        .map(|note| format!(" *({})*", note))
                        .unwrap_or_default();
                    lines.push(format!("- [x] {}{}", gap.description, suffix));
                }
                GapStatus::WontDo => {
                    let suffix = gap
                        .reason
                        .as_deref()
                        .map(|reason| format!(" — {}", reason))
                        .unwrap_or_default();
                    lines.push(format!("- ~~{}~~ *(Won't Do{})*", gap.description, suffix));
                }
                GapStatus::Open => lines.push(format!("- [ ] {}", gap.description)),
            }
        }
    }
    lines.push(String::new());

    lines.push("## Recommendations".to_string());
    if form.recommendations.is_empty() {
        lines.push("_No recommendations._".to_string());
    } else {
        for rec in &form.recommendations {
            match rec.status {
                RecommendationStatus::Done => lines.push(format!("- [x] {}", rec.description)),
                RecommendationStatus::WontFix => {
                    let suffix = rec
                        .reason
                        .as_deref()
                        .map(|reason| format!(" — {}", reason))
                        .unwrap_or_default();
                    lines.push(format!("- ~~{}~~ *(Won't Fix{})*", rec.description, suffix));
                }
                RecommendationStatus::Open => lines.push(format!("- [ ] {}", rec.description)),
            }
        }
    }
    lines.push(String::new());

    lines.push("## Out of Scope / Follow-up".to_string());
    if form.out_of_scope.is_empty() {
        lines.push("_No out of scope items._".to_string());
    } else {
        for item in &form.out_of_scope {
            lines.push(format!("### {}", item.title));
            lines.push("**Acceptance Criteria:**".to_string());
            lines.push(item.acceptance_criteria.clone());
            lines.push(String::new());
        }
    }

    lines.join("\n")
}

fn or_placeholder<'a>(text: &'a str, placeholder: &'a str) -> &'a str {
    if text.is_empty() {
        placeholder
    } else {
        text
    }
}

/// Render a PRD as Markdown
pub fn prd_markdown(
    form: &PrdForm,
    created_at: Option<DateTime<Utc>>,
    modified_at: Option<DateTime<Utc>>,
) -> String {
    let mut lines: Vec<String> = Vec::new();

    let title = if form.title.is_empty() {
        "Untitled PRD"
    } else {
        &form.title
    };
    lines.push(format!("# PRD [{}]", title));
    lines.push(String::new());

    let meta_rows: Vec<(&str, String)> = [
        ("Product Manager", form.meta.author.clone()),
        ("Status", prd_status_label(form.meta.status).to_string()),
        ("Created", created_at.map(format_date).unwrap_or_default()),
        (
            "Last Updated",
            modified_at.map(format_date).unwrap_or_default(),
        ),
        ("Version", form.meta.version.clone()),
        ("Product Area", form.meta.product_area.clone()),
        ("Dev Lead", form.meta.engineering_lead.clone()),
        ("Design Lead", form.meta.design_lead.clone()),
        ("PMM", form.meta.pmm.clone()),
        ("Target Launch", form.meta.target_launch.clone()),
        ("Key Stakeholders", form.meta.stakeholders.clone()),
        ("Doc Link", form.meta.doc_link.clone()),
    ]
    .into_iter()
    .filter(|(_, value)| !value.is_empty())
    .collect();

    if !meta_rows.is_empty() {
        lines.push("| Field | Value |".to_string());
        lines.push("|-------|-------|".to_string());
        for (label, value) in &meta_rows {
            lines.push(format!("| {} | {} |", label, value));
        }
        lines.push(String::new());
    }

    lines.push("## Overview".to_string());
    lines.push(or_placeholder(&form.overview, "_Not completed._").to_string());
    lines.push(String::new());

    lines.push("## Problem Statement".to_string());
    lines.push(or_placeholder(&form.problem_statement, "_Not completed._").to_string());
    lines.push(String::new());

    lines.push("## Goals".to_string());
    lines.push("**Primary Objective**".to_string());
    lines.push(or_placeholder(&form.objective, "_Not completed._").to_string());
    lines.push(String::new());
    lines.push("**Success Metrics**".to_string());
    if form.success_metrics.is_empty() {
        lines.push("_No success metrics added._".to_string());
    } else {
        for metric in &form.success_metrics {
            lines.push(format!("- {}", metric.metric));
        }
    }
    lines.push(String::new());

    lines.push("## How This Works".to_string());
    if form.scenarios.is_empty() {
        lines.push("_No scenarios added._".to_string());
    } else {
        for scenario in &form.scenarios {
            lines.push(format!(
                "### {}",
                or_placeholder(&scenario.title, "Scenario")
            ));
            lines.push(or_placeholder(&scenario.content, "_Not completed._").to_string());
            lines.push(String::new());
        }
    }

    lines.push("## Requirements".to_string());
    if form.requirements.is_empty() {
        lines.push("_No requirements added._".to_string());
    } else {
        for req in &form.requirements {
            lines.push(format!("- {}", req.description));
        }
    }
    lines.push(String::new());

    lines.push("## Out of Scope".to_string());
    if form.out_of_scope.is_empty() {
        lines.push("_No out of scope items added._".to_string());
    } else {
        for item in &form.out_of_scope {
            lines.push(format!("- {}", item.description));
        }
    }
    lines.push(String::new());

    lines.push("## Timeline".to_string());
    if form.timeline.is_empty() {
        lines.push("_No timeline added._".to_string());
    } else {
        // The dependencies column only appears when some phase uses it
        let has_deps = form.timeline.iter().any(|p| !p.dependencies.is_empty());
        if has_deps {
            lines.push("| Phase | Dates | What Ships | Dependencies |".to_string());
            lines.push("|-------|-------|------------|--------------|".to_string());
            for phase in &form.timeline {
                lines.push(format!(
                    "| {} | {} | {} | {} |",
                    phase.name, phase.dates, phase.deliverables, phase.dependencies
                ));
            }
        } else {
            lines.push("| Phase | Dates | What Ships |".to_string());
            lines.push("|-------|-------|------------|".to_string());
            for phase in &form.timeline {
                lines.push(format!(
                    "| {} | {} | {} |",
                    phase.name, phase.dates, phase.deliverables
                ));
            }
        }
    }

    lines.push("## Open Questions".to_string());
    if form.open_questions.is_empty() {
        lines.push("_No open questions added._".to_string());
    } else {
        for question in &form.open_questions {
            lines.push(format!("- {}", question.question));
        }
    }
    lines.push(String::new());

    lines.push("## Notes".to_string());
    lines.push(or_placeholder(&form.notes, "_No notes added._").to_string());

    lines.join("\n")
}

fn prd_status_label(status: PrdStatus) -> &'static str {
    match status {
        PrdStatus::Draft => "Draft",
        PrdStatus::InReview => "In Review",
        PrdStatus::Approved => "Approved",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{GapItem, RecommendationItem, RequirementItem, RequirementStatus};
    use chrono::TimeZone;

    #[test]
    fn test_review_markdown_empty_form() {
        let md = review_markdown(&CodeReviewForm::default(), None);
        assert!(md.starts_with("# PM Review [Untitled]"));
        assert!(md.contains("_No requirements added._"));
        assert!(md.contains("_No gaps identified._"));
        assert!(md.contains("_No recommendations._"));
        assert!(md.contains("_No out of scope items._"));
        // No meta block when every field is empty
        assert!(!md.contains("**Author:**"));
    }

    #[test]
    fn test_review_markdown_statuses() {
        let mut form = CodeReviewForm::default();
        form.title = "Checkout".to_string();
        form.author = "Sam".to_string();
        form.requirements.push(RequirementItem {
            id: "r1".to_string(),
            status: RequirementStatus::Verified,
            description: "Cart totals match".to_string(),
        });
        let mut resolved = GapItem::open("No retry logic");
        resolved.resolve(Some("added in v2".to_string()));
        form.gaps.push(resolved);
        let mut wont = GapItem::open("IE11 support");
        wont.wont_do(Some("browser is EOL".to_string()));
        form.gaps.push(wont);
        let mut rec = RecommendationItem::new("Add tracing");
        rec.status = crate::models::RecommendationStatus::Done;
        form.recommendations.push(rec);

        let date = Utc.with_ymd_and_hms(2026, 8, 30, 12, 0, 0).unwrap();
        let md = review_markdown(&form, Some(date));

        assert!(md.contains("# PM Review [Checkout]"));
        assert!(md.contains("**Author:** Sam  "));
        assert!(md.contains("**Date:** 30 Aug 2026  "));
        assert!(md.contains("- VERIFIED — Cart totals match"));
        assert!(md.contains("- [x] No retry logic *(added in v2)*"));
        assert!(md.contains("- ~~IE11 support~~ *(Won't Do — browser is EOL)*"));
        assert!(md.contains("- [x] Add tracing"));
    }

    #[test]
    fn test_prd_markdown_placeholders_and_meta() {
        let mut form = PrdForm::default();
        form.title = "Search".to_string();
        form.meta.author = "Kim".to_string();
        form.overview = "Findability for docs.".to_string();

        let md = prd_markdown(&form, None, None);
        assert!(md.starts_with("# PRD [Search]"));
        assert!(md.contains("| Product Manager | Kim |"));
        assert!(md.contains("| Status | Draft |"));
        assert!(md.contains("Findability for docs."));
        assert!(md.contains("_Not completed._"));
        assert!(md.contains("_No timeline added._"));
    }

    #[test]
    fn test_prd_timeline_dependency_column_is_conditional() {
        let mut form = PrdForm::starter();
        form.timeline[0].dates = "Q1".to_string();
        let md = prd_markdown(&form, None, None);
        assert!(md.contains("| Phase | Dates | What Ships |"));
        assert!(!md.contains("Dependencies"));

        form.timeline[1].dependencies = "Phase 1".to_string();
        let md = prd_markdown(&form, None, None);
        assert!(md.contains("| Phase | Dates | What Ships | Dependencies |"));
    }
}
