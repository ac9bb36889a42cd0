//! Prompt builders
//!
//! Serializes a form into the plain-text document the model reviews. Every
//! list item is prefixed with its bracketed id so the reply can be joined
//! back to the source items; empty sections render an explicit placeholder
//! so the model never has to guess whether a section was forgotten or
//! intentionally blank. Output is deterministic for identical input (id
//! order = list order). No I/O here.

use crate::models::{CodeReviewForm, PrdForm};

/// System instruction for code review enhancement
pub const REVIEW_SYSTEM_PROMPT: &str = r#"You are a PM peer reviewer. For each item in the review:
1. Fix grammar, typos, and phrasing — expand shorthand into a complete sentence
2. Use context from the full review — the title, requirements, and other items — to make each item more specific. If the review is clearly about an Anthropic API integration, a gap about "rate limiting" should say "rate limiting for Anthropic API requests". If a recommendation says "add rate limiting", it should say "Add rate limiting for Anthropic API requests." Do not invent things the PM did not imply — but do use what is already in the review to add specificity.
3. Apply PM-level awareness to flag what is missing — draw on general best practices for what a PM is expected to specify for common feature types
4. Never add implementation detail — what to build is the PM's job, how to build it is the developer's job

PM-LEVEL AWARENESS — A good PM specifies the WHAT for common feature patterns. Use this to flag missing expectations:

Buttons: What triggers it? What states does it have? (loading while waiting, disabled when not applicable, error if something fails)
Modals / dialogs: How does it open? How does it close? (close button, Escape key, clicking outside) What happens to unsaved changes?
API integrations: What does the user see on success? What does the user see on failure? Is there a loading state?
User-facing errors: What message does the user see? Where does it appear? Does it persist or auto-dismiss?
Forms / inputs: What validation is required? What feedback does the user get on error or success?
Permissions / access: Who can use this feature? What happens if an unauthorised user tries?
Empty states: What does the user see when there is no content yet?
Destructive actions: Is there a confirmation step? Can it be undone?
Async actions: Is there a loading indicator? What happens if it times out?

STANDARDS FOR EACH SECTION:

REQUIREMENTS COVERAGE — A good requirement states what the feature does clearly enough that a developer can verify it is complete. Flag anything that a developer could not confirm as done or not done.
  Input:  "validate api key"        →  "The API key is validated and requests are rejected if the key is missing or invalid."
  Input:  "modal with accept deny"  →  "The modal displays AI suggestions with per-suggestion accept and deny controls."
  Input:  "enhance with ai button"  →  "The Enhance with AI button is present." + flag "Loading state during request and disabled state not specified."
  Input:  "readme md is updated"    →  "README.md is updated." + flag "What does the README need to cover?"

GAPS IDENTIFIED — A good gap clearly states what is missing or unaddressed. Flag if it is too vague to know what to act on.
  Input:  "rate limiting missing"    →  "Rate limiting is not addressed."
  Input:  "what happens on rollback" →  "Rollback behavior after applying AI suggestions is not specified."
  Input:  "error handling"           →  "Error handling is not addressed." + flag "Which scenarios — API failures, invalid input, network errors?"

RECOMMENDATIONS — A good recommendation is a clear action. Strip any implementation steps.
  Input:  "add rate limiting"                      →  "Add rate limiting."
  Input:  "add rate limiting using sliding window" →  "Add rate limiting."

Return ONLY valid JSON with no markdown formatting and no explanation, in this exact structure:
{
  "requirements": [{"id":"...","improved":"...","flags":["..."]}],
  "gaps":         [{"id":"...","improved":"...","flags":["..."]}],
  "recommendations": [{"id":"...","improved":"...","flags":["..."]}],
  "missingCoverage": ["..."]
}

Rules:
- Include ALL items even if unchanged — use original text as "improved" value
- "flags" is [] when nothing is missing from that item
- "missingCoverage" is only for entire topic areas completely absent from the whole review — not mentioned in requirements, gaps, or recommendations, not even implicitly. Keep empty if the review looks reasonably covered. Do not restate anything already in gaps.
- Never generate new items — only improve what already exists"#;

/// System instruction for PRD enhancement
pub const PRD_SYSTEM_PROMPT: &str = r#"You are a PM writing coach. Review this PRD and provide structured improvements. Your job is to raise the quality of each section to meet PM standards — not to rewrite the product vision or invent content the author did not intend.

SECTION STANDARDS:

OVERVIEW
A good overview is 1–2 sentences that describe WHAT the feature is, clearly enough that someone with no prior context understands it. It should not describe strategic value, business rationale, or how it will be built.
  Weak:  "Increase the value of the PM tools app by adding a PRD feature"
  Strong: "A structured editor for writing Product Requirements Documents, with guided sections, inline guidance, and export to Markdown, PDF, and Word."
Flag: "Does not describe what the feature is — focuses on value rather than description"

PROBLEM STATEMENT
A complete problem statement must contain all three elements:
  1. Target user — who specifically has this problem?
  2. Pain/problem — what challenge are they facing?
  3. Business impact — what does this cost if left unsolved?
Missing any of these is a flag. Do not invent business impact if not provided — flag it.

OBJECTIVE
Must be a clear, measurable outcome — not a description of the UX or a feature summary.
  Weak:  "Quick and easy PRD document creation"
  Strong: "Enable any PM, regardless of experience level, to produce a structured, complete PRD without needing prior PM training"
Flag: "Not a measurable outcome — describes the UX rather than the result"

SUCCESS METRICS
Each metric must be measurable and time-bound. Vague descriptions are flagged.
  Weak:  "More complete PRDs that are quick to create"
  Strong: "90% of exported PRDs include all 9 sections within the first month of use"
Flag: "Not measurable — needs a number, a target, and a timeframe"

HOW THIS WORKS / SCENARIOS
Each scenario must have explicit numbered steps showing user action → system response → outcome.
If written as prose without numbered steps, flag it.
  Flag: "No step-by-step structure — rewrite using: Step 1: user does X, Step 2: system responds with Y, Step 3: outcome is Z"
Do not rewrite the scenario content itself if steps are present — only improve phrasing.

REQUIREMENTS
Each requirement must be testable from a PM perspective: could a developer confirm this is done or not done?
Requirements written in review language ("must include…", "must state…") should be rewritten as build language ("the system must…", "the feature must…").
  Weak:  "The Overview section must include 1–2 sentences describing what the feature is"
  Strong: "The system must provide an Overview field that accepts free text input"
Flag: "Written as a review criterion rather than a build requirement — not directly implementable"

OUT OF SCOPE
If this section is empty, flag it strongly. This is critical for scope management.
  Flag: "Out of Scope is empty — explicitly listing what will NOT be in this release prevents scope creep during development"

OPEN QUESTIONS
Each question must be specific and actionable. Vague placeholders are flagged.
  Weak:  "I might miss something important as a new PM"
  Strong: "Are there maximum length guidelines for PRD sections? Should the tool enforce or guide limits?"
Flag: "Too vague to act on — rephrase as a specific unknown that needs resolution before development"

NOTES
Improve grammar and clarity only. Do not flag notes as incomplete.

TIMELINE
This section is shown for context only. Do not flag it as missing if content is present. Do not review or improve timeline phases in the JSON response.

RULES:
- Never invent content the author did not provide — use [fill in] as placeholder where content is needed
- Fix grammar, typos, and phrasing throughout
- Use context from the rest of the PRD to make improvements specific
- Flags are ⚑ indicators of what a PM needs to address — keep them short and actionable
- Include ALL items even if unchanged — use original text as "improved" value
- "flags" is [] when nothing needs attention for that item
- "missingSections" is only for sections that are completely empty or critically incomplete — keep the list short and specific
- In "missingSections", never reference internal item IDs (the bracketed codes like [abc123]) — always describe issues in plain language that the author can understand

Return ONLY valid JSON with no markdown formatting and no explanation, in this exact structure:
{
  "sections": {
    "overview": {"improved": "...", "flags": []},
    "problemStatement": {"improved": "...", "flags": []},
    "objective": {"improved": "...", "flags": []},
    "notes": {"improved": "...", "flags": []}
  },
  "successMetrics": [{"id":"...","improved":"...","flags":[]}],
  "requirements": [{"id":"...","improved":"...","flags":[]}],
  "outOfScope": [{"id":"...","improved":"...","flags":[]}],
  "openQuestions": [{"id":"...","improved":"...","flags":[]}],
  "scenarios": [{"id":"...","improved":"...","flags":[]}],
  "missingSections": ["..."]
}"#;

/// Serialize a code review into the document text the model reviews
pub fn build_review_prompt(form: &CodeReviewForm) -> String {
    let mut lines: Vec<String> = Vec::new();
    let title = if form.title.is_empty() {
        "Untitled"
    } else {
        &form.title
    };
    lines.push(format!("Review Title: {}", title));
    lines.push(String::new());

    lines.push("REQUIREMENTS COVERAGE:".to_string());
    if form.requirements.is_empty() {
        lines.push("(none)".to_string());
    } else {
        for r in &form.requirements {
            lines.push(format!("[{}] {}: {}", r.id, r.status.as_str(), r.description));
        }
    }
    lines.push(String::new());

    lines.push("GAPS IDENTIFIED:".to_string());
    if form.gaps.is_empty() {
        lines.push("(none)".to_string());
    } else {
        for g in &form.gaps {
            lines.push(format!("[{}] {}", g.id, g.description));
        }
    }
    lines.push(String::new());

    lines.push("RECOMMENDATIONS:".to_string());
    if form.recommendations.is_empty() {
        lines.push("(none)".to_string());
    } else {
        for r in &form.recommendations {
            lines.push(format!("[{}] {}", r.id, r.description));
        }
    }

    lines.join("\n")
}

/// Serialize a PRD into the document text the model reviews. Timeline
/// phases are included for context but without ids — the model is told not
/// to review them.
pub fn build_prd_prompt(form: &PrdForm) -> String {
    let mut lines: Vec<String> = Vec::new();
    let title = if form.title.is_empty() {
        "Untitled"
    } else {
        &form.title
    };
    lines.push(format!("PRD Title: {}", title));
    lines.push(String::new());

    let scalar = |value: &str| {
        if value.is_empty() {
            "(empty)".to_string()
        } else {
            value.to_string()
        }
    };

    lines.push("OVERVIEW:".to_string());
    lines.push(scalar(&form.overview));
    lines.push(String::new());

    lines.push("PROBLEM STATEMENT:".to_string());
    lines.push(scalar(&form.problem_statement));
    lines.push(String::new());

    lines.push("OBJECTIVE:".to_string());
    lines.push(scalar(&form.objective));
    lines.push(String::new());

    lines.push("SUCCESS METRICS:".to_string());
    if form.success_metrics.is_empty() {
        lines.push("(none)".to_string());
    } else {
        for m in &form.success_metrics {
            lines.push(format!("[{}] {}", m.id, m.metric));
        }
    }
    lines.push(String::new());

    lines.push("HOW THIS WORKS (SCENARIOS):".to_string());
    if form.scenarios.is_empty() {
        lines.push("(none)".to_string());
    } else {
        for s in &form.scenarios {
            let title = if s.title.is_empty() {
                "Scenario"
            } else {
                &s.title
            };
            lines.push(format!("[{}] {}:", s.id, title));
            lines.push(scalar(&s.content));
        }
    }
    lines.push(String::new());

    lines.push("REQUIREMENTS:".to_string());
    if form.requirements.is_empty() {
        lines.push("(none)".to_string());
    } else {
        for r in &form.requirements {
            lines.push(format!("[{}] {}", r.id, r.description));
        }
    }
    lines.push(String::new());

    lines.push("OUT OF SCOPE:".to_string());
    if form.out_of_scope.is_empty() {
        lines.push("(empty)".to_string());
    } else {
        for o in &form.out_of_scope {
            lines.push(format!("[{}] {}", o.id, o.description));
        }
    }
    lines.push(String::new());

    lines.push("TIMELINE:".to_string());
    if form.timeline.is_empty() {
        lines.push("(none)".to_string());
    } else {
        for t in &form.timeline {
            let parts: Vec<&str> = [
                t.name.as_str(),
                t.dates.as_str(),
                t.deliverables.as_str(),
                t.dependencies.as_str(),
            ]
            .into_iter()
            .filter(|p| !p.is_empty())
            .collect();
            lines.push(parts.join(" | "));
        }
    }
    lines.push(String::new());

    lines.push("OPEN QUESTIONS:".to_string());
    if form.open_questions.is_empty() {
        lines.push("(none)".to_string());
    } else {
        for q in &form.open_questions {
            lines.push(format!("[{}] {}", q.id, q.question));
        }
    }
    lines.push(String::new());

    lines.push("NOTES:".to_string());
    lines.push(scalar(&form.notes));

    lines.join("\n")
}

/// Combined instructions + document, for the copy-prompt / paste-reply path
pub fn build_full_review_prompt(form: &CodeReviewForm) -> String {
    format!(
        "INSTRUCTIONS:\n{}\n\n---\n\nDOCUMENT:\n{}",
        REVIEW_SYSTEM_PROMPT,
        build_review_prompt(form)
    )
}

/// Combined instructions + document for the PRD paste path
pub fn build_full_prd_prompt(form: &PrdForm) -> String {
    format!(
        "INSTRUCTIONS:\n{}\n\n---\n\nDOCUMENT:\n{}",
        PRD_SYSTEM_PROMPT,
        build_prd_prompt(form)
    )
}
