use crate::inspector::{Element, PageInspector};
use crate::issue::{Category, Issue, Severity};
use anyhow::Result;
use regex::Regex;

/// Class-name and text patterns the interaction checks look for. Compiled
/// once per run.
struct InteractionPatterns {
    loading: Regex,
    async_region: Regex,
    empty_state: Regex,
    error_region: Regex,
    error_boundary: Regex,
    offline: Regex,
    success: Regex,
    multi_step: Regex,
    progress: Regex,
    destructive: Regex,
    confirmation: Regex,
    layout_property: Regex,
}

impl InteractionPatterns {
    fn new() -> Result<Self> {
        Ok(Self {
            loading: Regex::new(r"(?i)loading|spinner|skeleton|busy")?,
            async_region: Regex::new(r"(?i)async|fetch|lazy-region")?,
            empty_state: Regex::new(r"(?i)empty|placeholder|no-results|no-data")?,
            error_region: Regex::new(r"(?i)error|invalid|validation")?,
            error_boundary: Regex::new(r"(?i)error-boundary|crash-fallback")?,
            offline: Regex::new(r"(?i)offline|network-error|connection-lost")?,
            success: Regex::new(r"(?i)success|toast|confirmation")?,
            multi_step: Regex::new(r"(?i)\bstep\b|wizard|stepper")?,
            progress: Regex::new(r"(?i)progress")?,
            destructive: Regex::new(r"(?i)\b(delete|remove|destroy)\b")?,
            confirmation: Regex::new(r"(?i)confirm|modal|dialog|undo")?,
            layout_property: Regex::new(r"^(width|height|top|left|right|bottom|margin|padding)")?,
        })
    }
}

fn class_matches(element: &Element, pattern: &Regex) -> bool {
    pattern.is_match(&element.class_list())
}

fn any_class_matches(elements: &[&Element], pattern: &Regex) -> bool {
    elements.iter().any(|e| class_matches(e, pattern))
}

/// Interaction-design rules: loading feedback, empty states, error surfaces,
/// hover/focus affordances, animation discipline and flow feedback.
pub fn collect_issues(inspector: &dyn PageInspector) -> Result<Vec<Issue>> {
    let elements = inspector.all();
    if elements.is_empty() {
        return Ok(Vec::new());
    }

    let patterns = InteractionPatterns::new()?;
    let mut issues = Vec::new();
    check_submit_feedback(&elements, &patterns, &mut issues);
    check_async_regions(&elements, &patterns, &mut issues);
    check_empty_containers(&elements, &patterns, &mut issues);
    check_form_errors(&elements, &patterns, &mut issues);
    check_global_surfaces(&elements, &patterns, &mut issues);
    check_affordances(&elements, &mut issues);
    check_animations(&elements, &patterns, &mut issues);
    check_flow_feedback(&elements, &patterns, &mut issues);
    Ok(issues)
}

fn is_submit_control(element: &Element) -> bool {
    (element.tag == "button" && element.attr("type").map(|t| t == "submit").unwrap_or(true))
        || (element.tag == "input" && element.attr("type") == Some("submit"))
}

fn check_submit_feedback(
    elements: &[&Element],
    patterns: &InteractionPatterns,
    issues: &mut Vec<Issue>,
) {
    if !elements.iter().any(|e| e.tag == "form") {
        return;
    }
    for element in elements {
        if !is_submit_control(element) {
            continue;
        }
        let has_signal = element.has_attr("aria-busy")
            || element.has_attr("disabled")
            || element.has_attr("data-loading")
            || class_matches(element, &patterns.loading);
        if !has_signal {
            issues.push(Issue::new(
                Category::InteractionDesign,
                "loading-feedback",
                Severity::High,
                element.descriptor(),
                format!(
                    "Submit control {} gives no loading, disabled or aria-busy signal while the form is processing",
                    element.descriptor()
                ),
                "Disable the control and show a spinner or aria-busy state during submission",
            ));
        }
    }
}

fn check_async_regions(
    elements: &[&Element],
    patterns: &InteractionPatterns,
    issues: &mut Vec<Issue>,
) {
    let has_async_region = elements
        .iter()
        .any(|e| e.has_attr("data-async") || class_matches(e, &patterns.async_region));
    if has_async_region && !any_class_matches(elements, &patterns.loading) {
        issues.push(Issue::new(
            Category::InteractionDesign,
            "loading-feedback",
            Severity::Medium,
            "various",
            "Async content regions exist but no loading indicator is present anywhere on the page",
            "Show a spinner or skeleton while async regions fetch their data",
        ));
    }
}

fn check_empty_containers(
    elements: &[&Element],
    patterns: &InteractionPatterns,
    issues: &mut Vec<Issue>,
) {
    let has_empty_state = any_class_matches(elements, &patterns.empty_state);
    for element in elements {
        if !matches!(element.tag.as_str(), "ul" | "ol" | "table" | "tbody") {
            continue;
        }
        if element.child_count == 0 && element.text.trim().is_empty() && !has_empty_state {
            issues.push(Issue::new(
                Category::InteractionDesign,
                "empty-state",
                Severity::Medium,
                element.descriptor(),
                format!(
                    "Empty {} container {} shows nothing instead of an empty-state message",
                    element.tag,
                    element.descriptor()
                ),
                "Render a short empty-state message with a next action instead of a blank container",
            ));
        }
    }
}

fn check_form_errors(
    elements: &[&Element],
    patterns: &InteractionPatterns,
    issues: &mut Vec<Issue>,
) {
    let has_form = elements.iter().any(|e| e.tag == "form");
    let has_inputs = elements.iter().any(|e| e.is_form_control());
    if !(has_form && has_inputs) {
        return;
    }
    let has_error_region = elements.iter().any(|e| {
        class_matches(e, &patterns.error_region)
            || e.attr("role") == Some("alert")
            || e.has_attr("aria-live")
    });
    if !has_error_region {
        issues.push(Issue::new(
            Category::InteractionDesign,
            "error-handling",
            Severity::High,
            "forms",
            "Forms lack error message display areas",
            "Add an inline error region per field plus a form-level alert for submission failures",
        ));
    }
}

fn check_global_surfaces(
    elements: &[&Element],
    patterns: &InteractionPatterns,
    issues: &mut Vec<Issue>,
) {
    if !any_class_matches(elements, &patterns.error_boundary) {
        issues.push(Issue::new(
            Category::InteractionDesign,
            "error-handling",
            Severity::Medium,
            "document",
            "No global error boundary UI detected",
            "Add a top-level error boundary with a friendly fallback and a reload action",
        ));
    }
    if !any_class_matches(elements, &patterns.offline) {
        issues.push(Issue::new(
            Category::InteractionDesign,
            "error-handling",
            Severity::Low,
            "document",
            "No offline or network-error state detected",
            "Tell the user when the network drops instead of failing silently",
        ));
    }
}

fn check_affordances(elements: &[&Element], issues: &mut Vec<Issue>) {
    let mut missing_cursor = 0usize;
    let mut missing_transition = 0usize;
    let mut hidden_focus = 0usize;
    for element in elements {
        let clicky = element.tag == "a"
            || element.tag == "button"
            || element.attr("role") == Some("button");
        if clicky {
            if let Some(cursor) = element.style.cursor.as_deref() {
                if cursor != "pointer" {
                    missing_cursor += 1;
                }
            }
            if matches!(element.style.transition.as_deref(), Some("none") | Some("")) {
                missing_transition += 1;
            }
        }
        if element.is_interactive() {
            let outline_hidden =
                matches!(element.style.outline.as_deref(), Some("none") | Some("0"));
            let shadow_hidden = matches!(element.style.box_shadow.as_deref(), None | Some("none"));
            if outline_hidden && shadow_hidden {
                hidden_focus += 1;
            }
        }
    }
    if missing_cursor > 0 {
        issues.push(Issue::new(
            Category::InteractionDesign,
            "affordance",
            Severity::Low,
            "various",
            format!("{missing_cursor} clickable element(s) do not show a pointer cursor"),
            "Set cursor: pointer on clickable elements",
        ));
    }
    if missing_transition > 0 {
        issues.push(Issue::new(
            Category::InteractionDesign,
            "affordance",
            Severity::Medium,
            "various",
            format!("{missing_transition} interactive element(s) have no hover or focus transition"),
            "Add a short transition so hover and focus changes read as responses",
        ));
    }
    if hidden_focus > 0 {
        issues.push(Issue::new(
            Category::InteractionDesign,
            "focus-indicators",
            Severity::High,
            "various",
            format!(
                "{hidden_focus} interactive element(s) suppress the focus outline with no visible replacement"
            ),
            "Keep a visible focus style; replace removed outlines with an equivalent ring",
        ));
    }
}

fn check_animations(
    elements: &[&Element],
    patterns: &InteractionPatterns,
    issues: &mut Vec<Issue>,
) {
    let mut layout_animated = 0usize;
    for element in elements {
        if element
            .style
            .animated_properties
            .iter()
            .any(|p| patterns.layout_property.is_match(p))
        {
            layout_animated += 1;
        }
    }
    if layout_animated > 0 {
        issues.push(Issue::new(
            Category::InteractionDesign,
            "animation",
            Severity::Medium,
            "various",
            format!(
                "{layout_animated} element(s) animate layout-affecting properties instead of transform/opacity"
            ),
            "Animate transform and opacity only; layout properties force reflow on every frame",
        ));
    }
}

fn check_flow_feedback(
    elements: &[&Element],
    patterns: &InteractionPatterns,
    issues: &mut Vec<Issue>,
) {
    let has_form = elements.iter().any(|e| e.tag == "form");
    if has_form && !any_class_matches(elements, &patterns.success) {
        issues.push(Issue::new(
            Category::InteractionDesign,
            "flow-feedback",
            Severity::Medium,
            "forms",
            "Forms have no success confirmation UI",
            "Confirm successful submissions with a toast or inline success message",
        ));
    }
    if any_class_matches(elements, &patterns.multi_step)
        && !any_class_matches(elements, &patterns.progress)
    {
        issues.push(Issue::new(
            Category::InteractionDesign,
            "flow-feedback",
            Severity::Medium,
            "various",
            "Multi-step flow has no progress indicator",
            "Show which step the user is on and how many remain",
        ));
    }
    let has_destructive = elements
        .iter()
        .any(|e| e.is_interactive() && patterns.destructive.is_match(&e.text));
    if has_destructive && !any_class_matches(elements, &patterns.confirmation) {
        issues.push(Issue::new(
            Category::InteractionDesign,
            "flow-feedback",
            Severity::Low,
            "various",
            "Destructive actions have no confirmation or undo",
            "Ask for confirmation or offer an undo window before destructive actions complete",
        ));
    }
}
