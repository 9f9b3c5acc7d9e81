use crate::inspector::{Element, PageInspector, Rgb};
use crate::issue::{Category, Issue, Severity};
use anyhow::Result;

/// WCAG AA contrast minimum for normal text.
const CONTRAST_NORMAL: f64 = 4.5;
/// WCAG AA contrast minimum for large text (>=18px, or >=14px bold).
const CONTRAST_LARGE: f64 = 3.0;
/// A ratio this far below either minimum is unreadable, not just weak.
const CONTRAST_CRITICAL: f64 = 2.0;
/// Alt text longer than this stops reading like a label.
const ALT_TEXT_MAX_LEN: usize = 125;

/// Alt values that describe nothing. Exact matches only, case-insensitive.
const GENERIC_ALT_VALUES: &[&str] = &["image", "photo", "picture", "img", "graphic", "icon"];

/// Accessibility rules: contrast, accessible names, heading structure,
/// tab order, landmarks and image alt text.
pub fn collect_issues(inspector: &dyn PageInspector) -> Result<Vec<Issue>> {
    let elements = inspector.all();
    if elements.is_empty() {
        // No rendering context: nothing to inspect, not an error.
        return Ok(Vec::new());
    }

    let mut issues = Vec::new();
    check_contrast(&elements, &mut issues);
    check_accessible_names(&elements, &mut issues);
    check_heading_structure(&elements, &mut issues);
    check_tab_order(&elements, &mut issues);
    check_landmarks(inspector, &mut issues);
    check_images(&elements, &mut issues);
    Ok(issues)
}

fn is_large_text(element: &Element) -> bool {
    let size = element.style.font_size.unwrap_or(16.0);
    let weight = element.style.font_weight.unwrap_or(400);
    size >= 18.0 || (size >= 14.0 && weight >= 700)
}

fn check_contrast(elements: &[&Element], issues: &mut Vec<Issue>) {
    for element in elements {
        if element.text.trim().is_empty() {
            continue;
        }
        let (Some(fg), Some(bg)) = (
            element.style.color.as_deref().and_then(Rgb::parse),
            element.style.background_color.as_deref().and_then(Rgb::parse),
        ) else {
            continue;
        };
        let required = if is_large_text(element) {
            CONTRAST_LARGE
        } else {
            CONTRAST_NORMAL
        };
        let ratio = fg.contrast_ratio(&bg);
        if ratio < required {
            let severity = if ratio < CONTRAST_CRITICAL {
                Severity::Critical
            } else {
                Severity::High
            };
            issues.push(
                Issue::new(
                    Category::Accessibility,
                    "contrast",
                    severity,
                    element.descriptor(),
                    format!(
                        "Text contrast ratio {:.2}:1 on {} is below the WCAG minimum of {:.1}:1",
                        ratio,
                        element.descriptor(),
                        required
                    ),
                    "Adjust the text or background color to meet the WCAG AA contrast minimum",
                )
                .with_metric("contrast-ratio", format!("{ratio:.2}:1"), format!("{required:.1}:1")),
            );
        }
    }
}

fn accessible_name(element: &Element) -> bool {
    element
        .attr("aria-label")
        .map(|v| !v.trim().is_empty())
        .unwrap_or(false)
        || element.has_attr("aria-labelledby")
        || element.attr("label").map(|v| !v.trim().is_empty()).unwrap_or(false)
        || element.attr("title").map(|v| !v.trim().is_empty()).unwrap_or(false)
        || element.attr("alt").map(|v| !v.trim().is_empty()).unwrap_or(false)
        || !element.text.trim().is_empty()
}

fn check_accessible_names(elements: &[&Element], issues: &mut Vec<Issue>) {
    for element in elements {
        if !(element.is_form_control() || element.is_interactive()) {
            continue;
        }
        if !accessible_name(element) {
            issues.push(Issue::new(
                Category::Accessibility,
                "labels",
                Severity::High,
                element.descriptor(),
                format!(
                    "Interactive element {} has no accessible name (label, aria-label or text content)",
                    element.descriptor()
                ),
                "Give the control a visible label or an aria-label so screen readers can announce it",
            ));
        }
    }
}

fn check_heading_structure(elements: &[&Element], issues: &mut Vec<Issue>) {
    let mut previous_level: Option<u32> = None;
    for element in elements {
        let level = match element.tag.as_str() {
            "h1" => 1,
            "h2" => 2,
            "h3" => 3,
            "h4" => 4,
            "h5" => 5,
            "h6" => 6,
            _ => continue,
        };
        if let Some(prev) = previous_level {
            if level > prev + 1 {
                issues.push(Issue::new(
                    Category::Accessibility,
                    "heading-structure",
                    Severity::Medium,
                    element.descriptor(),
                    format!("Heading level skips from H{prev} to H{level}"),
                    "Keep heading levels sequential so assistive technology can build a correct outline",
                ));
            }
        }
        previous_level = Some(level);
    }
}

fn check_tab_order(elements: &[&Element], issues: &mut Vec<Issue>) {
    for element in elements {
        let Some(tabindex) = element.attr("tabindex").and_then(|v| v.parse::<i32>().ok()) else {
            continue;
        };
        if tabindex > 0 {
            issues.push(Issue::new(
                Category::Accessibility,
                "tab-order",
                Severity::Medium,
                element.descriptor(),
                format!(
                    "Positive tabindex {tabindex} on {} overrides the natural keyboard navigation order",
                    element.descriptor()
                ),
                "Use tabindex=\"0\" or rely on document order instead of positive tabindex values",
            ));
        }
    }
}

fn check_landmarks(inspector: &dyn PageInspector, issues: &mut Vec<Issue>) {
    if !inspector.has_main_landmark() {
        issues.push(Issue::new(
            Category::Accessibility,
            "landmarks",
            Severity::High,
            "document",
            "Page has no main landmark region",
            "Wrap the primary content in a <main> element or role=\"main\" region",
        ));
    }
    if !inspector.has_root_heading() {
        issues.push(Issue::new(
            Category::Accessibility,
            "heading-structure",
            Severity::Medium,
            "document",
            "Page has no top-level H1 heading",
            "Add a single H1 that describes the page",
        ));
    }
}

fn check_images(elements: &[&Element], issues: &mut Vec<Issue>) {
    for element in elements {
        if element.tag != "img" {
            continue;
        }
        match element.attr("alt") {
            None => {
                issues.push(Issue::new(
                    Category::Accessibility,
                    "alt-text",
                    Severity::High,
                    element.descriptor(),
                    format!("Image {} is missing alt text", element.descriptor()),
                    "Add an alt attribute describing the image, or alt=\"\" if it is decorative",
                ));
            }
            Some(alt) => {
                let trimmed = alt.trim();
                if GENERIC_ALT_VALUES
                    .iter()
                    .any(|generic| trimmed.eq_ignore_ascii_case(generic))
                {
                    issues.push(Issue::new(
                        Category::Accessibility,
                        "alt-text",
                        Severity::Medium,
                        element.descriptor(),
                        format!(
                            "Image {} has generic alt text \"{trimmed}\" that describes nothing",
                            element.descriptor()
                        ),
                        "Replace generic alt text with a description of what the image shows",
                    ));
                } else if trimmed.chars().count() > ALT_TEXT_MAX_LEN {
                    issues.push(Issue::new(
                        Category::Accessibility,
                        "alt-text",
                        Severity::Low,
                        element.descriptor(),
                        format!(
                            "Image {} alt text is {} characters long; alt text should stay under {ALT_TEXT_MAX_LEN}",
                            element.descriptor(),
                            trimmed.chars().count()
                        ),
                        "Shorten the alt text and move long descriptions into surrounding copy",
                    ));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inspector::{NullInspector, PageSnapshot};

    fn text_element(tag: &str, text: &str, color: &str, background: &str) -> Element {
        let mut element = Element::new(tag);
        element.text = text.to_string();
        element.style.color = Some(color.to_string());
        element.style.background_color = Some(background.to_string());
        element.style.font_size = Some(16.0);
        element
    }

    #[test]
    fn white_on_white_yields_exactly_one_critical_contrast_issue() {
        let mut page = PageSnapshot::new("/");
        page.push(text_element("p", "hello", "rgb(255,255,255)", "rgb(255,255,255)"));
        let issues = collect_issues(&page).unwrap();
        let contrast: Vec<_> = issues.iter().filter(|i| i.issue_type == "contrast").collect();
        assert_eq!(contrast.len(), 1);
        assert_eq!(contrast[0].severity, Severity::Critical);
    }

    #[test]
    fn weak_but_readable_contrast_is_high_not_critical() {
        // White on mid-grey is ~4.4:1, below 4.5 but above the unreadable cutoff.
        let mut page = PageSnapshot::new("/");
        page.push(text_element("p", "hello", "rgb(255,255,255)", "rgb(120,120,120)"));
        let issues = collect_issues(&page).unwrap();
        let contrast: Vec<_> = issues.iter().filter(|i| i.issue_type == "contrast").collect();
        assert_eq!(contrast.len(), 1);
        assert_eq!(contrast[0].severity, Severity::High);
    }

    #[test]
    fn large_text_uses_the_relaxed_threshold() {
        // White on rgb(160,160,160) is ~2.6:1 and fails even the 3:1 large-text minimum.
        let mut element = text_element("h2", "hello", "rgb(255,255,255)", "rgb(160,160,160)");
        element.style.font_size = Some(24.0);
        let mut page = PageSnapshot::new("/");
        page.push(element);
        let issues = collect_issues(&page).unwrap();
        assert!(issues.iter().any(|i| i.issue_type == "contrast"));

        // ~4.4:1 fails normal text but passes for 24px text.
        let mut element = text_element("h2", "hello", "rgb(255,255,255)", "rgb(120,120,120)");
        element.style.font_size = Some(24.0);
        let mut page = PageSnapshot::new("/");
        page.push(element);
        let issues = collect_issues(&page).unwrap();
        assert!(!issues.iter().any(|i| i.issue_type == "contrast"));
    }

    #[test]
    fn unnamed_form_control_is_flagged_high() {
        let mut page = PageSnapshot::new("/");
        page.push(Element::new("input"));
        let issues = collect_issues(&page).unwrap();
        let labels: Vec<_> = issues.iter().filter(|i| i.issue_type == "labels").collect();
        assert_eq!(labels.len(), 1);
        assert_eq!(labels[0].severity, Severity::High);

        let mut named = Element::new("input");
        named.attrs.insert("aria-label".to_string(), "Search".to_string());
        let mut page = PageSnapshot::new("/");
        page.push(named);
        let issues = collect_issues(&page).unwrap();
        assert!(!issues.iter().any(|i| i.issue_type == "labels"));
    }

    #[test]
    fn heading_skip_is_flagged() {
        let mut page = PageSnapshot::new("/");
        page.push(Element::new("h1"));
        page.push(Element::new("h3"));
        let issues = collect_issues(&page).unwrap();
        let skip = issues
            .iter()
            .find(|i| i.description.contains("skips from H1 to H3"))
            .expect("heading skip issue");
        assert_eq!(skip.severity, Severity::Medium);
    }

    #[test]
    fn positive_tabindex_is_flagged() {
        let mut element = Element::new("button");
        element.text = "Save".to_string();
        element.attrs.insert("tabindex".to_string(), "3".to_string());
        let mut page = PageSnapshot::new("/");
        page.push(element);
        let issues = collect_issues(&page).unwrap();
        assert!(issues.iter().any(|i| i.issue_type == "tab-order" && i.severity == Severity::Medium));
    }

    #[test]
    fn missing_landmark_and_h1_are_flagged() {
        let mut page = PageSnapshot::new("/");
        page.push(Element::new("div"));
        let issues = collect_issues(&page).unwrap();
        assert!(issues
            .iter()
            .any(|i| i.issue_type == "landmarks" && i.severity == Severity::High));
        assert!(issues
            .iter()
            .any(|i| i.description.contains("H1") && i.severity == Severity::Medium));
    }

    #[test]
    fn image_alt_rules() {
        let mut missing = Element::new("img");
        missing.id = Some("hero".to_string());
        let mut generic = Element::new("img");
        generic.attrs.insert("alt".to_string(), "Image".to_string());
        let mut long = Element::new("img");
        long.attrs.insert("alt".to_string(), "a".repeat(126));
        let mut page = PageSnapshot::new("/");
        page.push(missing);
        page.push(generic);
        page.push(long);
        let issues = collect_issues(&page).unwrap();
        let alts: Vec<_> = issues.iter().filter(|i| i.issue_type == "alt-text").collect();
        assert_eq!(alts.len(), 3);
        assert_eq!(alts[0].severity, Severity::High);
        assert_eq!(alts[1].severity, Severity::Medium);
        assert_eq!(alts[2].severity, Severity::Low);
    }

    #[test]
    fn no_rendering_context_means_no_issues() {
        assert!(collect_issues(&NullInspector).unwrap().is_empty());
    }
}
