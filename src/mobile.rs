use crate::inspector::{Element, PageInspector};
use crate::issue::{Category, Issue, Severity};
use anyhow::Result;

/// Accepted minimum tappable size, in pixels.
const MIN_TOUCH_TARGET: f64 = 44.0;
/// Minimum gap between neighbouring interactive elements.
const MIN_TOUCH_SPACING: f64 = 8.0;
/// Fixed widths beyond a small phone viewport break narrow screens.
const MAX_FIXED_WIDTH: f64 = 375.0;
/// Body copy below this size is hard to read on a phone.
const MIN_BODY_FONT: f64 = 16.0;

const TEXT_TAGS: &[&str] = &["p", "span", "li", "td", "label", "body"];

/// Mobile usability rules: touch targets, the viewport meta tag, fixed
/// widths, horizontal overflow, body text size and touch spacing.
pub fn collect_issues(inspector: &dyn PageInspector) -> Result<Vec<Issue>> {
    let elements = inspector.all();
    if elements.is_empty() {
        return Ok(Vec::new());
    }

    let mut issues = Vec::new();
    check_touch_targets(inspector, &mut issues);
    check_viewport_meta(&elements, &mut issues);
    check_fixed_widths(&elements, &mut issues);
    check_horizontal_overflow(inspector, &elements, &mut issues);
    check_body_text(&elements, &mut issues);
    check_touch_spacing(inspector, &mut issues);
    Ok(issues)
}

fn check_touch_targets(inspector: &dyn PageInspector, issues: &mut Vec<Issue>) {
    for element in inspector.interactive() {
        let rect = element.rect;
        if rect.width == 0.0 && rect.height == 0.0 {
            // Not laid out; treated as hidden.
            continue;
        }
        if rect.width < MIN_TOUCH_TARGET || rect.height < MIN_TOUCH_TARGET {
            issues.push(
                Issue::new(
                    Category::MobileUx,
                    "touch-targets",
                    Severity::High,
                    element.descriptor(),
                    format!(
                        "Touch target {} measures {:.0}x{:.0}px, below the {:.0}x{:.0}px minimum",
                        element.descriptor(),
                        rect.width,
                        rect.height,
                        MIN_TOUCH_TARGET,
                        MIN_TOUCH_TARGET
                    ),
                    "Enlarge the tappable area to at least 44x44px, padding included",
                )
                .with_metric(
                    "touch-target",
                    format!("{:.0}x{:.0}px", rect.width, rect.height),
                    "44x44px",
                ),
            );
        }
    }
}

fn check_viewport_meta(elements: &[&Element], issues: &mut Vec<Issue>) {
    let viewport_meta = elements
        .iter()
        .find(|e| e.tag == "meta" && e.attr("name") == Some("viewport"));
    match viewport_meta {
        None => {
            issues.push(Issue::new(
                Category::MobileUx,
                "viewport",
                Severity::Critical,
                "document",
                "Page has no viewport meta tag; mobile browsers will render the desktop layout",
                "Add <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">",
            ));
        }
        Some(meta) => {
            let content = meta.attr("content").unwrap_or("");
            if !content.contains("width=device-width") {
                issues.push(Issue::new(
                    Category::MobileUx,
                    "viewport",
                    Severity::Critical,
                    "document",
                    "Viewport meta tag does not set width=device-width",
                    "Set the viewport content to \"width=device-width, initial-scale=1\"",
                ));
            }
        }
    }
}

fn parse_px(value: &str) -> Option<f64> {
    value.trim().strip_suffix("px")?.trim().parse().ok()
}

fn check_fixed_widths(elements: &[&Element], issues: &mut Vec<Issue>) {
    for element in elements {
        let Some(width) = element.style.width.as_deref().and_then(parse_px) else {
            continue;
        };
        if width > MAX_FIXED_WIDTH {
            issues.push(Issue::new(
                Category::MobileUx,
                "responsive",
                Severity::Medium,
                element.descriptor(),
                format!(
                    "Element {} has a fixed width of {width:.0}px, wider than a {MAX_FIXED_WIDTH:.0}px phone viewport",
                    element.descriptor()
                ),
                "Use max-width or a responsive unit instead of a fixed pixel width",
            ));
        }
    }
}

fn check_horizontal_overflow(
    inspector: &dyn PageInspector,
    elements: &[&Element],
    issues: &mut Vec<Issue>,
) {
    let Some(viewport) = inspector.viewport_width() else {
        return;
    };
    if let Some(scroll) = inspector.scroll_width() {
        if scroll > viewport {
            issues.push(
                Issue::new(
                    Category::MobileUx,
                    "responsive",
                    Severity::High,
                    "document",
                    format!(
                        "Page content is {scroll:.0}px wide and scrolls horizontally in a {viewport:.0}px viewport"
                    ),
                    "Find the overflowing element and constrain it to the viewport width",
                )
                .with_metric("scroll-width", format!("{scroll:.0}px"), format!("{viewport:.0}px")),
            );
        }
    }
    for element in elements {
        if element.rect.width > 0.0 && element.rect.right() > viewport {
            issues.push(Issue::new(
                Category::MobileUx,
                "responsive",
                Severity::Medium,
                element.descriptor(),
                format!(
                    "Element {} extends to {:.0}px, past the {viewport:.0}px viewport edge",
                    element.descriptor(),
                    element.rect.right()
                ),
                "Constrain the element so it does not overflow the viewport",
            ));
        }
    }
}

fn check_body_text(elements: &[&Element], issues: &mut Vec<Issue>) {
    let small: Vec<&&Element> = elements
        .iter()
        .filter(|e| {
            TEXT_TAGS.contains(&e.tag.as_str())
                && !e.text.trim().is_empty()
                && e.style.font_size.map(|s| s < MIN_BODY_FONT).unwrap_or(false)
        })
        .collect();
    if !small.is_empty() {
        issues.push(Issue::new(
            Category::MobileUx,
            "font-size",
            Severity::Medium,
            "various",
            format!(
                "{} text element(s) render below the {MIN_BODY_FONT:.0}px mobile-readable font size",
                small.len()
            ),
            "Use at least 16px for body copy on mobile viewports",
        ));
    }
}

fn check_touch_spacing(inspector: &dyn PageInspector, issues: &mut Vec<Issue>) {
    let interactive: Vec<_> = inspector
        .interactive()
        .into_iter()
        .filter(|e| e.rect.width > 0.0 || e.rect.height > 0.0)
        .collect();
    let mut crowded_pairs = 0usize;
    for (i, a) in interactive.iter().enumerate() {
        for b in interactive.iter().skip(i + 1) {
            if let Some(gap) = a.rect.gap_to(&b.rect) {
                if gap < MIN_TOUCH_SPACING {
                    crowded_pairs += 1;
                }
            }
        }
    }
    if crowded_pairs > 0 {
        issues.push(Issue::new(
            Category::MobileUx,
            "spacing",
            Severity::Medium,
            "various",
            format!(
                "{crowded_pairs} pair(s) of interactive elements sit closer than {MIN_TOUCH_SPACING:.0}px apart"
            ),
            "Add spacing between tappable controls so users do not hit the wrong one",
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inspector::{NullInspector, PageSnapshot, Rect};

    fn viewport_meta() -> Element {
        let mut meta = Element::new("meta");
        meta.attrs.insert("name".to_string(), "viewport".to_string());
        meta.attrs.insert(
            "content".to_string(),
            "width=device-width, initial-scale=1".to_string(),
        );
        meta
    }

    fn sized_button(id: &str, x: f64, y: f64, width: f64, height: f64) -> Element {
        let mut button = Element::new("button");
        button.id = Some(id.to_string());
        button.text = "Go".to_string();
        button.rect = Rect { x, y, width, height };
        button
    }

    #[test]
    fn small_touch_target_is_flagged_with_its_size() {
        let mut page = PageSnapshot::new("/");
        page.push(viewport_meta());
        page.push(sized_button("tiny", 0.0, 0.0, 30.0, 30.0));
        let issues = collect_issues(&page).unwrap();
        let target = issues
            .iter()
            .find(|i| i.issue_type == "touch-targets")
            .expect("touch target issue");
        assert_eq!(target.severity, Severity::High);
        assert!(target.description.contains("30x30px"), "{}", target.description);
    }

    #[test]
    fn minimum_sized_touch_target_is_never_flagged() {
        let mut page = PageSnapshot::new("/");
        page.push(viewport_meta());
        page.push(sized_button("ok", 0.0, 0.0, 44.0, 44.0));
        let issues = collect_issues(&page).unwrap();
        assert!(!issues.iter().any(|i| i.issue_type == "touch-targets"));
    }

    #[test]
    fn missing_viewport_meta_is_critical() {
        let mut page = PageSnapshot::new("/");
        page.push(Element::new("div"));
        let issues = collect_issues(&page).unwrap();
        assert!(issues
            .iter()
            .any(|i| i.issue_type == "viewport" && i.severity == Severity::Critical));
    }

    #[test]
    fn malformed_viewport_meta_is_critical() {
        let mut meta = Element::new("meta");
        meta.attrs.insert("name".to_string(), "viewport".to_string());
        meta.attrs.insert("content".to_string(), "width=1024".to_string());
        let mut page = PageSnapshot::new("/");
        page.push(meta);
        let issues = collect_issues(&page).unwrap();
        assert!(issues
            .iter()
            .any(|i| i.issue_type == "viewport" && i.severity == Severity::Critical));
    }

    #[test]
    fn fixed_width_beyond_phone_viewport_is_flagged() {
        let mut wide = Element::new("div");
        wide.style.width = Some("400px".to_string());
        let mut page = PageSnapshot::new("/");
        page.push(viewport_meta());
        page.push(wide);
        let issues = collect_issues(&page).unwrap();
        assert!(issues
            .iter()
            .any(|i| i.issue_type == "responsive" && i.description.contains("400px")));
    }

    #[test]
    fn horizontal_overflow_is_flagged_at_page_and_element_level() {
        let mut page = PageSnapshot::new("/");
        page.viewport_width = Some(375.0);
        page.scroll_width = Some(500.0);
        page.push(viewport_meta());
        let mut wide = Element::new("div");
        wide.rect = Rect { x: 300.0, y: 0.0, width: 200.0, height: 50.0 };
        page.push(wide);
        let issues = collect_issues(&page).unwrap();
        assert!(issues
            .iter()
            .any(|i| i.severity == Severity::High && i.description.contains("scrolls horizontally")));
        assert!(issues
            .iter()
            .any(|i| i.severity == Severity::Medium && i.description.contains("viewport edge")));
    }

    #[test]
    fn small_body_text_aggregates_to_one_issue() {
        let mut page = PageSnapshot::new("/");
        page.push(viewport_meta());
        for _ in 0..3 {
            let mut p = Element::new("p");
            p.text = "copy".to_string();
            p.style.font_size = Some(13.0);
            page.push(p);
        }
        let issues = collect_issues(&page).unwrap();
        let font: Vec<_> = issues.iter().filter(|i| i.issue_type == "font-size").collect();
        assert_eq!(font.len(), 1);
        assert_eq!(font[0].element, "various");
        assert!(font[0].description.starts_with("3 "));
    }

    #[test]
    fn crowded_interactive_elements_are_flagged() {
        let mut page = PageSnapshot::new("/");
        page.push(viewport_meta());
        page.push(sized_button("a", 0.0, 0.0, 44.0, 44.0));
        page.push(sized_button("b", 0.0, 48.0, 44.0, 44.0));
        let issues = collect_issues(&page).unwrap();
        assert!(issues.iter().any(|i| i.issue_type == "spacing"));

        let mut page = PageSnapshot::new("/");
        page.push(viewport_meta());
        page.push(sized_button("a", 0.0, 0.0, 44.0, 44.0));
        page.push(sized_button("b", 0.0, 60.0, 44.0, 44.0));
        let issues = collect_issues(&page).unwrap();
        assert!(!issues.iter().any(|i| i.issue_type == "spacing"));
    }

    #[test]
    fn no_rendering_context_means_no_issues() {
        assert!(collect_issues(&NullInspector).unwrap().is_empty());
    }
}
