use crate::issue::{round1, AuditScore, Category, Issue, Severity};

const MIN_SCORE: f64 = 1.0;
const MAX_SCORE: f64 = 10.0;

/// Fixed penalty per issue. The critical penalty is category-dependent:
/// user-blocking mobile and interaction failures cost slightly more.
fn penalty(category: Category, severity: Severity) -> f64 {
    match severity {
        Severity::Critical => match category {
            Category::MobileUx | Category::InteractionDesign => 3.0,
            _ => 2.5,
        },
        Severity::High => 2.0,
        Severity::Medium => 1.0,
        Severity::Low => 0.5,
    }
}

/// Pure scoring function: start at 10.0, subtract a fixed penalty per issue,
/// clamp to [1.0, 10.0] and round to one decimal.
pub fn score_category(category: Category, issues: Vec<Issue>) -> AuditScore {
    let mut score = MAX_SCORE;
    for issue in &issues {
        score -= penalty(category, issue.severity);
    }
    let score = round1(score.clamp(MIN_SCORE, MAX_SCORE));

    let rendered = issues.iter().map(Issue::render).collect();
    let recommendations = recommendations_for(category, &issues);

    AuditScore {
        score,
        issues: rendered,
        recommendations,
        findings: issues,
    }
}

/// Static per-category guidance, plus conditional items prepended when the
/// matching issue type was actually found. Deduplicated, order preserved.
fn recommendations_for(category: Category, issues: &[Issue]) -> Vec<String> {
    let has_type = |t: &str| issues.iter().any(|i| i.issue_type == t);
    let mut recommendations: Vec<String> = Vec::new();
    let add = |text: &str, recommendations: &mut Vec<String>| {
        if !recommendations.iter().any(|r| r == text) {
            recommendations.push(text.to_string());
        }
    };

    match category {
        Category::Accessibility => {
            if has_type("contrast") {
                add("Fix low-contrast text first; it blocks the largest group of users", &mut recommendations);
            }
            if has_type("labels") {
                add("Label every form control so screen readers can announce it", &mut recommendations);
            }
            if has_type("alt-text") {
                add("Review image alt text page by page", &mut recommendations);
            }
            add("Run keyboard-only passes through the main flows", &mut recommendations);
            add("Test the dashboard with a screen reader", &mut recommendations);
        }
        Category::Performance => {
            if has_type("bundle-size") {
                add("Code-split the bundle and defer non-critical scripts", &mut recommendations);
            }
            if has_type("image-optimization") {
                add("Convert large images to WebP/AVIF and lazy-load below the fold", &mut recommendations);
            }
            add("Track Core Web Vitals on real traffic, not just lab runs", &mut recommendations);
            add("Set a size budget in CI so regressions fail the build", &mut recommendations);
        }
        Category::MobileUx => {
            if has_type("touch-targets") {
                add("Enlarge touch targets to 44x44px before anything else", &mut recommendations);
            }
            if has_type("viewport") {
                add("Fix the viewport meta tag; every other mobile fix depends on it", &mut recommendations);
            }
            add("Test on a real 375px-wide device, not just a resized desktop window", &mut recommendations);
            add("Audit every fixed pixel width against small viewports", &mut recommendations);
        }
        Category::VisualConsistency => {
            if has_type("spacing-scale") {
                add("Define a spacing scale and migrate existing margins/paddings onto it", &mut recommendations);
            }
            if has_type("color-palette") {
                add("Consolidate colors into named palette tokens", &mut recommendations);
            }
            add("Document the design tokens so new screens stay on the system", &mut recommendations);
            add("Sweep for one-off styles during code review", &mut recommendations);
        }
        Category::InteractionDesign => {
            if has_type("loading-feedback") {
                add("Add loading states to every async action", &mut recommendations);
            }
            if has_type("error-handling") {
                add("Surface errors next to the field that caused them", &mut recommendations);
            }
            if has_type("focus-indicators") {
                add("Restore visible focus styles wherever outlines were removed", &mut recommendations);
            }
            add("Walk each flow asking: does the user always know what just happened?", &mut recommendations);
            add("Prefer transform/opacity animations over layout-affecting ones", &mut recommendations);
        }
    }

    recommendations
}
