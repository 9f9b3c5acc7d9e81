use crate::inspector::{PageInspector, ResourceKind, WebVitals};
use crate::issue::{Category, Issue, Severity};
use anyhow::Result;
use std::time::Duration;

/// How long to wait for paint/layout-shift/input samples before giving up.
/// Observational data past this window is treated as unavailable.
const VITALS_SAMPLE_WINDOW: Duration = Duration::from_millis(250);

const LCP_HIGH_MS: f64 = 2500.0;
const LCP_MEDIUM_MS: f64 = 1200.0;
const CLS_HIGH: f64 = 0.25;
const CLS_MEDIUM: f64 = 0.1;
const FID_HIGH_MS: f64 = 300.0;
const FID_MEDIUM_MS: f64 = 100.0;

const JS_TOTAL_CRITICAL: u64 = 1024 * 1024;
const JS_TOTAL_HIGH: u64 = 500 * 1024;
const JS_CHUNK_HIGH: u64 = 500 * 1024;
const JS_CHUNK_MEDIUM: u64 = 250 * 1024;
const CSS_TOTAL_HIGH: u64 = 200 * 1024;
const CSS_TOTAL_MEDIUM: u64 = 100 * 1024;

/// Images after this many are below the fold often enough to lazy-load.
const EAGER_IMAGE_BUDGET: usize = 3;

const MODERN_IMAGE_FORMATS: &[&str] = &["webp", "avif", "svg"];

/// Performance rules: Core Web Vitals thresholds, script/stylesheet budgets
/// and image delivery. The only analyzer with a suspension point: vitals are
/// observational and awaited within a bounded sampling window.
pub async fn collect_issues(inspector: &dyn PageInspector) -> Result<Vec<Issue>> {
    let mut issues = Vec::new();

    let vitals = tokio::time::timeout(VITALS_SAMPLE_WINDOW, sample_vitals(inspector))
        .await
        .unwrap_or(None);
    if let Some(vitals) = vitals {
        check_vitals(&vitals, &mut issues);
    }

    check_bundles(inspector, &mut issues);
    check_images(inspector, &mut issues);
    Ok(issues)
}

async fn sample_vitals(inspector: &dyn PageInspector) -> Option<WebVitals> {
    // Snapshot-backed inspectors resolve immediately; a live inspector may
    // suspend here until its observation window closes.
    inspector.web_vitals()
}

fn check_vitals(vitals: &WebVitals, issues: &mut Vec<Issue>) {
    if let Some(lcp) = vitals.lcp_ms {
        let severity = if lcp > LCP_HIGH_MS {
            Some(Severity::High)
        } else if lcp > LCP_MEDIUM_MS {
            Some(Severity::Medium)
        } else {
            None
        };
        if let Some(severity) = severity {
            issues.push(
                Issue::new(
                    Category::Performance,
                    "core-web-vitals",
                    severity,
                    "page",
                    format!("Largest Contentful Paint of {lcp:.0}ms exceeds the {LCP_MEDIUM_MS:.0}ms target"),
                    "Preload the largest above-the-fold asset and trim render-blocking resources",
                )
                .with_metric("LCP", format!("{lcp:.0}ms"), format!("{LCP_MEDIUM_MS:.0}ms")),
            );
        }
    }
    if let Some(cls) = vitals.cls {
        let severity = if cls > CLS_HIGH {
            Some(Severity::High)
        } else if cls > CLS_MEDIUM {
            Some(Severity::Medium)
        } else {
            None
        };
        if let Some(severity) = severity {
            issues.push(
                Issue::new(
                    Category::Performance,
                    "core-web-vitals",
                    severity,
                    "page",
                    format!("Cumulative Layout Shift of {cls:.2} exceeds the {CLS_MEDIUM} stability target"),
                    "Reserve space for images, embeds and async content so the layout does not move",
                )
                .with_metric("CLS", format!("{cls:.2}"), format!("{CLS_MEDIUM}")),
            );
        }
    }
    if let Some(fid) = vitals.fid_ms {
        let severity = if fid > FID_HIGH_MS {
            Some(Severity::High)
        } else if fid > FID_MEDIUM_MS {
            Some(Severity::Medium)
        } else {
            None
        };
        if let Some(severity) = severity {
            issues.push(
                Issue::new(
                    Category::Performance,
                    "core-web-vitals",
                    severity,
                    "page",
                    format!("First Input Delay of {fid:.0}ms exceeds the {FID_MEDIUM_MS:.0}ms responsiveness target"),
                    "Break up long main-thread tasks and defer non-essential scripts",
                )
                .with_metric("FID", format!("{fid:.0}ms"), format!("{FID_MEDIUM_MS:.0}ms")),
            );
        }
    }
}

fn format_kb(bytes: u64) -> String {
    format!("{:.0}KB", bytes as f64 / 1024.0)
}

fn check_bundles(inspector: &dyn PageInspector, issues: &mut Vec<Issue>) {
    let resources = inspector.resources();
    if resources.is_empty() {
        return;
    }

    let js_total: u64 = resources
        .iter()
        .filter(|r| r.kind == ResourceKind::Script)
        .map(|r| r.bytes)
        .sum();
    let css_total: u64 = resources
        .iter()
        .filter(|r| r.kind == ResourceKind::Stylesheet)
        .map(|r| r.bytes)
        .sum();

    if js_total > JS_TOTAL_CRITICAL {
        issues.push(
            Issue::new(
                Category::Performance,
                "bundle-size",
                Severity::Critical,
                "scripts",
                format!("Total JavaScript bundle size of {} exceeds the 1MB budget", format_kb(js_total)),
                "Split the bundle, tree-shake unused code and lazy-load non-critical routes",
            )
            .with_metric("js-total", format_kb(js_total), format_kb(JS_TOTAL_HIGH)),
        );
    } else if js_total > JS_TOTAL_HIGH {
        issues.push(
            Issue::new(
                Category::Performance,
                "bundle-size",
                Severity::High,
                "scripts",
                format!("Total JavaScript bundle size of {} exceeds the 500KB budget", format_kb(js_total)),
                "Audit dependencies and code-split the largest routes",
            )
            .with_metric("js-total", format_kb(js_total), format_kb(JS_TOTAL_HIGH)),
        );
    }

    for resource in &resources {
        if resource.kind != ResourceKind::Script {
            continue;
        }
        let severity = if resource.bytes > JS_CHUNK_HIGH {
            Some(Severity::High)
        } else if resource.bytes > JS_CHUNK_MEDIUM {
            Some(Severity::Medium)
        } else {
            None
        };
        if let Some(severity) = severity {
            issues.push(
                Issue::new(
                    Category::Performance,
                    "bundle-size",
                    severity,
                    resource.name.clone(),
                    format!(
                        "Script chunk {} weighs {}, above the {} per-chunk budget",
                        resource.name,
                        format_kb(resource.bytes),
                        format_kb(JS_CHUNK_MEDIUM)
                    ),
                    "Split this chunk or defer it until the code is needed",
                )
                .with_metric("js-chunk", format_kb(resource.bytes), format_kb(JS_CHUNK_MEDIUM)),
            );
        }
    }

    let css_severity = if css_total > CSS_TOTAL_HIGH {
        Some(Severity::High)
    } else if css_total > CSS_TOTAL_MEDIUM {
        Some(Severity::Medium)
    } else {
        None
    };
    if let Some(severity) = css_severity {
        issues.push(
            Issue::new(
                Category::Performance,
                "stylesheet-size",
                severity,
                "stylesheets",
                format!(
                    "Total CSS size of {} exceeds the {} budget",
                    format_kb(css_total),
                    format_kb(CSS_TOTAL_MEDIUM)
                ),
                "Remove unused selectors and split page-specific styles out of the global sheet",
            )
            .with_metric("css-total", format_kb(css_total), format_kb(CSS_TOTAL_MEDIUM)),
        );
    }
}

fn check_images(inspector: &dyn PageInspector, issues: &mut Vec<Issue>) {
    let images = inspector.by_tag("img");
    for (index, image) in images.iter().enumerate() {
        if !image.has_attr("width") || !image.has_attr("height") {
            issues.push(Issue::new(
                Category::Performance,
                "image-optimization",
                Severity::Medium,
                image.descriptor(),
                format!(
                    "Image {} has no explicit width/height and will shift the layout while loading",
                    image.descriptor()
                ),
                "Set width and height attributes so the browser can reserve space",
            ));
        }
        if let Some(src) = image.attr("src") {
            let extension = src.rsplit('.').next().unwrap_or("").to_ascii_lowercase();
            if !extension.is_empty() && !MODERN_IMAGE_FORMATS.contains(&extension.as_str()) {
                issues.push(Issue::new(
                    Category::Performance,
                    "image-optimization",
                    Severity::Medium,
                    image.descriptor(),
                    format!(
                        "Image {} is served as .{extension} instead of a modern format",
                        image.descriptor()
                    ),
                    "Serve images as WebP or AVIF with the legacy format as a fallback",
                ));
            }
        }
        if !image.has_attr("alt") {
            issues.push(Issue::new(
                Category::Performance,
                "image-optimization",
                Severity::Medium,
                image.descriptor(),
                format!("Image {} is missing alt text", image.descriptor()),
                "Add an alt attribute describing the image",
            ));
        }
        if index >= EAGER_IMAGE_BUDGET && image.attr("loading") != Some("lazy") {
            issues.push(Issue::new(
                Category::Performance,
                "image-optimization",
                Severity::Low,
                image.descriptor(),
                format!(
                    "Image {} loads eagerly even though it is likely below the fold",
                    image.descriptor()
                ),
                "Add loading=\"lazy\" to images past the first screenful",
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inspector::{Element, NullInspector, PageSnapshot, Resource};

    fn page_with_vitals(lcp: f64, cls: f64, fid: f64) -> PageSnapshot {
        let mut page = PageSnapshot::new("/");
        page.push(Element::new("div"));
        page.vitals = Some(WebVitals {
            lcp_ms: Some(lcp),
            cls: Some(cls),
            fid_ms: Some(fid),
        });
        page
    }

    #[tokio::test]
    async fn slow_vitals_are_flagged_at_both_tiers() {
        let issues = collect_issues(&page_with_vitals(3000.0, 0.3, 400.0)).await.unwrap();
        let vitals: Vec<_> = issues.iter().filter(|i| i.issue_type == "core-web-vitals").collect();
        assert_eq!(vitals.len(), 3);
        assert!(vitals.iter().all(|i| i.severity == Severity::High));

        let issues = collect_issues(&page_with_vitals(1500.0, 0.15, 150.0)).await.unwrap();
        let vitals: Vec<_> = issues.iter().filter(|i| i.issue_type == "core-web-vitals").collect();
        assert_eq!(vitals.len(), 3);
        assert!(vitals.iter().all(|i| i.severity == Severity::Medium));
    }

    #[tokio::test]
    async fn fast_vitals_are_clean() {
        let issues = collect_issues(&page_with_vitals(900.0, 0.05, 50.0)).await.unwrap();
        assert!(!issues.iter().any(|i| i.issue_type == "core-web-vitals"));
    }

    #[tokio::test]
    async fn oversized_js_bundle_is_critical() {
        let mut page = PageSnapshot::new("/");
        page.resources.push(Resource {
            kind: ResourceKind::Script,
            name: "main.js".to_string(),
            bytes: 1_200 * 1024,
        });
        let issues = collect_issues(&page).await.unwrap();
        assert!(issues
            .iter()
            .any(|i| i.issue_type == "bundle-size" && i.severity == Severity::Critical));
        // The single chunk also blows the per-chunk budget.
        assert!(issues
            .iter()
            .any(|i| i.description.contains("chunk") && i.severity == Severity::High));
    }

    #[tokio::test]
    async fn css_budget_tiers() {
        let mut page = PageSnapshot::new("/");
        page.resources.push(Resource {
            kind: ResourceKind::Stylesheet,
            name: "app.css".to_string(),
            bytes: 150 * 1024,
        });
        let issues = collect_issues(&page).await.unwrap();
        let css: Vec<_> = issues.iter().filter(|i| i.issue_type == "stylesheet-size").collect();
        assert_eq!(css.len(), 1);
        assert_eq!(css[0].severity, Severity::Medium);
    }

    #[tokio::test]
    async fn image_rules_cover_sizing_format_alt_and_lazy_loading() {
        let mut page = PageSnapshot::new("/");
        for i in 0..5 {
            let mut img = Element::new("img");
            img.id = Some(format!("img{i}"));
            img.attrs.insert("src".to_string(), format!("photo{i}.jpg"));
            img.attrs.insert("alt".to_string(), format!("Chart {i} of revenue"));
            img.attrs.insert("width".to_string(), "100".to_string());
            img.attrs.insert("height".to_string(), "100".to_string());
            page.push(img);
        }
        let issues = collect_issues(&page).await.unwrap();
        // Five legacy-format findings, two lazy-loading findings (4th and 5th image).
        let format_count = issues.iter().filter(|i| i.description.contains("modern format")).count();
        let lazy_count = issues.iter().filter(|i| i.description.contains("eagerly")).count();
        assert_eq!(format_count, 5);
        assert_eq!(lazy_count, 2);
        assert!(issues
            .iter()
            .filter(|i| i.issue_type == "image-optimization")
            .all(|i| matches!(i.severity, Severity::Medium | Severity::Low)));
    }

    #[tokio::test]
    async fn no_rendering_context_means_no_issues() {
        assert!(collect_issues(&NullInspector).await.unwrap().is_empty());
    }
}
