use crate::inspector::{Element, PageInspector, Rgb};
use crate::issue::{Category, Issue, Severity};
use anyhow::Result;
use std::collections::BTreeSet;

const MAX_SPACING_VALUES: usize = 12;
const MAX_FONT_SIZES: usize = 8;
const MAX_FONT_FAMILIES: usize = 3;
const MAX_TEXT_COLORS: usize = 12;
const MAX_BACKGROUND_COLORS: usize = 8;
/// Colors closer than this in RGB space read as the same color.
const NEAR_DUPLICATE_DISTANCE: f64 = 30.0;

/// Visual consistency rules: spacing scale, typography scale, color palette
/// and layout-system discipline. Most findings here aggregate the whole page
/// into one issue rather than flagging elements individually.
pub fn collect_issues(inspector: &dyn PageInspector) -> Result<Vec<Issue>> {
    let elements = inspector.all();
    if elements.is_empty() {
        return Ok(Vec::new());
    }

    let mut issues = Vec::new();
    check_spacing_scale(&elements, &mut issues);
    check_typography(&elements, &mut issues);
    check_color_palette(&elements, &mut issues);
    check_layout_systems(&elements, &mut issues);
    check_component_styles(&elements, &mut issues);
    Ok(issues)
}

/// Over the limit is medium; over double the limit is high.
fn magnitude_severity(count: usize, limit: usize) -> Option<Severity> {
    if count > limit * 2 {
        Some(Severity::High)
    } else if count > limit {
        Some(Severity::Medium)
    } else {
        None
    }
}

fn spacing_tokens(element: &Element) -> Vec<String> {
    let mut tokens = Vec::new();
    for shorthand in [&element.style.margin, &element.style.padding] {
        if let Some(value) = shorthand {
            tokens.extend(
                value
                    .split_whitespace()
                    .filter(|t| t.ends_with("px") && *t != "0px")
                    .map(|t| t.to_string()),
            );
        }
    }
    tokens
}

fn check_spacing_scale(elements: &[&Element], issues: &mut Vec<Issue>) {
    let mut distinct: BTreeSet<String> = BTreeSet::new();
    let mut fractional: BTreeSet<String> = BTreeSet::new();
    for element in elements {
        for token in spacing_tokens(element) {
            if let Some(number) = token.strip_suffix("px") {
                if number.parse::<f64>().map(|v| v.fract() != 0.0).unwrap_or(false) {
                    fractional.insert(token.clone());
                }
            }
            distinct.insert(token);
        }
    }
    if let Some(severity) = magnitude_severity(distinct.len(), MAX_SPACING_VALUES) {
        issues.push(Issue::new(
            Category::VisualConsistency,
            "spacing-scale",
            severity,
            "various",
            format!(
                "{} distinct margin/padding values are in use; a consistent scale needs at most {MAX_SPACING_VALUES}",
                distinct.len()
            ),
            "Adopt a fixed spacing scale (4/8/12/16...) and round existing values onto it",
        ));
    }
    if !fractional.is_empty() {
        issues.push(Issue::new(
            Category::VisualConsistency,
            "spacing-scale",
            Severity::Low,
            "various",
            format!(
                "{} fractional spacing value(s) such as {} suggest ad-hoc pixel nudging",
                fractional.len(),
                fractional.iter().next().map(String::as_str).unwrap_or("")
            ),
            "Replace fractional margins/paddings with whole steps from the spacing scale",
        ));
    }
}

fn check_typography(elements: &[&Element], issues: &mut Vec<Issue>) {
    let mut sizes: BTreeSet<String> = BTreeSet::new();
    let mut families: BTreeSet<String> = BTreeSet::new();
    for element in elements {
        if let Some(size) = element.style.font_size {
            sizes.insert(format!("{size}"));
        }
        if let Some(family) = &element.style.font_family {
            if let Some(primary) = family.split(',').next() {
                families.insert(primary.trim().trim_matches('"').to_ascii_lowercase());
            }
        }
    }
    if let Some(severity) = magnitude_severity(sizes.len(), MAX_FONT_SIZES) {
        issues.push(Issue::new(
            Category::VisualConsistency,
            "typography",
            severity,
            "various",
            format!(
                "{} distinct font sizes are in use; a type scale needs at most {MAX_FONT_SIZES}",
                sizes.len()
            ),
            "Define a type scale and map every text style onto one of its steps",
        ));
    }
    if let Some(severity) = magnitude_severity(families.len(), MAX_FONT_FAMILIES) {
        issues.push(Issue::new(
            Category::VisualConsistency,
            "typography",
            severity,
            "various",
            format!(
                "{} font families are in use; stick to at most {MAX_FONT_FAMILIES}",
                families.len()
            ),
            "Consolidate to one primary family plus at most one accent and one monospace",
        ));
    }
}

fn check_color_palette(elements: &[&Element], issues: &mut Vec<Issue>) {
    let mut text_colors: Vec<Rgb> = Vec::new();
    let mut background_colors: Vec<Rgb> = Vec::new();
    for element in elements {
        if let Some(color) = element.style.color.as_deref().and_then(Rgb::parse) {
            if !text_colors.contains(&color) {
                text_colors.push(color);
            }
        }
        if let Some(color) = element.style.background_color.as_deref().and_then(Rgb::parse) {
            if !background_colors.contains(&color) {
                background_colors.push(color);
            }
        }
    }
    if let Some(severity) = magnitude_severity(text_colors.len(), MAX_TEXT_COLORS) {
        issues.push(Issue::new(
            Category::VisualConsistency,
            "color-palette",
            severity,
            "various",
            format!(
                "{} distinct text colors are in use; a palette needs at most {MAX_TEXT_COLORS}",
                text_colors.len()
            ),
            "Reduce text colors to the palette's defined foreground shades",
        ));
    }
    if let Some(severity) = magnitude_severity(background_colors.len(), MAX_BACKGROUND_COLORS) {
        issues.push(Issue::new(
            Category::VisualConsistency,
            "color-palette",
            severity,
            "various",
            format!(
                "{} distinct background colors are in use; a palette needs at most {MAX_BACKGROUND_COLORS}",
                background_colors.len()
            ),
            "Reduce backgrounds to the palette's defined surface shades",
        ));
    }

    let mut all_colors = text_colors;
    for color in background_colors {
        if !all_colors.contains(&color) {
            all_colors.push(color);
        }
    }
    let mut near_duplicates = 0usize;
    for (i, a) in all_colors.iter().enumerate() {
        for b in all_colors.iter().skip(i + 1) {
            let distance = a.distance(b);
            if distance > 0.0 && distance < NEAR_DUPLICATE_DISTANCE {
                near_duplicates += 1;
            }
        }
    }
    if near_duplicates > 0 {
        issues.push(Issue::new(
            Category::VisualConsistency,
            "color-palette",
            Severity::Low,
            "various",
            format!(
                "{near_duplicates} pair(s) of colors are nearly identical and should be merged"
            ),
            "Merge near-duplicate colors into a single palette token",
        ));
    }
}

fn check_layout_systems(elements: &[&Element], issues: &mut Vec<Issue>) {
    let uses_grid = elements
        .iter()
        .any(|e| e.style.display.as_deref() == Some("grid"));
    let uses_flex = elements
        .iter()
        .any(|e| e.style.display.as_deref() == Some("flex"));
    if uses_grid && uses_flex {
        issues.push(Issue::new(
            Category::VisualConsistency,
            "layout",
            Severity::Low,
            "various",
            "Page mixes CSS Grid and Flexbox for top-level layout",
            "Pick one layout system per level of the hierarchy to keep spacing predictable",
        ));
    }
    let floats = elements
        .iter()
        .filter(|e| matches!(e.style.float.as_deref(), Some("left") | Some("right")))
        .count();
    if floats > 0 {
        issues.push(Issue::new(
            Category::VisualConsistency,
            "layout",
            Severity::Low,
            "various",
            format!("{floats} element(s) still use float-based layout"),
            "Replace float layout with Flexbox or Grid",
        ));
    }
}

fn style_combo(element: &Element) -> String {
    format!(
        "{}|{}|{}",
        element.style.background_color.as_deref().unwrap_or("-"),
        element.style.font_size.map(|s| s.to_string()).unwrap_or_else(|| "-".to_string()),
        element.style.border_radius.as_deref().unwrap_or("-"),
    )
}

fn check_component_styles(elements: &[&Element], issues: &mut Vec<Issue>) {
    let buttons: Vec<&Element> = elements.iter().copied().filter(|e| e.tag == "button").collect();
    let inputs: Vec<&Element> = elements.iter().copied().filter(|e| e.tag == "input").collect();
    let cards: Vec<&Element> = elements
        .iter()
        .copied()
        .filter(|e| e.classes.iter().any(|c| c.contains("card")))
        .collect();
    for (name, members) in [("button", buttons), ("input", inputs), ("card", cards)] {
        if members.len() < 4 {
            continue;
        }
        let combos: BTreeSet<String> = members.iter().map(|e| style_combo(e)).collect();
        if combos.len() > members.len() / 2 {
            issues.push(Issue::new(
                Category::VisualConsistency,
                "component-styles",
                Severity::Medium,
                "various",
                format!(
                    "{} {name} style variations across {} {name} element(s) look unsystematic",
                    combos.len(),
                    members.len()
                ),
                format!("Consolidate {name} styling into a small set of shared variants"),
            ));
        } else if combos.len() > 3 {
            issues.push(Issue::new(
                Category::VisualConsistency,
                "component-styles",
                Severity::Low,
                "various",
                format!(
                    "{} {name} style variations across {} {name} element(s)",
                    combos.len(),
                    members.len()
                ),
                format!("Reduce {name} variants to the design system's defined set"),
            ));
        }
    }
}
