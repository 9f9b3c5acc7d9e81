use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Resolved position and size of an element, in CSS pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    #[serde(default)]
    pub width: f64,
    #[serde(default)]
    pub height: f64,
}

impl Rect {
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Smallest gap between two non-overlapping rects along either axis.
    /// Returns `None` when the rects overlap.
    pub fn gap_to(&self, other: &Rect) -> Option<f64> {
        let horizontal = if self.right() <= other.x {
            Some(other.x - self.right())
        } else if other.right() <= self.x {
            Some(self.x - other.right())
        } else {
            None
        };
        let vertical = if self.bottom() <= other.y {
            Some(other.y - self.bottom())
        } else if other.bottom() <= self.y {
            Some(self.y - other.bottom())
        } else {
            None
        };
        match (horizontal, vertical) {
            (Some(h), Some(v)) => Some(h.min(v)),
            (Some(h), None) => Some(h),
            (None, Some(v)) => Some(v),
            (None, None) => None,
        }
    }
}

/// Resolved visual style for an element, as reported by the renderer.
/// Absent fields mean the renderer did not resolve that property.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ComputedStyle {
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub background_color: Option<String>,
    /// Font size in pixels.
    #[serde(default)]
    pub font_size: Option<f64>,
    #[serde(default)]
    pub font_weight: Option<u32>,
    #[serde(default)]
    pub font_family: Option<String>,
    #[serde(default)]
    pub display: Option<String>,
    #[serde(default)]
    pub float: Option<String>,
    #[serde(default)]
    pub cursor: Option<String>,
    #[serde(default)]
    pub outline: Option<String>,
    #[serde(default)]
    pub box_shadow: Option<String>,
    #[serde(default)]
    pub transition: Option<String>,
    #[serde(default)]
    pub border_radius: Option<String>,
    /// Declared width, e.g. `"400px"` or `"100%"`.
    #[serde(default)]
    pub width: Option<String>,
    /// Shorthand margin, e.g. `"12px 8px"`.
    #[serde(default)]
    pub margin: Option<String>,
    #[serde(default)]
    pub padding: Option<String>,
    /// CSS properties touched by animations or transitions on this element.
    #[serde(default)]
    pub animated_properties: Vec<String>,
}

/// One element of a rendered page.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Element {
    pub tag: String,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub classes: Vec<String>,
    #[serde(default)]
    pub attrs: HashMap<String, String>,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub style: ComputedStyle,
    #[serde(default)]
    pub rect: Rect,
    #[serde(default)]
    pub child_count: usize,
}

impl Element {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            ..Default::default()
        }
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(|v| v.as_str())
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attrs.contains_key(name)
    }

    pub fn class_list(&self) -> String {
        self.classes.join(" ")
    }

    /// Links, buttons, form controls and anything given a button role or a
    /// click handler by the renderer.
    pub fn is_interactive(&self) -> bool {
        matches!(self.tag.as_str(), "a" | "button" | "input" | "select" | "textarea")
            || self.attr("role") == Some("button")
            || self.has_attr("onclick")
    }

    pub fn is_form_control(&self) -> bool {
        match self.tag.as_str() {
            "input" => self.attr("type") != Some("hidden"),
            "select" | "textarea" => true,
            _ => false,
        }
    }

    /// Human-readable pointer used in issue locations, e.g. `button#save`.
    pub fn descriptor(&self) -> String {
        match (&self.id, self.classes.first()) {
            (Some(id), _) => format!("{}#{}", self.tag, id),
            (None, Some(class)) => format!("{}.{}", self.tag, class),
            (None, None) => self.tag.clone(),
        }
    }
}

/// Observational paint/layout/input samples for the current page.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct WebVitals {
    /// Largest Contentful Paint, milliseconds.
    #[serde(default)]
    pub lcp_ms: Option<f64>,
    /// Cumulative Layout Shift score.
    #[serde(default)]
    pub cls: Option<f64>,
    /// First Input Delay, milliseconds.
    #[serde(default)]
    pub fid_ms: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Script,
    Stylesheet,
}

/// A loaded script or stylesheet and its transfer size.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Resource {
    pub kind: ResourceKind,
    pub name: String,
    pub bytes: u64,
}

/// Element lookup criteria. All set criteria must hold; an empty selector
/// matches everything.
#[derive(Debug, Clone, Default)]
pub struct Selector {
    tag: Option<String>,
    attr: Option<(String, Option<String>)>,
    class: Option<String>,
    interactive: bool,
}

impl Selector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tag(mut self, tag: &str) -> Self {
        self.tag = Some(tag.to_string());
        self
    }

    /// Require the attribute to be present, regardless of value.
    pub fn has_attr(mut self, name: &str) -> Self {
        self.attr = Some((name.to_string(), None));
        self
    }

    pub fn attr(mut self, name: &str, value: &str) -> Self {
        self.attr = Some((name.to_string(), Some(value.to_string())));
        self
    }

    /// Require the class list to contain this substring.
    pub fn class(mut self, needle: &str) -> Self {
        self.class = Some(needle.to_string());
        self
    }

    pub fn interactive(mut self) -> Self {
        self.interactive = true;
        self
    }

    pub fn matches(&self, element: &Element) -> bool {
        if let Some(tag) = &self.tag {
            if element.tag != *tag {
                return false;
            }
        }
        if let Some((name, value)) = &self.attr {
            match (element.attr(name), value) {
                (None, _) => return false,
                (Some(actual), Some(wanted)) if actual != wanted => return false,
                _ => {}
            }
        }
        if let Some(needle) = &self.class {
            if !element.class_list().contains(needle.as_str()) {
                return false;
            }
        }
        if self.interactive && !element.is_interactive() {
            return false;
        }
        true
    }
}

/// Read-only view of a rendered page. Every query on an unavailable
/// environment returns "none found" rather than failing; analyzers rely on
/// this to degrade to zero issues without a rendering context.
pub trait PageInspector {
    /// All elements in document order.
    fn all(&self) -> Vec<&Element>;

    fn page_path(&self) -> &str {
        "/"
    }

    fn viewport_width(&self) -> Option<f64> {
        None
    }

    fn scroll_width(&self) -> Option<f64> {
        None
    }

    fn web_vitals(&self) -> Option<WebVitals> {
        None
    }

    fn resources(&self) -> Vec<&Resource> {
        Vec::new()
    }

    /// Elements matching the selector, in document order.
    fn query(&self, selector: &Selector) -> Vec<&Element> {
        self.all().into_iter().filter(|e| selector.matches(e)).collect()
    }

    fn by_tag(&self, tag: &str) -> Vec<&Element> {
        self.query(&Selector::new().tag(tag))
    }

    fn interactive(&self) -> Vec<&Element> {
        self.query(&Selector::new().interactive())
    }

    fn has_root_heading(&self) -> bool {
        !self.by_tag("h1").is_empty()
    }

    fn has_main_landmark(&self) -> bool {
        self.all()
            .iter()
            .any(|e| e.tag == "main" || e.attr("role") == Some("main"))
    }
}

/// Serialized snapshot of a rendered page; the file format the CLI driver
/// audits and the concrete inspector used in tests.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PageSnapshot {
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub viewport_width: Option<f64>,
    #[serde(default)]
    pub scroll_width: Option<f64>,
    #[serde(default)]
    pub elements: Vec<Element>,
    #[serde(default)]
    pub vitals: Option<WebVitals>,
    #[serde(default)]
    pub resources: Vec<Resource>,
}

impl PageSnapshot {
    pub fn new(path: &str) -> Self {
        Self {
            path: path.to_string(),
            ..Default::default()
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("could not read snapshot {}", path.display()))?;
        let snapshot: PageSnapshot = serde_json::from_str(&content)
            .with_context(|| format!("snapshot {} is not valid JSON", path.display()))?;
        Ok(snapshot)
    }

    pub fn push(&mut self, element: Element) -> &mut Self {
        self.elements.push(element);
        self
    }
}

impl PageInspector for PageSnapshot {
    fn all(&self) -> Vec<&Element> {
        self.elements.iter().collect()
    }

    fn page_path(&self) -> &str {
        &self.path
    }

    fn viewport_width(&self) -> Option<f64> {
        self.viewport_width
    }

    fn scroll_width(&self) -> Option<f64> {
        self.scroll_width
    }

    fn web_vitals(&self) -> Option<WebVitals> {
        self.vitals
    }

    fn resources(&self) -> Vec<&Resource> {
        self.resources.iter().collect()
    }
}

/// The absent-environment inspector: no rendering context, every query
/// comes back empty.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullInspector;

impl PageInspector for NullInspector {
    fn all(&self) -> Vec<&Element> {
        Vec::new()
    }
}

/// An sRGB color as used by the contrast and palette checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb { r: 255, g: 255, b: 255 };
    pub const BLACK: Rgb = Rgb { r: 0, g: 0, b: 0 };

    /// Parses `rgb()`, `rgba()`, `#rgb`/`#rrggbb` and a handful of named
    /// colors. Fully transparent values and unknown syntax return `None`.
    pub fn parse(value: &str) -> Option<Rgb> {
        let value = value.trim().to_ascii_lowercase();
        if let Some(body) = value
            .strip_prefix("rgba(")
            .or_else(|| value.strip_prefix("rgb("))
        {
            let body = body.strip_suffix(')')?;
            let parts: Vec<&str> = body.split([',', '/', ' ']).filter(|p| !p.is_empty()).collect();
            if parts.len() < 3 {
                return None;
            }
            if parts.len() > 3 {
                let alpha: f64 = parts[3].trim().parse().ok()?;
                if alpha == 0.0 {
                    return None;
                }
            }
            let channel = |s: &str| s.trim().parse::<f64>().ok().map(|v| v.clamp(0.0, 255.0) as u8);
            return Some(Rgb {
                r: channel(parts[0])?,
                g: channel(parts[1])?,
                b: channel(parts[2])?,
            });
        }
        if let Some(hex) = value.strip_prefix('#') {
            let expanded: String = match hex.len() {
                3 => hex.chars().flat_map(|c| [c, c]).collect(),
                6 => hex.to_string(),
                _ => return None,
            };
            let r = u8::from_str_radix(&expanded[0..2], 16).ok()?;
            let g = u8::from_str_radix(&expanded[2..4], 16).ok()?;
            let b = u8::from_str_radix(&expanded[4..6], 16).ok()?;
            return Some(Rgb { r, g, b });
        }
        match value.as_str() {
            "white" => Some(Rgb::WHITE),
            "black" => Some(Rgb::BLACK),
            "red" => Some(Rgb { r: 255, g: 0, b: 0 }),
            "green" => Some(Rgb { r: 0, g: 128, b: 0 }),
            "blue" => Some(Rgb { r: 0, g: 0, b: 255 }),
            "gray" | "grey" => Some(Rgb { r: 128, g: 128, b: 128 }),
            "transparent" => None,
            _ => None,
        }
    }

    /// WCAG relative luminance.
    pub fn luminance(&self) -> f64 {
        fn channel(value: u8) -> f64 {
            let v = value as f64 / 255.0;
            if v <= 0.03928 {
                v / 12.92
            } else {
                ((v + 0.055) / 1.055).powf(2.4)
            }
        }
        0.2126 * channel(self.r) + 0.7152 * channel(self.g) + 0.0722 * channel(self.b)
    }

    /// WCAG contrast ratio between two colors, always >= 1.0.
    pub fn contrast_ratio(&self, other: &Rgb) -> f64 {
        let a = self.luminance();
        let b = other.luminance();
        let (lighter, darker) = if a >= b { (a, b) } else { (b, a) };
        (lighter + 0.05) / (darker + 0.05)
    }

    /// Euclidean distance in RGB space, used by the near-duplicate check.
    pub fn distance(&self, other: &Rgb) -> f64 {
        let dr = self.r as f64 - other.r as f64;
        let dg = self.g as f64 - other.g as f64;
        let db = self.b as f64 - other.b as f64;
        (dr * dr + dg * dg + db * db).sqrt()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_rgb_and_hex_forms() {
        assert_eq!(Rgb::parse("rgb(255, 255, 255)"), Some(Rgb::WHITE));
        assert_eq!(Rgb::parse("rgba(0,0,0,1)"), Some(Rgb::BLACK));
        assert_eq!(Rgb::parse("#fff"), Some(Rgb::WHITE));
        assert_eq!(Rgb::parse("#336699"), Some(Rgb { r: 0x33, g: 0x66, b: 0x99 }));
        assert_eq!(Rgb::parse("white"), Some(Rgb::WHITE));
        assert_eq!(Rgb::parse("rgba(0,0,0,0)"), None);
        assert_eq!(Rgb::parse("transparent"), None);
        assert_eq!(Rgb::parse("calc(1px)"), None);
    }

    #[test]
    fn contrast_ratio_is_21_for_black_on_white() {
        let ratio = Rgb::WHITE.contrast_ratio(&Rgb::BLACK);
        assert!((ratio - 21.0).abs() < 0.01, "got {ratio}");
        assert!((Rgb::WHITE.contrast_ratio(&Rgb::WHITE) - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn near_duplicate_distance() {
        let a = Rgb { r: 100, g: 100, b: 100 };
        let b = Rgb { r: 110, g: 100, b: 100 };
        assert!(a.distance(&b) < 30.0);
        assert!(a.distance(&b) > 0.0);
        assert_eq!(a.distance(&a), 0.0);
    }

    #[test]
    fn null_inspector_finds_nothing() {
        let inspector = NullInspector;
        assert!(inspector.all().is_empty());
        assert!(inspector.by_tag("h1").is_empty());
        assert!(inspector.interactive().is_empty());
        assert!(inspector.viewport_width().is_none());
        assert!(inspector.web_vitals().is_none());
        assert!(!inspector.has_root_heading());
        assert!(!inspector.has_main_landmark());
    }

    #[test]
    fn rect_gap_between_stacked_elements() {
        let a = Rect { x: 0.0, y: 0.0, width: 40.0, height: 40.0 };
        let b = Rect { x: 0.0, y: 44.0, width: 40.0, height: 40.0 };
        assert_eq!(a.gap_to(&b), Some(4.0));
        let overlapping = Rect { x: 10.0, y: 10.0, width: 40.0, height: 40.0 };
        assert_eq!(a.gap_to(&overlapping), None);
    }

    #[test]
    fn selector_criteria_combine() {
        let mut snapshot = PageSnapshot::new("/");
        let mut meta = Element::new("meta");
        meta.attrs.insert("name".to_string(), "viewport".to_string());
        snapshot.push(meta);
        let mut button = Element::new("button");
        button.classes = vec!["btn-primary".to_string()];
        snapshot.push(button);
        snapshot.push(Element::new("div"));

        assert_eq!(snapshot.query(&Selector::new()).len(), 3);
        assert_eq!(snapshot.query(&Selector::new().tag("meta")).len(), 1);
        assert_eq!(
            snapshot
                .query(&Selector::new().tag("meta").attr("name", "viewport"))
                .len(),
            1
        );
        assert!(snapshot
            .query(&Selector::new().attr("name", "description"))
            .is_empty());
        assert_eq!(snapshot.query(&Selector::new().has_attr("name")).len(), 1);
        assert_eq!(snapshot.query(&Selector::new().class("primary")).len(), 1);
        assert_eq!(snapshot.query(&Selector::new().interactive()).len(), 1);
        assert!(snapshot
            .query(&Selector::new().tag("div").interactive())
            .is_empty());
    }

    #[test]
    fn snapshot_serde_round_trip() {
        let mut snapshot = PageSnapshot::new("/dashboard");
        let mut button = Element::new("button");
        button.rect = Rect { x: 0.0, y: 0.0, width: 30.0, height: 30.0 };
        button.attrs.insert("type".to_string(), "submit".to_string());
        snapshot.push(button);
        let json = serde_json::to_string(&snapshot).unwrap();
        let back: PageSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back.path, "/dashboard");
        assert_eq!(back.elements.len(), 1);
        assert_eq!(back.elements[0].attr("type"), Some("submit"));
    }
}
