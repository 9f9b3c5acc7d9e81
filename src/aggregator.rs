use crate::issue::{round1, AuditScore, Category, Issue, Severity};
use anyhow::Result;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// How many of the highest-priority issues make the shortlist.
pub const TOP_ISSUE_COUNT: usize = 5;

/// An issue enriched for cross-category ranking. Derived once per run;
/// a new audit run produces an entirely new set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComprehensiveIssue {
    /// Stable within one run only.
    pub id: String,
    pub category: Category,
    #[serde(rename = "type")]
    pub issue_type: String,
    pub severity: Severity,
    pub location: String,
    pub description: String,
    pub recommendation: String,
    /// 1–100, severity weight scaled by category weight.
    pub priority: u32,
    pub impact: String,
}

/// The full cross-category audit result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComprehensiveAudit {
    pub page: String,
    /// Category results that actually ran; a failed category is absent.
    pub categories: BTreeMap<Category, AuditScore>,
    /// Unweighted mean of the present category scores, one decimal.
    pub overall_score: f64,
    pub timestamp: String,
    /// Every issue, sorted descending by priority. Ties keep insertion order.
    pub all_issues: Vec<ComprehensiveIssue>,
    /// The first `TOP_ISSUE_COUNT` of `all_issues`.
    pub top_issues: Vec<ComprehensiveIssue>,
    pub issues_by_category: BTreeMap<Category, Vec<ComprehensiveIssue>>,
    pub issues_by_severity: BTreeMap<Severity, Vec<ComprehensiveIssue>>,
}

impl ComprehensiveAudit {
    pub fn severity_count(&self, severity: Severity) -> usize {
        self.issues_by_severity
            .get(&severity)
            .map(|issues| issues.len())
            .unwrap_or(0)
    }
}

/// Cross-category ranking: `round(severity weight x category weight)`.
pub fn priority_for(severity: Severity, category: Category) -> u32 {
    (severity.weight() * category.weight()).round() as u32
}

/// Splits a rendered `"{SEVERITY}: {description}"` string back into parts.
/// A line without a recognizable severity prefix defaults to low and is
/// surfaced as-is, never dropped.
pub fn parse_issue_line(line: &str) -> (Severity, String) {
    if let Some((prefix, rest)) = line.split_once(": ") {
        if let Some(severity) = Severity::parse(prefix) {
            return (severity, rest.to_string());
        }
    }
    (Severity::Low, line.to_string())
}

/// Merges per-category results into one ranked, grouped report. Pattern
/// tables are data, not branching logic: new types are additive edits.
pub struct Aggregator {
    type_patterns: Vec<(Regex, &'static str)>,
    location_patterns: Vec<(Regex, &'static str)>,
}

impl Aggregator {
    pub fn new() -> Result<Self> {
        // Ordered, first match wins.
        let type_table: &[(&str, &str)] = &[
            (r"(?i)contrast", "contrast"),
            (r"(?i)keyboard|tabindex|tab order", "keyboard-navigation"),
            (r"(?i)aria|screen reader|accessible name|landmark|\blabel", "aria"),
            (r"(?i)focus", "focus-indicators"),
            (r"(?i)image|\bimg\b|alt text|lazy", "image-optimization"),
            (r"(?i)bundle|javascript|\bchunk\b|css size|stylesheet", "bundle-size"),
            (r"(?i)touch target|tappable", "touch-targets"),
            (r"(?i)viewport|overflow|scrolls horizontally|fixed width|responsive", "responsive"),
            (r"(?i)font size|text size|readable", "font-size"),
            (
                r"(?i)spacing|margin|padding|color|palette|font famil|float|layout|style variation",
                "visual-consistency",
            ),
            (
                r"(?i)loading|spinner|empty|error|confirmation|progress|cursor|animate|undo",
                "interaction-design",
            ),
        ];
        let location_table: &[(&str, &str)] = &[
            (r"(?i)dashboard", "Dashboard"),
            (r"(?i)header", "Header"),
            (r"(?i)footer", "Footer"),
            (r"(?i)\bnav", "Navigation"),
            (r"(?i)form|input|field", "Forms"),
            (r"(?i)button|submit", "Buttons"),
            (r"(?i)image|\bimg\b|photo", "Images"),
        ];

        let compile = |table: &[(&str, &'static str)]| -> Result<Vec<(Regex, &'static str)>> {
            table
                .iter()
                .map(|(pattern, label)| Ok((Regex::new(pattern)?, *label)))
                .collect()
        };

        Ok(Self {
            type_patterns: compile(type_table)?,
            location_patterns: compile(location_table)?,
        })
    }

    /// Best-effort type inference over free text. Approximate by design.
    pub fn classify_type(&self, description: &str) -> String {
        self.type_patterns
            .iter()
            .find(|(pattern, _)| pattern.is_match(description))
            .map(|(_, label)| label.to_string())
            .unwrap_or_else(|| "general".to_string())
    }

    /// Best-effort location inference over free text.
    pub fn infer_location(&self, description: &str) -> String {
        self.location_patterns
            .iter()
            .find(|(pattern, _)| pattern.is_match(description))
            .map(|(_, label)| label.to_string())
            .unwrap_or_else(|| "General".to_string())
    }

    fn enrich(&self, category: Category, issue: &Issue, fallback_rec: &str) -> ComprehensiveIssue {
        let issue_type = self.classify_type(&issue.description);
        let location = {
            let inferred = self.infer_location(&issue.description);
            if inferred == "General" && !issue.element.is_empty() && issue.element != "various" {
                issue.element.clone()
            } else {
                inferred
            }
        };
        let recommendation = if issue.recommendation.is_empty() {
            fallback_rec.to_string()
        } else {
            issue.recommendation.clone()
        };
        ComprehensiveIssue {
            id: Uuid::new_v4().to_string(),
            category,
            severity: issue.severity,
            priority: priority_for(issue.severity, category),
            impact: impact_for(&issue_type, issue.severity),
            issue_type,
            location,
            description: issue.description.clone(),
            recommendation,
        }
    }

    /// Issues for one category: the structured findings when present,
    /// otherwise re-parsed from the rendered issue strings.
    fn category_issues(&self, category: Category, score: &AuditScore) -> Vec<ComprehensiveIssue> {
        let fallback_rec = score
            .recommendations
            .first()
            .map(String::as_str)
            .unwrap_or("");
        if !score.findings.is_empty() {
            return score
                .findings
                .iter()
                .map(|issue| self.enrich(category, issue, fallback_rec))
                .collect();
        }
        score
            .issues
            .iter()
            .map(|line| {
                let (severity, description) = parse_issue_line(line);
                let issue = Issue::new(category, "", severity, "", description, "");
                self.enrich(category, &issue, fallback_rec)
            })
            .collect()
    }

    /// Merge, rank, group. Order matters for determinism: issues are
    /// gathered in fixed category order, then stably sorted by priority.
    pub fn aggregate(
        &self,
        page: &str,
        categories: BTreeMap<Category, AuditScore>,
    ) -> ComprehensiveAudit {
        let mut all_issues: Vec<ComprehensiveIssue> = Vec::new();
        for category in Category::ALL {
            if let Some(score) = categories.get(&category) {
                all_issues.extend(self.category_issues(category, score));
            }
        }

        // Stable: equal priorities keep insertion order.
        all_issues.sort_by(|a, b| b.priority.cmp(&a.priority));

        let top_issues: Vec<ComprehensiveIssue> =
            all_issues.iter().take(TOP_ISSUE_COUNT).cloned().collect();

        let mut issues_by_category: BTreeMap<Category, Vec<ComprehensiveIssue>> = BTreeMap::new();
        let mut issues_by_severity: BTreeMap<Severity, Vec<ComprehensiveIssue>> = BTreeMap::new();
        for issue in &all_issues {
            issues_by_category
                .entry(issue.category)
                .or_default()
                .push(issue.clone());
            issues_by_severity
                .entry(issue.severity)
                .or_default()
                .push(issue.clone());
        }

        let overall_score = if categories.is_empty() {
            0.0
        } else {
            round1(categories.values().map(|s| s.score).sum::<f64>() / categories.len() as f64)
        };

        ComprehensiveAudit {
            page: page.to_string(),
            categories,
            overall_score,
            timestamp: chrono::Utc::now().to_rfc3339(),
            all_issues,
            top_issues,
            issues_by_category,
            issues_by_severity,
        }
    }
}

/// Impact sentences keyed by inferred type and severity, with a generic
/// fallback.
fn impact_for(issue_type: &str, severity: Severity) -> String {
    const IMPACTS: &[(&str, Severity, &str)] = &[
        ("contrast", Severity::Critical, "Users with low vision cannot read the affected text"),
        ("contrast", Severity::High, "Text is hard to read for users with low vision"),
        ("aria", Severity::High, "Screen reader users cannot identify the control"),
        ("keyboard-navigation", Severity::Medium, "Keyboard users hit controls in a confusing order"),
        ("focus-indicators", Severity::High, "Keyboard users cannot see where they are on the page"),
        ("touch-targets", Severity::High, "Mobile users will mis-tap neighbouring controls"),
        ("responsive", Severity::Critical, "The page is effectively unusable on phones"),
        ("responsive", Severity::High, "Mobile users must scroll sideways to reach content"),
        ("bundle-size", Severity::Critical, "Every visitor waits noticeably longer for first load"),
        ("bundle-size", Severity::High, "Load time suffers on average connections"),
        ("image-optimization", Severity::Medium, "Images load slowly and shift the layout"),
        ("font-size", Severity::Medium, "Body text strains to read on small screens"),
        ("interaction-design", Severity::High, "Users cannot tell whether their action worked"),
        ("interaction-design", Severity::Medium, "The interface feels unresponsive or unfinished"),
    ];
    IMPACTS
        .iter()
        .find(|(t, s, _)| *t == issue_type && *s == severity)
        .map(|(_, _, text)| text.to_string())
        .unwrap_or_else(|| format!("{} impact on user experience", severity.title()))
}
