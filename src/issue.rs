use serde::{Deserialize, Serialize};

/// The five audit categories, in weight order (heaviest first).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    Accessibility,
    Performance,
    MobileUx,
    VisualConsistency,
    InteractionDesign,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Accessibility,
        Category::Performance,
        Category::MobileUx,
        Category::VisualConsistency,
        Category::InteractionDesign,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Accessibility => "accessibility",
            Category::Performance => "performance",
            Category::MobileUx => "mobile-ux",
            Category::VisualConsistency => "visual-consistency",
            Category::InteractionDesign => "interaction-design",
        }
    }

    /// Human-readable label used in reports.
    pub fn label(&self) -> &'static str {
        match self {
            Category::Accessibility => "Accessibility",
            Category::Performance => "Performance",
            Category::MobileUx => "Mobile UX",
            Category::VisualConsistency => "Visual Consistency",
            Category::InteractionDesign => "Interaction Design",
        }
    }

    /// Cross-category ranking weight. Accessibility and performance issues
    /// outrank equally-severe visual-consistency issues.
    pub fn weight(&self) -> f64 {
        match self {
            Category::Accessibility => 1.0,
            Category::Performance => 0.9,
            Category::MobileUx => 0.8,
            Category::InteractionDesign => 0.7,
            Category::VisualConsistency => 0.6,
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Issue urgency, ordered low to critical.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub const ALL: [Severity; 4] = [
        Severity::Low,
        Severity::Medium,
        Severity::High,
        Severity::Critical,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        }
    }

    /// Uppercase form used as the prefix of rendered issue strings.
    pub fn prefix(&self) -> &'static str {
        match self {
            Severity::Low => "LOW",
            Severity::Medium => "MEDIUM",
            Severity::High => "HIGH",
            Severity::Critical => "CRITICAL",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Severity::Low => "Low",
            Severity::Medium => "Medium",
            Severity::High => "High",
            Severity::Critical => "Critical",
        }
    }

    /// Base ranking weight before the category weight is applied.
    pub fn weight(&self) -> f64 {
        match self {
            Severity::Critical => 100.0,
            Severity::High => 75.0,
            Severity::Medium => 50.0,
            Severity::Low => 25.0,
        }
    }

    pub fn parse(token: &str) -> Option<Severity> {
        match token.to_ascii_lowercase().as_str() {
            "low" => Some(Severity::Low),
            "medium" => Some(Severity::Medium),
            "high" => Some(Severity::High),
            "critical" => Some(Severity::Critical),
            _ => None,
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single audit finding. Every issue belongs to exactly one category and
/// carries exactly one severity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Issue {
    pub category: Category,
    #[serde(rename = "type")]
    pub issue_type: String,
    pub severity: Severity,
    /// Human-readable pointer to where the issue was found; "various" when
    /// a finding aggregates several elements.
    pub element: String,
    pub description: String,
    pub recommendation: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metric: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<String>,
}

impl Issue {
    pub fn new(
        category: Category,
        issue_type: &str,
        severity: Severity,
        element: impl Into<String>,
        description: impl Into<String>,
        recommendation: impl Into<String>,
    ) -> Self {
        Self {
            category,
            issue_type: issue_type.to_string(),
            severity,
            element: element.into(),
            description: description.into(),
            recommendation: recommendation.into(),
            metric: None,
            current_value: None,
            target_value: None,
            page: None,
        }
    }

    pub fn with_metric(
        mut self,
        metric: &str,
        current_value: impl Into<String>,
        target_value: impl Into<String>,
    ) -> Self {
        self.metric = Some(metric.to_string());
        self.current_value = Some(current_value.into());
        self.target_value = Some(target_value.into());
        self
    }

    pub fn with_page(mut self, page: impl Into<String>) -> Self {
        self.page = Some(page.into());
        self
    }

    /// `"{SEVERITY}: {description}"` form used in `AuditScore.issues`.
    pub fn render(&self) -> String {
        format!("{}: {}", self.severity.prefix(), self.description)
    }
}

/// Result of auditing a single category. Created fresh on every run and
/// never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditScore {
    /// 1.0–10.0 inclusive, one decimal of precision.
    pub score: f64,
    /// Severity-prefixed issue strings, in detection order.
    pub issues: Vec<String>,
    /// Deduplicated guidance, most specific first.
    pub recommendations: Vec<String>,
    /// The structured findings the score was computed from.
    pub findings: Vec<Issue>,
}

impl AuditScore {
    pub fn clean() -> Self {
        Self {
            score: 10.0,
            issues: Vec::new(),
            recommendations: Vec::new(),
            findings: Vec::new(),
        }
    }
}

/// The plain five-category audit, without the enriched aggregation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DesignAudit {
    pub accessibility: AuditScore,
    pub performance: AuditScore,
    pub mobile_ux: AuditScore,
    pub visual_consistency: AuditScore,
    pub interaction_design: AuditScore,
    /// Unweighted mean of the five category scores, one decimal.
    pub overall_score: f64,
    pub timestamp: String,
}

impl DesignAudit {
    pub fn get(&self, category: Category) -> &AuditScore {
        match category {
            Category::Accessibility => &self.accessibility,
            Category::Performance => &self.performance,
            Category::MobileUx => &self.mobile_ux,
            Category::VisualConsistency => &self.visual_consistency,
            Category::InteractionDesign => &self.interaction_design,
        }
    }

    pub fn scores(&self) -> impl Iterator<Item = (Category, &AuditScore)> {
        Category::ALL.iter().map(move |c| (*c, self.get(*c)))
    }
}

/// Round to one decimal of precision.
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_ordering_is_low_to_critical() {
        assert!(Severity::Low < Severity::Medium);
        assert!(Severity::Medium < Severity::High);
        assert!(Severity::High < Severity::Critical);
    }

    #[test]
    fn severity_parse_round_trips() {
        for severity in Severity::ALL {
            assert_eq!(Severity::parse(severity.as_str()), Some(severity));
            assert_eq!(Severity::parse(severity.prefix()), Some(severity));
        }
        assert_eq!(Severity::parse("urgent"), None);
    }

    #[test]
    fn category_serde_uses_kebab_case() {
        let json = serde_json::to_string(&Category::MobileUx).unwrap();
        assert_eq!(json, "\"mobile-ux\"");
        let json = serde_json::to_string(&Category::VisualConsistency).unwrap();
        assert_eq!(json, "\"visual-consistency\"");
    }

    #[test]
    fn issue_renders_with_uppercase_prefix() {
        let issue = Issue::new(
            Category::Accessibility,
            "contrast",
            Severity::Critical,
            "p",
            "Text contrast is too low",
            "Darken the text color",
        );
        assert_eq!(issue.render(), "CRITICAL: Text contrast is too low");
    }

    #[test]
    fn round1_keeps_one_decimal() {
        assert_eq!(round1(7.82), 7.8);
        assert_eq!(round1(7.86), 7.9);
        assert_eq!(round1(10.0), 10.0);
    }
}
