use crate::aggregator::{Aggregator, ComprehensiveAudit};
use crate::config::AuditConfig;
use crate::inspector::PageInspector;
use crate::issue::{round1, AuditScore, Category, DesignAudit};
use crate::scorer::score_category;
use crate::{accessibility, interaction, mobile, performance, visual};
use anyhow::Result;
use std::collections::BTreeMap;

/// Audit a single category. Internal failures degrade to a clean category
/// here; `run_comprehensive_audit` excludes them instead.
pub fn audit_accessibility(inspector: &dyn PageInspector) -> AuditScore {
    degrade(Category::Accessibility, accessibility::collect_issues(inspector))
}

pub async fn audit_performance(inspector: &dyn PageInspector) -> AuditScore {
    degrade(Category::Performance, performance::collect_issues(inspector).await)
}

pub fn audit_mobile_ux(inspector: &dyn PageInspector) -> AuditScore {
    degrade(Category::MobileUx, mobile::collect_issues(inspector))
}

pub fn audit_visual_consistency(inspector: &dyn PageInspector) -> AuditScore {
    degrade(Category::VisualConsistency, visual::collect_issues(inspector))
}

pub fn audit_interaction_design(inspector: &dyn PageInspector) -> AuditScore {
    degrade(Category::InteractionDesign, interaction::collect_issues(inspector))
}

fn degrade(category: Category, result: Result<Vec<crate::issue::Issue>>) -> AuditScore {
    match result {
        Ok(issues) => score_category(category, issues),
        Err(e) => {
            eprintln!("  ⚠️  {} audit failed: {e}", category.label());
            AuditScore::clean()
        }
    }
}

/// The plain five-category audit, without the enriched aggregation.
pub async fn run_design_audit(inspector: &dyn PageInspector) -> DesignAudit {
    let accessibility = audit_accessibility(inspector);
    let performance = audit_performance(inspector).await;
    let mobile_ux = audit_mobile_ux(inspector);
    let visual_consistency = audit_visual_consistency(inspector);
    let interaction_design = audit_interaction_design(inspector);

    let overall_score = round1(
        [
            accessibility.score,
            performance.score,
            mobile_ux.score,
            visual_consistency.score,
            interaction_design.score,
        ]
        .iter()
        .sum::<f64>()
            / 5.0,
    );

    DesignAudit {
        accessibility,
        performance,
        mobile_ux,
        visual_consistency,
        interaction_design,
        overall_score,
        timestamp: chrono::Utc::now().to_rfc3339(),
    }
}

/// The full pipeline: every category, enriched and ranked. A category whose
/// analyzer fails is logged and excluded from the mean and the issue lists
/// rather than aborting the run.
pub async fn run_comprehensive_audit(inspector: &dyn PageInspector) -> Result<ComprehensiveAudit> {
    let engine = AuditEngine::new(AuditConfig::default());
    engine.audit_page(inspector).await
}

/// Config-driven runner used by the CLI. A disabled category is treated
/// exactly like a failed one: absent.
pub struct AuditEngine {
    config: AuditConfig,
}

impl AuditEngine {
    pub fn new(config: AuditConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AuditConfig {
        &self.config
    }

    pub async fn audit_page(&self, inspector: &dyn PageInspector) -> Result<ComprehensiveAudit> {
        let mut categories: BTreeMap<Category, AuditScore> = BTreeMap::new();

        for category in Category::ALL {
            if !self.config.categories.enabled(category) {
                continue;
            }
            let result = match category {
                Category::Accessibility => accessibility::collect_issues(inspector),
                Category::Performance => performance::collect_issues(inspector).await,
                Category::MobileUx => mobile::collect_issues(inspector),
                Category::VisualConsistency => visual::collect_issues(inspector),
                Category::InteractionDesign => interaction::collect_issues(inspector),
            };
            match result {
                Ok(issues) => {
                    categories.insert(category, score_category(category, issues));
                }
                Err(e) => {
                    // Partial failure: this category is absent from the report.
                    eprintln!("  ⚠️  {} audit failed: {e}", category.label());
                }
            }
        }

        let aggregator = Aggregator::new()?;
        Ok(aggregator.aggregate(inspector.page_path(), categories))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CategoriesConfig;
    use crate::inspector::{Element, NullInspector, PageSnapshot};
    use crate::issue::Severity;

    fn messy_page() -> PageSnapshot {
        let mut page = PageSnapshot::new("/dashboard");
        let mut text = Element::new("p");
        text.text = "hello".to_string();
        text.style.color = Some("rgb(255,255,255)".to_string());
        text.style.background_color = Some("rgb(255,255,255)".to_string());
        text.style.font_size = Some(16.0);
        page.push(text);
        page.push(Element::new("form"));
        let mut input = Element::new("input");
        input.attrs.insert("aria-label".to_string(), "Email".to_string());
        page.push(input);
        page
    }

    #[tokio::test]
    async fn null_inspector_scores_ten_everywhere() {
        let audit = run_design_audit(&NullInspector).await;
        for (_, score) in audit.scores() {
            assert_eq!(score.score, 10.0);
            assert!(score.issues.is_empty());
        }
        assert_eq!(audit.overall_score, 10.0);
    }

    #[tokio::test]
    async fn comprehensive_audit_on_null_inspector_is_clean() {
        let audit = run_comprehensive_audit(&NullInspector).await.unwrap();
        assert_eq!(audit.overall_score, 10.0);
        assert!(audit.all_issues.is_empty());
        assert!(audit.top_issues.is_empty());
        assert_eq!(audit.categories.len(), 5);
    }

    #[tokio::test]
    async fn comprehensive_audit_finds_cross_category_issues() {
        let audit = run_comprehensive_audit(&messy_page()).await.unwrap();
        assert_eq!(audit.page, "/dashboard");
        assert!(audit
            .all_issues
            .iter()
            .any(|i| i.category == Category::Accessibility && i.severity == Severity::Critical));
        assert!(audit
            .all_issues
            .iter()
            .any(|i| i.description == "Forms lack error message display areas"));
        // Invariants hold on a real run.
        let by_severity: usize = audit.issues_by_severity.values().map(Vec::len).sum();
        assert_eq!(by_severity, audit.all_issues.len());
        for pair in audit.all_issues.windows(2) {
            assert!(pair[0].priority >= pair[1].priority);
        }
        assert_eq!(audit.top_issues.len(), audit.all_issues.len().min(5));
    }

    #[tokio::test]
    async fn disabled_category_is_absent() {
        let mut config = AuditConfig::default();
        config.categories = CategoriesConfig {
            performance: false,
            ..CategoriesConfig::default()
        };
        let engine = AuditEngine::new(config);
        let audit = engine.audit_page(&messy_page()).await.unwrap();
        assert!(!audit.categories.contains_key(&Category::Performance));
        assert_eq!(audit.categories.len(), 4);
    }

    #[tokio::test]
    async fn design_audit_overall_is_mean_of_five() {
        let audit = run_design_audit(&messy_page()).await;
        let mean = round1(
            Category::ALL.iter().map(|c| audit.get(*c).score).sum::<f64>() / 5.0,
        );
        assert_eq!(audit.overall_score, mean);
    }
}
