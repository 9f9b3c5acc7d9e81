use crate::aggregator::ComprehensiveAudit;
use crate::issue::{Category, DesignAudit, Severity};
use anyhow::Result;
use std::{fs, path::PathBuf};

/// 4-tier score banding used by every report surface.
pub fn score_band(score: f64) -> (&'static str, &'static str) {
    if score >= 9.0 {
        ("🌟", "Excellent")
    } else if score >= 7.0 {
        ("✅", "Good")
    } else if score >= 5.0 {
        ("⚠️", "Fair")
    } else {
        ("🚨", "Needs Improvement")
    }
}

fn severity_marker(severity: Severity) -> &'static str {
    match severity {
        Severity::Critical => "🔴",
        Severity::High => "🟠",
        Severity::Medium => "🟡",
        Severity::Low => "🟢",
    }
}

pub struct Reporter;

impl Reporter {
    pub fn new() -> Self {
        Self
    }

    /// Renders the full cross-category report. The `## Executive Summary`
    /// and `## Top 5 Highest-Priority Issues` headings are a presentation
    /// contract with downstream consumers; do not reword them.
    pub fn generate_markdown(&self, audit: &ComprehensiveAudit) -> String {
        let mut md = format!(
            "# Design Quality Audit Report\n\n**Page:** {}\n**Generated:** {}\n\n",
            audit.page, audit.timestamp
        );

        let (emoji, label) = score_band(audit.overall_score);
        md.push_str("## Executive Summary\n\n");
        md.push_str(&format!(
            "{emoji} **Overall Score: {:.1}/10 — {label}**\n\n",
            audit.overall_score
        ));
        md.push_str(&format!(
            "- **Categories audited:** {}\n- **Total issues found:** {}\n\n",
            audit.categories.len(),
            audit.all_issues.len()
        ));

        md.push_str("## Category Scores\n\n");
        md.push_str("| Category | Score | Issues |\n|----------|-------|--------|\n");
        for category in Category::ALL {
            match audit.categories.get(&category) {
                Some(score) => {
                    let (emoji, _) = score_band(score.score);
                    md.push_str(&format!(
                        "| {} | {:.1}/10 {emoji} | {} |\n",
                        category.label(),
                        score.score,
                        score.issues.len()
                    ));
                }
                None => {
                    md.push_str(&format!("| {} | — | not audited |\n", category.label()));
                }
            }
        }
        md.push('\n');

        md.push_str("## Top 5 Highest-Priority Issues\n\n");
        if audit.top_issues.is_empty() {
            md.push_str("No issues found.\n\n");
        }
        for (i, issue) in audit.top_issues.iter().enumerate() {
            md.push_str(&format!(
                "{}. **{}**\n   - **Location:** {}\n   - **Category:** {}\n   - **Priority:** {}\n   - **Impact:** {}\n   - **Recommendation:** {}\n\n",
                i + 1,
                issue.description,
                issue.location,
                issue.category,
                issue.priority,
                issue.impact,
                issue.recommendation
            ));
        }

        md.push_str("## Issues by Severity\n\n");
        for severity in Severity::ALL.iter().rev() {
            md.push_str(&format!(
                "- {} **{}:** {}\n",
                severity_marker(*severity),
                severity.title(),
                audit.severity_count(*severity)
            ));
        }
        md.push('\n');

        md.push_str("## Remediation Roadmap\n\n");
        let phases = [
            (Severity::Critical, "Phase 1: Critical fixes"),
            (Severity::High, "Phase 2: High-impact fixes"),
            (Severity::Medium, "Phase 3: Systematic cleanup"),
            (Severity::Low, "Phase 4: Polish"),
        ];
        for (severity, heading) in phases {
            md.push_str(&format!("### {heading}\n\n"));
            match audit.issues_by_severity.get(&severity) {
                Some(issues) if !issues.is_empty() => {
                    for issue in issues {
                        md.push_str(&format!("- {} ({})\n", issue.description, issue.location));
                    }
                }
                _ => md.push_str("- Nothing in this phase\n"),
            }
            md.push('\n');
        }

        md
    }

    /// Renders the plain five-category audit without the ranked aggregation.
    pub fn generate_design_audit_markdown(&self, audit: &DesignAudit) -> String {
        let (emoji, label) = score_band(audit.overall_score);
        let mut md = format!(
            "# Design Audit\n\n**Generated:** {}\n\n{emoji} **Overall Score: {:.1}/10 — {label}**\n\n",
            audit.timestamp, audit.overall_score
        );
        for (category, score) in audit.scores() {
            let (emoji, _) = score_band(score.score);
            md.push_str(&format!("## {} — {:.1}/10 {emoji}\n\n", category.label(), score.score));
            if score.issues.is_empty() {
                md.push_str("No issues found.\n\n");
            } else {
                for issue in &score.issues {
                    md.push_str(&format!("- {issue}\n"));
                }
                md.push('\n');
            }
            if !score.recommendations.is_empty() {
                md.push_str("**Recommendations:**\n\n");
                for recommendation in &score.recommendations {
                    md.push_str(&format!("- {recommendation}\n"));
                }
                md.push('\n');
            }
        }
        md
    }

    /// Writes the JSON result and the markdown summary into `output_dir`.
    pub fn export_report(
        &self,
        audit: &ComprehensiveAudit,
        output_dir: &PathBuf,
    ) -> Result<Vec<PathBuf>> {
        fs::create_dir_all(output_dir)?;
        let mut exported_files = Vec::new();

        let json_path = output_dir.join("audit_report.json");
        let json_content = serde_json::to_string_pretty(audit)?;
        fs::write(&json_path, json_content)?;
        exported_files.push(json_path);

        let md_path = output_dir.join("audit_summary.md");
        fs::write(&md_path, self.generate_markdown(audit))?;
        exported_files.push(md_path);

        Ok(exported_files)
    }
}

impl Default for Reporter {
    fn default() -> Self {
        Self::new()
    }
}
