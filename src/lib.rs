pub mod config;
pub mod inspector;
pub mod issue;
pub mod accessibility;
pub mod performance;
pub mod mobile;
pub mod visual;
pub mod interaction;
pub mod scorer;
pub mod aggregator;
pub mod engine;
pub mod reporter;

pub use aggregator::{Aggregator, ComprehensiveAudit, ComprehensiveIssue};
pub use config::AuditConfig;
pub use engine::{run_comprehensive_audit, run_design_audit, AuditEngine};
pub use inspector::{NullInspector, PageInspector, PageSnapshot, Selector};
pub use issue::{AuditScore, Category, DesignAudit, Issue, Severity};
pub use reporter::Reporter;

pub type Result<T> = anyhow::Result<T>;
