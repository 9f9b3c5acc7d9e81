use crate::issue::Category;
use serde::{Deserialize, Serialize};
use std::{env, path::PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditConfig {
    /// Directory scanned for page snapshot files.
    pub snapshot_directory: PathBuf,
    /// File extension of snapshot files.
    pub snapshot_extension: String,
    /// Where reports are written.
    pub output_directory: PathBuf,
    pub categories: CategoriesConfig,
}

/// Per-category toggles. A disabled category is absent from the report,
/// exactly like a failed one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoriesConfig {
    pub accessibility: bool,
    pub performance: bool,
    pub mobile_ux: bool,
    pub visual_consistency: bool,
    pub interaction_design: bool,
}

impl Default for CategoriesConfig {
    fn default() -> Self {
        Self {
            accessibility: true,
            performance: true,
            mobile_ux: true,
            visual_consistency: true,
            interaction_design: true,
        }
    }
}

impl CategoriesConfig {
    pub fn enabled(&self, category: Category) -> bool {
        match category {
            Category::Accessibility => self.accessibility,
            Category::Performance => self.performance,
            Category::MobileUx => self.mobile_ux,
            Category::VisualConsistency => self.visual_consistency,
            Category::InteractionDesign => self.interaction_design,
        }
    }
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            snapshot_directory: PathBuf::from("./snapshots"),
            snapshot_extension: "json".to_string(),
            output_directory: PathBuf::from("./audit-output"),
            categories: CategoriesConfig::default(),
        }
    }
}

impl AuditConfig {
    /// Get the default config file path (~/.design-auditor.toml)
    pub fn default_config_path() -> crate::Result<PathBuf> {
        let home_dir = env::var("HOME")
            .or_else(|_| env::var("USERPROFILE"))
            .map_err(|_| anyhow::anyhow!("Could not determine home directory"))?;
        Ok(PathBuf::from(home_dir).join(".design-auditor.toml"))
    }

    /// Load config from file, falling back to defaults if file doesn't exist
    pub fn load() -> crate::Result<Self> {
        let config_path = Self::default_config_path()?;

        if config_path.exists() {
            println!("📝 Loading configuration from: {}", config_path.display());
            Self::from_file(&config_path)
        } else {
            println!("ℹ️  No config file found at {}, using defaults", config_path.display());
            println!("💡 Run 'design-auditor config' to create a default configuration file");
            Ok(Self::default())
        }
    }

    /// Load config from a specific file path
    pub fn from_file(path: &PathBuf) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: AuditConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save config to a file
    pub fn to_file(&self, path: &PathBuf) -> crate::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Save config to the default location
    pub fn save_default(&self) -> crate::Result<()> {
        let config_path = Self::default_config_path()?;
        self.to_file(&config_path)
    }

    /// Create a config file with all available options documented
    pub fn create_documented_config() -> String {
        r#"# Design Auditor Configuration File
# This file configures how design-auditor inspects your page snapshots

# Directory scanned for page snapshot files
snapshot_directory = "./snapshots"

# File extension of snapshot files
snapshot_extension = "json"

# Where JSON and markdown reports are written
output_directory = "./audit-output"

[categories]
# Disable a category to leave it out of the audit entirely.
# A disabled category is excluded from the overall score, not scored 10.
accessibility = true
performance = true
mobile_ux = true
visual_consistency = true
interaction_design = true
"#
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_enable_every_category() {
        let config = AuditConfig::default();
        for category in Category::ALL {
            assert!(config.categories.enabled(category));
        }
    }

    #[test]
    fn config_round_trips_through_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let mut config = AuditConfig::default();
        config.categories.performance = false;
        config.output_directory = PathBuf::from("/tmp/reports");
        config.to_file(&path).unwrap();

        let loaded = AuditConfig::from_file(&path).unwrap();
        assert!(!loaded.categories.performance);
        assert!(loaded.categories.accessibility);
        assert_eq!(loaded.output_directory, PathBuf::from("/tmp/reports"));
    }

    #[test]
    fn documented_config_parses() {
        let config: AuditConfig = toml::from_str(&AuditConfig::create_documented_config()).unwrap();
        assert!(config.categories.mobile_ux);
        assert_eq!(config.snapshot_extension, "json");
    }
}
