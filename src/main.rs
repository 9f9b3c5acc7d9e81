use clap::{Parser, Subcommand};
use design_auditor::{AuditConfig, AuditEngine, PageSnapshot, Reporter};
use std::path::{Path, PathBuf};
use std::time::Instant;
use walkdir::WalkDir;

#[derive(Parser)]
#[command(name = "design-auditor")]
#[command(about = "A rule-based design quality audit engine for rendered page snapshots")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Audit one snapshot file or every snapshot in a directory
    Audit {
        /// Snapshot file or directory of snapshots (defaults to the
        /// configured snapshot directory)
        #[arg(short, long)]
        path: Option<PathBuf>,

        /// Configuration file path
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Output directory for reports
        #[arg(short, long, default_value = "./audit-output")]
        output: PathBuf,
    },
    /// Generate a default configuration file
    Config {
        /// Output path for the config file (defaults to ~/.design-auditor.toml)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Audit { path, config, output } => {
            audit_snapshots(path, config, output).await?;
        }
        Commands::Config { output } => {
            generate_config(output)?;
        }
    }

    Ok(())
}

fn discover_snapshots(path: &Path, extension: &str) -> Vec<PathBuf> {
    if path.is_file() {
        return vec![path.to_path_buf()];
    }
    WalkDir::new(path)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| {
            entry.file_type().is_file()
                && entry
                    .path()
                    .extension()
                    .map(|e| e.eq_ignore_ascii_case(extension))
                    .unwrap_or(false)
        })
        .map(|entry| entry.into_path())
        .collect()
}

async fn audit_snapshots(
    path: Option<PathBuf>,
    config_path: Option<PathBuf>,
    output_path: PathBuf,
) -> anyhow::Result<()> {
    println!("🚀 Starting Design Audit");
    println!("========================");

    let start_time = Instant::now();

    let mut config = if let Some(config_path) = config_path {
        AuditConfig::from_file(&config_path)?
    } else {
        AuditConfig::load()?
    };
    config.output_directory = output_path.clone();
    let path = path.unwrap_or_else(|| config.snapshot_directory.clone());

    println!("🎯 Snapshot path: {}", path.display());
    println!("📤 Output directory: {}", output_path.display());

    let snapshots = discover_snapshots(&path, &config.snapshot_extension);
    if snapshots.is_empty() {
        println!("⚠️  No snapshot files found under {}", path.display());
        return Ok(());
    }
    println!("🔍 Found {} snapshot(s)\n", snapshots.len());

    let engine = AuditEngine::new(config);
    let reporter = Reporter::new();
    let mut exported_files = Vec::new();

    for snapshot_path in &snapshots {
        let snapshot = match PageSnapshot::from_file(snapshot_path) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                eprintln!("  ✗ {}: {e}", snapshot_path.display());
                continue;
            }
        };

        let audit = engine.audit_page(&snapshot).await?;
        println!(
            "  ✓ {} — score {:.1}/10, {} issue(s)",
            audit.page,
            audit.overall_score,
            audit.all_issues.len()
        );

        let stem = snapshot_path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("page");
        let page_output = output_path.join(stem);
        exported_files.extend(reporter.export_report(&audit, &page_output)?);
    }

    let duration = start_time.elapsed();
    println!("\n✅ Audit completed in {:.2}s", duration.as_secs_f64());
    println!("📁 Reports exported to:");
    for file in exported_files {
        println!("   - {}", file.display());
    }

    Ok(())
}

fn generate_config(output_path: Option<PathBuf>) -> anyhow::Result<()> {
    let config_path = output_path.unwrap_or_else(|| {
        AuditConfig::default_config_path().unwrap_or_else(|_| PathBuf::from("design-auditor.toml"))
    });

    println!("📝 Generating configuration file: {}", config_path.display());

    let documented_config = AuditConfig::create_documented_config();
    std::fs::write(&config_path, documented_config)?;

    println!("✅ Configuration file created successfully!");
    println!("💡 Edit the file to customize which categories run and where reports land.");

    Ok(())
}
