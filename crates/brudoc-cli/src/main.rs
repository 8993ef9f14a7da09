use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use log::{debug, info};

use brudoc_core::config::{self, BrudocConfig, CONFIG_FILE_NAME};
use brudoc_core::ir::{Documented, OperationDoc};
use brudoc_core::transform::{self, ExtractOptions};
use brudoc_core::{DocReport, RevertReport, parse, run_doc, run_revert};

#[derive(Parser)]
#[command(
    name = "brudoc",
    about = "Inject OpenAPI documentation into Bruno request files",
    version
)]
struct Cli {
    /// Path to the config file
    #[arg(long, global = true, default_value = CONFIG_FILE_NAME)]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write documentation from an OpenAPI document into a workspace
    Doc {
        /// Path to the OpenAPI document (YAML or JSON)
        #[arg(short, long)]
        openapi: PathBuf,

        /// Bruno collection directory
        #[arg(short, long)]
        workspace: PathBuf,
    },

    /// Restore request files from the backups of earlier runs
    Revert {
        /// Bruno collection directory
        #[arg(short, long)]
        workspace: PathBuf,
    },

    /// Print the documentation extracted from an OpenAPI document
    Inspect {
        /// Path to the OpenAPI document
        #[arg(short, long)]
        openapi: PathBuf,

        /// Output format
        #[arg(long, default_value = "yaml")]
        format: InspectFormat,
    },

    /// Write a default brudoc configuration
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

#[derive(Clone, ValueEnum)]
enum InspectFormat {
    Yaml,
    Json,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Doc { openapi, workspace } => cmd_doc(&cli.config, &openapi, &workspace),

        Commands::Revert { workspace } => cmd_revert(&workspace),

        Commands::Inspect { openapi, format } => cmd_inspect(&cli.config, &openapi, format),

        Commands::Init { force } => cmd_init(&cli.config, force),

        Commands::Completions { shell } => {
            let mut cmd = <Cli as clap::CommandFactory>::command();
            clap_complete::generate(shell, &mut cmd, "brudoc", &mut std::io::stdout());
            Ok(())
        }
    }
}

/// Load the config file if present, defaults otherwise.
fn load_config(path: &Path) -> Result<BrudocConfig> {
    let cfg = config::load_config(path)?;
    match &cfg {
        Some(_) => info!("using config {}", path.display()),
        None => debug!("no config at {}, using defaults", path.display()),
    }
    Ok(cfg.unwrap_or_default())
}

fn cmd_doc(config_path: &Path, openapi: &Path, workspace: &Path) -> Result<()> {
    let cfg = load_config(config_path)?;
    let spec = parse::load(openapi)
        .with_context(|| format!("failed to load {}", openapi.display()))?;
    let report = run_doc(&spec, workspace, &cfg)
        .with_context(|| format!("cannot document {}", workspace.display()))?;
    print_doc_report(&report);
    Ok(())
}

fn print_doc_report(report: &DocReport) {
    for path in &report.updated {
        eprintln!("  updated {}", path.display());
    }
    for (path, reason) in &report.unmatched {
        eprintln!("  unmatched {}: {}", path.display(), reason);
    }
    for (path, err) in &report.failed {
        eprintln!("  failed {}: {}", path.display(), err);
    }
    for (label, warning) in &report.warnings {
        eprintln!("  warning {}: {}", label, warning);
    }
    eprintln!(
        "Updated {}, unchanged {}, unmatched {}, failed {} ({} skipped, {} warnings).",
        report.updated.len(),
        report.unchanged.len(),
        report.unmatched.len(),
        report.failed.len(),
        report.skipped.len(),
        report.warnings.len()
    );
}

fn cmd_revert(workspace: &Path) -> Result<()> {
    let report = run_revert(workspace)
        .with_context(|| format!("cannot revert {}", workspace.display()))?;
    print_revert_report(&report);
    Ok(())
}

fn print_revert_report(report: &RevertReport) {
    for path in &report.reverted {
        eprintln!("  reverted {}", path.display());
    }
    for path in &report.orphaned {
        eprintln!("  orphaned backup {}", path.display());
    }
    for (path, err) in &report.failed {
        eprintln!("  failed {}: {}", path.display(), err);
    }
    eprintln!(
        "Reverted {} files ({} orphaned backups, {} failed).",
        report.reverted.len(),
        report.orphaned.len(),
        report.failed.len()
    );
}

fn cmd_inspect(config_path: &Path, openapi: &Path, format: InspectFormat) -> Result<()> {
    let cfg = load_config(config_path)?;
    let spec = parse::load(openapi)
        .with_context(|| format!("failed to load {}", openapi.display()))?;
    let docs = transform::extract(
        &spec,
        &ExtractOptions {
            examples: cfg.render.examples,
        },
    );

    match format {
        InspectFormat::Yaml => {
            let yaml = serde_yaml_ng::to_string(&docs)?;
            print!("{}", yaml);
        }
        InspectFormat::Json => {
            let json = serde_json::to_string_pretty(&docs)?;
            println!("{}", json);
        }
    }

    eprintln!(
        "OpenAPI {}: {}",
        spec.openapi,
        spec.title.as_deref().unwrap_or("(untitled)")
    );
    eprintln!("  Operations: {}", docs.len());
    eprintln!("  Body properties: {}", body_property_count(&docs));
    eprintln!(
        "  Warnings: {}",
        docs.iter().map(|d| d.warnings.len()).sum::<usize>()
    );
    Ok(())
}

fn body_property_count(docs: &[OperationDoc]) -> usize {
    docs.iter()
        .filter_map(|d| match &d.request_body {
            Some(Documented::Available(body)) => Some(body),
            _ => None,
        })
        .flat_map(|body| &body.properties)
        .map(|p| p.count())
        .sum()
}

fn cmd_init(config_path: &Path, force: bool) -> Result<()> {
    if config_path.exists() && !force {
        anyhow::bail!(
            "{} already exists. Use --force to overwrite.",
            config_path.display()
        );
    }
    fs::write(config_path, config::default_config_content())
        .with_context(|| format!("failed to write {}", config_path.display()))?;
    eprintln!("Created {}", config_path.display());
    Ok(())
}
