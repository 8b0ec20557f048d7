//! Check command implementation

use crate::output::{self, OutputFormat};
use anyhow::{Context, Result};
use colored::Colorize;
use serde_json::json;
use sqlvet::{InMemoryCatalog, Query, Severity, ValidationConfig, ValidationProblem, Validator};
use std::fs;
use std::path::{Path, PathBuf};

/// Configuration for the check command
pub struct CheckConfig {
    pub catalog: PathBuf,
    pub config: Option<PathBuf>,
    pub files: Vec<PathBuf>,
    pub format: OutputFormat,
    pub strict: bool,
}

/// Problems found in one query file
pub struct FileReport {
    pub file: PathBuf,
    pub problems: Vec<ValidationProblem>,
}

impl FileReport {
    fn count(&self, severity: Severity) -> usize {
        self.problems.iter().filter(|p| p.severity == severity).count()
    }
}

/// Validate every query file, print the report and tell whether the run passed
pub fn check(config: CheckConfig) -> Result<bool> {
    let reports = check_files(&config)?;

    let errors: usize = reports.iter().map(|r| r.count(Severity::Error)).sum();
    let warnings: usize = reports.iter().map(|r| r.count(Severity::Warning)).sum();

    match config.format {
        OutputFormat::Text => print_text(&reports, errors, warnings),
        OutputFormat::Json => print_json(&reports, errors, warnings)?,
    }

    if config.strict && warnings > 0 {
        log::info!("strict mode: treating {} warning(s) as errors", warnings);
        return Ok(false);
    }
    Ok(errors == 0)
}

/// Load inputs and validate each query file in order
pub fn check_files(config: &CheckConfig) -> Result<Vec<FileReport>> {
    if config.files.is_empty() {
        anyhow::bail!("No query files specified");
    }

    let catalog = InMemoryCatalog::from_json_file(&config.catalog)
        .with_context(|| format!("Failed to load catalog {}", config.catalog.display()))?;

    let validation_config = match &config.config {
        Some(path) => ValidationConfig::from_json_file(path)
            .with_context(|| format!("Failed to load configuration {}", path.display()))?,
        None => ValidationConfig::default(),
    };
    let validator = Validator::with_config(validation_config).context("Invalid configuration")?;

    config
        .files
        .iter()
        .map(|file| {
            let query = load_query(file)?;
            let problems = validator.validate(&query, &catalog);
            log::debug!("{}: {} problem(s)", file.display(), problems.len());
            Ok(FileReport {
                file: file.clone(),
                problems,
            })
        })
        .collect()
}

fn load_query(file: &Path) -> Result<Query> {
    let json = fs::read_to_string(file)
        .with_context(|| format!("Failed to read query file {}", file.display()))?;
    serde_json::from_str(&json)
        .with_context(|| format!("Failed to decode query tree in {}", file.display()))
}

fn print_text(reports: &[FileReport], errors: usize, warnings: usize) {
    for report in reports {
        let status = if report.count(Severity::Error) == 0 {
            "✓".green().bold()
        } else {
            "✗".red().bold()
        };
        println!("{} {}", status, report.file.display().to_string().cyan());

        for problem in &report.problems {
            for line in problem.render().lines() {
                println!("  {}", line);
            }
        }
    }

    println!();
    if errors == 0 && warnings == 0 {
        println!(
            "{}",
            output::format_success(&format!("{} checked, no problems", output::plural(reports.len(), "file")))
        );
    } else {
        let mut summary = Vec::new();
        if errors > 0 {
            summary.push(output::plural(errors, "error").red().to_string());
        }
        if warnings > 0 {
            summary.push(output::plural(warnings, "warning").yellow().to_string());
        }
        eprintln!("{}", output::format_failure(&format!("found {}", summary.join(", "))));
    }
}

fn print_json(reports: &[FileReport], errors: usize, warnings: usize) -> Result<()> {
    let files: Vec<_> = reports
        .iter()
        .map(|r| json!({ "file": r.file.display().to_string(), "problems": r.problems }))
        .collect();
    let document = json!({ "files": files, "errors": errors, "warnings": warnings });
    let text = serde_json::to_string_pretty(&document).context("Failed to serialize report")?;
    println!("{}", text);
    Ok(())
}
