use std::process::ExitCode;

use anyhow::{Context, Result};

use samplesheet_validator::config::{Config, OutputFormat};
use samplesheet_validator::duplicates::{DuplicateCheck, SlimsRegistry};
use samplesheet_validator::rules::resolve_rules;
use samplesheet_validator::validation::{EngineOptions, Report, ValidationEngine};

fn main() -> ExitCode {
    match run() {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(err) => {
            eprintln!("error: {:#}", err);
            ExitCode::from(2)
        }
    }
}

/// Validate one samplesheet; `Ok(valid)` on a completed run
fn run() -> Result<bool> {
    // Parse configuration from command line and environment
    let config = Config::from_args_and_env()?;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&config.log_level))
        .init();

    let (rules, source) = resolve_rules(&config).context("Failed to load validation rules")?;
    log::info!("Using {} ({} pipeline(s))", source, rules.pipelines.len());

    let text = std::fs::read_to_string(&config.manifest)
        .with_context(|| format!("Failed to read samplesheet {}", config.manifest.display()))?;

    let engine = ValidationEngine::new(&rules, EngineOptions { cutoff: config.cutoff })?;

    let registry;
    let unavailable;
    let duplicates = if !config.duplicate_check {
        log::debug!("Duplicate check disabled");
        DuplicateCheck::Skip
    } else {
        match SlimsRegistry::from_env() {
            Ok(client) => {
                registry = client;
                DuplicateCheck::Registry(&registry)
            }
            Err(err) => {
                unavailable = err.to_string();
                DuplicateCheck::Unavailable(&unavailable)
            }
        }
    };

    let report = engine.validate(&text, &config.filename, duplicates);
    print_report(&report, &config)?;

    Ok(report.is_valid())
}

fn print_report(report: &Report, config: &Config) -> Result<()> {
    match config.format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(report).context("Failed to encode report")?;
            println!("{}", json);
        }
        OutputFormat::Text => {
            for finding in report.findings() {
                println!("{}", finding);
            }
            let errors = report.errors().count();
            let warnings = report.warnings().count();
            if report.is_valid() {
                println!("{}: valid ({} warning(s))", config.filename, warnings);
            } else {
                println!(
                    "{}: invalid ({} error(s), {} warning(s))",
                    config.filename, errors, warnings
                );
            }
        }
    }
    Ok(())
}
