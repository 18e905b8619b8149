//! Subcommand implementations.
//!
//! Each command returns `Result<(), Box<dyn std::error::Error>>`; `main`
//! prints the error and exits non-zero.

pub mod apply;
pub mod check;
pub mod config_cmd;
pub mod init;
pub mod providers;
pub mod run;

use std::path::Path;

use llmd_agent::TurnOutcome;
use llmd_config::AppConfig;
use llmd_core::{PlainRenderer, TemplateRenderer};
use llmd_document::ProjectLog;
use llmd_patch::PatchApplier;
use tracing::info;

type CmdResult<T = ()> = Result<T, Box<dyn std::error::Error>>;

/// Load `path` if given, else the default config file; env overrides apply.
fn load_config(path: Option<&Path>) -> CmdResult<AppConfig> {
    let config = match path {
        Some(path) => AppConfig::load_with_env(path),
        None => AppConfig::load(),
    };
    config.map_err(|e| format!("Failed to load config: {e}").into())
}

fn read_log(path: &Path) -> CmdResult<ProjectLog> {
    let text = PlainRenderer.render(path)?;
    let log = ProjectLog::parse(&text).map_err(|e| format!("{}: {e}", path.display()))?;
    Ok(log)
}

/// Write `log` back to `path`, or print it to stdout on a dry run.
fn write_log(path: &Path, log: &ProjectLog, dry_run: bool) -> CmdResult {
    let text = log.to_text()?;
    if dry_run {
        print!("{text}");
    } else {
        std::fs::write(path, text)?;
        info!(path = %path.display(), "Project log updated");
    }
    Ok(())
}

fn applier(config: &AppConfig) -> PatchApplier {
    PatchApplier::new()
        .with_policy(config.patch.on_failure)
        .with_redaction_marker(&config.patch.redaction_marker)
}

/// One-line patch summary plus one line per skipped instruction, on stderr.
fn print_summary(outcome: &TurnOutcome) {
    let report = &outcome.report;
    eprintln!(
        "  Patches: {} found, {} applied, {} ignored, {} failed",
        outcome.instructions.len(),
        report.applied,
        report.ignored,
        report.failures.len()
    );
    for failure in &report.failures {
        eprintln!("  ⚠️  {}: {}", failure.summary, failure.error);
    }
    if let Some(usage) = &outcome.usage {
        eprintln!(
            "  Tokens:  {} prompt + {} completion",
            usage.prompt_tokens, usage.completion_tokens
        );
    }
}
