//! Shared helper functions for CLI commands

use console::style;
use miette::Result;
use std::path::{Path, PathBuf};

use crate::core::{Config, PipelineFailure};
use crate::entities::Judgement;
use crate::sheet::cell::format_number;

/// Load the layered config, honoring `--config`
pub fn load_config(explicit: Option<&Path>) -> Result<Config> {
    Config::load(explicit).map_err(|e| miette::miette!("{}", e))
}

/// Turn a pipeline failure into a report, echoing its trail under `-v`
pub fn report_failure(failure: PipelineFailure, verbose: u8) -> miette::Report {
    if verbose > 0 && !failure.trail.is_empty() {
        eprintln!(
            "{} Trail before failure at {}:",
            style("⚠").yellow(),
            style(failure.stage()).cyan()
        );
        for entry in failure.trail.entries() {
            eprintln!("   [{}] {}", style(entry.stage).dim(), entry.message);
        }
    }
    miette::Report::new(failure)
}

/// Command-line path, falling back to the config value
pub fn resolve_path(
    arg: Option<&PathBuf>,
    configured: Option<&PathBuf>,
    flag: &str,
    key: &str,
) -> Result<PathBuf> {
    arg.or(configured).cloned().ok_or_else(|| {
        miette::miette!(
            help = format!("Pass {} or set {} in netlimits.yaml", flag, key),
            "No {} file given",
            flag.trim_start_matches("--")
        )
    })
}

/// Empty string for `None`, shortest decimal otherwise
pub fn format_opt(value: Option<f64>) -> String {
    value.map(format_number).unwrap_or_default()
}

pub fn format_opt_int(value: Option<i64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// Statistic rounded for display (6 significant decimals, no trailing zeros)
pub fn format_stat(value: f64) -> String {
    let rounded = format!("{:.6}", value);
    let trimmed = rounded.trim_end_matches('0').trim_end_matches('.');
    if trimmed == "-0" {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Coloured judgement for summaries
pub fn styled_judgement(judgement: Judgement) -> String {
    match judgement {
        Judgement::Ok => style("OK").green().to_string(),
        Judgement::Ng => style("NG").red().bold().to_string(),
        Judgement::CannotJudge => style("-").dim().to_string(),
    }
}
