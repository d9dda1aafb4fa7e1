//! `netlimits calc` command - derive limits and judge them against vendor specs

use chrono::{DateTime, Utc};
use console::style;
use miette::{IntoDiagnostic, Result};
use serde::Serialize;
use std::fs;
use std::io::{self, IsTerminal, Write};
use std::path::{Path, PathBuf};

use crate::cli::helpers::{
    format_opt, format_opt_int, load_config, report_failure, resolve_path, styled_judgement,
};
use crate::cli::output::{effective_format, render_table, write_delimited};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::formula::{JudgementFormulas, StatFormulas, StatSheetRows};
use crate::core::reshape::ReshapeSummary;
use crate::core::trail::TrailEntry;
use crate::core::{LimitsPipeline, PipelineInputs};
use crate::entities::{Judgement, PipelineReport, ResultRecord};

/// File name of the formula sheet written by `--formulas`
pub const FORMULAS_FILE: &str = "formulas.csv";

#[derive(clap::Args, Debug)]
pub struct CalcArgs {
    /// Raw measurement grid (CSV)
    #[arg(long, short = 'g')]
    pub grid: Option<PathBuf>,

    /// Reference sheet with the samples-per-set count and NET identities (CSV)
    #[arg(long, short = 'r')]
    pub reference: Option<PathBuf>,

    /// Vendor specification sheet (CSV); every lookup misses without it
    #[arg(long)]
    pub vendor: Option<PathBuf>,

    /// Write results here instead of stdout
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,

    /// Write the internal limit pair back into the reference sheet
    #[arg(long)]
    pub sync: bool,

    /// Also write formulas.csv next to the results
    #[arg(long)]
    pub formulas: bool,
}

/// JSON report envelope
#[derive(Serialize)]
struct CalcEnvelope<'a> {
    version: &'static str,
    generated_at: DateTime<Utc>,
    input_digest: &'a str,
    samples_per_set: usize,
    summary: &'a ReshapeSummary,
    rows: Vec<ResultRecord>,
    warnings: Vec<&'a TrailEntry>,
}

/// One NET of the formula sheet
#[derive(Serialize)]
struct FormulaRecord {
    net: usize,
    column: String,
    min: String,
    max: String,
    average: String,
    median: String,
    stdev: String,
    iqr: String,
    lower_fence: String,
    upper_fence: String,
    lsl: String,
    usl: String,
    result_row: usize,
    internal_lsl: String,
    internal_usl: String,
    judge_lsl: String,
    judge_usl: String,
    internal_raw_lsl: String,
    internal_raw_usl: String,
    scaled_lsl: String,
    scaled_usl: String,
}

pub fn run(args: CalcArgs, global: &GlobalOpts) -> Result<()> {
    let config = load_config(global.config.as_deref())?;

    let grid = resolve_path(args.grid.as_ref(), config.inputs.grid.as_ref(), "--grid", "inputs.grid")?;
    let reference = resolve_path(
        args.reference.as_ref(),
        config.inputs.reference.as_ref(),
        "--reference",
        "inputs.reference",
    )?;
    let vendor = args.vendor.clone().or_else(|| config.inputs.vendor.clone());
    let output = args.output.clone().or_else(|| config.inputs.output.clone());
    let sync = args.sync || config.pipeline.sync_reference;

    let pipeline = LimitsPipeline::new(config);
    let mut report = pipeline
        .run(&PipelineInputs {
            grid,
            reference: reference.clone(),
            vendor,
        })
        .map_err(|failure| report_failure(failure, global.verbose))?;

    let format = effective_format(global.format, output.as_deref(), io::stdout().is_terminal());
    match &output {
        Some(path) => {
            let file = fs::File::create(path).into_diagnostic()?;
            emit(&report, format, file)?;
        }
        None => emit(&report, format, io::stdout().lock())?,
    }

    if args.formulas {
        let dir = output
            .as_deref()
            .and_then(Path::parent)
            .map(Path::to_path_buf)
            .unwrap_or_default();
        let path = dir.join(FORMULAS_FILE);
        write_formulas(&report, &path)?;
        if !global.quiet {
            eprintln!("{} Wrote {}", style("✓").green(), style(path.display()).cyan());
        }
    }

    // Last, so a failed output never leaves the reference file modified
    if sync {
        pipeline.sync_reference(&mut report, &reference);
    }

    if !global.quiet {
        print_summary(&report, output.as_deref());
    }

    Ok(())
}

fn emit<W: Write>(report: &PipelineReport, format: OutputFormat, mut writer: W) -> Result<()> {
    let records = report.records();
    match format {
        OutputFormat::Json => {
            let envelope = CalcEnvelope {
                version: env!("CARGO_PKG_VERSION"),
                generated_at: Utc::now(),
                input_digest: &report.input_digest,
                samples_per_set: report.samples_per_set,
                summary: &report.summary,
                rows: records,
                warnings: report.warnings(),
            };
            let json = serde_json::to_string_pretty(&envelope)
                .map_err(|e| miette::miette!("JSON error: {}", e))?;
            writeln!(writer, "{}", json).into_diagnostic()?;
        }
        OutputFormat::Table => {
            let table = render_table(
                &[
                    "No", "Net name", "BtoB", "ACF", "ERS LSL", "ERS USL", "LSL", "USL",
                    "Judge LSL", "Judge USL", "Calc LSL", "Calc USL",
                ],
                records.iter().map(|r| {
                    vec![
                        r.no.clone(),
                        r.net_name.clone(),
                        join_pin(&r.btob_name, &r.btob_pin),
                        join_pin(&r.acf_name, &r.acf_pin),
                        format_opt(r.ers_lsl),
                        format_opt(r.ers_usl),
                        format_opt_int(r.internal_lsl),
                        format_opt_int(r.internal_usl),
                        r.judge_lsl.to_string(),
                        r.judge_usl.to_string(),
                        format_opt(r.calculated_lsl),
                        format_opt(r.calculated_usl),
                    ]
                }),
            );
            writeln!(writer, "{}", table).into_diagnostic()?;
        }
        OutputFormat::Tsv => write_delimited(writer, &records, b'\t').into_diagnostic()?,
        OutputFormat::Csv | OutputFormat::Auto => {
            write_delimited(writer, &records, b',').into_diagnostic()?
        }
    }
    Ok(())
}

fn join_pin(name: &str, pin: &str) -> String {
    if name.is_empty() && pin.is_empty() {
        String::new()
    } else {
        format!("{}.{}", name, pin)
    }
}

fn write_formulas(report: &PipelineReport, path: &Path) -> Result<()> {
    let rows = StatSheetRows::default();
    let measurements = report.summary.total_measurements;

    let records: Vec<FormulaRecord> = (0..report.net_count())
        .map(|net| {
            // Column A holds the row labels; NET 1 starts at B
            let stat = StatFormulas::for_column(net + 1, measurements, &rows);
            // Row 1 is the header of the result sheet
            let judge = JudgementFormulas::for_row(net + 2);
            FormulaRecord {
                net: net + 1,
                column: stat.column,
                min: stat.min,
                max: stat.max,
                average: stat.average,
                median: stat.median,
                stdev: stat.stdev,
                iqr: stat.iqr,
                lower_fence: stat.lower_fence,
                upper_fence: stat.upper_fence,
                lsl: stat.lsl,
                usl: stat.usl,
                result_row: judge.row,
                internal_lsl: judge.internal_lsl,
                internal_usl: judge.internal_usl,
                judge_lsl: judge.judge_lsl,
                judge_usl: judge.judge_usl,
                internal_raw_lsl: judge.internal_raw_lsl,
                internal_raw_usl: judge.internal_raw_usl,
                scaled_lsl: judge.scaled_lsl,
                scaled_usl: judge.scaled_usl,
            }
        })
        .collect();

    let file = fs::File::create(path).into_diagnostic()?;
    write_delimited(file, &records, b',').into_diagnostic()
}

fn print_summary(report: &PipelineReport, output: Option<&Path>) {
    let ng = report
        .rows
        .iter()
        .filter(|r| r.judgement_lsl == Judgement::Ng || r.judgement_usl == Judgement::Ng)
        .count();

    eprintln!(
        "{} Derived limits for {} NETs ({} sets x {} pieces)",
        style("✓").green(),
        style(report.net_count()).cyan(),
        report.summary.sets_per_piece,
        report.summary.piece_count
    );
    if let Some(path) = output {
        eprintln!("   Results: {}", style(path.display()).cyan());
    }

    for row in report.rows.iter().filter(|r| {
        r.judgement_lsl == Judgement::Ng || r.judgement_usl == Judgement::Ng
    }) {
        eprintln!(
            "   NET {} {}: LSL {} USL {}",
            row.identity.number(),
            style(row.identity.net_name.render()).yellow(),
            styled_judgement(row.judgement_lsl),
            styled_judgement(row.judgement_usl)
        );
    }
    if ng > 0 {
        eprintln!("{} {} NETs outside vendor spec", style("!").yellow(), ng);
    }

    let warnings = report.warnings();
    if !warnings.is_empty() {
        eprintln!(
            "{} {} warnings",
            style("⚠ Warning:").yellow().bold(),
            warnings.len()
        );
        for w in warnings {
            eprintln!("   [{}] {}", style(w.stage).dim(), w.message);
        }
    }

    if let Some(sync) = &report.sync {
        if sync.succeeded {
            eprintln!(
                "{} Synchronized {} rows into {}",
                style("✓").green(),
                sync.updated_rows,
                style(sync.path.display()).cyan()
            );
        }
    }
    eprintln!("   Input digest: {}", style(&report.input_digest).dim());
}
