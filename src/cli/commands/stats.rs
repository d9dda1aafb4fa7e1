//! `netlimits stats` command - per-NET statistics only

use miette::{IntoDiagnostic, Result};
use serde::Serialize;
use std::io::{self, IsTerminal, Write};
use std::path::PathBuf;

use crate::cli::helpers::{format_stat, load_config, report_failure, resolve_path};
use crate::cli::output::{effective_format, render_table, write_delimited};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::{LimitsPipeline, PipelineInputs, TrailKind};
use crate::entities::NetStatistics;

#[derive(clap::Args, Debug)]
pub struct StatsArgs {
    /// Raw measurement grid (CSV)
    #[arg(long, short = 'g')]
    pub grid: Option<PathBuf>,

    /// Reference sheet supplying the samples-per-set count (CSV)
    #[arg(long, short = 'r')]
    pub reference: Option<PathBuf>,
}

/// Flat statistics row (csv cannot write flattened structs)
#[derive(Serialize)]
struct StatRecord {
    net: usize,
    count: usize,
    min: f64,
    max: f64,
    mean: f64,
    median: f64,
    stdev: f64,
    q1: f64,
    q3: f64,
    iqr: f64,
    lower_fence: f64,
    upper_fence: f64,
    trimmed_mean: f64,
    trimmed_stdev: f64,
    trimmed_count: usize,
}

impl From<&NetStatistics> for StatRecord {
    fn from(s: &NetStatistics) -> Self {
        let st = &s.stats;
        Self {
            net: s.net + 1,
            count: st.count,
            min: st.min,
            max: st.max,
            mean: st.mean,
            median: st.median,
            stdev: st.stdev,
            q1: st.q1,
            q3: st.q3,
            iqr: st.iqr,
            lower_fence: st.lower_fence,
            upper_fence: st.upper_fence,
            trimmed_mean: st.trimmed_mean,
            trimmed_stdev: st.trimmed_stdev,
            trimmed_count: st.trimmed_count,
        }
    }
}

pub fn run(args: StatsArgs, global: &GlobalOpts) -> Result<()> {
    let config = load_config(global.config.as_deref())?;
    let grid = resolve_path(args.grid.as_ref(), config.inputs.grid.as_ref(), "--grid", "inputs.grid")?;
    let reference = resolve_path(
        args.reference.as_ref(),
        config.inputs.reference.as_ref(),
        "--reference",
        "inputs.reference",
    )?;

    let pipeline = LimitsPipeline::new(config);
    let report = pipeline
        .run(&PipelineInputs {
            grid,
            reference,
            vendor: None,
        })
        .map_err(|failure| report_failure(failure, global.verbose))?;

    let records: Vec<StatRecord> = report.statistics.iter().map(StatRecord::from).collect();
    let mut out = io::stdout().lock();

    match effective_format(global.format, None, io::stdout().is_terminal()) {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&records)
                .map_err(|e| miette::miette!("JSON error: {}", e))?;
            writeln!(out, "{}", json).into_diagnostic()?;
        }
        OutputFormat::Table => {
            let table = render_table(
                &[
                    "NET", "n", "Min", "Max", "Mean", "Median", "Stdev", "Q1", "Q3", "IQR",
                    "Q1-4IQR", "Q3+4IQR", "Trim mean", "Trim stdev",
                ],
                records.iter().map(|r| {
                    vec![
                        r.net.to_string(),
                        r.count.to_string(),
                        format_stat(r.min),
                        format_stat(r.max),
                        format_stat(r.mean),
                        format_stat(r.median),
                        format_stat(r.stdev),
                        format_stat(r.q1),
                        format_stat(r.q3),
                        format_stat(r.iqr),
                        format_stat(r.lower_fence),
                        format_stat(r.upper_fence),
                        format_stat(r.trimmed_mean),
                        format_stat(r.trimmed_stdev),
                    ]
                }),
            );
            writeln!(out, "{}", table).into_diagnostic()?;
        }
        OutputFormat::Tsv => write_delimited(out, &records, b'\t').into_diagnostic()?,
        OutputFormat::Csv | OutputFormat::Auto => {
            write_delimited(out, &records, b',').into_diagnostic()?
        }
    }

    if !global.quiet {
        // Lookup misses are expected here: no vendor sheet is read
        for w in report
            .warnings()
            .into_iter()
            .filter(|w| w.kind != TrailKind::LookupMiss)
        {
            eprintln!("{} {}", console::style("!").yellow(), w.message);
        }
    }

    Ok(())
}
