//! `netlimits vendor` command - inspect the vendor lookup table

use console::style;
use miette::{IntoDiagnostic, Result};
use serde::Serialize;
use std::io::{self, IsTerminal, Write};
use std::path::PathBuf;

use crate::cli::helpers::{format_opt, load_config, resolve_path};
use crate::cli::output::{effective_format, render_table, write_delimited};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::VendorSpecs;
use crate::sheet::Sheet;

#[derive(clap::Args, Debug)]
pub struct VendorArgs {
    /// Vendor specification sheet (CSV)
    #[arg(long)]
    pub vendor: Option<PathBuf>,

    /// Resolve a single key, e.g. J_TELE.18U0200.8
    #[arg(long, short = 'k')]
    pub key: Option<String>,
}

#[derive(Serialize)]
struct VendorRecord<'a> {
    key: &'a str,
    nominal: Option<f64>,
    usl: Option<f64>,
    lsl: Option<f64>,
}

pub fn run(args: VendorArgs, global: &GlobalOpts) -> Result<()> {
    let config = load_config(global.config.as_deref())?;
    let path = resolve_path(
        args.vendor.as_ref(),
        config.inputs.vendor.as_ref(),
        "--vendor",
        "inputs.vendor",
    )?;

    let sheet = Sheet::from_csv_path(&path).map_err(|e| miette::miette!("{}", e))?;
    let specs = VendorSpecs::from_sheet(&sheet, &config.vendor);

    let records: Vec<VendorRecord> = match &args.key {
        Some(key) => {
            let entry = specs.get(key).ok_or_else(|| {
                miette::miette!(
                    help = "Keys are part1.pin1 and part2.pin2 joined with nothing in between",
                    "No vendor entry for key {}",
                    key
                )
            })?;
            vec![VendorRecord {
                key: key.as_str(),
                nominal: entry.nominal,
                usl: entry.usl,
                lsl: entry.lsl,
            }]
        }
        None => specs
            .iter()
            .map(|(key, entry)| VendorRecord {
                key,
                nominal: entry.nominal,
                usl: entry.usl,
                lsl: entry.lsl,
            })
            .collect(),
    };

    let mut out = io::stdout().lock();
    match effective_format(global.format, None, io::stdout().is_terminal()) {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&records)
                .map_err(|e| miette::miette!("JSON error: {}", e))?;
            writeln!(out, "{}", json).into_diagnostic()?;
        }
        OutputFormat::Table => {
            let table = render_table(
                &["Key", "Nominal", "USL", "LSL"],
                records.iter().map(|r| {
                    vec![
                        r.key.to_string(),
                        format_opt(r.nominal),
                        format_opt(r.usl),
                        format_opt(r.lsl),
                    ]
                }),
            );
            writeln!(out, "{}", table).into_diagnostic()?;
            if !global.quiet && args.key.is_none() {
                writeln!(out, "\n{} vendor entries.", style(records.len()).cyan())
                    .into_diagnostic()?;
            }
        }
        OutputFormat::Tsv => write_delimited(out, &records, b'\t').into_diagnostic()?,
        OutputFormat::Csv | OutputFormat::Auto => {
            write_delimited(out, &records, b',').into_diagnostic()?
        }
    }

    Ok(())
}
