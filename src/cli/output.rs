//! Output formatting utilities

use std::io::Write;
use std::path::Path;

use serde::Serialize;

use crate::cli::OutputFormat;

/// Resolve `Auto` from the output target
///
/// Files pick by extension (`.json`, `.tsv`, anything else CSV). Stdout
/// gets a table on a terminal and CSV when piped.
pub fn effective_format(format: OutputFormat, output: Option<&Path>, is_terminal: bool) -> OutputFormat {
    match format {
        OutputFormat::Auto => match output {
            Some(path) => match path.extension().and_then(|e| e.to_str()) {
                Some("json") => OutputFormat::Json,
                Some("tsv") => OutputFormat::Tsv,
                _ => OutputFormat::Csv,
            },
            None if is_terminal => OutputFormat::Table,
            None => OutputFormat::Csv,
        },
        other => other,
    }
}

/// Serialize flat records as CSV or TSV with a header row
pub fn write_delimited<W: Write, T: Serialize>(
    writer: W,
    records: &[T],
    delimiter: u8,
) -> Result<(), csv::Error> {
    let mut wtr = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(writer);
    for record in records {
        wtr.serialize(record)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Render rows as a rounded table
pub fn render_table<I, R>(header: &[&str], rows: I) -> String
where
    I: IntoIterator<Item = R>,
    R: IntoIterator<Item = String>,
{
    let mut builder = tabled::builder::Builder::default();
    builder.push_record(header.iter().map(|h| h.to_string()));
    for row in rows {
        builder.push_record(row);
    }
    let mut table = builder.build();
    table.with(tabled::settings::Style::rounded());
    table.to_string()
}
