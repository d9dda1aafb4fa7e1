//! `netlimits init` command - write a default configuration file

use console::style;
use miette::{IntoDiagnostic, Result};
use std::fs;
use std::path::PathBuf;

use crate::cli::GlobalOpts;
use crate::core::config::{default_template, CONFIG_FILE_NAME};

#[derive(clap::Args, Debug)]
pub struct InitArgs {
    /// Directory to write netlimits.yaml into
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Overwrite an existing netlimits.yaml
    #[arg(long)]
    pub force: bool,
}

pub fn run(args: InitArgs, global: &GlobalOpts) -> Result<()> {
    let target = args.path.join(CONFIG_FILE_NAME);
    if target.exists() && !args.force {
        return Err(miette::miette!(
            help = "Use --force to overwrite it",
            "{} already exists",
            target.display()
        ));
    }

    let template = default_template().map_err(|e| miette::miette!("{}", e))?;
    fs::create_dir_all(&args.path).into_diagnostic()?;
    fs::write(&target, template).into_diagnostic()?;

    if !global.quiet {
        println!(
            "{} Created {}",
            style("✓").green(),
            style(target.display()).cyan()
        );
    }
    Ok(())
}
