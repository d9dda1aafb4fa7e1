use clap::Parser;
use miette::Result;
use netlimits::cli::{Cli, Commands};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn main() -> Result<()> {
    // Install miette's fancy error handler for beautiful diagnostics
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .tab_width(4)
                .build(),
        )
    }))?;

    let cli = Cli::parse();
    init_tracing(cli.global.verbose, cli.global.quiet);

    let global = &cli.global;
    match cli.command {
        Commands::Calc(args) => netlimits::cli::commands::calc::run(args, global),
        Commands::Stats(args) => netlimits::cli::commands::stats::run(args, global),
        Commands::Vendor(args) => netlimits::cli::commands::vendor::run(args, global),
        Commands::Init(args) => netlimits::cli::commands::init::run(args, global),
        Commands::Completions(args) => netlimits::cli::commands::completions::run(args),
    }
}

/// Logs go to stderr so piped results stay clean; `RUST_LOG` wins over `-v`
fn init_tracing(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => "off",
        (false, 0) => "error",
        (false, 1) => "info",
        (false, 2) => "debug",
        (false, _) => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("netlimits={}", level)));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .init();
}
