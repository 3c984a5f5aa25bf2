//! httpprobe - time one HTTP(S) GET request phase by phase

use clap::Parser;
use httpprobe::{
    cli::Cli,
    config::load_config,
    error::{ErrorReporter, Result},
    output::Reporter,
    probe::ProbeSession,
    BUILD_TIME, GIT_COMMIT, PKG_NAME, VERSION,
};
use std::{io, process};

fn main() {
    std::panic::set_hook(Box::new(|panic_info| {
        eprintln!("Application panic: {}", panic_info);
        process::exit(99);
    }));

    let cli = Cli::parse();
    let reporter = ErrorReporter::new(cli.use_colors(), cli.debug);

    if let Err(e) = run_application(cli) {
        reporter.report_error(&e);
        process::exit(e.exit_code());
    }
}

/// Load configuration, run the probe and print the report
fn run_application(cli: Cli) -> Result<()> {
    if cli.debug {
        eprintln!("{} v{} ({}, built {})", PKG_NAME, VERSION, GIT_COMMIT, BUILD_TIME);
        eprintln!("Debug mode enabled");
    }

    let config = load_config(cli)?;
    let reporter = Reporter::new(config.output_format, config.print_content);

    let mut session = ProbeSession::new(config);
    let report = session.run()?;

    let stdout = io::stdout();
    reporter.emit(&mut stdout.lock(), &report)
}
