use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;
use treecopy::commands::copy;
use treecopy::config::Cli;
use treecopy::{Config, CopyStatus};

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    // Convert CLI args to Config - this validates immediately
    let config = Config::try_from(cli)?;
    let json = config.json;

    let report = copy::run(config)?;
    if json {
        println!("{}", report.to_json()?);
    } else {
        println!("{}", report.summary());
    }

    Ok(match report.status {
        CopyStatus::Succeeded => ExitCode::SUCCESS,
        CopyStatus::Cancelled => ExitCode::from(130),
        CopyStatus::Failed => ExitCode::FAILURE,
    })
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();
}
