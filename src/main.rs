use anyhow::Result;
use clap::Parser;

use basin_demos::cli::Cli;
use basin_demos::run;

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let config = cli.resolve_config()?;
    log::debug!("configuration: {config:?}");

    let report = run::execute(&cli.command, &config)?;
    if let Some(path) = &cli.report {
        report.write(path)?;
    }
    Ok(())
}
