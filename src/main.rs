use anyhow::Result;
use clap::Parser;

use barqr::settings::init_logger;

fn main() -> Result<()> {
    init_logger()?;
    let cli = barqr::cli::Cli::parse();
    barqr::run(cli)?;
    Ok(())
}
