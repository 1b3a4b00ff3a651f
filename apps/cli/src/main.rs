//! BuyerScope CLI: buyer group discovery from people-directory exports.
//!
//! Turns an employee-directory export into a scored, role-assigned,
//! size-constrained buyer group with a written report.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli).await
}
