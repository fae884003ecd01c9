mod auth;
mod cli;
mod error;
mod providers;
mod report;
mod window;

use anyhow::Result;
use clap::Parser;
use cli::Cli;
use log::info;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    info!("Starting team-report - monthly tracker activity workbook");
    cli.execute().await?;

    Ok(())
}
