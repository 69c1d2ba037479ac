//! MLD CLI - build dashboard snapshots from simulation results and inspect
//! the metrics derived from them.

use clap::Parser;

#[derive(Parser)]
#[command(
    name = "mld-cli",
    version,
    about = "Manufacturing line dashboard data toolkit"
)]
struct Cli {
    #[command(subcommand)]
    command: mld_cmd::Command,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    log::debug!("mld-cli {}", env!("CARGO_PKG_VERSION"));
    mld_cmd::run(cli.command).await
}
