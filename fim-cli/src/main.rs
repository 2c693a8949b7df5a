//! FIM CLI - Command line tool for flood impact recomputation over building records.

use clap::Parser;

#[derive(Parser)]
#[command(
    name = "fim-cli",
    version,
    about = "Flood impact mitigation toolkit"
)]
struct Cli {
    #[command(subcommand)]
    command: fim_cmd::Command,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    log::debug!("[FIM] cli: starting");
    fim_cmd::run(cli.command)
}
