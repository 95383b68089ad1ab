use std::io::IsTerminal;

use clap::Parser;
use dawn_milestones_cli::MilestonesCli;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    let cli = MilestonesCli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .with_target(false)
        .init();

    dawn_milestones_cli::run(cli)
}
