/// Entry point for the sigmap CLI.
///
/// This module parses command-line arguments and dispatches to subcommands
/// for deriving selector signature maps from contract ABIs, recovering the
/// heuristic call graph of a disassembled contract, or batch-processing a
/// whole project directory. It initializes logging and handles the main
/// execution flow.
use clap::Parser;
use sigmap_cli::commands::{Cmd, Command};
use tracing_subscriber::EnvFilter;

/// Command-line interface for sigmap.
///
/// sigmap extracts function-selector signature maps from contract ABIs and
/// recovers an approximate call graph between on-chain functions from the
/// disassembly of deployed runtime bytecode.
#[derive(Parser)]
#[command(name = "sigmap")]
#[command(about = "sigmap: EVM selector signatures and heuristic call graphs")]
struct Cli {
    #[command(subcommand)]
    command: Cmd,

    /// Input path: an ABI JSON file, a runtime bytecode file, or a project
    /// directory, depending on the subcommand
    input: String,
}

/// Runs the sigmap CLI with the provided arguments.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    cli.command.execute(&cli.input).await
}
