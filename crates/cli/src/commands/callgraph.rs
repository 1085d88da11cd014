/// Module for the `callgraph` subcommand, which disassembles one runtime
/// bytecode file and prints the recovered heuristic call graph.
use async_trait::async_trait;
use clap::Args;
use sigmap_core::callgraph::{analyze_contract, render_call_graph_file};
use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

/// Arguments for the `callgraph` subcommand.
#[derive(Args)]
pub struct CallgraphArgs {
    /// Treat the input as pre-disassembled text instead of running
    /// `evm disasm` on it
    #[arg(long)]
    pub asm: bool,

    /// Write the call-graph file here instead of stdout
    #[arg(short, long)]
    pub out: Option<PathBuf>,
}

/// Executes the `callgraph` subcommand.
///
/// # Arguments
/// * `input` - Path to a runtime bytecode hex file (or, with `--asm`, to
///   already-disassembled text).
///
/// # Returns
/// A `Result` indicating success or an error if disassembly or loading
/// fails.
#[async_trait]
impl super::Command for CallgraphArgs {
    async fn execute(self, input: &str) -> Result<(), Box<dyn Error>> {
        let (text, failed) = if self.asm {
            (fs::read_to_string(input)?, false)
        } else {
            super::disassemble_file(Path::new(input)).await?
        };

        let graph = analyze_contract(&text, failed)?;
        tracing::info!(functions = graph.len(), "recovered call graph");

        let rendered = render_call_graph_file(&graph);
        match self.out {
            Some(path) => fs::write(path, rendered)?,
            None => print!("{rendered}"),
        }
        Ok(())
    }
}
