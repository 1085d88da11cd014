use async_trait::async_trait;
use clap::Subcommand;
use sigmap_utils::errors::DisasmError;
use std::error::Error;
use std::path::Path;

pub mod batch;
pub mod callgraph;
pub mod sigs;

#[derive(Subcommand)]
pub enum Cmd {
    /// Derive the selector:signature map from an ABI JSON file
    Sigs(sigs::SigsArgs),

    /// Recover the heuristic call graph of one runtime bytecode file
    Callgraph(callgraph::CallgraphArgs),

    /// Process a project directory of ABIs and runtime bytecode files
    Batch(batch::BatchArgs),
}

#[async_trait]
pub trait Command {
    async fn execute(self, input: &str) -> Result<(), Box<dyn Error>>;
}

#[async_trait]
impl Command for Cmd {
    async fn execute(self, input: &str) -> Result<(), Box<dyn Error>> {
        match self {
            Cmd::Sigs(args) => args.execute(input).await,
            Cmd::Callgraph(args) => args.execute(input).await,
            Cmd::Batch(args) => args.execute(input).await,
        }
    }
}

/// Runs `evm disasm` on a runtime bytecode file, capturing stdout and
/// stderr as one text stream the way the loader expects. Returns the text
/// and whether the disassembler exited non-zero, in which case its final
/// line is a diagnostic the loader will drop.
pub(crate) async fn disassemble_file(path: &Path) -> Result<(String, bool), DisasmError> {
    let output = tokio::process::Command::new("evm")
        .arg("disasm")
        .arg(path)
        .output()
        .await
        .map_err(|e| DisasmError::Disassembler(format!("could not run `evm disasm`: {e}")))?;

    let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
    text.push_str(&String::from_utf8_lossy(&output.stderr));
    Ok((text, !output.status.success()))
}
