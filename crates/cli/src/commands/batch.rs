/// Module for the `batch` subcommand, which processes a staged project
/// directory: every ABI in `abis/` becomes a signature file in
/// `abi_sigs/`, every runtime bytecode file in `bins/` becomes a
/// call-graph file in `bin_sigs/`. Per-contract failures skip that
/// contract only and are surfaced in the final summary.
use async_trait::async_trait;
use clap::Args;
use sigmap_core::callgraph::{analyze_contract, render_call_graph_file};
use sigmap_core::selector::{derive_signatures, parse_abi, render_signature_file};
use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

/// Arguments for the `batch` subcommand.
#[derive(Args)]
pub struct BatchArgs;

/// Counts of per-contract outcomes for one batch pass.
#[derive(Debug, Default)]
struct Summary {
    analyzed: usize,
    skipped: usize,
}

/// Executes the `batch` subcommand.
///
/// # Arguments
/// * `input` - Project directory containing `abis/` and `bins/`.
///
/// # Returns
/// A `Result` indicating success or an error if the directory layout is
/// unusable. Per-contract analysis errors are logged and counted, never
/// propagated.
#[async_trait]
impl super::Command for BatchArgs {
    async fn execute(self, input: &str) -> Result<(), Box<dyn Error>> {
        let root = Path::new(input);

        let abi_summary = derive_abi_signatures(root)?;
        let bin_summary = derive_call_graphs(root).await?;

        println!(
            "ABI signatures: {} derived, {} skipped",
            abi_summary.analyzed, abi_summary.skipped
        );
        println!(
            "Call graphs: {} analyzed, {} skipped",
            bin_summary.analyzed, bin_summary.skipped
        );
        Ok(())
    }
}

/// Sorted file list of a directory. Missing directories are treated as
/// empty so a project may stage only ABIs or only bytecode.
fn staged_files(dir: &Path) -> Result<Vec<PathBuf>, std::io::Error> {
    if !dir.is_dir() {
        tracing::debug!(dir = %dir.display(), "staging directory absent");
        return Ok(Vec::new());
    }
    let mut files: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .collect();
    files.sort();
    Ok(files)
}

/// Output file name for a staged input: the input file name plus `.sig`.
fn sig_file_name(path: &Path) -> Option<String> {
    path.file_name()
        .map(|name| format!("{}.sig", name.to_string_lossy()))
}

/// Signature map for one staged ABI file.
fn signatures_for(path: &Path) -> Result<indexmap::IndexMap<String, String>, Box<dyn Error>> {
    let json = fs::read_to_string(path)?;
    let abi = parse_abi(&json)?;
    Ok(derive_signatures(&abi)?)
}

/// Writes a `<name>.sig` signature file into `abi_sigs/` for every ABI in
/// `abis/`. A contract whose ABI fails to parse or collides is skipped.
fn derive_abi_signatures(root: &Path) -> Result<Summary, Box<dyn Error>> {
    let out_dir = root.join("abi_sigs");
    fs::create_dir_all(&out_dir)?;

    let mut summary = Summary::default();
    for path in staged_files(&root.join("abis"))? {
        let Some(out_name) = sig_file_name(&path) else {
            continue;
        };
        match signatures_for(&path) {
            Ok(signatures) if !signatures.is_empty() => {
                fs::write(out_dir.join(out_name), render_signature_file(&signatures))?;
                summary.analyzed += 1;
            }
            Ok(_) => {
                tracing::debug!(path = %path.display(), "no function entries, nothing to write");
                summary.analyzed += 1;
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "skipping ABI");
                summary.skipped += 1;
            }
        }
    }
    Ok(summary)
}

/// Writes a `<name>.sig` call-graph file into `bin_sigs/` for every
/// runtime bytecode file in `bins/`. A contract whose disassembly is
/// malformed is skipped; a contract with no call evidence produces no
/// file but still counts as analyzed.
async fn derive_call_graphs(root: &Path) -> Result<Summary, Box<dyn Error>> {
    let out_dir = root.join("bin_sigs");
    fs::create_dir_all(&out_dir)?;

    let mut summary = Summary::default();
    for path in staged_files(&root.join("bins"))? {
        let Some(out_name) = sig_file_name(&path) else {
            continue;
        };
        let outcome = match super::disassemble_file(&path).await {
            Ok((text, failed)) => analyze_contract(&text, failed),
            Err(e) => Err(e),
        };
        match outcome {
            Ok(graph) => {
                if !graph.is_empty() {
                    fs::write(out_dir.join(out_name), render_call_graph_file(&graph))?;
                }
                summary.analyzed += 1;
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "skipping contract");
                summary.skipped += 1;
            }
        }
    }
    Ok(summary)
}
