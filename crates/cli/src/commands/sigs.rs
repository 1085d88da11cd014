/// Module for the `sigs` subcommand, which derives the selector:signature
/// map from a contract ABI JSON file.
use async_trait::async_trait;
use clap::Args;
use sigmap_core::selector::{derive_signatures, parse_abi, render_signature_file};
use sigmap_utils::errors::AbiError;
use std::error::Error;
use std::fs;
use std::path::PathBuf;

/// Arguments for the `sigs` subcommand.
#[derive(Args)]
pub struct SigsArgs {
    /// Write the signature file here instead of stdout
    #[arg(short, long)]
    pub out: Option<PathBuf>,
}

/// Executes the `sigs` subcommand.
///
/// # Arguments
/// * `input` - Path to a contract ABI JSON file.
///
/// # Returns
/// A `Result` indicating success or an error if the ABI cannot be read,
/// parsed, or produces a selector collision.
#[async_trait]
impl super::Command for SigsArgs {
    async fn execute(self, input: &str) -> Result<(), Box<dyn Error>> {
        let json = fs::read_to_string(input).map_err(|e| AbiError::FileRead {
            path: input.to_string(),
            source: e,
        })?;
        let abi = parse_abi(&json)?;
        let signatures = derive_signatures(&abi)?;
        tracing::info!(functions = signatures.len(), "derived signature map");

        let rendered = render_signature_file(&signatures);
        match self.out {
            Some(path) => fs::write(path, rendered)?,
            None => print!("{rendered}"),
        }
        Ok(())
    }
}
