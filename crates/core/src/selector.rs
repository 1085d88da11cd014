//! ABI model and 4-byte selector derivation.

use indexmap::IndexMap;
use serde::Deserialize;
use sigmap_utils::errors::AbiError;
use tiny_keccak::{Hasher, Keccak};

/// One entry of a contract ABI description.
#[derive(Debug, Clone, Deserialize)]
pub struct AbiEntry {
    /// Entry kind: "function", "constructor", "event", ...
    #[serde(rename = "type", default)]
    pub kind: String,
    /// Function name. Absent on constructors and fallback entries.
    pub name: Option<String>,
    /// Ordered typed inputs.
    #[serde(default)]
    pub inputs: Option<Vec<AbiInput>>,
}

/// A typed input of an ABI function.
#[derive(Debug, Clone, Deserialize)]
pub struct AbiInput {
    #[serde(default)]
    pub name: Option<String>,
    /// Declared type string, taken verbatim (tuples are not expanded).
    #[serde(rename = "type")]
    pub ty: String,
}

/// Parses an ABI JSON document into its entries.
pub fn parse_abi(json: &str) -> Result<Vec<AbiEntry>, AbiError> {
    Ok(serde_json::from_str(json)?)
}

/// Returns the function entries of an ABI, in declaration order.
pub fn function_entries(abi: &[AbiEntry]) -> Vec<&AbiEntry> {
    abi.iter().filter(|e| e.kind == "function").collect()
}

/// Builds the canonical signature `name(type1,type2,...)` for a function
/// entry. Entries without a `name` produce [`AbiError::MissingName`] and
/// are skipped by callers.
pub fn canonical_signature(entry: &AbiEntry) -> Result<String, AbiError> {
    let name = entry.name.as_deref().ok_or(AbiError::MissingName)?;
    let types = match &entry.inputs {
        Some(inputs) => inputs
            .iter()
            .map(|i| i.ty.as_str())
            .collect::<Vec<_>>()
            .join(","),
        None => String::new(),
    };
    Ok(format!("{name}({types})"))
}

/// Derives the 4-byte selector of a canonical signature: the first 4 bytes
/// of Keccak-256 over the UTF-8 signature, rendered `0x` + 8 lowercase hex
/// digits. Deterministic pure function.
pub fn selector_from_signature(signature: &str) -> String {
    let mut keccak = Keccak::v256();
    keccak.update(signature.as_bytes());
    let mut hash = [0u8; 32];
    keccak.finalize(&mut hash);
    format!("0x{}", hex::encode(&hash[..4]))
}

/// Canonicalizes a PUSH4 operand as emitted by the disassembler (with or
/// without `0x`, any case, possibly short) into the 10-character selector
/// form. `None` if the operand is not 4-byte hex.
pub fn canonicalize_selector(operand: &str) -> Option<String> {
    let digits = operand.trim().trim_start_matches("0x");
    if digits.is_empty() || digits.len() > 8 {
        return None;
    }
    let value = u32::from_str_radix(digits, 16).ok()?;
    Some(format!("0x{value:08x}"))
}

/// Derives the selector→signature map for every function entry of an ABI.
///
/// Entries without a name are skipped. Two *distinct* signatures hashing to
/// the same selector would corrupt the mapping, so that case is reported as
/// [`AbiError::SelectorCollision`] rather than overwritten; a repeated
/// identical signature is harmless.
pub fn derive_signatures(abi: &[AbiEntry]) -> Result<IndexMap<String, String>, AbiError> {
    let mut signatures: IndexMap<String, String> = IndexMap::new();
    for entry in function_entries(abi) {
        let signature = match canonical_signature(entry) {
            Ok(sig) => sig,
            Err(AbiError::MissingName) => {
                tracing::debug!("skipping unnamed ABI function entry");
                continue;
            }
            Err(e) => return Err(e),
        };
        let selector = selector_from_signature(&signature);
        if let Some(existing) = signatures.get(&selector) {
            if *existing != signature {
                return Err(AbiError::SelectorCollision {
                    selector,
                    first: existing.clone(),
                    second: signature,
                });
            }
            continue;
        }
        signatures.insert(selector, signature);
    }
    Ok(signatures)
}

/// Renders a signature map as the newline-delimited
/// `<selector>:<signature>` artifact.
pub fn render_signature_file(signatures: &IndexMap<String, String>) -> String {
    let mut out = String::new();
    for (selector, signature) in signatures {
        out.push_str(selector);
        out.push(':');
        out.push_str(signature);
        out.push('\n');
    }
    out
}
