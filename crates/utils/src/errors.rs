use thiserror::Error;

/// Error type for loading and parsing disassembly text.
#[derive(Debug, Error)]
pub enum DisasmError {
    /// The bytecode file could not be read.
    #[error("could not read file '{path}': {source}")]
    FileRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The external disassembler could not be run or produced unusable output.
    #[error("disassembler failed: {0}")]
    Disassembler(String),

    /// An instruction line did not have the `<hex-address>: <mnemonic>` shape.
    ///
    /// Fatal for the whole load: downstream index arithmetic assumes a fully
    /// well-formed sequence, so a bad line is never silently skipped.
    #[error("malformed disassembly at line {line}: {msg} ⇒ `{raw}`")]
    MalformedDisassembly {
        line: usize,
        msg: String,
        raw: String,
    },

    /// No instruction lines remained after banner/diagnostic stripping.
    #[error("empty disassembly")]
    Empty,
}

/// Error type for ABI handling and signature derivation.
#[derive(Debug, Error)]
pub enum AbiError {
    /// The ABI file could not be read.
    #[error("could not read file '{path}': {source}")]
    FileRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The ABI JSON could not be deserialized.
    #[error("ABI parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// A function entry has no `name`, so no signature can be produced.
    /// Skips that entry only; never fatal for the contract.
    #[error("ABI function entry has no name")]
    MissingName,

    /// Two distinct signatures hashed to the same 4-byte selector.
    #[error("selector collision on {selector}: `{first}` vs `{second}`")]
    SelectorCollision {
        selector: String,
        first: String,
        second: String,
    },
}

/// Non-fatal analysis conditions.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// A function entry address has no jump-table entry. The caller records
    /// the function with no call-graph information and moves on.
    #[error("no instruction at jump target address {0:#x}")]
    UnresolvedJumpTarget(usize),
}
