//! Recovers the selector→entry-address map from the compiler's dispatch
//! idiom at the top of the runtime code.

use crate::disasm::InstructionStream;
use crate::selector::canonicalize_selector;
use indexmap::IndexMap;

/// Scans the dispatch-table region for function entries.
///
/// Solidity's dispatcher compares the incoming selector against each known
/// constant: `PUSH4 <selector>` / `EQ` / `PUSH<n> <dest>` / `JUMPI`. Every
/// such triple is recorded as selector → destination address. Scanning
/// stops at the first `STOP`, which by convention ends the dispatch region;
/// `PUSH4`/`EQ` pairs after it belong to function bodies and must not be
/// misread as entries.
///
/// For a repeated selector the last occurrence wins (plain map insert); in
/// well-formed output selectors are unique.
pub fn scan_dispatch_table(stream: &InstructionStream) -> IndexMap<String, usize> {
    let mut entries = IndexMap::new();

    for window in stream.instructions.windows(3) {
        let [push4, eq, dest] = window else {
            break;
        };
        if push4.mnemonic == "STOP" {
            break;
        }
        if push4.mnemonic != "PUSH4" || eq.mnemonic != "EQ" {
            continue;
        }
        let Some(selector) = push4.operand.as_deref().and_then(canonicalize_selector) else {
            continue;
        };
        // The third instruction pushes the jump destination for the JUMPI.
        let Some(address) = dest
            .operand
            .as_deref()
            .and_then(|op| usize::from_str_radix(op.trim_start_matches("0x"), 16).ok())
        else {
            continue;
        };

        tracing::debug!(selector = %selector, address, "dispatch entry");
        entries.insert(selector, address);
    }

    tracing::debug!(entries = entries.len(), "dispatch table scan complete");
    entries
}
